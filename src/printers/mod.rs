//! Printers
//!
//! A printer formats tables onto the listing's writer. One printer is
//! selected per group of objects sharing a grouping key; it keeps whatever
//! per-group state it needs (the table printer prints its header once).
//!
//! Formats: `table` (default), `wide`, `name`, `json`, `yaml` and
//! `custom-columns=HEADER:PATH,...`.

pub mod name;
pub mod passthrough;
pub mod table;

pub use name::NamePrinter;
pub use passthrough::{JsonPrinter, YamlPrinter};
pub use table::{CustomColumn, CustomColumnsPrinter, TablePrinter};

use crate::table::Table;
use std::fmt;
use std::io::{self, Write};
use std::str::FromStr;

/// Formats accepted by `-o`
pub const ALLOWED_FORMATS: &[&str] = &["custom-columns", "json", "name", "wide", "yaml"];

/// Printer selection errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PrinterError {
    #[error(
        "unable to match a printer suitable for the output format \"{format}\", allowed formats are: {}",
        ALLOWED_FORMATS.join(",")
    )]
    UnknownFormat { format: String },

    #[error("custom-columns format specified but no custom columns given")]
    EmptyCustomColumns,

    #[error("unexpected custom-columns spec: {0}, expected <header>:<json-path-expr>")]
    InvalidCustomColumn(String),
}

/// Errors while printing one table
#[derive(Debug, thiserror::Error)]
pub enum PrintError {
    /// The sink failed; nothing further can be written
    #[error("failed to write output: {0}")]
    Io(#[from] io::Error),

    #[error("failed to serialize {format} output: {message}")]
    Serialize {
        format: &'static str,
        message: String,
    },
}

/// Parsed `-o` value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Wide,
    Name,
    Json,
    Yaml,
    CustomColumns(Vec<CustomColumn>),
}

impl OutputFormat {
    /// Whether output is aligned in columns
    pub fn is_tabular(&self) -> bool {
        matches!(
            self,
            OutputFormat::Table | OutputFormat::Wide | OutputFormat::CustomColumns(_)
        )
    }
}

impl FromStr for OutputFormat {
    type Err = PrinterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" | "table" => Ok(OutputFormat::Table),
            "wide" => Ok(OutputFormat::Wide),
            "name" => Ok(OutputFormat::Name),
            "json" => Ok(OutputFormat::Json),
            "yaml" => Ok(OutputFormat::Yaml),
            other => match other.strip_prefix("custom-columns=") {
                Some(spec) => Ok(OutputFormat::CustomColumns(CustomColumn::parse_spec(spec)?)),
                None if other == "custom-columns" => Err(PrinterError::EmptyCustomColumns),
                None => Err(PrinterError::UnknownFormat {
                    format: other.to_string(),
                }),
            },
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Table => f.write_str("table"),
            OutputFormat::Wide => f.write_str("wide"),
            OutputFormat::Name => f.write_str("name"),
            OutputFormat::Json => f.write_str("json"),
            OutputFormat::Yaml => f.write_str("yaml"),
            OutputFormat::CustomColumns(columns) => {
                let spec: Vec<String> = columns
                    .iter()
                    .map(|c| format!("{}:{}", c.header, c.path))
                    .collect();
                write!(f, "custom-columns={}", spec.join(","))
            }
        }
    }
}

/// Inputs to printer selection
#[derive(Debug, Clone, Default)]
pub struct PrintConfig {
    /// Raw `-o` value, parsed at selection time
    pub format: String,
    pub no_headers: bool,
    /// Wrap pass-through documents as `{type, object}` watch events
    pub output_watch_events: bool,
    /// Output was already written by an earlier group
    pub after_output: bool,
}

/// Formats tables onto a writer
pub trait ResourcePrinter {
    fn print(&mut self, table: &Table, out: &mut dyn Write) -> Result<(), PrintError>;

    /// Output is aligned in tab-separated columns
    fn is_tabular(&self) -> bool {
        false
    }

    /// Output starts with a header line
    fn shows_headers(&self) -> bool {
        false
    }
}

/// Select the printer for a group
pub fn select_printer(config: &PrintConfig) -> Result<Box<dyn ResourcePrinter>, PrinterError> {
    let format: OutputFormat = config.format.parse()?;
    tracing::debug!("Selected {} printer", format);

    Ok(match format {
        OutputFormat::Table => Box::new(TablePrinter::new(false, config.no_headers)),
        OutputFormat::Wide => Box::new(TablePrinter::new(true, config.no_headers)),
        OutputFormat::CustomColumns(columns) => {
            Box::new(CustomColumnsPrinter::new(columns, config.no_headers))
        }
        OutputFormat::Name => Box::new(NamePrinter),
        OutputFormat::Json => Box::new(JsonPrinter::new(config.output_watch_events)),
        OutputFormat::Yaml => Box::new(YamlPrinter::new(
            config.output_watch_events,
            config.after_output,
        )),
    })
}
