//! Tabular printers
//!
//! Rows are written as tab-separated cells; alignment is done by the
//! listing's `TabWriter`.

use super::{PrintError, PrinterError, ResourcePrinter};
use crate::table::format::NONE;
use crate::table::jsonpath::{extract_jsonpath_value, value_to_display};
use crate::table::{ColumnDefinition, Table};
use std::borrow::Cow;
use std::io::Write;

/// Keep a cell on one line and inside one column
fn flatten_cell(cell: &str) -> Cow<'_, str> {
    if cell.contains(['\t', '\n', '\r']) {
        Cow::Owned(cell.replace(['\t', '\n', '\r'], " "))
    } else {
        Cow::Borrowed(cell)
    }
}

fn write_line<'a, I>(out: &mut dyn Write, cells: I) -> Result<(), PrintError>
where
    I: IntoIterator<Item = &'a str>,
{
    let line = cells
        .into_iter()
        .map(flatten_cell)
        .collect::<Vec<_>>()
        .join("\t");
    writeln!(out, "{}", line)?;
    Ok(())
}

/// Human-readable table (`-o table` / `-o wide`)
///
/// The header is printed again whenever a table's visible columns differ
/// from the last header, as happens for generic columns derived from each
/// object's fields.
#[derive(Debug)]
pub struct TablePrinter {
    wide: bool,
    no_headers: bool,
    last_header: Option<Vec<String>>,
}

impl TablePrinter {
    pub fn new(wide: bool, no_headers: bool) -> Self {
        Self {
            wide,
            no_headers,
            last_header: None,
        }
    }

    fn visible(&self, column: &ColumnDefinition) -> bool {
        self.wide || column.priority == 0
    }
}

impl ResourcePrinter for TablePrinter {
    fn print(&mut self, table: &Table, out: &mut dyn Write) -> Result<(), PrintError> {
        if table.rows.is_empty() {
            return Ok(());
        }
        let visible: Vec<usize> = table
            .columns
            .iter()
            .enumerate()
            .filter(|(_, c)| self.visible(c))
            .map(|(i, _)| i)
            .collect();

        let header: Vec<String> = visible
            .iter()
            .map(|&i| table.columns[i].name.clone())
            .collect();
        if !self.no_headers && self.last_header.as_ref() != Some(&header) {
            write_line(out, header.iter().map(String::as_str))?;
            self.last_header = Some(header);
        }
        for row in &table.rows {
            write_line(
                out,
                visible
                    .iter()
                    .map(|&i| row.cells.get(i).map(String::as_str).unwrap_or_default()),
            )?;
        }
        Ok(())
    }

    fn is_tabular(&self) -> bool {
        true
    }

    fn shows_headers(&self) -> bool {
        !self.no_headers
    }
}

/// One `HEADER:PATH` column of `-o custom-columns`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomColumn {
    pub header: String,
    pub path: String,
}

impl CustomColumn {
    /// Parse `HEADER:PATH,HEADER:PATH`
    pub fn parse_spec(spec: &str) -> Result<Vec<Self>, PrinterError> {
        if spec.trim().is_empty() {
            return Err(PrinterError::EmptyCustomColumns);
        }
        spec.split(',')
            .map(|part| {
                let (header, path) = part
                    .split_once(':')
                    .filter(|(h, p)| !h.trim().is_empty() && !p.trim().is_empty())
                    .ok_or_else(|| PrinterError::InvalidCustomColumn(part.to_string()))?;
                Ok(CustomColumn {
                    header: header.trim().to_string(),
                    path: path.trim().to_string(),
                })
            })
            .collect()
    }
}

/// User-defined columns read from each row's object
#[derive(Debug)]
pub struct CustomColumnsPrinter {
    columns: Vec<CustomColumn>,
    no_headers: bool,
    header_printed: bool,
}

impl CustomColumnsPrinter {
    pub fn new(columns: Vec<CustomColumn>, no_headers: bool) -> Self {
        Self {
            columns,
            no_headers,
            header_printed: false,
        }
    }
}

impl ResourcePrinter for CustomColumnsPrinter {
    fn print(&mut self, table: &Table, out: &mut dyn Write) -> Result<(), PrintError> {
        if table.rows.is_empty() {
            return Ok(());
        }
        if !self.no_headers && !self.header_printed {
            write_line(out, self.columns.iter().map(|c| c.header.as_str()))?;
            self.header_printed = true;
        }
        for row in &table.rows {
            let cells: Vec<String> = self
                .columns
                .iter()
                .map(|c| {
                    extract_jsonpath_value(&row.object, &c.path)
                        .map(value_to_display)
                        .unwrap_or_else(|| NONE.to_string())
                })
                .collect();
            write_line(out, cells.iter().map(String::as_str))?;
        }
        Ok(())
    }

    fn is_tabular(&self) -> bool {
        true
    }

    fn shows_headers(&self) -> bool {
        !self.no_headers
    }
}
