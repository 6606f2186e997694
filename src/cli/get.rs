//! `kget get`
//!
//! Turns command-line flags and configuration into a query and output
//! options, picks the object source and runs the listing on stdout.

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;
use std::process::ExitCode;

use crate::config::Config;
use crate::models::{NamespaceScope, QuerySpec};
use crate::pipeline::{GetError, GetRunner, OutputOptions, no_resources_message};
use crate::source::{ManifestSource, ObjectSource};

/// Namespace used when neither flags, configuration nor the context name one
const FALLBACK_NAMESPACE: &str = "default";

/// Display one or many resources
#[derive(Args, Debug, Clone, Default)]
pub struct GetArgs {
    /// TYPE[,TYPE...] [NAME...] or TYPE/NAME...
    pub resources: Vec<String>,

    /// Manifest files or directories identifying the resources to get
    #[arg(short = 'f', long = "filename")]
    pub filenames: Vec<PathBuf>,

    /// Process directories given with -f recursively
    #[arg(short = 'R', long)]
    pub recursive: bool,

    /// Namespace scope for this request
    #[arg(short = 'n', long)]
    pub namespace: Option<String>,

    /// List the requested objects across all namespaces
    #[arg(short = 'A', long)]
    pub all_namespaces: bool,

    /// Label selector (e.g. -l key1=value1,key2=value2)
    #[arg(short = 'l', long)]
    pub selector: Option<String>,

    /// Field selector (e.g. --field-selector status.phase=Running)
    #[arg(long)]
    pub field_selector: Option<String>,

    /// Output format: table, wide, name, json, yaml or custom-columns=...
    #[arg(short = 'o', long)]
    pub output: Option<String>,

    /// Sort rows by a JSONPath expression (e.g. {.metadata.name})
    #[arg(long)]
    pub sort_by: Option<String>,

    /// Don't print headers
    #[arg(long)]
    pub no_headers: bool,

    /// Prefix names with their resource type
    #[arg(long)]
    pub show_kind: bool,

    /// After listing, watch for changes
    #[arg(short = 'w', long)]
    pub watch: bool,

    /// Watch for changes without listing first
    #[arg(long)]
    pub watch_only: bool,

    /// Print the watch event type of each row
    #[arg(long)]
    pub output_watch_events: bool,

    /// Succeed silently when the requested object does not exist
    #[arg(long)]
    pub ignore_not_found: bool,

    /// Strip cluster-specific fields from the output
    #[arg(long)]
    pub export: bool,

    /// Print the manifests given with -f without contacting a cluster
    #[arg(long)]
    pub local: bool,

    /// Kubeconfig context to use
    #[arg(long)]
    pub context: Option<String>,

    /// Page size of list requests (0 disables paging)
    #[arg(long)]
    pub chunk_size: Option<u32>,
}

impl GetArgs {
    /// Namespace scope, given the namespace the client would default to
    pub fn namespace_scope(
        &self,
        config: &Config,
        context_namespace: Option<&str>,
    ) -> NamespaceScope {
        if self.all_namespaces {
            return NamespaceScope::All;
        }
        match &self.namespace {
            Some(namespace) => NamespaceScope::Single {
                namespace: namespace.clone(),
                explicit: true,
            },
            None => NamespaceScope::Single {
                namespace: config
                    .default_namespace
                    .as_deref()
                    .or(context_namespace)
                    .unwrap_or(FALLBACK_NAMESPACE)
                    .to_string(),
                explicit: false,
            },
        }
    }

    pub fn build_query(&self, namespace: NamespaceScope) -> Result<QuerySpec> {
        let query = QuerySpec::from_args(
            &self.resources,
            self.filenames.clone(),
            namespace,
            self.selector.as_deref(),
            self.field_selector.as_deref(),
        )?;
        Ok(query
            .with_recursive(self.recursive)
            .with_export(self.export))
    }

    /// Flags override configuration defaults
    pub fn output_options(&self, config: &Config) -> OutputOptions {
        OutputOptions {
            no_headers: self.no_headers || config.no_headers,
            all_namespaces: self.all_namespaces,
            sort_by: self.sort_by.clone(),
            format: self
                .output
                .clone()
                .unwrap_or_else(|| config.default_output.clone()),
            watch: self.watch,
            watch_only: self.watch_only,
            output_watch_events: self.output_watch_events,
            ignore_not_found: self.ignore_not_found,
            show_kind: self.show_kind || config.show_kind,
        }
    }
}

/// Run `kget get`
///
/// Listing failures are reported on stderr and turn into a failing exit
/// code; only setup problems are returned as errors.
pub async fn run_get(args: GetArgs, config: &Config) -> Result<ExitCode> {
    let (source, context_namespace): (Box<dyn ObjectSource>, Option<String>) = if args.local {
        if args.filenames.is_empty() {
            anyhow::bail!("--local requires at least one -f/--filename");
        }
        let source = ManifestSource::from_files(&args.filenames, args.recursive)?;
        (Box::new(source), None)
    } else {
        let connection = crate::kube::connect(args.context.as_deref()).await?;
        let chunk_size = args.chunk_size.unwrap_or(config.chunk_size);
        let source = crate::kube::KubeSource::new(connection.client, chunk_size);
        (Box::new(source), Some(connection.default_namespace))
    };

    let scope = args.namespace_scope(config, context_namespace.as_deref());
    let query = args.build_query(scope)?;
    let options = args.output_options(config);
    tracing::debug!("Query {:?} with output {:?}", query, options.format);

    let runner = GetRunner::from_boxed(source);
    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    let stdout = std::io::stdout().lock();
    match runner.run_until(&query, &options, stdout, shutdown).await {
        Ok(summary) => {
            if summary.objects_printed == 0 && !options.is_watch() && !options.ignore_not_found {
                eprintln!("{}", no_resources_message(&query.namespace));
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(GetError::Io(e)) if e.kind() == std::io::ErrorKind::BrokenPipe => {
            tracing::debug!("Output closed: {}", e);
            Ok(ExitCode::SUCCESS)
        }
        Err(GetError::Io(e)) => Err(e).context("Failed to write output"),
        Err(e) => {
            for line in e.to_string().lines() {
                eprintln!("error: {}", line);
            }
            Ok(ExitCode::FAILURE)
        }
    }
}
