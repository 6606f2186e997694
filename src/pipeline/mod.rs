//! Listing pipeline
//!
//! `GetRunner` drives a listing: it pulls objects from an `ObjectSource`,
//! converts each one into a table through the `KindRegistry` and prints it
//! with the printer selected for the object's grouping key.
//!
//! Output state lives in a `GroupState` for the duration of one run. When
//! the grouping key changes, buffered output is flushed, remembered column
//! widths are dropped, a separator is armed if the previous group printed
//! headers, and a new printer is selected.
//!
//! Per-object failures never stop the listing. They are logged, collected
//! into an `AggregateError` and reported when the run ends. Only a failing
//! output sink aborts a run.

pub mod error;
mod watch;

pub use error::{AggregateError, GetError, ItemError};

use crate::models::{NamespaceScope, QuerySpec, RetrievedObject, WatchEventKind};
use crate::output::GroupedStreamWriter;
use crate::printers::{OutputFormat, PrintConfig, PrintError, ResourcePrinter, select_printer};
use crate::source::{FetchResult, ObjectSource};
use crate::table::sort::{sort_objects, sort_table};
use crate::table::{
    ApiVersionNormalizer, KindRegistry, Normalizer, RenderOptions, Table, is_namespaced_object,
};
use chrono::{DateTime, Utc};
use kube::core::GroupVersionKind;
use std::collections::HashSet;
use std::future::Future;
use std::io::{self, Write};

/// Presentation options of one listing
#[derive(Debug, Clone, Default)]
pub struct OutputOptions {
    pub no_headers: bool,
    /// Listing spans every namespace; namespaced tables get a NAMESPACE column
    pub all_namespaces: bool,
    pub sort_by: Option<String>,
    /// Raw `-o` value
    pub format: String,
    pub watch: bool,
    pub watch_only: bool,
    pub output_watch_events: bool,
    pub ignore_not_found: bool,
    /// Prefix names with `kind.group/` even for single-type listings
    pub show_kind: bool,
}

impl OutputOptions {
    pub fn is_watch(&self) -> bool {
        self.watch || self.watch_only
    }
}

/// Outcome of a successful listing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Rows printed across all groups
    pub objects_printed: usize,
}

/// Output state carried from one object to the next
pub struct GroupState<W: Write> {
    pub last_key: Option<GroupVersionKind>,
    pub printer: Option<Box<dyn ResourcePrinter>>,
    pub writer: GroupedStreamWriter<W>,
    headers_shown: bool,
}

impl<W: Write> GroupState<W> {
    pub fn new(sink: W) -> Self {
        Self {
            last_key: None,
            printer: None,
            writer: GroupedStreamWriter::new(sink),
            headers_shown: false,
        }
    }

    /// Flush buffered output and return the sink
    pub fn into_inner(self) -> io::Result<W> {
        self.writer.into_inner()
    }
}

/// Table decorations that depend on the listing rather than the object
#[derive(Debug, Clone, Copy)]
struct Decorations<'a> {
    all_namespaces: bool,
    qualify_names: bool,
    sort_by: Option<&'a str>,
    event_column: bool,
}

/// Runs listings against one object source
pub struct GetRunner {
    source: Box<dyn ObjectSource>,
    registry: KindRegistry,
    normalizer: Box<dyn Normalizer>,
    render_time: Option<DateTime<Utc>>,
}

impl GetRunner {
    /// Runner with the built-in kinds and API version normalization
    pub fn new(source: impl ObjectSource + 'static) -> Self {
        Self::from_boxed(Box::new(source))
    }

    /// Runner over a source chosen at runtime
    pub fn from_boxed(source: Box<dyn ObjectSource>) -> Self {
        Self {
            source,
            registry: KindRegistry::with_builtin_kinds(),
            normalizer: Box::new(ApiVersionNormalizer),
            render_time: None,
        }
    }

    pub fn with_registry(mut self, registry: KindRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_normalizer(mut self, normalizer: impl Normalizer + 'static) -> Self {
        self.normalizer = Box::new(normalizer);
        self
    }

    /// Render relative columns against a fixed time instead of the clock
    pub fn with_render_time(mut self, now: DateTime<Utc>) -> Self {
        self.render_time = Some(now);
        self
    }

    fn render_options(&self) -> RenderOptions {
        self.render_time.map(RenderOptions::at).unwrap_or_default()
    }

    /// Run a listing to completion
    pub async fn run<W: Write>(
        &self,
        query: &QuerySpec,
        options: &OutputOptions,
        sink: W,
    ) -> Result<RunSummary, GetError> {
        self.run_until(query, options, sink, std::future::pending())
            .await
    }

    /// Run a listing; a watch ends early once `shutdown` resolves
    pub async fn run_until<W, F>(
        &self,
        query: &QuerySpec,
        options: &OutputOptions,
        sink: W,
        shutdown: F,
    ) -> Result<RunSummary, GetError>
    where
        W: Write,
        F: Future<Output = ()>,
    {
        if options.is_watch() {
            return self.run_watch(query, options, sink, shutdown).await;
        }

        tracing::debug!("Fetching objects for {:?}", query.resources);
        let items = self.source.fetch(query).await?;
        let mut errors = AggregateError::new();
        let mut objects = collect_objects(items, options, &mut errors);
        if let Some(path) = options.sort_by.as_deref() {
            sort_objects(&mut objects, path);
        }

        if collects_documents(options) {
            return self.print_documents(&objects, options, errors, sink);
        }

        let spans_types = query.filenames.is_empty() && query.spans_multiple_types();
        let multiple = spans_types || multiple_kinds(&objects);
        let decorations = Decorations::new(options, multiple);
        let mut state = GroupState::new(sink);
        let mut printed = 0;
        for object in &objects {
            printed += self.print_object(
                &mut state,
                &mut errors,
                options,
                &decorations,
                object,
                None,
            )?;
        }
        state.writer.flush()?;

        finish(errors, printed)
    }

    /// Print every object of a one-shot JSON/YAML listing as one document
    ///
    /// Several objects, of any kinds, are printed as a single `List`.
    fn print_documents<W: Write>(
        &self,
        objects: &[RetrievedObject],
        options: &OutputOptions,
        mut errors: AggregateError,
        sink: W,
    ) -> Result<RunSummary, GetError> {
        let render = self.render_options();
        let mut combined = Table::new(Vec::new());
        for object in objects {
            match self
                .registry
                .convert(object, &render, self.normalizer.as_ref())
            {
                Ok(table) => combined.rows.extend(table.rows),
                Err(e) => {
                    tracing::warn!("Skipping {}: {}", object.qualified_name(), e);
                    errors.push(e);
                }
            }
        }
        if let Some(path) = options.sort_by.as_deref() {
            sort_table(&mut combined, path);
        }
        if combined.is_empty() {
            return finish(errors, 0);
        }

        let config = PrintConfig {
            format: options.format.clone(),
            no_headers: options.no_headers,
            output_watch_events: false,
            after_output: false,
        };
        let mut writer = GroupedStreamWriter::new(sink);
        writer.set_aligned(false)?;
        let printed = match select_printer(&config) {
            Ok(mut printer) => match printer.print(&combined, &mut writer) {
                Ok(()) => combined.rows.len(),
                Err(PrintError::Io(e)) => return Err(e.into()),
                Err(e) => {
                    errors.push(e);
                    0
                }
            },
            Err(e) => {
                errors.push(e);
                0
            }
        };
        writer.flush()?;
        tracing::debug!("Printed {} objects as one document", printed);

        finish(errors, printed)
    }

    /// Print one object, switching printers when its group changes
    ///
    /// Returns the number of rows printed. Per-object failures are recorded
    /// in `errors`; only sink failures are returned.
    fn print_object<W: Write>(
        &self,
        state: &mut GroupState<W>,
        errors: &mut AggregateError,
        options: &OutputOptions,
        decorations: &Decorations<'_>,
        object: &RetrievedObject,
        event: Option<WatchEventKind>,
    ) -> io::Result<usize> {
        let key = object.grouping_key();
        if state.printer.is_none() || state.last_key.as_ref() != Some(&key) {
            state.writer.flush()?;
            state.writer.reset_widths();
            if state.last_key.is_some() && state.headers_shown && state.writer.bytes_written() > 0
            {
                state.writer.set_separator_ready(true);
            }

            let config = PrintConfig {
                format: options.format.clone(),
                no_headers: options.no_headers,
                output_watch_events: options.output_watch_events,
                after_output: state.writer.bytes_written() > 0,
            };
            match select_printer(&config) {
                Ok(printer) => {
                    tracing::debug!("New group {}/{} {}", key.group, key.version, key.kind);
                    state.writer.set_aligned(printer.is_tabular())?;
                    state.headers_shown = printer.shows_headers();
                    state.printer = Some(printer);
                    state.last_key = Some(key);
                }
                Err(e) => {
                    tracing::warn!("Skipping {}: {}", object.qualified_name(), e);
                    state.printer = None;
                    errors.push(e);
                    return Ok(0);
                }
            }
        }

        let render = self.render_options();
        let converted = self
            .registry
            .convert(object, &render, self.normalizer.as_ref());
        let mut table = match converted {
            Ok(table) => table,
            Err(e) => {
                tracing::warn!("Skipping {}: {}", object.qualified_name(), e);
                errors.push(e);
                return Ok(0);
            }
        };

        if decorations.all_namespaces && is_namespaced_object(object) {
            table.prepend_namespace_column();
        }
        if decorations.qualify_names {
            table.qualify_names(object);
        }
        if let Some(path) = decorations.sort_by {
            sort_table(&mut table, path);
        }
        if let Some(event) = event {
            table.mark_event(event, decorations.event_column);
        }

        let Some(printer) = state.printer.as_mut() else {
            return Ok(0);
        };
        match printer.print(&table, &mut state.writer) {
            Ok(()) => Ok(table.rows.len()),
            Err(PrintError::Io(e)) => Err(e),
            Err(e) => {
                tracing::warn!("Failed to print {}: {}", object.qualified_name(), e);
                errors.push(e);
                Ok(0)
            }
        }
    }
}

impl<'a> Decorations<'a> {
    fn new(options: &'a OutputOptions, multiple_kinds: bool) -> Self {
        Self {
            all_namespaces: options.all_namespaces,
            qualify_names: options.show_kind || multiple_kinds,
            sort_by: options.sort_by.as_deref(),
            event_column: options.output_watch_events,
        }
    }
}

/// One-shot JSON/YAML output is gathered into a single document
fn collects_documents(options: &OutputOptions) -> bool {
    !options.is_watch()
        && matches!(
            options.format.parse::<OutputFormat>(),
            Ok(OutputFormat::Json | OutputFormat::Yaml)
        )
}

/// Split fetched items into objects and recorded failures
fn collect_objects(
    items: FetchResult,
    options: &OutputOptions,
    errors: &mut AggregateError,
) -> Vec<RetrievedObject> {
    let mut objects = Vec::with_capacity(items.len());
    for item in items {
        match item {
            Ok(object) => objects.push(object),
            Err(e) if options.ignore_not_found && e.is_not_found() => {
                tracing::debug!("Ignoring missing object: {}", e);
            }
            Err(e) => {
                tracing::warn!("Skipping object: {}", e);
                errors.push(e);
            }
        }
    }
    objects
}

/// Whether the objects span more than one group/kind
fn multiple_kinds(objects: &[RetrievedObject]) -> bool {
    let kinds: HashSet<(&str, &str)> = objects
        .iter()
        .map(|o| {
            let kind = o.kind.strip_suffix("List").filter(|k| !k.is_empty());
            (o.group(), kind.unwrap_or(&o.kind))
        })
        .collect();
    kinds.len() > 1
}

fn finish(errors: AggregateError, printed: usize) -> Result<RunSummary, GetError> {
    if !errors.is_empty() {
        return Err(GetError::Aggregate(errors));
    }
    Ok(RunSummary {
        objects_printed: printed,
    })
}

/// Message for a listing that matched nothing
pub fn no_resources_message(scope: &NamespaceScope) -> String {
    match scope.namespace() {
        Some(namespace) => format!("No resources found in {} namespace.", namespace),
        None => "No resources found".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::object::join_api_version;
    use crate::source::{MockObjectSource, RetrievalError, SourceError};
    use crate::table::normalize::MockNormalizer;
    use crate::table::NormalizeError;
    use serde_json::json;

    fn object(api_version: &str, kind: &str, name: &str) -> RetrievedObject {
        RetrievedObject::from_value(json!({
            "apiVersion": api_version,
            "kind": kind,
            "metadata": {"name": name, "namespace": "default"}
        }))
        .unwrap()
    }

    fn query() -> QuerySpec {
        QuerySpec::from_args(
            &["pods".to_string()],
            Vec::new(),
            NamespaceScope::Single {
                namespace: "default".to_string(),
                explicit: false,
            },
            None,
            None,
        )
        .unwrap()
    }

    fn source_with(items: Vec<Result<RetrievedObject, RetrievalError>>) -> MockObjectSource {
        let mut source = MockObjectSource::new();
        source
            .expect_fetch()
            .times(1)
            .returning(move |_| Ok(items.clone()));
        source
    }

    async fn run(
        runner: &GetRunner,
        options: &OutputOptions,
    ) -> (Result<RunSummary, GetError>, String) {
        let mut out = Vec::new();
        let result = runner.run(&query(), options, &mut out).await;
        (result, String::from_utf8(out).unwrap())
    }

    #[tokio::test]
    async fn test_source_failure_is_fatal() {
        let mut source = MockObjectSource::new();
        source
            .expect_fetch()
            .returning(|_| Err(SourceError::UnknownResource("widgets".to_string())));
        let (result, out) = run(&GetRunner::new(source), &OutputOptions::default()).await;
        assert!(matches!(result, Err(GetError::Source(_))));
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_retrieval_errors_are_aggregated() {
        let missing = RetrievalError::NotFound {
            resource: "pods".to_string(),
            name: "gone".to_string(),
        };
        let source = source_with(vec![
            Err(missing.clone()),
            Ok(object("v1", "ConfigMap", "settings")),
            Err(missing),
        ]);
        let (result, out) = run(&GetRunner::new(source), &OutputOptions::default()).await;
        let Err(GetError::Aggregate(errors)) = result else {
            panic!("expected aggregate error");
        };
        assert_eq!(errors.len(), 1);
        assert!(out.contains("settings"));
    }

    #[tokio::test]
    async fn test_conversion_failure_skips_object() {
        let mut normalizer = MockNormalizer::new();
        normalizer.expect_normalize().returning(|object, target| {
            Err(NormalizeError::UnsupportedVersion {
                kind: object.kind.clone(),
                from: object.api_version.clone(),
                to: join_api_version(&target.group, &target.version),
            })
        });
        let source = source_with(vec![
            Ok(object("apps/v1beta1", "Deployment", "legacy")),
            Ok(object("v1", "ConfigMap", "settings")),
        ]);
        let runner = GetRunner::new(source).with_normalizer(normalizer);
        let (result, out) = run(&runner, &OutputOptions::default()).await;
        assert!(matches!(result, Err(GetError::Aggregate(ref e)) if e.len() == 1));
        assert!(!out.contains("legacy"));
        assert!(out.contains("configmap/settings"));
    }

    #[tokio::test]
    async fn test_summary_counts_rows() {
        let source = source_with(vec![
            Ok(object("v1", "ConfigMap", "a")),
            Ok(object("v1", "ConfigMap", "b")),
        ]);
        let (result, _) = run(&GetRunner::new(source), &OutputOptions::default()).await;
        assert_eq!(result.unwrap().objects_printed, 2);
    }

    #[test]
    fn test_multiple_kinds_ignores_list_suffix() {
        let pods = object("v1", "Pod", "a");
        let pod_list = RetrievedObject::from_value(
            json!({"apiVersion": "v1", "kind": "PodList", "items": []}),
        )
        .unwrap();
        assert!(!multiple_kinds(&[pods.clone(), pod_list]));
        assert!(multiple_kinds(&[pods, object("apps/v1", "Deployment", "web")]));
    }

    #[test]
    fn test_no_resources_message() {
        assert_eq!(
            no_resources_message(&NamespaceScope::Single {
                namespace: "kube-system".to_string(),
                explicit: true
            }),
            "No resources found in kube-system namespace."
        );
        assert_eq!(no_resources_message(&NamespaceScope::All), "No resources found");
    }
}
