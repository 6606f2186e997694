//! Continuous listings
//!
//! Unless `watch_only` is set, the current objects are printed first as
//! ADDED events. The change stream is then followed until it ends or the
//! shutdown future resolves, flushing after every event.

use super::{
    AggregateError, Decorations, GetError, GetRunner, GroupState, OutputOptions, RunSummary,
    collect_objects, finish, multiple_kinds,
};
use crate::models::{QuerySpec, RetrievedObject, WatchEventKind};
use crate::table::registry::list_items;
use crate::table::sort::sort_objects;
use futures::StreamExt;
use std::future::Future;
use std::io::Write;

impl GetRunner {
    pub(super) async fn run_watch<W, F>(
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
        let mut errors = AggregateError::new();
        let mut state = GroupState::new(sink);
        let mut printed = 0;

        let mut multiple = query.filenames.is_empty() && query.spans_multiple_types();
        if !options.watch_only {
            let items = self.source.fetch(query).await?;
            let listed = collect_objects(items, options, &mut errors);
            let mut objects = Vec::with_capacity(listed.len());
            for object in listed {
                objects.extend(expand(object, &mut errors));
            }
            if let Some(path) = options.sort_by.as_deref() {
                sort_objects(&mut objects, path);
            }
            multiple = multiple || multiple_kinds(&objects);

            let decorations = Decorations::new(options, multiple);
            tracing::debug!("Replaying {} objects as ADDED events", objects.len());
            for object in &objects {
                printed += self.print_object(
                    &mut state,
                    &mut errors,
                    options,
                    &decorations,
                    object,
                    Some(WatchEventKind::Added),
                )?;
            }
            state.writer.flush()?;
        }

        let decorations = Decorations::new(options, multiple);
        let mut events = self.source.watch(query).await?;
        tokio::pin!(shutdown);
        loop {
            let next = tokio::select! {
                _ = &mut shutdown => {
                    tracing::debug!("Watch interrupted");
                    break;
                }
                next = events.next() => next,
            };
            match next {
                Some(Ok(event)) => {
                    printed += self.print_object(
                        &mut state,
                        &mut errors,
                        options,
                        &decorations,
                        &event.object,
                        Some(event.kind),
                    )?;
                    state.writer.flush()?;
                }
                Some(Err(e)) => {
                    tracing::warn!("Watch error: {}", e);
                    errors.push(e);
                }
                None => {
                    tracing::debug!("Watch stream ended");
                    break;
                }
            }
        }
        state.writer.flush()?;

        finish(errors, printed)
    }
}

/// Split a list wrapper into individual objects
fn expand(object: RetrievedObject, errors: &mut AggregateError) -> Vec<RetrievedObject> {
    match list_items(&object) {
        Ok(Some((_, items))) => items,
        Ok(None) => vec![object],
        Err(e) => {
            tracing::warn!("Skipping {}: {}", object.kind, e);
            errors.push(e);
            Vec::new()
        }
    }
}
