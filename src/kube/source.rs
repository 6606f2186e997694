//! Live cluster object source
//!
//! Lists go through the dynamic API so that every resource type, built-in or
//! custom, is fetched the same way. A listed type is returned as one
//! `<Kind>List` object; explicitly named objects are fetched one by one.

use super::discovery::{ResolvedResource, ResourceResolver};
use crate::models::{
    NamespaceScope, QuerySpec, ResourceRef, RetrievedObject, WatchEvent, WatchEventKind,
};
use crate::source::manifest::load_manifests;
use crate::source::{
    FetchResult, ObjectSource, RetrievalError, SourceError, WatchStream, check_namespace,
    retrieved, strip_for_export,
};
use async_trait::async_trait;
use futures::StreamExt;
use kube::api::{DynamicObject, ListParams};
use kube::runtime::watcher;
use kube::{Api, Client, ResourceExt};
use serde_json::{Value, json};
use std::collections::HashSet;
use tokio::sync::mpsc;

/// Consecutive watch errors after which a resource's watch is given up
const MAX_CONSECUTIVE_ERRORS: u32 = 5;

/// Buffered events per watch before producers wait for the listing
const WATCH_BUFFER: usize = 64;

/// Objects served by the API server of one cluster
pub struct KubeSource {
    client: Client,
    resolver: ResourceResolver,
    chunk_size: u32,
}

impl KubeSource {
    /// `chunk_size` bounds the page size of list requests (0 disables paging)
    pub fn new(client: Client, chunk_size: u32) -> Self {
        Self {
            resolver: ResourceResolver::new(client.clone()),
            client,
            chunk_size,
        }
    }

    fn api(&self, resource: &ResolvedResource, scope: &NamespaceScope) -> Api<DynamicObject> {
        let ar = &resource.api_resource;
        match (resource.namespaced, scope.namespace()) {
            (true, Some(namespace)) => Api::namespaced_with(self.client.clone(), namespace, ar),
            _ => Api::all_with(self.client.clone(), ar),
        }
    }

    fn list_params(&self, query: &QuerySpec) -> ListParams {
        let mut params = ListParams::default();
        if let Some(selector) = &query.label_selector {
            params = params.labels(&selector.to_string());
        }
        if let Some(selector) = &query.field_selector {
            params = params.fields(&selector.to_string());
        }
        params
    }

    /// List every object of a type as one `<Kind>List`, following continue
    /// tokens
    async fn list(
        &self,
        query: &QuerySpec,
        resource: &ResolvedResource,
    ) -> Result<RetrievedObject, RetrievalError> {
        let api = self.api(resource, &query.namespace);
        let base = self.list_params(query);
        let ar = &resource.api_resource;

        let mut items = Vec::new();
        let mut resource_version = None;
        let mut continue_token: Option<String> = None;
        loop {
            let mut params = base.clone();
            if self.chunk_size > 0 {
                params = params.limit(self.chunk_size);
            }
            if let Some(token) = &continue_token {
                params = params.continue_token(token);
            }

            let page = api.list(&params).await.map_err(api_error)?;
            tracing::debug!("Listed {} {}", page.items.len(), ar.plural);
            if resource_version.is_none() {
                resource_version = page.metadata.resource_version.clone();
            }
            for item in page.items {
                items.push(to_value(item, resource)?);
            }
            match page.metadata.continue_ {
                Some(token) if !token.is_empty() => continue_token = Some(token),
                _ => break,
            }
        }

        let mut list = json!({
            "apiVersion": ar.api_version,
            "kind": format!("{}List", ar.kind),
            "metadata": { "resourceVersion": resource_version.unwrap_or_default() },
            "items": items,
        });
        if query.export {
            strip_for_export(&mut list);
        }
        retrieved(list)
    }

    async fn get(
        &self,
        query: &QuerySpec,
        resource: &ResolvedResource,
        namespace: &NamespaceScope,
        name: &str,
    ) -> Result<RetrievedObject, RetrievalError> {
        let api = self.api(resource, namespace);
        let object = api.get(name).await.map_err(|e| match e {
            kube::Error::Api(status) if status.code == 404 => RetrievalError::NotFound {
                resource: resource.api_resource.plural.clone(),
                name: name.to_string(),
            },
            other => api_error(other),
        })?;
        let mut value = to_value(object, resource)?;
        if query.export {
            strip_for_export(&mut value);
        }
        retrieved(value)
    }

    async fn fetch_resource(
        &self,
        query: &QuerySpec,
        reference: &ResourceRef,
    ) -> Result<FetchResult, SourceError> {
        let resource = self.resolver.resolve(&reference.resource).await?;
        if reference.names.is_empty() {
            return Ok(vec![self.list(query, &resource).await]);
        }
        let mut items = Vec::with_capacity(reference.names.len());
        for name in &reference.names {
            items.push(self.get(query, &resource, &query.namespace, name).await);
        }
        Ok(items)
    }

    /// Fetch the live state of every object in the query's manifests
    async fn fetch_files(&self, query: &QuerySpec) -> Result<FetchResult, SourceError> {
        let mut items = Vec::new();
        for value in load_manifests(&query.filenames, query.recursive)? {
            let checked = retrieved(value).and_then(|o| check_namespace(&query.namespace, &o));
            let local = match checked {
                Ok(object) => object,
                Err(e) => {
                    items.push(Err(e));
                    continue;
                }
            };
            let resource = self
                .resolver
                .resolve_kind(&local.api_version, &local.kind)
                .await?;
            let scope = match &local.namespace {
                Some(namespace) => NamespaceScope::Single {
                    namespace: namespace.clone(),
                    explicit: false,
                },
                None => query.namespace.clone(),
            };
            items.push(self.get(query, &resource, &scope, &local.name).await);
        }
        Ok(items)
    }

    /// Forward one resource type's changes into `tx` until the listing stops
    /// reading or the watch keeps failing
    fn spawn_watch(
        &self,
        query: &QuerySpec,
        resource: ResolvedResource,
        names: Vec<String>,
        tx: mpsc::Sender<Result<WatchEvent, RetrievalError>>,
    ) {
        let api = self.api(&resource, &query.namespace);
        let mut config = watcher::Config::default();
        if let Some(selector) = &query.label_selector {
            config = config.labels(&selector.to_string());
        }
        if let Some(selector) = &query.field_selector {
            config = config.fields(&selector.to_string());
        }

        tokio::spawn(async move {
            let plural = resource.api_resource.plural.clone();
            let mut stream = Box::pin(watcher(api, config));
            let mut known: HashSet<String> = HashSet::new();
            let mut initial: HashSet<String> = HashSet::new();
            let mut error_count = 0u32;

            while let Some(event) = stream.next().await {
                let change = match event {
                    Ok(watcher::Event::Init) => {
                        error_count = 0;
                        initial.clear();
                        continue;
                    }
                    // Existing objects were already printed by the initial listing
                    Ok(watcher::Event::InitApply(object)) => {
                        initial.insert(object_key(&object));
                        continue;
                    }
                    Ok(watcher::Event::InitDone) => {
                        known = std::mem::take(&mut initial);
                        continue;
                    }
                    Ok(watcher::Event::Apply(object)) => {
                        error_count = 0;
                        let kind = if known.insert(object_key(&object)) {
                            WatchEventKind::Added
                        } else {
                            WatchEventKind::Modified
                        };
                        (kind, object)
                    }
                    Ok(watcher::Event::Delete(object)) => {
                        error_count = 0;
                        known.remove(&object_key(&object));
                        (WatchEventKind::Deleted, object)
                    }
                    Err(e) => {
                        error_count += 1;
                        let message = format!("{} watch error ({}): {}", plural, error_count, e);
                        if tx.send(Err(RetrievalError::Watch(message))).await.is_err() {
                            break;
                        }
                        if error_count >= MAX_CONSECUTIVE_ERRORS {
                            tracing::warn!(
                                "Stopping {} watch after {} errors",
                                plural,
                                error_count
                            );
                            break;
                        }
                        tokio::time::sleep(std::time::Duration::from_secs(1)).await;
                        continue;
                    }
                };

                let (kind, object) = change;
                if !names.is_empty() && !names.contains(&object.name_any()) {
                    continue;
                }
                let event = to_value(object, &resource)
                    .and_then(retrieved)
                    .map(|object| WatchEvent::new(kind, object));
                if tx.send(event).await.is_err() {
                    tracing::debug!("Listing stopped, ending {} watch", plural);
                    break;
                }
            }
        });
    }
}

#[async_trait]
impl ObjectSource for KubeSource {
    async fn fetch(&self, query: &QuerySpec) -> Result<FetchResult, SourceError> {
        if !query.filenames.is_empty() {
            return self.fetch_files(query).await;
        }
        let mut items = Vec::new();
        for reference in &query.resources {
            items.extend(self.fetch_resource(query, reference).await?);
        }
        Ok(items)
    }

    async fn watch(&self, query: &QuerySpec) -> Result<WatchStream, SourceError> {
        if !query.filenames.is_empty() {
            return Err(SourceError::Unsupported(
                "watch is only supported on resource types, not on files".to_string(),
            ));
        }

        let (tx, rx) = mpsc::channel(WATCH_BUFFER);
        for reference in &query.resources {
            let resource = self.resolver.resolve(&reference.resource).await?;
            tracing::debug!("Watching {}", resource.api_resource.plural);
            self.spawn_watch(query, resource, reference.names.clone(), tx.clone());
        }

        let events = futures::stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|event| (event, rx))
        });
        Ok(events.boxed())
    }
}

fn object_key(object: &DynamicObject) -> String {
    format!("{}/{}", object.namespace().unwrap_or_default(), object.name_any())
}

/// Serialize a dynamic object, restoring the type fields list items omit
fn to_value(object: DynamicObject, resource: &ResolvedResource) -> Result<Value, RetrievalError> {
    let mut value =
        serde_json::to_value(object).map_err(|e| RetrievalError::Decode(e.to_string()))?;
    if let Some(map) = value.as_object_mut() {
        let ar = &resource.api_resource;
        map.entry("apiVersion")
            .or_insert_with(|| Value::String(ar.api_version.clone()));
        map.entry("kind")
            .or_insert_with(|| Value::String(ar.kind.clone()));
    }
    Ok(value)
}

fn api_error(error: kube::Error) -> RetrievalError {
    match error {
        kube::Error::Api(status) => RetrievalError::Api {
            reason: status.reason.to_string(),
            message: status.message.to_string(),
        },
        other => RetrievalError::Api {
            reason: "Unknown".to_string(),
            message: other.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kube::discovery::ApiResource;

    fn deployments() -> ResolvedResource {
        ResolvedResource {
            api_resource: ApiResource {
                group: "apps".to_string(),
                version: "v1".to_string(),
                api_version: "apps/v1".to_string(),
                kind: "Deployment".to_string(),
                plural: "deployments".to_string(),
            },
            namespaced: true,
        }
    }

    #[test]
    fn test_to_value_restores_type_fields() {
        let mut object = DynamicObject::new("web", &deployments().api_resource);
        object.types = None;
        object.metadata.namespace = Some("default".to_string());
        let value = to_value(object, &deployments()).unwrap();
        assert_eq!(value["apiVersion"], "apps/v1");
        assert_eq!(value["kind"], "Deployment");
        assert_eq!(value["metadata"]["name"], "web");
    }

    #[test]
    fn test_object_key() {
        let mut object = DynamicObject::new("web", &deployments().api_resource);
        assert_eq!(object_key(&object), "/web");
        object.metadata.namespace = Some("prod".to_string());
        assert_eq!(object_key(&object), "prod/web");
    }
}
