//! Snapshot tests for rendered listings
//!
//! These tests use insta to capture the exact text a listing writes.
//! Run `cargo insta review` to review and accept snapshot changes.

use chrono::{TimeZone, Utc};
use insta::assert_snapshot;
use kget::models::{NamespaceScope, QuerySpec};
use kget::pipeline::{GetRunner, OutputOptions};
use kget::source::ManifestSource;
use serde_json::{Value, json};
use std::path::PathBuf;

fn config_map(name: &str) -> Value {
    json!({
        "apiVersion": "v1",
        "data": {"key": "value"},
        "kind": "ConfigMap",
        "metadata": {
            "creationTimestamp": "2024-01-01T11:55:00Z",
            "name": name,
            "namespace": "default"
        }
    })
}

fn secret(name: &str) -> Value {
    json!({
        "apiVersion": "v1",
        "kind": "Secret",
        "metadata": {
            "creationTimestamp": "2024-01-01T11:55:00Z",
            "name": name,
            "namespace": "default"
        }
    })
}

fn namespace() -> NamespaceScope {
    NamespaceScope::Single {
        namespace: "default".to_string(),
        explicit: false,
    }
}

async fn render(objects: Vec<Value>, query: QuerySpec, options: OutputOptions) -> String {
    let runner = GetRunner::new(ManifestSource::from_objects(objects))
        .with_render_time(Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap());
    let mut out = Vec::new();
    runner.run(&query, &options, &mut out).await.unwrap();
    String::from_utf8(out).unwrap()
}

fn configmaps() -> QuerySpec {
    QuerySpec::from_args(
        &["configmaps".to_string()],
        Vec::new(),
        namespace(),
        None,
        None,
    )
    .unwrap()
}

#[tokio::test]
async fn test_configmap_table() {
    let out = render(
        vec![config_map("alpha"), config_map("beta-config")],
        configmaps(),
        OutputOptions::default(),
    )
    .await;
    assert_snapshot!(out, @r"
    NAME          DATA   AGE
    alpha         1      5m
    beta-config   1      5m
    ");
}

#[tokio::test]
async fn test_mixed_kinds_from_files() {
    let query = QuerySpec::from_args(
        &[],
        vec![PathBuf::from("manifests.yaml")],
        namespace(),
        None,
        None,
    )
    .unwrap();
    let out = render(
        vec![config_map("a"), secret("s")],
        query,
        OutputOptions::default(),
    )
    .await;
    assert_snapshot!(out, @r"
    NAME          DATA   AGE
    configmap/a   1      5m

    NAME       TYPE     DATA   AGE
    secret/s   Opaque   0      5m
    ");
}

#[tokio::test]
async fn test_yaml_list_document() {
    let objects = ["a", "b"]
        .iter()
        .map(|name| {
            json!({
                "apiVersion": "v1",
                "data": {"key": "value"},
                "kind": "ConfigMap",
                "metadata": {"name": name, "namespace": "default"}
            })
        })
        .collect();
    let options = OutputOptions {
        format: "yaml".to_string(),
        ..Default::default()
    };
    let out = render(objects, configmaps(), options).await;
    assert_snapshot!(out, @r"
    apiVersion: v1
    kind: List
    metadata:
      resourceVersion: ''
    items:
    - apiVersion: v1
      data:
        key: value
      kind: ConfigMap
      metadata:
        name: a
        namespace: default
    - apiVersion: v1
      data:
        key: value
      kind: ConfigMap
      metadata:
        name: b
        namespace: default
    ");
}
