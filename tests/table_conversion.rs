//! Table conversion tests
//!
//! Conversion is total: any JSON object with a type converts to a table,
//! through a registered converter or the generic fallback.

use chrono::{TimeZone, Utc};
use kget::models::RetrievedObject;
use kget::table::sort::sort_table;
use kget::table::{ApiVersionNormalizer, KindRegistry, RenderOptions, Table};
use serde_json::{Value, json};

fn options() -> RenderOptions {
    RenderOptions::at(Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap())
}

fn convert(value: Value) -> Table {
    let object = RetrievedObject::from_value(value).unwrap();
    KindRegistry::with_builtin_kinds()
        .convert(&object, &options(), &ApiVersionNormalizer)
        .unwrap()
}

fn column<'a>(table: &'a Table, name: &str) -> Vec<&'a str> {
    let index = table
        .columns
        .iter()
        .position(|c| c.name == name)
        .unwrap_or_else(|| panic!("no {} column", name));
    table
        .rows
        .iter()
        .map(|r| r.cells[index].as_str())
        .collect()
}

#[test]
fn test_arbitrary_payloads_convert() {
    let payloads = vec![
        json!({"apiVersion": "example.com/v1", "kind": "Widget"}),
        json!({"apiVersion": "example.com/v1", "kind": "Widget", "metadata": {}}),
        json!({"apiVersion": "v1", "kind": "Mystery", "metadata": {"name": "m"}, "count": 3}),
        json!({"apiVersion": "example.com/v1", "kind": "WidgetList", "items": []}),
        json!({"apiVersion": "v1", "kind": "List", "items": [
            {"apiVersion": "v1", "kind": "Mystery", "metadata": {"name": "a"}},
            {"apiVersion": "example.com/v1", "kind": "Widget", "metadata": {"name": "b"}}
        ]}),
    ];
    for payload in payloads {
        let table = convert(payload.clone());
        assert_eq!(table.columns[0].name, "NAME", "payload {}", payload);
        for row in &table.rows {
            assert_eq!(row.cells.len(), table.columns.len(), "payload {}", payload);
        }
    }
}

#[test]
fn test_missing_name_and_age_have_placeholders() {
    let table = convert(json!({"apiVersion": "example.com/v1", "kind": "Widget"}));
    assert_eq!(column(&table, "NAME"), vec!["<none>"]);
    assert_eq!(column(&table, "AGE"), vec!["<unknown>"]);
}

#[test]
fn test_empty_list_has_no_rows() {
    let table = convert(json!({"apiVersion": "v1", "kind": "PodList", "items": []}));
    assert!(table.is_empty());
    assert_eq!(table.columns[1].name, "READY");
}

#[test]
fn test_pod_status_columns() {
    let table = convert(json!({
        "apiVersion": "v1",
        "kind": "PodList",
        "items": [
            {
                "metadata": {"name": "running", "creationTimestamp": "2024-01-01T11:00:00Z"},
                "spec": {"containers": [{"name": "app"}, {"name": "sidecar"}]},
                "status": {
                    "phase": "Running",
                    "containerStatuses": [
                        {"name": "app", "image": "app", "imageID": "", "ready": true,
                         "restartCount": 2, "state": {"running": {}}},
                        {"name": "sidecar", "image": "sidecar", "imageID": "", "ready": false,
                         "restartCount": 0, "state": {"waiting": {"reason": "CrashLoopBackOff"}}}
                    ]
                }
            },
            {
                "metadata": {"name": "init", "creationTimestamp": "2024-01-01T11:59:30Z"},
                "spec": {"initContainers": [{"name": "setup"}], "containers": [{"name": "app"}]},
                "status": {
                    "phase": "Pending",
                    "initContainerStatuses": [
                        {"name": "setup", "image": "setup", "imageID": "", "ready": false,
                         "restartCount": 0, "state": {"running": {}}}
                    ]
                }
            }
        ]
    }));

    assert_eq!(column(&table, "NAME"), vec!["running", "init"]);
    assert_eq!(column(&table, "READY"), vec!["1/2", "0/1"]);
    assert_eq!(column(&table, "STATUS"), vec!["CrashLoopBackOff", "Init:0/1"]);
    assert_eq!(column(&table, "RESTARTS"), vec!["2", "0"]);
    assert_eq!(column(&table, "AGE"), vec!["60m", "30s"]);
}

#[test]
fn test_service_columns() {
    let table = convert(json!({
        "apiVersion": "v1",
        "kind": "Service",
        "metadata": {"name": "web"},
        "spec": {
            "type": "ClusterIP",
            "clusterIP": "10.0.0.10",
            "ports": [{"port": 80, "protocol": "TCP"}, {"port": 443, "protocol": "TCP"}],
            "selector": {"app": "web"}
        }
    }));

    assert_eq!(column(&table, "TYPE"), vec!["ClusterIP"]);
    assert_eq!(column(&table, "CLUSTER-IP"), vec!["10.0.0.10"]);
    assert_eq!(column(&table, "EXTERNAL-IP"), vec!["<none>"]);
    assert_eq!(column(&table, "PORT(S)"), vec!["80/TCP,443/TCP"]);
}

#[test]
fn test_flux_ready_condition() {
    let table = convert(json!({
        "apiVersion": "kustomize.toolkit.fluxcd.io/v1",
        "kind": "Kustomization",
        "metadata": {"name": "apps", "namespace": "flux-system"},
        "spec": {"path": "./apps", "prune": true, "suspend": true},
        "status": {
            "lastAppliedRevision": "main@sha1:abc",
            "conditions": [{"type": "Ready", "status": "False", "message": "build failed"}]
        }
    }));

    assert_eq!(column(&table, "READY"), vec!["False"]);
    assert_eq!(column(&table, "STATUS"), vec!["build failed"]);
    assert_eq!(column(&table, "PATH"), vec!["./apps"]);
    assert_eq!(column(&table, "REVISION"), vec!["main@sha1:abc"]);
    assert_eq!(column(&table, "SUSPENDED"), vec!["True"]);
}

#[test]
fn test_bare_list_dispatches_on_common_kind() {
    let table = convert(json!({
        "apiVersion": "v1",
        "kind": "List",
        "items": [
            {"apiVersion": "v1", "kind": "ConfigMap", "metadata": {"name": "a"}, "data": {"k": "v"}},
            {"apiVersion": "v1", "kind": "ConfigMap", "metadata": {"name": "b"}}
        ]
    }));
    assert_eq!(column(&table, "DATA"), vec!["1", "0"]);
}

#[test]
fn test_generic_columns_are_stable() {
    let table = convert(json!({
        "apiVersion": "example.com/v1",
        "kind": "WidgetList",
        "items": [
            {"metadata": {"name": "a"}, "zone": "b", "color": "red"},
            {"metadata": {"name": "b"}, "color": "blue", "replicaCount": 2, "tags": ["x"]}
        ]
    }));
    let headers: Vec<&str> = table.columns.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(headers, vec!["NAME", "COLOR", "REPLICA-COUNT", "ZONE", "AGE", "TAGS"]);
    assert_eq!(column(&table, "ZONE"), vec!["b", "<none>"]);
    assert_eq!(table.columns[5].priority, 1);
}

#[test]
fn test_sort_rows_missing_values_last() {
    let mut table = convert(json!({
        "apiVersion": "v1",
        "kind": "ConfigMapList",
        "items": [
            {"metadata": {"name": "c", "labels": {"rank": "2"}}},
            {"metadata": {"name": "a"}},
            {"metadata": {"name": "b", "labels": {"rank": "1"}}}
        ]
    }));
    sort_table(&mut table, "{.metadata.labels.rank}");
    assert_eq!(column(&table, "NAME"), vec!["b", "c", "a"]);

    sort_table(&mut table, ".metadata.name");
    assert_eq!(column(&table, "NAME"), vec!["a", "b", "c"]);
}
