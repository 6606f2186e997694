//! Row converters for built-in Kubernetes kinds
//!
//! Payloads are decoded into their k8s-openapi types and rendered with the
//! same columns `kubectl get` prints. Timestamps are read from the raw JSON
//! so relative columns only depend on `RenderOptions::now`.

use super::format::{
    NONE, age_since, format_label_map, human_duration, join_or_none, object_age, parse_timestamp,
};
use super::registry::KindConverter;
use super::{ColumnDefinition, ConversionError, RenderOptions, RowFn};
use crate::models::ResourceKind;
use k8s_openapi::api::apps::v1::{DaemonSet, Deployment, ReplicaSet, StatefulSet};
use k8s_openapi::api::batch::v1::{CronJob, Job};
use k8s_openapi::api::core::v1::{
    ConfigMap, Namespace, Node, PersistentVolumeClaim, Pod, PodSpec, Secret, Service,
    ServiceAccount,
};
use k8s_openapi::api::networking::v1::Ingress;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::LabelSelector;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Decode a payload into its typed form
fn decode<K>(obj: &Value) -> Result<K, ConversionError>
where
    K: k8s_openapi::Resource + DeserializeOwned,
{
    serde_json::from_value(obj.clone()).map_err(|source| ConversionError::Decode {
        kind: K::KIND.to_string(),
        name: obj
            .get("metadata")
            .and_then(|m| m.get("name"))
            .and_then(|n| n.as_str())
            .unwrap_or_default()
            .to_string(),
        source,
    })
}

fn column_set(visible: &[&str], wide: &[&str]) -> Vec<ColumnDefinition> {
    visible
        .iter()
        .map(|c| ColumnDefinition::new(*c))
        .chain(wide.iter().map(|c| ColumnDefinition::wide(*c)))
        .collect()
}

fn name_of(name: &Option<String>) -> String {
    name.clone().unwrap_or_default()
}

fn or_none(value: Option<&String>) -> String {
    value
        .filter(|v| !v.is_empty())
        .cloned()
        .unwrap_or_else(|| NONE.to_string())
}

fn container_cells(spec: Option<&PodSpec>) -> [String; 2] {
    let containers = spec.map(|s| s.containers.as_slice()).unwrap_or_default();
    [
        join_or_none(containers.iter().map(|c| c.name.as_str())),
        join_or_none(containers.iter().map(|c| c.image.clone().unwrap_or_default())),
    ]
}

/// Render a label selector like `kubectl` (`app=web,tier in (a,b),!canary`)
pub fn format_label_selector(selector: Option<&LabelSelector>) -> String {
    let Some(selector) = selector else {
        return NONE.to_string();
    };
    let mut parts: Vec<String> = selector
        .match_labels
        .iter()
        .flatten()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect();
    for expr in selector.match_expressions.iter().flatten() {
        let values = expr.values.clone().unwrap_or_default().join(",");
        parts.push(match expr.operator.as_str() {
            "In" => format!("{} in ({})", expr.key, values),
            "NotIn" => format!("{} notin ({})", expr.key, values),
            "Exists" => expr.key.clone(),
            "DoesNotExist" => format!("!{}", expr.key),
            other => format!("{} {} ({})", expr.key, other, values),
        });
    }
    join_or_none(parts)
}

// Pods

fn pod_row(obj: &Value, options: &RenderOptions) -> Result<Vec<String>, ConversionError> {
    let pod: Pod = decode(obj)?;
    let spec = pod.spec.as_ref();
    let status = pod.status.as_ref();

    let total = spec.map(|s| s.containers.len()).unwrap_or(0);
    let mut ready = 0;
    let mut restarts = 0;
    let mut reason = status
        .and_then(|s| s.reason.clone().filter(|r| !r.is_empty()).or_else(|| s.phase.clone()))
        .unwrap_or_default();

    let mut initializing = false;
    let init_total = spec
        .and_then(|s| s.init_containers.as_ref())
        .map(Vec::len)
        .unwrap_or(0);
    for (i, container) in status
        .and_then(|s| s.init_container_statuses.as_ref())
        .into_iter()
        .flatten()
        .enumerate()
    {
        restarts += container.restart_count;
        let state = container.state.as_ref();
        let terminated = state.and_then(|s| s.terminated.as_ref());
        let waiting_reason = state
            .and_then(|s| s.waiting.as_ref())
            .and_then(|w| w.reason.clone())
            .filter(|r| !r.is_empty());

        if terminated.is_some_and(|t| t.exit_code == 0) {
            continue;
        }
        reason = match (terminated, waiting_reason) {
            (Some(t), _) => match t.reason.as_deref().filter(|r| !r.is_empty()) {
                Some(r) => format!("Init:{}", r),
                None if t.signal.unwrap_or(0) != 0 => {
                    format!("Init:Signal:{}", t.signal.unwrap_or(0))
                }
                None => format!("Init:ExitCode:{}", t.exit_code),
            },
            (None, Some(r)) if r != "PodInitializing" => format!("Init:{}", r),
            _ => format!("Init:{}/{}", i, init_total),
        };
        initializing = true;
        break;
    }

    if !initializing {
        restarts = 0;
        let mut has_running = false;
        for container in status
            .and_then(|s| s.container_statuses.as_ref())
            .into_iter()
            .flatten()
            .rev()
        {
            restarts += container.restart_count;
            let state = container.state.as_ref();
            let waiting = state.and_then(|s| s.waiting.as_ref());
            let terminated = state.and_then(|s| s.terminated.as_ref());
            if let Some(r) = waiting.and_then(|w| w.reason.clone()).filter(|r| !r.is_empty()) {
                reason = r;
            } else if let Some(t) = terminated {
                reason = match t.reason.clone().filter(|r| !r.is_empty()) {
                    Some(r) => r,
                    None if t.signal.unwrap_or(0) != 0 => {
                        format!("Signal:{}", t.signal.unwrap_or(0))
                    }
                    None => format!("ExitCode:{}", t.exit_code),
                };
            } else if container.ready && state.and_then(|s| s.running.as_ref()).is_some() {
                has_running = true;
                ready += 1;
            }
        }
        if reason == "Completed" && has_running {
            reason = "Running".to_string();
        }
    }

    if pod.metadata.deletion_timestamp.is_some() {
        reason = if status.and_then(|s| s.reason.as_deref()) == Some("NodeLost") {
            "Unknown".to_string()
        } else {
            "Terminating".to_string()
        };
    }

    let readiness_gates = spec
        .and_then(|s| s.readiness_gates.as_ref())
        .filter(|gates| !gates.is_empty())
        .map(|gates| {
            let conditions = status.and_then(|s| s.conditions.as_ref());
            let passed = gates
                .iter()
                .filter(|gate| {
                    conditions.into_iter().flatten().any(|c| {
                        c.type_ == gate.condition_type && c.status == "True"
                    })
                })
                .count();
            format!("{}/{}", passed, gates.len())
        })
        .unwrap_or_else(|| NONE.to_string());

    Ok(vec![
        name_of(&pod.metadata.name),
        format!("{}/{}", ready, total),
        reason,
        restarts.to_string(),
        object_age(obj, options.now),
        or_none(status.and_then(|s| s.pod_ip.as_ref())),
        or_none(spec.and_then(|s| s.node_name.as_ref())),
        or_none(status.and_then(|s| s.nominated_node_name.as_ref())),
        readiness_gates,
    ])
}

// Services

fn service_row(obj: &Value, options: &RenderOptions) -> Result<Vec<String>, ConversionError> {
    let service: Service = decode(obj)?;
    let spec = service.spec.as_ref();
    let service_type = spec
        .and_then(|s| s.type_.clone())
        .unwrap_or_else(|| "ClusterIP".to_string());

    let external_ips: Vec<String> = spec
        .and_then(|s| s.external_ips.clone())
        .unwrap_or_default();
    let external_ip = match service_type.as_str() {
        "ExternalName" => or_none(spec.and_then(|s| s.external_name.as_ref())),
        "LoadBalancer" => {
            let mut addresses: Vec<String> = service
                .status
                .as_ref()
                .and_then(|s| s.load_balancer.as_ref())
                .and_then(|lb| lb.ingress.as_ref())
                .into_iter()
                .flatten()
                .filter_map(|i| i.ip.clone().or_else(|| i.hostname.clone()))
                .collect();
            addresses.extend(external_ips);
            if addresses.is_empty() {
                "<pending>".to_string()
            } else {
                addresses.join(",")
            }
        }
        _ => join_or_none(external_ips),
    };

    let ports = join_or_none(spec.and_then(|s| s.ports.as_ref()).into_iter().flatten().map(
        |p| {
            let protocol = p.protocol.clone().unwrap_or_else(|| "TCP".to_string());
            match p.node_port {
                Some(node_port) => format!("{}:{}/{}", p.port, node_port, protocol),
                None => format!("{}/{}", p.port, protocol),
            }
        },
    ));

    Ok(vec![
        name_of(&service.metadata.name),
        service_type,
        or_none(spec.and_then(|s| s.cluster_ip.as_ref())),
        external_ip,
        ports,
        object_age(obj, options.now),
        spec.and_then(|s| s.selector.as_ref())
            .map(|s| format_label_map(s))
            .unwrap_or_else(|| NONE.to_string()),
    ])
}

// Config and identity

fn config_map_row(obj: &Value, options: &RenderOptions) -> Result<Vec<String>, ConversionError> {
    let config_map: ConfigMap = decode(obj)?;
    let count = config_map.data.as_ref().map(|d| d.len()).unwrap_or(0)
        + config_map.binary_data.as_ref().map(|d| d.len()).unwrap_or(0);
    Ok(vec![
        name_of(&config_map.metadata.name),
        count.to_string(),
        object_age(obj, options.now),
    ])
}

fn secret_row(obj: &Value, options: &RenderOptions) -> Result<Vec<String>, ConversionError> {
    let secret: Secret = decode(obj)?;
    let count = secret.data.as_ref().map(|d| d.len()).unwrap_or(0)
        + secret.string_data.as_ref().map(|d| d.len()).unwrap_or(0);
    Ok(vec![
        name_of(&secret.metadata.name),
        secret.type_.clone().unwrap_or_else(|| "Opaque".to_string()),
        count.to_string(),
        object_age(obj, options.now),
    ])
}

fn namespace_row(obj: &Value, options: &RenderOptions) -> Result<Vec<String>, ConversionError> {
    let namespace: Namespace = decode(obj)?;
    Ok(vec![
        name_of(&namespace.metadata.name),
        namespace
            .status
            .as_ref()
            .and_then(|s| s.phase.clone())
            .unwrap_or_else(|| "Active".to_string()),
        object_age(obj, options.now),
    ])
}

fn service_account_row(
    obj: &Value,
    options: &RenderOptions,
) -> Result<Vec<String>, ConversionError> {
    let account: ServiceAccount = decode(obj)?;
    Ok(vec![
        name_of(&account.metadata.name),
        account.secrets.as_ref().map(|s| s.len()).unwrap_or(0).to_string(),
        object_age(obj, options.now),
    ])
}

// Nodes

fn node_row(obj: &Value, options: &RenderOptions) -> Result<Vec<String>, ConversionError> {
    let node: Node = decode(obj)?;
    let status = node.status.as_ref();

    let ready = status
        .and_then(|s| s.conditions.as_ref())
        .and_then(|conditions| conditions.iter().find(|c| c.type_ == "Ready"));
    let mut node_status = match ready.map(|c| c.status.as_str()) {
        Some("True") => "Ready".to_string(),
        Some(_) => "NotReady".to_string(),
        None => "Unknown".to_string(),
    };
    if node.spec.as_ref().and_then(|s| s.unschedulable).unwrap_or(false) {
        node_status.push_str(",SchedulingDisabled");
    }

    let mut roles: Vec<String> = node
        .metadata
        .labels
        .iter()
        .flatten()
        .filter_map(|(key, value)| {
            if let Some(role) = key.strip_prefix("node-role.kubernetes.io/") {
                Some(role.to_string())
            } else if key == "kubernetes.io/role" {
                Some(value.clone())
            } else {
                None
            }
        })
        .filter(|r| !r.is_empty())
        .collect();
    roles.sort();
    roles.dedup();

    let address = |kind: &str| {
        join_or_none(
            status
                .and_then(|s| s.addresses.as_ref())
                .into_iter()
                .flatten()
                .filter(|a| a.type_ == kind)
                .map(|a| a.address.clone()),
        )
    };
    let info = status.and_then(|s| s.node_info.as_ref());
    let info_field = |f: fn(&k8s_openapi::api::core::v1::NodeSystemInfo) -> &String| {
        info.map(f).cloned().unwrap_or_else(|| NONE.to_string())
    };

    Ok(vec![
        name_of(&node.metadata.name),
        node_status,
        join_or_none(roles),
        object_age(obj, options.now),
        info_field(|i| &i.kubelet_version),
        address("InternalIP"),
        address("ExternalIP"),
        info_field(|i| &i.os_image),
        info_field(|i| &i.kernel_version),
        info_field(|i| &i.container_runtime_version),
    ])
}

// Storage

fn access_mode_short(mode: &str) -> &str {
    match mode {
        "ReadWriteOnce" => "RWO",
        "ReadOnlyMany" => "ROX",
        "ReadWriteMany" => "RWX",
        "ReadWriteOncePod" => "RWOP",
        other => other,
    }
}

fn pvc_row(obj: &Value, options: &RenderOptions) -> Result<Vec<String>, ConversionError> {
    let claim: PersistentVolumeClaim = decode(obj)?;
    let spec = claim.spec.as_ref();
    let status = claim.status.as_ref();

    let phase = if claim.metadata.deletion_timestamp.is_some() {
        "Terminating".to_string()
    } else {
        status.and_then(|s| s.phase.clone()).unwrap_or_default()
    };
    let capacity = status
        .and_then(|s| s.capacity.as_ref())
        .and_then(|c| c.get("storage"))
        .map(|q| q.0.clone())
        .unwrap_or_default();
    let access_modes = status
        .and_then(|s| s.access_modes.as_ref())
        .into_iter()
        .flatten()
        .map(|m| access_mode_short(m).to_string())
        .collect::<Vec<_>>()
        .join(",");

    Ok(vec![
        name_of(&claim.metadata.name),
        phase,
        spec.and_then(|s| s.volume_name.clone()).unwrap_or_default(),
        capacity,
        access_modes,
        spec.and_then(|s| s.storage_class_name.clone())
            .unwrap_or_else(|| "<unset>".to_string()),
        object_age(obj, options.now),
        spec.and_then(|s| s.volume_mode.clone())
            .unwrap_or_else(|| "Filesystem".to_string()),
    ])
}

// Workloads

fn deployment_row(obj: &Value, options: &RenderOptions) -> Result<Vec<String>, ConversionError> {
    let deployment: Deployment = decode(obj)?;
    let spec = deployment.spec.as_ref();
    let status = deployment.status.as_ref();

    let desired = spec.and_then(|s| s.replicas).unwrap_or(0);
    let ready = status.and_then(|s| s.ready_replicas).unwrap_or(0);
    let [containers, images] = container_cells(spec.and_then(|s| s.template.spec.as_ref()));

    Ok(vec![
        name_of(&deployment.metadata.name),
        format!("{}/{}", ready, desired),
        status.and_then(|s| s.updated_replicas).unwrap_or(0).to_string(),
        status.and_then(|s| s.available_replicas).unwrap_or(0).to_string(),
        object_age(obj, options.now),
        containers,
        images,
        format_label_selector(spec.map(|s| &s.selector)),
    ])
}

fn replica_set_row(obj: &Value, options: &RenderOptions) -> Result<Vec<String>, ConversionError> {
    let replica_set: ReplicaSet = decode(obj)?;
    let spec = replica_set.spec.as_ref();
    let status = replica_set.status.as_ref();
    let [containers, images] = container_cells(
        spec.and_then(|s| s.template.as_ref())
            .and_then(|t| t.spec.as_ref()),
    );

    Ok(vec![
        name_of(&replica_set.metadata.name),
        spec.and_then(|s| s.replicas).unwrap_or(0).to_string(),
        status.map(|s| s.replicas).unwrap_or(0).to_string(),
        status.and_then(|s| s.ready_replicas).unwrap_or(0).to_string(),
        object_age(obj, options.now),
        containers,
        images,
        format_label_selector(spec.map(|s| &s.selector)),
    ])
}

fn stateful_set_row(obj: &Value, options: &RenderOptions) -> Result<Vec<String>, ConversionError> {
    let stateful_set: StatefulSet = decode(obj)?;
    let spec = stateful_set.spec.as_ref();
    let ready = stateful_set
        .status
        .as_ref()
        .and_then(|s| s.ready_replicas)
        .unwrap_or(0);
    let [containers, images] = container_cells(spec.and_then(|s| s.template.spec.as_ref()));

    Ok(vec![
        name_of(&stateful_set.metadata.name),
        format!("{}/{}", ready, spec.and_then(|s| s.replicas).unwrap_or(1)),
        object_age(obj, options.now),
        containers,
        images,
    ])
}

fn daemon_set_row(obj: &Value, options: &RenderOptions) -> Result<Vec<String>, ConversionError> {
    let daemon_set: DaemonSet = decode(obj)?;
    let spec = daemon_set.spec.as_ref();
    let status = daemon_set.status.as_ref();
    let pod_spec = spec.and_then(|s| s.template.spec.as_ref());
    let [containers, images] = container_cells(pod_spec);

    Ok(vec![
        name_of(&daemon_set.metadata.name),
        status.map(|s| s.desired_number_scheduled).unwrap_or(0).to_string(),
        status.map(|s| s.current_number_scheduled).unwrap_or(0).to_string(),
        status.map(|s| s.number_ready).unwrap_or(0).to_string(),
        status.and_then(|s| s.updated_number_scheduled).unwrap_or(0).to_string(),
        status.and_then(|s| s.number_available).unwrap_or(0).to_string(),
        pod_spec
            .and_then(|s| s.node_selector.as_ref())
            .map(|s| format_label_map(s))
            .unwrap_or_else(|| NONE.to_string()),
        object_age(obj, options.now),
        containers,
        images,
        format_label_selector(spec.map(|s| &s.selector)),
    ])
}

fn job_row(obj: &Value, options: &RenderOptions) -> Result<Vec<String>, ConversionError> {
    let job: Job = decode(obj)?;
    let spec = job.spec.as_ref();
    let succeeded = job.status.as_ref().and_then(|s| s.succeeded).unwrap_or(0);

    let completions = match spec.and_then(|s| s.completions) {
        Some(completions) => format!("{}/{}", succeeded, completions),
        None => match spec.and_then(|s| s.parallelism).unwrap_or(0) {
            parallelism if parallelism > 1 => format!("{}/1 of {}", succeeded, parallelism),
            _ => format!("{}/1", succeeded),
        },
    };

    let status = obj.get("status");
    let start = parse_timestamp(status.and_then(|s| s.get("startTime")));
    let completion = parse_timestamp(status.and_then(|s| s.get("completionTime")));
    let duration = match (start, completion) {
        (Some(start), Some(end)) => human_duration(end.signed_duration_since(start)),
        (Some(start), None) => human_duration(options.now.signed_duration_since(start)),
        (None, _) => String::new(),
    };
    let [containers, images] = container_cells(spec.and_then(|s| s.template.spec.as_ref()));

    Ok(vec![
        name_of(&job.metadata.name),
        completions,
        duration,
        object_age(obj, options.now),
        containers,
        images,
        format_label_selector(spec.and_then(|s| s.selector.as_ref())),
    ])
}

fn cron_job_row(obj: &Value, options: &RenderOptions) -> Result<Vec<String>, ConversionError> {
    let cron_job: CronJob = decode(obj)?;
    let spec = cron_job.spec.as_ref();
    let job_spec = spec.and_then(|s| s.job_template.spec.as_ref());
    let [containers, images] = container_cells(job_spec.and_then(|s| s.template.spec.as_ref()));

    let last_schedule = obj
        .get("status")
        .and_then(|s| s.get("lastScheduleTime"))
        .map(|ts| age_since(Some(ts), options.now))
        .unwrap_or_else(|| NONE.to_string());

    Ok(vec![
        name_of(&cron_job.metadata.name),
        spec.map(|s| s.schedule.clone()).unwrap_or_default(),
        or_none(spec.and_then(|s| s.time_zone.as_ref())),
        if spec.and_then(|s| s.suspend).unwrap_or(false) {
            "True"
        } else {
            "False"
        }
        .to_string(),
        cron_job
            .status
            .as_ref()
            .and_then(|s| s.active.as_ref())
            .map(|a| a.len())
            .unwrap_or(0)
            .to_string(),
        last_schedule,
        object_age(obj, options.now),
        containers,
        images,
        format_label_selector(job_spec.and_then(|s| s.selector.as_ref())),
    ])
}

// Networking

fn ingress_row(obj: &Value, options: &RenderOptions) -> Result<Vec<String>, ConversionError> {
    let ingress: Ingress = decode(obj)?;
    let spec = ingress.spec.as_ref();

    let hosts: Vec<String> = spec
        .and_then(|s| s.rules.as_ref())
        .into_iter()
        .flatten()
        .filter_map(|r| r.host.clone())
        .collect();
    let hosts = if hosts.is_empty() {
        "*".to_string()
    } else {
        hosts.join(",")
    };

    let address = ingress
        .status
        .as_ref()
        .and_then(|s| s.load_balancer.as_ref())
        .and_then(|lb| lb.ingress.as_ref())
        .into_iter()
        .flatten()
        .filter_map(|i| i.ip.clone().or_else(|| i.hostname.clone()))
        .collect::<Vec<_>>()
        .join(",");

    let has_tls = spec
        .and_then(|s| s.tls.as_ref())
        .is_some_and(|tls| !tls.is_empty());

    Ok(vec![
        name_of(&ingress.metadata.name),
        or_none(spec.and_then(|s| s.ingress_class_name.as_ref())),
        hosts,
        address,
        if has_tls { "80, 443" } else { "80" }.to_string(),
        object_age(obj, options.now),
    ])
}

/// Converter for a built-in kind, None for kinds handled elsewhere
pub fn converter(kind: ResourceKind) -> Option<KindConverter> {
    let (columns, convert) = match kind {
        ResourceKind::Pod => (
            column_set(
                &["NAME", "READY", "STATUS", "RESTARTS", "AGE"],
                &["IP", "NODE", "NOMINATED NODE", "READINESS GATES"],
            ),
            pod_row as RowFn,
        ),
        ResourceKind::Service => (
            column_set(
                &["NAME", "TYPE", "CLUSTER-IP", "EXTERNAL-IP", "PORT(S)", "AGE"],
                &["SELECTOR"],
            ),
            service_row as RowFn,
        ),
        ResourceKind::ConfigMap => (
            column_set(&["NAME", "DATA", "AGE"], &[]),
            config_map_row as RowFn,
        ),
        ResourceKind::Secret => (
            column_set(&["NAME", "TYPE", "DATA", "AGE"], &[]),
            secret_row as RowFn,
        ),
        ResourceKind::Namespace => (
            column_set(&["NAME", "STATUS", "AGE"], &[]),
            namespace_row as RowFn,
        ),
        ResourceKind::Node => (
            column_set(
                &["NAME", "STATUS", "ROLES", "AGE", "VERSION"],
                &[
                    "INTERNAL-IP",
                    "EXTERNAL-IP",
                    "OS-IMAGE",
                    "KERNEL-VERSION",
                    "CONTAINER-RUNTIME",
                ],
            ),
            node_row as RowFn,
        ),
        ResourceKind::ServiceAccount => (
            column_set(&["NAME", "SECRETS", "AGE"], &[]),
            service_account_row as RowFn,
        ),
        ResourceKind::PersistentVolumeClaim => (
            column_set(
                &[
                    "NAME",
                    "STATUS",
                    "VOLUME",
                    "CAPACITY",
                    "ACCESS MODES",
                    "STORAGECLASS",
                    "AGE",
                ],
                &["VOLUMEMODE"],
            ),
            pvc_row as RowFn,
        ),
        ResourceKind::Deployment => (
            column_set(
                &["NAME", "READY", "UP-TO-DATE", "AVAILABLE", "AGE"],
                &["CONTAINERS", "IMAGES", "SELECTOR"],
            ),
            deployment_row as RowFn,
        ),
        ResourceKind::ReplicaSet => (
            column_set(
                &["NAME", "DESIRED", "CURRENT", "READY", "AGE"],
                &["CONTAINERS", "IMAGES", "SELECTOR"],
            ),
            replica_set_row as RowFn,
        ),
        ResourceKind::StatefulSet => (
            column_set(&["NAME", "READY", "AGE"], &["CONTAINERS", "IMAGES"]),
            stateful_set_row as RowFn,
        ),
        ResourceKind::DaemonSet => (
            column_set(
                &[
                    "NAME",
                    "DESIRED",
                    "CURRENT",
                    "READY",
                    "UP-TO-DATE",
                    "AVAILABLE",
                    "NODE SELECTOR",
                    "AGE",
                ],
                &["CONTAINERS", "IMAGES", "SELECTOR"],
            ),
            daemon_set_row as RowFn,
        ),
        ResourceKind::Job => (
            column_set(
                &["NAME", "COMPLETIONS", "DURATION", "AGE"],
                &["CONTAINERS", "IMAGES", "SELECTOR"],
            ),
            job_row as RowFn,
        ),
        ResourceKind::CronJob => (
            column_set(
                &[
                    "NAME",
                    "SCHEDULE",
                    "TIMEZONE",
                    "SUSPEND",
                    "ACTIVE",
                    "LAST SCHEDULE",
                    "AGE",
                ],
                &["CONTAINERS", "IMAGES", "SELECTOR"],
            ),
            cron_job_row as RowFn,
        ),
        ResourceKind::Ingress => (
            column_set(&["NAME", "CLASS", "HOSTS", "ADDRESS", "PORTS", "AGE"], &[]),
            ingress_row as RowFn,
        ),
        ResourceKind::GitRepository | ResourceKind::Kustomization | ResourceKind::HelmRelease => {
            return None;
        }
    };
    Some(KindConverter::new(kind.api_version(), columns, convert))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use serde_json::json;

    fn options() -> RenderOptions {
        RenderOptions::at(
            DateTime::parse_from_rfc3339("2024-05-01T12:00:00Z")
                .unwrap()
                .with_timezone(&Utc),
        )
    }

    #[test]
    fn test_every_column_schema_matches_row_width() {
        for kind in ResourceKind::all() {
            let Some(converter) = converter(*kind) else {
                continue;
            };
            let obj = json!({
                "apiVersion": kind.api_version(),
                "kind": kind.as_str(),
                "metadata": {"name": "sample"}
            });
            let row = (converter.convert)(&obj, &options()).unwrap();
            assert_eq!(row.len(), converter.columns.len(), "{}", kind);
        }
    }

    #[test]
    fn test_pod_row() {
        let pod = json!({
            "apiVersion": "v1",
            "kind": "Pod",
            "metadata": {"name": "web-1", "creationTimestamp": "2024-05-01T11:55:00Z"},
            "spec": {"nodeName": "node-a", "containers": [{"name": "app"}, {"name": "sidecar"}]},
            "status": {
                "phase": "Running",
                "podIP": "10.0.0.5",
                "containerStatuses": [
                    {"name": "app", "ready": true, "restartCount": 2, "image": "app:1", "imageID": "",
                     "state": {"running": {}}},
                    {"name": "sidecar", "ready": false, "restartCount": 1, "image": "side:1", "imageID": "",
                     "state": {"waiting": {"reason": "CrashLoopBackOff"}}}
                ]
            }
        });
        let row = pod_row(&pod, &options()).unwrap();
        assert_eq!(
            row,
            vec![
                "web-1",
                "1/2",
                "CrashLoopBackOff",
                "3",
                "5m",
                "10.0.0.5",
                "node-a",
                "<none>",
                "<none>"
            ]
        );
    }

    #[test]
    fn test_pod_init_and_terminating_status() {
        let pod = json!({
            "apiVersion": "v1",
            "kind": "Pod",
            "metadata": {"name": "init"},
            "spec": {
                "initContainers": [{"name": "setup"}, {"name": "migrate"}],
                "containers": [{"name": "app"}]
            },
            "status": {
                "phase": "Pending",
                "initContainerStatuses": [
                    {"name": "setup", "ready": true, "restartCount": 0, "image": "", "imageID": "",
                     "state": {"terminated": {"exitCode": 0}}},
                    {"name": "migrate", "ready": false, "restartCount": 0, "image": "", "imageID": "",
                     "state": {"running": {}}}
                ]
            }
        });
        assert_eq!(pod_row(&pod, &options()).unwrap()[2], "Init:1/2");

        let mut terminating = pod.clone();
        terminating["metadata"]["deletionTimestamp"] = json!("2024-05-01T11:59:00Z");
        assert_eq!(pod_row(&terminating, &options()).unwrap()[2], "Terminating");
    }

    #[test]
    fn test_service_row() {
        let service = json!({
            "apiVersion": "v1",
            "kind": "Service",
            "metadata": {"name": "web"},
            "spec": {
                "type": "NodePort",
                "clusterIP": "10.96.0.10",
                "selector": {"app": "web"},
                "ports": [
                    {"port": 80, "nodePort": 30080, "protocol": "TCP"},
                    {"port": 53, "protocol": "UDP"}
                ]
            }
        });
        let row = service_row(&service, &options()).unwrap();
        assert_eq!(row[1], "NodePort");
        assert_eq!(row[2], "10.96.0.10");
        assert_eq!(row[3], "<none>");
        assert_eq!(row[4], "80:30080/TCP,53/UDP");
        assert_eq!(row[6], "app=web");
    }

    #[test]
    fn test_pending_load_balancer() {
        let service = json!({
            "apiVersion": "v1", "kind": "Service", "metadata": {"name": "lb"},
            "spec": {"type": "LoadBalancer"}
        });
        assert_eq!(service_row(&service, &options()).unwrap()[3], "<pending>");
    }

    #[test]
    fn test_deployment_row() {
        let deployment = json!({
            "apiVersion": "apps/v1",
            "kind": "Deployment",
            "metadata": {"name": "web", "creationTimestamp": "2024-04-28T12:00:00Z"},
            "spec": {
                "replicas": 3,
                "selector": {"matchLabels": {"app": "web"}},
                "template": {"spec": {"containers": [{"name": "app", "image": "nginx:1.27"}]}}
            },
            "status": {"readyReplicas": 2, "updatedReplicas": 3, "availableReplicas": 2}
        });
        let row = deployment_row(&deployment, &options()).unwrap();
        assert_eq!(
            row,
            vec!["web", "2/3", "3", "2", "3d", "app", "nginx:1.27", "app=web"]
        );
    }

    #[test]
    fn test_job_completions_and_duration() {
        let job = json!({
            "apiVersion": "batch/v1",
            "kind": "Job",
            "metadata": {"name": "backup"},
            "spec": {"completions": 2, "template": {"spec": {"containers": []}}},
            "status": {
                "succeeded": 1,
                "startTime": "2024-05-01T11:00:00Z",
                "completionTime": "2024-05-01T11:00:45Z"
            }
        });
        let row = job_row(&job, &options()).unwrap();
        assert_eq!(row[1], "1/2");
        assert_eq!(row[2], "45s");
    }

    #[test]
    fn test_node_status_and_roles() {
        let node = json!({
            "apiVersion": "v1",
            "kind": "Node",
            "metadata": {"name": "cp-1", "labels": {
                "node-role.kubernetes.io/control-plane": "",
                "kubernetes.io/hostname": "cp-1"
            }},
            "spec": {"unschedulable": true},
            "status": {"conditions": [{"type": "Ready", "status": "True"}]}
        });
        let row = node_row(&node, &options()).unwrap();
        assert_eq!(row[1], "Ready,SchedulingDisabled");
        assert_eq!(row[2], "control-plane");
    }

    #[test]
    fn test_decode_failure_is_conversion_error() {
        let bad = json!({
            "apiVersion": "v1",
            "kind": "ConfigMap",
            "metadata": {"name": "c"},
            "data": 5
        });
        let err = config_map_row(&bad, &options()).unwrap_err();
        assert!(matches!(err, ConversionError::Decode { ref kind, .. } if kind == "ConfigMap"));
        assert!(err.to_string().starts_with("unable to decode ConfigMap \"c\""));
    }

    #[test]
    fn test_format_label_selector() {
        let selector: LabelSelector = serde_json::from_value(json!({
            "matchLabels": {"app": "web"},
            "matchExpressions": [
                {"key": "tier", "operator": "In", "values": ["fe", "be"]},
                {"key": "canary", "operator": "DoesNotExist"}
            ]
        }))
        .unwrap();
        assert_eq!(
            format_label_selector(Some(&selector)),
            "app=web,tier in (fe,be),!canary"
        );
        assert_eq!(format_label_selector(None), "<none>");
    }
}
