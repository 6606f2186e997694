//! Cluster access
//!
//! Builds the API client from the kubeconfig (or in-cluster configuration)
//! and provides `KubeSource`, the object source for live listings.
//!
//! HTTP(S) proxies are taken from the standard `HTTPS_PROXY` / `NO_PROXY`
//! variables. Private and cluster-internal API server hosts are added to
//! `NO_PROXY` so that a corporate proxy is never asked to reach them.

pub mod discovery;
pub mod source;

pub use discovery::{ResolvedResource, ResourceResolver};
pub use source::KubeSource;

use anyhow::{Context, Result};
use kube::config::KubeConfigOptions;
use kube::{Client, Config};

/// A client plus the namespace its context defaults to
pub struct Connection {
    pub client: Client,
    pub default_namespace: String,
}

/// Connect using the named kubeconfig context, or the current one
pub async fn connect(context: Option<&str>) -> Result<Connection> {
    let config = match context {
        Some(context) => {
            let options = KubeConfigOptions {
                context: Some(context.to_string()),
                ..Default::default()
            };
            Config::from_kubeconfig(&options)
                .await
                .with_context(|| format!("failed to load kubeconfig context \"{}\"", context))?
        }
        None => Config::infer()
            .await
            .context("failed to load cluster configuration")?,
    };

    if let Some(host) = config.cluster_url.host() {
        ensure_no_proxy_bypass(host);
    }
    tracing::debug!(
        "Connecting to {} (default namespace {})",
        config.cluster_url,
        config.default_namespace
    );

    let default_namespace = config.default_namespace.clone();
    let client = Client::try_from(config).context("failed to create cluster client")?;
    Ok(Connection {
        client,
        default_namespace,
    })
}

/// Add an internal API server host to NO_PROXY if nothing covers it yet
fn ensure_no_proxy_bypass(host: &str) {
    if !is_internal_host(host) {
        return;
    }
    let current = std::env::var("NO_PROXY")
        .ok()
        .filter(|v| !v.is_empty())
        .or_else(|| std::env::var("no_proxy").ok())
        .unwrap_or_default();
    if no_proxy_contains(&current, host) {
        return;
    }

    let updated = if current.is_empty() {
        host.to_string()
    } else {
        format!("{},{}", current, host)
    };
    tracing::debug!("Bypassing proxy for {}", host);
    // SAFETY: runs once while connecting, before any request task reads the
    // proxy environment.
    unsafe {
        std::env::set_var("NO_PROXY", &updated);
        std::env::set_var("no_proxy", &updated);
    }
}

/// Loopback, private-range and cluster-internal hosts
fn is_internal_host(host: &str) -> bool {
    let host = host.trim_start_matches('[').trim_end_matches(']');
    if let Ok(ip) = host.parse::<std::net::IpAddr>() {
        return match ip {
            std::net::IpAddr::V4(v4) => v4.is_private() || v4.is_loopback(),
            std::net::IpAddr::V6(v6) => v6.is_loopback(),
        };
    }
    host == "localhost"
        || [".local", ".internal", ".cluster.local"]
            .iter()
            .any(|suffix| host.ends_with(suffix))
}

/// Whether a NO_PROXY list already covers the host
///
/// Entries match the host itself and its subdomains; a leading dot is
/// ignored.
fn no_proxy_contains(no_proxy: &str, host: &str) -> bool {
    no_proxy
        .split(',')
        .map(|entry| entry.trim().trim_start_matches('.'))
        .filter(|entry| !entry.is_empty())
        .any(|entry| entry == "*" || host == entry || host.ends_with(&format!(".{}", entry)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_internal_hosts() {
        assert!(is_internal_host("10.0.0.1"));
        assert!(is_internal_host("172.16.4.2"));
        assert!(is_internal_host("192.168.1.1"));
        assert!(is_internal_host("127.0.0.1"));
        assert!(is_internal_host("[::1]"));
        assert!(is_internal_host("localhost"));
        assert!(is_internal_host("api.cluster.local"));
        assert!(is_internal_host("k8s.corp.internal"));
    }

    #[test]
    fn test_public_hosts() {
        assert!(!is_internal_host("172.32.0.1"));
        assert!(!is_internal_host("8.8.8.8"));
        assert!(!is_internal_host("api.example.com"));
        assert!(!is_internal_host("kubernetes.io"));
    }

    #[test]
    fn test_no_proxy_matching() {
        assert!(no_proxy_contains("example.com", "example.com"));
        assert!(no_proxy_contains("localhost, example.com", "api.example.com"));
        assert!(no_proxy_contains(".example.com", "example.com"));
        assert!(no_proxy_contains("*", "anything.io"));
        assert!(!no_proxy_contains(".prod.example.com", "devprod.example.com"));
        assert!(!no_proxy_contains("", "example.com"));
        assert!(!no_proxy_contains("other.com", "example.com"));
    }
}
