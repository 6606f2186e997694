//! Resource type resolution
//!
//! Maps command-line resource tokens (`pods`, `deploy`, `certificates`,
//! `certificates.cert-manager.io`) to API resources. Built-in kinds resolve
//! without I/O; anything else goes through the server's discovery API, which
//! runs at most once per source.

use crate::models::ResourceKind;
use crate::models::object::split_api_version;
use crate::source::SourceError;
use kube::Client;
use kube::discovery::{ApiResource, Discovery, Scope};
use tokio::sync::OnceCell;

/// An API resource and its scope
#[derive(Debug, Clone)]
pub struct ResolvedResource {
    pub api_resource: ApiResource,
    pub namespaced: bool,
}

impl ResolvedResource {
    fn builtin(kind: ResourceKind) -> Self {
        let api_version = kind.api_version();
        let (group, version) = split_api_version(api_version);
        Self {
            api_resource: ApiResource {
                group: group.to_string(),
                version: version.to_string(),
                api_version: api_version.to_string(),
                kind: kind.as_str().to_string(),
                plural: kind.plural().to_string(),
            },
            namespaced: kind.is_namespaced(),
        }
    }
}

/// Resolves resource tokens against one cluster
pub struct ResourceResolver {
    client: Client,
    discovery: OnceCell<Discovery>,
}

impl ResourceResolver {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            discovery: OnceCell::new(),
        }
    }

    /// Resolve a resource token typed by the user
    pub async fn resolve(&self, token: &str) -> Result<ResolvedResource, SourceError> {
        if let Some(kind) = ResourceKind::from_str_case_insensitive(token) {
            return Ok(ResolvedResource::builtin(kind));
        }

        let (name, group) = split_token(token);
        let discovery = self
            .discovery
            .get_or_try_init(|| async {
                tracing::debug!("Running API discovery to resolve {}", token);
                Discovery::new(self.client.clone()).run().await
            })
            .await?;

        for api_group in discovery.groups() {
            if group.is_some_and(|g| g != api_group.name()) {
                continue;
            }
            for (ar, caps) in api_group.recommended_resources() {
                // Subresources (pods/log) are never listed
                if ar.plural.contains('/') {
                    continue;
                }
                if matches_resource(&ar, &name) {
                    tracing::debug!("Resolved {} to {} {}", token, ar.api_version, ar.kind);
                    return Ok(ResolvedResource {
                        namespaced: caps.scope == Scope::Namespaced,
                        api_resource: ar,
                    });
                }
            }
        }
        Err(SourceError::UnknownResource(token.to_string()))
    }

    /// Resolve the type of an object read from a manifest
    pub async fn resolve_kind(
        &self,
        api_version: &str,
        kind: &str,
    ) -> Result<ResolvedResource, SourceError> {
        if let Some(builtin) = ResourceKind::parse_optional(kind) {
            if split_api_version(builtin.api_version()).0 == split_api_version(api_version).0 {
                return Ok(ResolvedResource::builtin(builtin));
            }
        }
        let group = split_api_version(api_version).0;
        let token = if group.is_empty() {
            kind.to_lowercase()
        } else {
            format!("{}.{}", kind.to_lowercase(), group)
        };
        self.resolve(&token).await
    }
}

/// Split `name.group` into its parts
fn split_token(token: &str) -> (String, Option<&str>) {
    match token.split_once('.') {
        Some((name, group)) => (name.to_lowercase(), Some(group)),
        None => (token.to_lowercase(), None),
    }
}

fn matches_resource(ar: &ApiResource, name: &str) -> bool {
    ar.plural == name || ar.kind.to_lowercase() == name
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_resolution() {
        let resolved = ResolvedResource::builtin(ResourceKind::Deployment);
        assert_eq!(resolved.api_resource.api_version, "apps/v1");
        assert_eq!(resolved.api_resource.group, "apps");
        assert_eq!(resolved.api_resource.plural, "deployments");
        assert!(resolved.namespaced);
        assert!(!ResolvedResource::builtin(ResourceKind::Node).namespaced);
    }

    #[test]
    fn test_split_token() {
        assert_eq!(split_token("Certificates"), ("certificates".to_string(), None));
        assert_eq!(
            split_token("certificates.cert-manager.io"),
            ("certificates".to_string(), Some("cert-manager.io"))
        );
    }

    #[test]
    fn test_matches_plural_or_kind() {
        let ar = ApiResource {
            group: "cert-manager.io".to_string(),
            version: "v1".to_string(),
            api_version: "cert-manager.io/v1".to_string(),
            kind: "Certificate".to_string(),
            plural: "certificates".to_string(),
        };
        assert!(matches_resource(&ar, "certificates"));
        assert!(matches_resource(&ar, "certificate"));
        assert!(!matches_resource(&ar, "issuers"));
    }
}
