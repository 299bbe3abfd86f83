use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ClientError;

pub const DEFAULT_CLUSTER_NETWORK_CIDR: &str = "10.128.0.0/14";

/// Control plane topology requested for a new cluster.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum HighAvailabilityMode {
    /// Three control plane nodes.
    #[default]
    Full,
    /// Single-node OpenShift.
    None,
}

/// Settings for a new cluster. Unset optionals are left to the service defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterParams {
    pub high_availability_mode: HighAvailabilityMode,
    pub openshift_version: Option<String>,
    pub base_dns_domain: Option<String>,
    pub cluster_network_cidr: String,
    pub pull_secret: Option<String>,
    pub ssh_public_key: Option<String>,
}

impl Default for ClusterParams {
    fn default() -> Self {
        Self {
            high_availability_mode: HighAvailabilityMode::Full,
            openshift_version: None,
            base_dns_domain: None,
            cluster_network_cidr: DEFAULT_CLUSTER_NETWORK_CIDR.into(),
            pull_secret: None,
            ssh_public_key: None,
        }
    }
}

/// Cluster-management operations against the Assisted Installer service.
///
/// Methods are synchronous and may block on network I/O; async callers are
/// expected to run them on a blocking thread. A `cluster` argument accepts
/// either a cluster name or a cluster id. Results are the service's JSON
/// payloads, passed through untouched.
pub trait AssistedClient: Send + Sync {
    fn list_clusters(&self) -> Result<Value, ClientError>;

    fn list_events(&self, cluster: &str) -> Result<Value, ClientError>;

    fn list_manifests(&self, cluster: &str) -> Result<Value, ClientError>;

    fn create_cluster(&self, name: &str, params: &ClusterParams) -> Result<Value, ClientError>;

    fn delete_cluster(&self, cluster: &str) -> Result<Value, ClientError>;

    fn get_cluster(&self, cluster: &str) -> Result<Value, ClientError>;

    /// Apply a partial update (`V2ClusterUpdateParams` fields) to a cluster.
    fn update_cluster(
        &self,
        cluster: &str,
        overrides: &Map<String, Value>,
    ) -> Result<Value, ClientError>;

    /// Upload every YAML file in `directory`, into the `openshift` folder
    /// when `openshift` is set and the `manifests` folder otherwise.
    fn upload_manifests(
        &self,
        cluster: &str,
        directory: &Path,
        openshift: bool,
    ) -> Result<Value, ClientError>;

    /// Remove all custom manifests from a cluster.
    fn delete_manifests(&self, cluster: &str) -> Result<Value, ClientError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cluster_params_defaults() {
        let params = ClusterParams::default();
        assert_eq!(params.high_availability_mode, HighAvailabilityMode::Full);
        assert_eq!(params.cluster_network_cidr, "10.128.0.0/14");
        assert!(params.pull_secret.is_none());
    }

    #[test]
    fn high_availability_mode_uses_service_spelling() {
        assert_eq!(
            serde_json::to_value(HighAvailabilityMode::None).unwrap(),
            serde_json::json!("None")
        );
        let mode: HighAvailabilityMode = serde_json::from_str("\"Full\"").unwrap();
        assert_eq!(mode, HighAvailabilityMode::Full);
    }
}
