//! Registry of the cluster-management tools.
//!
//! Each [`Operation`] names one MCP tool, its input schema and the
//! [`AssistedClient`] method it is bound to. [`ClientCall`] is a decoded
//! invocation, ready to run against a client.

use std::path::PathBuf;

use assisted_client::{
    AssistedClient, ClientError, ClusterParams, DEFAULT_CLUSTER_NETWORK_CIDR, HighAvailabilityMode,
};
use rmcp::model::{JsonObject, Tool};
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value, json};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    ListClusters,
    ListEvents,
    ListManifests,
    CreateCluster,
    DeleteCluster,
    ClusterInfo,
    UpdateCluster,
    CreateManifests,
    DeleteManifests,
}

impl Operation {
    pub const ALL: [Operation; 9] = [
        Operation::ListClusters,
        Operation::ListEvents,
        Operation::ListManifests,
        Operation::CreateCluster,
        Operation::DeleteCluster,
        Operation::ClusterInfo,
        Operation::UpdateCluster,
        Operation::CreateManifests,
        Operation::DeleteManifests,
    ];

    /// Tool name exposed over MCP.
    pub fn name(self) -> &'static str {
        match self {
            Operation::ListClusters => "list_clusters",
            Operation::ListEvents => "list_events",
            Operation::ListManifests => "list_manifests",
            Operation::CreateCluster => "create_cluster",
            Operation::DeleteCluster => "delete_cluster",
            Operation::ClusterInfo => "cluster_info",
            Operation::UpdateCluster => "update_cluster",
            Operation::CreateManifests => "create_manifests",
            Operation::DeleteManifests => "delete_manifests",
        }
    }

    /// Name of the bound [`AssistedClient`] method.
    pub fn method(self) -> &'static str {
        match self {
            Operation::ClusterInfo => "get_cluster",
            Operation::CreateManifests => "upload_manifests",
            other => other.name(),
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Operation::ListClusters => "List all OpenShift clusters in the assisted service",
            Operation::ListEvents => "List events for a specific OpenShift cluster",
            Operation::ListManifests => "List custom manifests of a specific OpenShift cluster",
            Operation::CreateCluster => {
                "Create a new OpenShift cluster. high_availability_mode is 'Full' (three \
                 control plane nodes) or 'None' (single node)."
            }
            Operation::DeleteCluster => "Delete an OpenShift cluster",
            Operation::ClusterInfo => "Get detailed information about an OpenShift cluster",
            Operation::UpdateCluster => {
                "Update an OpenShift cluster's configuration. overrides holds the cluster \
                 fields to change."
            }
            Operation::CreateManifests => {
                "Create manifests for an OpenShift cluster from the YAML files in a \
                 directory. Set openshift to upload into the openshift folder."
            }
            Operation::DeleteManifests => "Delete all custom manifests of an OpenShift cluster",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.name() == name)
    }

    pub fn input_schema(self) -> Value {
        let cluster_name = json!({
            "type": "string",
            "description": "Name or id of the cluster"
        });

        match self {
            Operation::ListClusters => object_schema(json!({}), &[]),
            Operation::ListEvents
            | Operation::ListManifests
            | Operation::DeleteCluster
            | Operation::ClusterInfo
            | Operation::DeleteManifests => {
                object_schema(json!({ "cluster_name": cluster_name }), &["cluster_name"])
            }
            Operation::CreateCluster => object_schema(
                json!({
                    "cluster_name": {
                        "type": "string",
                        "description": "Name of the cluster to create"
                    },
                    "high_availability_mode": {
                        "type": "string",
                        "enum": ["Full", "None"],
                        "default": "Full",
                        "description": "Control plane topology"
                    },
                    "openshift_version": {
                        "type": "string",
                        "description": "Version of OpenShift to install"
                    },
                    "base_dns_domain": {
                        "type": "string",
                        "description": "Base DNS domain for the cluster"
                    },
                    "cluster_network_cidr": {
                        "type": "string",
                        "default": DEFAULT_CLUSTER_NETWORK_CIDR,
                        "description": "Cluster network CIDR"
                    },
                    "pull_secret": {
                        "type": "string",
                        "description": "Pull secret for the cluster"
                    },
                    "ssh_public_key": {
                        "type": "string",
                        "description": "SSH public key for the cluster"
                    }
                }),
                &["cluster_name"],
            ),
            Operation::UpdateCluster => object_schema(
                json!({
                    "cluster_name": cluster_name,
                    "overrides": {
                        "type": "object",
                        "default": {},
                        "description": "Cluster fields to update, e.g. {\"base_dns_domain\": \"example.com\"}"
                    }
                }),
                &["cluster_name"],
            ),
            Operation::CreateManifests => object_schema(
                json!({
                    "cluster_name": cluster_name,
                    "directory": {
                        "type": "string",
                        "description": "Directory containing the manifests"
                    },
                    "openshift": {
                        "type": "boolean",
                        "default": false,
                        "description": "Whether to create OpenShift manifests"
                    }
                }),
                &["cluster_name", "directory"],
            ),
        }
    }

    pub fn tool(self) -> Tool {
        Tool {
            name: self.name().into(),
            title: None,
            description: Some(self.description().into()),
            input_schema: self
                .input_schema()
                .as_object()
                .cloned()
                .unwrap_or_default()
                .into(),
            output_schema: None,
            annotations: None,
            execution: None,
            icons: None,
            meta: None,
        }
    }
}

fn object_schema(properties: Value, required: &[&str]) -> Value {
    json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

/// Every registered tool, in registration order.
pub fn registered_tools() -> Vec<Tool> {
    Operation::ALL.into_iter().map(Operation::tool).collect()
}

#[derive(Debug, Deserialize)]
pub struct ClusterRef {
    pub cluster_name: String,
}

/// Clients send `null` for optional arguments they leave unset; treat it
/// like an absent field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Deserialize)]
pub struct CreateClusterInput {
    pub cluster_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub high_availability_mode: HighAvailabilityMode,
    pub openshift_version: Option<String>,
    pub base_dns_domain: Option<String>,
    pub cluster_network_cidr: Option<String>,
    pub pull_secret: Option<String>,
    pub ssh_public_key: Option<String>,
}

impl CreateClusterInput {
    fn params(&self) -> ClusterParams {
        ClusterParams {
            high_availability_mode: self.high_availability_mode,
            openshift_version: self.openshift_version.clone(),
            base_dns_domain: self.base_dns_domain.clone(),
            cluster_network_cidr: self
                .cluster_network_cidr
                .clone()
                .unwrap_or_else(|| DEFAULT_CLUSTER_NETWORK_CIDR.into()),
            pull_secret: self.pull_secret.clone(),
            ssh_public_key: self.ssh_public_key.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateClusterInput {
    pub cluster_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub overrides: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct CreateManifestsInput {
    pub cluster_name: String,
    pub directory: PathBuf,
    #[serde(default, deserialize_with = "null_as_default")]
    pub openshift: bool,
}

/// A tool invocation with its arguments decoded.
#[derive(Debug)]
pub enum ClientCall {
    ListClusters,
    ListEvents(ClusterRef),
    ListManifests(ClusterRef),
    CreateCluster(CreateClusterInput),
    DeleteCluster(ClusterRef),
    GetCluster(ClusterRef),
    UpdateCluster(UpdateClusterInput),
    UploadManifests(CreateManifestsInput),
    DeleteManifests(ClusterRef),
}

impl ClientCall {
    pub fn decode(op: Operation, arguments: Option<JsonObject>) -> Result<Self, serde_json::Error> {
        let args = Value::Object(arguments.unwrap_or_default());
        Ok(match op {
            Operation::ListClusters => ClientCall::ListClusters,
            Operation::ListEvents => ClientCall::ListEvents(serde_json::from_value(args)?),
            Operation::ListManifests => ClientCall::ListManifests(serde_json::from_value(args)?),
            Operation::CreateCluster => ClientCall::CreateCluster(serde_json::from_value(args)?),
            Operation::DeleteCluster => ClientCall::DeleteCluster(serde_json::from_value(args)?),
            Operation::ClusterInfo => ClientCall::GetCluster(serde_json::from_value(args)?),
            Operation::UpdateCluster => ClientCall::UpdateCluster(serde_json::from_value(args)?),
            Operation::CreateManifests => {
                ClientCall::UploadManifests(serde_json::from_value(args)?)
            }
            Operation::DeleteManifests => {
                ClientCall::DeleteManifests(serde_json::from_value(args)?)
            }
        })
    }

    pub fn execute(&self, client: &dyn AssistedClient) -> Result<Value, ClientError> {
        match self {
            ClientCall::ListClusters => client.list_clusters(),
            ClientCall::ListEvents(c) => client.list_events(&c.cluster_name),
            ClientCall::ListManifests(c) => client.list_manifests(&c.cluster_name),
            ClientCall::CreateCluster(input) => {
                client.create_cluster(&input.cluster_name, &input.params())
            }
            ClientCall::DeleteCluster(c) => client.delete_cluster(&c.cluster_name),
            ClientCall::GetCluster(c) => client.get_cluster(&c.cluster_name),
            ClientCall::UpdateCluster(input) => {
                client.update_cluster(&input.cluster_name, &input.overrides)
            }
            ClientCall::UploadManifests(input) => {
                client.upload_manifests(&input.cluster_name, &input.directory, input.openshift)
            }
            ClientCall::DeleteManifests(c) => client.delete_manifests(&c.cluster_name),
        }
    }
}

/// Copy of the arguments that is safe to log.
pub fn redact_arguments(arguments: &JsonObject) -> Value {
    let mut redacted = arguments.clone();
    if let Some(secret) = redacted.get_mut("pull_secret").filter(|v| !v.is_null()) {
        *secret = Value::String("<redacted>".into());
    }
    Value::Object(redacted)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn args(value: Value) -> Option<JsonObject> {
        value.as_object().cloned()
    }

    #[test]
    fn tool_names_are_unique() {
        let names: HashSet<&str> = Operation::ALL.iter().map(|op| op.name()).collect();
        assert_eq!(names.len(), Operation::ALL.len());
    }

    #[test]
    fn from_name_round_trips_registry() {
        for op in Operation::ALL {
            assert_eq!(Operation::from_name(op.name()), Some(op));
        }
        assert_eq!(Operation::from_name("get_cluster"), None);
    }

    #[test]
    fn bound_methods_follow_client_names() {
        assert_eq!(Operation::ClusterInfo.method(), "get_cluster");
        assert_eq!(Operation::CreateManifests.method(), "upload_manifests");
        assert_eq!(Operation::DeleteCluster.method(), "delete_cluster");
    }

    #[test]
    fn every_tool_has_an_object_schema() {
        for tool in registered_tools() {
            assert_eq!(tool.input_schema.get("type"), Some(&json!("object")));
            assert!(tool.description.is_some());
        }
        let tools = registered_tools();
        assert_eq!(tools.len(), 9);
        assert!(tools.iter().any(|t| t.name == "cluster_info"));
    }

    #[test]
    fn create_cluster_schema_documents_defaults() {
        let schema = Operation::CreateCluster.input_schema();
        let props = &schema["properties"];
        assert_eq!(props["high_availability_mode"]["default"], "Full");
        assert_eq!(props["high_availability_mode"]["enum"], json!(["Full", "None"]));
        assert_eq!(props["cluster_network_cidr"]["default"], "10.128.0.0/14");
        assert_eq!(schema["required"], json!(["cluster_name"]));
    }

    #[test]
    fn create_cluster_decodes_with_defaults() {
        let call = ClientCall::decode(
            Operation::CreateCluster,
            args(json!({ "cluster_name": "demo", "base_dns_domain": "example.com" })),
        )
        .unwrap();
        let ClientCall::CreateCluster(input) = call else {
            panic!("expected CreateCluster");
        };
        let params = input.params();
        assert_eq!(input.cluster_name, "demo");
        assert_eq!(params.high_availability_mode, HighAvailabilityMode::Full);
        assert_eq!(params.cluster_network_cidr, "10.128.0.0/14");
        assert_eq!(params.base_dns_domain.as_deref(), Some("example.com"));
        assert!(params.openshift_version.is_none());
    }

    #[test]
    fn create_manifests_keeps_openshift_flag() {
        let call = ClientCall::decode(
            Operation::CreateManifests,
            args(json!({ "cluster_name": "demo", "directory": "/tmp/m", "openshift": true })),
        )
        .unwrap();
        let ClientCall::UploadManifests(input) = call else {
            panic!("expected UploadManifests");
        };
        assert!(input.openshift);
        assert_eq!(input.directory, PathBuf::from("/tmp/m"));
    }

    #[test]
    fn null_optional_arguments_take_their_defaults() {
        let call = ClientCall::decode(
            Operation::CreateCluster,
            args(json!({
                "cluster_name": "demo",
                "high_availability_mode": null,
                "openshift_version": null,
                "base_dns_domain": null,
                "cluster_network_cidr": null,
                "pull_secret": null,
                "ssh_public_key": null,
            })),
        )
        .unwrap();
        let ClientCall::CreateCluster(input) = call else {
            panic!("expected CreateCluster");
        };
        assert_eq!(input.params(), ClusterParams::default());

        let call = ClientCall::decode(
            Operation::CreateManifests,
            args(json!({ "cluster_name": "demo", "directory": "/tmp/m", "openshift": null })),
        )
        .unwrap();
        let ClientCall::UploadManifests(input) = call else {
            panic!("expected UploadManifests");
        };
        assert!(!input.openshift);

        let call = ClientCall::decode(
            Operation::UpdateCluster,
            args(json!({ "cluster_name": "demo", "overrides": null })),
        )
        .unwrap();
        let ClientCall::UpdateCluster(input) = call else {
            panic!("expected UpdateCluster");
        };
        assert!(input.overrides.is_empty());
    }

    #[test]
    fn missing_required_argument_fails_to_decode() {
        let err = ClientCall::decode(Operation::DeleteCluster, None).unwrap_err();
        assert!(err.to_string().contains("cluster_name"));
    }

    #[test]
    fn list_clusters_ignores_arguments() {
        let call = ClientCall::decode(Operation::ListClusters, args(json!({ "extra": 1 }))).unwrap();
        assert!(matches!(call, ClientCall::ListClusters));
    }

    #[test]
    fn pull_secret_is_redacted_for_logging() {
        let arguments = args(json!({ "cluster_name": "demo", "pull_secret": "{\"auths\":{}}" })).unwrap();
        let redacted = redact_arguments(&arguments);
        assert_eq!(redacted["pull_secret"], "<redacted>");
        assert_eq!(redacted["cluster_name"], "demo");
        assert_eq!(arguments["pull_secret"], "{\"auths\":{}}");
    }
}
