//! Assisted Installer v2 REST implementation of [`AssistedClient`].

use std::future::Future;
use std::path::Path;
use std::time::Duration;

use base64::{Engine as _, engine::general_purpose::STANDARD};
use reqwest::RequestBuilder;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use tokio::runtime::Handle;

use crate::auth::OfflineTokenAuth;
use crate::client::{AssistedClient, ClusterParams, HighAvailabilityMode};
use crate::error::ClientError;

pub const DEFAULT_API_URL: &str = "https://api.openshift.com";

const API_PREFIX: &str = "/api/assisted-install/v2";

/// Host prefix assigned to every cluster network entry.
const CLUSTER_NETWORK_HOST_PREFIX: u32 = 23;

#[derive(Serialize)]
struct ClusterNetwork<'a> {
    cidr: &'a str,
    host_prefix: u32,
}

#[derive(Serialize)]
struct ClusterCreateParams<'a> {
    name: &'a str,
    high_availability_mode: HighAvailabilityMode,
    cluster_networks: Vec<ClusterNetwork<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    openshift_version: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    base_dns_domain: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pull_secret: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ssh_public_key: Option<&'a str>,
}

impl<'a> ClusterCreateParams<'a> {
    fn new(name: &'a str, params: &'a ClusterParams) -> Self {
        Self {
            name,
            high_availability_mode: params.high_availability_mode,
            cluster_networks: vec![ClusterNetwork {
                cidr: &params.cluster_network_cidr,
                host_prefix: CLUSTER_NETWORK_HOST_PREFIX,
            }],
            openshift_version: params.openshift_version.as_deref(),
            base_dns_domain: params.base_dns_domain.as_deref(),
            pull_secret: params.pull_secret.as_deref(),
            ssh_public_key: params.ssh_public_key.as_deref(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ManifestRef {
    folder: String,
    file_name: String,
}

/// Client for `<api_url>/api/assisted-install/v2`.
///
/// The trait methods block on the tokio runtime that was current when the
/// client was built, so they must be called from a blocking-pool thread
/// (`tokio::task::spawn_blocking`) or a plain OS thread, never from inside
/// an async task.
pub struct RestAssistedClient {
    http: reqwest::Client,
    api_url: String,
    auth: OfflineTokenAuth,
    runtime: Handle,
}

impl RestAssistedClient {
    pub fn new(
        api_url: &str,
        sso_url: &str,
        offline_token: String,
        timeout: Duration,
    ) -> Result<Self, ClientError> {
        let runtime = Handle::try_current().map_err(|e| ClientError::Runtime(e.to_string()))?;
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Http(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            auth: OfflineTokenAuth::new(http.clone(), sso_url.into(), offline_token),
            http,
            api_url: api_url.trim_end_matches('/').to_string(),
            runtime,
        })
    }

    fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{API_PREFIX}{path}", self.api_url)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Value, ClientError> {
        let token = self.auth.access_token().await?;
        let resp = request.bearer_auth(token).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ClientError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let body = resp.text().await?;
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&body)?)
    }

    async fn fetch_clusters(&self) -> Result<Value, ClientError> {
        tracing::debug!("GET /clusters");
        self.send(self.http.get(self.url("/clusters"))).await
    }

    /// Map a cluster name or id to its id.
    async fn resolve_cluster_id(&self, cluster: &str) -> Result<String, ClientError> {
        let clusters = self.fetch_clusters().await?;
        find_cluster_id(&clusters, cluster).ok_or_else(|| ClientError::NotFound(cluster.into()))
    }

    async fn cluster_request(
        &self,
        cluster: &str,
        build: impl FnOnce(&reqwest::Client, String) -> RequestBuilder,
    ) -> Result<Value, ClientError> {
        let id = self.resolve_cluster_id(cluster).await?;
        self.send(build(&self.http, self.url(&format!("/clusters/{id}"))))
            .await
    }

    async fn fetch_manifests(&self, id: &str) -> Result<Value, ClientError> {
        self.send(self.http.get(self.url(&format!("/clusters/{id}/manifests"))))
            .await
    }
}

/// First cluster whose name matches exactly, otherwise an id match.
fn find_cluster_id(clusters: &Value, cluster: &str) -> Option<String> {
    let entries = clusters.as_array()?;
    let id_of = |c: &Value| c.get("id").and_then(Value::as_str).map(String::from);

    entries
        .iter()
        .find(|c| c.get("name").and_then(Value::as_str) == Some(cluster))
        .and_then(id_of)
        .or_else(|| {
            entries
                .iter()
                .find(|c| c.get("id").and_then(Value::as_str) == Some(cluster))
                .and_then(id_of)
        })
}

/// Read the YAML manifests in `directory`, sorted by file name.
fn read_manifests(directory: &Path) -> Result<Vec<(String, Vec<u8>)>, ClientError> {
    if !directory.is_dir() {
        return Err(ClientError::InvalidManifest(format!(
            "{} is not a directory",
            directory.display()
        )));
    }

    let mut manifests = Vec::new();
    for entry in std::fs::read_dir(directory)? {
        let path = entry?.path();
        let is_yaml = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e == "yaml" || e == "yml");
        if !path.is_file() || !is_yaml {
            continue;
        }
        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        manifests.push((file_name.to_string(), std::fs::read(&path)?));
    }

    if manifests.is_empty() {
        return Err(ClientError::InvalidManifest(format!(
            "no YAML manifests found in {}",
            directory.display()
        )));
    }
    manifests.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(manifests)
}

impl AssistedClient for RestAssistedClient {
    fn list_clusters(&self) -> Result<Value, ClientError> {
        self.block_on(self.fetch_clusters())
    }

    fn list_events(&self, cluster: &str) -> Result<Value, ClientError> {
        self.block_on(async {
            let id = self.resolve_cluster_id(cluster).await?;
            self.send(
                self.http
                    .get(self.url("/events"))
                    .query(&[("cluster_id", id.as_str())]),
            )
            .await
        })
    }

    fn list_manifests(&self, cluster: &str) -> Result<Value, ClientError> {
        self.block_on(async {
            let id = self.resolve_cluster_id(cluster).await?;
            self.fetch_manifests(&id).await
        })
    }

    fn create_cluster(&self, name: &str, params: &ClusterParams) -> Result<Value, ClientError> {
        let body = ClusterCreateParams::new(name, params);
        tracing::debug!(name = %name, "POST /clusters");
        self.block_on(self.send(self.http.post(self.url("/clusters")).json(&body)))
    }

    fn delete_cluster(&self, cluster: &str) -> Result<Value, ClientError> {
        self.block_on(async {
            let id = self.resolve_cluster_id(cluster).await?;
            self.send(self.http.delete(self.url(&format!("/clusters/{id}"))))
                .await?;
            Ok::<_, ClientError>(json!({ "id": id, "deleted": true }))
        })
    }

    fn get_cluster(&self, cluster: &str) -> Result<Value, ClientError> {
        self.block_on(self.cluster_request(cluster, |http, url| http.get(url)))
    }

    fn update_cluster(
        &self,
        cluster: &str,
        overrides: &Map<String, Value>,
    ) -> Result<Value, ClientError> {
        self.block_on(self.cluster_request(cluster, |http, url| http.patch(url).json(overrides)))
    }

    fn upload_manifests(
        &self,
        cluster: &str,
        directory: &Path,
        openshift: bool,
    ) -> Result<Value, ClientError> {
        let manifests = read_manifests(directory)?;
        let folder = if openshift { "openshift" } else { "manifests" };

        self.block_on(async {
            let id = self.resolve_cluster_id(cluster).await?;
            let url = self.url(&format!("/clusters/{id}/manifests"));
            let mut uploaded = Vec::with_capacity(manifests.len());
            for (file_name, content) in &manifests {
                tracing::debug!(cluster = %cluster, folder, file_name = %file_name, "Uploading manifest");
                let body = json!({
                    "folder": folder,
                    "file_name": file_name,
                    "content": STANDARD.encode(content),
                });
                uploaded.push(self.send(self.http.post(&url).json(&body)).await?);
            }
            Ok::<_, ClientError>(Value::Array(uploaded))
        })
    }

    fn delete_manifests(&self, cluster: &str) -> Result<Value, ClientError> {
        self.block_on(async {
            let id = self.resolve_cluster_id(cluster).await?;
            let manifests: Vec<ManifestRef> = match self.fetch_manifests(&id).await? {
                Value::Null => Vec::new(),
                listed => serde_json::from_value(listed)?,
            };

            let url = self.url(&format!("/clusters/{id}/manifests"));
            let mut deleted = Vec::with_capacity(manifests.len());
            for manifest in &manifests {
                self.send(self.http.delete(&url).query(&[
                    ("folder", manifest.folder.as_str()),
                    ("file_name", manifest.file_name.as_str()),
                ]))
                .await?;
                deleted.push(Value::String(format!(
                    "{}/{}",
                    manifest.folder, manifest.file_name
                )));
            }
            Ok::<_, ClientError>(Value::Array(deleted))
        })
    }
}
