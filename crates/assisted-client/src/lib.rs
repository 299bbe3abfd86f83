//! Client for the OpenShift Assisted Installer service.
//!
//! [`AssistedClient`] is the synchronous cluster-management surface consumed
//! by the MCP adapter. [`RestAssistedClient`] implements it over the
//! Assisted Installer v2 REST API, authenticating with an offline token.

pub mod auth;
pub mod client;
pub mod error;
pub mod rest;

pub use auth::{DEFAULT_SSO_URL, OfflineTokenAuth};
pub use client::{AssistedClient, ClusterParams, DEFAULT_CLUSTER_NETWORK_CIDR, HighAvailabilityMode};
pub use error::ClientError;
pub use rest::{DEFAULT_API_URL, RestAssistedClient};
