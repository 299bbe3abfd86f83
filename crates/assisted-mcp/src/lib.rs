//! MCP adapter for the OpenShift Assisted Installer.
//!
//! The [`tools`] registry maps each tool to an [`assisted_client::AssistedClient`]
//! method, [`adapter::ApiAdapter`] runs invocations off the async scheduler and
//! turns every outcome into text, and [`server::AssistedMcpServer`] exposes the
//! registry over MCP.

pub mod adapter;
pub mod config;
pub mod error;
pub mod logging;
pub mod server;
pub mod tools;
