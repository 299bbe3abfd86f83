use rmcp::{
    ErrorData as McpError, RoleServer, ServerHandler,
    model::{
        CallToolRequestParams, CallToolResult, Content, Implementation, JsonObject,
        ListToolsResult, PaginatedRequestParams, ServerCapabilities, ServerInfo,
    },
    service::RequestContext,
};

use crate::adapter::ApiAdapter;
use crate::tools::{Operation, registered_tools};

/// MCP server exposing the Assisted Installer operations as tools.
#[derive(Clone)]
pub struct AssistedMcpServer {
    adapter: ApiAdapter,
}

impl AssistedMcpServer {
    pub fn new(adapter: ApiAdapter) -> Self {
        Self { adapter }
    }

    async fn run_tool(
        &self,
        name: &str,
        arguments: Option<JsonObject>,
    ) -> Result<CallToolResult, McpError> {
        let Some(op) = Operation::from_name(name) else {
            tracing::warn!(tool = %name, "Unknown tool requested");
            return Err(McpError::invalid_params(
                format!("Unknown tool: {name}"),
                None,
            ));
        };

        // Client faults come back as ordinary text, never as protocol errors.
        let text = self.adapter.invoke(op, arguments).await;
        Ok(make_tool_result(vec![Content::text(text)]))
    }
}

fn make_tool_result(content: Vec<Content>) -> CallToolResult {
    CallToolResult {
        content,
        structured_content: None,
        is_error: Some(false),
        meta: None,
    }
}

impl ServerHandler for AssistedMcpServer {
    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        tracing::debug!("Listing tools");
        Ok(ListToolsResult::with_all_items(registered_tools()))
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParams,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        self.run_tool(&request.name, request.arguments).await
    }

    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: Default::default(),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: env!("CARGO_PKG_NAME").into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Implementation::from_build_env()
            },
            instructions: Some(
                "Assisted Installer MCP server -- list, create, inspect, update and delete \
                 OpenShift clusters and their manifests"
                    .into(),
            ),
        }
    }
}
