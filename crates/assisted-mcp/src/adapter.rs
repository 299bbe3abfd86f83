use std::sync::Arc;

use assisted_client::AssistedClient;
use rmcp::model::JsonObject;
use serde_json::Value;

use crate::tools::{ClientCall, Operation, redact_arguments};

/// Runs tool invocations against an [`AssistedClient`].
///
/// Every call is pushed onto the blocking pool, and every outcome, including
/// bad arguments, client faults and a panicking worker, comes back as text.
#[derive(Clone)]
pub struct ApiAdapter {
    client: Arc<dyn AssistedClient>,
}

impl ApiAdapter {
    pub fn new(client: Arc<dyn AssistedClient>) -> Self {
        Self { client }
    }

    pub async fn invoke(&self, op: Operation, arguments: Option<JsonObject>) -> String {
        let logged = arguments
            .as_ref()
            .map(redact_arguments)
            .unwrap_or(Value::Null);
        tracing::info!(
            tool = op.name(),
            method = op.method(),
            arguments = %logged,
            "Calling client method"
        );

        let call = match ClientCall::decode(op, arguments) {
            Ok(call) => call,
            Err(e) => {
                let error_msg = format!("Invalid arguments for {}: {e}", op.name());
                tracing::error!(tool = op.name(), "{error_msg}");
                return error_msg;
            }
        };

        let label = call_label(op);
        let client = Arc::clone(&self.client);
        let outcome = tokio::task::spawn_blocking(move || call.execute(client.as_ref())).await;

        match outcome {
            Ok(Ok(value)) => {
                let text = render(&value);
                tracing::info!(tool = op.name(), result = %text, "Client call succeeded");
                text
            }
            Ok(Err(e)) if e.is_timeout() => {
                let error_msg = format!("Operation {label} timed out: {e}");
                tracing::error!(tool = op.name(), "{error_msg}");
                error_msg
            }
            Ok(Err(e)) => {
                let error_msg = format!("Unexpected error in {label}: {e}");
                tracing::error!(tool = op.name(), "{error_msg}");
                error_msg
            }
            Err(e) => {
                let error_msg = format!("Unexpected error in {label}: worker failed: {e}");
                tracing::error!(tool = op.name(), "{error_msg}");
                error_msg
            }
        }
    }
}

/// Client method name, followed by the tool name when the two differ.
fn call_label(op: Operation) -> String {
    if op.method() == op.name() {
        op.method().to_string()
    } else {
        format!("{} ({})", op.method(), op.name())
    }
}

/// Text form of a client result: strings verbatim, anything else as JSON.
pub fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
