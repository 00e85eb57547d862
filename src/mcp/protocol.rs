//! JSON-RPC 2.0 message types
//!
//! Shared by the stdio transport and the `POST /mcp` route.

use crate::error::{ErrorKind, ScribeError};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Value};

/// MCP protocol revision spoken by this server
pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// JSON-RPC 2.0 request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    /// JSON-RPC version (must be "2.0")
    pub jsonrpc: String,

    pub method: String,

    /// Parameters (object or array)
    #[serde(default)]
    pub params: Value,

    /// Request id; `None` only when the key is absent (a notification).
    /// An explicit `"id": null` is kept as `Some(Value::Null)`.
    #[serde(
        default,
        deserialize_with = "present_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<Value>,
}

fn present_id<'de, D>(deserializer: D) -> std::result::Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

impl JsonRpcRequest {
    /// Notifications never get a response
    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }
}

/// JSON-RPC 2.0 response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,

    /// Echoed from the request; `null` when the request could not be read
    pub id: Option<Value>,
}

impl JsonRpcResponse {
    pub fn success(id: Option<Value>, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            result: Some(result),
            error: None,
            id,
        }
    }

    pub fn error(id: Option<Value>, error: JsonRpcError) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            result: None,
            error: Some(error),
            id,
        }
    }
}

/// JSON-RPC 2.0 error object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i32,

    pub message: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcError {
    /// Parse error (-32700)
    pub fn parse_error(message: impl Into<String>) -> Self {
        Self::new(-32700, message)
    }

    /// Invalid request (-32600)
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(-32600, message)
    }

    /// Method not found (-32601)
    pub fn method_not_found(method: &str) -> Self {
        Self::new(-32601, format!("Method not found: {}", method))
    }

    /// Invalid params (-32602)
    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::with_kind(ErrorKind::ValidationFailed, message)
    }

    fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    /// Error carrying one of the crate's error kinds in `data.kind`
    pub fn with_kind(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            code: error_code(kind),
            message: message.into(),
            data: Some(json!({ "kind": kind })),
        }
    }
}

impl From<&ScribeError> for JsonRpcError {
    fn from(err: &ScribeError) -> Self {
        JsonRpcError::with_kind(err.kind(), err.to_string())
    }
}

/// JSON-RPC error code for an error kind
pub fn error_code(kind: ErrorKind) -> i32 {
    match kind {
        ErrorKind::ValidationFailed => -32602,
        ErrorKind::AuthenticationFailed => -32001,
        ErrorKind::ContentMalformed => -32002,
        ErrorKind::RemoteUnavailable => -32003,
        ErrorKind::NotFound => -32004,
        ErrorKind::ValidationRejected => -32005,
        ErrorKind::Internal => -32603,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notification_has_no_id() {
        let request: JsonRpcRequest =
            serde_json::from_str(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#)
                .unwrap();
        assert!(request.is_notification());
        assert_eq!(request.params, Value::Null);
    }

    #[test]
    fn test_null_id_is_a_request() {
        let request: JsonRpcRequest =
            serde_json::from_str(r#"{"jsonrpc":"2.0","id":null,"method":"ping"}"#).unwrap();
        assert!(!request.is_notification());
        assert_eq!(request.id, Some(Value::Null));

        let response = JsonRpcResponse::success(request.id, json!({}));
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["id"], Value::Null);
        assert!(json.as_object().unwrap().contains_key("id"));
    }

    #[test]
    fn test_error_response_omits_result() {
        let response = JsonRpcResponse::error(
            Some(json!(1)),
            JsonRpcError::method_not_found("resources/list"),
        );

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("-32601"));
        assert!(json.contains("resources/list"));
        assert!(!json.contains("\"result\""));
    }

    #[test]
    fn test_error_codes_are_distinct() {
        let kinds = [
            ErrorKind::ValidationFailed,
            ErrorKind::AuthenticationFailed,
            ErrorKind::ContentMalformed,
            ErrorKind::RemoteUnavailable,
            ErrorKind::NotFound,
            ErrorKind::ValidationRejected,
            ErrorKind::Internal,
        ];
        let codes: std::collections::HashSet<i32> =
            kinds.iter().map(|k| error_code(*k)).collect();
        assert_eq!(codes.len(), kinds.len());
    }

    #[test]
    fn test_error_from_scribe_error() {
        let err = ScribeError::AuthenticationFailed {
            service: "wordpress",
            message: "bad password".to_string(),
        };
        let rpc = JsonRpcError::from(&err);
        assert_eq!(rpc.code, -32001);
        assert_eq!(rpc.data, Some(json!({"kind": "AuthenticationFailed"})));
    }
}
