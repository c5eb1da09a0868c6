use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

const CONTENT_TYPE: &str = "Content-Type";
const APPLICATION_JSON: &str = "application/json";
const ALLOW_ORIGIN: &str = "Access-Control-Allow-Origin";

/// API Gateway proxy shaped response. `body` always holds serialized JSON.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiGatewayResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

impl ApiGatewayResponse {
    pub fn json(status_code: u16, body: &Value) -> Self {
        ApiGatewayResponse {
            status_code,
            headers: BTreeMap::from([(CONTENT_TYPE.to_string(), APPLICATION_JSON.to_string())]),
            body: body.to_string(),
        }
    }

    pub fn with_cors(mut self) -> Self {
        self.headers
            .insert(ALLOW_ORIGIN.to_string(), "*".to_string());
        self
    }

    /// Parse `body` back out. Mostly useful to tests and the cli.
    pub fn body_json(&self) -> Result<Value, serde_json::Error> {
        serde_json::from_str(&self.body)
    }
}

/// Returned, without an HTTP envelope, for uploads outside the watched prefix.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SkippedResponse {
    pub status: String,
}

impl Default for SkippedResponse {
    fn default() -> Self {
        SkippedResponse {
            status: "skipped".to_string(),
        }
    }
}

/// Everything the dispatcher can hand back to the runtime. Serializes
/// untagged: either the proxy envelope or the bare skip status.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum DispatchResponse {
    Http(ApiGatewayResponse),
    Skipped(SkippedResponse),
}

impl DispatchResponse {
    pub fn http(&self) -> Option<&ApiGatewayResponse> {
        match self {
            DispatchResponse::Http(r) => Some(r),
            DispatchResponse::Skipped(_) => None,
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, DispatchResponse::Skipped(_))
    }
}

impl From<ApiGatewayResponse> for DispatchResponse {
    fn from(value: ApiGatewayResponse) -> Self {
        DispatchResponse::Http(value)
    }
}
