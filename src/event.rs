//! Invocation wire types
//!
//! `ApiEvent` is the normalized request handed to the router and
//! `ApiResponse` is what it returns. Both use camelCase field names on the
//! wire so the service can be driven by a function runtime as well as by the
//! axum front end in `routes`.

use axum::http::StatusCode;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::error;

pub const CONTENT_TYPE: &str = "Content-Type";
pub const ALLOW_ORIGIN: &str = "Access-Control-Allow-Origin";
pub const ALLOW_METHODS: &str = "Access-Control-Allow-Methods";
pub const ALLOW_HEADERS: &str = "Access-Control-Allow-Headers";
pub const MAX_AGE: &str = "Access-Control-Max-Age";

const PREFLIGHT_METHODS: &str = "GET, POST, PUT, DELETE, OPTIONS";
const PREFLIGHT_HEADERS: &str = "Content-Type, X-User-Id, X-Auth-Token";
/// 24 hours
const PREFLIGHT_MAX_AGE: &str = "86400";

/// Normalized HTTP-like request
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiEvent {
    #[serde(default = "default_method", deserialize_with = "method_or_default")]
    pub http_method: String,
    #[serde(default)]
    pub query_string_parameters: Option<HashMap<String, String>>,
    #[serde(default)]
    pub body: Option<String>,
}

fn default_method() -> String {
    "GET".to_string()
}

/// `null` reads the same as an absent method
fn method_or_default<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(default_method))
}

impl ApiEvent {
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            http_method: method.into(),
            query_string_parameters: None,
            body: None,
        }
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query_string_parameters
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Look up a query parameter; an absent map behaves like an empty one.
    pub fn query(&self, key: &str) -> Option<&str> {
        self.query_string_parameters
            .as_ref()
            .and_then(|params| params.get(key))
            .map(String::as_str)
    }

    /// The `action` query parameter, or the empty string.
    pub fn action(&self) -> &str {
        self.query("action").unwrap_or("")
    }

    pub fn is_preflight(&self) -> bool {
        self.http_method.eq_ignore_ascii_case("OPTIONS")
    }
}

/// Normalized HTTP-like response
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse {
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    pub is_base64_encoded: bool,
    pub body: String,
}

impl ApiResponse {
    /// JSON response with the standard content type and CORS origin header.
    pub fn json<T: Serialize + ?Sized>(status: StatusCode, payload: &T) -> Self {
        match serde_json::to_string(payload) {
            Ok(body) => Self::with_json_headers(status, body),
            Err(e) => {
                error!("Failed to serialize response body: {}", e);
                Self::with_json_headers(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    r#"{"error":"Failed to serialize response"}"#.to_string(),
                )
            }
        }
    }

    fn with_json_headers(status: StatusCode, body: String) -> Self {
        let mut headers = BTreeMap::new();
        headers.insert(CONTENT_TYPE.to_string(), "application/json".to_string());
        headers.insert(ALLOW_ORIGIN.to_string(), "*".to_string());

        Self {
            status_code: status.as_u16(),
            headers,
            is_base64_encoded: false,
            body,
        }
    }

    /// Fixed answer to a CORS pre-flight request. Never touches storage.
    pub fn preflight() -> Self {
        let headers = [
            (ALLOW_ORIGIN, "*"),
            (ALLOW_METHODS, PREFLIGHT_METHODS),
            (ALLOW_HEADERS, PREFLIGHT_HEADERS),
            (MAX_AGE, PREFLIGHT_MAX_AGE),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        Self {
            status_code: StatusCode::OK.as_u16(),
            headers,
            is_base64_encoded: false,
            body: String::new(),
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    /// Parse the body back into JSON.
    pub fn json_body(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::from_str(&self.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_event_defaults_from_sparse_json() {
        let event: ApiEvent = serde_json::from_value(json!({})).unwrap();

        assert_eq!(event.http_method, "GET");
        assert!(event.query_string_parameters.is_none());
        assert!(event.body.is_none());
        assert_eq!(event.action(), "");
    }

    #[test]
    fn test_event_null_query_map_is_empty() {
        let event: ApiEvent = serde_json::from_value(json!({
            "httpMethod": "POST",
            "queryStringParameters": null,
            "body": "{\"a\":1}"
        }))
        .unwrap();

        assert_eq!(event.query("action"), None);
        assert_eq!(event.body.as_deref(), Some("{\"a\":1}"));
    }

    #[test]
    fn test_event_null_method_defaults_to_get() {
        let event: ApiEvent = serde_json::from_value(json!({
            "httpMethod": null,
            "queryStringParameters": {"action": "get_reviews"}
        }))
        .unwrap();

        assert_eq!(event.http_method, "GET");
        assert!(!event.is_preflight());
        assert_eq!(event.action(), "get_reviews");
    }

    #[test]
    fn test_preflight_detection_ignores_case() {
        assert!(ApiEvent::new("OPTIONS").is_preflight());
        assert!(ApiEvent::new("options").is_preflight());
        assert!(!ApiEvent::new("GET").is_preflight());
    }

    #[test]
    fn test_json_response_headers() {
        let response = ApiResponse::json(StatusCode::CREATED, &json!({"id": 3}));

        assert_eq!(response.status_code, 201);
        assert_eq!(response.header(CONTENT_TYPE), Some("application/json"));
        assert_eq!(response.header(ALLOW_ORIGIN), Some("*"));
        assert!(!response.is_base64_encoded);
        assert_eq!(response.json_body().unwrap(), json!({"id": 3}));
    }

    #[test]
    fn test_response_serializes_camel_case() {
        let value = serde_json::to_value(ApiResponse::preflight()).unwrap();

        assert_eq!(value["statusCode"], 200);
        assert_eq!(value["isBase64Encoded"], false);
        assert_eq!(value["body"], "");
        assert_eq!(value["headers"][MAX_AGE], "86400");
    }
}
