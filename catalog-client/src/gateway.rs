use crate::config::GatewayConfig;
use crate::error::{ApiError, Result};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// Shared request building and response interpretation for every
/// serverless function call.
#[derive(Clone, Debug)]
pub struct Gateway {
    client: reqwest::Client,
    config: GatewayConfig,
}

impl Gateway {
    pub fn new(config: GatewayConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    pub fn with_client(client: reqwest::Client, config: GatewayConfig) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    pub fn endpoint_url(&self, path: &str) -> String {
        self.config.endpoint_url(path)
    }

    pub async fn get(&self, path: &str) -> Result<Value> {
        self.execute(self.request(Method::GET, path)).await
    }

    pub async fn post(&self, path: &str) -> Result<Value> {
        self.execute(self.request(Method::POST, path)).await
    }

    pub async fn post_json<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Value> {
        self.execute(self.request(Method::POST, path).json(body)).await
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = self.endpoint_url(path);
        debug!("{} {}", method, url);
        self.client.request(method, url)
    }

    async fn execute(&self, request: RequestBuilder) -> Result<Value> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        debug!("Received {} with {} byte body", status, body.len());

        interpret(status, &body)
    }
}

/// Turns a raw reply into either its JSON body or an [`ApiError`].
///
/// A body that is not JSON is read as `{}`. Error statuses take their message
/// from the body's `error` field, then its `message` field, and otherwise
/// fall back to `HTTP <status>`.
pub fn interpret(status: StatusCode, body: &[u8]) -> Result<Value> {
    let data = match serde_json::from_slice::<Value>(body) {
        Ok(data) => data,
        Err(e) => {
            if !body.is_empty() {
                warn!("Response body is not JSON ({}), treating it as {{}}", e);
            }
            Value::Object(Map::new())
        }
    };

    if status.is_success() {
        return Ok(data);
    }

    let message = message_field(&data, "error")
        .or_else(|| message_field(&data, "message"))
        .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));

    Err(ApiError::new(message))
}

fn message_field(data: &Value, field: &str) -> Option<String> {
    match data.get(field)? {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.is_empty() => None,
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body(value: Value) -> Vec<u8> {
        serde_json::to_vec(&value).unwrap()
    }

    #[test]
    fn success_returns_body_unchanged() {
        let payload = json!([{"_id": "1", "name": "Ada"}]);
        let result = interpret(StatusCode::OK, &body(payload.clone())).unwrap();
        assert_eq!(result, payload);

        let created = interpret(StatusCode::CREATED, &body(json!({"queued": 3}))).unwrap();
        assert_eq!(created, json!({"queued": 3}));
    }

    #[test]
    fn success_with_unparseable_body_is_empty_object() {
        assert_eq!(interpret(StatusCode::OK, b"").unwrap(), json!({}));
        assert_eq!(interpret(StatusCode::OK, b"<html>ok</html>").unwrap(), json!({}));
    }

    #[test]
    fn error_field_wins() {
        let err = interpret(
            StatusCode::UNAUTHORIZED,
            &body(json!({"error": "invalid credentials", "message": "ignored"})),
        )
        .unwrap_err();

        assert_eq!(err.message(), "invalid credentials");
    }

    #[test]
    fn message_field_is_second_choice() {
        let err = interpret(
            StatusCode::BAD_REQUEST,
            &body(json!({"message": "name is required"})),
        )
        .unwrap_err();

        assert_eq!(err.message(), "name is required");
    }

    #[test]
    fn falls_back_to_status_code() {
        let err = interpret(StatusCode::INTERNAL_SERVER_ERROR, &body(json!({}))).unwrap_err();
        assert_eq!(err.message(), "HTTP 500");

        let err = interpret(StatusCode::BAD_GATEWAY, b"upstream timed out").unwrap_err();
        assert_eq!(err.message(), "HTTP 502");

        let err =
            interpret(StatusCode::NOT_FOUND, &body(json!(["not", "an", "object"]))).unwrap_err();
        assert_eq!(err.message(), "HTTP 404");
    }

    #[test]
    fn empty_fields_are_skipped() {
        let err = interpret(
            StatusCode::FORBIDDEN,
            &body(json!({"error": "", "message": null})),
        )
        .unwrap_err();
        assert_eq!(err.message(), "HTTP 403");

        let err = interpret(
            StatusCode::CONFLICT,
            &body(json!({"error": false, "message": "already queued"})),
        )
        .unwrap_err();
        assert_eq!(err.message(), "already queued");
    }

    #[test]
    fn non_string_fields_render_as_json() {
        let err = interpret(
            StatusCode::UNPROCESSABLE_ENTITY,
            &body(json!({"error": {"field": "name"}})),
        )
        .unwrap_err();

        assert_eq!(err.message(), r#"{"field":"name"}"#);
    }

    #[test]
    fn redirect_status_is_a_failure() {
        let err = interpret(StatusCode::NOT_MODIFIED, b"").unwrap_err();
        assert_eq!(err.message(), "HTTP 304");
    }

    #[tokio::test]
    async fn relative_url_without_origin_fails_as_api_error() {
        let gateway = Gateway::new(GatewayConfig::default());
        let err = gateway.get("/authors-get").await.unwrap_err();

        assert!(
            err.message().contains("relative URL without a base"),
            "unexpected message: {}",
            err.message()
        );
    }
}
