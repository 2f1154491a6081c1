use crate::core::error::{ClientError, Result};
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error};

/// Turns a non-2xx response into [`ClientError::Http`], passing 2xx through.
pub async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    debug!(%status, body = %body, "Backend returned an error status");
    Err(ClientError::http(status, error_detail(status, &body)))
}

/// Reads a successful response body as JSON of the expected shape.
///
/// Bodies can carry link or access tokens, so only their length is logged.
pub async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    let response = check_status(response).await?;
    let text = response.text().await?;

    if text.trim().is_empty() {
        return Err(ClientError::Validation("Received empty response".into()));
    }

    serde_json::from_str(&text).map_err(|e| {
        error!(error = ?e, body_len = text.len(), "Failed to parse backend response");
        ClientError::Validation(format!("Unexpected response shape: {e}"))
    })
}

/// Picks the most useful explanation out of an error body.
///
/// The backend answers errors with `{"detail": ...}` where `detail` is either
/// a string or an object carrying an `error` field.
pub fn error_detail(status: StatusCode, body: &str) -> String {
    let from_json = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|json| json.get("detail").cloned())
        .and_then(|detail| match detail {
            Value::String(s) => Some(s),
            Value::Object(ref map) => map
                .get("error")
                .and_then(Value::as_str)
                .map(str::to_string)
                .or_else(|| Some(detail.to_string())),
            Value::Null => None,
            other => Some(other.to_string()),
        })
        .filter(|s| !s.trim().is_empty());

    if let Some(detail) = from_json {
        return detail;
    }

    let body = body.trim();
    if !body.is_empty() {
        return body.to_string();
    }

    status
        .canonical_reason()
        .unwrap_or("Request failed")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_detail() {
        let body = r#"{"detail": "Backtest failed: no data for symbol"}"#;
        assert_eq!(
            error_detail(StatusCode::INTERNAL_SERVER_ERROR, body),
            "Backtest failed: no data for symbol"
        );
    }

    #[test]
    fn test_object_detail() {
        let body = r#"{"detail": {"error": "public_token is required"}}"#;
        assert_eq!(
            error_detail(StatusCode::UNPROCESSABLE_ENTITY, body),
            "public_token is required"
        );

        let body = r#"{"detail": {"code": 7}}"#;
        assert_eq!(error_detail(StatusCode::BAD_REQUEST, body), r#"{"code":7}"#);
    }

    #[test]
    fn test_fallbacks() {
        assert_eq!(
            error_detail(StatusCode::BAD_GATEWAY, "upstream down"),
            "upstream down"
        );
        assert_eq!(error_detail(StatusCode::UNAUTHORIZED, ""), "Unauthorized");
        assert_eq!(
            error_detail(StatusCode::NOT_FOUND, r#"{"detail": null}"#),
            r#"{"detail": null}"#
        );
    }
}
