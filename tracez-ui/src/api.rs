use async_trait::async_trait;
use gloo_net::http::Request;
use serde_json::Value;

use crate::engine::SpanSource;
use crate::error::{Result, TracezError};

/// Failure message for a non-2xx tracez response. A JSON `error` or
/// `message` field wins over the raw body.
fn http_error_message(url: &str, status: u16, body: &str) -> String {
    let detail = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|json| {
            json.get("error")
                .or_else(|| json.get("message"))
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.trim().to_string());

    if detail.is_empty() {
        format!("GET {url} returned HTTP {status}")
    } else {
        format!("GET {url} returned HTTP {status} ({detail})")
    }
}

/// Fetches tracez endpoints with the browser's `fetch`.
#[derive(Debug, Clone, Copy, Default)]
pub struct GlooSource;

#[async_trait(?Send)]
impl SpanSource for GlooSource {
    async fn fetch(&self, url: &str) -> Result<String> {
        let response = Request::get(url)
            .send()
            .await
            .map_err(|e| TracezError::FetchFailure(format!("GET {url} failed: {e}")))?;

        if !response.ok() {
            let body = response.text().await.unwrap_or_default();
            return Err(TracezError::FetchFailure(http_error_message(
                url,
                response.status(),
                &body,
            )));
        }

        response
            .text()
            .await
            .map_err(|e| TracezError::MalformedResponse(format!("{url}: unreadable body: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_message_names_the_endpoint() {
        assert_eq!(
            http_error_message("/tracez/get/error/foo", 404, ""),
            "GET /tracez/get/error/foo returned HTTP 404"
        );
        assert_eq!(
            http_error_message("/tracez/get/aggregations", 500, "  boom \n"),
            "GET /tracez/get/aggregations returned HTTP 500 (boom)"
        );
    }

    #[test]
    fn error_message_prefers_json_fields() {
        assert_eq!(
            http_error_message("/tracez/get/running/x", 503, r#"{"error": "draining"}"#),
            "GET /tracez/get/running/x returned HTTP 503 (draining)"
        );
        assert_eq!(
            http_error_message("/tracez/get/running/x", 400, r#"{"message": "bad span"}"#),
            "GET /tracez/get/running/x returned HTTP 400 (bad span)"
        );
    }
}
