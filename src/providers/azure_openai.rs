use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::CheckError;
use crate::providers::http_errors::transport_error;
use crate::request::{API_KEY_HEADER, ChatRequest};

/// Status and undecoded body of a completed HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: StatusCode,
    pub body: String,
}

pub fn build_client(cfg: &Config) -> Result<Client, CheckError> {
    Client::builder()
        .timeout(Duration::from_secs(cfg.timeout_secs))
        .build()
        .map_err(CheckError::HttpClient)
}

/// Sends `request` once. Any status code counts as a response.
pub async fn send(
    client: &Client,
    cfg: &Config,
    request: &ChatRequest,
) -> Result<RawResponse, CheckError> {
    debug!(
        api_url = %request.url,
        deployment = %cfg.deployment,
        message_count = request.body.messages.len(),
        "sending chat completion request"
    );

    let response = client
        .post(&request.url)
        .header(API_KEY_HEADER, &cfg.api_key)
        .json(&request.body)
        .send()
        .await
        .map_err(|err| {
            warn!(
                api_url = %request.url,
                deployment = %cfg.deployment,
                error = %err,
                "chat completion request failed"
            );
            transport_error(err, &request.url, cfg.timeout_secs)
        })?;

    let status = response.status();
    let body = response.text().await.map_err(|err| {
        warn!(
            api_url = %request.url,
            status = %status,
            error = %err,
            "failed to read response body"
        );
        transport_error(err, &request.url, cfg.timeout_secs)
    })?;

    if status.is_success() {
        debug!(status = %status, response_body_len = body.len(), "received chat completion response");
    } else {
        warn!(
            api_url = %request.url,
            status = %status,
            response_body_len = body.len(),
            "endpoint returned non-success status"
        );
    }

    Ok(RawResponse { status, body })
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::{build_client, send};
    use crate::config::Config;
    use crate::error::CheckError;
    use crate::request::ChatRequest;

    fn mock_config(server: &MockServer) -> Config {
        Config {
            endpoint: server.uri(),
            api_key: "test-api-key".to_string(),
            deployment: "gpt-4o".to_string(),
            api_version: "2023-05-15".to_string(),
            timeout_secs: 5,
            verbose: false,
        }
    }

    #[tokio::test]
    async fn send_posts_fixed_body_with_api_key_header() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/openai/deployments/gpt-4o/chat/completions"))
            .and(query_param("api-version", "2023-05-15"))
            .and(header("api-key", "test-api-key"))
            .and(header("content-type", "application/json"))
            .and(body_json(json!({
                "messages": [
                    {"role": "system", "content": "You are a helpful assistant."},
                    {"role": "user", "content": "What is 7 multiplied by 8?"}
                ],
                "max_tokens": 512,
                "temperature": 0
            })))
            .respond_with(ResponseTemplate::new(200).set_body_string("{\"ok\":true}"))
            .expect(1)
            .mount(&server)
            .await;

        let cfg = mock_config(&server);
        let client = build_client(&cfg).expect("client should build");
        let response = send(&client, &cfg, &ChatRequest::new(&cfg))
            .await
            .expect("request should succeed");

        assert_eq!(response.status.as_u16(), 200);
        assert_eq!(response.body, "{\"ok\":true}");
    }

    #[tokio::test]
    async fn send_returns_non_success_status_as_response() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("Rate limit exceeded"))
            .mount(&server)
            .await;

        let cfg = mock_config(&server);
        let client = build_client(&cfg).expect("client should build");
        let response = send(&client, &cfg, &ChatRequest::new(&cfg))
            .await
            .expect("status errors are still responses");

        assert_eq!(response.status.as_u16(), 429);
        assert_eq!(response.body, "Rate limit exceeded");
    }

    #[tokio::test]
    async fn send_maps_unreachable_endpoint_to_transport_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind should succeed");
        let addr = listener.local_addr().expect("address should be available");
        drop(listener);

        let cfg = Config {
            endpoint: format!("http://{addr}"),
            api_key: "test-api-key".to_string(),
            deployment: "gpt-4o".to_string(),
            api_version: "2023-05-15".to_string(),
            timeout_secs: 1,
            verbose: false,
        };
        let client = build_client(&cfg).expect("client should build");
        let err = send(&client, &cfg, &ChatRequest::new(&cfg))
            .await
            .expect_err("request should fail");

        assert!(matches!(err, CheckError::Transport { .. }), "{err}");
        assert_eq!(err.exit_code(), 1);
        assert!(err.to_string().starts_with("Request failed:"), "{err}");
    }
}
