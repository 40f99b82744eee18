// File: core/http.rs
// HTTP client factory and shared response helpers.

use super::config::ClientConfig;
use super::error::{CoreError, Result};
use reqwest::cookie::Jar;
use reqwest::{header, Client, Request, Response};
use std::sync::Arc;

/// Builds the client every endpoint goes through.
///
/// `jar` keeps whatever the site sets on login for the lifetime of the
/// client; the member cookie from the config is merged in per request.
pub fn create_http_client(config: &ClientConfig, jar: Arc<Jar>) -> Result<Client> {
    let mut headers = header::HeaderMap::new();
    let user_agent = header::HeaderValue::from_str(&config.user_agent)
        .map_err(|e| CoreError::InvalidHeader(format!("Invalid User-Agent: {}", e)))?;
    headers.insert(header::USER_AGENT, user_agent);

    let client = Client::builder()
        .default_headers(headers)
        .gzip(true)
        .brotli(true)
        .deflate(true)
        .cookie_provider(jar)
        .timeout(config.timeout)
        .connect_timeout(config.connect_timeout)
        .build()?;
    Ok(client)
}

/// Sends a prepared request. Non-2xx answers become `HttpStatus`, transport
/// failures stay `Network`.
pub async fn execute(client: &Client, request: Request) -> Result<Response> {
    log::debug!("{} {}", request.method(), request.url());

    let response = client.execute(request).await?;
    let status = response.status();
    if !status.is_success() {
        log::warn!(
            "Request to {} returned non-success status: {}",
            response.url(),
            status
        );
        return Err(CoreError::HttpStatus {
            status,
            url: response.url().to_string(),
        });
    }
    Ok(response)
}

/// Sends and buffers the whole body as text.
///
/// A body that breaks off mid-transfer surfaces as `Network`, so a
/// truncated page is never handed to a parser.
pub async fn fetch_text(client: &Client, request: Request) -> Result<String> {
    let text = execute(client, request).await?.text().await?;
    Ok(text)
}

pub async fn fetch_bytes(client: &Client, request: Request) -> Result<Vec<u8>> {
    let bytes = execute(client, request).await?.bytes().await?;
    Ok(bytes.to_vec())
}


#[cfg(test)]
mod tests {
    use super::test_server::{response, serve_once};
    use super::*;
    use std::time::Duration;

    fn client_with_timeout(millis: u64) -> Client {
        let config = ClientConfig::default().with_timeout(Duration::from_millis(millis));
        create_http_client(&config, Arc::new(Jar::default())).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_text_success() {
        let base = serve_once(Some(response("200 OK", "<html>ok</html>"))).await;
        let client = client_with_timeout(2_000);
        let request = client.get(&base).build().unwrap();

        let body = fetch_text(&client, request).await.unwrap();
        assert_eq!(body, "<html>ok</html>");
    }

    #[tokio::test]
    async fn test_non_success_status_is_http_status() {
        let base = serve_once(Some(response("404 Not Found", ""))).await;
        let client = client_with_timeout(2_000);
        let request = client.get(&base).build().unwrap();

        let err = fetch_text(&client, request).await.unwrap_err();
        assert_eq!(err.status(), Some(reqwest::StatusCode::NOT_FOUND));
        assert!(!err.is_timeout());
    }

    #[tokio::test]
    async fn test_timeout_is_network_failure() {
        let base = serve_once(None).await;
        let client = client_with_timeout(200);
        let request = client.get(&base).build().unwrap();

        let err = fetch_text(&client, request).await.unwrap_err();
        assert!(matches!(err, CoreError::Network(_)));
        assert!(err.is_timeout());
        assert_eq!(err.status(), None);
    }

    #[test]
    fn test_invalid_user_agent_is_rejected() {
        let mut config = ClientConfig::default();
        config.user_agent = "bad\nagent".to_string();
        let err = create_http_client(&config, Arc::new(Jar::default())).unwrap_err();
        assert!(matches!(err, CoreError::InvalidHeader(_)));
    }
}
