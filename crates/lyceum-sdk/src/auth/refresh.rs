//! Credential-free refresh channel
//!
//! The refresh call never goes through the authenticated client: it has its own
//! reqwest client built from the same settings (base URL, timeouts, cookie jar)
//! and carries no bearer header, so a 401 from the refresh endpoint cannot
//! recurse into another refresh.

use super::types::{AuthError, AuthResult, RefreshedTokens};
use crate::error::ErrorResponse;
use crate::transport::HttpSettings;
use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, info};

/// Exchanges the current refresh credential for a new access token
///
/// `refresh_token` is `None` for deployments that keep the refresh credential
/// in an HTTP-only cookie.
#[async_trait]
pub trait RefreshTransport: Send + Sync {
    async fn refresh(&self, refresh_token: Option<&str>) -> AuthResult<RefreshedTokens>;
}

/// [`RefreshTransport`] posting to the backend refresh endpoint
#[derive(Debug, Clone)]
pub struct HttpRefreshTransport {
    http_client: reqwest::Client,
    url: String,
}

impl HttpRefreshTransport {
    pub fn new(
        base_url: &str,
        refresh_path: &str,
        settings: &HttpSettings,
    ) -> crate::error::Result<Self> {
        Ok(Self {
            http_client: settings.build_client()?,
            url: format!("{}{}", base_url.trim_end_matches('/'), refresh_path),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl RefreshTransport for HttpRefreshTransport {
    async fn refresh(&self, refresh_token: Option<&str>) -> AuthResult<RefreshedTokens> {
        debug!("Refreshing access token");

        let body = match refresh_token {
            Some(token) => json!({ "refreshToken": token }),
            None => json!({}),
        };

        let response = self
            .http_client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AuthError::Timeout
                } else {
                    AuthError::NetworkError(format!("Token refresh request failed: {}", e))
                }
            })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| {
            if e.is_timeout() {
                AuthError::Timeout
            } else {
                AuthError::NetworkError(format!("Failed to read refresh response: {}", e))
            }
        })?;

        if !status.is_success() {
            return Err(AuthError::RefreshRejected {
                status: status.as_u16(),
                message: ErrorResponse::message_from(status, &text),
            });
        }

        let tokens = parse_refresh_body(&text)?;
        info!("Token refresh completed successfully");
        Ok(tokens)
    }
}

/// Parse a 2xx refresh body, insisting on an access token
pub(crate) fn parse_refresh_body(text: &str) -> AuthResult<RefreshedTokens> {
    let tokens: RefreshedTokens = if text.trim().is_empty() {
        RefreshedTokens::default()
    } else {
        serde_json::from_str(text).map_err(|e| {
            AuthError::InvalidResponse(format!("Failed to parse token response: {}", e))
        })?
    };

    match tokens.access_token.as_deref() {
        Some(token) if !token.is_empty() => Ok(tokens),
        _ => Err(AuthError::MissingAccessToken),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wiremock::matchers::{body_json, header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn transport(server: &MockServer) -> HttpRefreshTransport {
        HttpRefreshTransport::new(
            &server.uri(),
            "/auth/refresh",
            &HttpSettings::new(Duration::from_secs(5)),
        )
        .unwrap()
    }

    #[test]
    fn test_parse_refresh_body() {
        let tokens = parse_refresh_body(r#"{"accessToken":"T2","refreshToken":"R2"}"#).unwrap();
        assert_eq!(tokens.access_token.as_deref(), Some("T2"));
        assert_eq!(tokens.refresh_token.as_deref(), Some("R2"));

        assert!(matches!(
            parse_refresh_body(r#"{"accessToken":""}"#),
            Err(AuthError::MissingAccessToken)
        ));
        assert!(matches!(
            parse_refresh_body(""),
            Err(AuthError::MissingAccessToken)
        ));
        assert!(matches!(
            parse_refresh_body("<html>"),
            Err(AuthError::InvalidResponse(_))
        ));
    }

    #[tokio::test]
    async fn test_refresh_sends_token_in_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/refresh"))
            .and(body_json(json!({"refreshToken": "R1"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "accessToken": "T2"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let tokens = transport(&server).refresh(Some("R1")).await.unwrap();
        assert_eq!(tokens.access_token.as_deref(), Some("T2"));
        assert!(tokens.refresh_token.is_none());
    }

    #[tokio::test]
    async fn test_refresh_never_sends_bearer() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/refresh"))
            .and(header_exists("authorization"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/auth/refresh"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "accessToken": "T2"
            })))
            .mount(&server)
            .await;

        assert!(transport(&server).refresh(None).await.is_ok());
    }

    #[tokio::test]
    async fn test_refresh_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/refresh"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "statusCode": 401,
                "message": "Refresh token expired"
            })))
            .mount(&server)
            .await;

        let err = transport(&server).refresh(Some("R1")).await.unwrap_err();
        assert!(matches!(
            err,
            AuthError::RefreshRejected { status: 401, ref message } if message == "Refresh token expired"
        ));
    }

    #[tokio::test]
    async fn test_refresh_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/refresh"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"accessToken": "T2"}))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let transport = HttpRefreshTransport::new(
            &server.uri(),
            "/auth/refresh",
            &HttpSettings::new(Duration::from_millis(50)),
        )
        .unwrap();

        assert!(matches!(
            transport.refresh(Some("R1")).await,
            Err(AuthError::Timeout)
        ));
    }
}
