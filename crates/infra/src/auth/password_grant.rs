//! Resource-owner password grant against the Microsoft identity platform
//!
//! Exchanges a user principal and password for a Graph token with a single
//! form POST. There is no caching and no refresh; every run signs in again.

use async_trait::async_trait;
use calsync_core::CredentialProvider;
use calsync_domain::{AccessToken, Credential, Result, SyncError};
use chrono::{Duration as ChronoDuration, Utc};
use reqwest::Method;
use serde::Deserialize;
use tracing::{error, info, instrument};
use url::Url;

use crate::errors::TransportError;
use crate::http::client::error_body;
use crate::http::HttpClient;

/// Token issuer for the password grant.
#[derive(Clone)]
pub struct PasswordGrantProvider {
    http: HttpClient,
    authority: Url,
}

impl PasswordGrantProvider {
    /// `authority_host` is the identity platform root, e.g.
    /// `https://login.microsoftonline.com`.
    pub fn new(http: HttpClient, authority_host: &str) -> Result<Self> {
        let authority = Url::parse(authority_host.trim()).map_err(|e| {
            SyncError::Config(format!("invalid authority host '{authority_host}': {e}"))
        })?;
        if authority.cannot_be_a_base() {
            return Err(SyncError::Config(format!(
                "authority host '{authority_host}' cannot be used as a base URL"
            )));
        }
        Ok(Self { http, authority })
    }

    fn token_endpoint(&self, tenant_id: &str) -> Result<Url> {
        let mut url = self.authority.clone();
        url.path_segments_mut()
            .map_err(|_| SyncError::Config("authority host cannot be a base URL".into()))?
            .pop_if_empty()
            .extend([tenant_id.trim(), "oauth2", "v2.0", "token"]);
        Ok(url)
    }
}

#[async_trait]
impl CredentialProvider for PasswordGrantProvider {
    #[instrument(skip(self, credential), fields(user = %credential.user_principal()))]
    async fn authenticate(&self, credential: &Credential, scopes: &[&str]) -> Result<AccessToken> {
        let endpoint = self.token_endpoint(credential.tenant_id())?;
        let scope = scopes.join(" ");

        let form = [
            ("client_id", credential.client_id()),
            ("scope", scope.as_str()),
            ("username", credential.user_principal()),
            ("password", credential.expose_secret()),
            ("grant_type", "password"),
        ];

        let response = self
            .http
            .send(self.http.request(Method::POST, endpoint).form(&form))
            .await
            .map_err(|e| auth_failure(e, "token request failed"))?;

        let status = response.status();
        if !status.is_success() {
            let body = error_body(response).await;
            let message = match serde_json::from_str::<AadErrorBody>(&body) {
                Ok(aad) => format!(
                    "{} ({}): {}",
                    aad.error,
                    status.as_u16(),
                    aad.error_description.unwrap_or_default().lines().next().unwrap_or_default()
                ),
                Err(_) => format!("token endpoint returned HTTP {}", status.as_u16()),
            };
            error!(status = status.as_u16(), %message, "authentication failed");
            return Err(SyncError::Auth(message));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| auth_failure(e.into(), "failed to parse token response"))?;

        if !token.token_type.as_deref().map_or(true, |t| t.eq_ignore_ascii_case("bearer")) {
            return Err(SyncError::Auth(format!(
                "unexpected token type '{}'",
                token.token_type.unwrap_or_default()
            )));
        }

        let expires_at = token
            .expires_in
            .and_then(|secs| i64::try_from(secs).ok())
            .map(|secs| Utc::now() + ChronoDuration::seconds(secs));

        info!("access token acquired");
        Ok(AccessToken::new(token.access_token, expires_at))
    }
}

fn auth_failure(err: TransportError, context: &str) -> SyncError {
    error!(error = %err, "{context}");
    SyncError::Auth(format!("{context}: {err}"))
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    token_type: Option<String>,
    expires_in: Option<u64>,
}

#[derive(Deserialize)]
struct AadErrorBody {
    error: String,
    error_description: Option<String>,
}

#[cfg(test)]
mod tests {
    use calsync_domain::constants::GRAPH_DEFAULT_SCOPE;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn credential() -> Credential {
        Credential::new("app-123", "contoso-tenant", "svc@contoso.com", "p@ss word").unwrap()
    }

    fn provider(server: &MockServer) -> PasswordGrantProvider {
        let http = HttpClient::builder().build().expect("http client");
        PasswordGrantProvider::new(http, &server.uri()).expect("provider")
    }

    #[tokio::test]
    async fn posts_password_grant_form_and_returns_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/contoso-tenant/oauth2/v2.0/token"))
            .and(header("content-type", "application/x-www-form-urlencoded"))
            .and(body_string_contains("grant_type=password"))
            .and(body_string_contains("client_id=app-123"))
            .and(body_string_contains("username=svc%40contoso.com"))
            .and(body_string_contains("password=p%40ss+word"))
            .and(body_string_contains("scope=https%3A%2F%2Fgraph.microsoft.com%2F.default"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "token_type": "Bearer",
                "scope": "https://graph.microsoft.com/Calendars.Read",
                "expires_in": 3599,
                "ext_expires_in": 3599,
                "access_token": "eyJ0eXAiOiJKV1Qi"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let token = provider(&server)
            .authenticate(&credential(), &[GRAPH_DEFAULT_SCOPE])
            .await
            .expect("token");

        assert_eq!(token.secret(), "eyJ0eXAiOiJKV1Qi");
        assert!(token.expires_at().is_some_and(|at| at > Utc::now()));
    }

    #[tokio::test]
    async fn invalid_grant_surfaces_aad_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/contoso-tenant/oauth2/v2.0/token"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": "invalid_grant",
                "error_description": "AADSTS50126: Error validating credentials due to invalid username or password.\r\nTrace ID: 0000",
                "error_codes": [50126]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let err = provider(&server)
            .authenticate(&credential(), &[GRAPH_DEFAULT_SCOPE])
            .await
            .unwrap_err();

        match err {
            SyncError::Auth(msg) => {
                assert!(msg.starts_with("invalid_grant (400): AADSTS50126"), "{msg}");
                assert!(!msg.contains("Trace ID"));
                assert!(!msg.contains("p@ss word"));
            }
            other => panic!("expected auth error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn non_json_failure_is_auth_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("<html>down</html>"))
            .mount(&server)
            .await;

        let err = provider(&server)
            .authenticate(&credential(), &[GRAPH_DEFAULT_SCOPE])
            .await
            .unwrap_err();

        assert_eq!(err, SyncError::Auth("token endpoint returned HTTP 503".into()));
    }

    #[tokio::test]
    async fn malformed_success_body_is_auth_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{\"token_type\":\"Bearer\"}"))
            .mount(&server)
            .await;

        let err = provider(&server)
            .authenticate(&credential(), &[GRAPH_DEFAULT_SCOPE])
            .await
            .unwrap_err();

        assert!(matches!(err, SyncError::Auth(msg) if msg.contains("parse token response")));
    }

    #[tokio::test]
    async fn unreachable_authority_is_auth_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let http = HttpClient::builder().build().unwrap();
        let provider = PasswordGrantProvider::new(http, &format!("http://{addr}")).unwrap();

        let err = provider.authenticate(&credential(), &[GRAPH_DEFAULT_SCOPE]).await.unwrap_err();
        assert_eq!(err.stage(), "auth");
    }

    #[test]
    fn token_endpoint_tolerates_trailing_slash() {
        let http = HttpClient::builder().build().unwrap();
        let provider = PasswordGrantProvider::new(http, "https://login.example.com/").unwrap();

        assert_eq!(
            provider.token_endpoint("tenant").unwrap().as_str(),
            "https://login.example.com/tenant/oauth2/v2.0/token"
        );
    }

    #[test]
    fn rejects_unparseable_authority() {
        let http = HttpClient::builder().build().unwrap();
        let err = PasswordGrantProvider::new(http, "not a url").err().unwrap();
        assert_eq!(err.stage(), "config");
    }
}
