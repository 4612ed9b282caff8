//! Bearer-token request decoration
//!
//! Attaches `Authorization: Bearer <token>` to outgoing Graph requests. The
//! authenticator holds nothing but the token and does not refresh it.

use std::sync::Arc;

use calsync_domain::AccessToken;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Request, RequestBuilder};

use crate::errors::TransportError;

/// Decorates requests with a bearer token.
#[derive(Clone, Debug)]
pub struct BearerAuthenticator {
    token: Arc<AccessToken>,
}

impl BearerAuthenticator {
    pub fn new(token: AccessToken) -> Self {
        Self { token: Arc::new(token) }
    }

    /// Add the header to a request that is still being built.
    pub fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        builder.bearer_auth(self.token.secret())
    }

    /// Add the header to an already-built request, replacing any existing
    /// `Authorization` value.
    pub fn authorize_request(&self, request: &mut Request) -> Result<(), TransportError> {
        self.authorize_headers(request.headers_mut())
    }

    /// Add the header to a raw header map, replacing any existing
    /// `Authorization` value.
    pub fn authorize_headers(&self, headers: &mut HeaderMap) -> Result<(), TransportError> {
        headers.insert(AUTHORIZATION, self.header_value()?);
        Ok(())
    }

    fn header_value(&self) -> Result<HeaderValue, TransportError> {
        let mut value = HeaderValue::from_str(&format!("Bearer {}", self.token.secret()))
            .map_err(|_| TransportError("access token contains invalid header characters".into()))?;
        value.set_sensitive(true);
        Ok(value)
    }
}
