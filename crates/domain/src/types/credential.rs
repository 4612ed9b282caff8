//! Sign-in credential and the bearer token it is exchanged for
//!
//! Both types hold their secret in a [`Zeroizing`] buffer and redact it from
//! `Debug` output. Neither implements `Serialize`.

use std::fmt;

use chrono::{DateTime, Utc};
use zeroize::Zeroizing;

use crate::errors::{Result, SyncError};

/// Resource-owner credential used for the password grant.
#[derive(Clone)]
pub struct Credential {
    client_id: String,
    tenant_id: String,
    user_principal: String,
    secret: Zeroizing<String>,
}

impl Credential {
    /// Build a credential, rejecting empty or whitespace-only fields.
    pub fn new(
        client_id: impl Into<String>,
        tenant_id: impl Into<String>,
        user_principal: impl Into<String>,
        secret: impl Into<String>,
    ) -> Result<Self> {
        let credential = Self {
            client_id: client_id.into(),
            tenant_id: tenant_id.into(),
            user_principal: user_principal.into(),
            secret: Zeroizing::new(secret.into()),
        };

        for (name, value) in [
            ("client id", credential.client_id.as_str()),
            ("tenant id", credential.tenant_id.as_str()),
            ("user principal", credential.user_principal.as_str()),
            ("password", credential.secret.as_str()),
        ] {
            if value.trim().is_empty() {
                return Err(SyncError::Config(format!("{name} is not configured")));
            }
        }

        Ok(credential)
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn tenant_id(&self) -> &str {
        &self.tenant_id
    }

    pub fn user_principal(&self) -> &str {
        &self.user_principal
    }

    /// Expose the secret for the token request body. Callers must not log it.
    pub fn expose_secret(&self) -> &str {
        &self.secret
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("client_id", &self.client_id)
            .field("tenant_id", &self.tenant_id)
            .field("user_principal", &self.user_principal)
            .field("secret", &"[redacted]")
            .finish()
    }
}

/// Opaque bearer token.
///
/// `expires_at` is informational; the job re-authenticates on every run and
/// never refreshes.
#[derive(Clone)]
pub struct AccessToken {
    value: Zeroizing<String>,
    expires_at: Option<DateTime<Utc>>,
}

impl AccessToken {
    pub fn new(value: impl Into<String>, expires_at: Option<DateTime<Utc>>) -> Self {
        Self { value: Zeroizing::new(value.into()), expires_at }
    }

    pub fn secret(&self) -> &str {
        &self.value
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("value", &"[redacted]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_blank_fields() {
        let err = Credential::new("client", "tenant", "  ", "pw").unwrap_err();
        assert_eq!(err, SyncError::Config("user principal is not configured".into()));

        let err = Credential::new("client", "tenant", "svc@contoso.com", "").unwrap_err();
        assert_eq!(err, SyncError::Config("password is not configured".into()));
    }

    #[test]
    fn debug_output_redacts_secrets() {
        let credential =
            Credential::new("client", "tenant", "svc@contoso.com", "hunter2").unwrap();
        let rendered = format!("{credential:?}");
        assert!(rendered.contains("svc@contoso.com"));
        assert!(!rendered.contains("hunter2"));

        let token = AccessToken::new("eyJ0eXAi.secret", None);
        assert!(!format!("{token:?}").contains("eyJ0eXAi"));
        assert_eq!(token.secret(), "eyJ0eXAi.secret");
    }
}
