use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use calsync_core::CredentialProvider;
use calsync_domain::{AccessToken, Credential, Result as DomainResult, SyncError};

/// Mock token issuer.
///
/// Succeeds with a fixed token unless configured to fail. Records every scope
/// set it was asked for.
#[derive(Clone, Default)]
pub struct MockCredentialProvider {
    failure: Option<SyncError>,
    delay: Option<Duration>,
    calls: Arc<AtomicUsize>,
    scopes: Arc<Mutex<Vec<Vec<String>>>>,
}

impl MockCredentialProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(message: &str) -> Self {
        Self { failure: Some(SyncError::Auth(message.to_string())), ..Self::default() }
    }

    /// Block for `delay` before answering, so tests can cancel mid-call.
    pub fn slow(delay: Duration) -> Self {
        Self { delay: Some(delay), ..Self::default() }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requested_scopes(&self) -> Vec<Vec<String>> {
        self.scopes.lock().unwrap().clone()
    }
}

#[async_trait]
impl CredentialProvider for MockCredentialProvider {
    async fn authenticate(
        &self,
        _credential: &Credential,
        scopes: &[&str],
    ) -> DomainResult<AccessToken> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.scopes.lock().unwrap().push(scopes.iter().map(|s| s.to_string()).collect());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match &self.failure {
            Some(err) => Err(err.clone()),
            None => Ok(AccessToken::new("mock-token", None)),
        }
    }
}
