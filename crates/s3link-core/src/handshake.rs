// SPDX-License-Identifier: AGPL-3.0
// S3Link Core - Backend handshake
//
// The session talks to its backend only through `Handshake`, so the
// simulated backend below can be swapped for a real client.

use crate::config::SessionConfig;
use crate::types::{AppError, Credentials};
use crate::validator;
use std::collections::HashSet;
use std::future::Future;
use std::time::Duration;

/// What a backend reports after accepting a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandshakeReply {
    pub bucket: String,
    pub region: String,
}

/// One request/response exchange that establishes or rejects a session
pub trait Handshake: Send + Sync + 'static {
    /// Attempt to open a session. Called with normalized credentials.
    fn handshake(
        &self,
        credentials: Credentials,
    ) -> impl Future<Output = Result<HandshakeReply, AppError>> + Send;
}

/// Local stand-in for a storage backend.
///
/// Accepts a credential set when it passes [`validator::validate`] and the
/// bucket is on the known-good list; every other well-formed bucket fails
/// with [`AppError::NetworkUnreachable`].
#[derive(Debug, Clone)]
pub struct SimulatedBackend {
    latency: Duration,
    known_buckets: HashSet<String>,
}

impl SimulatedBackend {
    pub fn new(latency: Duration, known_buckets: impl IntoIterator<Item = String>) -> Self {
        Self {
            latency,
            known_buckets: known_buckets.into_iter().collect(),
        }
    }

    pub fn from_config(config: &SessionConfig) -> Self {
        Self::new(config.handshake_latency(), config.known_buckets.clone())
    }

    pub fn latency(&self) -> Duration {
        self.latency
    }

    pub fn accepts_bucket(&self, bucket: &str) -> bool {
        self.known_buckets.contains(bucket)
    }
}

impl Default for SimulatedBackend {
    fn default() -> Self {
        Self::from_config(&SessionConfig::default())
    }
}

impl Handshake for SimulatedBackend {
    async fn handshake(&self, credentials: Credentials) -> Result<HandshakeReply, AppError> {
        tracing::debug!(bucket = %credentials.bucket, latency = ?self.latency, "Simulated handshake started");
        tokio::time::sleep(self.latency).await;

        let credentials = validator::normalize_and_validate(&credentials)?;

        if self.accepts_bucket(&credentials.bucket) {
            Ok(HandshakeReply {
                bucket: credentials.bucket,
                region: credentials.region,
            })
        } else {
            tracing::debug!(bucket = %credentials.bucket, "Simulated backend rejected bucket");
            Err(AppError::NetworkUnreachable)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CredentialField, ValidationReason};

    fn creds(bucket: &str) -> Credentials {
        Credentials::new("A".repeat(20), "B".repeat(40), "us-east-1", bucket)
    }

    #[tokio::test(start_paused = true)]
    async fn test_known_bucket_is_accepted() {
        let backend = SimulatedBackend::default();
        let reply = backend.handshake(creds("demo-s3-bucket")).await.unwrap();
        assert_eq!(reply.bucket, "demo-s3-bucket");
        assert_eq!(reply.region, "us-east-1");
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_bucket_is_a_network_error() {
        let backend = SimulatedBackend::default();
        let err = backend.handshake(creds("other-bucket")).await.unwrap_err();
        assert_eq!(err, AppError::NetworkUnreachable);
    }

    #[tokio::test(start_paused = true)]
    async fn test_backend_applies_the_same_format_rules() {
        let backend = SimulatedBackend::new(Duration::ZERO, vec!["Bad_Bucket".to_string()]);
        let err = backend.handshake(creds("Bad_Bucket")).await.unwrap_err();
        assert_eq!(
            err,
            AppError::validation(CredentialField::Bucket, ValidationReason::InvalidFormat)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_handshake_takes_configured_latency() {
        let backend = SimulatedBackend::default();
        let start = tokio::time::Instant::now();
        let _ = backend.handshake(creds("demo-s3-bucket")).await;
        assert!(start.elapsed() >= Duration::from_millis(1400));
    }
}
