// SPDX-License-Identifier: AGPL-3.0
// S3Link Core - Session configuration

use crate::types::AppError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Bucket the simulated backend accepts out of the box
pub const DEFAULT_KNOWN_BUCKET: &str = "demo-s3-bucket";

/// Tunables for the session core
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionConfig {
    /// Artificial round-trip latency of the simulated handshake
    #[serde(default = "default_handshake_latency_ms")]
    pub handshake_latency_ms: u64,
    /// How long a notification stays visible before it expires
    #[serde(default = "default_notification_duration_ms")]
    pub notification_duration_ms: u64,
    /// Buckets the simulated backend accepts
    #[serde(default = "default_known_buckets")]
    pub known_buckets: Vec<String>,
    /// Location of the store file. None uses the platform config dir.
    #[serde(default)]
    pub store_path: Option<PathBuf>,
    /// Set to false to keep everything in memory
    #[serde(default = "default_persistence")]
    pub persistence: bool,
}

fn default_handshake_latency_ms() -> u64 {
    1400
}

fn default_notification_duration_ms() -> u64 {
    3500
}

fn default_known_buckets() -> Vec<String> {
    vec![DEFAULT_KNOWN_BUCKET.to_string()]
}

fn default_persistence() -> bool {
    true
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            handshake_latency_ms: default_handshake_latency_ms(),
            notification_duration_ms: default_notification_duration_ms(),
            known_buckets: default_known_buckets(),
            store_path: None,
            persistence: default_persistence(),
        }
    }
}

impl SessionConfig {
    /// Parse a JSON config document; missing keys take their defaults
    pub fn from_json_str(content: &str) -> Result<Self, AppError> {
        serde_json::from_str(content)
            .map_err(|e| AppError::InvalidConfig(format!("Failed to parse config: {}", e)))
    }

    pub fn handshake_latency(&self) -> Duration {
        Duration::from_millis(self.handshake_latency_ms)
    }

    pub fn notification_duration(&self) -> Duration {
        Duration::from_millis(self.notification_duration_ms)
    }

    /// Config with persistence disabled, for tests and sandboxed hosts
    pub fn in_memory() -> Self {
        Self {
            persistence: false,
            ..Self::default()
        }
    }
}
