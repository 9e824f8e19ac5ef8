// SPDX-License-Identifier: AGPL-3.0
// S3Link Core - Type definitions

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the four credential fields a connect attempt needs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CredentialField {
    AccessKey,
    SecretKey,
    Region,
    Bucket,
}

impl CredentialField {
    /// All fields, in the order the validator checks them for presence
    pub const ALL: [CredentialField; 4] = [
        CredentialField::AccessKey,
        CredentialField::SecretKey,
        CredentialField::Region,
        CredentialField::Bucket,
    ];

    /// Key used in the persisted store document
    pub fn storage_key(&self) -> &'static str {
        match self {
            Self::AccessKey => "accessKey",
            Self::SecretKey => "secretKey",
            Self::Region => "region",
            Self::Bucket => "bucket",
        }
    }

    /// Parse a storage key back into a field
    pub fn from_storage_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.storage_key() == key)
    }

    /// Message key for the field's display label
    pub fn label_key(&self) -> &'static str {
        match self {
            Self::AccessKey => "field.accessKey",
            Self::SecretKey => "field.secretKey",
            Self::Region => "field.region",
            Self::Bucket => "field.bucket",
        }
    }
}

impl fmt::Display for CredentialField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.storage_key())
    }
}

/// The four-field tuple needed to address a storage backend
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    pub access_key: String,
    pub secret_key: String,
    pub region: String,
    pub bucket: String,
}

impl Credentials {
    pub fn new(
        access_key: impl Into<String>,
        secret_key: impl Into<String>,
        region: impl Into<String>,
        bucket: impl Into<String>,
    ) -> Self {
        Self {
            access_key: access_key.into(),
            secret_key: secret_key.into(),
            region: region.into(),
            bucket: bucket.into(),
        }
    }

    /// Borrow a single field's value
    pub fn field(&self, field: CredentialField) -> &str {
        match field {
            CredentialField::AccessKey => &self.access_key,
            CredentialField::SecretKey => &self.secret_key,
            CredentialField::Region => &self.region,
            CredentialField::Bucket => &self.bucket,
        }
    }

    /// Mutable access to a single field
    pub fn field_mut(&mut self, field: CredentialField) -> &mut String {
        match field {
            CredentialField::AccessKey => &mut self.access_key,
            CredentialField::SecretKey => &mut self.secret_key,
            CredentialField::Region => &mut self.region,
            CredentialField::Bucket => &mut self.bucket,
        }
    }

    /// Copy with surrounding whitespace removed from every field
    pub fn normalized(&self) -> Self {
        Self {
            access_key: self.access_key.trim().to_string(),
            secret_key: self.secret_key.trim().to_string(),
            region: self.region.trim().to_string(),
            bucket: self.bucket.trim().to_string(),
        }
    }
}

// Secrets stay out of logs: only a short access key prefix is shown.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix: String = self.access_key.chars().take(4).collect();
        f.debug_struct("Credentials")
            .field("access_key", &format_args!("{}****", prefix))
            .field("secret_key", &"<redacted>")
            .field("region", &self.region)
            .field("bucket", &self.bucket)
            .finish()
    }
}

/// Controls whether resolved text shows English, the local language, or both
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DisplayMode {
    #[serde(rename = "en")]
    English,
    #[serde(rename = "local")]
    LocalLanguage,
    #[default]
    #[serde(rename = "dual")]
    Dual,
}

/// Lifecycle state of the connection session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SessionStatus {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    Failed,
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Why a field failed validation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationReason {
    #[serde(rename = "required")]
    Required,
    #[serde(rename = "invalid-format")]
    InvalidFormat,
}

impl fmt::Display for ValidationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Required => f.write_str("required"),
            Self::InvalidFormat => f.write_str("invalid-format"),
        }
    }
}

/// Category of an [`ErrorInfo`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorKind {
    Validation,
    Handshake,
    Persistence,
    MissingTranslation,
    Other,
}

/// Serializable form of the last session error, suitable for rendering
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorInfo {
    pub kind: ErrorKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<CredentialField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<ValidationReason>,
    pub message: String,
}

impl From<&AppError> for ErrorInfo {
    fn from(err: &AppError) -> Self {
        match err {
            AppError::Validation { field, reason } => ErrorInfo {
                kind: ErrorKind::Validation,
                field: Some(*field),
                reason: Some(*reason),
                message: err.to_string(),
            },
            AppError::Handshake(message) => ErrorInfo {
                kind: ErrorKind::Handshake,
                field: None,
                reason: None,
                message: message.clone(),
            },
            AppError::NetworkUnreachable => ErrorInfo {
                kind: ErrorKind::Handshake,
                field: None,
                reason: None,
                message: err.to_string(),
            },
            AppError::Persistence(_) | AppError::Serialization(_) => ErrorInfo {
                kind: ErrorKind::Persistence,
                field: None,
                reason: None,
                message: err.to_string(),
            },
            AppError::MissingTranslation(_) => ErrorInfo {
                kind: ErrorKind::MissingTranslation,
                field: None,
                reason: None,
                message: err.to_string(),
            },
            _ => ErrorInfo {
                kind: ErrorKind::Other,
                field: None,
                reason: None,
                message: err.to_string(),
            },
        }
    }
}

/// Point-in-time view of the connection session for rendering
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub status: SessionStatus,
    pub bucket: Option<String>,
    pub region: Option<String>,
    pub last_error: Option<ErrorInfo>,
}

/// Error types for the session core
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AppError {
    #[error("Invalid {field}: {reason}")]
    Validation {
        field: CredentialField,
        reason: ValidationReason,
    },

    #[error("Handshake failed: {0}")]
    Handshake(String),

    #[error("Network error: storage backend unreachable")]
    NetworkUnreachable,

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Missing translation: {0}")]
    MissingTranslation(String),

    #[error("Session is busy ({0})")]
    Busy(SessionStatus),

    #[error("Connection attempt was cancelled")]
    Cancelled,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl AppError {
    pub fn validation(field: CredentialField, reason: ValidationReason) -> Self {
        AppError::Validation { field, reason }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Persistence(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}
