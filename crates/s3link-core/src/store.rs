// SPDX-License-Identifier: AGPL-3.0
// S3Link Core - Credential persistence
//
// Credentials and the display mode are stored in a local JSON file.
// If the file cannot be read or written the store keeps working in memory;
// persistence failures are logged and never reach the caller.

use crate::config::SessionConfig;
use crate::types::{AppError, CredentialField, Credentials, DisplayMode};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

const STORE_FILE_NAME: &str = "session.json";

/// On-disk layout. Every entry is optional and falls back to its default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct StoredState {
    access_key: String,
    secret_key: String,
    region: String,
    bucket: String,
    display_mode: DisplayMode,
}

impl StoredState {
    fn field_mut(&mut self, field: CredentialField) -> &mut String {
        match field {
            CredentialField::AccessKey => &mut self.access_key,
            CredentialField::SecretKey => &mut self.secret_key,
            CredentialField::Region => &mut self.region,
            CredentialField::Bucket => &mut self.bucket,
        }
    }

    fn field(&self, field: CredentialField) -> &str {
        match field {
            CredentialField::AccessKey => &self.access_key,
            CredentialField::SecretKey => &self.secret_key,
            CredentialField::Region => &self.region,
            CredentialField::Bucket => &self.bucket,
        }
    }
}

/// In-memory copy of the stored values, written through to disk when possible
pub struct CredentialStore {
    state: RwLock<StoredState>,
    file_path: Option<PathBuf>,
}

impl CredentialStore {
    /// Create a store from config. Falls back to memory when no location
    /// can be determined or persistence is disabled.
    pub fn new(config: &SessionConfig) -> Self {
        if !config.persistence {
            tracing::info!("Persistence disabled, using in-memory credential store");
            return Self::in_memory();
        }

        let path = match &config.store_path {
            Some(path) => Some(path.clone()),
            None => Self::default_store_path(),
        };

        match path {
            Some(path) => Self::with_path(path),
            None => {
                tracing::warn!("Could not determine config directory, using in-memory store");
                Self::in_memory()
            }
        }
    }

    /// Create a store backed by the given file, loading it if present
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        let file_path = path.into();
        tracing::info!("Credential store path: {:?}", file_path);
        let state = Self::load(&file_path);

        Self {
            state: RwLock::new(state),
            file_path: Some(file_path),
        }
    }

    /// Create a store that never touches disk
    pub fn in_memory() -> Self {
        Self {
            state: RwLock::new(StoredState::default()),
            file_path: None,
        }
    }

    fn default_store_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "s3link", "s3link")
            .map(|dirs| dirs.config_dir().join(STORE_FILE_NAME))
    }

    fn load(path: &Path) -> StoredState {
        if !path.exists() {
            tracing::info!("No store file found, using defaults");
            return StoredState::default();
        }

        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!("Failed to read store file, using defaults: {}", e);
                return StoredState::default();
            }
        };

        serde_json::from_str(&content).unwrap_or_else(|e| {
            tracing::warn!("Failed to parse store file, using defaults: {}", e);
            StoredState::default()
        })
    }

    /// Location of the backing file, if any
    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    /// Write the current state to disk
    fn persist(&self) -> Result<(), AppError> {
        let Some(path) = &self.file_path else {
            return Ok(());
        };

        let content = {
            let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
            serde_json::to_string_pretty(&*state)?
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| AppError::Persistence(format!("Failed to create store dir: {}", e)))?;
        }

        fs::write(path, content)
            .map_err(|e| AppError::Persistence(format!("Failed to write store: {}", e)))?;

        Ok(())
    }

    /// Persist, logging instead of returning failures
    fn persist_best_effort(&self) {
        match self.persist() {
            Ok(()) => tracing::debug!("Credential store persisted"),
            Err(e) => tracing::warn!("Keeping credential store in memory only: {}", e),
        }
    }

    /// Current value of a credential field, `""` when unset
    pub fn get(&self, field: CredentialField) -> String {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state.field(field).to_string()
    }

    /// Update a single credential field
    pub fn set(&self, field: CredentialField, value: impl Into<String>) {
        {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            *state.field_mut(field) = value.into();
        }
        self.persist_best_effort();
    }

    /// The stored credential tuple, for pre-filling a form on restart
    pub fn credentials(&self) -> Credentials {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        Credentials::new(
            state.access_key.clone(),
            state.secret_key.clone(),
            state.region.clone(),
            state.bucket.clone(),
        )
    }

    /// Replace all four credential fields in one write
    pub fn save_credentials(&self, credentials: &Credentials) {
        {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            for field in CredentialField::ALL {
                *state.field_mut(field) = credentials.field(field).to_string();
            }
        }
        tracing::info!(bucket = %credentials.bucket, "Saving credentials");
        self.persist_best_effort();
    }

    /// Reset every credential field to `""`. The display mode is kept.
    pub fn clear_credentials(&self) {
        {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            for field in CredentialField::ALL {
                state.field_mut(field).clear();
            }
        }
        tracing::info!("Clearing stored credentials");
        self.persist_best_effort();
    }

    pub fn display_mode(&self) -> DisplayMode {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .display_mode
    }

    pub fn set_display_mode(&self, mode: DisplayMode) {
        {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            state.display_mode = mode;
        }
        tracing::info!(?mode, "Display mode changed");
        self.persist_best_effort();
    }
}

impl Default for CredentialStore {
    fn default() -> Self {
        Self::in_memory()
    }
}
