// SPDX-License-Identifier: AGPL-3.0
// S3Link Core - Shared logic for all frontends
//
// This crate provides:
// - Credential validation and the Credentials/AppError types
// - CredentialStore for persistent credentials and display mode
// - Session, the connect/disconnect state machine
// - NotificationQueue for transient status messages
// - Catalog for English/local-language text
// - SessionBridge for driving a session from a UI loop
//
// Frontend-specific code lives in separate crates.

pub mod bridge;
pub mod config;
pub mod context;
pub mod handshake;
pub mod i18n;
pub mod notify;
pub mod session;
pub mod store;
pub mod types;
pub mod validator;

// Re-export commonly used items
pub use bridge::{SessionBridge, SessionCommand, SessionEvent};
pub use config::SessionConfig;
pub use context::AppContext;
pub use handshake::{Handshake, HandshakeReply, SimulatedBackend};
pub use i18n::Catalog;
pub use notify::{
    DismissReason, Notification, NotificationEvent, NotificationKind, NotificationQueue,
};
pub use session::{ConnectOutcome, Session};
pub use store::CredentialStore;
pub use types::{
    AppError, CredentialField, Credentials, DisplayMode, ErrorInfo, ErrorKind, SessionSnapshot,
    SessionStatus, ValidationReason,
};
pub use validator::validate;
