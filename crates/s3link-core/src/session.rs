// SPDX-License-Identifier: AGPL-3.0
// S3Link Core - Connection session
//
// Disconnected -> Connecting -> Connected | Failed -> Disconnected
//
// The handshake is the only await point. Each attempt gets a generation
// number and a cancellation token; a disconnect bumps the generation and
// cancels the token, and a handshake result whose generation is no longer
// current is dropped without touching the session.

use crate::context::AppContext;
use crate::handshake::{Handshake, HandshakeReply, SimulatedBackend};
use crate::notify::NotificationKind;
use crate::types::{
    AppError, CredentialField, Credentials, ErrorInfo, SessionSnapshot, SessionStatus,
    ValidationReason,
};
use crate::validator;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

/// Result of a successful connect
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectOutcome {
    /// Confirmation text, resolved under the current display mode
    pub message: String,
    pub bucket: String,
    pub region: String,
}

#[derive(Default)]
struct SessionState {
    status: SessionStatus,
    bucket: Option<String>,
    region: Option<String>,
    last_error: Option<ErrorInfo>,
    generation: u64,
    pending: Option<CancellationToken>,
}

impl SessionState {
    fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            status: self.status,
            bucket: self.bucket.clone(),
            region: self.region.clone(),
            last_error: self.last_error.clone(),
        }
    }
}

/// One client's connection to a storage backend
pub struct Session<H: Handshake = SimulatedBackend> {
    ctx: AppContext,
    backend: H,
    state: Mutex<SessionState>,
    snapshots: watch::Sender<SessionSnapshot>,
}

impl Session<SimulatedBackend> {
    /// Session backed by the simulated backend configured in `ctx`
    pub fn simulated(ctx: AppContext) -> Self {
        let backend = SimulatedBackend::from_config(ctx.config());
        Self::new(ctx, backend)
    }
}

impl<H: Handshake> Session<H> {
    pub fn new(ctx: AppContext, backend: H) -> Self {
        let (snapshots, _) = watch::channel(SessionSnapshot::default());
        Self {
            ctx,
            backend,
            state: Mutex::new(SessionState::default()),
            snapshots,
        }
    }

    pub fn context(&self) -> &AppContext {
        &self.ctx
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.lock().snapshot()
    }

    pub fn status(&self) -> SessionStatus {
        self.lock().status
    }

    /// Receive a new snapshot after every transition
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshots.subscribe()
    }

    /// Validate the credentials and run one handshake.
    ///
    /// Rejected with [`AppError::Busy`] while connecting or connected.
    /// Returns [`AppError::Cancelled`] when a disconnect overtook the attempt.
    /// Dropping the returned future before it completes leaves the session
    /// `Failed` with a cancellation error.
    pub async fn connect(&self, credentials: Credentials) -> Result<ConnectOutcome, AppError> {
        let (generation, token) = {
            let mut state = self.lock();
            if matches!(
                state.status,
                SessionStatus::Connecting | SessionStatus::Connected
            ) {
                tracing::warn!(status = %state.status, "Rejecting connect, session is busy");
                return Err(AppError::Busy(state.status));
            }

            state.generation += 1;
            state.status = SessionStatus::Connecting;
            let token = CancellationToken::new();
            state.pending = Some(token.clone());
            self.publish(&state);
            (state.generation, token)
        };
        tracing::info!(generation, ?credentials, "Connecting");
        let mut guard = AttemptGuard {
            session: self,
            generation,
            armed: true,
        };

        let credentials = match validator::normalize_and_validate(&credentials) {
            Ok(credentials) => credentials,
            Err(err) => {
                guard.disarm();
                return Err(self.fail(generation, err));
            }
        };

        let result = tokio::select! {
            biased;
            _ = token.cancelled() => {
                guard.disarm();
                tracing::info!(generation, "Handshake cancelled by disconnect");
                return Err(AppError::Cancelled);
            }
            result = self.backend.handshake(credentials.clone()) => result,
        };

        guard.disarm();
        match result {
            Ok(reply) => self.succeed(generation, &credentials, reply),
            Err(err) => Err(self.fail(generation, err)),
        }
    }

    /// Called when a connect future is dropped mid-attempt
    fn abandon(&self, generation: u64) {
        {
            let mut state = self.lock();
            if state.generation != generation || state.status != SessionStatus::Connecting {
                return;
            }
            if let Some(token) = state.pending.take() {
                token.cancel();
            }
            state.status = SessionStatus::Failed;
            let mut info = ErrorInfo::from(&AppError::Cancelled);
            info.message = self.ctx.text("connection.cancelled");
            state.last_error = Some(info);
            self.publish(&state);
        }

        tracing::warn!(generation, "Connect attempt dropped before completion");
        self.ctx
            .notifications()
            .notify(NotificationKind::Error, self.ctx.text("connection.cancelled"));
    }

    /// Drop the session from any state. Idempotent.
    ///
    /// Cancels an in-flight handshake and clears the stored credentials.
    pub fn disconnect(&self) {
        let previous = {
            let mut state = self.lock();
            if let Some(token) = state.pending.take() {
                token.cancel();
            }
            let previous = state.status;
            state.generation += 1;
            state.status = SessionStatus::Disconnected;
            state.bucket = None;
            state.region = None;
            state.last_error = None;
            self.publish(&state);
            previous
        };

        self.ctx.store().clear_credentials();

        if previous != SessionStatus::Disconnected {
            tracing::info!(from = %previous, "Disconnected");
            self.ctx
                .notifications()
                .notify(NotificationKind::Info, self.ctx.text("disconnect.success"));
        }
    }

    fn succeed(
        &self,
        generation: u64,
        credentials: &Credentials,
        reply: HandshakeReply,
    ) -> Result<ConnectOutcome, AppError> {
        // Connected must always carry a well-formed bucket and region
        if validator::validate_field(CredentialField::Bucket, &reply.bucket).is_err()
            || validator::validate_field(CredentialField::Region, &reply.region).is_err()
        {
            let err = AppError::Handshake(format!(
                "Backend returned an invalid location: {}/{}",
                reply.region, reply.bucket
            ));
            return Err(self.fail(generation, err));
        }

        {
            let mut state = self.lock();
            if state.generation != generation || state.status != SessionStatus::Connecting {
                tracing::info!(generation, "Discarding stale handshake success");
                return Err(AppError::Cancelled);
            }
            state.status = SessionStatus::Connected;
            state.bucket = Some(reply.bucket.clone());
            state.region = Some(reply.region.clone());
            state.last_error = None;
            state.pending = None;
            self.publish(&state);
        }

        tracing::info!(bucket = %reply.bucket, region = %reply.region, "Connected");
        self.ctx.store().save_credentials(credentials);

        let message = self.ctx.text("connection.success");
        self.ctx
            .notifications()
            .notify(NotificationKind::Success, message.clone());

        Ok(ConnectOutcome {
            message,
            bucket: reply.bucket,
            region: reply.region,
        })
    }

    /// Move to Failed if `generation` is still current. Returns the error to
    /// hand back to the caller.
    fn fail(&self, generation: u64, err: AppError) -> AppError {
        let description = self.describe(&err);
        {
            let mut state = self.lock();
            if state.generation != generation || state.status != SessionStatus::Connecting {
                tracing::info!(generation, "Discarding stale handshake failure: {}", err);
                return AppError::Cancelled;
            }
            let mut info = ErrorInfo::from(&err);
            info.message = description.clone();
            state.status = SessionStatus::Failed;
            state.last_error = Some(info);
            state.pending = None;
            self.publish(&state);
        }

        tracing::info!("Connect failed: {}", err);
        let notice = match &err {
            AppError::Validation { .. } => description,
            _ => self.ctx.text("connection.error"),
        };
        self.ctx
            .notifications()
            .notify(NotificationKind::Error, notice);
        err
    }

    /// Display text for an error stored in `lastError`
    fn describe(&self, err: &AppError) -> String {
        match err {
            AppError::Validation {
                reason: ValidationReason::Required,
                ..
            } => self.ctx.text("validation.required"),
            AppError::Validation {
                field,
                reason: ValidationReason::InvalidFormat,
            } => format!(
                "{}: {}",
                self.ctx.text(field.label_key()),
                self.ctx.text("validation.invalidFormat")
            ),
            AppError::Handshake(message) => message.clone(),
            AppError::NetworkUnreachable => self.ctx.text("connection.networkError"),
            AppError::Cancelled => self.ctx.text("connection.cancelled"),
            other => other.to_string(),
        }
    }

    fn publish(&self, state: &SessionState) {
        self.snapshots.send_replace(state.snapshot());
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Moves an attempt to `Failed` if its connect future is dropped before
/// reaching a result
struct AttemptGuard<'a, H: Handshake> {
    session: &'a Session<H>,
    generation: u64,
    armed: bool,
}

impl<H: Handshake> AttemptGuard<'_, H> {
    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl<H: Handshake> Drop for AttemptGuard<'_, H> {
    fn drop(&mut self) {
        if self.armed {
            self.session.abandon(self.generation);
        }
    }
}
