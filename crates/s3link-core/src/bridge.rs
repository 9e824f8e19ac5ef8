// SPDX-License-Identifier: AGPL-3.0
// S3Link Core - Frontend bridge
//
// Bridges a Session with a UI loop over channels: the frontend sends
// commands and drains one event stream of session snapshots and
// notification changes.

use crate::handshake::Handshake;
use crate::notify::NotificationEvent;
use crate::session::{ConnectOutcome, Session};
use crate::types::{AppError, Credentials, DisplayMode, SessionSnapshot};
use async_channel::{Receiver, Sender};
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use uuid::Uuid;

/// Commands that can be sent to the session
#[derive(Debug)]
pub enum SessionCommand {
    Connect {
        credentials: Credentials,
        reply: Option<Sender<Result<ConnectOutcome, AppError>>>,
    },
    Disconnect,
    SetDisplayMode {
        mode: DisplayMode,
    },
    Resolve {
        key: String,
        reply: Sender<Result<String, AppError>>,
    },
    Snapshot {
        reply: Sender<SessionSnapshot>,
    },
    Dismiss {
        id: Uuid,
    },
}

/// Events delivered to the frontend
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    SessionChanged(SessionSnapshot),
    Notification(NotificationEvent),
}

/// Bridge between a frontend and a running session
pub struct SessionBridge {
    command_tx: Sender<SessionCommand>,
    event_rx: Receiver<SessionEvent>,
    task: JoinHandle<()>,
}

impl SessionBridge {
    /// Start the bridge task on the current tokio runtime
    pub fn spawn<H: Handshake>(session: Arc<Session<H>>) -> Self {
        let (command_tx, command_rx) = async_channel::bounded::<SessionCommand>(32);
        // Unbounded: every snapshot and notification change reaches the frontend
        let (event_tx, event_rx) = async_channel::unbounded::<SessionEvent>();

        let task = tokio::spawn(async move {
            Self::run_session(session, command_rx, event_tx).await;
        });

        Self {
            command_tx,
            event_rx,
            task,
        }
    }

    async fn run_session<H: Handshake>(
        session: Arc<Session<H>>,
        command_rx: Receiver<SessionCommand>,
        event_tx: Sender<SessionEvent>,
    ) {
        let mut notifications = session.context().notifications().subscribe();
        let mut snapshots = session.subscribe();

        loop {
            tokio::select! {
                cmd = command_rx.recv() => {
                    match cmd {
                        Ok(SessionCommand::Connect { credentials, reply }) => {
                            // Runs on its own so a Disconnect can overtake it
                            let session = session.clone();
                            tokio::spawn(async move {
                                let result = session.connect(credentials).await;
                                if let Err(e) = &result {
                                    tracing::debug!("Connect command finished with error: {}", e);
                                }
                                if let Some(reply) = reply {
                                    let _ = reply.send(result).await;
                                }
                            });
                        }
                        Ok(SessionCommand::Disconnect) => {
                            session.disconnect();
                        }
                        Ok(SessionCommand::SetDisplayMode { mode }) => {
                            session.context().set_display_mode(mode);
                        }
                        Ok(SessionCommand::Resolve { key, reply }) => {
                            let _ = reply.send(session.context().resolve(&key)).await;
                        }
                        Ok(SessionCommand::Snapshot { reply }) => {
                            let _ = reply.send(session.snapshot()).await;
                        }
                        Ok(SessionCommand::Dismiss { id }) => {
                            session.context().notifications().dismiss(id);
                        }
                        Err(_) => break,
                    }
                }
                event = notifications.recv() => {
                    match event {
                        Ok(event) => {
                            if !Self::forward(&event_tx, SessionEvent::Notification(event)).await {
                                break;
                            }
                        }
                        Err(broadcast::error::RecvError::Lagged(n)) => {
                            tracing::debug!(skipped = n, "Bridge lagged behind notifications");
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    }
                }
                changed = snapshots.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let snapshot = snapshots.borrow_and_update().clone();
                    if !Self::forward(&event_tx, SessionEvent::SessionChanged(snapshot)).await {
                        break;
                    }
                }
            }
        }

        tracing::debug!("Session bridge stopped");
    }

    /// Queue an event for the frontend. Returns false once the frontend has
    /// gone away.
    async fn forward(event_tx: &Sender<SessionEvent>, event: SessionEvent) -> bool {
        if let Err(e) = event_tx.send(event).await {
            tracing::debug!("Frontend event receiver closed: {:?}", e.into_inner());
            return false;
        }
        true
    }

    pub fn command_sender(&self) -> Sender<SessionCommand> {
        self.command_tx.clone()
    }

    pub fn event_receiver(&self) -> Receiver<SessionEvent> {
        self.event_rx.clone()
    }

    /// Submit credentials and wait for the outcome
    pub async fn connect(&self, credentials: Credentials) -> Result<ConnectOutcome, AppError> {
        let (reply_tx, reply_rx) = async_channel::bounded(1);
        self.send(SessionCommand::Connect {
            credentials,
            reply: Some(reply_tx),
        })
        .await?;
        reply_rx.recv().await.map_err(|_| AppError::Cancelled)?
    }

    /// Resolve a message key under the current display mode
    pub async fn resolve(&self, key: impl Into<String>) -> Result<String, AppError> {
        let (reply_tx, reply_rx) = async_channel::bounded(1);
        self.send(SessionCommand::Resolve {
            key: key.into(),
            reply: reply_tx,
        })
        .await?;
        reply_rx.recv().await.map_err(|_| AppError::Cancelled)?
    }

    /// Current session snapshot
    pub async fn snapshot(&self) -> Result<SessionSnapshot, AppError> {
        let (reply_tx, reply_rx) = async_channel::bounded(1);
        self.send(SessionCommand::Snapshot { reply: reply_tx }).await?;
        reply_rx.recv().await.map_err(|_| AppError::Cancelled)
    }

    async fn send(&self, command: SessionCommand) -> Result<(), AppError> {
        self.command_tx
            .send(command)
            .await
            .map_err(|_| AppError::Cancelled)
    }
}

impl Drop for SessionBridge {
    fn drop(&mut self) {
        self.task.abort();
    }
}
