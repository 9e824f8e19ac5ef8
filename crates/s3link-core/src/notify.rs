// SPDX-License-Identifier: AGPL-3.0
// S3Link Core - Transient notifications
//
// At most one notification is current. A new one replaces the old one and
// cancels its timer. Expiry is matched by id, so a timer that outlives its
// notification can never remove a newer one.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, PoisonError, Weak};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use uuid::Uuid;

/// Default display duration of a notification
pub const DEFAULT_DURATION: Duration = Duration::from_millis(3500);

/// Events a subscriber may fall behind by before it sees `Lagged`
const EVENT_CAPACITY: usize = 256;

/// Severity of a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NotificationKind {
    Success,
    Error,
    Info,
}

/// A transient, auto-expiring status message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: Uuid,
    pub kind: NotificationKind,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

/// Why a notification went away
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DismissReason {
    Expired,
    Dismissed,
    Replaced,
}

/// Events published to notification subscribers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum NotificationEvent {
    Created(Notification),
    Dismissed { id: Uuid, reason: DismissReason },
}

struct Current {
    notification: Notification,
    timer: Option<JoinHandle<()>>,
}

impl Current {
    fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

struct Inner {
    current: Mutex<Option<Current>>,
    events: broadcast::Sender<NotificationEvent>,
    duration: Duration,
}

/// Holds the single visible notification and its expiry timer
#[derive(Clone)]
pub struct NotificationQueue {
    inner: Arc<Inner>,
}

impl NotificationQueue {
    pub fn new() -> Self {
        Self::with_duration(DEFAULT_DURATION)
    }

    pub fn with_duration(duration: Duration) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            inner: Arc::new(Inner {
                current: Mutex::new(None),
                events,
                duration,
            }),
        }
    }

    /// Show a new notification, replacing whatever is current
    pub fn notify(&self, kind: NotificationKind, message: impl Into<String>) -> Notification {
        let notification = Notification {
            id: Uuid::new_v4(),
            kind,
            message: message.into(),
            created_at: Utc::now(),
        };

        let timer = self.arm_timer(notification.id);

        let mut current = self
            .inner
            .current
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if let Some(mut previous) = current.take() {
            previous.cancel_timer();
            tracing::debug!(id = %previous.notification.id, "Notification replaced");
            self.emit(NotificationEvent::Dismissed {
                id: previous.notification.id,
                reason: DismissReason::Replaced,
            });
        }

        tracing::info!(id = %notification.id, ?kind, "Notification: {}", notification.message);
        *current = Some(Current {
            notification: notification.clone(),
            timer,
        });
        self.emit(NotificationEvent::Created(notification.clone()));

        notification
    }

    /// Dismiss a notification early. Returns false when `id` is not current.
    pub fn dismiss(&self, id: Uuid) -> bool {
        self.remove_if_current(id, DismissReason::Dismissed)
    }

    /// The visible notification, if any
    pub fn current(&self) -> Option<Notification> {
        self.inner
            .current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|c| c.notification.clone())
    }

    pub fn subscribe(&self) -> broadcast::Receiver<NotificationEvent> {
        self.inner.events.subscribe()
    }

    pub fn duration(&self) -> Duration {
        self.inner.duration
    }

    /// Timer callback. A no-op unless `id` is still the current notification.
    pub(crate) fn expire(&self, id: Uuid) -> bool {
        self.remove_if_current(id, DismissReason::Expired)
    }

    fn remove_if_current(&self, id: Uuid, reason: DismissReason) -> bool {
        let mut current = self
            .inner
            .current
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        match current.as_ref() {
            Some(c) if c.notification.id == id => {}
            _ => {
                tracing::debug!(id = %id, ?reason, "Ignoring stale notification removal");
                return false;
            }
        }

        if let Some(mut removed) = current.take() {
            if reason != DismissReason::Expired {
                removed.cancel_timer();
            }
        }
        tracing::debug!(id = %id, ?reason, "Notification removed");
        self.emit(NotificationEvent::Dismissed { id, reason });
        true
    }

    fn arm_timer(&self, id: Uuid) -> Option<JoinHandle<()>> {
        let handle = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                tracing::warn!(id = %id, "No async runtime, notification will not auto-dismiss");
                return None;
            }
        };

        let weak: Weak<Inner> = Arc::downgrade(&self.inner);
        let duration = self.inner.duration;

        Some(handle.spawn(async move {
            tokio::time::sleep(duration).await;
            if let Some(inner) = weak.upgrade() {
                NotificationQueue { inner }.expire(id);
            }
        }))
    }

    fn emit(&self, event: NotificationEvent) {
        // No subscribers is fine
        let _ = self.inner.events.send(event);
    }
}

impl Default for NotificationQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::sleep;

    fn drain(rx: &mut broadcast::Receiver<NotificationEvent>) -> Vec<NotificationEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[tokio::test(start_paused = true)]
    async fn test_notification_expires_after_duration() {
        let queue = NotificationQueue::new();
        let mut rx = queue.subscribe();

        let n = queue.notify(NotificationKind::Success, "Connected");
        sleep(Duration::from_millis(3400)).await;
        assert_eq!(queue.current().map(|c| c.id), Some(n.id));

        sleep(Duration::from_millis(200)).await;
        assert!(queue.current().is_none());
        assert_eq!(
            drain(&mut rx),
            vec![
                NotificationEvent::Created(n.clone()),
                NotificationEvent::Dismissed {
                    id: n.id,
                    reason: DismissReason::Expired
                },
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_notification_replaces_and_outlives_old_timer() {
        let queue = NotificationQueue::new();
        let first = queue.notify(NotificationKind::Info, "first");
        sleep(Duration::from_millis(2000)).await;

        let second = queue.notify(NotificationKind::Error, "second");
        // Past the first notification's deadline
        sleep(Duration::from_millis(2000)).await;
        assert_eq!(queue.current().map(|c| c.id), Some(second.id));
        assert_ne!(first.id, second.id);

        sleep(Duration::from_millis(1600)).await;
        assert!(queue.current().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_expiry_is_a_no_op() {
        let queue = NotificationQueue::new();
        let old = queue.notify(NotificationKind::Info, "old");
        let new = queue.notify(NotificationKind::Info, "new");
        let mut rx = queue.subscribe();

        assert!(!queue.expire(old.id));
        assert!(!queue.dismiss(old.id));
        assert_eq!(queue.current().map(|c| c.id), Some(new.id));
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_dismiss_then_timer_fires() {
        let queue = NotificationQueue::new();
        let mut rx = queue.subscribe();
        let n = queue.notify(NotificationKind::Success, "done");

        assert!(queue.dismiss(n.id));
        assert!(!queue.dismiss(n.id));
        sleep(Duration::from_millis(5000)).await;

        let events = drain(&mut rx);
        assert_eq!(events.len(), 2);
        assert_eq!(
            events[1],
            NotificationEvent::Dismissed {
                id: n.id,
                reason: DismissReason::Dismissed
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_replacement_emits_replaced_event() {
        let queue = NotificationQueue::new();
        let mut rx = queue.subscribe();
        let first = queue.notify(NotificationKind::Info, "first");
        let second = queue.notify(NotificationKind::Info, "second");

        let events = drain(&mut rx);
        assert_eq!(events.len(), 3);
        assert_eq!(
            events[1],
            NotificationEvent::Dismissed {
                id: first.id,
                reason: DismissReason::Replaced
            }
        );
        assert_eq!(events[2], NotificationEvent::Created(second));
    }

    #[test]
    fn test_notify_without_runtime() {
        let queue = NotificationQueue::with_duration(Duration::from_millis(10));
        let n = queue.notify(NotificationKind::Info, "no timer");
        assert_eq!(queue.current(), Some(n));
    }
}
