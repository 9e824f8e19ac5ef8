// SPDX-License-Identifier: AGPL-3.0
// S3Link Core - Bridge tests

mod common;

use common::{credentials, init_tracing};
use s3link_core::{
    AppContext, AppError, DismissReason, DisplayMode, NotificationEvent, NotificationKind,
    Session, SessionBridge, SessionCommand, SessionEvent, SessionStatus,
};
use std::sync::Arc;
use std::time::Duration;

fn bridge() -> (Arc<Session>, SessionBridge) {
    let session = Arc::new(Session::simulated(AppContext::in_memory()));
    let bridge = SessionBridge::spawn(session.clone());
    (session, bridge)
}

fn drain(bridge: &SessionBridge) -> Vec<SessionEvent> {
    let rx = bridge.event_receiver();
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

#[tokio::test(start_paused = true)]
async fn test_connect_through_bridge_emits_events() {
    init_tracing();
    let (_session, bridge) = bridge();

    let outcome = bridge.connect(credentials("demo-s3-bucket")).await.unwrap();
    assert_eq!(outcome.region, "us-east-1");
    tokio::time::sleep(Duration::from_millis(10)).await;

    let events = drain(&bridge);
    assert!(events.iter().any(|e| matches!(
        e,
        SessionEvent::SessionChanged(s) if s.status == SessionStatus::Connected
    )));
    assert!(events.iter().any(|e| matches!(
        e,
        SessionEvent::Notification(NotificationEvent::Created(n)) if n.kind == NotificationKind::Success
    )));

    let snapshot = bridge.snapshot().await.unwrap();
    assert_eq!(snapshot.bucket.as_deref(), Some("demo-s3-bucket"));
}

#[tokio::test(start_paused = true)]
async fn test_disconnect_command_preempts_connect() {
    init_tracing();
    let (session, bridge) = bridge();
    let tx = bridge.command_sender();

    let (reply_tx, reply_rx) = async_channel::bounded(1);
    tx.send(SessionCommand::Connect {
        credentials: credentials("demo-s3-bucket"),
        reply: Some(reply_tx),
    })
    .await
    .unwrap();

    // Let the connect task start its handshake
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(session.status(), SessionStatus::Connecting);

    tx.send(SessionCommand::Disconnect).await.unwrap();
    assert_eq!(reply_rx.recv().await.unwrap(), Err(AppError::Cancelled));

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(session.status(), SessionStatus::Disconnected);
}

#[tokio::test(start_paused = true)]
async fn test_display_mode_and_resolve_commands() {
    let (session, bridge) = bridge();
    let tx = bridge.command_sender();

    assert_eq!(
        bridge.resolve("disconnect.button").await.unwrap(),
        "Disconnect / डिस्कनेक्ट करें"
    );

    tx.send(SessionCommand::SetDisplayMode {
        mode: DisplayMode::LocalLanguage,
    })
    .await
    .unwrap();
    assert_eq!(
        bridge.resolve("disconnect.button").await.unwrap(),
        "डिस्कनेक्ट करें"
    );
    assert_eq!(session.context().display_mode(), DisplayMode::LocalLanguage);

    assert!(matches!(
        bridge.resolve("missing.key").await,
        Err(AppError::MissingTranslation(_))
    ));
}

#[tokio::test(start_paused = true)]
async fn test_dismiss_command() {
    let (session, bridge) = bridge();
    let notification = session
        .context()
        .notifications()
        .notify(NotificationKind::Info, "hello");

    bridge
        .command_sender()
        .send(SessionCommand::Dismiss {
            id: notification.id,
        })
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(10)).await;

    assert!(session.context().notifications().current().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_event_burst_is_delivered_in_full() {
    init_tracing();
    let (session, bridge) = bridge();
    // Let the bridge task subscribe before the burst
    tokio::time::sleep(Duration::from_millis(1)).await;

    let queue = session.context().notifications();
    let mut last = None;
    for i in 0..40 {
        last = Some(queue.notify(NotificationKind::Info, format!("message {}", i)));
    }
    let last = last.unwrap();
    assert!(queue.dismiss(last.id));
    tokio::time::sleep(Duration::from_millis(10)).await;

    let notifications: Vec<NotificationEvent> = drain(&bridge)
        .into_iter()
        .filter_map(|e| match e {
            SessionEvent::Notification(n) => Some(n),
            SessionEvent::SessionChanged(_) => None,
        })
        .collect();

    // 40 created, 39 replaced, 1 dismissed
    assert_eq!(notifications.len(), 80);
    assert_eq!(
        notifications.last(),
        Some(&NotificationEvent::Dismissed {
            id: last.id,
            reason: DismissReason::Dismissed,
        })
    );
}
