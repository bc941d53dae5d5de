//! Unit tests for `WsManager`.
//!
//! Exercises the connection registry directly, without HTTP upgrades:
//! add/remove semantics, room scoping of broadcasts, distinct-user counting,
//! and graceful shutdown.

use axum::extract::ws::Message;
use scribepad_api::ws::WsManager;

fn text(s: &str) -> Message {
    Message::Text(s.to_string().into())
}

// ---------------------------------------------------------------------------
// Registration
// ---------------------------------------------------------------------------

#[tokio::test]
async fn new_manager_has_zero_connections() {
    let manager = WsManager::new();

    assert_eq!(manager.connection_count().await, 0);
    assert_eq!(manager.user_count().await, 0);
}

#[tokio::test]
async fn add_and_remove_track_the_count() {
    let manager = WsManager::new();

    let _rx = manager.add("conn-1".to_string(), 1).await;
    assert_eq!(manager.connection_count().await, 1);

    manager.remove("conn-1").await;
    assert_eq!(manager.connection_count().await, 0);
}

#[tokio::test]
async fn remove_unknown_id_is_noop() {
    let manager = WsManager::new();

    let _rx = manager.add("conn-1".to_string(), 1).await;
    manager.remove("nonexistent").await;

    assert_eq!(manager.connection_count().await, 1);
}

#[tokio::test]
async fn user_count_is_distinct_users_not_connections() {
    let manager = WsManager::new();

    // Same user with two tabs, plus one other user.
    let _rx1 = manager.add("conn-1".to_string(), 1).await;
    let _rx2 = manager.add("conn-2".to_string(), 1).await;
    let _rx3 = manager.add("conn-3".to_string(), 2).await;

    assert_eq!(manager.connection_count().await, 3);
    assert_eq!(manager.user_count().await, 2);
}

// ---------------------------------------------------------------------------
// Broadcast scoping
// ---------------------------------------------------------------------------

#[tokio::test]
async fn broadcast_reaches_every_connection() {
    let manager = WsManager::new();

    let mut rx1 = manager.add("conn-1".to_string(), 1).await;
    let mut rx2 = manager.add("conn-2".to_string(), 2).await;

    manager.broadcast(text("hello")).await;

    assert!(rx1.recv().await.is_some());
    assert!(rx2.recv().await.is_some());
}

#[tokio::test]
async fn scoped_broadcast_respects_rooms() {
    let manager = WsManager::new();

    let mut in_room = manager.add("conn-1".to_string(), 1).await;
    let mut other_room = manager.add("conn-2".to_string(), 2).await;
    let mut global = manager.add("conn-3".to_string(), 3).await;

    assert!(manager.join_room("conn-1", 42).await);
    assert!(manager.join_room("conn-2", 7).await);
    // conn-3 joins nothing: a global subscriber.

    manager.broadcast_scoped(Some(42), text("note 42 event")).await;

    assert!(in_room.try_recv().is_ok(), "room member must receive");
    assert!(
        other_room.try_recv().is_err(),
        "member of a different room must not receive"
    );
    assert!(global.try_recv().is_ok(), "global subscriber must receive");
}

#[tokio::test]
async fn unscoped_broadcast_ignores_rooms() {
    let manager = WsManager::new();

    let mut in_room = manager.add("conn-1".to_string(), 1).await;
    assert!(manager.join_room("conn-1", 42).await);

    manager.broadcast_scoped(None, text("count changed")).await;

    assert!(in_room.try_recv().is_ok());
}

/// A connection whose room set empties out becomes a global subscriber again.
#[tokio::test]
async fn leaving_a_room_restores_global_delivery() {
    let manager = WsManager::new();

    let mut rx = manager.add("conn-1".to_string(), 1).await;
    assert!(manager.join_room("conn-1", 7).await);

    manager.broadcast_scoped(Some(42), text("other note")).await;
    assert!(rx.try_recv().is_err());

    assert!(manager.leave_room("conn-1", 7).await);
    manager.broadcast_scoped(Some(42), text("other note")).await;
    assert!(rx.try_recv().is_ok());
}

#[tokio::test]
async fn join_room_on_unknown_connection_fails() {
    let manager = WsManager::new();

    assert!(!manager.join_room("nonexistent", 1).await);
    assert!(!manager.leave_room("nonexistent", 1).await);
}

// ---------------------------------------------------------------------------
// Targeted sends and shutdown
// ---------------------------------------------------------------------------

#[tokio::test]
async fn send_to_user_hits_all_of_their_connections() {
    let manager = WsManager::new();

    let mut rx1 = manager.add("conn-1".to_string(), 1).await;
    let mut rx2 = manager.add("conn-2".to_string(), 1).await;
    let mut other = manager.add("conn-3".to_string(), 2).await;

    let sent = manager.send_to_user(1, text("direct")).await;

    assert_eq!(sent, 2);
    assert!(rx1.try_recv().is_ok());
    assert!(rx2.try_recv().is_ok());
    assert!(other.try_recv().is_err());
}

#[tokio::test]
async fn shutdown_closes_and_clears_everything() {
    let manager = WsManager::new();

    let mut rx = manager.add("conn-1".to_string(), 1).await;

    manager.shutdown_all().await;

    assert_eq!(manager.connection_count().await, 0);
    match rx.recv().await {
        Some(Message::Close(_)) => {}
        other => panic!("expected a Close frame, got {other:?}"),
    }
}
