//! Integration tests for the room actor.

use std::time::Duration;

use cardtable_protocol::PlayerId;
use cardtable_room::{DEFAULT_CHANNEL_SIZE, Room, RoomConfig, RoomError, RoomHandle, spawn_room};
use tokio::sync::mpsc;

fn pid(name: &str) -> PlayerId {
    PlayerId::from(name)
}

fn spawn(name: &str) -> (RoomHandle, mpsc::UnboundedReceiver<String>) {
    let room = Room::new(name, RoomConfig::default()).unwrap();
    let (tx, rx) = mpsc::unbounded_channel();
    (spawn_room(room, tx, DEFAULT_CHANNEL_SIZE), rx)
}

async fn next(rx: &mut mpsc::UnboundedReceiver<String>) -> String {
    tokio::time::timeout(Duration::from_secs(1), rx.recv())
        .await
        .expect("timed out waiting for outbound message")
        .expect("outbound channel closed")
}

#[tokio::test]
async fn test_join_pushes_hello_to_outbound() {
    let (handle, mut rx) = spawn("table");

    handle.join(pid("alice")).await.unwrap();

    assert_eq!(next(&mut rx).await, "[Hello] 0.31");
    assert_eq!(handle.name(), "table");
}

#[tokio::test]
async fn test_act_and_tray_are_sent_in_order() {
    let (handle, mut rx) = spawn("table");
    handle.join(pid("alice")).await.unwrap();
    next(&mut rx).await;

    let tray = handle.create_tray().await.unwrap();
    handle
        .act(|me| {
            me.set_life(9);
            Ok(())
        })
        .await
        .unwrap();

    assert_eq!(next(&mut rx).await, format!("[CreateTray] as {tray} at (0.00, 0.00)"));
    assert_eq!(next(&mut rx).await, "[Setlife] 9");
}

#[tokio::test]
async fn test_delivered_hello_gets_welcome_reply() {
    let (handle, mut rx) = spawn("table");
    handle.join(pid("alice")).await.unwrap();
    handle.create_tray().await.unwrap();
    next(&mut rx).await;
    next(&mut rx).await;

    handle.deliver(pid("bob"), "[Hello] 0.31".into()).await.unwrap();

    let welcome = next(&mut rx).await;
    assert!(welcome.starts_with("[Welcome] 0.31\n"));
    let players = handle
        .with_room(|room| room.players().map(|p| p.id().to_string()).collect::<Vec<_>>())
        .await
        .unwrap();
    assert_eq!(players, vec!["alice", "bob"]);
}

#[tokio::test]
async fn test_chat_is_escaped_on_the_wire() {
    let (handle, mut rx) = spawn("table");
    handle.join(pid("alice")).await.unwrap();
    next(&mut rx).await;

    handle.chat("\\o/").await.unwrap();

    assert_eq!(next(&mut rx).await, "\\\\o/");
}

#[tokio::test]
async fn test_user_left_drops_replica() {
    let (handle, _rx) = spawn("table");
    handle.join(pid("alice")).await.unwrap();
    handle.deliver(pid("bob"), "[Hello] 0.31".into()).await.unwrap();

    handle.user_left(pid("bob")).await.unwrap();

    let count = handle.with_room(|room| room.players().count()).await.unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn test_act_before_join_returns_not_joined() {
    let (handle, _rx) = spawn("table");
    let result = handle.act(|me| Ok(me.life())).await;
    assert!(matches!(result, Err(RoomError::NotJoined)));
}

#[tokio::test]
async fn test_handle_after_shutdown_returns_unavailable() {
    let (handle, _rx) = spawn("table");
    handle.shutdown().await.unwrap();

    // The actor may still be draining; give it a moment to drop the channel.
    tokio::time::sleep(Duration::from_millis(50)).await;

    let result = handle.with_room(|room| room.players().count()).await;
    assert!(matches!(result, Err(RoomError::Unavailable(_))));
}
