//! End-to-end tests: table clients talking through an in-process hub.

use std::future::Future;
use std::time::Duration;

use cardtable::prelude::*;
use cardtable_transport::{LocalChannel, LocalHub};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

// =========================================================================
// Helpers
// =========================================================================

fn config() -> RoomConfig {
    RoomConfig {
        join_delay: Duration::from_millis(20),
        ..Default::default()
    }
}

struct Seat {
    handle: RoomHandle,
    stop: oneshot::Sender<()>,
    task: JoinHandle<Result<(), CardtableError>>,
}

async fn sit(hub: &LocalHub, name: &str) -> Seat {
    let channel: LocalChannel = hub.join(name).unwrap();
    let client = TableClientBuilder::new()
        .config(config())
        .join(channel)
        .await
        .unwrap();
    let handle = client.handle();
    let (stop, stopped) = oneshot::channel::<()>();
    let task = tokio::spawn(client.run_until(async {
        let _ = stopped.await;
    }));
    Seat { handle, stop, task }
}

/// Polls `check` against the room until it holds or two seconds pass.
async fn eventually<F>(handle: &RoomHandle, what: &str, check: F)
where
    F: Fn(&Room) -> bool + Send + Sync + Clone + 'static,
{
    for _ in 0..200 {
        let check = check.clone();
        if handle.with_room(move |room| check(room)).await.unwrap() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("timed out waiting for {what}");
}

fn has_tray(name: &'static str) -> impl Fn(&Room) -> bool + Send + Sync + Clone + 'static {
    move |room: &Room| {
        room.player(&PlayerId::from(name))
            .is_some_and(|p| p.tray().is_some())
    }
}

async fn within<T>(future: impl Future<Output = T>) -> T {
    tokio::time::timeout(Duration::from_secs(2), future)
        .await
        .expect("timed out")
}

fn deck(size: usize) -> Deck {
    Deck {
        name: "test".into(),
        cards: (0..size)
            .map(|i| Card::new(format!("c{i}"), format!("Card {i}")))
            .collect(),
    }
}

// =========================================================================
// Tests
// =========================================================================

#[tokio::test]
async fn test_clients_place_trays_after_join_delay() {
    let hub = LocalHub::new();
    let alice = sit(&hub, "alice").await;
    let bob = sit(&hub, "bob").await;

    eventually(&alice.handle, "bob's tray at alice's table", has_tray("bob")).await;
    eventually(&bob.handle, "alice's tray at bob's table", has_tray("alice")).await;
}

#[tokio::test]
async fn test_late_joiner_sees_existing_table() {
    let hub = LocalHub::new();
    let alice = sit(&hub, "alice").await;
    eventually(&alice.handle, "alice's own tray", has_tray("alice")).await;
    alice
        .handle
        .act(|me| {
            me.load_deck(deck(40));
            me.draw_opening_hand()?;
            me.move_card(Source::Pile(Zone::Hand, 0), Some(Zone::Battlefield), Some((1.0, 1.0)))?;
            me.set_life(15);
            Ok(())
        })
        .await
        .unwrap();

    let bob = sit(&hub, "bob").await;
    eventually(&bob.handle, "alice's life at bob's table", |room: &Room| {
        room.player(&PlayerId::from("alice"))
            .is_some_and(|p| p.life() == 15 && p.battlefield().len() == 1)
    })
    .await;

    let own = alice
        .handle
        .with_room(|room| room.player(&PlayerId::from("alice")).map(Player::view))
        .await
        .unwrap();
    let seen = bob
        .handle
        .with_room(|room| room.player(&PlayerId::from("alice")).map(Player::view))
        .await
        .unwrap();
    assert_eq!(seen, own);
}

#[tokio::test]
async fn test_chat_reaches_peer_events() {
    let hub = LocalHub::new();
    let alice = sit(&hub, "alice").await;

    let channel = hub.join("bob").unwrap();
    let mut bob_client = TableClientBuilder::new()
        .config(config())
        .join(channel)
        .await
        .unwrap();
    let mut bob_events = bob_client.take_events().unwrap();
    assert!(bob_client.take_events().is_none());
    assert_eq!(bob_client.identity(), "bob");
    tokio::spawn(bob_client.run());

    alice.handle.chat("hi bob").await.unwrap();

    let chat = within(async {
        loop {
            if let Some(RoomEvent::Chat { sender, text }) = bob_events.recv().await {
                break (sender, text);
            }
        }
    })
    .await;
    assert_eq!(chat, (PlayerId::from("alice"), "hi bob".to_string()));
}

#[tokio::test]
async fn test_leaving_removes_player_from_peers() {
    let hub = LocalHub::new();
    let alice = sit(&hub, "alice").await;
    let bob = sit(&hub, "bob").await;
    eventually(&alice.handle, "bob's tray", has_tray("bob")).await;

    bob.stop.send(()).unwrap();
    within(bob.task).await.unwrap().unwrap();

    eventually(&alice.handle, "bob gone", |room: &Room| {
        room.player(&PlayerId::from("bob")).is_none()
    })
    .await;
    assert_eq!(hub.member_count(), 1);
    assert!(bob.handle.with_room(|room| room.players().count()).await.is_err());
}

#[tokio::test]
async fn test_recording_captures_own_and_peer_messages() {
    let hub = LocalHub::new();
    let alice = sit(&hub, "alice").await;
    let _bob = sit(&hub, "bob").await;
    eventually(&alice.handle, "bob's tray", has_tray("bob")).await;

    let senders = alice
        .handle
        .with_room(|room| {
            let recorder = room.recorder().unwrap();
            recorder
                .entries()
                .iter()
                .map(|entry| entry.sender.clone())
                .collect::<std::collections::BTreeSet<_>>()
        })
        .await
        .unwrap();

    assert!(senders.contains("alice"));
    assert!(senders.contains("bob"));
}
