//! Integration tests: a local player and a replica fed with its commands
//! must agree on everything peers can see.

use cardtable_player::{
    Card, CardRef, Deck, MemoryCatalog, Player, PlayerError, Source, TableConfig, Token,
};
use cardtable_protocol::{Command, ItemId, PlayerId, Zone};
use std::sync::Arc;

// =========================================================================
// Helpers
// =========================================================================

fn pid(name: &str) -> PlayerId {
    PlayerId::from(name)
}

fn deck(size: usize) -> Deck {
    Deck {
        name: "test".into(),
        cards: (0..size)
            .map(|i| Card::new(format!("c{i}"), format!("Card {i}")))
            .collect(),
    }
}

fn local() -> Player {
    Player::local(pid("alice"), TableConfig::default()).with_seed(42)
}

fn replica() -> Player {
    Player::replica(pid("alice"), TableConfig::default())
}

/// Delivers everything `from` queued to `to`.
fn sync(from: &mut Player, to: &mut Player) {
    let sender = from.id().clone();
    for batch in from.take_outbox() {
        to.handle_batch(&sender, &batch.commands)
            .expect("replica should accept its owner's commands");
    }
}

/// A local player with a tray, a loaded deck, and an opening hand,
/// already mirrored on a replica.
fn started() -> (Player, Player) {
    let mut alice = local();
    let mut mirror = replica();
    alice.create_tray(None, Some((0.8, 0.8, 1.0))).unwrap();
    alice.load_deck(deck(40));
    alice.draw_opening_hand().unwrap();
    sync(&mut alice, &mut mirror);
    (alice, mirror)
}

// =========================================================================
// Symmetry
// =========================================================================

#[test]
fn test_opening_hand_replica_matches_counts() {
    let (alice, mirror) = started();

    assert_eq!(alice.hand().len(), 7);
    assert_eq!(alice.library().len(), 33);
    assert_eq!(mirror.view(), alice.view());
    assert!(mirror.hand().iter().all(Option::is_none), "hand stays hidden");
}

#[test]
fn test_set_life_replica_follows() {
    let (mut alice, mut mirror) = started();
    alice.set_life(13);
    sync(&mut alice, &mut mirror);
    assert_eq!(mirror.life(), 13);
}

#[test]
fn test_discard_and_graveyard_moves_stay_in_sync() {
    let (mut alice, mut mirror) = started();

    alice.discard(0).unwrap();
    alice.discard(2).unwrap();
    alice.move_card(Source::Pile(Zone::Library, 0), Some(Zone::Exile), None)
        .unwrap();
    alice.move_card(Source::Pile(Zone::Graveyard, 0), Some(Zone::Exile), None)
        .unwrap();
    alice.graveyard_top_to_hand().unwrap();
    sync(&mut alice, &mut mirror);

    assert_eq!(mirror.view(), alice.view());
    assert_eq!(alice.exile().len(), 2);
}

#[test]
fn test_discard_all_empties_hand_on_both_sides() {
    let (mut alice, mut mirror) = started();
    alice.discard_all().unwrap();
    sync(&mut alice, &mut mirror);

    assert!(alice.hand().is_empty());
    assert_eq!(alice.graveyard().len(), 7);
    assert_eq!(mirror.view(), alice.view());
}

#[test]
fn test_mulligan_shrinks_hand_by_one() {
    let (mut alice, mut mirror) = started();

    alice.mulligan();
    assert_eq!(alice.hand().len(), 6);
    alice.mulligan();
    assert_eq!(alice.hand().len(), 5);
    assert_eq!(alice.library().len(), 35);

    sync(&mut alice, &mut mirror);
    assert_eq!(mirror.view(), alice.view());
}

#[test]
fn test_mulligan_with_one_card_does_nothing() {
    let mut alice = local();
    alice.load_deck(deck(1));
    alice.draw_card().unwrap();
    alice.take_outbox();

    alice.mulligan();

    assert_eq!(alice.hand().len(), 1);
    assert!(alice.take_outbox().is_empty());
}

#[test]
fn test_shuffle_graveyard_into_library_emits_unburies_top_down() {
    let (mut alice, mut mirror) = started();
    alice.discard_all().unwrap();
    sync(&mut alice, &mut mirror);

    alice.shuffle_graveyard_into_library();
    let batches = alice.take_outbox();
    let first = &batches[0].commands;
    assert_eq!(first[0], Command::Unbury { index: 6 });
    assert_eq!(first[6], Command::Unbury { index: 0 });
    assert_eq!(first[7], Command::Update { library: 40, hand: 0 });
    assert_eq!(batches[1].commands, vec![Command::Shuffle]);

    for batch in batches {
        mirror.handle_batch(&pid("alice"), &batch.commands).unwrap();
    }
    assert_eq!(mirror.view(), alice.view());
}

#[test]
fn test_battlefield_round_trip_keeps_replica_in_sync() {
    let (mut alice, mut mirror) = started();

    alice.move_card(Source::Pile(Zone::Hand, 0), Some(Zone::Battlefield), Some((1.0, 2.0)))
        .unwrap();
    let id = alice.battlefield()[0].item_id;
    alice.toggle_tapped(id).unwrap();
    alice.set_counters(id, 2, "+1/+1").unwrap();
    alice.move_item(id, 3.5, -1.25).unwrap();
    sync(&mut alice, &mut mirror);

    assert_eq!(mirror.view(), alice.view());
    let mirrored = mirror.item(id).expect("item mirrored with the same id");
    assert!(mirrored.tapped);
    assert_eq!(mirrored.counters.get("+1/+1"), Some(&2));

    alice.move_card(Source::Item(id), Some(Zone::Graveyard), None).unwrap();
    sync(&mut alice, &mut mirror);

    assert!(mirror.battlefield().is_empty());
    assert_eq!(mirror.view(), alice.view());
}

#[test]
fn test_token_leaving_battlefield_is_removed_from_game() {
    let (mut alice, mut mirror) = started();
    let token = CardRef::Token(Token {
        id: "t-soldier".into(),
        description: "1/1 Soldier".into(),
    });
    alice.move_card(Source::External(token), Some(Zone::Battlefield), Some((0.0, 0.0)))
        .unwrap();
    let id = alice.battlefield()[0].item_id;

    alice.move_card(Source::Item(id), Some(Zone::Hand), None).unwrap();
    sync(&mut alice, &mut mirror);

    assert!(alice.battlefield().is_empty());
    assert_eq!(alice.hand().len(), 7);
    assert_eq!(mirror.view(), alice.view());
}

#[test]
fn test_reset_clears_replica_battlefield() {
    let (mut alice, mut mirror) = started();
    alice.move_card(Source::Pile(Zone::Hand, 0), Some(Zone::Battlefield), Some((0.0, 0.0)))
        .unwrap();
    alice.set_life(5);
    alice.reset();
    sync(&mut alice, &mut mirror);

    assert_eq!(mirror.life(), 20);
    assert!(mirror.battlefield().is_empty());
    assert_eq!(mirror.library().len(), 40);
    assert_eq!(mirror.view(), alice.view());
}

#[test]
fn test_remove_tray_clears_replica() {
    let (mut alice, mut mirror) = started();
    alice.move_card(Source::Pile(Zone::Hand, 0), Some(Zone::Battlefield), Some((0.0, 0.0)))
        .unwrap();
    alice.remove_tray();
    sync(&mut alice, &mut mirror);

    assert!(!mirror.is_active());
    assert!(mirror.battlefield().is_empty());
    assert!(mirror.items().is_empty());
}

#[test]
fn test_catalog_resolves_tokens_on_replica() {
    let mut catalog = MemoryCatalog::new();
    catalog.insert_token(Token {
        id: "t1".into(),
        description: "2/2 Zombie".into(),
    });
    let mut mirror = replica().with_catalog(Arc::new(catalog));
    mirror
        .execute_command(&Command::Tray { item: ItemId(1), x: 0.0, y: 0.0 })
        .unwrap();

    mirror
        .execute_command(&Command::Enter {
            card: "t1".into(),
            name: "2/2 Zombie".into(),
            item: ItemId(9),
            x: 0.0,
            y: 0.0,
        })
        .unwrap();

    assert!(mirror.item(ItemId(9)).unwrap().card.is_token());
}

// =========================================================================
// Handshake
// =========================================================================

#[test]
fn test_welcome_rebuilds_state_on_a_newcomer() {
    let (mut alice, _) = started();
    alice.discard(0).unwrap();
    alice.move_card(Source::Pile(Zone::Hand, 0), Some(Zone::Battlefield), Some((4.0, 4.0)))
        .unwrap();
    let id = alice.battlefield()[0].item_id;
    alice.turn_over(id).unwrap();
    alice.toggle_flipped(id).unwrap();
    alice.set_counters(id, 1, "charge").unwrap();
    alice.take_outbox();

    let welcome = alice.make_welcome_message();
    assert!(matches!(welcome[0], Command::Welcome { .. }));
    assert!(matches!(welcome[1], Command::Tray { .. }));

    let mut newcomer = replica();
    newcomer.handle_batch(&pid("alice"), &welcome).unwrap();

    assert!(newcomer.has_been_welcomed());
    assert_eq!(newcomer.view(), alice.view());
}

#[test]
fn test_welcome_without_tray_is_header_only() {
    let alice = local();
    assert_eq!(alice.make_welcome_message().len(), 1);
}

#[test]
fn test_duplicate_welcome_is_ignored() {
    let (mut alice, _) = started();
    let welcome = alice.make_welcome_message();
    let mut newcomer = replica();
    newcomer.handle_batch(&pid("alice"), &welcome).unwrap();

    alice.set_life(3);
    let second = alice.make_welcome_message();
    newcomer.handle_batch(&pid("alice"), &second).unwrap();

    assert_eq!(newcomer.life(), 20, "second welcome must not apply");
}

#[test]
fn test_hello_makes_local_player_reply_unlogged() {
    let (mut alice, _) = started();
    alice.take_outbox();

    alice
        .handle_batch(&pid("bob"), &[Command::Hello { version: "0.31".into() }])
        .unwrap();

    let out = alice.take_outbox();
    assert_eq!(out.len(), 1);
    assert!(!out[0].logged);
    assert_eq!(out[0].commands, alice.make_welcome_message());
}

#[test]
fn test_hello_without_tray_gets_no_reply() {
    let mut alice = local();
    alice
        .handle_batch(&pid("bob"), &[Command::Hello { version: "0.31".into() }])
        .unwrap();
    assert!(alice.take_outbox().is_empty());
}

#[test]
fn test_batch_from_other_sender_is_ignored() {
    let mut mirror = replica();
    mirror
        .handle_batch(&pid("mallory"), &[Command::SetLife { life: 1 }])
        .unwrap();
    assert_eq!(mirror.life(), 20);
}

// =========================================================================
// Errors
// =========================================================================

#[test]
fn test_unbury_out_of_range_returns_error() {
    let mut mirror = replica();
    let err = mirror
        .execute_command(&Command::Unbury { index: 0 })
        .unwrap_err();
    assert!(matches!(
        err,
        PlayerError::IndexOutOfRange { zone: Zone::Graveyard, index: 0, len: 0 }
    ));
}

#[test]
fn test_tap_unknown_item_returns_error() {
    let mut mirror = replica();
    assert!(matches!(
        mirror.execute_command(&Command::Tap { item: ItemId(0x77) }),
        Err(PlayerError::UnknownItem(ItemId(0x77)))
    ));
}

#[test]
fn test_batch_stops_at_first_error() {
    let mut mirror = replica();
    let result = mirror.handle_batch(
        &pid("alice"),
        &[
            Command::SetLife { life: 9 },
            Command::Move { item: ItemId(1), x: 0.0, y: 0.0 },
            Command::SetLife { life: 4 },
        ],
    );
    assert!(result.is_err());
    assert_eq!(mirror.life(), 9);
}

#[test]
fn test_hidden_card_cannot_be_revealed() {
    let mut mirror = replica();
    mirror
        .execute_command(&Command::Update { library: 3, hand: 0 })
        .unwrap();
    assert!(matches!(
        mirror.move_card(Source::Pile(Zone::Library, 0), Some(Zone::Graveyard), None),
        Err(PlayerError::HiddenCard(Zone::Library))
    ));
    assert_eq!(mirror.library().len(), 3);
}

#[test]
fn test_battlefield_move_without_position_returns_error() {
    let (mut alice, _) = started();
    assert!(matches!(
        alice.move_card(Source::Pile(Zone::Hand, 0), Some(Zone::Battlefield), None),
        Err(PlayerError::MissingPosition)
    ));
    assert_eq!(alice.hand().len(), 7);
}

#[test]
fn test_move_to_same_pile_returns_error() {
    let (mut alice, _) = started();
    assert!(matches!(
        alice.move_card(Source::Pile(Zone::Hand, 0), Some(Zone::Hand), None),
        Err(PlayerError::InvalidMove(_))
    ));
}

#[test]
fn test_tray_id_collision_returns_error() {
    let mut mirror = replica();
    mirror
        .execute_command(&Command::Tray { item: ItemId(1), x: 0.0, y: 0.0 })
        .unwrap();
    mirror
        .execute_command(&Command::Enter {
            card: "c1".into(),
            name: "C".into(),
            item: ItemId(5),
            x: 0.0,
            y: 0.0,
        })
        .unwrap();
    assert!(matches!(
        mirror.execute_command(&Command::Tray { item: ItemId(5), x: 3.0, y: 3.0 }),
        Err(PlayerError::ItemIdTaken(ItemId(5)))
    ));
    assert_eq!(mirror.tray().unwrap().item_id, ItemId(1));
    assert_eq!(mirror.battlefield().len(), 1);
}

#[test]
fn test_enter_without_tray_returns_no_tray() {
    let mut mirror = replica();
    let result = mirror.handle_batch(
        &pid("alice"),
        &[
            Command::SetLife { life: 12 },
            Command::Enter {
                card: "c1".into(),
                name: "C".into(),
                item: ItemId(5),
                x: 0.0,
                y: 0.0,
            },
        ],
    );
    assert!(matches!(result, Err(PlayerError::NoTray)));
    assert_eq!(mirror.life(), 12);
    assert!(mirror.battlefield().is_empty());
    assert!(mirror.items().is_empty());
}
