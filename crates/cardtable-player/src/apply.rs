//! The inbound interpreter.
//!
//! Applies a peer's commands to its replica without emitting anything, and
//! builds the full-state `welcome` a newcomer uses to catch up.

use cardtable_protocol::{Command, PlayerId, Zone};

use crate::{BattlefieldItem, Outgoing, Player, PlayerError};

/// Largest library or hand an `update` may announce.
const MAX_PILE: usize = 1 << 16;

impl Player {
    /// Handles one inbound batch from `sender`.
    ///
    /// A `hello` makes the local player (once it has a tray) queue a
    /// welcome reply. Everything else only applies when `sender` is the
    /// peer this player mirrors, and a second `welcome` is ignored.
    /// Commands run in order and stop at the first error.
    pub fn handle_batch(&mut self, sender: &PlayerId, cmds: &[Command]) -> Result<(), PlayerError> {
        let Some(first) = cmds.first() else {
            return Ok(());
        };

        if matches!(first, Command::Hello { .. }) && self.local && self.tray.is_some() {
            tracing::debug!(player = %self.id, to = %sender, "replying with welcome");
            self.outbox.push(Outgoing {
                commands: self.make_welcome_message(),
                logged: false,
            });
        }

        if sender != &self.id {
            return Ok(());
        }

        if matches!(first, Command::Welcome { .. }) {
            if self.has_been_welcomed {
                tracing::debug!(player = %self.id, "duplicate welcome ignored");
                return Ok(());
            }
            self.has_been_welcomed = true;
        }

        for cmd in cmds {
            self.execute_command(cmd)?;
        }
        Ok(())
    }

    /// Applies a single command. Validates before mutating.
    pub fn execute_command(&mut self, cmd: &Command) -> Result<(), PlayerError> {
        match cmd {
            Command::Hello { .. } | Command::Welcome { .. } => {}
            Command::Reset => self.clear_table(),
            Command::Tray { item, x, y } => {
                self.put_tray(Some(*item), *x, *y, None)?;
            }
            Command::Update { library, hand } => {
                for (zone, count) in [(Zone::Library, *library), (Zone::Hand, *hand)] {
                    if count > MAX_PILE {
                        return Err(PlayerError::InvalidMove(format!(
                            "{zone} count {count} is too large"
                        )));
                    }
                }
                self.library = vec![None; *library];
                self.hand = vec![None; *hand];
                self.notify_zone(Zone::Library);
                self.notify_zone(Zone::Hand);
            }
            Command::SetLife { life } => self.apply_life(*life),
            Command::Enter {
                card,
                name,
                item,
                x,
                y,
            } => {
                let card = self.resolve_item(card, name);
                self.insert_item(card, Some(*item), *x, *y)?;
            }
            Command::Exit { item } => {
                if self.tray.as_ref().is_some_and(|tray| tray.item_id == *item) {
                    self.drop_tray();
                } else {
                    self.take_item(*item)?;
                }
            }
            Command::Bury { card } => {
                let card = self.resolve_card(card);
                self.graveyard.push(card);
                self.notify_zone(Zone::Graveyard);
            }
            Command::Unbury { index } => {
                check_index(Zone::Graveyard, *index, self.graveyard.len())?;
                self.graveyard.remove(*index);
                self.notify_zone(Zone::Graveyard);
            }
            Command::Exile { card } => {
                let card = self.resolve_card(card);
                self.exile.push(card);
                self.notify_zone(Zone::Exile);
            }
            Command::Unexile { index } => {
                check_index(Zone::Exile, *index, self.exile.len())?;
                self.exile.remove(*index);
                self.notify_zone(Zone::Exile);
            }
            Command::Mulligan => {
                let card = self.hand.pop().ok_or(PlayerError::EmptyZone(Zone::Hand))?;
                self.library.push(card);
                self.notify_zone(Zone::Library);
                self.notify_zone(Zone::Hand);
            }
            Command::Shuffle => self.notify_zone(Zone::Library),
            Command::Move { item, x, y } => self.apply_move(*item, *x, *y)?,
            Command::Tap { item } => self.update_item(*item, |i| i.tapped = !i.tapped)?,
            Command::Flip { item } => self.update_item(*item, |i| i.flipped = !i.flipped)?,
            Command::Face { item } => self.update_item(*item, |i| i.face_up = !i.face_up)?,
            Command::Counters { count, kind, item } => {
                self.apply_counters(*item, *count, kind)?;
            }
        }
        Ok(())
    }

    /// Describes this player's whole visible state.
    ///
    /// Always starts with `welcome`. With a tray it continues in a fixed
    /// order: tray, counts, life, graveyard, exile, then each battlefield
    /// item with its flags and counters.
    pub fn make_welcome_message(&self) -> Vec<Command> {
        let mut cmds = vec![Command::Welcome {
            version: self.version.clone(),
        }];
        let Some(tray) = &self.tray else {
            return cmds;
        };
        cmds.push(Command::Tray {
            item: tray.item_id,
            x: tray.x,
            y: tray.y,
        });
        cmds.extend(self.zone_commands());
        cmds.extend(self.battlefield.iter().flat_map(item_commands));
        cmds
    }

    /// Counts, life, graveyard, and exile as commands.
    pub(crate) fn zone_commands(&self) -> Vec<Command> {
        let mut cmds = vec![self.counts(), Command::SetLife { life: self.life }];
        cmds.extend(self.graveyard.iter().map(|card| Command::Bury {
            card: card.id.clone(),
        }));
        cmds.extend(self.exile.iter().map(|card| Command::Exile {
            card: card.id.clone(),
        }));
        cmds
    }
}

/// The commands that recreate one battlefield item.
pub(crate) fn item_commands(item: &BattlefieldItem) -> Vec<Command> {
    let id = item.item_id;
    let mut cmds = vec![Command::Enter {
        card: item.card.id().to_string(),
        name: item.card.name().to_string(),
        item: id,
        x: item.x,
        y: item.y,
    }];
    if item.tapped {
        cmds.push(Command::Tap { item: id });
    }
    if item.flipped {
        cmds.push(Command::Flip { item: id });
    }
    if !item.face_up {
        cmds.push(Command::Face { item: id });
    }
    cmds.extend(item.counters.iter().map(|(kind, count)| Command::Counters {
        count: *count,
        kind: kind.clone(),
        item: id,
    }));
    cmds
}

fn check_index(zone: Zone, index: usize, len: usize) -> Result<(), PlayerError> {
    if index >= len {
        return Err(PlayerError::IndexOutOfRange { zone, index, len });
    }
    Ok(())
}
