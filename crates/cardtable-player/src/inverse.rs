//! Inverse commands for backward replay.
//!
//! The replay log only stores forward deltas. To step backward, each batch
//! gets an inverse: commands that, applied right after the batch, put the
//! replica back where it was. Inverses read the state *before* each
//! command, so a batch is simulated one command at a time on a silent
//! copy of the player.

use cardtable_protocol::{Command, PlayerId, Zone};

use crate::apply::item_commands;
use crate::{Player, PlayerError};

/// The undo of one inbound batch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Inverse {
    /// Commands to apply, in order.
    pub commands: Vec<Command>,
    /// The batch was the first `welcome`; undoing it re-arms the guard.
    pub clears_welcome: bool,
}

impl Inverse {
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty() && !self.clears_welcome
    }
}

impl Player {
    /// Computes the commands that undo `cmd`, given the current state.
    ///
    /// # Errors
    /// Fails exactly when applying `cmd` would fail, for instance on an
    /// unknown item id or an index past the end of a pile.
    pub fn invert(&self, cmd: &Command) -> Result<Vec<Command>, PlayerError> {
        let inverse = match cmd {
            Command::Hello { .. } | Command::Welcome { .. } | Command::Shuffle => Vec::new(),
            Command::Reset => self.state_commands(),
            Command::Tray { item, .. } => match &self.tray {
                Some(old) => vec![Command::Tray {
                    item: old.item_id,
                    x: old.x,
                    y: old.y,
                }],
                None => vec![Command::Exit { item: *item }],
            },
            Command::Update { .. } | Command::Mulligan => vec![self.counts()],
            Command::SetLife { .. } => vec![Command::SetLife { life: self.life }],
            Command::Enter { .. } if self.tray.is_none() => return Err(PlayerError::NoTray),
            Command::Enter { item, .. } => vec![Command::Exit { item: *item }],
            Command::Exit { item } => match &self.tray {
                Some(tray) if tray.item_id == *item => {
                    let mut cmds = vec![Command::Tray {
                        item: tray.item_id,
                        x: tray.x,
                        y: tray.y,
                    }];
                    cmds.extend(self.battlefield.iter().flat_map(item_commands));
                    cmds
                }
                _ => item_commands(self.item(*item).ok_or(PlayerError::UnknownItem(*item))?),
            },
            Command::Bury { .. } => vec![Command::Unbury {
                index: self.graveyard.len(),
            }],
            Command::Exile { .. } => vec![Command::Unexile {
                index: self.exile.len(),
            }],
            Command::Unbury { index } => {
                let cards = tail(Zone::Graveyard, &self.graveyard, *index)?;
                let mut cmds: Vec<Command> = (1..cards.len())
                    .map(|_| Command::Unbury { index: *index })
                    .collect();
                cmds.extend(cards.iter().map(|card| Command::Bury {
                    card: card.id.clone(),
                }));
                cmds
            }
            Command::Unexile { index } => {
                let cards = tail(Zone::Exile, &self.exile, *index)?;
                let mut cmds: Vec<Command> = (1..cards.len())
                    .map(|_| Command::Unexile { index: *index })
                    .collect();
                cmds.extend(cards.iter().map(|card| Command::Exile {
                    card: card.id.clone(),
                }));
                cmds
            }
            Command::Move { item, .. } => {
                let current = self.item(*item).ok_or(PlayerError::UnknownItem(*item))?;
                vec![Command::Move {
                    item: *item,
                    x: current.x,
                    y: current.y,
                }]
            }
            Command::Tap { item } | Command::Flip { item } | Command::Face { item } => {
                self.item(*item).ok_or(PlayerError::UnknownItem(*item))?;
                vec![cmd.clone()]
            }
            Command::Counters { kind, item, .. } => {
                let current = self.item(*item).ok_or(PlayerError::UnknownItem(*item))?;
                vec![Command::Counters {
                    count: current.counters.get(kind).copied().unwrap_or(0),
                    kind: kind.clone(),
                    item: *item,
                }]
            }
        };
        Ok(inverse)
    }

    /// Computes the undo of a whole inbound batch, following the same
    /// gating as [`handle_batch`](Player::handle_batch).
    ///
    /// The batch is simulated on a silent copy; the inverse covers every
    /// command up to the first one that would fail.
    pub fn invert_batch(&self, sender: &PlayerId, cmds: &[Command]) -> Inverse {
        let mut inverse = Inverse::default();
        let Some(first) = cmds.first() else {
            return inverse;
        };
        if sender != &self.id {
            return inverse;
        }
        if matches!(first, Command::Welcome { .. }) {
            if self.has_been_welcomed {
                return inverse;
            }
            inverse.clears_welcome = true;
        }

        let mut shadow = self.shadow();
        let mut steps = Vec::with_capacity(cmds.len());
        for cmd in cmds {
            let Ok(step) = shadow.invert(cmd) else {
                break;
            };
            if shadow.execute_command(cmd).is_err() {
                break;
            }
            steps.push(step);
        }
        inverse.commands = steps.into_iter().rev().flatten().collect();
        inverse
    }

    /// Applies an inverse computed by [`invert_batch`](Player::invert_batch).
    pub fn apply_inverse(&mut self, inverse: &Inverse) -> Result<(), PlayerError> {
        if inverse.clears_welcome {
            self.has_been_welcomed = false;
        }
        for cmd in &inverse.commands {
            self.execute_command(cmd)?;
        }
        Ok(())
    }

    /// Counts, life, public piles, and battlefield as commands.
    fn state_commands(&self) -> Vec<Command> {
        let mut cmds = self.zone_commands();
        cmds.extend(self.battlefield.iter().flat_map(item_commands));
        cmds
    }
}

fn tail<T>(zone: Zone, pile: &[T], index: usize) -> Result<&[T], PlayerError> {
    pile.get(index..)
        .filter(|rest| !rest.is_empty())
        .ok_or(PlayerError::IndexOutOfRange {
            zone,
            index,
            len: pile.len(),
        })
}
