//! Driving a room from a recording.
//!
//! A room used for playback is never joined, so every recorded sender,
//! including whoever made the recording, becomes a replica and nothing is
//! ever queued for sending.

use cardtable_player::Inverse;
use cardtable_protocol::{Command, PlayerId};
use cardtable_replay::ReplayTarget;

use crate::{Room, RoomEvent};

/// The undo of one recorded batch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoomInverse {
    /// Undo for the sender's replica.
    pub player: Inverse,
    /// The batch created the sender's replica; undoing it removes the
    /// replica instead.
    pub created: bool,
}

impl ReplayTarget for Room {
    type Inverse = RoomInverse;

    fn replay_commands(&mut self, sender: &PlayerId, commands: &[Command]) {
        self.log_commands(sender, commands);
        self.handle_commands(sender, commands);
    }

    fn replay_chat(&mut self, sender: &PlayerId, text: &str) {
        self.emit(RoomEvent::Chat {
            sender: sender.clone(),
            text: text.to_string(),
        });
    }

    fn invert_commands(&mut self, sender: &PlayerId, commands: &[Command]) -> RoomInverse {
        if let Some(player) = self.player(sender) {
            return RoomInverse {
                player: player.invert_batch(sender, commands),
                created: false,
            };
        }

        let (version, welcomed) = match commands.first() {
            Some(Command::Hello { version }) => (version, true),
            Some(Command::Welcome { version }) => (version, false),
            _ => return RoomInverse::default(),
        };
        let mut fresh = self.new_player(sender.clone(), false).with_version(version);
        fresh.set_welcomed(welcomed);
        RoomInverse {
            player: fresh.invert_batch(sender, commands),
            created: true,
        }
    }

    fn rewind_commands(&mut self, sender: &PlayerId, inverse: &RoomInverse) {
        if inverse.created {
            self.remove_player(sender);
            return;
        }
        let Some(player) = self.player_mut(sender) else {
            return;
        };
        if let Err(err) = player.apply_inverse(&inverse.player) {
            tracing::warn!(player = %sender, error = %err, "inverse failed to apply");
            self.emit(RoomEvent::Error {
                player: sender.clone(),
                message: err.to_string(),
            });
        }
    }
}
