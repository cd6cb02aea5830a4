//! Seekable playback of a recording.
//!
//! [`Replay`] walks the entries of a [`Recorder`] and feeds them to a
//! [`ReplayTarget`]. Moving forward decodes each entry and dispatches it;
//! moving backward applies the inverse the target derived for that entry on
//! the way forward. The cursor is always "number of entries applied".

use cardtable_protocol::{Command, Inbound, LineCodec, PlayerId};
use chrono::NaiveDateTime;

use crate::{Recorder, ReplayError};

/// Whatever replay drives: usually a room with one replica per sender.
pub trait ReplayTarget {
    /// Undo information for one entry.
    type Inverse;

    /// Applies one decoded command batch from `sender`.
    fn replay_commands(&mut self, sender: &PlayerId, commands: &[Command]);

    /// Shows one chat line from `sender`.
    fn replay_chat(&mut self, sender: &PlayerId, text: &str);

    /// Computes the undo of `commands` against the current state, before
    /// they are applied.
    fn invert_commands(&mut self, sender: &PlayerId, commands: &[Command]) -> Self::Inverse;

    /// Applies an undo previously returned by
    /// [`invert_commands`](Self::invert_commands).
    fn rewind_commands(&mut self, sender: &PlayerId, inverse: &Self::Inverse);
}

/// What it takes to step back over one entry.
#[derive(Debug, Clone)]
enum Reverse<I> {
    /// Chat or an undecodable line: nothing to undo.
    Nothing,
    Commands(I),
}

/// A cursor over a recording.
pub struct Replay<I> {
    recorder: Recorder,
    codec: LineCodec,
    cursor: usize,
    reverse: Vec<Option<Reverse<I>>>,
}

impl<I> std::fmt::Debug for Replay<I> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Replay")
            .field("room", &self.recorder.room())
            .field("entries", &self.recorder.entries().len())
            .field("cursor", &self.cursor)
            .finish()
    }
}

impl<I> Replay<I> {
    /// Positions a new replay before the first entry.
    pub fn new(recorder: Recorder) -> Result<Self, ReplayError> {
        let reverse = (0..recorder.entries().len()).map(|_| None).collect();
        Ok(Self {
            recorder,
            codec: LineCodec::new()?,
            cursor: 0,
            reverse,
        })
    }

    pub fn recorder(&self) -> &Recorder {
        &self.recorder
    }

    pub fn len(&self) -> usize {
        self.recorder.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of entries applied so far.
    pub fn position(&self) -> usize {
        self.cursor
    }

    /// Timestamp of the first entry.
    pub fn start_time(&self) -> Option<NaiveDateTime> {
        self.recorder.entries().first().map(|entry| entry.time)
    }

    /// Timestamp of the last entry.
    pub fn end_time(&self) -> Option<NaiveDateTime> {
        self.recorder.entries().last().map(|entry| entry.time)
    }

    /// Timestamp of the last applied entry.
    pub fn current_time(&self) -> Option<NaiveDateTime> {
        self.cursor
            .checked_sub(1)
            .map(|index| self.recorder.entries()[index].time)
    }

    /// Index of the first entry strictly after `time`.
    fn goal(&self, time: NaiveDateTime) -> usize {
        self.recorder.entries().partition_point(|entry| entry.time <= time)
    }

    /// Moves so that exactly the entries with a timestamp at or before
    /// `time` are applied.
    ///
    /// # Errors
    /// [`ReplayError::NoReverseHistory`] if going back would cross an entry
    /// that was never applied with its inverse recorded (see
    /// [`skip_to`](Self::skip_to)). The target is left untouched.
    pub fn seek<T>(&mut self, time: NaiveDateTime, target: &mut T) -> Result<(), ReplayError>
    where
        T: ReplayTarget<Inverse = I>,
    {
        let goal = self.goal(time);
        if goal >= self.cursor {
            while self.cursor < goal {
                self.forward(target, true);
            }
            return Ok(());
        }

        if let Some(index) = (goal..self.cursor).rev().find(|&i| self.reverse[i].is_none()) {
            return Err(ReplayError::NoReverseHistory { index });
        }
        while self.cursor > goal {
            self.backward(target);
        }
        Ok(())
    }

    /// Moves forward to `time` without recording inverses.
    ///
    /// Entries skipped this way can't be stepped back over later. Never
    /// moves backward.
    pub fn skip_to<T>(&mut self, time: NaiveDateTime, target: &mut T)
    where
        T: ReplayTarget<Inverse = I>,
    {
        let goal = self.goal(time);
        while self.cursor < goal {
            self.forward(target, false);
        }
    }

    /// Applies the next entry. Returns `false` at the end of the recording.
    pub fn step_forward<T>(&mut self, target: &mut T) -> bool
    where
        T: ReplayTarget<Inverse = I>,
    {
        if self.cursor >= self.len() {
            return false;
        }
        self.forward(target, true);
        true
    }

    /// Undoes the last applied entry. Returns `Ok(false)` at the start.
    pub fn step_backward<T>(&mut self, target: &mut T) -> Result<bool, ReplayError>
    where
        T: ReplayTarget<Inverse = I>,
    {
        let Some(index) = self.cursor.checked_sub(1) else {
            return Ok(false);
        };
        if self.reverse[index].is_none() {
            return Err(ReplayError::NoReverseHistory { index });
        }
        self.backward(target);
        Ok(true)
    }

    // -----------------------------------------------------------------------
    // Single steps
    // -----------------------------------------------------------------------

    fn forward<T>(&mut self, target: &mut T, keep_inverse: bool)
    where
        T: ReplayTarget<Inverse = I>,
    {
        let index = self.cursor;
        let entry = &self.recorder.entries()[index];
        let sender = PlayerId::new(entry.sender.clone());

        let reverse = match self.codec.decode(&entry.text) {
            Inbound::Commands(commands) => {
                let inverse = if keep_inverse && self.reverse[index].is_none() {
                    Some(target.invert_commands(&sender, &commands))
                } else {
                    None
                };
                target.replay_commands(&sender, &commands);
                inverse.map(Reverse::Commands)
            }
            Inbound::Chat(text) => {
                target.replay_chat(&sender, &text);
                Some(Reverse::Nothing)
            }
            Inbound::Ignored => {
                tracing::debug!(index, "replay entry ignored");
                Some(Reverse::Nothing)
            }
        };
        if let Some(reverse) = reverse {
            self.reverse[index] = Some(reverse);
        }
        self.cursor += 1;
    }

    fn backward<T>(&mut self, target: &mut T)
    where
        T: ReplayTarget<Inverse = I>,
    {
        self.cursor -= 1;
        let entry = &self.recorder.entries()[self.cursor];
        if let Some(Reverse::Commands(inverse)) = &self.reverse[self.cursor] {
            let sender = PlayerId::new(entry.sender.clone());
            target.rewind_commands(&sender, inverse);
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
