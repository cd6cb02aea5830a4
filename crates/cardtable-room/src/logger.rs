//! The human-readable game log.
//!
//! Separate from `tracing` diagnostics: these are the lines a player reads
//! ("bob shuffles their deck."). Only some command kinds produce a line.

use cardtable_protocol::{Command, PlayerId};

/// An append-only list of game log lines.
#[derive(Debug, Clone, Default)]
pub struct Logger {
    entries: Vec<String>,
}

impl Logger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a line.
    pub fn log(&mut self, line: impl Into<String>) {
        self.entries.push(line.into());
    }

    /// Appends one line per loggable command and returns the new lines.
    pub fn log_commands(&mut self, sender: &PlayerId, cmds: &[Command]) -> Vec<String> {
        let lines: Vec<String> = cmds.iter().filter_map(|cmd| describe(sender, cmd)).collect();
        self.entries.extend(lines.iter().cloned());
        lines
    }

    pub fn get_log(&self) -> &[String] {
        &self.entries
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// The log line for one command, if its kind is logged.
pub fn describe(sender: &PlayerId, cmd: &Command) -> Option<String> {
    let line = match cmd {
        Command::Hello { .. } => format!("{sender} connected."),
        Command::Tray { .. } => format!("{sender} joined the game."),
        Command::Shuffle => format!("{sender} shuffles their deck."),
        Command::SetLife { life } => format!("{sender} has {life} life points."),
        Command::Mulligan => format!("{sender} takes a mulligan."),
        Command::Reset => format!("{sender} resets their deck."),
        Command::Flip { .. } => format!("{sender} flips a card."),
        Command::Face { .. } => format!("{sender} turns a card over."),
        Command::Counters { count, kind, .. } => {
            format!("{sender} puts {count} {kind} counter on a card.")
        }
        _ => return None,
    };
    Some(line)
}
