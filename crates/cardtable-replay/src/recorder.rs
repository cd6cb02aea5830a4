//! Recording games and the replay file format.
//!
//! The recorder keeps every inbound message verbatim, commands and chat
//! alike, with the time it arrived. Nothing is decoded at record time.
//!
//! # File format
//!
//! Gzip-compressed UTF-8 text:
//!
//! ```text
//! progenitus replay file
//! room: <room name>
//! player: <recording player>
//! 2012-03-04 20:15:01.123456 "alice" '[Hello] 0.31'
//! 2012-03-04 20:15:02.000000 "bob" 'good luck!\n[Shuffle]'
//! ```
//!
//! Each entry line is a timestamp, the sender in double quotes (with `"`
//! and `\` backslash-escaped), and the message as a single-quoted literal
//! with backslash escapes. Entries are in time order.

use std::fmt::Write as _;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use chrono::{Local, NaiveDateTime, SubsecRound};
use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use regex::Regex;

use crate::ReplayError;

/// First line of every replay file.
pub const REPLAY_HEADER: &str = "progenitus replay file";

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";
const TIME_PARSE_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";
const ENTRY_PATTERN: &str =
    r#"^(\d{4}-\d\d-\d\d\s\d\d:\d\d:\d\d\.\d+)\s+"((?:[^"\\]|\\.)*)"\s+(.+?)\s*$"#;

/// One recorded message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub time: NaiveDateTime,
    pub sender: String,
    pub text: String,
}

/// An append-only log of inbound messages.
#[derive(Debug, Clone)]
pub struct Recorder {
    room: String,
    player: String,
    start_time: NaiveDateTime,
    entries: Vec<Entry>,
}

impl Recorder {
    /// Starts a recording for `player` in `room`.
    pub fn new(room: impl Into<String>, player: impl Into<String>) -> Self {
        Self {
            room: room.into(),
            player: player.into(),
            start_time: now(),
            entries: Vec::new(),
        }
    }

    pub fn room(&self) -> &str {
        &self.room
    }

    pub fn player(&self) -> &str {
        &self.player
    }

    /// When recording started.
    pub fn start_time(&self) -> NaiveDateTime {
        self.start_time
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Records a message received now.
    pub fn record(&mut self, sender: &str, text: &str) {
        self.record_at(now(), sender, text);
    }

    /// Records a message with an explicit timestamp.
    ///
    /// A timestamp older than the last entry is clamped to it, so the log
    /// stays in order even if the wall clock steps back.
    pub fn record_at(&mut self, time: NaiveDateTime, sender: &str, text: &str) {
        let time = time.trunc_subsecs(6);
        let time = match self.entries.last() {
            Some(last) if last.time > time => last.time,
            _ => time,
        };
        self.entries.push(Entry {
            time,
            sender: sender.to_string(),
            text: text.to_string(),
        });
    }

    /// Drops every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    // -----------------------------------------------------------------------
    // Text form
    // -----------------------------------------------------------------------

    /// Renders the recording in the replay text format.
    pub fn to_text(&self) -> String {
        let mut text = format!("{REPLAY_HEADER}\nroom: {}\nplayer: {}", self.room, self.player);
        for entry in &self.entries {
            // Writing to a String cannot fail.
            let _ = write!(
                text,
                "\n{} \"{}\" {}",
                entry.time.format(TIME_FORMAT),
                escape_sender(&entry.sender),
                quote_literal(&entry.text)
            );
        }
        text
    }

    /// Parses the replay text format.
    ///
    /// # Errors
    /// - [`ReplayError::BadHeader`] if the header lines are wrong
    /// - [`ReplayError::Malformed`] for an entry line that doesn't parse
    /// - [`ReplayError::Unsorted`] if an entry is older than its predecessor
    pub fn parse_text(text: &str) -> Result<Self, ReplayError> {
        let mut lines = text.lines();
        let magic = lines.next().unwrap_or_default();
        if magic.trim_end() != REPLAY_HEADER {
            return Err(ReplayError::BadHeader(format!("unexpected first line {magic:?}")));
        }
        let room = header_field(lines.next(), "room")?;
        let player = header_field(lines.next(), "player")?;

        let pattern = Regex::new(ENTRY_PATTERN)?;
        let mut entries: Vec<Entry> = Vec::new();
        for (offset, line) in lines.enumerate() {
            let line_no = offset + 4;
            if line.trim().is_empty() {
                continue;
            }
            let malformed = |reason: &str| ReplayError::Malformed {
                line: line_no,
                reason: reason.to_string(),
            };

            let caps = pattern
                .captures(line)
                .ok_or_else(|| malformed("not a replay entry"))?;
            let time = NaiveDateTime::parse_from_str(&caps[1], TIME_PARSE_FORMAT)
                .map_err(|e| malformed(&format!("bad timestamp: {e}")))?;
            let sender = unescape_sender(&caps[2]);
            let text =
                unquote_literal(&caps[3]).ok_or_else(|| malformed("bad message literal"))?;

            if entries.last().is_some_and(|last| last.time > time) {
                return Err(ReplayError::Unsorted { line: line_no });
            }
            entries.push(Entry { time, sender, text });
        }

        let start_time = entries.first().map_or_else(now, |entry| entry.time);
        tracing::debug!(%room, %player, entries = entries.len(), "replay parsed");
        Ok(Self {
            room,
            player,
            start_time,
            entries,
        })
    }

    // -----------------------------------------------------------------------
    // Gzip files
    // -----------------------------------------------------------------------

    /// Writes the gzip-compressed text form to `writer`.
    pub fn write_to<W: Write>(&self, writer: W) -> Result<W, ReplayError> {
        let mut encoder = GzEncoder::new(writer, Compression::default());
        encoder.write_all(self.to_text().as_bytes())?;
        Ok(encoder.finish()?)
    }

    /// Reads a gzip-compressed replay from `reader`.
    pub fn read_from<R: Read>(reader: R) -> Result<Self, ReplayError> {
        let mut text = String::new();
        GzDecoder::new(reader).read_to_string(&mut text)?;
        Self::parse_text(&text)
    }

    /// Saves the recording to a file.
    pub fn dump_to_file(&self, path: impl AsRef<Path>) -> Result<(), ReplayError> {
        let path = path.as_ref();
        let file = File::create(path)?;
        self.write_to(BufWriter::new(file))?.flush()?;
        tracing::info!(path = %path.display(), entries = self.entries.len(), "replay saved");
        Ok(())
    }

    /// Loads a recording from a file.
    pub fn read_from_file(path: impl AsRef<Path>) -> Result<Self, ReplayError> {
        let file = File::open(path.as_ref())?;
        Self::read_from(BufReader::new(file))
    }
}

/// Current local time at the file format's microsecond precision.
fn now() -> NaiveDateTime {
    Local::now().naive_local().trunc_subsecs(6)
}

fn header_field(line: Option<&str>, name: &str) -> Result<String, ReplayError> {
    let line = line.ok_or_else(|| ReplayError::BadHeader(format!("missing {name} line")))?;
    line.strip_prefix(name)
        .and_then(|rest| rest.strip_prefix(':'))
        .filter(|rest| rest.starts_with(char::is_whitespace))
        .map(|rest| rest.trim().to_string())
        .ok_or_else(|| ReplayError::BadHeader(format!("expected `{name}: ...`, got {line:?}")))
}

// ---------------------------------------------------------------------------
// Escaping
// ---------------------------------------------------------------------------

fn escape_sender(sender: &str) -> String {
    sender.replace('\\', "\\\\").replace('"', "\\\"")
}

fn unescape_sender(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => out.extend(chars.next()),
            c => out.push(c),
        }
    }
    out
}

/// Renders `text` as a single-quoted literal with backslash escapes.
fn quote_literal(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('\'');
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => {
                let _ = write!(out, "\\x{:02x}", u32::from(c));
            }
            c => out.push(c),
        }
    }
    out.push('\'');
    out
}

/// Parses a quoted literal as written by [`quote_literal`].
///
/// Also accepts double quotes, a leading `u`, and `\xNN`, `\uNNNN`,
/// `\UNNNNNNNN` escapes.
fn unquote_literal(raw: &str) -> Option<String> {
    let body = raw.strip_prefix('u').unwrap_or(raw);
    let quote = body.chars().next().filter(|c| *c == '\'' || *c == '"')?;
    let inner = body.strip_prefix(quote)?.strip_suffix(quote)?;

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == quote {
            return None;
        }
        if c != '\\' {
            out.push(c);
            continue;
        }
        let escaped = match chars.next()? {
            'n' => '\n',
            'r' => '\r',
            't' => '\t',
            '0' => '\0',
            'x' => hex_char(&mut chars, 2)?,
            'u' => hex_char(&mut chars, 4)?,
            'U' => hex_char(&mut chars, 8)?,
            c @ ('\\' | '\'' | '"') => c,
            _ => return None,
        };
        out.push(escaped);
    }
    Some(out)
}

fn hex_char(chars: &mut std::str::Chars<'_>, digits: usize) -> Option<char> {
    let hex: String = chars.by_ref().take(digits).collect();
    if hex.len() != digits {
        return None;
    }
    u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32)
}

// =========================================================================
// Tests
// =========================================================================
