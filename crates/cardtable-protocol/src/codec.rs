//! The text line codec.
//!
//! Commands travel as plain chat messages, one command per line, in a
//! human-readable format derived from each kind's template (see
//! [`CommandKind::template`]). A message whose first line is a command is a
//! command batch; anything else is chat.
//!
//! The decoder never guesses. Each template is compiled once into an
//! anchored regular expression, and a line is a command only if one of
//! those expressions matches it in full.

use regex::Regex;

use crate::{Command, CommandKind, ItemId, ProtocolError};

/// Sub-patterns substituted for template placeholders.
///
/// Order matters: `"%s"` has to be tried before `%s`.
const PLACEHOLDERS: [(&str, &str); 5] = [
    ("\"%s\"", r#""((?:[^"\\]|\\.)*)""#),
    ("%.2f", r"\s*(-?\d+\.\d\d)\s*"),
    ("%d", r"\s*(-?\d+)\s*"),
    ("%x", r"\s*([0-9a-f]+)\s*"),
    ("%s", r"(\S+)"),
];

/// The escape character for chat lines that look like commands.
const ESCAPE: char = '\\';

/// The outcome of decoding one inbound text message.
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    /// The first line was a command. Later lines that match nothing are
    /// dropped.
    Commands(Vec<Command>),

    /// Ordinary chat text, with one leading escape character removed.
    Chat(String),

    /// Empty chat; never delivered.
    Ignored,
}

/// Encodes commands to text lines and decodes text back into commands.
///
/// Building the codec compiles one matcher per [`CommandKind`]; reuse the
/// instance (it is cheap to clone).
#[derive(Debug, Clone)]
pub struct LineCodec {
    matchers: Vec<(CommandKind, Regex)>,
}

impl LineCodec {
    /// Compiles the matchers for every command kind.
    pub fn new() -> Result<Self, ProtocolError> {
        let matchers = CommandKind::ALL
            .iter()
            .map(|&kind| Ok((kind, Regex::new(&template_pattern(kind.template()))?)))
            .collect::<Result<Vec<_>, ProtocolError>>()?;
        Ok(Self { matchers })
    }

    // -----------------------------------------------------------------------
    // Encoding
    // -----------------------------------------------------------------------

    /// Encodes one command as a single line.
    pub fn encode_command(&self, cmd: &Command) -> Result<String, ProtocolError> {
        let line = match cmd {
            Command::Hello { version } => format!("[Hello] {}", token(version)?),
            Command::Welcome { version } => format!("[Welcome] {}", token(version)?),
            Command::Reset => "[Reset]".to_string(),
            Command::Tray { item, x, y } => format!(
                "[CreateTray] as {item} at ({}, {})",
                fixed(*x)?,
                fixed(*y)?
            ),
            Command::Update { library, hand } => format!("[Update] {library} {hand}"),
            Command::SetLife { life } => format!("[Setlife] {life}"),
            Command::Enter {
                card,
                name,
                item,
                x,
                y,
            } => format!(
                "[Enter] {} {} as {item} at ({},{})",
                token(card)?,
                quoted(name)?,
                fixed(*x)?,
                fixed(*y)?
            ),
            Command::Exit { item } => format!("[Exit] {item}"),
            Command::Bury { card } => format!("[Bury] {}", token(card)?),
            Command::Unbury { index } => format!("[Unbury] {index}"),
            Command::Exile { card } => format!("[Exile] {}", token(card)?),
            Command::Unexile { index } => format!("[Unexile] {index}"),
            Command::Mulligan => "[Mulligan]".to_string(),
            Command::Shuffle => "[Shuffle]".to_string(),
            Command::Move { item, x, y } => {
                format!("[Move] {item} to ({},{})", fixed(*x)?, fixed(*y)?)
            }
            Command::Tap { item } => format!("[Tap] {item}"),
            Command::Flip { item } => format!("[Flip] {item}"),
            Command::Face { item } => format!("[Face] {item}"),
            Command::Counters { count, kind, item } => {
                format!("[Counter] {count} {} counter on {item}", quoted(kind)?)
            }
        };
        Ok(line)
    }

    /// Encodes a batch as newline-joined lines, in order.
    pub fn encode_batch(&self, cmds: &[Command]) -> Result<String, ProtocolError> {
        let lines = cmds
            .iter()
            .map(|cmd| self.encode_command(cmd))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(lines.join("\n"))
    }

    // -----------------------------------------------------------------------
    // Decoding
    // -----------------------------------------------------------------------

    /// Decodes a single line, or returns `None` if it matches no kind.
    pub fn decode_line(&self, line: &str) -> Option<Command> {
        self.matchers.iter().find_map(|(kind, re)| {
            let caps = re.captures(line)?;
            let args: Vec<&str> = caps
                .iter()
                .skip(1)
                .map(|m| m.map_or("", |m| m.as_str()))
                .collect();
            build(*kind, &args)
        })
    }

    /// Classifies and decodes a whole message.
    ///
    /// The first line alone decides between a command batch and chat.
    pub fn decode(&self, text: &str) -> Inbound {
        let mut lines = text.split('\n');
        let first = lines.next().unwrap_or_default();

        match self.decode_line(first) {
            Some(cmd) => {
                let mut cmds = vec![cmd];
                cmds.extend(lines.filter_map(|line| self.decode_line(line)));
                Inbound::Commands(cmds)
            }
            None => {
                let body = text.strip_prefix(ESCAPE).unwrap_or(text);
                if body.is_empty() {
                    Inbound::Ignored
                } else {
                    Inbound::Chat(body.to_string())
                }
            }
        }
    }
}

/// Prepares chat text for sending.
///
/// Text that starts with `[` or the escape character gets one escape
/// character prepended so peers never read it as a command. Returns `None`
/// for empty text, which is never sent.
pub fn escape_chat(text: &str) -> Option<String> {
    if text.is_empty() {
        return None;
    }
    if text.starts_with('[') || text.starts_with(ESCAPE) {
        Some(format!("{ESCAPE}{text}"))
    } else {
        Some(text.to_string())
    }
}

// ---------------------------------------------------------------------------
// Pattern construction
// ---------------------------------------------------------------------------

fn template_pattern(template: &str) -> String {
    let mut pattern = String::from("^");
    let mut rest = template;

    'outer: while let Some(c) = rest.chars().next() {
        for (placeholder, sub) in PLACEHOLDERS {
            if let Some(tail) = rest.strip_prefix(placeholder) {
                pattern.push_str(sub);
                rest = tail;
                continue 'outer;
            }
        }
        if c.is_whitespace() {
            pattern.push_str(r"\s+");
        } else {
            pattern.push_str(&regex::escape(c.encode_utf8(&mut [0; 4])));
        }
        rest = &rest[c.len_utf8()..];
    }

    pattern.push_str(r"\s*$");
    pattern
}

// ---------------------------------------------------------------------------
// Argument coercion
// ---------------------------------------------------------------------------

/// Builds a command from raw captures. Any capture that does not fit its
/// field type makes the whole line a non-match.
fn build(kind: CommandKind, args: &[&str]) -> Option<Command> {
    debug_assert_eq!(args.len(), kind.arity(), "arity mismatch for {kind}");

    let hex = |i: usize| u16::from_str_radix(args[i], 16).ok().map(ItemId);
    let float = |i: usize| args[i].parse::<f64>().ok();
    let int = |i: usize| args[i].parse::<i32>().ok();
    let count = |i: usize| args[i].parse::<usize>().ok();
    let text = |i: usize| args[i].to_string();

    let cmd = match kind {
        CommandKind::Hello => Command::Hello { version: text(0) },
        CommandKind::Welcome => Command::Welcome { version: text(0) },
        CommandKind::Reset => Command::Reset,
        CommandKind::Tray => Command::Tray {
            item: hex(0)?,
            x: float(1)?,
            y: float(2)?,
        },
        CommandKind::Update => Command::Update {
            library: count(0)?,
            hand: count(1)?,
        },
        CommandKind::SetLife => Command::SetLife { life: int(0)? },
        CommandKind::Enter => Command::Enter {
            card: text(0),
            name: unquote(args[1]),
            item: hex(2)?,
            x: float(3)?,
            y: float(4)?,
        },
        CommandKind::Exit => Command::Exit { item: hex(0)? },
        CommandKind::Bury => Command::Bury { card: text(0) },
        CommandKind::Unbury => Command::Unbury { index: count(0)? },
        CommandKind::Exile => Command::Exile { card: text(0) },
        CommandKind::Unexile => Command::Unexile { index: count(0)? },
        CommandKind::Mulligan => Command::Mulligan,
        CommandKind::Shuffle => Command::Shuffle,
        CommandKind::Move => Command::Move {
            item: hex(0)?,
            x: float(1)?,
            y: float(2)?,
        },
        CommandKind::Tap => Command::Tap { item: hex(0)? },
        CommandKind::Flip => Command::Flip { item: hex(0)? },
        CommandKind::Face => Command::Face { item: hex(0)? },
        CommandKind::Counters => Command::Counters {
            count: int(0)?,
            kind: unquote(args[1]),
            item: hex(2)?,
        },
    };
    Some(cmd)
}

fn token(value: &str) -> Result<&str, ProtocolError> {
    if value.is_empty() || value.chars().any(char::is_whitespace) {
        return Err(ProtocolError::InvalidArgument(format!(
            "bare token {value:?} must be non-empty and contain no whitespace"
        )));
    }
    Ok(value)
}

fn quoted(value: &str) -> Result<String, ProtocolError> {
    if value.contains('\n') {
        return Err(ProtocolError::InvalidArgument(format!(
            "quoted string {value:?} contains a newline"
        )));
    }
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        if c == '"' || c == ESCAPE {
            out.push(ESCAPE);
        }
        out.push(c);
    }
    out.push('"');
    Ok(out)
}

fn unquote(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c == ESCAPE {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(c);
        }
    }
    out
}

fn fixed(value: f64) -> Result<String, ProtocolError> {
    if !value.is_finite() {
        return Err(ProtocolError::InvalidArgument(format!(
            "coordinate {value} is not finite"
        )));
    }
    Ok(format!("{value:.2}"))
}

// =========================================================================
// Tests
// =========================================================================
