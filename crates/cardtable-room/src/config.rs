//! Room configuration.

use std::time::Duration;

use cardtable_player::TableConfig;
use cardtable_protocol::PROTOCOL_VERSION;
use serde::{Deserialize, Serialize};

/// Default wait between saying `hello` and putting the tray down, so that
/// peers' welcome replies arrive first.
pub const JOIN_DELAY: Duration = Duration::from_millis(1000);

/// Default tray tint, an RGB triple in `0.0..=1.0`.
pub const TRAY_COLOR: (f32, f32, f32) = (0.8, 0.8, 1.0);

/// Configuration for a room instance.
///
/// Override individual fields with struct update syntax:
///
/// ```rust
/// use cardtable_room::RoomConfig;
///
/// let config = RoomConfig {
///     record: false,
///     ..Default::default()
/// };
/// assert_eq!(config.version, "0.31");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoomConfig {
    /// Protocol version announced in `hello` and `welcome`. A single token.
    pub version: String,

    /// Delay between `hello` and tray creation.
    pub join_delay: Duration,

    /// Whether inbound messages are recorded for replay.
    pub record: bool,

    /// Tint of the local player's tray.
    pub tray_color: (f32, f32, f32),

    /// Table rules shared by every player in the room.
    pub table: TableConfig,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            version: PROTOCOL_VERSION.to_string(),
            join_delay: JOIN_DELAY,
            record: true,
            tray_color: TRAY_COLOR,
            table: TableConfig::default(),
        }
    }
}
