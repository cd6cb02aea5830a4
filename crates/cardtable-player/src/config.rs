//! Table configuration.

use serde::{Deserialize, Serialize};

/// Highest item id a player may hand out. Ids travel as 16-bit hex.
pub const MAX_ITEM_ID: u16 = 0xFFFF;

/// Life points at the start of a game and after a reset.
pub const DEFAULT_LIFE: i32 = 20;

/// Number of cards in an opening hand.
pub const DEFAULT_HAND_SIZE: usize = 7;

/// Game rules and limits that shape a player's table.
///
/// Every peer in a room must use the same `default_life`, since a `reset`
/// carries no value and each replica falls back to its own default.
///
/// ```rust
/// use cardtable_player::TableConfig;
///
/// let config = TableConfig {
///     default_life: 40,
///     ..Default::default()
/// };
/// assert_eq!(config.hand_size, 7);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    /// Life after a reset.
    pub default_life: i32,

    /// Cards drawn by [`Player::draw_opening_hand`](crate::Player::draw_opening_hand).
    pub hand_size: usize,

    /// Upper bound (inclusive) of the random item-id range.
    pub max_item_id: u16,

    /// Where a freshly created tray sits on the table.
    pub tray_position: (f64, f64),
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            default_life: DEFAULT_LIFE,
            hand_size: DEFAULT_HAND_SIZE,
            max_item_id: MAX_ITEM_ID,
            tray_position: (0.0, 0.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_constants() {
        let config = TableConfig::default();
        assert_eq!(config.default_life, 20);
        assert_eq!(config.hand_size, 7);
        assert_eq!(config.max_item_id, 0xFFFF);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: TableConfig =
            serde_json::from_str(r#"{"default_life": 30}"#).unwrap();
        assert_eq!(config.default_life, 30);
        assert_eq!(config.hand_size, DEFAULT_HAND_SIZE);
    }
}
