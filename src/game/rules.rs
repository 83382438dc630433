//! Table policy knobs. Only the host's copy matters; guests never evaluate them.

use serde::{Deserialize, Serialize};

/// What the remaining peers do when the host leaves.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum HostMigration {
    /// Nobody takes over; the table stays frozen for the guests.
    Freeze,
    /// The lexicographically lowest surviving identity becomes host.
    #[default]
    LowestSurvivor,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TableRules {
    /// Seats in the turn order; players beyond this still play power rounds
    /// only if they hold the badge.
    pub max_seats: usize,
    pub waterfall_min_secs: u32,
    pub waterfall_max_secs: u32,
    /// Whether an active Heaven/Thumbmaster round also locks the deck.
    pub lock_deck_on_power_rounds: bool,
    pub max_king_rules: usize,
    pub max_rule_len: usize,
    pub host_migration: HostMigration,
}

impl Default for TableRules {
    fn default() -> Self {
        TableRules {
            max_seats: 6,
            waterfall_min_secs: 5,
            waterfall_max_secs: 20,
            lock_deck_on_power_rounds: false,
            max_king_rules: 10,
            max_rule_len: 140,
            host_migration: HostMigration::LowestSurvivor,
        }
    }
}

impl TableRules {
    /// Inclusive Waterfall duration range, tolerant of a reversed config.
    pub fn waterfall_range(&self) -> std::ops::RangeInclusive<u32> {
        let lo = self.waterfall_min_secs.min(self.waterfall_max_secs);
        let hi = self.waterfall_min_secs.max(self.waterfall_max_secs);
        lo..=hi
    }
}
