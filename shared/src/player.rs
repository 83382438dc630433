//! Player identities and per-player stats.

use serde::{Deserialize, Serialize};

/// A participant's display name, which doubles as their unique identity
/// within a room. Ordering is byte-wise lexicographic.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct Identity(pub String);

impl Identity {
    pub fn new(name: impl Into<String>) -> Self {
        Identity(name.into())
    }

    /// The identity a relay admits for a typed-in display name.
    pub fn from_display_name(name: &str) -> Self {
        Identity(name.trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Identity {
    fn from(v: &str) -> Self {
        Identity(v.to_string())
    }
}

impl From<String> for Identity {
    fn from(v: String) -> Self {
        Identity(v)
    }
}

impl std::fmt::Display for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Stats tracked for each player present in the room.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PlayerRecord {
    /// User-adjusted drink counter. Game rules never change it.
    pub drinks: u32,
    pub cards_drawn: u32,
    /// Times the Question Master caught this player.
    pub caught: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_are_trimmed() {
        assert_eq!(Identity::from_display_name("  ann \n"), Identity::from("ann"));
        assert_eq!(Identity::from_display_name("bo"), Identity::from("bo"));
        assert_eq!(Identity::from_display_name("   ").as_str(), "");
    }
}
