//! Canonical table state and the entities reachable from it.
//!
//! Every field defaults when absent so snapshots from older or newer peers
//! still decode; the host is the only peer that ever constructs these values
//! outside of decoding.

use std::collections::{BTreeMap, VecDeque};

use serde::{Deserialize, Serialize};

use crate::cards::Card;
use crate::player::{Identity, PlayerRecord};

/// Tap-based mini-games triggered by badge ranks.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PowerKind {
    /// Rank 7: last hand raised to the sky loses.
    Heaven,
    /// Rank J: last thumb on the table loses.
    Thumbmaster,
    /// A kind introduced by a newer peer. Decodes, but can never be started.
    #[serde(other)]
    Unknown,
}

impl PowerKind {
    pub fn label(self) -> &'static str {
        match self {
            PowerKind::Heaven => "Heaven",
            PowerKind::Thumbmaster => "Thumbmaster",
            PowerKind::Unknown => "Unknown",
        }
    }
}

/// Badge slots, one per badge-granting rank. Each is overwritten by the
/// next draw of its rank and cleared when its holder leaves.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Holders {
    pub heaven: Option<Identity>,
    pub thumbmaster: Option<Identity>,
    pub question_master: Option<Identity>,
    pub king: Option<Identity>,
}

impl Holders {
    /// Holder of the badge that may start a round of `kind`.
    pub fn for_kind(&self, kind: PowerKind) -> Option<&Identity> {
        match kind {
            PowerKind::Heaven => self.heaven.as_ref(),
            PowerKind::Thumbmaster => self.thumbmaster.as_ref(),
            PowerKind::Unknown => None,
        }
    }

    /// Clear every slot held by `who`. Returns true if anything changed.
    pub fn release(&mut self, who: &Identity) -> bool {
        let mut changed = false;
        for slot in [
            &mut self.heaven,
            &mut self.thumbmaster,
            &mut self.question_master,
            &mut self.king,
        ] {
            if slot.as_ref() == Some(who) {
                *slot = None;
                changed = true;
            }
        }
        changed
    }
}

/// A Heaven/Thumbmaster round. `eligible` is fixed at start and only
/// shrinks; `tapped` is append-only with one entry per identity.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PowerRound {
    pub kind: PowerKind,
    pub starter: Identity,
    #[serde(default)]
    pub eligible: Vec<Identity>,
    #[serde(default)]
    pub tapped: Vec<Identity>,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub loser: Option<Identity>,
    #[serde(default)]
    pub started_at: u64,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WaterfallPhase {
    /// Created at draw time; duration fixed, clock not started.
    Pending,
    /// The drawer pressed start; `started_at` and `ends_at` are fixed.
    Active,
}

/// Ace-triggered Waterfall. Removing it from the state is the "cleared" phase.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Waterfall {
    pub phase: WaterfallPhase,
    pub drawer: Identity,
    pub duration_sec: u32,
    #[serde(default)]
    pub started_at: Option<u64>,
    #[serde(default)]
    pub ends_at: Option<u64>,
}

impl Waterfall {
    pub fn pending(drawer: Identity, duration_sec: u32) -> Self {
        Self {
            phase: WaterfallPhase::Pending,
            drawer,
            duration_sec,
            started_at: None,
            ends_at: None,
        }
    }

    /// True once an active Waterfall has run its full duration at `now` (ms).
    pub fn is_finished(&self, now: u64) -> bool {
        matches!(
            (self.phase, self.ends_at),
            (WaterfallPhase::Active, Some(end)) if now >= end
        )
    }
}

/// A persistent rule added by a King holder.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct KingRule {
    pub id: u64,
    pub text: String,
    pub author: Identity,
    #[serde(default)]
    pub created_at: u64,
}

/// The Question Master's most recent catch.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuestionTag {
    pub by: Identity,
    pub target: Identity,
    #[serde(default)]
    pub at: u64,
}

/// The root aggregate every peer mirrors. Only the host produces new values.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CanonicalState {
    pub host: Option<Identity>,
    pub deck: VecDeque<Card>,
    pub current_card: Option<Card>,
    pub turn: Option<Identity>,
    pub last_drawer: Option<Identity>,
    pub players: BTreeMap<Identity, PlayerRecord>,
    pub holders: Holders,
    pub power_round: Option<PowerRound>,
    pub waterfall: Option<Waterfall>,
    pub king_rules: Vec<KingRule>,
    pub deck_locked: bool,
    pub question_master_tag: Option<QuestionTag>,
    pub next_rule_id: u64,
    pub revision: u64,
}

impl CanonicalState {
    pub fn is_present(&self, who: &Identity) -> bool {
        self.players.contains_key(who)
    }

    pub fn is_host(&self, who: &Identity) -> bool {
        self.host.as_ref() == Some(who)
    }

    /// The round currently accepting taps, if any.
    pub fn active_round(&self) -> Option<&PowerRound> {
        self.power_round.as_ref().filter(|r| r.active)
    }
}
