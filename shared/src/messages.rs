//! Peer-to-peer messaging schema for the KAD-Kings table.

use serde::{Deserialize, Serialize};

use crate::game::{CanonicalState, PowerKind};
use crate::player::Identity;

/// A game action a participant wants applied to the shared table.
///
/// On the host this is applied directly; on a guest it travels as the
/// matching request variant of [`PeerMsg`].
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum Action {
    Draw,
    PatchPlayer {
        target: Identity,
        #[serde(default)]
        drinks: Option<u32>,
    },
    StartPowerRound(PowerKind),
    TapPowerRound(PowerKind),
    ClearPowerRound,
    StartWaterfall,
    TagQuestion {
        target: Identity,
    },
    AddKingRule {
        text: String,
    },
    RemoveKingRule {
        rule_id: u64,
    },
}

/// Messages exchanged over the room's data channel.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum PeerMsg {
    /// Full-state broadcast from the host. Receivers replace their copy.
    State(Box<CanonicalState>),
    DrawRequest {
        by: Identity,
    },
    PlayerPatch {
        by: Identity,
        target: Identity,
        #[serde(default)]
        drinks: Option<u32>,
    },
    StartPowerRound {
        by: Identity,
        kind: PowerKind,
    },
    TapPowerRound {
        by: Identity,
        kind: PowerKind,
    },
    ClearPowerRound {
        by: Identity,
    },
    StartWaterfall {
        by: Identity,
    },
    QuestionMasterTag {
        by: Identity,
        target: Identity,
    },
    KingAddRule {
        by: Identity,
        text: String,
    },
    KingRemoveRule {
        by: Identity,
        rule_id: u64,
    },
}

impl PeerMsg {
    /// Wire tags understood by this version.
    pub const KNOWN_TYPES: &'static [&'static str] = &[
        "state",
        "draw_request",
        "player_patch",
        "start_power_round",
        "tap_power_round",
        "clear_power_round",
        "start_waterfall",
        "question_master_tag",
        "king_add_rule",
        "king_remove_rule",
    ];

    /// Build the request a guest sends for `action`.
    pub fn request(by: Identity, action: Action) -> Self {
        match action {
            Action::Draw => PeerMsg::DrawRequest { by },
            Action::PatchPlayer { target, drinks } => PeerMsg::PlayerPatch { by, target, drinks },
            Action::StartPowerRound(kind) => PeerMsg::StartPowerRound { by, kind },
            Action::TapPowerRound(kind) => PeerMsg::TapPowerRound { by, kind },
            Action::ClearPowerRound => PeerMsg::ClearPowerRound { by },
            Action::StartWaterfall => PeerMsg::StartWaterfall { by },
            Action::TagQuestion { target } => PeerMsg::QuestionMasterTag { by, target },
            Action::AddKingRule { text } => PeerMsg::KingAddRule { by, text },
            Action::RemoveKingRule { rule_id } => PeerMsg::KingRemoveRule { by, rule_id },
        }
    }

    /// Split a request into its requester and action. `None` for broadcasts.
    pub fn into_request(self) -> Option<(Identity, Action)> {
        Some(match self {
            PeerMsg::State(_) => return None,
            PeerMsg::DrawRequest { by } => (by, Action::Draw),
            PeerMsg::PlayerPatch { by, target, drinks } => {
                (by, Action::PatchPlayer { target, drinks })
            }
            PeerMsg::StartPowerRound { by, kind } => (by, Action::StartPowerRound(kind)),
            PeerMsg::TapPowerRound { by, kind } => (by, Action::TapPowerRound(kind)),
            PeerMsg::ClearPowerRound { by } => (by, Action::ClearPowerRound),
            PeerMsg::StartWaterfall { by } => (by, Action::StartWaterfall),
            PeerMsg::QuestionMasterTag { by, target } => (by, Action::TagQuestion { target }),
            PeerMsg::KingAddRule { by, text } => (by, Action::AddKingRule { text }),
            PeerMsg::KingRemoveRule { by, rule_id } => (by, Action::RemoveKingRule { rule_id }),
        })
    }
}
