//! JSON codec for [`PeerMsg`] payloads carried over the data channel.
//!
//! Decoding never fails loudly: a payload is either a message, an
//! unrecognised-but-well-formed message (ignored for forward compatibility)
//! or malformed (dropped).

use serde_json::Value;

use crate::messages::PeerMsg;

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("failed to encode message: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Result of decoding an inbound payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decoded {
    Msg(PeerMsg),
    /// A JSON object whose `type` tag this version does not know.
    Unknown(String),
    Malformed(String),
}

pub fn encode(msg: &PeerMsg) -> Result<Vec<u8>, CodecError> {
    Ok(serde_json::to_vec(msg)?)
}

pub fn decode(bytes: &[u8]) -> Decoded {
    let value: Value = match serde_json::from_slice(bytes) {
        Ok(v) => v,
        Err(e) => return Decoded::Malformed(format!("not JSON: {e}")),
    };
    let tag = match value.get("type").and_then(Value::as_str) {
        Some(t) => t.to_string(),
        None => return Decoded::Malformed("missing string `type` tag".into()),
    };
    if !PeerMsg::KNOWN_TYPES.contains(&tag.as_str()) {
        return Decoded::Unknown(tag);
    }
    match serde_json::from_value::<PeerMsg>(value) {
        Ok(msg) => Decoded::Msg(msg),
        Err(e) => Decoded::Malformed(format!("invalid `{tag}` message: {e}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{Card, CardRank, CardSuit};
    use crate::game::{CanonicalState, PowerKind, Waterfall};
    use crate::player::{Identity, PlayerRecord};

    fn sample_state() -> CanonicalState {
        let ann = Identity::from("ann");
        let mut s = CanonicalState {
            host: Some(ann.clone()),
            turn: Some(ann.clone()),
            current_card: Some(Card::new(CardRank::Ace, CardSuit::Spades)),
            waterfall: Some(Waterfall::pending(ann.clone(), 12)),
            deck_locked: true,
            revision: 7,
            ..CanonicalState::default()
        };
        s.deck.extend(Card::all().take(5));
        s.players.insert(
            ann,
            PlayerRecord {
                drinks: 2,
                cards_drawn: 1,
                caught: 0,
            },
        );
        s
    }

    #[test]
    fn every_variant_survives_a_round_trip() {
        let by = Identity::from("bo");
        let messages = vec![
            PeerMsg::State(Box::new(sample_state())),
            PeerMsg::DrawRequest { by: by.clone() },
            PeerMsg::PlayerPatch {
                by: by.clone(),
                target: Identity::from("ann"),
                drinks: Some(4),
            },
            PeerMsg::StartPowerRound {
                by: by.clone(),
                kind: PowerKind::Heaven,
            },
            PeerMsg::TapPowerRound {
                by: by.clone(),
                kind: PowerKind::Thumbmaster,
            },
            PeerMsg::ClearPowerRound { by: by.clone() },
            PeerMsg::StartWaterfall { by: by.clone() },
            PeerMsg::QuestionMasterTag {
                by: by.clone(),
                target: Identity::from("ann"),
            },
            PeerMsg::KingAddRule {
                by: by.clone(),
                text: "drink with your left hand".into(),
            },
            PeerMsg::KingRemoveRule { by, rule_id: 9 },
        ];
        for msg in messages {
            let bytes = encode(&msg).unwrap();
            assert_eq!(decode(&bytes), Decoded::Msg(msg));
        }
    }

    #[test]
    fn wire_format_uses_type_tag() {
        let bytes = encode(&PeerMsg::DrawRequest { by: "bo".into() }).unwrap();
        let v: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(v["type"], "draw_request");
        assert_eq!(v["data"]["by"], "bo");
    }

    #[test]
    fn unknown_tags_are_reported_not_rejected() {
        let got = decode(br#"{"type":"mirror_round_start","data":{"by":"bo"}}"#);
        assert_eq!(got, Decoded::Unknown("mirror_round_start".into()));
    }

    #[test]
    fn garbage_is_malformed() {
        assert!(matches!(decode(b"\xff\xfe not json"), Decoded::Malformed(_)));
        assert!(matches!(decode(b"[1,2,3]"), Decoded::Malformed(_)));
        assert!(matches!(decode(br#"{"type":7}"#), Decoded::Malformed(_)));
        assert!(matches!(
            decode(br#"{"type":"draw_request","data":{}}"#),
            Decoded::Malformed(_)
        ));
    }

    #[test]
    fn missing_optional_fields_take_defaults() {
        let got = decode(br#"{"type":"player_patch","data":{"by":"bo","target":"bo","extra":1}}"#);
        assert_eq!(
            got,
            Decoded::Msg(PeerMsg::PlayerPatch {
                by: "bo".into(),
                target: "bo".into(),
                drinks: None,
            })
        );
    }
}
