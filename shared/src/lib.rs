//! Shared data model and wire schema for KAD-Kings peers.

pub mod cards;
pub mod codec;
pub mod game;
pub mod messages;
pub mod player;
pub mod relay;

pub use cards::{Card, CardRank, CardSuit, DECK_SIZE};
pub use codec::{decode, encode, CodecError, Decoded};
pub use game::{
    CanonicalState, Holders, KingRule, PowerKind, PowerRound, QuestionTag, Waterfall,
    WaterfallPhase,
};
pub use messages::{Action, PeerMsg};
pub use player::{Identity, PlayerRecord};
pub use relay::{RelayClientMsg, RelayServerMsg, TokenGrant, TokenRefusal};
