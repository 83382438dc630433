//! Frames spoken between a peer and the development room relay.
//!
//! Game payloads are opaque to the relay and travel hex-encoded.

use serde::{Deserialize, Serialize};

use crate::player::Identity;

/// Response body of the relay's token endpoint.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenGrant {
    pub token: String,
    /// WebSocket endpoint the token is valid for.
    pub url: String,
}

/// Error body returned by the token endpoint.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenRefusal {
    pub error: String,
}

/// Messages the relay sends to a connected peer.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum RelayServerMsg {
    Welcome {
        you: Identity,
        room: String,
        /// Members already present when `you` joined.
        peers: Vec<Identity>,
    },
    PeerJoined(Identity),
    PeerLeft(Identity),
    Data {
        from: Identity,
        payload: String,
    },
    Error(String),
}

/// Messages a peer sends to the relay.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum RelayClientMsg {
    /// Deliver `payload` to every other member of the room, in order.
    Publish { payload: String },
}
