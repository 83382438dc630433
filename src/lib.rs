//! KAD-Kings - host-authoritative table state for a browser drinking game
//!
//! One peer in a room is the host and owns the only writable copy of the
//! table. It validates every action, applies it and broadcasts a full
//! snapshot; every other peer mirrors that snapshot and sends requests.
//!
//! The same core runs natively (see the `native_kings` crate) and in the
//! browser through the bindings in `web`.

pub mod credentials;
pub mod game;
pub mod peer;
pub mod store;
pub mod transport;
pub mod utils;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use credentials::{fetch_credential, Credential, JoinError};
pub use game::{Rejected, TableRules};
pub use peer::{Dispatch, Peer};
pub use store::Store;
pub use transport::{Transport, TransportError, TransportEvent};

pub use kings_shared as shared;
