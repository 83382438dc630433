//! Host-side game rules for the KAD-Kings table.
//!
//! Everything in here operates on a [`CanonicalState`](kings_shared::CanonicalState)
//! working copy and is only ever run by the current host. Guests render the
//! snapshots the host broadcasts and never evaluate these rules themselves.

pub mod deck;
pub mod engine;
pub mod king;
pub mod players;
pub mod power;
pub mod presence;
pub mod question;
pub mod rules;
pub mod turn;
pub mod waterfall;

pub use engine::{apply, settle, Ctx, Rejected};
pub use presence::{join, leave, new_table};
pub use rules::{HostMigration, TableRules};
pub use turn::{advance, turn_order};
