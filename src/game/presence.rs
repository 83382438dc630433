//! Presence reconciliation: keep the roster, turn, badges and rounds in step
//! with the transport's join/leave events. Host-only.

use kings_shared::{CanonicalState, Identity, PlayerRecord};
use rand::Rng;

use super::{deck, power, turn, waterfall, TableRules};

/// A fresh table with `host` as the only player and a shuffled deck.
pub fn new_table<R: Rng + ?Sized>(host: Identity, rng: &mut R) -> CanonicalState {
    let mut state = CanonicalState {
        deck: deck::shuffled_deck(rng),
        turn: Some(host.clone()),
        ..CanonicalState::default()
    };
    state.players.insert(host.clone(), PlayerRecord::default());
    state.host = Some(host);
    state
}

/// Ensure `who` has a record. Returns whether anything changed.
pub fn join(state: &mut CanonicalState, who: &Identity) -> bool {
    if state.players.contains_key(who) {
        return false;
    }
    state.players.insert(who.clone(), PlayerRecord::default());
    if state.turn.is_none() {
        state.turn = state
            .host
            .clone()
            .filter(|h| state.is_present(h))
            .or_else(|| Some(who.clone()));
    }
    tracing::info!(player = %who, players = state.players.len(), "player joined");
    true
}

/// Remove every trace of `who`. Applying it again for an identity that is
/// already gone changes nothing.
pub fn leave(state: &mut CanonicalState, who: &Identity, rules: &TableRules, now: u64) -> bool {
    let mut changed = false;

    if state.turn.as_ref() == Some(who) {
        // Rotate using the order that still contains the leaver.
        let order = turn::turn_order(state, rules);
        state.turn = turn::next_in(&order, who).filter(|next| next != who);
        changed = true;
    }
    if state.players.remove(who).is_some() {
        tracing::info!(player = %who, players = state.players.len(), "player left");
        changed = true;
    }
    changed |= state.holders.release(who);
    changed |= power::forget(state, who);
    changed |= waterfall::forget(state, who, rules);
    changed |= super::engine::settle(state, rules, now);
    changed
}
