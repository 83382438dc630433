//! Turn order and rotation.

use kings_shared::{CanonicalState, Identity};

use super::TableRules;

/// Host first (when seated), then every other player sorted
/// lexicographically, capped at the table's seat count.
pub fn turn_order(state: &CanonicalState, rules: &TableRules) -> Vec<Identity> {
    // A table always has at least one seat.
    let seats = rules.max_seats.max(1);
    let mut order = Vec::with_capacity(state.players.len().min(seats));
    if let Some(host) = state.host.as_ref().filter(|h| state.is_present(h)) {
        order.push(host.clone());
    }
    // BTreeMap keys are already in lexicographic order.
    order.extend(
        state
            .players
            .keys()
            .filter(|p| state.host.as_ref() != Some(*p))
            .cloned(),
    );
    order.truncate(seats);
    order
}

/// The player after `from`, wrapping around. A `from` that is not seated
/// restarts rotation at the first seat. `None` only for an empty table.
pub fn advance(state: &CanonicalState, from: &Identity, rules: &TableRules) -> Option<Identity> {
    next_in(&turn_order(state, rules), from)
}

pub(crate) fn next_in(order: &[Identity], from: &Identity) -> Option<Identity> {
    match order.iter().position(|p| p == from) {
        Some(i) => order.get((i + 1) % order.len()).cloned(),
        None => order.first().cloned(),
    }
}

/// Keep `turn` pointing at a present player: repair a stale pointer to the
/// first seat, or seat someone when the table has players but no turn.
pub(crate) fn repair(state: &mut CanonicalState, rules: &TableRules) {
    let valid = state.turn.as_ref().is_some_and(|t| state.is_present(t));
    if !valid {
        state.turn = turn_order(state, rules).into_iter().next();
    }
}
