//! Heaven / Thumbmaster rounds: the last identity to tap loses.
//!
//! idle -> active (eligible fixed, no taps) -> resolved (loser known) -> idle on clear.
//! Only the host's receipt order of taps matters, so no clock sync is needed.

use kings_shared::{CanonicalState, Identity, PowerKind, PowerRound};

use super::engine::Rejected;
use super::TableRules;

/// Start a round of `kind`. Only the badge holder may start one, and never
/// while any round is still accepting taps. A resolved round is replaced.
pub fn start(
    state: &mut CanonicalState,
    kind: PowerKind,
    by: &Identity,
    rules: &TableRules,
    now: u64,
) -> Result<(), Rejected> {
    if kind == PowerKind::Unknown {
        return Err(Rejected::UnsupportedKind(kind));
    }
    if state.holders.for_kind(kind) != Some(by) {
        return Err(Rejected::NotHolder {
            who: by.clone(),
            kind,
        });
    }
    if state.active_round().is_some() {
        return Err(Rejected::RoundInProgress);
    }

    let mut eligible = super::turn::turn_order(state, rules);
    if !eligible.contains(by) {
        eligible.push(by.clone());
    }
    tracing::info!(kind = kind.label(), starter = %by, players = eligible.len(), "power round started");
    state.power_round = Some(PowerRound {
        kind,
        starter: by.clone(),
        eligible,
        tapped: Vec::new(),
        active: true,
        loser: None,
        started_at: now,
    });
    Ok(())
}

/// Record a tap. The tap that completes the ledger resolves the round.
pub fn tap(state: &mut CanonicalState, kind: PowerKind, by: &Identity) -> Result<(), Rejected> {
    let round = match state.power_round.as_mut() {
        Some(r) if r.active && r.kind == kind => r,
        _ => return Err(Rejected::NoActiveRound),
    };
    if !round.eligible.contains(by) {
        return Err(Rejected::NotEligible(by.clone()));
    }
    if round.tapped.contains(by) {
        return Err(Rejected::AlreadyTapped(by.clone()));
    }
    round.tapped.push(by.clone());
    resolve_if_complete(round);
    Ok(())
}

/// Discard the round, active or resolved. Host or the kind's holder only.
pub fn clear(state: &mut CanonicalState, by: &Identity) -> Result<(), Rejected> {
    let round = state.power_round.as_ref().ok_or(Rejected::NoActiveRound)?;
    let permitted = state.is_host(by) || state.holders.for_kind(round.kind) == Some(by);
    if !permitted {
        return Err(Rejected::NotClearer(by.clone()));
    }
    state.power_round = None;
    Ok(())
}

/// Drop a departed identity from an active round. Removing them may
/// complete the ledger, in which case the round resolves immediately.
pub(crate) fn forget(state: &mut CanonicalState, who: &Identity) -> bool {
    let Some(round) = state.power_round.as_mut().filter(|r| r.active) else {
        return false;
    };
    let before = (round.eligible.len(), round.tapped.len());
    round.eligible.retain(|p| p != who);
    round.tapped.retain(|p| p != who);
    if before == (round.eligible.len(), round.tapped.len()) {
        return false;
    }
    resolve_if_complete(round);
    true
}

fn resolve_if_complete(round: &mut PowerRound) {
    if round.tapped.len() >= round.eligible.len() {
        round.active = false;
        round.loser = round.tapped.last().cloned();
        tracing::info!(kind = round.kind.label(), loser = ?round.loser, "power round resolved");
    }
}
