//! Ace-triggered Waterfall: pending -> active -> cleared.
//!
//! Completion is recomputed from absolute timestamps on every tick instead of
//! relying on a single timer firing, so a throttled or suspended host still
//! finishes the Waterfall on its next wake-up.

use kings_shared::{CanonicalState, Identity, WaterfallPhase};

use super::engine::Rejected;
use super::TableRules;

/// The drawer starts their pending Waterfall's clock.
pub fn start(state: &mut CanonicalState, by: &Identity, now: u64) -> Result<(), Rejected> {
    let w = state
        .waterfall
        .as_mut()
        .filter(|w| w.phase == WaterfallPhase::Pending)
        .ok_or(Rejected::NoPendingWaterfall)?;
    if &w.drawer != by {
        return Err(Rejected::NotDrawer(by.clone()));
    }
    w.phase = WaterfallPhase::Active;
    w.started_at = Some(now);
    w.ends_at = Some(now + u64::from(w.duration_sec) * 1000);
    tracing::info!(drawer = %by, secs = w.duration_sec, "waterfall started");
    Ok(())
}

/// Clear an active Waterfall whose time is up, unlock the deck and only now
/// move the turn past the drawer.
pub(crate) fn complete_if_due(state: &mut CanonicalState, rules: &TableRules, now: u64) -> bool {
    let drawer = match &state.waterfall {
        Some(w) if w.is_finished(now) => w.drawer.clone(),
        _ => return false,
    };
    tracing::info!(drawer = %drawer, "waterfall finished");
    release(state, &drawer, rules);
    true
}

/// The drawer left: clear the Waterfall at once so the table is not stuck.
pub(crate) fn forget(state: &mut CanonicalState, who: &Identity, rules: &TableRules) -> bool {
    if state.waterfall.as_ref().map(|w| &w.drawer) != Some(who) {
        return false;
    }
    tracing::info!(drawer = %who, "waterfall drawer left, clearing");
    release(state, who, rules);
    true
}

fn release(state: &mut CanonicalState, drawer: &Identity, rules: &TableRules) {
    state.waterfall = None;
    super::engine::refresh_deck_lock(state, rules);
    if state.turn.is_none() || state.turn.as_ref() == Some(drawer) {
        state.turn = super::turn::advance(state, drawer, rules);
    }
}
