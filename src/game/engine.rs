//! Single entry point for host-side transitions.
//!
//! `apply` mutates a working copy of the snapshot. On `Err` the copy may be
//! half-updated and must be discarded; the store only ever sees the copy
//! after a successful transition.

use kings_shared::{Action, CanonicalState, Identity, PowerKind};
use rand::Rng;

use super::{deck, king, players, power, question, waterfall, TableRules};

/// Why the host refused a request. Never sent back to the requester.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Rejected {
    #[error("{0} is not at the table")]
    UnknownPlayer(Identity),
    #[error("the deck is locked")]
    DeckLocked,
    #[error("no cards could be drawn")]
    EmptyDeck,
    #[error("{who} does not hold the {kind:?} badge")]
    NotHolder { who: Identity, kind: PowerKind },
    #[error("{0:?} rounds cannot be started")]
    UnsupportedKind(PowerKind),
    #[error("a power round is already active")]
    RoundInProgress,
    #[error("no matching power round is active")]
    NoActiveRound,
    #[error("{0} is not eligible for this round")]
    NotEligible(Identity),
    #[error("{0} already tapped")]
    AlreadyTapped(Identity),
    #[error("{0} may not clear this round")]
    NotClearer(Identity),
    #[error("no Waterfall is pending")]
    NoPendingWaterfall,
    #[error("{0} did not draw this Waterfall")]
    NotDrawer(Identity),
    #[error("{0} is not the Question Master")]
    NotQuestionMaster(Identity),
    #[error("the Question Master cannot tag themselves")]
    SelfTag,
    #[error("{0} is not the King")]
    NotKing(Identity),
    #[error("rule text is empty")]
    EmptyRule,
    #[error("no rule with id {0}")]
    UnknownRule(u64),
    #[error("{0} may not remove this rule")]
    NotRuleOwner(Identity),
    #[error("{who} may not change {target}'s stats")]
    NotPatchable { who: Identity, target: Identity },
}

/// Everything a transition may consult besides the snapshot itself.
pub struct Ctx<'a, R: Rng> {
    pub rules: &'a TableRules,
    pub rng: &'a mut R,
    /// Milliseconds since the Unix epoch.
    pub now: u64,
}

/// Validate and apply `action` on behalf of `by`.
///
/// The same checks run whether the action came from the host's own UI or
/// from a guest's request.
pub fn apply<R: Rng>(
    state: &mut CanonicalState,
    by: &Identity,
    action: &Action,
    ctx: &mut Ctx<'_, R>,
) -> Result<(), Rejected> {
    match action {
        Action::Draw => deck::draw(state, by, ctx).map(|_| ()),
        Action::PatchPlayer { target, drinks } => players::patch(state, by, target, *drinks),
        Action::StartPowerRound(kind) => power::start(state, *kind, by, ctx.rules, ctx.now),
        Action::TapPowerRound(kind) => power::tap(state, *kind, by),
        Action::ClearPowerRound => power::clear(state, by),
        Action::StartWaterfall => waterfall::start(state, by, ctx.now),
        Action::TagQuestion { target } => question::tag(state, by, target, ctx.now),
        Action::AddKingRule { text } => king::add_rule(state, by, text, ctx.rules, ctx.now),
        Action::RemoveKingRule { rule_id } => king::remove_rule(state, by, *rule_id),
    }?;
    settle(state, ctx.rules, ctx.now);
    Ok(())
}

/// Re-derive everything that depends on the clock or on policy: finish an
/// expired Waterfall, recompute the deck lock and repair the turn pointer.
///
/// Safe to call at any time and any number of times. Returns whether the
/// state changed.
pub fn settle(state: &mut CanonicalState, rules: &TableRules, now: u64) -> bool {
    let before_lock = state.deck_locked;
    let before_turn = state.turn.clone();
    let finished = waterfall::complete_if_due(state, rules, now);
    refresh_deck_lock(state, rules);
    super::turn::repair(state, rules);
    finished || before_lock != state.deck_locked || before_turn != state.turn
}

/// The deck is locked exactly while a Waterfall exists, or, under the
/// optional policy, while a power round accepts taps.
pub fn refresh_deck_lock(state: &mut CanonicalState, rules: &TableRules) {
    state.deck_locked = state.waterfall.is_some()
        || (rules.lock_deck_on_power_rounds && state.active_round().is_some());
}
