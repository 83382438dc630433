//! Deck construction and the draw transition.

use std::collections::VecDeque;

use kings_shared::{CanonicalState, Card, CardRank, Identity, Waterfall};
use rand::seq::SliceRandom;
use rand::Rng;

use super::engine::{Ctx, Rejected};

/// A freshly shuffled 52-card deck (Fisher-Yates via `SliceRandom`).
pub fn shuffled_deck<R: Rng + ?Sized>(rng: &mut R) -> VecDeque<Card> {
    let mut deck: Vec<Card> = Card::all().collect();
    deck.shuffle(rng);
    VecDeque::from(deck)
}

/// Pop the next card for `by` and apply its rank's side effects.
///
/// An empty deck is rebuilt and reshuffled first, so the table never runs
/// out. Drawing is refused while the deck is locked.
pub fn draw<R: Rng>(
    state: &mut CanonicalState,
    by: &Identity,
    ctx: &mut Ctx<'_, R>,
) -> Result<Card, Rejected> {
    if state.deck_locked {
        return Err(Rejected::DeckLocked);
    }
    if !state.is_present(by) {
        return Err(Rejected::UnknownPlayer(by.clone()));
    }
    if state.deck.is_empty() {
        tracing::debug!("deck exhausted, reshuffling");
        state.deck = shuffled_deck(&mut *ctx.rng);
    }
    let card = state.deck.pop_front().ok_or(Rejected::EmptyDeck)?;

    state.current_card = Some(card);
    state.last_drawer = Some(by.clone());
    if let Some(record) = state.players.get_mut(by) {
        record.cards_drawn += 1;
    }

    match card.rank() {
        CardRank::Seven => state.holders.heaven = Some(by.clone()),
        CardRank::Jack => state.holders.thumbmaster = Some(by.clone()),
        CardRank::Queen => state.holders.question_master = Some(by.clone()),
        CardRank::King => state.holders.king = Some(by.clone()),
        _ => {}
    }

    if card.rank() == CardRank::Ace {
        let duration = ctx.rng.random_range(ctx.rules.waterfall_range());
        state.waterfall = Some(Waterfall::pending(by.clone(), duration));
        state.deck_locked = true;
        // Turn stays with the drawer until the Waterfall finishes.
        state.turn = Some(by.clone());
    } else {
        state.turn = super::turn::advance(state, by, ctx.rules);
    }

    tracing::info!(player = %by, card = %card, remaining = state.deck.len(), "drew card");
    Ok(card)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{engine, TableRules};
    use kings_shared::{Action, CardSuit, PlayerRecord, WaterfallPhase};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn table(names: &[&str]) -> CanonicalState {
        let mut s = CanonicalState {
            host: Some(names[0].into()),
            turn: Some(names[0].into()),
            ..CanonicalState::default()
        };
        for n in names {
            s.players.insert((*n).into(), PlayerRecord::default());
        }
        s
    }

    fn stack(s: &mut CanonicalState, cards: &[Card]) {
        s.deck = cards.iter().copied().collect();
    }

    fn draw_as(s: &mut CanonicalState, who: &str, seed: u64) -> Result<(), Rejected> {
        let rules = TableRules::default();
        let mut rng = StdRng::seed_from_u64(seed);
        let mut ctx = Ctx {
            rules: &rules,
            rng: &mut rng,
            now: 1_000,
        };
        engine::apply(s, &who.into(), &Action::Draw, &mut ctx)
    }

    #[test]
    fn empty_deck_is_rebuilt_before_the_pop() {
        let mut s = table(&["ann", "bo"]);
        assert!(s.deck.is_empty());
        draw_as(&mut s, "ann", 1).unwrap();
        assert_eq!(s.deck.len(), 51);
        let drawn = s.current_card.unwrap();
        assert!(!s.deck.contains(&drawn));
        assert_eq!(s.players[&Identity::from("ann")].cards_drawn, 1);
        assert_eq!(s.last_drawer, Some("ann".into()));
    }

    #[test]
    fn plain_card_advances_turn() {
        let mut s = table(&["ann", "bo", "cy"]);
        stack(&mut s, &[Card::new(CardRank::Five, CardSuit::Clubs)]);
        draw_as(&mut s, "ann", 1).unwrap();
        assert_eq!(s.turn, Some("bo".into()));
        assert!(!s.deck_locked);
    }

    #[test]
    fn badge_ranks_overwrite_their_holder() {
        let mut s = table(&["ann", "bo"]);
        stack(
            &mut s,
            &[
                Card::new(CardRank::Seven, CardSuit::Hearts),
                Card::new(CardRank::Seven, CardSuit::Spades),
                Card::new(CardRank::Jack, CardSuit::Clubs),
                Card::new(CardRank::Queen, CardSuit::Clubs),
                Card::new(CardRank::King, CardSuit::Clubs),
            ],
        );
        draw_as(&mut s, "ann", 1).unwrap();
        assert_eq!(s.holders.heaven, Some("ann".into()));
        draw_as(&mut s, "bo", 1).unwrap();
        assert_eq!(s.holders.heaven, Some("bo".into()));
        draw_as(&mut s, "ann", 1).unwrap();
        draw_as(&mut s, "bo", 1).unwrap();
        draw_as(&mut s, "ann", 1).unwrap();
        assert_eq!(s.holders.thumbmaster, Some("ann".into()));
        assert_eq!(s.holders.question_master, Some("bo".into()));
        assert_eq!(s.holders.king, Some("ann".into()));
        assert!(!s.deck_locked);
    }

    #[test]
    fn ace_starts_a_pending_waterfall_and_pins_the_turn() {
        for seed in 0..20 {
            let mut s = table(&["ann", "bo"]);
            s.turn = Some("bo".into());
            stack(&mut s, &[Card::new(CardRank::Ace, CardSuit::Diamonds)]);
            draw_as(&mut s, "bo", seed).unwrap();
            let w = s.waterfall.as_ref().unwrap();
            assert_eq!(w.phase, WaterfallPhase::Pending);
            assert_eq!(w.drawer, Identity::from("bo"));
            assert!((5..=20).contains(&w.duration_sec));
            assert!(s.deck_locked);
            assert_eq!(s.turn, Some("bo".into()));
        }
    }

    #[test]
    fn locked_deck_refuses_draws() {
        let mut s = table(&["ann", "bo"]);
        stack(&mut s, &[Card::new(CardRank::Ace, CardSuit::Clubs)]);
        draw_as(&mut s, "ann", 1).unwrap();
        let before = s.clone();
        assert_eq!(draw_as(&mut s, "bo", 1), Err(Rejected::DeckLocked));
        assert_eq!(s, before);
    }

    #[test]
    fn strangers_cannot_draw() {
        let mut s = table(&["ann"]);
        assert_eq!(
            draw_as(&mut s, "mallory", 1),
            Err(Rejected::UnknownPlayer("mallory".into()))
        );
    }
}
