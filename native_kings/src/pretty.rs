use kad_kings::Dispatch;
use kings_shared::{CanonicalState, Card, Identity, WaterfallPhase};
use owo_colors::OwoColorize;

/// What a badge lets its holder do, shown next to the rank.
fn rank_rule(card: Card) -> &'static str {
    use kings_shared::CardRank::*;
    match card.rank() {
        Ace => "Waterfall",
        Two => "You",
        Three => "Me",
        Four => "Floor",
        Five => "Guys",
        Six => "Chicks",
        Seven => "Heaven",
        Eight => "Mate",
        Nine => "Rhyme",
        Ten => "Categories",
        Jack => "Thumbmaster",
        Queen => "Question Master",
        King => "King's rule",
    }
}

pub fn format_card(card: Card, color: bool) -> String {
    let text = format!(
        "{} ({} of {})",
        card,
        card.rank().name(),
        card.suit().name()
    );
    if color && card.is_red() {
        text.red().to_string()
    } else {
        text
    }
}

fn name(who: &Identity, me: &Identity, color: bool) -> String {
    if who == me && color {
        who.bold().to_string()
    } else if who == me {
        format!("{who} (you)")
    } else {
        who.to_string()
    }
}

fn badge(label: &str, color: bool) -> String {
    if color {
        format!("[{}]", label.yellow())
    } else {
        format!("[{label}]")
    }
}

/// Multi-line rendering of the table as `me` sees it at `now`.
pub fn format_table(state: &CanonicalState, me: &Identity, now: u64, color: bool) -> String {
    let mut out = Vec::new();
    let host = state
        .host
        .as_ref()
        .map(|h| name(h, me, color))
        .unwrap_or_else(|| "nobody".into());
    let header = format!("=== KAD-Kings  host: {host}  rev {} ===", state.revision);
    out.push(if color {
        header.bold().cyan().to_string()
    } else {
        header
    });

    let card = state
        .current_card
        .map(|c| format!("{}  {}", format_card(c, color), rank_rule(c)))
        .unwrap_or_else(|| "-".into());
    out.push(format!("Card:   {card}"));
    let deck = if state.deck_locked {
        let locked = format!("{} left, locked", state.deck.len());
        if color {
            locked.red().to_string()
        } else {
            locked
        }
    } else {
        format!("{} left", state.deck.len())
    };
    out.push(format!("Deck:   {deck}"));

    for (who, record) in &state.players {
        let mut line = format!(
            "  {} {:<16} drinks {:>2}  cards {:>2}  caught {:>2}",
            if state.turn.as_ref() == Some(who) { "▶" } else { " " },
            name(who, me, color),
            record.drinks,
            record.cards_drawn,
            record.caught
        );
        let h = &state.holders;
        for (slot, label) in [
            (&h.heaven, "7 Heaven"),
            (&h.thumbmaster, "J Thumb"),
            (&h.question_master, "Q Question"),
            (&h.king, "K King"),
        ] {
            if slot.as_ref() == Some(who) {
                line.push(' ');
                line.push_str(&badge(label, color));
            }
        }
        out.push(line);
    }

    if let Some(r) = &state.power_round {
        let status = if r.active {
            format!(
                "{} round by {}: {}/{} tapped",
                r.kind.label(),
                r.starter,
                r.tapped.len(),
                r.eligible.len()
            )
        } else {
            let loser = r
                .loser
                .as_ref()
                .map(|l| name(l, me, color))
                .unwrap_or_else(|| "nobody".into());
            format!("{} round over, {} drinks", r.kind.label(), loser)
        };
        out.push(format!("Round:  {status}"));
    }

    if let Some(w) = &state.waterfall {
        let status = match (w.phase, w.ends_at) {
            (WaterfallPhase::Active, Some(end)) => {
                let left = end.saturating_sub(now).div_ceil(1000);
                format!("{} is pouring, {}s left", w.drawer, left)
            }
            _ => format!("{} to start a {}s Waterfall", w.drawer, w.duration_sec),
        };
        out.push(format!("Water:  {status}"));
    }

    if let Some(tag) = &state.question_master_tag {
        out.push(format!("Caught: {} by {}", tag.target, tag.by));
    }

    if !state.king_rules.is_empty() {
        out.push("Rules:".into());
        for rule in &state.king_rules {
            out.push(format!("  #{} {} ({})", rule.id, rule.text, rule.author));
        }
    }
    out.join("\n")
}

pub fn format_dispatch(d: &Dispatch, color: bool) -> String {
    let text = match d {
        Dispatch::Applied => "applied".to_string(),
        Dispatch::Requested => "sent to host".to_string(),
        Dispatch::Rejected(reason) => format!("rejected: {reason}"),
        Dispatch::Offline => "offline".to_string(),
    };
    match (d, color) {
        (Dispatch::Rejected(_) | Dispatch::Offline, true) => text.red().to_string(),
        (_, true) => text.green().to_string(),
        _ => text,
    }
}
