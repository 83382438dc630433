//! King's rules: persistent table rules that survive until removed.

use kings_shared::{CanonicalState, Identity, KingRule};

use super::engine::Rejected;
use super::TableRules;

/// The King adds a rule. Text is trimmed and clipped to the configured
/// length; past the configured count the oldest rule falls off.
pub fn add_rule(
    state: &mut CanonicalState,
    by: &Identity,
    text: &str,
    rules: &TableRules,
    now: u64,
) -> Result<(), Rejected> {
    if state.holders.king.as_ref() != Some(by) {
        return Err(Rejected::NotKing(by.clone()));
    }
    let text: String = text.trim().chars().take(rules.max_rule_len).collect();
    if text.is_empty() {
        return Err(Rejected::EmptyRule);
    }

    let id = state.next_rule_id;
    state.next_rule_id += 1;
    state.king_rules.push(KingRule {
        id,
        text,
        author: by.clone(),
        created_at: now,
    });
    if state.king_rules.len() > rules.max_king_rules {
        let excess = state.king_rules.len() - rules.max_king_rules;
        state.king_rules.drain(..excess);
    }
    tracing::info!(id, author = %by, total = state.king_rules.len(), "king rule added");
    Ok(())
}

/// Remove a rule by id. Its author or the host may do so.
pub fn remove_rule(state: &mut CanonicalState, by: &Identity, id: u64) -> Result<(), Rejected> {
    let idx = state
        .king_rules
        .iter()
        .position(|r| r.id == id)
        .ok_or(Rejected::UnknownRule(id))?;
    if &state.king_rules[idx].author != by && !state.is_host(by) {
        return Err(Rejected::NotRuleOwner(by.clone()));
    }
    state.king_rules.remove(idx);
    tracing::info!(id, by = %by, "king rule removed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> CanonicalState {
        let mut s = CanonicalState {
            host: Some("host".into()),
            ..CanonicalState::default()
        };
        s.holders.king = Some("k".into());
        s
    }

    #[test]
    fn text_is_trimmed_and_clipped() {
        let mut s = table();
        let rules = TableRules {
            max_rule_len: 5,
            ..TableRules::default()
        };
        add_rule(&mut s, &"k".into(), "   no swearing  ", &rules, 7).unwrap();
        assert_eq!(s.king_rules[0].text, "no sw");
        assert_eq!(s.king_rules[0].created_at, 7);
        assert_eq!(
            add_rule(&mut s, &"k".into(), "   ", &rules, 8),
            Err(Rejected::EmptyRule)
        );
        assert_eq!(
            add_rule(&mut s, &"host".into(), "x", &rules, 8),
            Err(Rejected::NotKing("host".into()))
        );
    }

    #[test]
    fn oldest_rule_is_evicted_and_ids_stay_unique() {
        let mut s = table();
        let rules = TableRules {
            max_king_rules: 2,
            ..TableRules::default()
        };
        for text in ["one", "two", "three"] {
            add_rule(&mut s, &"k".into(), text, &rules, 0).unwrap();
        }
        let texts: Vec<_> = s.king_rules.iter().map(|r| r.text.as_str()).collect();
        assert_eq!(texts, ["two", "three"]);
        let ids: Vec<_> = s.king_rules.iter().map(|r| r.id).collect();
        assert_eq!(ids, [1, 2]);
    }

    #[test]
    fn author_or_host_removes() {
        let mut s = table();
        let rules = TableRules::default();
        add_rule(&mut s, &"k".into(), "a", &rules, 0).unwrap();
        add_rule(&mut s, &"k".into(), "b", &rules, 0).unwrap();
        assert_eq!(
            remove_rule(&mut s, &"x".into(), 0),
            Err(Rejected::NotRuleOwner("x".into()))
        );
        remove_rule(&mut s, &"k".into(), 0).unwrap();
        remove_rule(&mut s, &"host".into(), 1).unwrap();
        assert!(s.king_rules.is_empty());
        assert_eq!(remove_rule(&mut s, &"k".into(), 1), Err(Rejected::UnknownRule(1)));
    }
}
