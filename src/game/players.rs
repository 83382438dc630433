//! Manual per-player stat edits.

use kings_shared::{CanonicalState, Identity};

use super::engine::Rejected;

/// Set `target`'s drink counter. Players may edit themselves; the host may
/// edit anyone. A patch without fields is accepted and changes nothing.
pub fn patch(
    state: &mut CanonicalState,
    by: &Identity,
    target: &Identity,
    drinks: Option<u32>,
) -> Result<(), Rejected> {
    if by != target && !state.is_host(by) {
        return Err(Rejected::NotPatchable {
            who: by.clone(),
            target: target.clone(),
        });
    }
    let record = state
        .players
        .get_mut(target)
        .ok_or_else(|| Rejected::UnknownPlayer(target.clone()))?;
    if let Some(drinks) = drinks {
        tracing::debug!(player = %target, from = record.drinks, to = drinks, "drinks patched");
        record.drinks = drinks;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use kings_shared::PlayerRecord;

    fn table() -> CanonicalState {
        let mut s = CanonicalState {
            host: Some("host".into()),
            ..CanonicalState::default()
        };
        for n in ["host", "a", "b"] {
            s.players.insert(n.into(), PlayerRecord::default());
        }
        s
    }

    #[test]
    fn self_and_host_edits() {
        let mut s = table();
        patch(&mut s, &"a".into(), &"a".into(), Some(3)).unwrap();
        patch(&mut s, &"host".into(), &"b".into(), Some(7)).unwrap();
        assert_eq!(s.players[&Identity::from("a")].drinks, 3);
        assert_eq!(s.players[&Identity::from("b")].drinks, 7);
    }

    #[test]
    fn guests_cannot_edit_each_other() {
        let mut s = table();
        assert_eq!(
            patch(&mut s, &"a".into(), &"b".into(), Some(9)),
            Err(Rejected::NotPatchable {
                who: "a".into(),
                target: "b".into()
            })
        );
        assert_eq!(s.players[&Identity::from("b")].drinks, 0);
    }

    #[test]
    fn absent_target_is_refused() {
        let mut s = table();
        assert_eq!(
            patch(&mut s, &"host".into(), &"ghost".into(), Some(1)),
            Err(Rejected::UnknownPlayer("ghost".into()))
        );
        assert!(!s.players.contains_key(&Identity::from("ghost")));
    }
}
