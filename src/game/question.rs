//! Question Master: the Queen's holder catches players who answer a question.

use kings_shared::{CanonicalState, Identity, QuestionTag};

use super::engine::Rejected;

pub fn tag(
    state: &mut CanonicalState,
    by: &Identity,
    target: &Identity,
    now: u64,
) -> Result<(), Rejected> {
    if state.holders.question_master.as_ref() != Some(by) {
        return Err(Rejected::NotQuestionMaster(by.clone()));
    }
    if by == target {
        return Err(Rejected::SelfTag);
    }
    let record = state
        .players
        .get_mut(target)
        .ok_or_else(|| Rejected::UnknownPlayer(target.clone()))?;
    record.caught += 1;
    tracing::info!(by = %by, target = %target, caught = record.caught, "question master tag");
    state.question_master_tag = Some(QuestionTag {
        by: by.clone(),
        target: target.clone(),
        at: now,
    });
    Ok(())
}
