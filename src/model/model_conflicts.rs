//! Timetable conflict rows, delegated to the chosen [`ConflictStrategy`](crate::conflict::ConflictStrategy).
use super::model_context::{LinearConstraint, ModelBuilderContext};
use tracing::debug;

pub fn add_conflict_constraints(ctx: &mut ModelBuilderContext<'_>) {
    let sets = ctx.strategy.conflict_sets(ctx.sections);
    debug!(strategy = ctx.strategy.name(), rows = sets.len(), "conflict rows");
    for set in sets {
        ctx.model.push(LinearConstraint::at_most_one(set.label, set.members));
    }
}
