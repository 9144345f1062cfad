//! Same-course and cross-course exclusivity rows.
use super::model_context::{LinearConstraint, ModelBuilderContext};
use tracing::{debug, warn};

/// At most one section of each course.
pub fn add_course_constraints(ctx: &mut ModelBuilderContext<'_>) {
    let rows: Vec<LinearConstraint> = ctx
        .course_index
        .iter()
        .map(|(course, members)| {
            LinearConstraint::at_most_one(format!("OneSectionPerCourse_{course}"), members.iter().copied())
        })
        .collect();
    debug!(rows = rows.len(), "same-course rows");
    for row in rows {
        ctx.model.push(row);
    }
}

/// At most one section across all courses of each declared exclusivity group.
///
/// A group with no matching sections this term adds nothing.
pub fn add_exclusivity_constraints(ctx: &mut ModelBuilderContext<'_>) {
    for group in &ctx.params.exclusivity_groups {
        let mut members: Vec<usize> = group
            .courses()
            .iter()
            .filter_map(|course| ctx.course_index.get(course.as_str()))
            .flatten()
            .copied()
            .collect();
        members.sort_unstable();
        members.dedup();

        if members.is_empty() {
            warn!(group = ?group.courses(), "exclusivity group matches no sections; skipped");
            continue;
        }
        let name = format!("Exclusive_{}", group.courses().join("_"));
        ctx.model.push(LinearConstraint::at_most_one(name, members));
    }
}
