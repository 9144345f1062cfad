//! Objective plus the budget and credit-limit rows.
use super::model_context::{LinearConstraint, ModelBuilderContext};
use tracing::debug;

/// Maximise Σ utility·credits·x, so a preferred course counts in proportion to its credit weight.
pub fn add_objective(ctx: &mut ModelBuilderContext<'_>) {
    let coefficients: Vec<f64> = ctx.sections.iter().map(|s| s.weighted_utility()).collect();
    let zero = coefficients.iter().filter(|c| **c == 0.0).count();
    ctx.model.set_objective(coefficients);
    if zero > 0 {
        // Still eligible, they just add nothing to the objective.
        debug!(zero_weight_sections = zero, "sections with zero weighted utility");
    }
}

/// Σ price·x <= budget.
pub fn add_budget_constraint(ctx: &mut ModelBuilderContext<'_>) {
    let terms = ctx.weighted_terms(|s| s.price);
    ctx.model.push(LinearConstraint {
        name: "BudgetConstraint".to_string(),
        terms,
        rhs: ctx.params.budget,
    });
}

/// Σ credits·x <= credit limit.
pub fn add_credit_limit_constraint(ctx: &mut ModelBuilderContext<'_>) {
    let terms = ctx.weighted_terms(|s| s.credits);
    ctx.model.push(LinearConstraint {
        name: "CreditLimitConstraint".to_string(),
        terms,
        rhs: ctx.params.credit_limit,
    });
}
