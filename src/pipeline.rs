//! One request-scoped build, solve and assemble cycle.
use crate::config::MatchParams;
use crate::error::{CourseMatchError, Result};
use crate::model;
use crate::result::{Schedule, assemble};
use crate::section::Section;
use crate::solver::{SolveStatus, Solver};
use serde::Serialize;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchOutcome {
    /// Raw solver status, kept for diagnostic display.
    pub status: SolveStatus,
    pub objective: f64,
    pub schedule: Schedule,
}

/// Select the best schedule for `params` from `sections`.
///
/// Blocks until the solver returns. Every call builds its own model; nothing
/// is shared between calls.
pub fn optimize(sections: &[Section], params: &MatchParams, solver: &dyn Solver) -> Result<MatchOutcome> {
    let model = model::build(sections, params)?;

    info!(solver = solver.name(), "solving");
    let result = solver.solve(&model)?;
    match result.status {
        SolveStatus::Optimal | SolveStatus::Feasible => {}
        SolveStatus::Infeasible => {
            return Err(CourseMatchError::InfeasibleModel { status: result.status });
        }
        SolveStatus::Unbounded | SolveStatus::NotSolved => {
            return Err(CourseMatchError::SolverUnavailable(format!(
                "{} returned without a solution (status: {})",
                solver.name(),
                result.status
            )));
        }
    }

    let broken = model.violations(&result.assignment);
    if !broken.is_empty() {
        warn!(rows = ?broken, "solver assignment violates model rows");
    }

    let objective = model.objective_value(&result.assignment);
    let schedule = assemble(sections, &result.assignment);
    let totals = schedule.totals();
    info!(
        status = %result.status,
        selected = schedule.selected.len(),
        price = totals.price,
        credits = totals.credits,
        weighted_utility = totals.weighted_utility,
        "schedule assembled"
    );

    Ok(MatchOutcome {
        status: result.status,
        objective,
        schedule,
    })
}
