//! Terminal failures of one build-solve-assemble cycle.
use crate::solver::SolveStatus;
use thiserror::Error;

/// Errors surfaced to the caller of [`crate::pipeline::optimize`].
///
/// None of these are retried: the model is deterministic, so resubmitting
/// the same inputs yields the same outcome.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CourseMatchError {
    /// Invalid or contradictory input parameters, caught before any model is built.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The solver proved there is no feasible selection.
    #[error("no feasible selection exists (solver status: {status})")]
    InfeasibleModel { status: SolveStatus },

    /// The solver could not run or crashed; distinct from infeasibility.
    #[error("solver unavailable: {0}")]
    SolverUnavailable(String),
}

impl CourseMatchError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, CourseMatchError>;
