//! Choose the best set of course sections for a student.
//!
//! Sections are turned into a binary ILP (one variable per section) that
//! maximises credit-weighted preference under a budget, a credit limit,
//! one-section-per-course, timetable conflicts and declared exclusivity
//! groups. See [`pipeline::optimize`] for the end-to-end call.

pub mod config;
pub mod conflict;
pub mod error;
pub mod export;
pub mod logging;
pub mod model;
pub mod pipeline;
pub mod result;
pub mod section;
pub mod solver;
pub mod source;

pub use config::{ExclusivityGroup, MatchParams, MatchRequest, StudentYear};
pub use conflict::{ConflictMode, ConflictStrategy, GroupedStrategy, PairwiseStrategy, conflicts, group_key};
pub use error::CourseMatchError;
pub use pipeline::{MatchOutcome, optimize};
pub use result::{Schedule, SummaryRow, Totals, assemble};
pub use section::{Days, Section, Term};
pub use solver::{Assignment, LpSolver, SolveResult, SolveStatus, Solver, SolverKind};
