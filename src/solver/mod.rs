//! Solver adapters: hand a [`Model`] to an ILP backend, read back status and values.
mod lp;
#[cfg(feature = "cp-sat")]
mod sat;

#[cfg(feature = "cp-sat")]
pub use sat::CpSatSolver;
pub use lp::LpSolver;

use crate::error::Result;
use crate::model::Model;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Values above this are read as "selected".
pub const SELECTED_THRESHOLD: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolveStatus {
    Optimal,
    /// A solution was found but optimality was not proven (time-limited backends).
    Feasible,
    Infeasible,
    Unbounded,
    NotSolved,
}

impl SolveStatus {
    pub fn has_solution(self) -> bool {
        matches!(self, SolveStatus::Optimal | SolveStatus::Feasible)
    }
}

impl fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SolveStatus::Optimal => "optimal",
            SolveStatus::Feasible => "feasible",
            SolveStatus::Infeasible => "infeasible",
            SolveStatus::Unbounded => "unbounded",
            SolveStatus::NotSolved => "not_solved",
        })
    }
}

/// Variable values keyed by section id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    values: BTreeMap<String, f64>,
}

impl Assignment {
    /// Pair `values[i]` with the model's i-th variable.
    pub fn from_values(model: &Model, values: impl IntoIterator<Item = f64>) -> Self {
        Self {
            values: model.variables().iter().cloned().zip(values).collect(),
        }
    }

    pub fn from_selected<I, S>(selected: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            values: selected.into_iter().map(|id| (id.into(), 1.0)).collect(),
        }
    }

    /// Missing ids read as 0.
    pub fn value(&self, section_id: &str) -> f64 {
        self.values.get(section_id).copied().unwrap_or(0.0)
    }

    pub fn is_selected(&self, section_id: &str) -> bool {
        self.value(section_id) > SELECTED_THRESHOLD
    }

    pub fn selected_ids(&self) -> impl Iterator<Item = &str> {
        self.values
            .iter()
            .filter(|(_, v)| **v > SELECTED_THRESHOLD)
            .map(|(id, _)| id.as_str())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolveResult {
    pub status: SolveStatus,
    pub assignment: Assignment,
}

impl SolveResult {
    pub fn new(status: SolveStatus, assignment: Assignment) -> Self {
        Self { status, assignment }
    }

    pub fn without_solution(status: SolveStatus) -> Self {
        Self::new(status, Assignment::default())
    }
}

/// One blocking call into an ILP backend.
///
/// `Ok` carries whatever status the backend reported, including
/// `Infeasible`. `Err` is reserved for the backend failing to run at all.
pub trait Solver {
    fn name(&self) -> &'static str;

    fn solve(&self, model: &Model) -> Result<SolveResult>;
}

/// Backend selector for callers that pick the solver at runtime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SolverKind {
    #[default]
    Lp,
    CpSat,
}

impl SolverKind {
    /// `time_limit` only applies to CP-SAT.
    pub fn create(self, time_limit: Option<f64>) -> Result<Box<dyn Solver>> {
        match self {
            SolverKind::Lp => Ok(Box::new(LpSolver::default())),
            #[cfg(feature = "cp-sat")]
            SolverKind::CpSat => Ok(Box::new(CpSatSolver::default().with_time_limit(time_limit))),
            #[cfg(not(feature = "cp-sat"))]
            SolverKind::CpSat => {
                let _ = time_limit;
                Err(crate::error::CourseMatchError::SolverUnavailable(
                    "built without the `cp-sat` feature".to_string(),
                ))
            }
        }
    }
}

impl FromStr for SolverKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "lp" | "microlp" => Ok(SolverKind::Lp),
            "cp-sat" | "cpsat" | "cp_sat" => Ok(SolverKind::CpSat),
            other => Err(format!("unknown solver '{other}' (expected lp or cp-sat)")),
        }
    }
}
