//! OR-Tools CP-SAT backend.
//!
//! CP-SAT only takes integer coefficients, so every row and the objective are
//! scaled by [`SCALE`] and rounded. Right-hand sides are floored, which keeps
//! `<=` rows sound for inputs with at most three decimals.
use super::{Assignment, SolveResult, SolveStatus, Solver};
use crate::error::Result;
use crate::model::Model;
use cp_sat::builder::{BoolVar, CpModelBuilder, LinearExpr};
use cp_sat::proto::{CpSolverStatus, SatParameters};
use std::time::Instant;
use tracing::{info, warn};

pub const SCALE: f64 = 1000.0;

fn scaled(x: f64) -> i64 {
    (x * SCALE).round() as i64
}

#[derive(Debug, Clone)]
pub struct CpSatSolver {
    pub time_limit: Option<f64>,
    pub random_seed: i32,
    pub num_workers: i32,
}

impl Default for CpSatSolver {
    fn default() -> Self {
        Self {
            time_limit: None,
            random_seed: 42,
            num_workers: 8,
        }
    }
}

impl CpSatSolver {
    pub fn with_time_limit(mut self, seconds: Option<f64>) -> Self {
        self.time_limit = seconds;
        self
    }

    fn parameters(&self) -> SatParameters {
        let mut params = SatParameters::default();
        params.max_time_in_seconds = self.time_limit;
        params.num_search_workers = Some(self.num_workers);
        params.random_seed = Some(self.random_seed);
        params.log_search_progress = Some(false);
        params
    }
}

impl Solver for CpSatSolver {
    fn name(&self) -> &'static str {
        "cp-sat"
    }

    fn solve(&self, model: &Model) -> Result<SolveResult> {
        if model.num_variables() == 0 {
            return Ok(SolveResult::new(SolveStatus::Optimal, Assignment::default()));
        }

        let start = Instant::now();
        let mut cp = CpModelBuilder::default();
        let vars: Vec<BoolVar> = model
            .variables()
            .iter()
            .map(|id| cp.new_bool_var_with_name(format!("x_{id}")))
            .collect();

        for row in model.constraints() {
            if row.terms.is_empty() {
                continue;
            }
            let lhs: LinearExpr = row
                .terms
                .iter()
                .map(|(v, coef)| (scaled(*coef), vars[*v].clone()))
                .collect();
            cp.add_le(lhs, LinearExpr::from((row.rhs * SCALE).floor() as i64));
        }

        let objective: LinearExpr = model
            .objective()
            .iter()
            .zip(&vars)
            .map(|(coef, var)| (scaled(*coef), var.clone()))
            .collect();
        cp.maximize(objective);

        info!(
            variables = model.num_variables(),
            constraints = model.constraints().len(),
            time_limit = ?self.time_limit,
            "starting CP-SAT"
        );
        let response = cp.solve_with_parameters(&self.parameters());
        let status = match response.status() {
            CpSolverStatus::Optimal => SolveStatus::Optimal,
            CpSolverStatus::Feasible => SolveStatus::Feasible,
            CpSolverStatus::Infeasible => SolveStatus::Infeasible,
            other => {
                warn!(status = ?other, "CP-SAT returned without a solution");
                SolveStatus::NotSolved
            }
        };
        if !status.has_solution() {
            return Ok(SolveResult::without_solution(status));
        }
        info!("CP-SAT finished in {:.2?} ({status})", start.elapsed());

        let values = vars
            .iter()
            .map(|v| if v.solution_value(&response) { 1.0 } else { 0.0 });
        Ok(SolveResult::new(status, Assignment::from_values(model, values)))
    }
}
