//! good_lp backend (pure-Rust microlp branch and bound).
use super::{Assignment, SolveResult, SolveStatus, Solver};
use crate::error::{CourseMatchError, Result};
use crate::model::Model;
use good_lp::{
    Expression, ProblemVariables, ResolutionError, Solution, SolverModel, Variable, constraint, default_solver,
    variable,
};
use std::time::Instant;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, Default)]
pub struct LpSolver;

impl Solver for LpSolver {
    fn name(&self) -> &'static str {
        "microlp"
    }

    fn solve(&self, model: &Model) -> Result<SolveResult> {
        if model.num_variables() == 0 {
            return Ok(SolveResult::new(SolveStatus::Optimal, Assignment::default()));
        }

        let start = Instant::now();
        let mut problem = ProblemVariables::new();
        let vars: Vec<Variable> = problem.add_vector(variable().binary(), model.num_variables());

        let objective: Expression = model
            .objective()
            .iter()
            .zip(&vars)
            .map(|(coef, var)| *coef * *var)
            .sum();

        let mut lp = problem.maximise(objective).using(default_solver);
        for row in model.constraints() {
            if row.terms.is_empty() {
                continue;
            }
            let lhs: Expression = row.terms.iter().map(|(v, coef)| *coef * vars[*v]).sum();
            let rhs = row.rhs;
            lp.add_constraint(constraint!(lhs <= rhs));
        }

        info!(
            variables = model.num_variables(),
            constraints = model.constraints().len(),
            "starting ILP solver"
        );
        match lp.solve() {
            Ok(solution) => {
                let values: Vec<f64> = vars.iter().map(|v| solution.value(*v)).collect();
                info!("solution found in {:.2?}", start.elapsed());
                Ok(SolveResult::new(
                    SolveStatus::Optimal,
                    Assignment::from_values(model, values),
                ))
            }
            Err(ResolutionError::Infeasible) => {
                warn!("solver reports the model is infeasible");
                Ok(SolveResult::without_solution(SolveStatus::Infeasible))
            }
            Err(ResolutionError::Unbounded) => {
                warn!("solver reports the model is unbounded");
                Ok(SolveResult::without_solution(SolveStatus::Unbounded))
            }
            Err(e) => Err(CourseMatchError::SolverUnavailable(e.to_string())),
        }
    }
}
