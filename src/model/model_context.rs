//! Solver-neutral model and the context threaded through the build pipeline.
use super::model_conflicts::add_conflict_constraints;
use super::model_courses::{add_course_constraints, add_exclusivity_constraints};
use super::model_limits::{add_budget_constraint, add_credit_limit_constraint, add_objective};
use crate::config::MatchParams;
use crate::conflict::ConflictStrategy;
use crate::error::{CourseMatchError, Result};
use crate::section::Section;
use crate::solver::Assignment;
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, info};

const FEASIBILITY_TOLERANCE: f64 = 1e-6;

/// `Σ coef·x[var] <= rhs`.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearConstraint {
    pub name: String,
    pub terms: Vec<(usize, f64)>,
    pub rhs: f64,
}

impl LinearConstraint {
    pub fn at_most_one(name: impl Into<String>, vars: impl IntoIterator<Item = usize>) -> Self {
        Self {
            name: name.into(),
            terms: vars.into_iter().map(|v| (v, 1.0)).collect(),
            rhs: 1.0,
        }
    }

    pub fn lhs(&self, values: &[f64]) -> f64 {
        self.terms.iter().map(|(v, c)| c * values[*v]).sum()
    }
}

/// A maximisation over one binary variable per section.
///
/// Variable `i` belongs to the i-th section the model was built from and is
/// named by its section id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Model {
    variables: Vec<String>,
    objective: Vec<f64>,
    constraints: Vec<LinearConstraint>,
}

impl Model {
    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    /// Objective coefficient per variable.
    pub fn objective(&self) -> &[f64] {
        &self.objective
    }

    pub fn constraints(&self) -> &[LinearConstraint] {
        &self.constraints
    }

    pub fn constraint(&self, name: &str) -> Option<&LinearConstraint> {
        self.constraints.iter().find(|c| c.name == name)
    }

    pub fn variable_index(&self, section_id: &str) -> Option<usize> {
        self.variables.iter().position(|v| v == section_id)
    }

    pub(crate) fn set_objective(&mut self, coefficients: Vec<f64>) {
        self.objective = coefficients;
    }

    pub(crate) fn push(&mut self, constraint: LinearConstraint) {
        self.constraints.push(constraint);
    }

    fn values(&self, assignment: &Assignment) -> Vec<f64> {
        self.variables.iter().map(|id| assignment.value(id)).collect()
    }

    pub fn objective_value(&self, assignment: &Assignment) -> f64 {
        self.values(assignment)
            .iter()
            .zip(&self.objective)
            .map(|(x, c)| x * c)
            .sum()
    }

    /// Names of the rows `assignment` breaks.
    pub fn violations(&self, assignment: &Assignment) -> Vec<&str> {
        let values = self.values(assignment);
        self.constraints
            .iter()
            .filter(|c| c.lhs(&values) > c.rhs + FEASIBILITY_TOLERANCE)
            .map(|c| c.name.as_str())
            .collect()
    }
}

/// Build state shared by the `add_*` steps.
///
/// Indices over the sections are derived once up front; the steps only read
/// them and append rows to `model`.
pub struct ModelBuilderContext<'a> {
    pub sections: &'a [Section],
    pub params: &'a MatchParams,
    pub strategy: &'a dyn ConflictStrategy,
    pub model: Model,
    /// Course name -> section indices, in first-seen order per course.
    pub course_index: BTreeMap<&'a str, Vec<usize>>,
}

impl<'a> ModelBuilderContext<'a> {
    pub fn new(sections: &'a [Section], params: &'a MatchParams, strategy: &'a dyn ConflictStrategy) -> Self {
        let mut course_index: BTreeMap<&'a str, Vec<usize>> = BTreeMap::new();
        for (i, section) in sections.iter().enumerate() {
            course_index.entry(section.course_name.as_str()).or_default().push(i);
        }
        let model = Model {
            variables: sections.iter().map(|s| s.section_id.clone()).collect(),
            objective: vec![0.0; sections.len()],
            constraints: Vec::new(),
        };
        Self {
            sections,
            params,
            strategy,
            model,
            course_index,
        }
    }

    /// Sum of `weight(section)·x` over all sections.
    pub fn weighted_terms(&self, weight: impl Fn(&Section) -> f64) -> Vec<(usize, f64)> {
        self.sections
            .iter()
            .enumerate()
            .map(|(i, s)| (i, weight(s)))
            .collect()
    }
}

/// Run every build step in order.
pub fn build_model_pipeline(ctx: &mut ModelBuilderContext<'_>) {
    add_objective(ctx);
    add_budget_constraint(ctx);
    add_credit_limit_constraint(ctx);
    add_course_constraints(ctx);
    add_conflict_constraints(ctx);
    add_exclusivity_constraints(ctx);
}

fn validate_sections(sections: &[Section]) -> Result<()> {
    let mut seen = HashSet::with_capacity(sections.len());
    for s in sections {
        if !seen.insert(s.section_id.as_str()) {
            return Err(CourseMatchError::configuration(format!(
                "duplicate section id '{}'",
                s.section_id
            )));
        }
        if !s.price.is_finite() || s.price < 0.0 {
            return Err(CourseMatchError::configuration(format!(
                "section '{}' has invalid price {}",
                s.section_id, s.price
            )));
        }
        if !s.credits.is_finite() || s.credits < 0.0 {
            return Err(CourseMatchError::configuration(format!(
                "section '{}' has invalid credits {}",
                s.section_id, s.credits
            )));
        }
        if !s.utility.is_finite() {
            return Err(CourseMatchError::configuration(format!(
                "section '{}' has non-finite utility",
                s.section_id
            )));
        }
    }
    Ok(())
}

/// Build the model with the conflict strategy named in `params`.
pub fn build(sections: &[Section], params: &MatchParams) -> Result<Model> {
    build_with_strategy(sections, params, params.conflict_mode.strategy())
}

/// Build the model with an explicit conflict strategy.
pub fn build_with_strategy(
    sections: &[Section],
    params: &MatchParams,
    strategy: &dyn ConflictStrategy,
) -> Result<Model> {
    params.validate()?;
    validate_sections(sections)?;

    let mut ctx = ModelBuilderContext::new(sections, params, strategy);
    build_model_pipeline(&mut ctx);
    info!(
        sections = sections.len(),
        courses = ctx.course_index.len(),
        constraints = ctx.model.constraints.len(),
        strategy = strategy.name(),
        "model built"
    );
    debug!(budget = params.budget, credit_limit = params.credit_limit, "model limits");
    Ok(ctx.model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExclusivityGroup;
    use crate::conflict::{ConflictMode, PairwiseStrategy};
    use crate::section::{Days, Term};

    fn catalog() -> Vec<Section> {
        vec![
            Section::new("A1", "FIN6000")
                .with_meeting(Days::MON | Days::WED, "P1", Term::Full)
                .with_price(2500.0)
                .with_credits(1.5)
                .with_utility(4.0),
            Section::new("A2", "FIN6000")
                .with_meeting(Days::TUE | Days::THU, "P1", Term::Full)
                .with_price(2500.0)
                .with_credits(1.5)
                .with_utility(3.0),
            Section::new("B1", "MGMT6110")
                .with_meeting(Days::MON | Days::WED, "P1", Term::Q1)
                .with_price(1200.0)
                .with_credits(0.75)
                .with_utility(2.0),
            Section::new("C1", "MGMT6120")
                .with_meeting(Days::TUE, "P3", Term::Q2)
                .with_price(1200.0)
                .with_credits(0.75),
        ]
    }

    #[test]
    fn test_objective_weights_utility_by_credits() {
        let sections = catalog();
        let model = build(&sections, &MatchParams::new(4400.0, 4.0)).unwrap();
        assert_eq!(model.variables(), ["A1", "A2", "B1", "C1"]);
        assert_eq!(model.objective(), [6.0, 4.5, 1.5, 0.0]);
    }

    #[test]
    fn test_budget_and_credit_rows() {
        let sections = catalog();
        let model = build(&sections, &MatchParams::new(4400.0, 4.0)).unwrap();
        let budget = model.constraint("BudgetConstraint").unwrap();
        assert_eq!(budget.rhs, 4400.0);
        assert_eq!(budget.terms, vec![(0, 2500.0), (1, 2500.0), (2, 1200.0), (3, 1200.0)]);
        let credits = model.constraint("CreditLimitConstraint").unwrap();
        assert_eq!(credits.rhs, 4.0);
        assert_eq!(credits.terms[2], (2, 0.75));
    }

    #[test]
    fn test_one_row_per_course() {
        let sections = catalog();
        let model = build(&sections, &MatchParams::new(4400.0, 4.0)).unwrap();
        let fin = model.constraint("OneSectionPerCourse_FIN6000").unwrap();
        assert_eq!(fin.terms, vec![(0, 1.0), (1, 1.0)]);
        assert_eq!(fin.rhs, 1.0);
        assert!(model.constraint("OneSectionPerCourse_MGMT6110").is_some());
    }

    #[test]
    fn test_conflict_rows_follow_strategy() {
        let sections = catalog();
        let grouped = build(&sections, &MatchParams::new(4400.0, 4.0)).unwrap();
        assert!(grouped.constraint("GroupConstraint_P1_Full_M_W").is_some());
        assert!(grouped.constraints().iter().all(|c| !c.name.starts_with("Conflict_")));

        let params = MatchParams::new(4400.0, 4.0).with_conflict_mode(ConflictMode::Pairwise);
        let pairwise = build(&sections, &params).unwrap();
        let row = pairwise.constraint("Conflict_A1_B1").unwrap();
        assert_eq!(row.terms, vec![(0, 1.0), (2, 1.0)]);
        assert!(pairwise.constraints().iter().all(|c| !c.name.starts_with("GroupConstraint_")));
    }

    #[test]
    fn test_explicit_strategy_overrides_mode() {
        let sections = catalog();
        let params = MatchParams::new(4400.0, 4.0);
        let model = build_with_strategy(&sections, &params, &PairwiseStrategy).unwrap();
        assert!(model.constraint("Conflict_A1_B1").is_some());
    }

    #[test]
    fn test_exclusivity_rows() {
        let sections = catalog();
        let params = MatchParams::new(4400.0, 4.0).with_exclusivity_groups(vec![
            ExclusivityGroup::new(["MGMT6110", "MGMT6120"]),
            ExclusivityGroup::new(["COURSE_X1", "COURSE_X2"]),
        ]);
        let model = build(&sections, &params).unwrap();
        let row = model.constraint("Exclusive_MGMT6110_MGMT6120").unwrap();
        assert_eq!(row.terms, vec![(2, 1.0), (3, 1.0)]);
        // No matching sections: skipped rather than rejected.
        assert!(model.constraint("Exclusive_COURSE_X1_COURSE_X2").is_none());
    }

    #[test]
    fn test_rejects_negative_limits() {
        let sections = catalog();
        for params in [MatchParams::new(-1.0, 4.0), MatchParams::new(4400.0, -1.0)] {
            assert!(matches!(build(&sections, &params), Err(CourseMatchError::Configuration(_))));
        }
    }

    #[test]
    fn test_rejects_bad_sections() {
        let mut dup = catalog();
        dup.push(Section::new("A1", "OTHER"));
        assert!(matches!(
            build(&dup, &MatchParams::new(4400.0, 4.0)),
            Err(CourseMatchError::Configuration(msg)) if msg.contains("duplicate")
        ));

        let negative = vec![Section::new("Z", "Z").with_price(-5.0)];
        assert!(build(&negative, &MatchParams::new(4400.0, 4.0)).is_err());
    }

    #[test]
    fn test_violations_and_objective_value() {
        let sections = catalog();
        let params = MatchParams::new(4400.0, 4.0).with_conflict_mode(ConflictMode::Pairwise);
        let model = build(&sections, &params).unwrap();

        let ok = Assignment::from_selected(["A1", "C1"]);
        assert!(model.violations(&ok).is_empty());
        assert_eq!(model.objective_value(&ok), 6.0);

        let bad = Assignment::from_selected(["A1", "A2"]);
        let broken = model.violations(&bad);
        assert!(broken.contains(&"OneSectionPerCourse_FIN6000"));
        assert!(broken.contains(&"BudgetConstraint"));
    }

    #[test]
    fn test_empty_input_builds_empty_model() {
        let model = build(&[], &MatchParams::new(4400.0, 4.0)).unwrap();
        assert_eq!(model.num_variables(), 0);
        assert!(model.violations(&Assignment::default()).is_empty());
    }
}
