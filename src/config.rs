//! Policy constants and the parameters one solve is run with.
use crate::conflict::ConflictMode;
use crate::error::{CourseMatchError, Result};
use anyhow::Context;
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

pub const CREDIT_LIMIT_MIN: f64 = 0.0;
pub const CREDIT_LIMIT_MAX: f64 = 7.0;
pub const CREDIT_LIMIT_STEP: f64 = 0.25;
pub const CREDIT_LIMIT_DEFAULT: f64 = 4.0;

pub const FIRST_YEAR_BUDGET: f64 = 4400.0;
pub const SECOND_YEAR_BUDGET: f64 = 5500.0;

/// Course names of which at most one may be selected, independent of timing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExclusivityGroup(pub Vec<String>);

impl ExclusivityGroup {
    pub fn new<I, S>(courses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(courses.into_iter().map(Into::into).collect())
    }

    pub fn courses(&self) -> &[String] {
        &self.0
    }

    pub fn contains(&self, course_name: &str) -> bool {
        self.0.iter().any(|c| c == course_name)
    }
}

lazy_static! {
    /// Exclusions maintained by the programme office.
    pub static ref DEFAULT_EXCLUSIVITY_GROUPS: Vec<ExclusivityGroup> = vec![
        ExclusivityGroup::new(["MGMT6110", "MGMT6120"]),
        ExclusivityGroup::new(["COURSE_X1", "COURSE_X2"]),
    ];
}

/// Read a JSON list of exclusivity groups, e.g. `[["MGMT6110", "MGMT6120"]]`.
pub fn load_exclusivity_groups(path: &Path) -> anyhow::Result<Vec<ExclusivityGroup>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading exclusivity groups from {}", path.display()))?;
    let groups = serde_json::from_str(&text)
        .with_context(|| format!("parsing exclusivity groups in {}", path.display()))?;
    Ok(groups)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StudentYear {
    #[serde(rename = "1st Year")]
    FirstYear,
    #[serde(rename = "2nd Year")]
    SecondYear,
}

impl StudentYear {
    /// Tuition budget granted for the year.
    pub fn budget(self) -> f64 {
        match self {
            StudentYear::FirstYear => FIRST_YEAR_BUDGET,
            StudentYear::SecondYear => SECOND_YEAR_BUDGET,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            StudentYear::FirstYear => "1st Year",
            StudentYear::SecondYear => "2nd Year",
        }
    }
}

impl FromStr for StudentYear {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "1st year" | "1st" | "first" | "1" => Ok(StudentYear::FirstYear),
            "2nd year" | "2nd" | "second" | "2" => Ok(StudentYear::SecondYear),
            other => Err(format!("unknown student year '{other}' (expected 1st Year or 2nd Year)")),
        }
    }
}

impl fmt::Display for StudentYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Everything the model builder needs besides the sections themselves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchParams {
    pub budget: f64,
    pub credit_limit: f64,
    #[serde(default)]
    pub exclusivity_groups: Vec<ExclusivityGroup>,
    #[serde(default)]
    pub conflict_mode: ConflictMode,
}

impl MatchParams {
    pub fn new(budget: f64, credit_limit: f64) -> Self {
        Self {
            budget,
            credit_limit,
            exclusivity_groups: Vec::new(),
            conflict_mode: ConflictMode::default(),
        }
    }

    pub fn with_exclusivity_groups(mut self, groups: Vec<ExclusivityGroup>) -> Self {
        self.exclusivity_groups = groups;
        self
    }

    pub fn with_conflict_mode(mut self, mode: ConflictMode) -> Self {
        self.conflict_mode = mode;
        self
    }

    /// Rejects negative or non-finite limits. Never clamps.
    pub fn validate(&self) -> Result<()> {
        if !self.budget.is_finite() || self.budget < 0.0 {
            return Err(CourseMatchError::configuration(format!(
                "budget must be a non-negative amount, got {}",
                self.budget
            )));
        }
        if !self.credit_limit.is_finite() || self.credit_limit < 0.0 {
            return Err(CourseMatchError::configuration(format!(
                "credit limit must be non-negative, got {}",
                self.credit_limit
            )));
        }
        Ok(())
    }
}

/// What a student enters: their year and how many credits they want at most.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchRequest {
    pub student_year: StudentYear,
    pub credit_limit: f64,
}

impl MatchRequest {
    pub fn new(student_year: StudentYear, credit_limit: f64) -> Self {
        Self {
            student_year,
            credit_limit,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(CREDIT_LIMIT_MIN..=CREDIT_LIMIT_MAX).contains(&self.credit_limit) {
            return Err(CourseMatchError::configuration(format!(
                "credit limit {} is outside {CREDIT_LIMIT_MIN}..={CREDIT_LIMIT_MAX}",
                self.credit_limit
            )));
        }
        Ok(())
    }

    /// Budget always comes from the year.
    pub fn to_params(&self, exclusivity_groups: Vec<ExclusivityGroup>, mode: ConflictMode) -> Result<MatchParams> {
        self.validate()?;
        Ok(MatchParams::new(self.student_year.budget(), self.credit_limit)
            .with_exclusivity_groups(exclusivity_groups)
            .with_conflict_mode(mode))
    }
}

impl Default for MatchRequest {
    fn default() -> Self {
        Self::new(StudentYear::FirstYear, CREDIT_LIMIT_DEFAULT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_year_budgets() {
        assert_eq!(StudentYear::FirstYear.budget(), 4400.0);
        assert_eq!(StudentYear::SecondYear.budget(), 5500.0);
        assert_eq!("2nd Year".parse::<StudentYear>().unwrap(), StudentYear::SecondYear);
        assert!("3rd Year".parse::<StudentYear>().is_err());
    }

    #[test]
    fn test_request_to_params() {
        let params = MatchRequest::new(StudentYear::SecondYear, 5.25)
            .to_params(DEFAULT_EXCLUSIVITY_GROUPS.clone(), ConflictMode::Pairwise)
            .unwrap();
        assert_eq!(params.budget, 5500.0);
        assert_eq!(params.credit_limit, 5.25);
        assert_eq!(params.exclusivity_groups.len(), 2);
        assert_eq!(params.conflict_mode, ConflictMode::Pairwise);
    }

    #[test]
    fn test_request_rejects_out_of_range_credit_limit() {
        for limit in [-0.25, 7.25, f64::NAN] {
            let err = MatchRequest::new(StudentYear::FirstYear, limit).validate().unwrap_err();
            assert!(matches!(err, CourseMatchError::Configuration(_)));
        }
    }

    #[test]
    fn test_params_validate() {
        assert!(MatchParams::new(0.0, 0.0).validate().is_ok());
        assert!(MatchParams::new(-1.0, 4.0).validate().is_err());
        assert!(MatchParams::new(4400.0, -0.5).validate().is_err());
        assert!(MatchParams::new(f64::INFINITY, 4.0).validate().is_err());
    }

    #[test]
    fn test_exclusivity_groups_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("groups.json");
        std::fs::write(&path, r#"[["MGMT6110", "MGMT6120"], ["FIN7000"]]"#).unwrap();
        let groups = load_exclusivity_groups(&path).unwrap();
        assert_eq!(groups.len(), 2);
        assert!(groups[0].contains("MGMT6120"));
        assert_eq!(groups[1].courses(), ["FIN7000".to_string()]);
    }

    #[test]
    fn test_params_serde_defaults() {
        let params: MatchParams = serde_json::from_str(r#"{"budget": 4400, "credit_limit": 4.0}"#).unwrap();
        assert!(params.exclusivity_groups.is_empty());
        assert_eq!(params.conflict_mode, ConflictMode::Grouped);
    }
}
