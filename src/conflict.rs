//! Timetable conflict detection.
//!
//! Two interchangeable strategies feed the model's conflict rows:
//!
//! * [`PairwiseStrategy`] compares every pair of sections with [`conflicts`]
//!   and emits one `a + b <= 1` row per clashing pair. Exact, but O(n²).
//! * [`GroupedStrategy`] buckets sections by [`group_key`] and emits one
//!   `sum <= 1` row per bucket. O(n), but it treats `Full` as its own bucket,
//!   so it does not catch a full-term section clashing with a quarter one.
//!
//! The two are not equivalent; the caller picks one through [`ConflictMode`]
//! and that choice decides which clashes are enforced.
use crate::section::{Days, Section, Term};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Whether two sections cannot both be taken because they meet at the same time.
///
/// Symmetric in its arguments.
pub fn conflicts(a: &Section, b: &Section) -> bool {
    if a.time_slot != b.time_slot {
        return false;
    }
    if a.term != b.term && !(a.term == Term::Full || b.term == Term::Full) {
        return false;
    }
    // Composite patterns (MW, TR) clash with any section on one of their days.
    a.days.intersects(b.days)
}

/// Bucket key for the grouped strategy: `<time>_<term>[_<day>...]`.
pub fn group_key(section: &Section) -> String {
    let mut key = String::with_capacity(section.time_slot.len() + 12);
    key.push_str(&section.time_slot);
    key.push('_');
    key.push_str(section.term.as_str());
    for (letter, day) in Days::CANONICAL {
        if section.days.contains(day) {
            key.push('_');
            key.push(letter);
        }
    }
    key
}

/// A set of sections (by index) of which at most one may be selected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictSet {
    pub label: String,
    pub members: Vec<usize>,
}

/// Source of timetable exclusion rows for the model builder.
pub trait ConflictStrategy {
    fn name(&self) -> &'static str;

    /// Derive exclusion sets from the (immutable) section list.
    fn conflict_sets(&self, sections: &[Section]) -> Vec<ConflictSet>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PairwiseStrategy;

impl ConflictStrategy for PairwiseStrategy {
    fn name(&self) -> &'static str {
        "pairwise"
    }

    fn conflict_sets(&self, sections: &[Section]) -> Vec<ConflictSet> {
        let mut sets = Vec::new();
        for (i, a) in sections.iter().enumerate() {
            for (j, b) in sections.iter().enumerate().skip(i + 1) {
                if conflicts(a, b) {
                    sets.push(ConflictSet {
                        label: format!("Conflict_{}_{}", a.section_id, b.section_id),
                        members: vec![i, j],
                    });
                }
            }
        }
        sets
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GroupedStrategy;

impl GroupedStrategy {
    /// Section indices per group key, in key order.
    pub fn groups(sections: &[Section]) -> BTreeMap<String, Vec<usize>> {
        let mut groups: BTreeMap<String, Vec<usize>> = BTreeMap::new();
        for (i, section) in sections.iter().enumerate() {
            groups.entry(group_key(section)).or_default().push(i);
        }
        groups
    }
}

impl ConflictStrategy for GroupedStrategy {
    fn name(&self) -> &'static str {
        "grouped"
    }

    fn conflict_sets(&self, sections: &[Section]) -> Vec<ConflictSet> {
        Self::groups(sections)
            .into_iter()
            .map(|(key, members)| ConflictSet {
                label: format!("GroupConstraint_{key}"),
                members,
            })
            .collect()
    }
}

/// Caller-facing selector between the two strategies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictMode {
    Pairwise,
    #[default]
    Grouped,
}

impl ConflictMode {
    pub fn strategy(self) -> &'static dyn ConflictStrategy {
        match self {
            ConflictMode::Pairwise => &PairwiseStrategy,
            ConflictMode::Grouped => &GroupedStrategy,
        }
    }
}

impl FromStr for ConflictMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pairwise" | "pair" => Ok(ConflictMode::Pairwise),
            "grouped" | "group" => Ok(ConflictMode::Grouped),
            other => Err(format!("unknown conflict mode '{other}' (expected pairwise or grouped)")),
        }
    }
}

impl fmt::Display for ConflictMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.strategy().name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section(id: &str, days: Days, time: &str, term: Term) -> Section {
        Section::new(id, id).with_meeting(days, time, term)
    }

    const MW: Days = Days::MON.union(Days::WED);
    const TR: Days = Days::TUE.union(Days::THU);

    #[test]
    fn test_same_slot_full_term_conflicts() {
        let a = section("A", MW, "MWF-9am", Term::Full);
        let b = section("B", MW, "MWF-9am", Term::Full);
        assert!(conflicts(&a, &b));
    }

    #[test]
    fn test_different_quarters_never_conflict() {
        let x = section("X", MW, "MWF-9am", Term::Q1);
        let y = section("Y", MW, "MWF-9am", Term::Q2);
        assert!(!conflicts(&x, &y));
    }

    #[test]
    fn test_full_overlaps_every_quarter() {
        let x = section("X", MW, "MWF-9am", Term::Full);
        for q in [Term::Q1, Term::Q2, Term::Q3, Term::Q4] {
            let y = section("Y", MW, "MWF-9am", q);
            assert!(conflicts(&x, &y));
            assert!(conflicts(&y, &x));
        }
    }

    #[test]
    fn test_different_time_slots_never_conflict() {
        let a = section("A", MW, "P1", Term::Full);
        let b = section("B", MW, "P2", Term::Full);
        assert!(!conflicts(&a, &b));
    }

    #[test]
    fn test_day_overlap_rules() {
        let m = section("M", Days::MON, "P1", Term::Q1);
        let w = section("W", Days::WED, "P1", Term::Q1);
        let t = section("T", Days::TUE, "P1", Term::Q1);
        let mw = section("MW", MW, "P1", Term::Q1);
        let tr = section("TR", TR, "P1", Term::Q1);

        assert!(!conflicts(&m, &w));
        assert!(conflicts(&m, &section("M2", Days::MON, "P1", Term::Q1)));
        assert!(conflicts(&mw, &m));
        assert!(conflicts(&w, &mw));
        assert!(!conflicts(&mw, &t));
        assert!(conflicts(&tr, &t));
        assert!(conflicts(&mw, &section("MW2", MW, "P1", Term::Q1)));
        assert!(!conflicts(&mw, &tr));
    }

    #[test]
    fn test_conflicts_is_symmetric() {
        let terms = [Term::Full, Term::Q1, Term::Q2];
        let days = [Days::NONE, Days::MON, Days::TUE, MW, TR, MW | TR];
        let slots = ["P1", "P2"];
        let mut all = Vec::new();
        for t in terms {
            for d in days {
                for s in slots {
                    all.push(section("S", d, s, t));
                }
            }
        }
        for a in &all {
            for b in &all {
                assert_eq!(conflicts(a, b), conflicts(b, a), "{a:?} vs {b:?}");
            }
        }
    }

    #[test]
    fn test_group_key_layout() {
        assert_eq!(group_key(&section("A", MW, "9am", Term::Full)), "9am_Full_M_W");
        assert_eq!(group_key(&section("B", TR | Days::MON, "9am", Term::Q3)), "9am_Q3_M_T_R");
        assert_eq!(group_key(&section("C", Days::NONE, "9am", Term::Q1)), "9am_Q1");
    }

    #[test]
    fn test_grouped_misses_full_vs_quarter() {
        let full = section("F", MW, "9am", Term::Full);
        let q1 = section("Q", MW, "9am", Term::Q1);
        assert!(conflicts(&full, &q1));
        assert_ne!(group_key(&full), group_key(&q1));
    }

    #[test]
    fn test_pairwise_sets_are_ordered_pairs() {
        let sections = vec![
            section("A", MW, "P1", Term::Full),
            section("B", Days::TUE, "P1", Term::Full),
            section("C", Days::MON, "P1", Term::Q2),
        ];
        let sets = PairwiseStrategy.conflict_sets(&sections);
        assert_eq!(
            sets,
            vec![ConflictSet {
                label: "Conflict_A_C".into(),
                members: vec![0, 2],
            }]
        );
    }

    #[test]
    fn test_grouped_sets_cover_every_section_once() {
        let sections = vec![
            section("A", MW, "P1", Term::Full),
            section("B", MW, "P1", Term::Full),
            section("C", MW, "P1", Term::Q1),
        ];
        let sets = GroupedStrategy.conflict_sets(&sections);
        assert_eq!(sets.len(), 2);
        let mut seen: Vec<usize> = sets.iter().flat_map(|s| s.members.clone()).collect();
        seen.sort();
        assert_eq!(seen, vec![0, 1, 2]);
        assert!(sets.iter().any(|s| s.label == "GroupConstraint_P1_Full_M_W" && s.members == vec![0, 1]));
    }

    #[test]
    fn test_conflict_mode_parse() {
        assert_eq!("Pairwise".parse::<ConflictMode>().unwrap(), ConflictMode::Pairwise);
        assert_eq!("grouped".parse::<ConflictMode>().unwrap(), ConflictMode::Grouped);
        assert!("both".parse::<ConflictMode>().is_err());
        assert_eq!(ConflictMode::default(), ConflictMode::Grouped);
        assert_eq!(ConflictMode::Pairwise.to_string(), "pairwise");
    }
}
