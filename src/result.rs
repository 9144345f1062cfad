//! Turning a solver assignment into the student's schedule.
use crate::section::Section;
use crate::solver::Assignment;
use serde::{Deserialize, Serialize};
use std::ops::AddAssign;

/// Identifier shown in place of a section id on the summary row.
pub const SUMMARY_LABEL: &str = "Total";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectedSection {
    #[serde(flatten)]
    pub section: Section,
    pub weighted_utility: f64,
}

/// Sums over the selection. Raw utility is deliberately not aggregated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Totals {
    pub price: f64,
    pub credits: f64,
    pub weighted_utility: f64,
}

impl AddAssign<&SelectedSection> for Totals {
    fn add_assign(&mut self, row: &SelectedSection) {
        self.price += row.section.price;
        self.credits += row.section.credits;
        self.weighted_utility += row.weighted_utility;
    }
}

/// The row rendered under the selection; descriptive columns stay blank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub section_id: String,
    #[serde(flatten)]
    pub totals: Totals,
}

impl SummaryRow {
    pub fn new(totals: Totals) -> Self {
        Self {
            section_id: SUMMARY_LABEL.to_string(),
            totals,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    /// Selected sections in input order.
    pub selected: Vec<SelectedSection>,
    pub summary: SummaryRow,
}

impl Schedule {
    pub fn totals(&self) -> &Totals {
        &self.summary.totals
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn section_ids(&self) -> Vec<&str> {
        self.selected.iter().map(|s| s.section.section_id.as_str()).collect()
    }
}

pub fn assemble(sections: &[Section], assignment: &Assignment) -> Schedule {
    let selected: Vec<SelectedSection> = sections
        .iter()
        .filter(|s| assignment.is_selected(&s.section_id))
        .map(|s| SelectedSection {
            weighted_utility: s.weighted_utility(),
            section: s.clone(),
        })
        .collect();

    let mut totals = Totals::default();
    for row in &selected {
        totals += row;
    }

    Schedule {
        selected,
        summary: SummaryRow::new(totals),
    }
}
