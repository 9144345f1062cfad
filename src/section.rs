//! Section records and their day/term attributes.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Meeting days as a bitmask over Mon/Tue/Wed/Thu.
///
/// Parsed from and rendered to the registrar's letter codes:
/// `M` Monday, `T` Tuesday, `W` Wednesday, `R` Thursday.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Days(u8);

impl Days {
    pub const NONE: Days = Days(0);
    pub const MON: Days = Days(1 << 0);
    pub const TUE: Days = Days(1 << 1);
    pub const WED: Days = Days(1 << 2);
    pub const THU: Days = Days(1 << 3);

    /// Letter order used for rendering and for group keys.
    pub const CANONICAL: [(char, Days); 4] = [
        ('M', Days::MON),
        ('W', Days::WED),
        ('T', Days::TUE),
        ('R', Days::THU),
    ];

    pub fn contains(self, other: Days) -> bool {
        self.0 & other.0 == other.0 && other.0 != 0
    }

    pub fn intersects(self, other: Days) -> bool {
        self.0 & other.0 != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn union(self, other: Days) -> Days {
        Days(self.0 | other.0)
    }

    /// Letters present, in canonical order.
    pub fn letters(self) -> impl Iterator<Item = char> {
        Self::CANONICAL
            .into_iter()
            .filter(move |(_, d)| self.contains(*d))
            .map(|(c, _)| c)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseDaysError(pub char);

impl fmt::Display for ParseDaysError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown day letter '{}' (expected M, T, W or R)", self.0)
    }
}

impl std::error::Error for ParseDaysError {}

impl FromStr for Days {
    type Err = ParseDaysError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut days = Days::NONE;
        for c in s.chars() {
            if c.is_whitespace() || c == ',' || c == '/' {
                continue;
            }
            let day = match c.to_ascii_uppercase() {
                'M' => Days::MON,
                'T' => Days::TUE,
                'W' => Days::WED,
                'R' => Days::THU,
                other => return Err(ParseDaysError(other)),
            };
            days = days.union(day);
        }
        Ok(days)
    }
}

impl TryFrom<String> for Days {
    type Error = ParseDaysError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Days> for String {
    fn from(days: Days) -> String {
        days.letters().collect()
    }
}

impl std::ops::BitOr for Days {
    type Output = Days;

    fn bitor(self, rhs: Days) -> Days {
        self.union(rhs)
    }
}

impl fmt::Display for Days {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in self.letters() {
            write!(f, "{c}")?;
        }
        Ok(())
    }
}

/// Academic sub-period a section runs in. `Full` spans all four quarters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Term {
    Full,
    Q1,
    Q2,
    Q3,
    Q4,
}

impl Term {
    pub fn as_str(self) -> &'static str {
        match self {
            Term::Full => "Full",
            Term::Q1 => "Q1",
            Term::Q2 => "Q2",
            Term::Q3 => "Q3",
            Term::Q4 => "Q4",
        }
    }

    pub fn is_quarter(self) -> bool {
        self != Term::Full
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseTermError(pub String);

impl fmt::Display for ParseTermError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown term '{}' (expected Full, Q1, Q2, Q3 or Q4)", self.0)
    }
}

impl std::error::Error for ParseTermError {}

impl FromStr for Term {
    type Err = ParseTermError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "FULL" => Ok(Term::Full),
            "Q1" => Ok(Term::Q1),
            "Q2" => Ok(Term::Q2),
            "Q3" => Ok(Term::Q3),
            "Q4" => Ok(Term::Q4),
            _ => Err(ParseTermError(s.trim().to_string())),
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One schedulable offering of a course.
///
/// Sections sharing a `course_name` are alternatives of the same course;
/// at most one of them can be selected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub section_id: String,
    pub course_name: String,
    pub instructor: String,
    pub days: Days,
    /// Opaque period token; only exact equality matters.
    pub time_slot: String,
    pub term: Term,
    pub price: f64,
    pub credits: f64,
    #[serde(default)]
    pub utility: f64,
}

impl Section {
    /// A full-term section with no meetings, no cost and no credit.
    pub fn new(section_id: impl Into<String>, course_name: impl Into<String>) -> Self {
        Self {
            section_id: section_id.into(),
            course_name: course_name.into(),
            instructor: String::new(),
            days: Days::NONE,
            time_slot: String::new(),
            term: Term::Full,
            price: 0.0,
            credits: 0.0,
            utility: 0.0,
        }
    }

    pub fn with_instructor(mut self, instructor: impl Into<String>) -> Self {
        self.instructor = instructor.into();
        self
    }

    pub fn with_meeting(mut self, days: Days, time_slot: impl Into<String>, term: Term) -> Self {
        self.days = days;
        self.time_slot = time_slot.into();
        self.term = term;
        self
    }

    pub fn with_price(mut self, price: f64) -> Self {
        self.price = price;
        self
    }

    pub fn with_credits(mut self, credits: f64) -> Self {
        self.credits = credits;
        self
    }

    pub fn with_utility(mut self, utility: f64) -> Self {
        self.utility = utility;
        self
    }

    /// Objective contribution when selected.
    pub fn weighted_utility(&self) -> f64 {
        self.utility * self.credits
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_days_parse_and_render() {
        let mw: Days = "MW".parse().unwrap();
        assert!(mw.contains(Days::MON));
        assert!(mw.contains(Days::WED));
        assert!(!mw.contains(Days::TUE));
        assert_eq!(mw.to_string(), "MW");

        let tr: Days = "r t".parse().unwrap();
        assert_eq!(tr.to_string(), "TR");
        assert!(!mw.intersects(tr));

        assert_eq!("".parse::<Days>().unwrap(), Days::NONE);
    }

    #[test]
    fn test_days_canonical_order() {
        let all: Days = "RTWM".parse().unwrap();
        assert_eq!(all.to_string(), "MWTR");
    }

    #[test]
    fn test_days_rejects_friday() {
        assert_eq!("MWF".parse::<Days>(), Err(ParseDaysError('F')));
    }

    #[test]
    fn test_term_parse() {
        assert_eq!("Full".parse::<Term>().unwrap(), Term::Full);
        assert_eq!(" q3 ".parse::<Term>().unwrap(), Term::Q3);
        assert!("Q5".parse::<Term>().is_err());
        assert!(Term::Q2.is_quarter());
        assert!(!Term::Full.is_quarter());
    }

    #[test]
    fn test_section_serde_uses_day_letters() {
        let s = Section::new("A-1", "MGMT6110")
            .with_meeting(Days::TUE | Days::THU, "P2", Term::Q1)
            .with_credits(1.5)
            .with_utility(4.0);
        let json = serde_json::to_value(&s).unwrap();
        assert_eq!(json["days"], "TR");
        assert_eq!(json["term"], "Q1");
        let back: Section = serde_json::from_value(json).unwrap();
        assert_eq!(back, s);
        assert_eq!(s.weighted_utility(), 6.0);
    }
}
