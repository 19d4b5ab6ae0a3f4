//! Calendar month vocabulary.
//!
//! # Invariants
//! - `Month::ALL` lists the 12 months in calendar order; `index()` is the
//!   zero-based position in that list.
//! - The canonical spelling is the capitalized English name, e.g. `January`.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// One of the 12 calendar months a manual can be filed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Month {
    January,
    February,
    March,
    April,
    May,
    June,
    July,
    August,
    September,
    October,
    November,
    December,
}

impl Month {
    /// All months in calendar order.
    pub const ALL: [Month; 12] = [
        Month::January,
        Month::February,
        Month::March,
        Month::April,
        Month::May,
        Month::June,
        Month::July,
        Month::August,
        Month::September,
        Month::October,
        Month::November,
        Month::December,
    ];

    /// Canonical capitalized name.
    pub fn name(self) -> &'static str {
        match self {
            Month::January => "January",
            Month::February => "February",
            Month::March => "March",
            Month::April => "April",
            Month::May => "May",
            Month::June => "June",
            Month::July => "July",
            Month::August => "August",
            Month::September => "September",
            Month::October => "October",
            Month::November => "November",
            Month::December => "December",
        }
    }

    /// Zero-based calendar index, January = 0.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Exact, case-sensitive match against the canonical names.
    pub fn from_name(value: &str) -> Option<Month> {
        Self::ALL.into_iter().find(|month| month.name() == value)
    }

    /// Normalizes free-form path input before matching.
    ///
    /// Only the first character is uppercased and the rest lowercased, so
    /// `"january"` and `"JANUARY"` resolve while abbreviations such as
    /// `"jan"` or padded input do not.
    pub fn normalize(value: &str) -> Option<Month> {
        let mut chars = value.chars();
        let first = chars.next()?;
        let formatted: String = first
            .to_uppercase()
            .chain(chars.as_str().to_lowercase().chars())
            .collect();
        Self::from_name(&formatted)
    }

    /// Following month; December wraps to January.
    pub fn next(self) -> Month {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }
}

impl Display for Month {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
