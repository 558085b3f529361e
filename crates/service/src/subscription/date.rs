//! Conversion between the wire month (`MM-YYYY`) and a stored first-of-month date.

use std::fmt;

use chrono::{Datelike, NaiveDate};

/// Inputs comparing `<=` to this string are treated as unset.
///
/// The comparison is plain string ordering, not date ordering: `"12-1998"`
/// sorts after it and is accepted.
pub const MIN_WIRE_MONTH: &str = "01-1999";

/// A month normalized to its first day, or the explicit unset marker.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MonthDate {
    /// Empty, sentinel-low or unparseable input.
    #[default]
    Unset,
    Month(NaiveDate),
}

impl MonthDate {
    /// Parse `MM-YYYY`. Never fails: anything unusable becomes [`MonthDate::Unset`].
    ///
    /// The month may be one or two digits, the year must be four.
    pub fn parse(text: &str) -> Self {
        if text.is_empty() || text <= MIN_WIRE_MONTH {
            return Self::Unset;
        }
        let Some((month, year)) = text.split_once('-') else {
            return Self::Unset;
        };
        if !(1..=2).contains(&month.len()) || year.len() != 4 {
            return Self::Unset;
        }
        if !month.bytes().chain(year.bytes()).all(|b| b.is_ascii_digit()) {
            return Self::Unset;
        }
        let (Ok(month), Ok(year)) = (month.parse::<u32>(), year.parse::<i32>()) else {
            return Self::Unset;
        };
        NaiveDate::from_ymd_opt(year, month, 1).map_or(Self::Unset, Self::Month)
    }

    /// Render as `M-YYYY` (no zero padding on the month), or `""` when unset.
    pub fn format(&self) -> String {
        self.to_string()
    }

    pub fn is_unset(&self) -> bool {
        matches!(self, Self::Unset)
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Self::Unset => None,
            Self::Month(d) => Some(*d),
        }
    }
}

impl fmt::Display for MonthDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unset => Ok(()),
            Self::Month(d) => write!(f, "{}-{}", d.month(), d.year()),
        }
    }
}

impl From<Option<NaiveDate>> for MonthDate {
    /// Stored dates are normalized to day 1 on the way in.
    fn from(value: Option<NaiveDate>) -> Self {
        value
            .and_then(|d| d.with_day(1))
            .map_or(Self::Unset, Self::Month)
    }
}
