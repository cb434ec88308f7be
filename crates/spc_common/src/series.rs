//! Target series model for Crestron control processors.
//!
//! A target string is a short sequence of digits selecting which hardware
//! series to compile for, e.g. `"3"`, `"34"`, `"234"`. Characters outside
//! the 2..=4 range are ignored; an empty result is rejected by the
//! configuration layer, not here.

use std::fmt;

/// A Crestron processor series the external compiler can target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Series {
    /// 2-Series processors (e.g. PRO2, AV2).
    Series2,
    /// 3-Series processors (e.g. CP3, PRO3).
    Series3,
    /// 4-Series processors (e.g. CP4, PRO4).
    Series4,
}

impl Series {
    /// The digit identifying this series in target strings and in
    /// `S<digit>_` artifact prefixes.
    pub fn digit(self) -> char {
        match self {
            Series::Series2 => '2',
            Series::Series3 => '3',
            Series::Series4 => '4',
        }
    }

    /// The literal argument value the external compiler expects after
    /// `/target`.
    pub fn as_arg(self) -> &'static str {
        match self {
            Series::Series2 => "series2",
            Series::Series3 => "series3",
            Series::Series4 => "series4",
        }
    }

    /// Maps a digit character to a series, if it names one.
    pub fn from_digit(c: char) -> Option<Self> {
        match c {
            '2' => Some(Series::Series2),
            '3' => Some(Series::Series3),
            '4' => Some(Series::Series4),
            _ => None,
        }
    }
}

impl fmt::Display for Series {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_arg())
    }
}

/// Parses a target string into the series it selects.
///
/// Scans every character; digits 2 through 4 map to their series, anything
/// else is skipped. `"234"` yields all three, `"13"` yields only Series 3,
/// and `""` or `"5"` yield an empty list (which the configuration layer
/// rejects as an invalid target).
pub fn parse_target(target: &str) -> Vec<Series> {
    target.chars().filter_map(Series::from_digit).collect()
}
