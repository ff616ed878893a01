//! Exact time arithmetic for onsets, durations and time signatures
//!
//! All times are measured in whole notes: `1/4` is a quarter note and a
//! `3/4` measure holds exactly `3/4` of summed duration. Keeping the unit
//! identical to the time signature value is what lets the measure capacity
//! check compare like with like.

use num_rational::Rational64;
use num_traits::CheckedAdd;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Exact rational used for every onset and duration
pub type Rational = Rational64;

/// Build a rational from numerator and denominator
///
/// Panics on a zero denominator, like `Ratio::new`; callers pass literals.
pub fn ratio(numer: i64, denom: i64) -> Rational {
    Rational::new(numer, denom)
}

/// Zero-length time
pub fn zero() -> Rational {
    Rational::from_integer(0)
}

/// Finest subdivision of a whole note a time value may use
pub const MAX_DENOMINATOR: i64 = 1_000_000;

/// Largest time value, in whole notes
pub const MAX_WHOLE_NOTES: i64 = 1_000_000;

/// Whether a time value is inside the range measure arithmetic is kept to
pub fn in_time_range(value: &Rational) -> bool {
    *value.denom() <= MAX_DENOMINATOR
        && value.numer().checked_abs().is_some_and(|numer| numer <= MAX_WHOLE_NOTES * value.denom())
}

/// Exact sum; `None` when an intermediate denominator no longer fits `i64`
pub fn checked_sum(values: impl IntoIterator<Item = Rational>) -> Option<Rational> {
    values.into_iter().try_fold(zero(), |total, value| total.checked_add(&value))
}

/// Render a rational as a fraction literal (`0`, `3`, `3/8`)
pub fn format_rational(value: &Rational) -> String {
    if *value.denom() == 1 {
        value.numer().to_string()
    } else {
        format!("{}/{}", value.numer(), value.denom())
    }
}

/// Parse a fraction literal (`3/8`, `2`, `-1/4`)
///
/// Decimal literals are rejected: the text form only ever carries exact
/// fractions.
pub fn parse_rational(text: &str) -> Option<Rational> {
    if text.is_empty() || text.contains('.') {
        return None;
    }
    Rational::from_str(text).ok()
}

/// Approximate value for statistics and user-facing beat positions
pub fn to_f64(value: &Rational) -> f64 {
    *value.numer() as f64 / *value.denom() as f64
}

/// Time signature (`numerator/denominator`)
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimeSignature {
    pub numerator: u32,
    pub denominator: u32,
}

impl TimeSignature {
    pub fn new(numerator: u32, denominator: u32) -> Self {
        Self { numerator, denominator }
    }

    /// Common time, used whenever a source declares no time signature
    pub fn common() -> Self {
        Self::new(4, 4)
    }

    /// Summed duration a measure of this signature can hold
    pub fn capacity(&self) -> Rational {
        ratio(self.numerator as i64, self.denominator as i64)
    }

    /// Parse `num/den`; both parts must be positive integers
    pub fn parse(text: &str) -> Option<Self> {
        let (num, den) = text.split_once('/')?;
        let numerator: u32 = num.parse().ok()?;
        let denominator: u32 = den.parse().ok()?;
        if numerator == 0 || denominator == 0 {
            return None;
        }
        Some(Self::new(numerator, denominator))
    }

    /// Length of one beat (`1/denominator` of a whole note)
    pub fn beat(&self) -> Rational {
        ratio(1, self.denominator as i64)
    }
}

impl Default for TimeSignature {
    fn default() -> Self {
        Self::common()
    }
}

impl fmt::Display for TimeSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

/// Plain note values from breve down to 128th, longest first
const BASE_VALUES: [(i64, i64, &str); 9] = [
    (2, 1, "breve"),
    (1, 1, "whole"),
    (1, 2, "half"),
    (1, 4, "quarter"),
    (1, 8, "eighth"),
    (1, 16, "sixteenth"),
    (1, 32, "thirty-second"),
    (1, 64, "sixty-fourth"),
    (1, 128, "128th"),
];

/// Name a single written value: plain, dotted, double-dotted or triplet
fn single_value_name(duration: &Rational) -> Option<String> {
    for (numer, denom, name) in BASE_VALUES {
        let base = ratio(numer, denom);
        if *duration == base {
            return Some(name.to_string());
        }
        if *duration == base * ratio(3, 2) {
            return Some(format!("dotted {}", name));
        }
        if *duration == base * ratio(7, 4) {
            return Some(format!("double-dotted {}", name));
        }
        if *duration == base * ratio(2, 3) {
            return Some(format!("{}-note triplet", name));
        }
    }
    None
}

/// Name a duration as musical values ("quarter", "dotted half",
/// "half tied to eighth"), never as a raw fraction
pub fn duration_name(duration: &Rational) -> String {
    if *duration <= zero() {
        return "no duration".to_string();
    }
    if let Some(name) = single_value_name(duration) {
        return name;
    }

    // Longest-first split into at most four tied plain values
    let mut remaining = *duration;
    let mut pieces = Vec::new();
    for (numer, denom, name) in BASE_VALUES {
        let base = ratio(numer, denom);
        while remaining >= base && pieces.len() < 4 {
            pieces.push(name);
            remaining -= base;
        }
    }
    if remaining == zero() && !pieces.is_empty() {
        return pieces.join(" tied to ");
    }

    let quarters = to_f64(duration) * 4.0;
    format!("an irregular value of about {:.2} quarter notes", quarters)
}
