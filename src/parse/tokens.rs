//! Token-level helpers for the text form
//!
//! A line is split on whitespace; the first token is the keyword and the
//! rest are either bare words (`ROLE`, `TIME`) or `name=value` attributes.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::diagnostics::DiagnosticKind;
use crate::models::time::{in_time_range, parse_rational, zero, Rational, MAX_DENOMINATOR, MAX_WHOLE_NOTES};
use crate::models::{Pitch, Tie, TimeSignature};

static PITCH_SHAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-G](#|b|x|bb)?[0-9]+$").expect("pitch pattern is valid"));

/// Line keywords
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    Part,
    Voice,
    Measure,
    Note,
    Rest,
    Harmony,
    Lyric,
}

impl Keyword {
    pub fn from_token(token: &str) -> Option<Keyword> {
        match token {
            "PART" => Some(Keyword::Part),
            "VOICE" => Some(Keyword::Voice),
            "MEASURE" => Some(Keyword::Measure),
            "NOTE" => Some(Keyword::Note),
            "REST" => Some(Keyword::Rest),
            "HARMONY" => Some(Keyword::Harmony),
            "LYRIC" => Some(Keyword::Lyric),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Keyword::Part => "PART",
            Keyword::Voice => "VOICE",
            Keyword::Measure => "MEASURE",
            Keyword::Note => "NOTE",
            Keyword::Rest => "REST",
            Keyword::Harmony => "HARMONY",
            Keyword::Lyric => "LYRIC",
        }
    }

    pub fn is_event(&self) -> bool {
        matches!(self, Keyword::Note | Keyword::Rest | Keyword::Harmony | Keyword::Lyric)
    }
}

/// A problem found on a single line
pub type TokenError = (DiagnosticKind, String);

fn format_error(message: String) -> TokenError {
    (DiagnosticKind::Format, message)
}

/// Split `name=value`; `None` when the token has no `=`
pub fn split_attribute(token: &str) -> Option<(&str, &str)> {
    token.split_once('=')
}

/// `t=` value: a fraction literal, zero or positive
pub fn parse_onset(value: &str) -> Result<Rational, TokenError> {
    let onset = parse_fraction("t", value)?;
    if onset < zero() {
        return Err((DiagnosticKind::Musical, format!("onset t={} is negative", value)));
    }
    Ok(onset)
}

/// `dur=` value: a fraction literal, strictly positive
pub fn parse_duration(value: &str) -> Result<Rational, TokenError> {
    let duration = parse_fraction("dur", value)?;
    if duration <= zero() {
        return Err((DiagnosticKind::Musical, format!("duration dur={} must be greater than zero", value)));
    }
    Ok(duration)
}

fn parse_fraction(name: &str, value: &str) -> Result<Rational, TokenError> {
    if value.is_empty() {
        return Err(format_error(format!("{}= has no value", name)));
    }
    if value.contains('.') {
        return Err(format_error(format!(
            "{}={} is a decimal; write an exact fraction such as 1/4",
            name, value
        )));
    }
    let parsed =
        parse_rational(value).ok_or_else(|| format_error(format!("{}={} is not a fraction literal", name, value)))?;
    if !in_time_range(&parsed) {
        return Err(format_error(format!(
            "{}={} is out of range; denominators go up to {} and values up to {} whole notes",
            name, value, MAX_DENOMINATOR, MAX_WHOLE_NOTES
        )));
    }
    Ok(parsed)
}

/// `pitch=` value: step letter, optional accidental, octave digits
pub fn parse_pitch(value: &str) -> Result<Pitch, TokenError> {
    if !PITCH_SHAPE.is_match(value) {
        return Err(format_error(format!(
            "pitch={} is not a pitch; expected a letter A-G, an optional #, b, x or bb, then an octave number",
            value
        )));
    }
    Pitch::parse(value).ok_or_else(|| format_error(format!("pitch={} has an octave out of range", value)))
}

pub fn parse_tie(value: &str) -> Result<Tie, TokenError> {
    Tie::parse(value).ok_or_else(|| format_error(format!("tie={} must be start or stop", value)))
}

/// `MEASURE` number: non-negative integer
pub fn parse_measure_number(value: &str) -> Result<u32, TokenError> {
    value
        .parse::<u32>()
        .map_err(|_| format_error(format!("measure number '{}' must be a non-negative integer", value)))
}

pub fn parse_time_signature(value: &str) -> Result<TimeSignature, TokenError> {
    TimeSignature::parse(value).ok_or_else(|| {
        format_error(format!("time signature '{}' must be two positive integers written num/den", value))
    })
}

/// A value that must not be empty (`symbol=`, `key=`, `text=`)
pub fn non_empty(name: &str, value: &str) -> Result<String, TokenError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(format_error(format!("{}= has no value", name)));
    }
    Ok(value.to_string())
}
