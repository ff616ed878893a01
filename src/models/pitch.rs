//! Pitch representation: step letter, alteration and octave
//!
//! Pitches are spelled, not just numbered: `F#4` and `Gb4` are different
//! pitches that share a semitone value. The semitone value
//! (`step base + alteration + 12 * octave`) is what transposition checks
//! and interval naming compare.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;

/// Diatonic step letter
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Step {
    C,
    D,
    E,
    F,
    G,
    A,
    B,
}

impl Step {
    /// Semitones above C within one octave
    pub fn semitone_base(&self) -> i32 {
        match self {
            Step::C => 0,
            Step::D => 2,
            Step::E => 4,
            Step::F => 5,
            Step::G => 7,
            Step::A => 9,
            Step::B => 11,
        }
    }

    pub fn from_char(c: char) -> Option<Step> {
        match c {
            'C' => Some(Step::C),
            'D' => Some(Step::D),
            'E' => Some(Step::E),
            'F' => Some(Step::F),
            'G' => Some(Step::G),
            'A' => Some(Step::A),
            'B' => Some(Step::B),
            _ => None,
        }
    }

    pub fn as_char(&self) -> char {
        match self {
            Step::C => 'C',
            Step::D => 'D',
            Step::E => 'E',
            Step::F => 'F',
            Step::G => 'G',
            Step::A => 'A',
            Step::B => 'B',
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Accidental symbol used in the text form for an alteration
pub fn alteration_symbol(alteration: i8) -> &'static str {
    match alteration {
        2 => "x",
        1 => "#",
        -1 => "b",
        -2 => "bb",
        _ => "",
    }
}

/// Alteration for an accidental symbol of the text form
pub fn alteration_from_symbol(symbol: &str) -> Option<i8> {
    match symbol {
        "" => Some(0),
        "#" => Some(1),
        "x" => Some(2),
        "b" => Some(-1),
        "bb" => Some(-2),
        _ => None,
    }
}

/// Octaves a notation file can carry
pub const NOTATED_OCTAVES: RangeInclusive<i8> = 0..=9;

/// A spelled pitch
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Pitch {
    pub step: Step,
    /// -2 (double flat) through 2 (double sharp)
    pub alteration: i8,
    /// Scientific octave number (middle C is C4)
    pub octave: i8,
}

impl Pitch {
    pub fn new(step: Step, alteration: i8, octave: i8) -> Self {
        Self { step, alteration, octave }
    }

    /// `step base + alteration + 12 * octave`
    pub fn semitone_value(&self) -> i32 {
        self.step.semitone_base() + self.alteration as i32 + 12 * self.octave as i32
    }

    /// Pitch class 0..12 (C = 0)
    pub fn pitch_class(&self) -> u8 {
        self.semitone_value().rem_euclid(12) as u8
    }

    /// Parse the text-form spelling (`C4`, `F#3`, `Bbb2`, `Gx5`)
    ///
    /// Shape checking happens in the parser; this only splits a string that
    /// already has the right shape, and returns `None` otherwise.
    pub fn parse(text: &str) -> Option<Pitch> {
        let mut chars = text.chars();
        let step = Step::from_char(chars.next()?)?;
        let rest = chars.as_str();
        let digits_at = rest.find(|c: char| c.is_ascii_digit())?;
        let (symbol, octave) = rest.split_at(digits_at);
        let alteration = alteration_from_symbol(symbol)?;
        let octave: i8 = octave.parse().ok()?;
        Some(Pitch::new(step, alteration, octave))
    }

    /// Whether the text form can spell this pitch: a known accidental and an
    /// octave written without a sign
    pub fn has_text_spelling(&self) -> bool {
        (-2..=2).contains(&self.alteration) && self.octave >= 0
    }
}

impl fmt::Display for Pitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.step, alteration_symbol(self.alteration), self.octave)
    }
}

const INTERVAL_NAMES: [&str; 12] = [
    "unison",
    "minor second",
    "major second",
    "minor third",
    "major third",
    "perfect fourth",
    "tritone",
    "perfect fifth",
    "minor sixth",
    "major sixth",
    "minor seventh",
    "major seventh",
];

/// Name of a signed semitone distance, reduced mod 12
///
/// Non-zero whole octaves are named "octave" rather than "unison".
pub fn interval_name(semitones: i32) -> &'static str {
    let class = semitones.unsigned_abs() % 12;
    if class == 0 && semitones != 0 {
        return "octave";
    }
    INTERVAL_NAMES[class as usize]
}

/// "up a major third (4 semitones)" / "down a minor second (1 semitone)"
pub fn describe_shift(semitones: i32) -> String {
    let direction = if semitones < 0 { "down" } else { "up" };
    let count = semitones.unsigned_abs();
    let unit = if count == 1 { "semitone" } else { "semitones" };
    format!("{} {} {} ({} {})", direction, article(interval_name(semitones)), interval_name(semitones), count, unit)
}

fn article(word: &str) -> &'static str {
    match word.chars().next() {
        Some('a' | 'e' | 'i' | 'o') => "an",
        _ => "a",
    }
}
