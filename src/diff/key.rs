//! Key estimation from early pitch content
//!
//! The default estimator scores all 24 major and natural-minor keys against
//! the pitch classes of the first few measures of every voice: one point per
//! note inside the scale, two more per note on the tonic triad, and a bonus
//! when the opening note is the tonic. Ties prefer major, then the lower
//! tonic.

use serde::Serialize;
use std::fmt;

use super::{ChangeKind, DiffEntry, DiffScope, Location};
use crate::models::pitch::describe_shift;
use crate::models::Score;

#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Major,
    Minor,
}

impl Mode {
    fn scale(&self) -> [u8; 7] {
        match self {
            Mode::Major => [0, 2, 4, 5, 7, 9, 11],
            Mode::Minor => [0, 2, 3, 5, 7, 8, 10],
        }
    }

    fn triad(&self) -> [u8; 3] {
        match self {
            Mode::Major => [0, 4, 7],
            Mode::Minor => [0, 3, 7],
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Major => "major",
            Mode::Minor => "minor",
        }
    }
}

const MAJOR_TONICS: [&str; 12] = ["C", "Db", "D", "Eb", "E", "F", "F#", "G", "Ab", "A", "Bb", "B"];
const MINOR_TONICS: [&str; 12] = ["C", "C#", "D", "Eb", "E", "F", "F#", "G", "G#", "A", "Bb", "B"];

const FIRST_NOTE_BONUS: u32 = 3;

/// Tonic pitch class (C = 0) and mode
#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Key {
    pub tonic: u8,
    pub mode: Mode,
}

impl Key {
    pub fn new(tonic: u8, mode: Mode) -> Self {
        Self { tonic: tonic % 12, mode }
    }

    pub fn tonic_name(&self) -> &'static str {
        match self.mode {
            Mode::Major => MAJOR_TONICS[self.tonic as usize],
            Mode::Minor => MINOR_TONICS[self.tonic as usize],
        }
    }

    fn contains(&self, pitch_class: u8, degrees: &[u8]) -> bool {
        let degree = (pitch_class + 12 - self.tonic) % 12;
        degrees.contains(&degree)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.tonic_name(), self.mode.as_str())
    }
}

pub trait KeyEstimator {
    /// Best guess for the key of the first `window_measures` measures;
    /// `None` when there are no notes to go on
    fn estimate(&self, score: &Score, window_measures: usize) -> Option<Key>;
}

/// Diatonic template matching with tonic-triad weighting
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateKeyEstimator;

impl TemplateKeyEstimator {
    fn opening_pitch_classes(score: &Score, window_measures: usize) -> Vec<u8> {
        let mut pitch_classes = Vec::new();
        for part in score.sorted_parts() {
            for voice in part.sorted_voices() {
                for measure in voice.sorted_measures().into_iter().take(window_measures) {
                    pitch_classes.extend(measure.notes().iter().map(|n| n.pitch.pitch_class()));
                }
            }
        }
        pitch_classes
    }

    fn score_key(key: &Key, pitch_classes: &[u8]) -> u32 {
        let scale = key.mode.scale();
        let triad = key.mode.triad();
        let mut total: u32 = pitch_classes
            .iter()
            .map(|pc| {
                let mut weight = 0;
                if key.contains(*pc, &scale) {
                    weight += 1;
                }
                if key.contains(*pc, &triad) {
                    weight += 2;
                }
                weight
            })
            .sum();
        if pitch_classes.first() == Some(&key.tonic) {
            total += FIRST_NOTE_BONUS;
        }
        total
    }
}

impl KeyEstimator for TemplateKeyEstimator {
    fn estimate(&self, score: &Score, window_measures: usize) -> Option<Key> {
        let pitch_classes = Self::opening_pitch_classes(score, window_measures);
        if pitch_classes.is_empty() {
            return None;
        }

        let mut best: Option<(Key, u32)> = None;
        for mode in [Mode::Major, Mode::Minor] {
            for tonic in 0..12 {
                let key = Key::new(tonic, mode);
                let points = Self::score_key(&key, &pitch_classes);
                if best.map_or(true, |(_, top)| points > top) {
                    best = Some((key, points));
                }
            }
        }
        best.map(|(key, _)| key)
    }
}

/// Upward tonic distance 0..12 when both keys are known, differ, and share
/// a mode
pub fn key_transposition(before: Option<Key>, after: Option<Key>) -> Option<i32> {
    match (before, after) {
        (Some(from), Some(to)) if from != to && from.mode == to.mode => {
            Some((to.tonic as i32 - from.tonic as i32).rem_euclid(12))
        }
        _ => None,
    }
}

/// Statement about a key change, if there is one
pub fn compare_keys(before: Option<Key>, after: Option<Key>) -> Option<DiffEntry> {
    let (from, to) = match (before, after) {
        (Some(from), Some(to)) if from != to => (from, to),
        _ => return None,
    };

    let entry = match key_transposition(before, after) {
        Some(up) => {
            let shift = if up > 6 { up - 12 } else { up };
            DiffEntry::new(
                DiffScope::Score,
                Location::score(),
                ChangeKind::KeyTransposition,
                format!("Key transposed from {} to {}, {}", from, to, describe_shift(shift)),
            )
        }
        None => DiffEntry::new(
            DiffScope::Score,
            Location::score(),
            ChangeKind::Modulation,
            format!("Modulated from {} to {}", from, to),
        ),
    };
    Some(entry.with_values(from.to_string(), to.to_string()))
}
