//! Semantic diff between two versions of a score
//!
//! Turns two trees into a short list of statements a musician would make
//! ("transposed up a major second", "meter simplified from 6/8 to 3/8")
//! instead of a flood of per-note deltas. Stages run in a fixed order and
//! the result is sorted by scope, location, change kind and description, so
//! identical inputs always give identical output.

pub mod harmony;
pub mod key;
pub mod meter;
pub mod notes;
pub mod rhythm;
pub mod structure;
pub mod style;

pub use key::{Key, KeyEstimator, Mode, TemplateKeyEstimator};
pub use style::{DecisionTable, StyleClassifier, StyleFeatures, StyleLabel};

use serde::Serialize;
use std::fmt;

use crate::config::DiffSettings;
use crate::models::pitch::describe_shift;
use crate::models::time::{to_f64, Rational};
use crate::models::{Score, TimeSignature};

/// Granularity of a statement; the declaration order is the sort order
#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum DiffScope {
    Score,
    Part,
    Voice,
    Measure,
    Note,
    Harmony,
    Rhythm,
}

#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Added,
    Removed,
    Changed,
    Pitch,
    Rhythm,
    PitchRhythm,
    Transposition,
    KeyTransposition,
    Modulation,
    MeterSimplification,
    MeterComplexification,
    SubdivisionChange,
    MeterChange,
    RhythmSimplified,
    RhythmElaborated,
    RhythmChanged,
    Style,
}

impl ChangeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeKind::Added => "added",
            ChangeKind::Removed => "removed",
            ChangeKind::Changed => "changed",
            ChangeKind::Pitch => "pitch",
            ChangeKind::Rhythm => "rhythm",
            ChangeKind::PitchRhythm => "pitch_rhythm",
            ChangeKind::Transposition => "transposition",
            ChangeKind::KeyTransposition => "key_transposition",
            ChangeKind::Modulation => "modulation",
            ChangeKind::MeterSimplification => "meter_simplification",
            ChangeKind::MeterComplexification => "meter_complexification",
            ChangeKind::SubdivisionChange => "subdivision_change",
            ChangeKind::MeterChange => "meter_change",
            ChangeKind::RhythmSimplified => "rhythm_simplified",
            ChangeKind::RhythmElaborated => "rhythm_elaborated",
            ChangeKind::RhythmChanged => "rhythm_changed",
            ChangeKind::Style => "style",
        }
    }
}

/// Structured location of a statement; absent fields mean "whole"
#[derive(Serialize, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Location {
    pub part: Option<String>,
    pub voice: Option<String>,
    pub measure: Option<u32>,
    #[serde(skip)]
    pub onset: Option<Rational>,
    /// User-facing position inside the measure ("beat 2.5")
    pub beat: Option<String>,
}

impl Location {
    pub fn score() -> Self {
        Self::default()
    }

    pub fn part(part: &str) -> Self {
        Self { part: Some(part.to_string()), ..Self::default() }
    }

    pub fn voice(part: &str, voice: &str) -> Self {
        Self { voice: Some(voice.to_string()), ..Self::part(part) }
    }

    pub fn measure(part: &str, voice: Option<&str>, measure: u32) -> Self {
        Self {
            part: Some(part.to_string()),
            voice: voice.map(str::to_string),
            measure: Some(measure),
            ..Self::default()
        }
    }

    pub fn event(part: &str, voice: &str, measure: u32, onset: Rational, time_signature: &TimeSignature) -> Self {
        Self {
            onset: Some(onset),
            beat: Some(beat_label(&onset, time_signature)),
            ..Self::measure(part, Some(voice), measure)
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut pieces = Vec::new();
        if let Some(part) = &self.part {
            pieces.push(part.clone());
        }
        if let Some(voice) = &self.voice {
            pieces.push(format!("voice {}", voice));
        }
        if let Some(measure) = self.measure {
            pieces.push(format!("measure {}", measure));
        }
        if let Some(beat) = &self.beat {
            pieces.push(beat.clone());
        }
        if pieces.is_empty() {
            return f.write_str("whole score");
        }
        f.write_str(&pieces.join(", "))
    }
}

/// "beat 1", "beat 2.5": one-based position counted in the signature's beat unit
pub fn beat_label(onset: &Rational, time_signature: &TimeSignature) -> String {
    let beat = *onset / time_signature.beat() + Rational::from_integer(1);
    if beat.is_integer() {
        return format!("beat {}", beat.to_integer());
    }
    let text = format!("{:.2}", to_f64(&beat));
    format!("beat {}", text.trim_end_matches('0').trim_end_matches('.'))
}

/// One statement of the diff
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct DiffEntry {
    pub scope: DiffScope,
    pub location: Location,
    pub kind: ChangeKind,
    pub description: String,
    pub before: Option<String>,
    pub after: Option<String>,
}

impl DiffEntry {
    pub fn new(scope: DiffScope, location: Location, kind: ChangeKind, description: impl Into<String>) -> Self {
        Self { scope, location, kind, description: description.into(), before: None, after: None }
    }

    pub fn with_values(mut self, before: impl Into<String>, after: impl Into<String>) -> Self {
        self.before = Some(before.into());
        self.after = Some(after.into());
        self
    }
}

impl fmt::Display for DiffEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.kind.as_str(), self.location, self.description)
    }
}

/// Diff analyzer with swappable key and style heuristics
pub struct SemanticDiff {
    settings: DiffSettings,
    key_estimator: Box<dyn KeyEstimator>,
    style_classifier: Box<dyn StyleClassifier>,
}

impl Default for SemanticDiff {
    fn default() -> Self {
        Self::new(DiffSettings::default())
    }
}

impl SemanticDiff {
    pub fn new(settings: DiffSettings) -> Self {
        Self {
            settings,
            key_estimator: Box::new(TemplateKeyEstimator),
            style_classifier: Box::new(DecisionTable),
        }
    }

    pub fn with_key_estimator(mut self, estimator: Box<dyn KeyEstimator>) -> Self {
        self.key_estimator = estimator;
        self
    }

    pub fn with_style_classifier(mut self, classifier: Box<dyn StyleClassifier>) -> Self {
        self.style_classifier = classifier;
        self
    }

    pub fn compute(&self, before: &Score, after: &Score) -> Vec<DiffEntry> {
        let mut entries = structure::compare_structure(before, after);

        let note_changes = notes::compare_notes(before, after);
        let (note_entries, transpositions) =
            notes::group_transpositions(note_changes, self.settings.transposition_min_notes);
        entries.extend(note_entries);

        let window = self.settings.key_window_measures;
        let before_key = self.key_estimator.estimate(before, window);
        let after_key = self.key_estimator.estimate(after, window);
        let key_shift = key::key_transposition(before_key, after_key);

        let mut key_explained = false;
        for transposition in &transpositions {
            let mut description = format!("Transposed {}", describe_shift(transposition.semitones));
            let mut entry_keys = None;
            if let (Some(shift), Some(from), Some(to)) = (key_shift, before_key, after_key) {
                if shift == transposition.semitones.rem_euclid(12) {
                    description.push_str(&format!(", from {} to {}", from, to));
                    entry_keys = Some((from, to));
                    key_explained = true;
                }
            }
            let mut entry = DiffEntry::new(DiffScope::Score, Location::score(), ChangeKind::Transposition, description);
            if let Some((from, to)) = entry_keys {
                entry = entry.with_values(from.to_string(), to.to_string());
            }
            entries.push(entry);
        }
        if !key_explained {
            entries.extend(key::compare_keys(before_key, after_key));
        }

        entries.extend(harmony::compare_harmony(before, after));
        entries.extend(meter::compare_meters(before, after));
        entries.extend(rhythm::compare_rhythms(before, after));

        let threshold = self.settings.short_note_threshold;
        let before_style = self.style_classifier.classify(&StyleFeatures::measure(before, threshold));
        let after_style = self.style_classifier.classify(&StyleFeatures::measure(after, threshold));
        if before_style != after_style {
            entries.push(
                DiffEntry::new(
                    DiffScope::Score,
                    Location::score(),
                    ChangeKind::Style,
                    format!("Style changed from {} to {}", before_style, after_style),
                )
                .with_values(before_style.to_string(), after_style.to_string()),
            );
        }

        sort_entries(&mut entries);
        log::debug!("semantic diff produced {} statements", entries.len());
        entries
    }
}

/// Diff with default settings and heuristics
pub fn compute_semantic_diff(before: &Score, after: &Score) -> Vec<DiffEntry> {
    SemanticDiff::default().compute(before, after)
}

fn sort_entries(entries: &mut [DiffEntry]) {
    entries.sort_by(|a, b| {
        a.scope
            .cmp(&b.scope)
            .then_with(|| a.location.cmp(&b.location))
            .then_with(|| a.kind.as_str().cmp(b.kind.as_str()))
            .then_with(|| a.description.cmp(&b.description))
    });
}

/// JSON rendering for presentation layers
pub fn to_json(entries: &[DiffEntry]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(entries)
}
