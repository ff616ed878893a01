//! Coarse style label from aggregate statistics

use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

use crate::models::time::Rational;
use crate::models::{Event, Score};

#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum StyleLabel {
    JazzInfluenced,
    RhythmicallyActive,
    Chromatic,
    HarmonicallyRich,
    ChoraleLike,
    Classical,
}

impl StyleLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            StyleLabel::JazzInfluenced => "jazz-influenced",
            StyleLabel::RhythmicallyActive => "rhythmically active",
            StyleLabel::Chromatic => "chromatic",
            StyleLabel::HarmonicallyRich => "harmonically rich",
            StyleLabel::ChoraleLike => "chorale-like",
            StyleLabel::Classical => "classical",
        }
    }
}

impl fmt::Display for StyleLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Aggregate statistics a classifier works from
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StyleFeatures {
    /// Harmony events per measure
    pub harmony_density: f64,
    /// Distinct pitch classes among all notes
    pub pitch_class_diversity: usize,
    /// Share of notes shorter than the short-note threshold
    pub short_note_share: f64,
}

impl StyleFeatures {
    pub fn measure(score: &Score, short_threshold: Rational) -> Self {
        let mut measures = 0usize;
        let mut harmonies = 0usize;
        let mut notes = 0usize;
        let mut short = 0usize;
        let mut pitch_classes = BTreeSet::new();

        for (_, _, measure) in score.walk_measures() {
            measures += 1;
            for event in &measure.events {
                match event {
                    Event::Harmony(_) => harmonies += 1,
                    Event::Note(note) => {
                        notes += 1;
                        if note.duration < short_threshold {
                            short += 1;
                        }
                        pitch_classes.insert(note.pitch.pitch_class());
                    }
                    Event::Rest(_) | Event::Lyric(_) => {}
                }
            }
        }

        Self {
            harmony_density: if measures == 0 { 0.0 } else { harmonies as f64 / measures as f64 },
            pitch_class_diversity: pitch_classes.len(),
            short_note_share: if notes == 0 { 0.0 } else { short as f64 / notes as f64 },
        }
    }
}

pub trait StyleClassifier {
    fn classify(&self, features: &StyleFeatures) -> StyleLabel;
}

/// Fixed decision table, first matching row wins:
///
/// | label | condition |
/// |---|---|
/// | jazz-influenced | harmony density >= 1 and diversity >= 9 |
/// | rhythmically active | short-note share >= 0.5 |
/// | chromatic | diversity >= 10 |
/// | harmonically rich | harmony density >= 1 |
/// | chorale-like | short-note share < 0.25 and diversity <= 7 |
/// | classical | otherwise |
#[derive(Debug, Clone, Copy, Default)]
pub struct DecisionTable;

impl StyleClassifier for DecisionTable {
    fn classify(&self, features: &StyleFeatures) -> StyleLabel {
        let density = features.harmony_density;
        let diversity = features.pitch_class_diversity;
        let short = features.short_note_share;

        if density >= 1.0 && diversity >= 9 {
            StyleLabel::JazzInfluenced
        } else if short >= 0.5 {
            StyleLabel::RhythmicallyActive
        } else if diversity >= 10 {
            StyleLabel::Chromatic
        } else if density >= 1.0 {
            StyleLabel::HarmonicallyRich
        } else if short < 0.25 && diversity <= 7 {
            StyleLabel::ChoraleLike
        } else {
            StyleLabel::Classical
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::time::ratio;
    use crate::parse::parse_text;

    fn features(density: f64, diversity: usize, short: f64) -> StyleFeatures {
        StyleFeatures { harmony_density: density, pitch_class_diversity: diversity, short_note_share: short }
    }

    #[test]
    fn test_decision_table() {
        let table = DecisionTable;
        assert_eq!(table.classify(&features(2.0, 9, 0.0)), StyleLabel::JazzInfluenced);
        assert_eq!(table.classify(&features(0.0, 5, 0.6)), StyleLabel::RhythmicallyActive);
        assert_eq!(table.classify(&features(0.0, 11, 0.1)), StyleLabel::Chromatic);
        assert_eq!(table.classify(&features(1.0, 5, 0.1)), StyleLabel::HarmonicallyRich);
        assert_eq!(table.classify(&features(0.0, 5, 0.1)), StyleLabel::ChoraleLike);
        assert_eq!(table.classify(&features(0.0, 8, 0.3)), StyleLabel::Classical);
    }

    #[test]
    fn test_features_from_score() {
        let score = parse_text(
            "PART Piano ROLE instrument\nVOICE 1\nMEASURE 1 TIME 2/4\nHARMONY t=0 symbol=C\n\
             NOTE t=0 dur=1/8 pitch=C4\nNOTE t=1/8 dur=1/8 pitch=E4\nNOTE t=1/4 dur=1/4 pitch=C5\n\
             MEASURE 2 TIME 2/4\nREST t=0 dur=1/2\n",
        )
        .unwrap();
        let measured = StyleFeatures::measure(&score, ratio(1, 4));
        assert_eq!(measured.harmony_density, 0.5);
        assert_eq!(measured.pitch_class_diversity, 2);
        assert!((measured.short_note_share - 2.0 / 3.0).abs() < 1e-9);
    }
}
