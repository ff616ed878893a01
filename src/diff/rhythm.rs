//! Per-measure rhythm patterns
//!
//! A pattern is the onset-ordered list of named note and rest values in one
//! (part, voice, measure). Fewer events after the edit reads as a
//! simplification, more as an elaboration.

use super::structure::shared_voices;
use super::{ChangeKind, DiffEntry, DiffScope, Location};
use crate::models::time::duration_name;
use crate::models::{Measure, Score};

fn pattern(measure: &Measure) -> Vec<String> {
    measure
        .sorted_events()
        .into_iter()
        .filter_map(|e| e.duration())
        .map(|d| duration_name(&d))
        .collect()
}

pub fn compare_rhythms(before: &Score, after: &Score) -> Vec<DiffEntry> {
    let mut entries = Vec::new();

    for (part, old_voice, new_voice) in shared_voices(before, after) {
        for old_measure in old_voice.sorted_measures() {
            let Some(new_measure) = new_voice.measures.iter().find(|m| m.number == old_measure.number) else {
                continue;
            };
            let old_pattern = pattern(old_measure);
            let new_pattern = pattern(new_measure);
            if old_pattern.is_empty() || new_pattern.is_empty() || old_pattern == new_pattern {
                continue;
            }

            let (kind, verb) = match new_pattern.len().cmp(&old_pattern.len()) {
                std::cmp::Ordering::Less => (ChangeKind::RhythmSimplified, "simplified"),
                std::cmp::Ordering::Greater => (ChangeKind::RhythmElaborated, "elaborated"),
                std::cmp::Ordering::Equal => (ChangeKind::RhythmChanged, "changed"),
            };
            let before_text = old_pattern.join(", ");
            let after_text = new_pattern.join(", ");
            entries.push(
                DiffEntry::new(
                    DiffScope::Rhythm,
                    Location::measure(part, Some(&old_voice.id), old_measure.number),
                    kind,
                    format!("Rhythm {} from {} to {}", verb, before_text, after_text),
                )
                .with_values(before_text, after_text),
            );
        }
    }
    entries
}
