//! Per-category checks
//!
//! Both scores are walked in canonical order and paired measure by measure.
//! Each check returns its violations as user-facing sentences; an empty list
//! means the category's constraints hold.

use std::collections::BTreeSet;

use num_traits::CheckedSub;

use crate::diff::beat_label;
use crate::models::integrity::find_overlaps;
use crate::models::time::{checked_sum, duration_name, Rational};
use crate::models::{Event, Measure, NoteEvent, Part, Pitch, Score, Voice};

struct MeasurePair<'a> {
    part: &'a Part,
    voice: &'a Voice,
    new_part: &'a Part,
    new_voice: &'a Voice,
    original: &'a Measure,
    transformed: &'a Measure,
}

impl MeasurePair<'_> {
    fn label(&self) -> String {
        format!("{} voice {}, measure {}", self.part.name, self.voice.id, self.original.number)
    }

    fn note_label(&self, note: &NoteEvent) -> String {
        format!("{} ({})", self.label(), beat_label(&note.onset, &self.original.time_signature))
    }
}

/// Pair measures of both scores in canonical order, reporting every
/// structural mismatch as a violation prefixed with `subject`
fn align<'a>(original: &'a Score, transformed: &'a Score, subject: &str) -> (Vec<MeasurePair<'a>>, Vec<String>) {
    let mut pairs = Vec::new();
    let mut violations = Vec::new();

    let original_parts = original.sorted_parts();
    let transformed_parts = transformed.sorted_parts();
    if original_parts.len() != transformed_parts.len() {
        violations.push(format!(
            "{} changed the number of parts from {} to {}",
            subject,
            original_parts.len(),
            transformed_parts.len()
        ));
        return (pairs, violations);
    }

    for (old_part, new_part) in original_parts.into_iter().zip(transformed_parts) {
        let old_voices = old_part.sorted_voices();
        let new_voices = new_part.sorted_voices();
        if old_voices.len() != new_voices.len() {
            violations.push(format!(
                "{} changed the number of voices in {} from {} to {}",
                subject,
                old_part.name,
                old_voices.len(),
                new_voices.len()
            ));
            continue;
        }
        for (old_voice, new_voice) in old_voices.into_iter().zip(new_voices) {
            let old_measures = old_voice.sorted_measures();
            let new_measures = new_voice.sorted_measures();
            if old_measures.len() != new_measures.len() {
                violations.push(format!(
                    "{} changed the number of measures in {} voice {} from {} to {}",
                    subject,
                    old_part.name,
                    old_voice.id,
                    old_measures.len(),
                    new_measures.len()
                ));
                continue;
            }
            for (old_measure, new_measure) in old_measures.into_iter().zip(new_measures) {
                pairs.push(MeasurePair {
                    part: old_part,
                    voice: old_voice,
                    new_part,
                    new_voice,
                    original: old_measure,
                    transformed: new_measure,
                });
            }
        }
    }
    (pairs, violations)
}

/// Same structure and timing; one semitone shift shared by every note
pub fn check_transpose(original: &Score, transformed: &Score) -> Vec<String> {
    let (pairs, mut violations) = align(original, transformed, "Transposition");
    let mut shifts = BTreeSet::new();

    for pair in &pairs {
        let old_notes = pair.original.notes();
        let new_notes = pair.transformed.notes();
        if old_notes.len() != new_notes.len() {
            violations.push(format!(
                "Transposition changed the number of notes in {} from {} to {}",
                pair.label(),
                old_notes.len(),
                new_notes.len()
            ));
            continue;
        }
        for (old, new) in old_notes.iter().zip(&new_notes) {
            if old.onset != new.onset || old.duration != new.duration {
                violations.push(format!("Transposition changed the timing of the note at {}", pair.note_label(old)));
            }
            shifts.insert(new.pitch.semitone_value() - old.pitch.semitone_value());
        }
    }

    if shifts.len() > 1 {
        let listed: Vec<String> = shifts.iter().map(|s| s.to_string()).collect();
        violations.push(format!(
            "Transposition is inconsistent: notes move by {} semitones instead of one shared interval",
            listed.join(", ")
        ));
    }
    violations
}

/// Pitch sequence with consecutive repeats merged
fn merged_pitches(notes: &[&NoteEvent]) -> Vec<Pitch> {
    let mut pitches: Vec<Pitch> = notes.iter().map(|n| n.pitch).collect();
    pitches.dedup();
    pitches
}

/// Same pitch line per measure; filled length kept within `tolerance`
pub fn check_rhythm_simplify(original: &Score, transformed: &Score, tolerance: Rational) -> Vec<String> {
    let (pairs, mut violations) = align(original, transformed, "Rhythm simplification");

    for pair in &pairs {
        let old_notes = pair.original.notes();
        let new_notes = pair.transformed.notes();
        if merged_pitches(&old_notes) != merged_pitches(&new_notes) {
            violations.push(format!("Rhythm simplification changed the pitches in {}", pair.label()));
        }

        let old_total = checked_sum(old_notes.iter().map(|n| n.duration));
        let new_total = checked_sum(new_notes.iter().map(|n| n.duration));
        let (Some(old_total), Some(new_total)) = (old_total, new_total) else {
            violations.push(format!(
                "Rhythm simplification left note lengths in {} that cannot be summed",
                pair.label()
            ));
            continue;
        };
        let drift = if old_total > new_total {
            old_total.checked_sub(&new_total)
        } else {
            new_total.checked_sub(&old_total)
        };
        if drift.map_or(true, |drift| drift > tolerance) {
            violations.push(format!(
                "Rhythm simplification changed the sounding length of {} from {} to {}",
                pair.label(),
                duration_name(&old_total),
                duration_name(&new_total)
            ));
        }
    }
    violations
}

/// Part count and total measure count kept
pub fn check_style_change(original: &Score, transformed: &Score) -> Vec<String> {
    let mut violations = Vec::new();
    if original.parts.len() != transformed.parts.len() {
        violations.push(format!(
            "Style change changed the number of parts from {} to {}",
            original.parts.len(),
            transformed.parts.len()
        ));
    }
    let old_measures = original.walk_measures().len();
    let new_measures = transformed.walk_measures().len();
    if old_measures != new_measures {
        violations.push(format!(
            "Style change changed the total number of measures from {} to {}",
            old_measures, new_measures
        ));
    }
    violations
}

/// Rests and lyrics of a measure in onset order
fn fixed_events(measure: &Measure) -> (Vec<&Event>, Vec<&Event>) {
    measure
        .sorted_events()
        .into_iter()
        .filter(|e| matches!(e, Event::Rest(_) | Event::Lyric(_)))
        .partition(|e| matches!(e, Event::Rest(_)))
}

/// Names, roles, voice ids, measure numbers and time signatures of one pair
fn frame_changes(pair: &MeasurePair, subject: &str, reported: &mut BTreeSet<String>) -> Vec<String> {
    let mut changes = Vec::new();
    let part_key = format!("part {}", pair.part.name);
    if !reported.contains(&part_key) {
        if pair.part.name != pair.new_part.name {
            changes.push(format!("{} renamed part {} to {}", subject, pair.part.name, pair.new_part.name));
        }
        if pair.part.role != pair.new_part.role {
            changes.push(format!(
                "{} changed the role of {} from {} to {}",
                subject, pair.part.name, pair.part.role, pair.new_part.role
            ));
        }
        reported.insert(part_key);
    }
    let voice_key = format!("voice {} {}", pair.part.name, pair.voice.id);
    if !reported.contains(&voice_key) {
        if pair.voice.id != pair.new_voice.id {
            changes.push(format!(
                "{} renamed voice {} of {} to {}",
                subject, pair.voice.id, pair.part.name, pair.new_voice.id
            ));
        }
        reported.insert(voice_key);
    }
    if pair.original.number != pair.transformed.number {
        changes.push(format!(
            "{} renumbered {} to measure {}",
            subject,
            pair.label(),
            pair.transformed.number
        ));
    }
    if pair.original.time_signature != pair.transformed.time_signature {
        changes.push(format!(
            "{} changed the time signature of {} from {} to {}",
            subject,
            pair.label(),
            pair.original.time_signature,
            pair.transformed.time_signature
        ));
    }
    changes
}

/// Everything but harmony identical: frame, notes, rests and lyrics
pub fn check_harmonic_reharm(original: &Score, transformed: &Score) -> Vec<String> {
    let (pairs, mut violations) = align(original, transformed, "Reharmonization");
    let mut reported = BTreeSet::new();

    for pair in &pairs {
        violations.extend(frame_changes(pair, "Reharmonization", &mut reported));

        let (old_rests, old_lyrics) = fixed_events(pair.original);
        let (new_rests, new_lyrics) = fixed_events(pair.transformed);
        if old_rests != new_rests {
            violations.push(format!("Reharmonization changed the rests in {}", pair.label()));
        }
        if old_lyrics != new_lyrics {
            violations.push(format!("Reharmonization changed the lyrics in {}", pair.label()));
        }

        let old_notes = pair.original.notes();
        let new_notes = pair.transformed.notes();
        if old_notes.len() != new_notes.len() {
            violations.push(format!(
                "Reharmonization changed the melody in {}: {} notes became {}",
                pair.label(),
                old_notes.len(),
                new_notes.len()
            ));
            continue;
        }
        for (old, new) in old_notes.iter().zip(&new_notes) {
            if old.onset != new.onset || old.duration != new.duration || old.pitch != new.pitch {
                violations.push(format!(
                    "Reharmonization changed the melody at {}: {} ({}) became {} ({})",
                    pair.note_label(old),
                    old.pitch,
                    duration_name(&old.duration),
                    new.pitch,
                    duration_name(&new.duration)
                ));
            }
        }
    }
    violations
}

/// No overlapping notes or rests anywhere in the transformed score
pub fn check_overlaps(transformed: &Score) -> Vec<String> {
    let mut violations = Vec::new();
    for (part, voice, measure) in transformed.walk_measures() {
        for problem in find_overlaps(measure) {
            violations.push(format!(
                "Transformed score has overlapping events in {} voice {}, measure {}: {}",
                part.name, voice.id, measure.number, problem
            ));
        }
    }
    violations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::time::ratio;
    use crate::parse::parse_text;

    fn one_measure(events: &str) -> Score {
        parse_text(&format!("PART Soprano ROLE choir\nVOICE 1\nMEASURE 1 TIME 4/4\n{}", events)).unwrap()
    }

    #[test]
    fn test_rhythm_simplify_merges_repeated_pitches() {
        let original =
            one_measure("NOTE t=0 dur=1/4 pitch=C4\nNOTE t=1/4 dur=1/4 pitch=C4\nNOTE t=1/2 dur=1/2 pitch=E4\n");
        let simplified = one_measure("NOTE t=0 dur=1/2 pitch=C4\nNOTE t=1/2 dur=1/2 pitch=E4\n");
        assert!(check_rhythm_simplify(&original, &simplified, ratio(1, 32)).is_empty());

        let shortened = one_measure("NOTE t=0 dur=1/2 pitch=C4\nNOTE t=1/2 dur=1/4 pitch=E4\n");
        let violations = check_rhythm_simplify(&original, &shortened, ratio(1, 32));
        assert_eq!(violations.len(), 1);
        assert!(violations[0].contains("sounding length"));

        let repitched = one_measure("NOTE t=0 dur=1/2 pitch=D4\nNOTE t=1/2 dur=1/2 pitch=E4\n");
        assert_eq!(check_rhythm_simplify(&original, &repitched, ratio(1, 32)).len(), 1);
    }

    #[test]
    fn test_transpose_timing_change_is_reported() {
        let original = one_measure("NOTE t=0 dur=1/2 pitch=C4\nNOTE t=1/2 dur=1/2 pitch=E4\n");
        let moved = one_measure("NOTE t=0 dur=1/4 pitch=D4\nNOTE t=1/2 dur=1/2 pitch=F#4\n");
        let violations = check_transpose(&original, &moved);
        assert_eq!(
            violations,
            vec!["Transposition changed the timing of the note at Soprano voice 1, measure 1 (beat 1)"]
        );
    }

    #[test]
    fn test_style_change_counts() {
        let original = one_measure("REST t=0 dur=1\n");
        let longer = parse_text(
            "PART Soprano ROLE choir\nVOICE 1\nMEASURE 1 TIME 4/4\nREST t=0 dur=1\nMEASURE 2 TIME 4/4\n\
             REST t=0 dur=1\n",
        )
        .unwrap();
        assert!(check_style_change(&original, &original).is_empty());
        assert_eq!(check_style_change(&original, &longer).len(), 1);
    }

    #[test]
    fn test_reharm_keeps_everything_but_harmony() {
        let original = one_measure(
            "HARMONY t=0 symbol=C\nNOTE t=0 dur=1/4 pitch=C4\nREST t=1/4 dur=3/4\nLYRIC t=0 text=la\n",
        );
        let reharmonized = one_measure(
            "HARMONY t=0 symbol=Am\nHARMONY t=1/2 symbol=F\nNOTE t=0 dur=1/4 pitch=C4\nREST t=1/4 dur=3/4\n\
             LYRIC t=0 text=la\n",
        );
        assert!(check_harmonic_reharm(&original, &reharmonized).is_empty());

        let rewritten = parse_text(
            "PART Alto ROLE instrument\nVOICE 7\nMEASURE 9 TIME 3/4\nHARMONY t=1/2 symbol=Am\n\
             NOTE t=0 dur=1/4 pitch=C4\nLYRIC t=0 text=other words\n",
        )
        .unwrap();
        let violations = check_harmonic_reharm(&original, &rewritten);
        for expected in ["renamed part", "role", "renamed voice", "renumbered", "time signature", "rests", "lyrics"] {
            assert!(violations.iter().any(|v| v.contains(expected)), "no '{}' in {:?}", expected, violations);
        }
    }
}
