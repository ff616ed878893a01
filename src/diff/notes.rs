//! Note-level comparison and transposition grouping
//!
//! Notes are matched by (part, voice, measure, onset) within voices that
//! exist in both versions; whole parts and voices that appear or vanish are
//! reported by the structure stage instead.

use std::collections::{BTreeMap, BTreeSet};

use super::structure::shared_voices;
use super::{ChangeKind, DiffEntry, DiffScope, Location};
use crate::models::pitch::describe_shift;
use crate::models::time::{duration_name, Rational};
use crate::models::{NoteEvent, Score, TimeSignature, Voice};

/// A note statement plus the signed shift for pitch changes
#[derive(Debug, Clone)]
pub struct NoteChange {
    pub entry: DiffEntry,
    pub semitones: Option<i32>,
}

/// A group of pitch changes sharing one signed interval
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transposition {
    pub semitones: i32,
    pub count: usize,
}

type NoteMap<'a> = BTreeMap<(u32, Rational), (&'a NoteEvent, TimeSignature)>;

fn note_map(voice: &Voice) -> NoteMap<'_> {
    let mut map = BTreeMap::new();
    for measure in &voice.measures {
        for note in measure.notes() {
            map.insert((measure.number, note.onset), (note, measure.time_signature));
        }
    }
    map
}

fn spelled(note: &NoteEvent) -> String {
    format!("{} ({})", note.pitch, duration_name(&note.duration))
}

pub fn compare_notes(before: &Score, after: &Score) -> Vec<NoteChange> {
    let mut changes = Vec::new();

    for (part, old_voice, new_voice) in shared_voices(before, after) {
        let old_notes = note_map(old_voice);
        let new_notes = note_map(new_voice);
        let keys: BTreeSet<&(u32, Rational)> = old_notes.keys().chain(new_notes.keys()).collect();

        for key in keys {
            let (measure, onset) = *key;
            let change = match (old_notes.get(key), new_notes.get(key)) {
                (Some((old, time)), Some((new, _))) => {
                    let location = Location::event(part, &old_voice.id, measure, onset, time);
                    changed_note(location, old, new)
                }
                (None, Some((new, time))) => Some(NoteChange {
                    entry: DiffEntry::new(
                        DiffScope::Note,
                        Location::event(part, &old_voice.id, measure, onset, time),
                        ChangeKind::Added,
                        format!("Added {}", spelled(new)),
                    )
                    .with_values("", spelled(new)),
                    semitones: None,
                }),
                (Some((old, time)), None) => Some(NoteChange {
                    entry: DiffEntry::new(
                        DiffScope::Note,
                        Location::event(part, &old_voice.id, measure, onset, time),
                        ChangeKind::Removed,
                        format!("Removed {}", spelled(old)),
                    )
                    .with_values(spelled(old), ""),
                    semitones: None,
                }),
                (None, None) => None,
            };
            changes.extend(change);
        }
    }
    changes
}

fn changed_note(location: Location, old: &NoteEvent, new: &NoteEvent) -> Option<NoteChange> {
    let pitch_changed = old.pitch != new.pitch;
    let duration_changed = old.duration != new.duration;
    let shift = new.pitch.semitone_value() - old.pitch.semitone_value();

    let (kind, description, before, after) = match (pitch_changed, duration_changed) {
        (false, false) => return None,
        (true, false) if shift == 0 => (
            ChangeKind::Pitch,
            format!("Respelled {} as {}", old.pitch, new.pitch),
            old.pitch.to_string(),
            new.pitch.to_string(),
        ),
        (true, false) => (
            ChangeKind::Pitch,
            format!("Pitch changed from {} to {}, {}", old.pitch, new.pitch, describe_shift(shift)),
            old.pitch.to_string(),
            new.pitch.to_string(),
        ),
        (false, true) => (
            ChangeKind::Rhythm,
            format!(
                "{} changed from {} to {}",
                old.pitch,
                duration_name(&old.duration),
                duration_name(&new.duration)
            ),
            duration_name(&old.duration),
            duration_name(&new.duration),
        ),
        (true, true) => (
            ChangeKind::PitchRhythm,
            format!("Note changed from {} to {}, {}", spelled(old), spelled(new), describe_shift(shift)),
            spelled(old),
            spelled(new),
        ),
    };

    Some(NoteChange {
        entry: DiffEntry::new(DiffScope::Note, location, kind, description).with_values(before, after),
        semitones: pitch_changed.then_some(shift),
    })
}

/// Collapse plain pitch changes sharing one signed interval
///
/// Every interval with at least `min_notes` pitch changes becomes a
/// [`Transposition`] and its individual entries are dropped; everything
/// else is returned untouched.
pub fn group_transpositions(changes: Vec<NoteChange>, min_notes: usize) -> (Vec<DiffEntry>, Vec<Transposition>) {
    let mut counts: BTreeMap<i32, usize> = BTreeMap::new();
    for change in &changes {
        if let Some(shift) = transposable_shift(change) {
            *counts.entry(shift).or_default() += 1;
        }
    }
    let transpositions: Vec<Transposition> = counts
        .into_iter()
        .filter(|(_, count)| *count >= min_notes)
        .map(|(semitones, count)| Transposition { semitones, count })
        .collect();

    let remaining = changes
        .into_iter()
        .filter(|change| match transposable_shift(change) {
            Some(shift) => !transpositions.iter().any(|t| t.semitones == shift),
            None => true,
        })
        .map(|change| change.entry)
        .collect();

    if !transpositions.is_empty() {
        log::debug!("collapsed pitch changes into {} transposition(s)", transpositions.len());
    }
    (remaining, transpositions)
}

fn transposable_shift(change: &NoteChange) -> Option<i32> {
    match (change.entry.kind, change.semitones) {
        (ChangeKind::Pitch, Some(shift)) if shift != 0 => Some(shift),
        _ => None,
    }
}
