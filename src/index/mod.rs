//! Stable integer ids for every event of a score
//!
//! Ids are assigned 1..N walking the canonical order (parts by name, voices
//! by id, measures by number, events by onset), so the same score always
//! produces the same ids. The index borrows the score and keeps an arena of
//! paths into it; events themselves carry no identity. Indexing a different
//! tree starts a fresh id space.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::models::{Event, EventKind, Score};

pub type EventId = usize;

/// Where an event lives, by name and number
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventLocation {
    pub part: String,
    pub voice: String,
    pub measure: u32,
    pub kind: EventKind,
}

/// Indices into `Score::parts[..].voices[..].measures[..].events[..]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct EventPath {
    part: usize,
    voice: usize,
    measure: usize,
    event: usize,
}

pub struct EventIndex<'a> {
    score: &'a Score,
    paths: Vec<EventPath>,
    hierarchy: BTreeMap<EventId, EventLocation>,
    by_part: BTreeMap<String, Vec<EventId>>,
    by_voice: BTreeMap<(String, String), Vec<EventId>>,
    by_measure: BTreeMap<(String, String, u32), Vec<EventId>>,
}

impl<'a> EventIndex<'a> {
    pub fn build(score: &'a Score) -> Self {
        let mut index = Self {
            score,
            paths: Vec::new(),
            hierarchy: BTreeMap::new(),
            by_part: BTreeMap::new(),
            by_voice: BTreeMap::new(),
            by_measure: BTreeMap::new(),
        };

        for part_idx in sorted_indices(&score.parts, |a, b| a.name.cmp(&b.name)) {
            let part = &score.parts[part_idx];
            for voice_idx in sorted_indices(&part.voices, |a, b| a.id.cmp(&b.id)) {
                let voice = &part.voices[voice_idx];
                for measure_idx in sorted_indices(&voice.measures, |a, b| a.number.cmp(&b.number)) {
                    let measure = &voice.measures[measure_idx];
                    for event_idx in sorted_indices(&measure.events, |a, b| a.onset().cmp(&b.onset())) {
                        let path =
                            EventPath { part: part_idx, voice: voice_idx, measure: measure_idx, event: event_idx };
                        index.insert(path);
                    }
                }
            }
        }
        log::debug!("indexed {} events", index.len());
        index
    }

    fn insert(&mut self, path: EventPath) {
        self.paths.push(path);
        let id = self.paths.len();

        let part = &self.score.parts[path.part];
        let voice = &part.voices[path.voice];
        let measure = &voice.measures[path.measure];
        let event = &measure.events[path.event];

        self.hierarchy.insert(
            id,
            EventLocation {
                part: part.name.clone(),
                voice: voice.id.clone(),
                measure: measure.number,
                kind: event.kind(),
            },
        );
        self.by_part.entry(part.name.clone()).or_default().push(id);
        self.by_voice.entry((part.name.clone(), voice.id.clone())).or_default().push(id);
        self.by_measure
            .entry((part.name.clone(), voice.id.clone(), measure.number))
            .or_default()
            .push(id);
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// The event behind an id
    pub fn get(&self, id: EventId) -> Option<&'a Event> {
        let path = self.paths.get(id.checked_sub(1)?)?;
        let score: &'a Score = self.score;
        Some(&score.parts[path.part].voices[path.voice].measures[path.measure].events[path.event])
    }

    pub fn location(&self, id: EventId) -> Option<&EventLocation> {
        self.hierarchy.get(&id)
    }

    /// Flat id -> location map
    pub fn hierarchy(&self) -> &BTreeMap<EventId, EventLocation> {
        &self.hierarchy
    }

    pub fn by_part(&self, part: &str) -> &[EventId] {
        self.by_part.get(part).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn by_voice(&self, part: &str, voice: &str) -> &[EventId] {
        self.by_voice
            .get(&(part.to_string(), voice.to_string()))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn by_measure(&self, part: &str, voice: &str, measure: u32) -> &[EventId] {
        self.by_measure
            .get(&(part.to_string(), voice.to_string(), measure))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// User-facing reference, e.g. "Soprano - Voice 1 - Measure 3 - Event 17"
    pub fn describe(&self, id: EventId) -> Option<String> {
        self.location(id)
            .map(|loc| format!("{} - Voice {} - Measure {} - Event {}", loc.part, loc.voice, loc.measure, id))
    }
}

/// Positions of `items` in sorted order (stable)
fn sorted_indices<T>(items: &[T], compare: impl Fn(&T, &T) -> std::cmp::Ordering) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..items.len()).collect();
    indices.sort_by(|&a, &b| compare(&items[a], &items[b]));
    indices
}
