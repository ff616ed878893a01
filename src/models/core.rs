//! Score tree: Score -> Part -> Voice -> Measure -> Event
//!
//! Trees are plain values. Importers and the text parser build them whole;
//! every later stage borrows them and produces new values instead of
//! editing in place.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::elements::{Event, NoteEvent};
use super::time::TimeSignature;

/// Descriptive metadata; all of it optional
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct Metadata {
    pub title: Option<String>,
    pub composer: Option<String>,
    pub lyricist: Option<String>,
}

/// Whether a part is sung or played
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PartRole {
    Choir,
    #[default]
    Instrument,
}

impl PartRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            PartRole::Choir => "choir",
            PartRole::Instrument => "instrument",
        }
    }

    pub fn parse(text: &str) -> Option<PartRole> {
        match text {
            "choir" => Some(PartRole::Choir),
            "instrument" => Some(PartRole::Instrument),
            _ => None,
        }
    }
}

impl fmt::Display for PartRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Measure {
    pub number: u32,
    pub time_signature: TimeSignature,
    pub events: Vec<Event>,
}

impl Measure {
    pub fn new(number: u32, time_signature: TimeSignature) -> Self {
        Self { number, time_signature, events: Vec::new() }
    }

    /// Events sorted by onset; events sharing an onset keep their order
    pub fn sorted_events(&self) -> Vec<&Event> {
        let mut events: Vec<&Event> = self.events.iter().collect();
        events.sort_by_key(|e| e.onset());
        events
    }

    /// Notes sorted by onset
    pub fn notes(&self) -> Vec<&NoteEvent> {
        self.sorted_events().into_iter().filter_map(Event::as_note).collect()
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Voice {
    pub id: String,
    pub measures: Vec<Measure>,
}

impl Voice {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into(), measures: Vec::new() }
    }

    pub fn sorted_measures(&self) -> Vec<&Measure> {
        let mut measures: Vec<&Measure> = self.measures.iter().collect();
        measures.sort_by_key(|m| m.number);
        measures
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Part {
    pub id: String,
    pub name: String,
    pub role: PartRole,
    pub voices: Vec<Voice>,
}

impl Part {
    pub fn new(id: impl Into<String>, name: impl Into<String>, role: PartRole) -> Self {
        Self { id: id.into(), name: name.into(), role, voices: Vec::new() }
    }

    pub fn sorted_voices(&self) -> Vec<&Voice> {
        let mut voices: Vec<&Voice> = self.voices.iter().collect();
        voices.sort_by(|a, b| a.id.cmp(&b.id));
        voices
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct Score {
    pub metadata: Metadata,
    pub parts: Vec<Part>,
}

impl Score {
    pub fn new(parts: Vec<Part>) -> Self {
        Self { metadata: Metadata::default(), parts }
    }

    pub fn sorted_parts(&self) -> Vec<&Part> {
        let mut parts: Vec<&Part> = self.parts.iter().collect();
        parts.sort_by(|a, b| a.name.cmp(&b.name));
        parts
    }

    /// Copy of this score in canonical order: parts by name, voices by id,
    /// measures by number, events by onset (stable)
    pub fn canonical(&self) -> Score {
        let parts = self
            .sorted_parts()
            .into_iter()
            .map(|part| Part {
                id: part.id.clone(),
                name: part.name.clone(),
                role: part.role,
                voices: part
                    .sorted_voices()
                    .into_iter()
                    .map(|voice| Voice {
                        id: voice.id.clone(),
                        measures: voice
                            .sorted_measures()
                            .into_iter()
                            .map(|measure| Measure {
                                number: measure.number,
                                time_signature: measure.time_signature,
                                events: measure.sorted_events().into_iter().cloned().collect(),
                            })
                            .collect(),
                    })
                    .collect(),
            })
            .collect();
        Score { metadata: self.metadata.clone(), parts }
    }

    /// Walk every measure in canonical order
    pub fn walk_measures(&self) -> Vec<(&Part, &Voice, &Measure)> {
        let mut out = Vec::new();
        for part in self.sorted_parts() {
            for voice in part.sorted_voices() {
                for measure in voice.sorted_measures() {
                    out.push((part, voice, measure));
                }
            }
        }
        out
    }

    /// Every note in canonical order
    pub fn notes(&self) -> Vec<&NoteEvent> {
        self.walk_measures()
            .into_iter()
            .flat_map(|(_, _, measure)| measure.notes())
            .collect()
    }

    pub fn event_count(&self) -> usize {
        self.parts
            .iter()
            .flat_map(|p| &p.voices)
            .flat_map(|v| &v.measures)
            .map(|m| m.events.len())
            .sum()
    }
}
