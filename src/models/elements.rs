//! Timed events inside a measure

use serde::{Deserialize, Serialize};
use std::fmt;

use super::pitch::Pitch;
use super::time::Rational;

/// Tie state carried by a note
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Tie {
    Start,
    Stop,
}

impl Tie {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tie::Start => "start",
            Tie::Stop => "stop",
        }
    }

    pub fn parse(text: &str) -> Option<Tie> {
        match text {
            "start" => Some(Tie::Start),
            "stop" => Some(Tie::Stop),
            _ => None,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct NoteEvent {
    pub onset: Rational,
    pub duration: Rational,
    pub pitch: Pitch,
    pub tie: Option<Tie>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct RestEvent {
    pub onset: Rational,
    pub duration: Rational,
}

/// Chord symbol, optionally labelled with the key it is heard in
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct HarmonyEvent {
    pub onset: Rational,
    pub symbol: String,
    pub key: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct LyricEvent {
    pub onset: Rational,
    pub text: String,
}

/// One timed occurrence within a measure
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Event {
    Note(NoteEvent),
    Rest(RestEvent),
    Harmony(HarmonyEvent),
    Lyric(LyricEvent),
}

/// Discriminant of an [`Event`], used by indexes and reports
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Note,
    Rest,
    Harmony,
    Lyric,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Note => "note",
            EventKind::Rest => "rest",
            EventKind::Harmony => "harmony",
            EventKind::Lyric => "lyric",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Event {
    pub fn onset(&self) -> Rational {
        match self {
            Event::Note(n) => n.onset,
            Event::Rest(r) => r.onset,
            Event::Harmony(h) => h.onset,
            Event::Lyric(l) => l.onset,
        }
    }

    /// Duration of notes and rests; harmony and lyric events occupy no time
    pub fn duration(&self) -> Option<Rational> {
        match self {
            Event::Note(n) => Some(n.duration),
            Event::Rest(r) => Some(r.duration),
            Event::Harmony(_) | Event::Lyric(_) => None,
        }
    }

    pub fn kind(&self) -> EventKind {
        match self {
            Event::Note(_) => EventKind::Note,
            Event::Rest(_) => EventKind::Rest,
            Event::Harmony(_) => EventKind::Harmony,
            Event::Lyric(_) => EventKind::Lyric,
        }
    }

    pub fn as_note(&self) -> Option<&NoteEvent> {
        match self {
            Event::Note(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_harmony(&self) -> Option<&HarmonyEvent> {
        match self {
            Event::Harmony(h) => Some(h),
            _ => None,
        }
    }
}
