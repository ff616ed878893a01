//! Notation document tree
//!
//! The narrow view of an external notation file that the importer and
//! exporter work against: parts with their instruments, measures with
//! divisions and optional time and key markers, and elements placed at tick
//! offsets. Offsets and durations are integer ticks, `divisions` ticks per
//! quarter note, exactly as MusicXML stores them.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NotationDocument {
    pub title: Option<String>,
    pub composer: Option<String>,
    pub lyricist: Option<String>,
    pub parts: Vec<NotationPart>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NotationPart {
    pub id: String,
    pub name: String,
    /// Declared instrument names, in document order
    pub instruments: Vec<String>,
    pub measures: Vec<NotationMeasure>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotationMeasure {
    /// Measure number as written; not always numeric in the wild
    pub number: String,
    /// Ticks per quarter note in effect for this measure
    pub divisions: i64,
    /// Time signature declared in this measure, if any
    pub time: Option<(u32, u32)>,
    /// Key signature declared in this measure, if any
    pub key: Option<KeySignature>,
    pub elements: Vec<NotationElement>,
}

impl NotationMeasure {
    pub fn new(number: impl Into<String>, divisions: i64) -> Self {
        Self { number: number.into(), divisions, time: None, key: None, elements: Vec::new() }
    }
}

/// Key signature as a position on the circle of fifths plus optional mode
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeySignature {
    pub fifths: i32,
    pub mode: Option<String>,
}

const MAJOR_BY_FIFTHS: [&str; 15] =
    ["Cb", "Gb", "Db", "Ab", "Eb", "Bb", "F", "C", "G", "D", "A", "E", "B", "F#", "C#"];
const MINOR_BY_FIFTHS: [&str; 15] =
    ["Ab", "Eb", "Bb", "F", "C", "G", "D", "A", "E", "B", "F#", "C#", "G#", "D#", "A#"];

impl KeySignature {
    /// "D major", "F# minor"; `None` outside -7..=7 fifths
    pub fn name(&self) -> Option<String> {
        let index = usize::try_from(self.fifths + 7).ok().filter(|i| *i < 15)?;
        match self.mode.as_deref() {
            Some("minor") => Some(format!("{} minor", MINOR_BY_FIFTHS[index])),
            _ => Some(format!("{} major", MAJOR_BY_FIFTHS[index])),
        }
    }

    /// Parse a key name such as "D major", "Bb minor" or plain "G"
    pub fn from_name(name: &str) -> Option<KeySignature> {
        let mut words = name.split_whitespace();
        let tonic = words.next()?;
        let minor = matches!(words.next(), Some(mode) if mode.eq_ignore_ascii_case("minor") || mode == "min");
        let table = if minor { &MINOR_BY_FIFTHS } else { &MAJOR_BY_FIFTHS };
        let index = table.iter().position(|t| t.eq_ignore_ascii_case(tonic))?;
        Some(KeySignature {
            fifths: index as i32 - 7,
            mode: Some(if minor { "minor" } else { "major" }.to_string()),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotationElement {
    /// Voice tag as written; harmony usually carries none
    pub voice: Option<String>,
    /// Ticks from the start of the measure
    pub offset: i64,
    pub kind: ElementKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ElementKind {
    Note(NotationNote),
    Rest { duration: i64 },
    Harmony { symbol: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotationNote {
    pub step: char,
    /// Chromatic alteration in semitones; fractional for microtones
    pub alter: f64,
    pub octave: i32,
    pub duration: i64,
    pub tie_start: bool,
    pub tie_stop: bool,
    pub lyric: Option<String>,
    /// Sounds with the previous note (a chord tone)
    pub chord: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_names() {
        assert_eq!(KeySignature { fifths: 2, mode: None }.name().as_deref(), Some("D major"));
        assert_eq!(KeySignature { fifths: 3, mode: Some("minor".into()) }.name().as_deref(), Some("F# minor"));
        assert_eq!(KeySignature { fifths: 9, mode: None }.name(), None);
        assert_eq!(KeySignature::from_name("Bb major"), Some(KeySignature { fifths: -2, mode: Some("major".into()) }));
        assert_eq!(KeySignature::from_name("a minor").map(|k| k.fifths), Some(0));
        assert_eq!(KeySignature::from_name("H major"), None);
    }
}
