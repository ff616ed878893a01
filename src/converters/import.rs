//! Notation document to Score
//!
//! Import is fail-soft below the file boundary: a measure or a single
//! voice-measure that cannot be mapped is left out and recorded as a
//! [`SkippedElement`], and everything else is kept.
//!
//! Free text is normalized on the way in so every imported score can be
//! written in the text form: chord symbols and voice tags lose their
//! whitespace, names and lyrics have theirs collapsed.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use super::errors::{ImportError, ImportResult};
use super::musicxml::{
    ElementKind, MusicXmlAdapter, NotationAdapter, NotationDocument, NotationElement, NotationMeasure, NotationPart,
};
use crate::config::ImportSettings;
use crate::models::integrity::check_measure;
use crate::models::pitch::NOTATED_OCTAVES;
use crate::models::time::{in_time_range, ratio, Rational, TimeSignature, MAX_DENOMINATOR};
use crate::models::{
    Event, HarmonyEvent, LyricEvent, Measure, Metadata, NoteEvent, Part, PartRole, Pitch, RestEvent, Score, Step,
    Tie, Voice,
};
use crate::utils::{collapse_whitespace, strip_whitespace};

/// Voice used for elements that carry no voice tag
const DEFAULT_VOICE: &str = "1";

/// Content left out of an import, and why
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedElement {
    /// "part", "measure", "voice-measure" or "chord-tone"
    pub element_type: String,
    pub part_id: String,
    /// Measure number as written in the source
    pub measure_number: Option<String>,
    pub voice: Option<String>,
    pub reason: String,
}

/// An imported score plus everything that had to be skipped
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportReport {
    pub score: Score,
    pub skipped: Vec<SkippedElement>,
}

impl ImportReport {
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// Read and import a MusicXML file
pub fn import_musicxml_file(path: impl AsRef<Path>, settings: &ImportSettings) -> ImportResult<ImportReport> {
    let path = path.as_ref();
    let xml = std::fs::read_to_string(path)
        .map_err(|source| ImportError::Io { path: path.display().to_string(), source })?;
    import_musicxml_str(&xml, settings)
}

pub fn import_musicxml_str(xml: &str, settings: &ImportSettings) -> ImportResult<ImportReport> {
    let document = MusicXmlAdapter.read(xml)?;
    Ok(import_document(&document, settings))
}

pub fn import_document(document: &NotationDocument, settings: &ImportSettings) -> ImportReport {
    let mut importer = Importer { settings, skipped: Vec::new() };
    let parts = document.parts.iter().filter_map(|part| importer.import_part(part)).collect();

    let score = Score {
        metadata: Metadata {
            title: document.title.clone(),
            composer: document.composer.clone(),
            lyricist: document.lyricist.clone(),
        },
        parts,
    };
    log::debug!(
        "imported {} part(s), {} event(s), {} skip(s)",
        score.parts.len(),
        score.event_count(),
        importer.skipped.len()
    );
    ImportReport { score, skipped: importer.skipped }
}

/// Sung when any declared instrument names a vocal keyword; with no
/// instruments declared the part name decides
pub fn infer_role(part: &NotationPart, settings: &ImportSettings) -> PartRole {
    let names: Vec<String> = if part.instruments.is_empty() {
        vec![part.name.to_lowercase()]
    } else {
        part.instruments.iter().map(|i| i.to_lowercase()).collect()
    };
    let vocal = names
        .iter()
        .any(|name| settings.vocal_keywords.iter().any(|keyword| name.contains(keyword.as_str())));
    if vocal {
        PartRole::Choir
    } else {
        PartRole::Instrument
    }
}

struct Importer<'s> {
    settings: &'s ImportSettings,
    skipped: Vec<SkippedElement>,
}

impl Importer<'_> {
    fn skip(
        &mut self,
        element_type: &str,
        part: &NotationPart,
        measure: Option<&str>,
        voice: Option<&str>,
        reason: String,
    ) {
        log::warn!(
            "skipping {} (part {}, measure {}, voice {}): {}",
            element_type,
            part.id,
            measure.unwrap_or("-"),
            voice.unwrap_or("-"),
            reason
        );
        self.skipped.push(SkippedElement {
            element_type: element_type.to_string(),
            part_id: part.id.clone(),
            measure_number: measure.map(str::to_string),
            voice: voice.map(str::to_string),
            reason,
        });
    }

    fn import_part(&mut self, source: &NotationPart) -> Option<Part> {
        let name = match collapse_whitespace(&source.name) {
            name if name.is_empty() => collapse_whitespace(&source.id),
            name => name,
        };
        let mut part = Part::new(source.id.clone(), name, infer_role(source, self.settings));

        let mut voices: BTreeMap<String, Voice> = BTreeMap::new();
        let mut seen_numbers = HashSet::new();
        let mut time_signature = TimeSignature::common();
        let mut key: Option<String> = None;

        for measure in &source.measures {
            if let Some((numerator, denominator)) = measure.time {
                if numerator > 0 && denominator > 0 {
                    time_signature = TimeSignature::new(numerator, denominator);
                } else {
                    log::warn!("ignoring time signature {}/{} in part {}", numerator, denominator, source.id);
                }
            }
            if let Some(signature) = &measure.key {
                key = signature.name();
            }

            let written = Some(measure.number.as_str());
            let Ok(number) = measure.number.trim().parse::<u32>() else {
                self.skip("measure", source, written, None, "measure number is not a whole number".into());
                continue;
            };
            if !seen_numbers.insert(number) {
                self.skip("measure", source, written, None, format!("measure {} appears twice", number));
                continue;
            }
            if measure.divisions <= 0 {
                self.skip("measure", source, written, None, "divisions must be positive".into());
                continue;
            }
            let Some(ticks_per_whole) = measure.divisions.checked_mul(4) else {
                self.skip("measure", source, written, None, format!("divisions {} are too large", measure.divisions));
                continue;
            };

            let context = MeasureContext { number, time_signature, ticks_per_whole, key: key.as_deref() };
            for (voice_id, built) in self.import_measure(source, measure, &context) {
                voices.entry(voice_id.clone()).or_insert_with(|| Voice::new(voice_id)).measures.push(built);
            }
        }

        part.voices = voices.into_values().filter(|v| !v.measures.is_empty()).collect();
        if part.voices.is_empty() {
            self.skip("part", source, None, None, "no measure could be imported".into());
            return None;
        }
        Some(part)
    }

    /// One Measure per voice tag; failed voice-measures are recorded and left out
    fn import_measure(
        &mut self,
        part: &NotationPart,
        source: &NotationMeasure,
        context: &MeasureContext,
    ) -> Vec<(String, Measure)> {
        let note_voice = source
            .elements
            .iter()
            .filter(|e| !matches!(e.kind, ElementKind::Harmony { .. }))
            .filter_map(voice_tag)
            .min();
        let harmony_voice = note_voice.unwrap_or_else(|| DEFAULT_VOICE.to_string());

        let mut grouped: BTreeMap<String, Result<Measure, String>> = BTreeMap::new();
        for element in &source.elements {
            let voice = match (voice_tag(element), &element.kind) {
                (Some(voice), _) => voice,
                (None, ElementKind::Harmony { .. }) => harmony_voice.clone(),
                (None, _) => DEFAULT_VOICE.to_string(),
            };
            if let ElementKind::Note(note) = &element.kind {
                if note.chord {
                    let reason = format!(
                        "chord tone {}{} at tick {} dropped; a voice holds one note at a time",
                        note.step, note.octave, element.offset
                    );
                    self.skip("chord-tone", part, Some(&source.number), Some(&voice), reason);
                    continue;
                }
            }
            let slot = grouped
                .entry(voice)
                .or_insert_with(|| Ok(Measure::new(context.number, context.time_signature)));
            if slot.is_err() {
                continue;
            }
            match map_element(element, context.ticks_per_whole, context.key) {
                Ok(events) => {
                    if let Ok(measure) = slot.as_mut() {
                        measure.events.extend(events);
                    }
                }
                Err(reason) => *slot = Err(reason),
            }
        }

        let mut imported = Vec::new();
        for (voice, result) in grouped {
            let checked = result.and_then(|measure| {
                match check_measure(&measure, self.settings.strict_measure_capacity).first() {
                    Some(problem) => Err(problem.to_string()),
                    None => Ok(measure),
                }
            });
            match checked {
                Ok(measure) => imported.push((voice, measure)),
                Err(reason) => self.skip("voice-measure", part, Some(&source.number), Some(&voice), reason),
            }
        }
        imported
    }
}

/// Where a measure sits and what it inherits from the measures before it
struct MeasureContext<'k> {
    number: u32,
    time_signature: TimeSignature,
    ticks_per_whole: i64,
    key: Option<&'k str>,
}

/// Voice tag without whitespace; blank tags count as untagged
fn voice_tag(element: &NotationElement) -> Option<String> {
    element.voice.as_deref().map(strip_whitespace).filter(|v| !v.is_empty())
}

/// Ticks as whole notes, refused when finer or larger than measure
/// arithmetic is kept to
fn to_time(ticks: i64, ticks_per_whole: i64) -> Result<Rational, String> {
    let value = ratio(ticks, ticks_per_whole);
    if !in_time_range(&value) {
        return Err(format!(
            "{} ticks at {} per whole note is out of range (finest value 1/{})",
            ticks, ticks_per_whole, MAX_DENOMINATOR
        ));
    }
    Ok(value)
}

/// Events for one element: a note with its lyric, a rest, or a chord symbol
fn map_element(element: &NotationElement, ticks_per_whole: i64, key: Option<&str>) -> Result<Vec<Event>, String> {
    if element.offset < 0 {
        return Err(format!("element placed before the start of the measure ({} ticks)", element.offset));
    }
    let onset = to_time(element.offset, ticks_per_whole)?;

    match &element.kind {
        ElementKind::Note(note) => {
            if note.duration <= 0 {
                return Err(format!("note at tick {} has no duration", element.offset));
            }
            let tie = if note.tie_start {
                Some(Tie::Start)
            } else if note.tie_stop {
                Some(Tie::Stop)
            } else {
                None
            };
            let mut events = vec![Event::Note(NoteEvent {
                onset,
                duration: to_time(note.duration, ticks_per_whole)?,
                pitch: map_pitch(note.step, note.alter, note.octave)?,
                tie,
            })];
            let lyric = note.lyric.as_deref().map(collapse_whitespace).filter(|t| !t.is_empty());
            if let Some(text) = lyric {
                events.push(Event::Lyric(LyricEvent { onset, text }));
            }
            Ok(events)
        }
        ElementKind::Rest { duration } => {
            if *duration <= 0 {
                return Err(format!("rest at tick {} has no duration", element.offset));
            }
            Ok(vec![Event::Rest(RestEvent { onset, duration: to_time(*duration, ticks_per_whole)? })])
        }
        ElementKind::Harmony { symbol } => {
            let symbol = strip_whitespace(symbol);
            if symbol.is_empty() {
                return Err(format!("chord symbol at tick {} is blank", element.offset));
            }
            Ok(vec![Event::Harmony(HarmonyEvent {
                onset,
                symbol,
                key: key.map(collapse_whitespace).filter(|k| !k.is_empty()),
            })])
        }
    }
}

/// Nearest whole-semitone alteration; only double flat to double sharp
fn map_pitch(step: char, alter: f64, octave: i32) -> Result<Pitch, String> {
    let step = Step::from_char(step.to_ascii_uppercase()).ok_or_else(|| format!("'{}' is not a pitch step", step))?;
    let rounded = alter.round();
    if !(-2.0..=2.0).contains(&rounded) {
        return Err(format!("accidental of {} semitones cannot be represented", alter));
    }
    let (lowest, highest) = (NOTATED_OCTAVES.start(), NOTATED_OCTAVES.end());
    let octave = i8::try_from(octave)
        .ok()
        .filter(|o| NOTATED_OCTAVES.contains(o))
        .ok_or_else(|| format!("octave {} is outside {} to {}", octave, lowest, highest))?;
    Ok(Pitch::new(step, rounded as i8, octave))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converters::musicxml::NotationNote;

    fn note(voice: &str, offset: i64, step: char, duration: i64) -> NotationElement {
        NotationElement {
            voice: Some(voice.to_string()),
            offset,
            kind: ElementKind::Note(NotationNote {
                step,
                alter: 0.0,
                octave: 4,
                duration,
                tie_start: false,
                tie_stop: false,
                lyric: None,
                chord: false,
            }),
        }
    }

    fn part(name: &str, instruments: &[&str], measures: Vec<NotationMeasure>) -> NotationPart {
        NotationPart {
            id: "P1".to_string(),
            name: name.to_string(),
            instruments: instruments.iter().map(|s| s.to_string()).collect(),
            measures,
        }
    }

    #[test]
    fn test_role_inference() {
        let settings = ImportSettings::default();
        assert_eq!(infer_role(&part("Soprano", &[], vec![]), &settings), PartRole::Choir);
        assert_eq!(infer_role(&part("Part 1", &["Choir Aahs"], vec![]), &settings), PartRole::Choir);
        assert_eq!(infer_role(&part("Soprano", &["Soprano Saxophone"], vec![]), &settings), PartRole::Choir);
        assert_eq!(infer_role(&part("Piano", &["Acoustic Grand Piano"], vec![]), &settings), PartRole::Instrument);
    }

    #[test]
    fn test_ticks_become_whole_note_fractions() {
        let mut measure = NotationMeasure::new("1", 2);
        measure.time = Some((2, 4));
        measure.elements = vec![note("1", 0, 'C', 1), note("1", 1, 'D', 3)];
        let report = import_document(
            &NotationDocument { parts: vec![part("Flute", &[], vec![measure])], ..Default::default() },
            &ImportSettings::default(),
        );
        assert!(report.is_complete());
        let imported = &report.score.parts[0].voices[0].measures[0];
        assert_eq!(imported.time_signature, TimeSignature::new(2, 4));
        assert_eq!(imported.events[1].onset(), ratio(1, 8));
        assert_eq!(imported.events[1].duration(), Some(ratio(3, 8)));
    }

    #[test]
    fn test_time_signature_carries_forward() {
        let mut first = NotationMeasure::new("1", 1);
        first.time = Some((3, 4));
        first.elements = vec![note("1", 0, 'C', 3)];
        let mut second = NotationMeasure::new("2", 1);
        second.elements = vec![note("1", 0, 'D', 3)];
        let report = import_document(
            &NotationDocument { parts: vec![part("Flute", &[], vec![first, second])], ..Default::default() },
            &ImportSettings::default(),
        );
        let measures = &report.score.parts[0].voices[0].measures;
        assert_eq!(measures[1].time_signature, TimeSignature::new(3, 4));
    }

    #[test]
    fn test_quarter_tone_rounds_and_wild_accidental_skips() {
        let mut measure = NotationMeasure::new("1", 1);
        measure.elements = vec![note("1", 0, 'C', 4), note("2", 0, 'E', 4)];
        if let ElementKind::Note(n) = &mut measure.elements[0].kind {
            n.alter = 0.5;
        }
        if let ElementKind::Note(n) = &mut measure.elements[1].kind {
            n.alter = 3.0;
        }
        let report = import_document(
            &NotationDocument { parts: vec![part("Flute", &[], vec![measure])], ..Default::default() },
            &ImportSettings::default(),
        );
        let voices = &report.score.parts[0].voices;
        assert_eq!(voices.len(), 1);
        assert_eq!(voices[0].measures[0].notes()[0].pitch.alteration, 1);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].voice.as_deref(), Some("2"));
        assert!(report.skipped[0].reason.contains("accidental"));
    }

    #[test]
    fn test_bad_numbers_skip_measures_and_empty_parts_drop() {
        let mut pickup = NotationMeasure::new("X1", 1);
        pickup.elements = vec![note("1", 0, 'C', 4)];
        let report = import_document(
            &NotationDocument { parts: vec![part("Flute", &[], vec![pickup])], ..Default::default() },
            &ImportSettings::default(),
        );
        assert!(report.score.parts.is_empty());
        let types: Vec<&str> = report.skipped.iter().map(|s| s.element_type.as_str()).collect();
        assert_eq!(types, vec!["measure", "part"]);
    }
}
