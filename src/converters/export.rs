//! Score to notation document, and on to a MusicXML file
//!
//! Voices of a part share one external measure per measure number and are
//! told apart by voice tags. Divisions are chosen per measure so every onset
//! and duration lands on a whole tick.

use std::collections::BTreeSet;
use std::io::Write;
use std::path::Path;

use num_traits::CheckedMul;
use tempfile::NamedTempFile;

use super::errors::{ExportError, ExportResult};
use super::musicxml::{
    ElementKind, KeySignature, MusicXmlAdapter, NotationAdapter, NotationDocument, NotationElement, NotationMeasure,
    NotationNote, NotationPart,
};
use crate::models::time::{format_rational, ratio, Rational};
use crate::models::pitch::NOTATED_OCTAVES;
use crate::models::{Event, Measure, Part, PartRole, Score, Tie};
use crate::utils::lcm;

/// Instrument name written for sung parts; a vocal keyword on re-import
const VOCAL_INSTRUMENT: &str = "Voice";
const PLAYED_INSTRUMENT: &str = "Instrument";

pub fn export_document(score: &Score) -> ExportResult<NotationDocument> {
    if score.walk_measures().is_empty() {
        return Err(ExportError::EmptyScore);
    }
    let key = first_key(score);

    let mut parts = Vec::new();
    for (index, part) in score.sorted_parts().into_iter().enumerate() {
        parts.push(export_part(part, index, key.as_ref())?);
    }

    Ok(NotationDocument {
        title: score.metadata.title.clone(),
        composer: score.metadata.composer.clone(),
        lyricist: score.metadata.lyricist.clone(),
        parts,
    })
}

pub fn export_musicxml_string(score: &Score) -> ExportResult<String> {
    MusicXmlAdapter.write(&export_document(score)?)
}

/// Write through a temporary file in the target directory, then persist it
/// over `path` in one rename
pub fn export_musicxml_file(score: &Score, path: impl AsRef<Path>) -> ExportResult<()> {
    let path = path.as_ref();
    let xml = export_musicxml_string(score)?;
    let io_error = |source| ExportError::Io { path: path.display().to_string(), source };

    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut file = NamedTempFile::new_in(directory).map_err(io_error)?;
    file.write_all(xml.as_bytes()).map_err(io_error)?;
    file.flush().map_err(io_error)?;
    file.persist(path).map_err(|err| io_error(err.error))?;

    log::info!("exported {} part(s) to {}", score.parts.len(), path.display());
    Ok(())
}

/// First key label on a harmony event, in canonical order, that names a key
fn first_key(score: &Score) -> Option<KeySignature> {
    score
        .walk_measures()
        .into_iter()
        .flat_map(|(_, _, measure)| measure.events.iter())
        .filter_map(Event::as_harmony)
        .filter_map(|harmony| harmony.key.as_deref())
        .find_map(KeySignature::from_name)
}

fn export_part(part: &Part, index: usize, key: Option<&KeySignature>) -> ExportResult<NotationPart> {
    let instrument = match part.role {
        PartRole::Choir => VOCAL_INSTRUMENT,
        PartRole::Instrument => PLAYED_INSTRUMENT,
    };
    let voices = part.sorted_voices();
    let numbers: BTreeSet<u32> = voices.iter().flat_map(|v| v.measures.iter().map(|m| m.number)).collect();

    let mut measures = Vec::new();
    for number in numbers {
        let voice_measures: Vec<(&str, &Measure)> = voices
            .iter()
            .filter_map(|v| v.measures.iter().find(|m| m.number == number).map(|m| (v.id.as_str(), m)))
            .collect();
        let mut exported = export_measure(part, number, &voice_measures)?;
        if measures.is_empty() {
            exported.key = key.cloned();
        }
        measures.push(exported);
    }

    Ok(NotationPart {
        id: format!("P{}", index + 1),
        name: part.name.clone(),
        instruments: vec![instrument.to_string()],
        measures,
    })
}

/// Ticks per quarter that put every onset and duration on a whole tick
fn divisions_for(voice_measures: &[(&str, &Measure)]) -> Option<i64> {
    let quarters = ratio(4, 1);
    voice_measures
        .iter()
        .flat_map(|(_, m)| m.events.iter())
        .flat_map(|e| [Some(e.onset()), e.duration()])
        .flatten()
        .try_fold(1, |divisions, value| lcm(divisions, *value.checked_mul(&quarters)?.denom()))
}

fn to_ticks(value: Rational, divisions: i64) -> Option<i64> {
    let per_whole = divisions.checked_mul(4)?;
    Some(value.checked_mul(&Rational::from_integer(per_whole))?.to_integer())
}

fn export_measure(part: &Part, number: u32, voice_measures: &[(&str, &Measure)]) -> ExportResult<NotationMeasure> {
    let timing_error = || ExportError::UnrepresentableTiming { part: part.name.clone(), measure: number };
    let divisions = divisions_for(voice_measures).ok_or_else(timing_error)?;
    let ticks = |value: Rational| to_ticks(value, divisions).ok_or_else(timing_error);

    let mut measure = NotationMeasure::new(number.to_string(), divisions);
    if let Some((_, first)) = voice_measures.first() {
        let ts = first.time_signature;
        measure.time = Some((ts.numerator, ts.denominator));
    }

    for (voice, source) in voice_measures {
        let events = source.sorted_events();
        let mut attached = vec![false; events.len()];

        for event in &events {
            let kind = match event {
                Event::Note(note) => {
                    if !NOTATED_OCTAVES.contains(&note.pitch.octave) {
                        return Err(ExportError::UnrepresentablePitch {
                            part: part.name.clone(),
                            measure: number,
                            pitch: note.pitch.to_string(),
                            reason: "MusicXML octaves run from 0 to 9".to_string(),
                        });
                    }
                    let lyric = events.iter().enumerate().find_map(|(i, e)| match e {
                        Event::Lyric(l) if l.onset == note.onset && !attached[i] => Some((i, l.text.clone())),
                        _ => None,
                    });
                    if let Some((i, _)) = lyric {
                        attached[i] = true;
                    }
                    ElementKind::Note(NotationNote {
                        step: note.pitch.step.as_char(),
                        alter: f64::from(note.pitch.alteration),
                        octave: i32::from(note.pitch.octave),
                        duration: ticks(note.duration)?,
                        tie_start: note.tie == Some(Tie::Start),
                        tie_stop: note.tie == Some(Tie::Stop),
                        lyric: lyric.map(|(_, text)| text),
                        chord: false,
                    })
                }
                Event::Rest(rest) => ElementKind::Rest { duration: ticks(rest.duration)? },
                Event::Harmony(harmony) => ElementKind::Harmony { symbol: harmony.symbol.clone() },
                Event::Lyric(_) => continue,
            };
            measure.elements.push(NotationElement {
                voice: Some(voice.to_string()),
                offset: ticks(event.onset())?,
                kind,
            });
        }

        for (event, done) in events.iter().zip(&attached) {
            if let Event::Lyric(lyric) = event {
                if !done {
                    log::warn!(
                        "lyric '{}' at t={} in {} voice {}, measure {} has no note to attach to",
                        lyric.text,
                        format_rational(&lyric.onset),
                        part.name,
                        voice,
                        number
                    );
                }
            }
        }
    }
    Ok(measure)
}
