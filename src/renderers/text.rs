//! Score tree -> line-oriented text form
//!
//! ```text
//! PART <name> ROLE <choir|instrument>
//! VOICE <id>
//! MEASURE <n> TIME <num>/<den>
//! NOTE t=<onset> dur=<duration> pitch=<Step><Alter?><Octave> [tie=<start|stop>]
//! REST t=<onset> dur=<duration>
//! HARMONY t=<onset> symbol=<sym> [key=<key>]
//! LYRIC t=<onset> text=<text>
//! ```
//!
//! Output is canonical (parts by name, voices by id, measures by number,
//! events by onset), times are exact fraction literals, and every measure is
//! followed by a blank line. Serializing the same tree twice always gives the
//! same bytes.
//!
//! A tree the grammar cannot carry is refused with a [`TextFormError`]
//! instead of being written lossily: names, keys and lyrics must use single
//! spaces only, voice ids and chord symbols no whitespace at all, pitches an
//! unsigned octave, times the parser's range.

use thiserror::Error;

use crate::models::time::{format_rational, in_time_range, zero, Rational};
use crate::models::{Event, Measure, Part, Score, Voice};
use crate::utils::collapse_whitespace;

/// A value in the tree that has no spelling in the text form
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{location}: {field} '{value}' cannot be written in the text form ({reason})")]
pub struct TextFormError {
    pub location: String,
    pub field: &'static str,
    pub value: String,
    pub reason: &'static str,
}

pub type TextFormResult<T> = Result<T, TextFormError>;

/// Render a score in the text form
pub fn to_text(score: &Score) -> TextFormResult<String> {
    let mut lines: Vec<String> = Vec::new();
    for part in score.sorted_parts() {
        write_part(part, &mut lines)?;
    }
    Ok(lines.join("\n").trim().to_string())
}

fn refuse(
    location: impl Into<String>,
    field: &'static str,
    value: impl ToString,
    reason: &'static str,
) -> TextFormError {
    TextFormError { location: location.into(), field, value: value.to_string(), reason }
}

/// Text that runs to the end of its line: single inner spaces, nothing
/// around it
fn check_spaced(location: &str, field: &'static str, value: &str) -> TextFormResult<()> {
    if value.is_empty() {
        return Err(refuse(location, field, value, "it is empty"));
    }
    if collapse_whitespace(value) != value {
        return Err(refuse(location, field, value, "only single spaces between words are kept"));
    }
    Ok(())
}

/// A single token: non-empty, no whitespace
fn check_token(location: &str, field: &'static str, value: &str) -> TextFormResult<()> {
    if value.is_empty() {
        return Err(refuse(location, field, value, "it is empty"));
    }
    if value.chars().any(char::is_whitespace) {
        return Err(refuse(location, field, value, "it must be one word"));
    }
    Ok(())
}

fn check_time(location: &str, field: &'static str, value: &Rational, positive: bool) -> TextFormResult<()> {
    if !in_time_range(value) {
        return Err(refuse(location, field, format_rational(value), "outside the range of time values"));
    }
    if *value < zero() || (positive && *value == zero()) {
        return Err(refuse(location, field, format_rational(value), "times are never negative, lengths never zero"));
    }
    Ok(())
}

fn write_part(part: &Part, lines: &mut Vec<String>) -> TextFormResult<()> {
    check_spaced("score", "part name", &part.name)?;
    lines.push(format!("PART {} ROLE {}", part.name, part.role));
    for voice in part.sorted_voices() {
        write_voice(part, voice, lines)?;
    }
    Ok(())
}

fn write_voice(part: &Part, voice: &Voice, lines: &mut Vec<String>) -> TextFormResult<()> {
    check_token(&format!("part '{}'", part.name), "voice id", &voice.id)?;
    lines.push(format!("VOICE {}", voice.id));
    for measure in voice.sorted_measures() {
        let location = format!("part '{}', voice {}, measure {}", part.name, voice.id, measure.number);
        write_measure(&location, measure, lines)?;
    }
    Ok(())
}

fn write_measure(location: &str, measure: &Measure, lines: &mut Vec<String>) -> TextFormResult<()> {
    lines.push(format!("MEASURE {} TIME {}", measure.number, measure.time_signature));
    for event in measure.sorted_events() {
        check_event(location, event)?;
        lines.push(event_line(event));
    }
    lines.push(String::new());
    Ok(())
}

fn check_event(location: &str, event: &Event) -> TextFormResult<()> {
    check_time(location, "onset", &event.onset(), false)?;
    if let Some(duration) = event.duration() {
        check_time(location, "duration", &duration, true)?;
    }
    match event {
        Event::Note(note) if !note.pitch.has_text_spelling() => {
            let written = format!("{:?} {:+} octave {}", note.pitch.step, note.pitch.alteration, note.pitch.octave);
            Err(refuse(location, "pitch", written, "accidentals run from bb to x and octaves from 0 up"))
        }
        Event::Harmony(harmony) => {
            check_token(location, "chord symbol", &harmony.symbol)?;
            match &harmony.key {
                Some(key) => check_spaced(location, "key", key),
                None => Ok(()),
            }
        }
        Event::Lyric(lyric) => check_spaced(location, "lyric", &lyric.text),
        _ => Ok(()),
    }
}

/// One event line, every attribute spelled out; values are written as they
/// are, [`to_text`] checks them first
pub fn event_line(event: &Event) -> String {
    match event {
        Event::Note(note) => {
            let mut line = format!(
                "NOTE t={} dur={} pitch={}",
                format_rational(&note.onset),
                format_rational(&note.duration),
                note.pitch
            );
            if let Some(tie) = note.tie {
                line.push_str(" tie=");
                line.push_str(tie.as_str());
            }
            line
        }
        Event::Rest(rest) => format!(
            "REST t={} dur={}",
            format_rational(&rest.onset),
            format_rational(&rest.duration)
        ),
        Event::Harmony(harmony) => {
            let mut line = format!("HARMONY t={} symbol={}", format_rational(&harmony.onset), harmony.symbol);
            if let Some(key) = &harmony.key {
                line.push_str(" key=");
                line.push_str(key);
            }
            line
        }
        Event::Lyric(lyric) => format!("LYRIC t={} text={}", format_rational(&lyric.onset), lyric.text),
    }
}
