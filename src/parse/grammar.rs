//! Per-line grammar of the text form
//!
//! Each non-blank line is parsed on its own into a [`LineItem`]. Context
//! (which block is open) is the caller's business; this module only checks
//! the shape and values of a single line and reports every problem on it.

use crate::diagnostics::DiagnosticKind;
use crate::models::{
    Event, HarmonyEvent, LyricEvent, NoteEvent, PartRole, RestEvent, TimeSignature,
};

use super::tokens::{
    non_empty, parse_duration, parse_measure_number, parse_onset, parse_pitch, parse_tie,
    parse_time_signature, split_attribute, Keyword, TokenError,
};

/// A successfully parsed line
#[derive(Debug, Clone, PartialEq)]
pub enum LineItem {
    Part { name: String, role: PartRole },
    Voice { id: String },
    Measure { number: u32, time_signature: TimeSignature },
    Event(Event),
}

/// Every problem on one line; `keyword` is set when the keyword itself was
/// recognised, so the caller can still open a placeholder block
#[derive(Debug, Clone, PartialEq)]
pub struct LineError {
    pub keyword: Option<Keyword>,
    pub problems: Vec<TokenError>,
}

impl LineError {
    fn new(keyword: Option<Keyword>, problems: Vec<TokenError>) -> Self {
        Self { keyword, problems }
    }

    fn single(keyword: Option<Keyword>, message: String) -> Self {
        Self::new(keyword, vec![(DiagnosticKind::Format, message)])
    }
}

/// Parse one line; `Ok(None)` for blank lines
pub fn parse_line(text: &str) -> Result<Option<LineItem>, LineError> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    let Some((&first, rest)) = tokens.split_first() else {
        return Ok(None);
    };
    let keyword = Keyword::from_token(first)
        .ok_or_else(|| LineError::single(None, format!("unknown keyword '{}'", first)))?;

    let item = match keyword {
        Keyword::Part => parse_part(rest),
        Keyword::Voice => parse_voice(rest),
        Keyword::Measure => parse_measure(rest),
        Keyword::Note => parse_note(rest),
        Keyword::Rest => parse_rest(rest),
        Keyword::Harmony => parse_harmony(rest),
        Keyword::Lyric => parse_lyric(rest),
    };
    item.map(Some).map_err(|problems| LineError::new(Some(keyword), problems))
}

type LineResult = Result<LineItem, Vec<TokenError>>;

fn format_problem(message: impl Into<String>) -> Vec<TokenError> {
    vec![(DiagnosticKind::Format, message.into())]
}

/// `PART <name...> ROLE <role>`
fn parse_part(rest: &[&str]) -> LineResult {
    if rest.len() < 3 || rest[rest.len() - 2] != "ROLE" {
        return Err(format_problem("PART line must read PART <name> ROLE <choir|instrument>"));
    }
    let name = rest[..rest.len() - 2].join(" ");
    let role_token = rest[rest.len() - 1];
    let role = PartRole::parse(role_token)
        .ok_or_else(|| format_problem(format!("role '{}' must be choir or instrument", role_token)))?;
    Ok(LineItem::Part { name, role })
}

/// `VOICE <id>`
fn parse_voice(rest: &[&str]) -> LineResult {
    match rest {
        [id] => Ok(LineItem::Voice { id: id.to_string() }),
        _ => Err(format_problem("VOICE line must read VOICE <id>")),
    }
}

/// `MEASURE <n> TIME <num>/<den>`
fn parse_measure(rest: &[&str]) -> LineResult {
    let [number, time_word, signature] = rest else {
        return Err(format_problem("MEASURE line must read MEASURE <number> TIME <num>/<den>"));
    };
    if *time_word != "TIME" {
        return Err(format_problem(format!("expected TIME after the measure number, found '{}'", time_word)));
    }
    let mut problems = Vec::new();
    let number = parse_measure_number(number).map_err(|e| problems.push(e)).ok();
    let time_signature = parse_time_signature(signature).map_err(|e| problems.push(e)).ok();
    match (number, time_signature) {
        (Some(number), Some(time_signature)) => Ok(LineItem::Measure { number, time_signature }),
        _ => Err(problems),
    }
}

/// Attribute bag for one event line
///
/// Collects `name=value` tokens, flags duplicates, unknown names and bare
/// words, and lets the last attribute (`key=`, `text=`) take the rest of the
/// line.
struct Attributes<'a> {
    values: Vec<(&'a str, String)>,
    problems: Vec<TokenError>,
}

impl<'a> Attributes<'a> {
    fn collect(keyword: Keyword, rest: &[&'a str], allowed: &[&str], trailing: Option<&str>) -> Self {
        let mut values: Vec<(&'a str, String)> = Vec::new();
        let mut problems = Vec::new();

        let mut index = 0;
        while index < rest.len() {
            let token = rest[index];
            let Some((name, value)) = split_attribute(token) else {
                problems.push((
                    DiagnosticKind::Format,
                    format!("unexpected token '{}' on {} line", token, keyword.as_str()),
                ));
                index += 1;
                continue;
            };
            if trailing == Some(name) {
                let mut text = vec![value];
                text.extend_from_slice(&rest[index + 1..]);
                values.push((name, text.join(" ")));
                break;
            }
            if !allowed.contains(&name) {
                problems.push((
                    DiagnosticKind::Format,
                    format!("unexpected attribute '{}=' on {} line", name, keyword.as_str()),
                ));
            } else if values.iter().any(|(seen, _)| *seen == name) {
                problems.push((DiagnosticKind::Format, format!("attribute '{}=' given twice", name)));
            } else {
                values.push((name, value.to_string()));
            }
            index += 1;
        }
        Self { values, problems }
    }

    fn get(&self, name: &str) -> Option<&str> {
        self.values.iter().find(|(n, _)| *n == name).map(|(_, v)| v.as_str())
    }

    fn required<T>(&mut self, name: &str, convert: impl Fn(&str) -> Result<T, TokenError>) -> Option<T> {
        match self.get(name) {
            Some(value) => match convert(value) {
                Ok(converted) => Some(converted),
                Err(problem) => {
                    self.problems.push(problem);
                    None
                }
            },
            None => {
                self.problems.push((DiagnosticKind::Format, format!("missing {}=", name)));
                None
            }
        }
    }

    fn optional<T>(&mut self, name: &str, convert: impl Fn(&str) -> Result<T, TokenError>) -> Option<T> {
        let value = self.get(name)?;
        match convert(value) {
            Ok(converted) => Some(converted),
            Err(problem) => {
                self.problems.push(problem);
                None
            }
        }
    }

    fn finish(self, item: Option<LineItem>) -> LineResult {
        match item {
            Some(item) if self.problems.is_empty() => Ok(item),
            _ => Err(self.problems),
        }
    }
}

/// `NOTE t= dur= pitch= [tie=]`
fn parse_note(rest: &[&str]) -> LineResult {
    let mut attrs = Attributes::collect(Keyword::Note, rest, &["t", "dur", "pitch", "tie"], None);
    let onset = attrs.required("t", parse_onset);
    let duration = attrs.required("dur", parse_duration);
    let pitch = attrs.required("pitch", parse_pitch);
    let tie = attrs.optional("tie", parse_tie);
    let item = match (onset, duration, pitch) {
        (Some(onset), Some(duration), Some(pitch)) => {
            Some(LineItem::Event(Event::Note(NoteEvent { onset, duration, pitch, tie })))
        }
        _ => None,
    };
    attrs.finish(item)
}

/// `REST t= dur=`
fn parse_rest(rest: &[&str]) -> LineResult {
    let mut attrs = Attributes::collect(Keyword::Rest, rest, &["t", "dur"], None);
    let onset = attrs.required("t", parse_onset);
    let duration = attrs.required("dur", parse_duration);
    let item = match (onset, duration) {
        (Some(onset), Some(duration)) => Some(LineItem::Event(Event::Rest(RestEvent { onset, duration }))),
        _ => None,
    };
    attrs.finish(item)
}

/// `HARMONY t= symbol= [key=...]`
fn parse_harmony(rest: &[&str]) -> LineResult {
    let mut attrs = Attributes::collect(Keyword::Harmony, rest, &["t", "symbol"], Some("key"));
    let onset = attrs.required("t", parse_onset);
    let symbol = attrs.required("symbol", |v| non_empty("symbol", v));
    let key = attrs.optional("key", |v| non_empty("key", v));
    let item = match (onset, symbol) {
        (Some(onset), Some(symbol)) => Some(LineItem::Event(Event::Harmony(HarmonyEvent { onset, symbol, key }))),
        _ => None,
    };
    attrs.finish(item)
}

/// `LYRIC t= text=...`
fn parse_lyric(rest: &[&str]) -> LineResult {
    let mut attrs = Attributes::collect(Keyword::Lyric, rest, &["t"], Some("text"));
    let onset = attrs.required("t", parse_onset);
    let text = attrs.required("text", |v| non_empty("text", v));
    let item = match (onset, text) {
        (Some(onset), Some(text)) => Some(LineItem::Event(Event::Lyric(LyricEvent { onset, text }))),
        _ => None,
    };
    attrs.finish(item)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::time::{ratio, zero};
    use crate::models::{Pitch, Step, Tie};

    #[test]
    fn test_note_line() {
        let item = parse_line("NOTE t=1/4 dur=1/8 pitch=Bb3 tie=stop").unwrap();
        assert_eq!(
            item,
            Some(LineItem::Event(Event::Note(NoteEvent {
                onset: ratio(1, 4),
                duration: ratio(1, 8),
                pitch: Pitch::new(Step::B, -1, 3),
                tie: Some(Tie::Stop),
            })))
        );
    }

    #[test]
    fn test_part_name_with_spaces() {
        assert_eq!(
            parse_line("PART Alto Saxophone ROLE instrument").unwrap(),
            Some(LineItem::Part { name: "Alto Saxophone".into(), role: PartRole::Instrument })
        );
    }

    #[test]
    fn test_trailing_values_take_rest_of_line() {
        assert_eq!(
            parse_line("HARMONY t=0 symbol=Am7 key=A minor").unwrap(),
            Some(LineItem::Event(Event::Harmony(HarmonyEvent {
                onset: zero(),
                symbol: "Am7".into(),
                key: Some("A minor".into()),
            })))
        );
        assert_eq!(
            parse_line("LYRIC t=1/2 text=Ky - ri - e").unwrap(),
            Some(LineItem::Event(Event::Lyric(LyricEvent { onset: ratio(1, 2), text: "Ky - ri - e".into() })))
        );
    }

    #[test]
    fn test_every_problem_on_a_line_is_reported() {
        let error = parse_line("NOTE t=0.5 dur=-1/4 pitch=c4 velocity=80").unwrap_err();
        assert_eq!(error.keyword, Some(Keyword::Note));
        assert_eq!(error.problems.len(), 4);
    }

    #[test]
    fn test_rejections() {
        assert!(parse_line("PART Soprano").is_err());
        assert!(parse_line("PART Soprano ROLE singer").is_err());
        assert!(parse_line("VOICE 1 2").is_err());
        assert!(parse_line("MEASURE 1 3/4").is_err());
        assert!(parse_line("MEASURE -1 TIME 3/4").is_err());
        assert!(parse_line("MEASURE 1 TIME 0/4").is_err());
        assert!(parse_line("REST t=0 dur=1/4 extra").is_err());
        assert!(parse_line("HARMONY t=0 symbol=").is_err());
        assert!(parse_line("TEMPO 120").unwrap_err().keyword.is_none());
        assert_eq!(parse_line("   ").unwrap(), None);
    }
}
