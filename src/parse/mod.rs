//! Text form -> score tree
//!
//! The parser is the barrier between machine-generated text and the rest of
//! the pipeline. It scans every line, opens and closes blocks as `PART`,
//! `VOICE` and `MEASURE` lines arrive, and collects every problem it finds.
//! The result is either a complete [`Score`] or the full list of
//! diagnostics, never both.

pub mod grammar;
pub mod tokens;

pub use grammar::{parse_line, LineError, LineItem};
pub use tokens::Keyword;

use std::collections::HashSet;

use crate::config::TextSettings;
use crate::diagnostics::Diagnostics;
use crate::models::integrity::{find_capacity_problems, find_overlaps};
use crate::models::{Event, Measure, Part, PartRole, Score, TimeSignature, Voice};

/// Parse the text form with default settings
pub fn parse_text(text: &str) -> Result<Score, Diagnostics> {
    TextParser::default().parse(text)
}

#[derive(Debug, Clone, Default)]
pub struct TextParser {
    settings: TextSettings,
}

/// Blocks under construction; `placeholder` marks a block opened by a
/// malformed header line so its children do not cascade into more errors
struct PartBlock {
    line: usize,
    name: String,
    role: PartRole,
    placeholder: bool,
    voices: Vec<VoiceBlock>,
}

struct VoiceBlock {
    line: usize,
    id: String,
    placeholder: bool,
    measures: Vec<MeasureBlock>,
}

struct MeasureBlock {
    line: usize,
    number: u32,
    time_signature: TimeSignature,
    placeholder: bool,
    events: Vec<Event>,
}

impl TextParser {
    pub fn new(settings: TextSettings) -> Self {
        Self { settings }
    }

    pub fn parse(&self, text: &str) -> Result<Score, Diagnostics> {
        let mut diagnostics = Diagnostics::new();
        let mut parts: Vec<PartBlock> = Vec::new();

        for (index, raw) in text.lines().enumerate() {
            let line = index + 1;
            match parse_line(raw) {
                Ok(None) => {}
                Ok(Some(item)) => open_or_append(&mut parts, item, line, &mut diagnostics),
                Err(error) => {
                    for (kind, message) in error.problems {
                        diagnostics.add(line, kind, message);
                    }
                    if let Some(keyword) = error.keyword {
                        open_placeholder(&mut parts, keyword, line);
                    }
                }
            }
        }

        if parts.is_empty() && diagnostics.is_empty() {
            diagnostics.structure(1, "the text contains no PART");
        }
        for part in &parts {
            self.check_part(part, &parts, &mut diagnostics);
        }

        if !diagnostics.is_empty() {
            log::debug!("text parse rejected with {} diagnostics", diagnostics.len());
            return Err(diagnostics);
        }
        Ok(build_score(parts))
    }

    fn check_part(&self, part: &PartBlock, all: &[PartBlock], diagnostics: &mut Diagnostics) {
        if part.placeholder {
            return;
        }
        let first_with_name = all.iter().find(|p| !p.placeholder && p.name == part.name);
        if first_with_name.map(|p| p.line) != Some(part.line) {
            diagnostics.structure(part.line, format!("part '{}' is declared more than once", part.name));
        }
        if part.voices.is_empty() {
            diagnostics.structure(part.line, format!("part '{}' has no VOICE", part.name));
        }

        let mut voice_ids = HashSet::new();
        for voice in &part.voices {
            if voice.placeholder {
                continue;
            }
            if !voice_ids.insert(voice.id.as_str()) {
                diagnostics.structure(
                    voice.line,
                    format!("voice '{}' is declared more than once in part '{}'", voice.id, part.name),
                );
            }
            if voice.measures.is_empty() {
                diagnostics.structure(
                    voice.line,
                    format!("voice '{}' of part '{}' has no MEASURE", voice.id, part.name),
                );
            }
            self.check_measures(part, voice, diagnostics);
        }
    }

    fn check_measures(&self, part: &PartBlock, voice: &VoiceBlock, diagnostics: &mut Diagnostics) {
        let mut numbers = HashSet::new();
        for block in voice.measures.iter().filter(|m| !m.placeholder) {
            if !numbers.insert(block.number) {
                diagnostics.structure(
                    block.line,
                    format!(
                        "measure {} appears more than once in voice '{}' of part '{}'",
                        block.number, voice.id, part.name
                    ),
                );
            }

            let measure = block.to_measure();
            let mut problems = find_overlaps(&measure);
            if self.settings.strict_measure_capacity {
                problems.extend(find_capacity_problems(&measure));
            }
            for problem in problems {
                diagnostics.musical(
                    block.line,
                    format!("measure {} (part '{}', voice '{}'): {}", block.number, part.name, voice.id, problem),
                );
            }
        }
    }
}

fn open_or_append(parts: &mut Vec<PartBlock>, item: LineItem, line: usize, diagnostics: &mut Diagnostics) {
    match item {
        LineItem::Part { name, role } => {
            parts.push(PartBlock { line, name, role, placeholder: false, voices: Vec::new() });
        }
        LineItem::Voice { id } => match parts.last_mut() {
            Some(part) => part.voices.push(VoiceBlock { line, id, placeholder: false, measures: Vec::new() }),
            None => diagnostics.structure(line, "VOICE appears before any PART"),
        },
        LineItem::Measure { number, time_signature } => {
            match parts.last_mut().and_then(|p| p.voices.last_mut()) {
                Some(voice) => voice.measures.push(MeasureBlock {
                    line,
                    number,
                    time_signature,
                    placeholder: false,
                    events: Vec::new(),
                }),
                None => diagnostics.structure(line, "MEASURE appears outside of a VOICE"),
            }
        }
        LineItem::Event(event) => {
            let measure = parts
                .last_mut()
                .and_then(|p| p.voices.last_mut())
                .and_then(|v| v.measures.last_mut());
            match measure {
                Some(measure) => measure.events.push(event),
                None => diagnostics.structure(
                    line,
                    format!("{} event appears outside of a MEASURE", event.kind().as_str().to_uppercase()),
                ),
            }
        }
    }
}

/// Open an empty block for a header line that failed to parse
fn open_placeholder(parts: &mut Vec<PartBlock>, keyword: Keyword, line: usize) {
    match keyword {
        Keyword::Part => parts.push(PartBlock {
            line,
            name: String::new(),
            role: PartRole::default(),
            placeholder: true,
            voices: Vec::new(),
        }),
        Keyword::Voice => {
            if let Some(part) = parts.last_mut() {
                part.voices.push(VoiceBlock { line, id: String::new(), placeholder: true, measures: Vec::new() });
            }
        }
        Keyword::Measure => {
            if let Some(voice) = parts.last_mut().and_then(|p| p.voices.last_mut()) {
                voice.measures.push(MeasureBlock {
                    line,
                    number: 0,
                    time_signature: TimeSignature::common(),
                    placeholder: true,
                    events: Vec::new(),
                });
            }
        }
        _ => {}
    }
}

impl MeasureBlock {
    fn to_measure(&self) -> Measure {
        Measure { number: self.number, time_signature: self.time_signature, events: self.events.clone() }
    }
}

fn build_score(parts: Vec<PartBlock>) -> Score {
    let parts = parts
        .into_iter()
        .map(|part| Part {
            id: part.name.clone(),
            name: part.name,
            role: part.role,
            voices: part
                .voices
                .into_iter()
                .map(|voice| Voice {
                    id: voice.id,
                    measures: voice
                        .measures
                        .into_iter()
                        .map(|m| Measure { number: m.number, time_signature: m.time_signature, events: m.events })
                        .collect(),
                })
                .collect(),
        })
        .collect();
    Score::new(parts)
}
