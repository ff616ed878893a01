//! Notation document to MusicXML 3.1 text
//!
//! A plain string emitter: one line per element, two-space indentation.
//! Elements are written in the order given; a `<backup>` or `<forward>` is
//! inserted whenever the next element starts somewhere other than the cursor.

use quick_xml::escape::escape;

use super::harmony::split_symbol;
use super::tree::{ElementKind, NotationDocument, NotationElement, NotationMeasure, NotationNote, NotationPart};
use crate::models::time::{ratio, Rational};

const HEADER: &str = concat!(
    "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"no\"?>\n",
    "<!DOCTYPE score-partwise PUBLIC \"-//Recordare//DTD MusicXML 3.1 Partwise//EN\" ",
    "\"http://www.musicxml.org/dtds/partwise.dtd\">\n",
);

/// Undotted note types by length in whole notes
const NOTE_TYPES: [(&str, i64, i64); 9] = [
    ("breve", 2, 1),
    ("whole", 1, 1),
    ("half", 1, 2),
    ("quarter", 1, 4),
    ("eighth", 1, 8),
    ("16th", 1, 16),
    ("32nd", 1, 32),
    ("64th", 1, 64),
    ("128th", 1, 128),
];

/// Written form of a length: type, dots, and whether it is a triplet member
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteType {
    pub name: &'static str,
    pub dots: u8,
    pub triplet: bool,
}

/// Written note type for a length in whole notes; `None` for lengths no
/// single (optionally dotted or triplet) note value spells
pub fn note_type(length: Rational) -> Option<NoteType> {
    for (name, numer, denom) in NOTE_TYPES {
        let base = ratio(numer, denom);
        let candidates = [
            (base, 0, false),
            (base * ratio(3, 2), 1, false),
            (base * ratio(7, 4), 2, false),
            (base * ratio(2, 3), 0, true),
        ];
        for (value, dots, triplet) in candidates {
            if value == length {
                return Some(NoteType { name, dots, triplet });
            }
        }
    }
    None
}

struct Emitter {
    xml: String,
}

impl Emitter {
    fn line(&mut self, depth: usize, text: &str) {
        for _ in 0..depth {
            self.xml.push_str("  ");
        }
        self.xml.push_str(text);
        self.xml.push('\n');
    }

    fn text_element(&mut self, depth: usize, name: &str, value: &str) {
        self.line(depth, &format!("<{name}>{}</{name}>", escape(value)));
    }
}

pub fn write_document(document: &NotationDocument) -> String {
    let mut out = Emitter { xml: String::from(HEADER) };
    out.line(0, "<score-partwise version=\"3.1\">");

    if let Some(title) = &document.title {
        out.line(1, "<work>");
        out.text_element(2, "work-title", title);
        out.line(1, "</work>");
    }
    if document.composer.is_some() || document.lyricist.is_some() {
        out.line(1, "<identification>");
        if let Some(composer) = &document.composer {
            out.line(2, &format!("<creator type=\"composer\">{}</creator>", escape(composer)));
        }
        if let Some(lyricist) = &document.lyricist {
            out.line(2, &format!("<creator type=\"lyricist\">{}</creator>", escape(lyricist)));
        }
        out.line(1, "</identification>");
    }

    out.line(1, "<part-list>");
    for part in &document.parts {
        write_part_header(&mut out, part);
    }
    out.line(1, "</part-list>");

    for part in &document.parts {
        out.line(1, &format!("<part id=\"{}\">", escape(&part.id)));
        for (index, measure) in part.measures.iter().enumerate() {
            let previous_divisions = index.checked_sub(1).map(|i| part.measures[i].divisions);
            write_measure(&mut out, measure, previous_divisions);
        }
        out.line(1, "</part>");
    }

    out.line(0, "</score-partwise>");
    out.xml
}

fn write_part_header(out: &mut Emitter, part: &NotationPart) {
    out.line(2, &format!("<score-part id=\"{}\">", escape(&part.id)));
    out.text_element(3, "part-name", &part.name);
    for (index, instrument) in part.instruments.iter().enumerate() {
        out.line(3, &format!("<score-instrument id=\"{}-I{}\">", escape(&part.id), index + 1));
        out.text_element(4, "instrument-name", instrument);
        out.line(3, "</score-instrument>");
    }
    out.line(2, "</score-part>");
}

fn write_measure(out: &mut Emitter, measure: &NotationMeasure, previous_divisions: Option<i64>) {
    out.line(2, &format!("<measure number=\"{}\">", escape(&measure.number)));

    let divisions_changed = previous_divisions != Some(measure.divisions);
    if divisions_changed || measure.key.is_some() || measure.time.is_some() {
        out.line(3, "<attributes>");
        if divisions_changed {
            out.text_element(4, "divisions", &measure.divisions.to_string());
        }
        if let Some(key) = &measure.key {
            out.line(4, "<key>");
            out.text_element(5, "fifths", &key.fifths.to_string());
            if let Some(mode) = &key.mode {
                out.text_element(5, "mode", mode);
            }
            out.line(4, "</key>");
        }
        if let Some((beats, beat_type)) = measure.time {
            out.line(4, "<time>");
            out.text_element(5, "beats", &beats.to_string());
            out.text_element(5, "beat-type", &beat_type.to_string());
            out.line(4, "</time>");
        }
        out.line(3, "</attributes>");
    }

    let mut cursor: i64 = 0;
    for element in &measure.elements {
        let chord = matches!(&element.kind, ElementKind::Note(note) if note.chord);
        if !chord {
            move_cursor(out, &mut cursor, element);
        }
        match &element.kind {
            ElementKind::Note(note) => {
                write_note(out, element, Some(note), note.duration, measure.divisions);
                if !chord {
                    cursor += note.duration;
                }
            }
            ElementKind::Rest { duration } => {
                write_note(out, element, None, *duration, measure.divisions);
                cursor += duration;
            }
            ElementKind::Harmony { symbol } => write_harmony(out, symbol),
        }
    }

    out.line(2, "</measure>");
}

fn move_cursor(out: &mut Emitter, cursor: &mut i64, element: &NotationElement) {
    if element.offset < *cursor {
        out.line(3, "<backup>");
        out.text_element(4, "duration", &(*cursor - element.offset).to_string());
        out.line(3, "</backup>");
    } else if element.offset > *cursor {
        out.line(3, "<forward>");
        out.text_element(4, "duration", &(element.offset - *cursor).to_string());
        if let Some(voice) = &element.voice {
            out.text_element(4, "voice", voice);
        }
        out.line(3, "</forward>");
    }
    *cursor = element.offset;
}

fn write_note(
    out: &mut Emitter,
    element: &NotationElement,
    note: Option<&NotationNote>,
    duration: i64,
    divisions: i64,
) {
    out.line(3, "<note>");
    match note {
        Some(note) => {
            if note.chord {
                out.line(4, "<chord/>");
            }
            out.line(4, "<pitch>");
            out.text_element(5, "step", &note.step.to_string());
            if note.alter != 0.0 {
                out.text_element(5, "alter", &note.alter.to_string());
            }
            out.text_element(5, "octave", &note.octave.to_string());
            out.line(4, "</pitch>");
        }
        None => out.line(4, "<rest/>"),
    }
    out.text_element(4, "duration", &duration.to_string());

    let (tie_start, tie_stop) = note.map(|n| (n.tie_start, n.tie_stop)).unwrap_or((false, false));
    if tie_stop {
        out.line(4, "<tie type=\"stop\"/>");
    }
    if tie_start {
        out.line(4, "<tie type=\"start\"/>");
    }
    if let Some(voice) = &element.voice {
        out.text_element(4, "voice", voice);
    }

    let written = (divisions > 0).then(|| note_type(ratio(duration, 4 * divisions))).flatten();
    match written {
        Some(written) => {
            out.text_element(4, "type", written.name);
            for _ in 0..written.dots {
                out.line(4, "<dot/>");
            }
            if written.triplet {
                out.line(4, "<time-modification>");
                out.text_element(5, "actual-notes", "3");
                out.text_element(5, "normal-notes", "2");
                out.line(4, "</time-modification>");
            }
        }
        None => log::debug!("no written note type for {} ticks at {} divisions", duration, divisions),
    }

    if tie_start || tie_stop {
        out.line(4, "<notations>");
        if tie_stop {
            out.line(5, "<tied type=\"stop\"/>");
        }
        if tie_start {
            out.line(5, "<tied type=\"start\"/>");
        }
        out.line(4, "</notations>");
    }
    if let Some(lyric) = note.and_then(|n| n.lyric.as_deref()) {
        out.line(4, "<lyric number=\"1\">");
        out.text_element(5, "syllabic", "single");
        out.text_element(5, "text", lyric);
        out.line(4, "</lyric>");
    }
    out.line(3, "</note>");
}

fn write_harmony(out: &mut Emitter, symbol: &str) {
    out.line(3, "<harmony>");
    match split_symbol(symbol) {
        Some(parts) => {
            out.line(4, "<root>");
            out.text_element(5, "root-step", &parts.root_step.to_string());
            if parts.root_alter != 0 {
                out.text_element(5, "root-alter", &parts.root_alter.to_string());
            }
            out.line(4, "</root>");
            out.line(4, &format!("<kind text=\"{}\">{}</kind>", escape(&parts.suffix), parts.kind));
            if let Some((step, alter)) = parts.bass {
                out.line(4, "<bass>");
                out.text_element(5, "bass-step", &step.to_string());
                if alter != 0 {
                    out.text_element(5, "bass-alter", &alter.to_string());
                }
                out.line(4, "</bass>");
            }
        }
        None => {
            out.text_element(4, "function", symbol);
            out.text_element(4, "kind", "other");
        }
    }
    out.line(3, "</harmony>");
}
