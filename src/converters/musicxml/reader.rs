//! MusicXML (score-partwise) to notation document, using roxmltree
//!
//! Elements are placed by a running tick cursor per measure: notes advance
//! it, `<backup>` and `<forward>` move it, chord tones reuse the previous
//! note's offset. Divisions carry over from measure to measure.
//!
//! `<harmony>` has no voice of its own. It takes the voice of the next note
//! before a `<backup>`, or failing that the voice of the previous note.

use roxmltree::{Document as XmlDocument, Node};
use std::collections::HashMap;

use super::harmony::join_symbol;
use super::tree::{
    ElementKind, KeySignature, NotationDocument, NotationElement, NotationMeasure, NotationNote, NotationPart,
};
use crate::converters::errors::ImportError;

pub fn read_document(xml: &str) -> Result<NotationDocument, ImportError> {
    let doc = XmlDocument::parse(xml).map_err(|e| ImportError::InvalidXml(e.to_string()))?;
    let root = doc.root_element();

    match root.tag_name().name() {
        "score-partwise" => read_score_partwise(root),
        "score-timewise" => Err(ImportError::UnsupportedFormat(
            "score-timewise (only score-partwise is read)".to_string(),
        )),
        other => Err(ImportError::UnsupportedFormat(format!("root element <{}>", other))),
    }
}

fn child<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|n| n.tag_name().name() == name)
}

fn children<'a, 'input>(node: Node<'a, 'input>, name: &'static str) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children().filter(move |n| n.tag_name().name() == name)
}

fn child_text<'a>(node: Node<'a, '_>, name: &str) -> Option<&'a str> {
    child(node, name).and_then(|n| n.text()).map(str::trim)
}

fn read_score_partwise(root: Node) -> Result<NotationDocument, ImportError> {
    let part_list = child(root, "part-list").ok_or_else(|| ImportError::MissingElement("part-list".to_string()))?;
    let headers = read_part_list(part_list);

    let mut document = NotationDocument {
        title: child(root, "work")
            .and_then(|work| child_text(work, "work-title"))
            .or_else(|| child_text(root, "movement-title"))
            .filter(|t| !t.is_empty())
            .map(str::to_string),
        ..Default::default()
    };
    if let Some(identification) = child(root, "identification") {
        for creator in children(identification, "creator") {
            let text = creator.text().map(str::trim).filter(|t| !t.is_empty()).map(str::to_string);
            match creator.attribute("type") {
                Some("composer") => document.composer = text,
                Some("lyricist") | Some("poet") => document.lyricist = text,
                _ => {}
            }
        }
    }

    for part_node in children(root, "part") {
        let id = part_node
            .attribute("id")
            .ok_or_else(|| ImportError::MissingElement("part id attribute".to_string()))?;
        let (name, instruments) = headers.get(id).cloned().unwrap_or_else(|| (id.to_string(), Vec::new()));
        let measures = read_measures(part_node);
        document.parts.push(NotationPart { id: id.to_string(), name, instruments, measures });
    }
    Ok(document)
}

/// part id -> (part name, instrument names)
fn read_part_list(part_list: Node) -> HashMap<String, (String, Vec<String>)> {
    let mut headers = HashMap::new();
    for score_part in children(part_list, "score-part") {
        if let Some(id) = score_part.attribute("id") {
            let name = child_text(score_part, "part-name").unwrap_or_default().to_string();
            let instruments = children(score_part, "score-instrument")
                .filter_map(|i| child_text(i, "instrument-name"))
                .map(str::to_string)
                .collect();
            headers.insert(id.to_string(), (name, instruments));
        }
    }
    headers
}

fn read_measures(part_node: Node) -> Vec<NotationMeasure> {
    let mut divisions = 1;
    let mut measures = Vec::new();

    for measure_node in children(part_node, "measure") {
        let mut measure = NotationMeasure::new(measure_node.attribute("number").unwrap_or_default(), divisions);
        let mut cursor: i64 = 0;
        let mut last_note_offset: i64 = 0;
        let mut last_voice: Option<String> = None;
        let mut pending_harmony: Vec<usize> = Vec::new();

        for node in measure_node.children().filter(|n| n.is_element()) {
            match node.tag_name().name() {
                "attributes" => {
                    read_attributes(node, &mut measure);
                    divisions = measure.divisions;
                }
                "note" => {
                    if child(node, "grace").is_some() {
                        log::debug!("grace note in measure {} ignored", measure.number);
                        continue;
                    }
                    let chord = child(node, "chord").is_some();
                    let duration = tick_value(node);
                    let offset = if chord { last_note_offset } else { cursor };
                    if !chord {
                        last_note_offset = cursor;
                        cursor = cursor.saturating_add(duration);
                    }
                    let voice = child_text(node, "voice").map(str::to_string);
                    if voice.is_some() {
                        assign_voice(&mut measure, &mut pending_harmony, &voice);
                        last_voice = voice.clone();
                    }
                    if let Some(kind) = read_note(node, duration, chord) {
                        measure.elements.push(NotationElement { voice, offset, kind });
                    }
                }
                "backup" => {
                    assign_voice(&mut measure, &mut pending_harmony, &last_voice);
                    cursor = cursor.saturating_sub(tick_value(node));
                }
                "forward" => cursor = cursor.saturating_add(tick_value(node)),
                "harmony" => {
                    let shift: i64 = child_text(node, "offset").and_then(|t| t.parse().ok()).unwrap_or(0);
                    match read_harmony(node) {
                        Some(symbol) => {
                            let voice = child_text(node, "voice").map(str::to_string);
                            if voice.is_none() {
                                pending_harmony.push(measure.elements.len());
                            }
                            measure.elements.push(NotationElement {
                                voice,
                                offset: cursor.saturating_add(shift),
                                kind: ElementKind::Harmony { symbol },
                            });
                        }
                        None => log::debug!("harmony without root in measure {} ignored", measure.number),
                    }
                }
                _ => {}
            }
        }
        assign_voice(&mut measure, &mut pending_harmony, &last_voice);
        measures.push(measure);
    }
    measures
}

/// `<duration>` of a note, backup or forward; 0 when absent or unreadable
fn tick_value(node: Node) -> i64 {
    child_text(node, "duration").and_then(|t| t.parse().ok()).unwrap_or(0)
}

fn assign_voice(measure: &mut NotationMeasure, pending: &mut Vec<usize>, voice: &Option<String>) {
    if voice.is_none() {
        return;
    }
    for index in pending.drain(..) {
        measure.elements[index].voice = voice.clone();
    }
}

fn read_attributes(node: Node, measure: &mut NotationMeasure) {
    if let Some(divisions) = child_text(node, "divisions").and_then(|t| t.parse().ok()) {
        measure.divisions = divisions;
    }
    if let Some(key) = child(node, "key") {
        if let Some(fifths) = child_text(key, "fifths").and_then(|t| t.parse().ok()) {
            measure.key = Some(KeySignature { fifths, mode: child_text(key, "mode").map(str::to_string) });
        }
    }
    if let Some(time) = child(node, "time") {
        let beats = child_text(time, "beats").and_then(|t| t.parse().ok());
        let beat_type = child_text(time, "beat-type").and_then(|t| t.parse().ok());
        if let (Some(beats), Some(beat_type)) = (beats, beat_type) {
            measure.time = Some((beats, beat_type));
        }
    }
}

fn read_note(node: Node, duration: i64, chord: bool) -> Option<ElementKind> {
    if child(node, "rest").is_some() {
        return Some(ElementKind::Rest { duration });
    }
    let pitch = child(node, "pitch")?;
    let step = child_text(pitch, "step").and_then(|s| s.chars().next())?;
    let octave = child_text(pitch, "octave").and_then(|t| t.parse().ok())?;
    let alter = child_text(pitch, "alter").and_then(|t| t.parse().ok()).unwrap_or(0.0);

    let mut tie_start = false;
    let mut tie_stop = false;
    let tie_marks = children(node, "tie")
        .chain(child(node, "notations").into_iter().flat_map(|n| children(n, "tied")));
    for mark in tie_marks {
        match mark.attribute("type") {
            Some("start") => tie_start = true,
            Some("stop") => tie_stop = true,
            _ => {}
        }
    }

    let lyric = child(node, "lyric")
        .and_then(|l| child_text(l, "text"))
        .filter(|t| !t.is_empty())
        .map(str::to_string);

    Some(ElementKind::Note(NotationNote { step, alter, octave, duration, tie_start, tie_stop, lyric, chord }))
}

fn step_and_alter(node: Node, step_name: &str, alter_name: &str) -> Option<(char, i32)> {
    let step = child_text(node, step_name).and_then(|s| s.chars().next())?;
    let alter = child_text(node, alter_name).and_then(|t| t.parse::<f64>().ok()).unwrap_or(0.0);
    Some((step, alter.round() as i32))
}

fn read_harmony(node: Node) -> Option<String> {
    let Some(root) = child(node, "root") else {
        return child_text(node, "function").filter(|t| !t.is_empty()).map(str::to_string);
    };
    let (step, alter) = step_and_alter(root, "root-step", "root-alter")?;
    let kind_node = child(node, "kind");
    let kind = kind_node.and_then(|k| k.text()).map(str::trim).unwrap_or("major");
    let text = kind_node.and_then(|k| k.attribute("text"));
    let bass = child(node, "bass").and_then(|b| step_and_alter(b, "bass-step", "bass-alter"));
    Some(join_symbol(step, alter, kind, text, bass))
}
