use super::*;
use crate::models::time::ratio;

const TWO_VOICES: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<score-partwise version="3.1">
  <work><work-title>Ave</work-title></work>
  <identification><creator type="composer">Anon</creator></identification>
  <part-list>
    <score-part id="P1">
      <part-name>Women</part-name>
      <score-instrument id="P1-I1"><instrument-name>Choir Aahs</instrument-name></score-instrument>
    </score-part>
  </part-list>
  <part id="P1">
    <measure number="1">
      <attributes>
        <divisions>2</divisions>
        <key><fifths>-1</fifths><mode>major</mode></key>
        <time><beats>3</beats><beat-type>4</beat-type></time>
      </attributes>
      <harmony><root><root-step>F</root-step></root><kind>major</kind></harmony>
      <note><pitch><step>F</step><octave>4</octave></pitch><duration>4</duration><voice>1</voice>
        <lyric number="1"><syllabic>single</syllabic><text>A</text></lyric></note>
      <note><chord/><pitch><step>A</step><octave>4</octave></pitch><duration>4</duration><voice>1</voice></note>
      <note><pitch><step>B</step><alter>-1</alter><octave>4</octave></pitch><duration>2</duration><voice>1</voice>
        <tie type="start"/></note>
      <backup><duration>6</duration></backup>
      <note><rest/><duration>2</duration><voice>2</voice></note>
      <note><pitch><step>C</step><octave>4</octave></pitch><duration>4</duration><voice>2</voice></note>
    </measure>
    <measure number="2">
      <note><pitch><step>B</step><alter>-1</alter><octave>4</octave></pitch><duration>6</duration><voice>1</voice>
        <notations><tied type="stop"/></notations></note>
    </measure>
  </part>
</score-partwise>"#;

#[test]
fn test_read_metadata_and_parts() {
    let doc = MusicXmlAdapter.read(TWO_VOICES).unwrap();
    assert_eq!(doc.title.as_deref(), Some("Ave"));
    assert_eq!(doc.composer.as_deref(), Some("Anon"));
    assert_eq!(doc.lyricist, None);
    assert_eq!(doc.parts.len(), 1);
    assert_eq!(doc.parts[0].name, "Women");
    assert_eq!(doc.parts[0].instruments, vec!["Choir Aahs".to_string()]);
}

#[test]
fn test_read_positions_with_chord_and_backup() {
    let doc = MusicXmlAdapter.read(TWO_VOICES).unwrap();
    let measure = &doc.parts[0].measures[0];
    assert_eq!(measure.divisions, 2);
    assert_eq!(measure.time, Some((3, 4)));
    assert_eq!(measure.key.as_ref().and_then(|k| k.name()).as_deref(), Some("F major"));

    let offsets: Vec<i64> = measure.elements.iter().map(|e| e.offset).collect();
    assert_eq!(offsets, vec![0, 0, 0, 4, 0, 2]);

    let ElementKind::Note(chord_tone) = &measure.elements[2].kind else { panic!("expected a note") };
    assert!(chord_tone.chord);
    let ElementKind::Note(tied) = &measure.elements[3].kind else { panic!("expected a note") };
    assert!(tied.tie_start && !tied.tie_stop);
    assert_eq!(tied.alter, -1.0);
    assert_eq!(measure.elements[0].kind, ElementKind::Harmony { symbol: "F".to_string() });

    // divisions carry into the next measure
    let second = &doc.parts[0].measures[1];
    assert_eq!(second.divisions, 2);
    let ElementKind::Note(held) = &second.elements[0].kind else { panic!("expected a note") };
    assert!(held.tie_stop);
}

#[test]
fn test_timewise_is_unsupported() {
    let err = MusicXmlAdapter.read("<score-timewise version=\"3.1\"/>").unwrap_err();
    assert!(matches!(err, ImportError::UnsupportedFormat(_)));
    assert!(matches!(MusicXmlAdapter.read("<score-partwise>").unwrap_err(), ImportError::InvalidXml(_)));
    assert!(matches!(
        MusicXmlAdapter.read("<score-partwise version=\"3.1\"/>").unwrap_err(),
        ImportError::MissingElement(_)
    ));
}

#[test]
fn test_write_then_read_keeps_document() {
    let original = MusicXmlAdapter.read(TWO_VOICES).unwrap();
    let xml = MusicXmlAdapter.write(&original).unwrap();
    assert!(xml.contains("<backup>"));
    assert!(xml.contains("<kind text=\"\">major</kind>"));
    let reread = MusicXmlAdapter.read(&xml).unwrap();
    assert_eq!(reread, original);
}

#[test]
fn test_escaping_in_names() {
    let doc = NotationDocument {
        title: Some("Salt & <Light>".to_string()),
        parts: vec![NotationPart { id: "P1".to_string(), name: "Tenor & Bass".to_string(), ..Default::default() }],
        ..Default::default()
    };
    let xml = MusicXmlAdapter.write(&doc).unwrap();
    assert!(xml.contains("Salt &amp; &lt;Light&gt;"));
    let reread = MusicXmlAdapter.read(&xml).unwrap();
    assert_eq!(reread.title.as_deref(), Some("Salt & <Light>"));
    assert_eq!(reread.parts[0].name, "Tenor & Bass");
}

#[test]
fn test_note_types() {
    use writer::{note_type, NoteType};
    assert_eq!(note_type(ratio(1, 4)), Some(NoteType { name: "quarter", dots: 0, triplet: false }));
    assert_eq!(note_type(ratio(3, 8)), Some(NoteType { name: "quarter", dots: 1, triplet: false }));
    assert_eq!(note_type(ratio(1, 12)), Some(NoteType { name: "eighth", dots: 0, triplet: true }));
    assert_eq!(note_type(ratio(5, 8)), None);
}
