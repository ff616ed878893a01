// Text form round trip: parse(to_text(score)) reproduces the score, and
// serialization is byte-for-byte deterministic. Trees come from the parser,
// from code and from MusicXML import.

use score_bridge::config::ImportSettings;
use score_bridge::models::time::{ratio, zero};
use score_bridge::{
    import_musicxml_str, parse_text, to_text, Event, HarmonyEvent, LyricEvent, Measure, NoteEvent, Part, PartRole,
    Pitch, RestEvent, Score, Step, Tie, TimeSignature, Voice,
};

const SATB_EXCERPT: &str = "\
PART Alto ROLE choir
VOICE 1
MEASURE 1 TIME 3/4
NOTE t=0 dur=1/2 pitch=E4 tie=start
LYRIC t=0 text=Glo - ri - a
NOTE t=1/2 dur=1/4 pitch=F#4
MEASURE 2 TIME 3/4
NOTE t=0 dur=3/8 pitch=E4 tie=stop
NOTE t=3/8 dur=1/8 pitch=Bb3
REST t=1/2 dur=1/4

PART Piano Right Hand ROLE instrument
VOICE 1
MEASURE 1 TIME 3/4
HARMONY t=0 symbol=Cmaj7 key=C major
NOTE t=0 dur=1/12 pitch=C5
NOTE t=1/12 dur=1/12 pitch=D5
NOTE t=1/6 dur=1/12 pitch=E5
REST t=1/4 dur=1/2
VOICE 2
MEASURE 1 TIME 3/4
NOTE t=0 dur=3/4 pitch=Gx3
";

#[test]
fn test_parse_serialize_parse_is_stable() {
    let score = parse_text(SATB_EXCERPT).expect("excerpt should parse");
    let text = to_text(&score).expect("parsed score has a text form");
    let reparsed = parse_text(&text).expect("serialized text should parse");

    assert_eq!(reparsed.canonical(), score.canonical());
    assert_eq!(to_text(&reparsed).expect("text form"), text, "serializing twice must give identical bytes");
}

#[test]
fn test_parsed_content_is_exact() {
    let score = parse_text(SATB_EXCERPT).expect("excerpt should parse").canonical();
    assert_eq!(score.parts.len(), 2);

    let alto = &score.parts[0];
    assert_eq!(alto.name, "Alto");
    assert_eq!(alto.role, PartRole::Choir);

    let lyric = alto.voices[0].measures[0]
        .events
        .iter()
        .find_map(|e| match e {
            Event::Lyric(l) => Some(l.text.clone()),
            _ => None,
        })
        .expect("lyric event");
    assert_eq!(lyric, "Glo - ri - a");

    let piano = &score.parts[1];
    assert_eq!(piano.name, "Piano Right Hand");
    assert_eq!(piano.voices.len(), 2);
    let right_hand = piano.voices[0].measures[0].notes();
    let triplet = right_hand[1];
    assert_eq!(triplet.onset, ratio(1, 12));
    assert_eq!(triplet.duration, ratio(1, 12));
    assert_eq!(piano.voices[1].measures[0].notes()[0].pitch.alteration, 2);
}

#[test]
fn test_serialization_is_canonical_regardless_of_input_order() {
    let shuffled = "\
PART Tenor ROLE choir
VOICE 2
MEASURE 2 TIME 2/4
NOTE t=1/4 dur=1/4 pitch=D4
NOTE t=0 dur=1/4 pitch=C4
MEASURE 1 TIME 2/4
REST t=0 dur=1/2
VOICE 1
MEASURE 1 TIME 2/4
REST t=0 dur=1/2
PART Bass ROLE choir
VOICE 1
MEASURE 1 TIME 2/4
NOTE t=0 dur=1/2 pitch=C3
";
    let text = to_text(&parse_text(shuffled).expect("shuffled input should parse")).expect("text form");
    let headers: Vec<&str> = text
        .lines()
        .filter(|l| l.starts_with("PART") || l.starts_with("VOICE") || l.starts_with("MEASURE"))
        .collect();
    assert_eq!(
        headers,
        vec![
            "PART Bass ROLE choir",
            "VOICE 1",
            "MEASURE 1 TIME 2/4",
            "PART Tenor ROLE choir",
            "VOICE 1",
            "MEASURE 1 TIME 2/4",
            "VOICE 2",
            "MEASURE 1 TIME 2/4",
            "MEASURE 2 TIME 2/4",
        ]
    );
    assert!(text.contains("NOTE t=0 dur=1/4 pitch=C4\nNOTE t=1/4 dur=1/4 pitch=D4"));
}

/// Parts built in code use their name as id, like parsed parts do
fn built_score() -> Score {
    let mut low = Measure::new(1, TimeSignature::new(6, 8));
    low.events = vec![
        Event::Note(NoteEvent {
            onset: zero(),
            duration: ratio(3, 8),
            pitch: Pitch::new(Step::A, -2, 0),
            tie: Some(Tie::Start),
        }),
        Event::Harmony(HarmonyEvent {
            onset: zero(),
            symbol: "Cadd9/G".to_string(),
            key: Some("Bb minor".to_string()),
        }),
        Event::Lyric(LyricEvent { onset: zero(), text: "Ky - ri - e e - lei - son".to_string() }),
        Event::Note(NoteEvent {
            onset: ratio(3, 8),
            duration: ratio(1, 24),
            pitch: Pitch::new(Step::C, 2, 9),
            tie: None,
        }),
        Event::Rest(RestEvent { onset: ratio(5, 12), duration: ratio(1, 3) }),
    ];
    let mut voice = Voice::new("upper-2");
    voice.measures.push(low);
    let mut part = Part::new("Basso Continuo II", "Basso Continuo II", PartRole::Instrument);
    part.voices.push(voice);
    Score::new(vec![part])
}

#[test]
fn test_tree_built_in_code_round_trips() {
    let score = built_score();
    let text = to_text(&score).expect("built score has a text form");
    assert!(text.contains("NOTE t=0 dur=3/8 pitch=Abb0 tie=start"));
    assert!(text.contains("HARMONY t=0 symbol=Cadd9/G key=Bb minor"));
    assert!(text.contains("LYRIC t=0 text=Ky - ri - e e - lei - son"));

    let reparsed = parse_text(&text).expect("serialized text should parse");
    assert_eq!(reparsed.canonical(), score.canonical());
}

#[test]
fn test_tree_without_a_spelling_is_refused_not_mangled() {
    let mut score = built_score();
    score.parts[0].name = "Basso  Continuo".to_string();
    let error = to_text(&score).expect_err("a double space cannot survive a re-parse");
    assert_eq!(error.field, "part name");

    let mut score = built_score();
    if let Event::Note(note) = &mut score.parts[0].voices[0].measures[0].events[0] {
        note.pitch = Pitch::new(Step::C, 0, -1);
    }
    assert_eq!(to_text(&score).expect_err("negative octave").field, "pitch");
}

const UNTIDY_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<score-partwise version="3.1">
  <part-list>
    <score-part id="P1"><part-name>Piano   Right
      Hand</part-name></score-part>
  </part-list>
  <part id="P1">
    <measure number="1">
      <attributes>
        <divisions>2</divisions><key><fifths>-2</fifths></key>
        <time><beats>2</beats><beat-type>4</beat-type></time>
      </attributes>
      <harmony><root><root-step>C</root-step></root><kind text="add 9">major</kind></harmony>
      <note><pitch><step>C</step><octave>9</octave></pitch><duration>2</duration><voice>1</voice>
        <lyric><text>Ky  rie</text></lyric></note>
      <note><pitch><step>B</step><alter>-1</alter><octave>0</octave></pitch>
        <duration>2</duration><voice>1</voice></note>
      <backup><duration>4</duration></backup>
      <note><pitch><step>C</step><octave>-1</octave></pitch><duration>4</duration><voice>2</voice></note>
    </measure>
  </part>
</score-partwise>"#;

#[test]
fn test_imported_edge_values_round_trip() {
    let report = import_musicxml_str(UNTIDY_XML, &ImportSettings::default()).expect("document is readable");
    let skipped: Vec<(&str, Option<&str>)> =
        report.skipped.iter().map(|s| (s.element_type.as_str(), s.voice.as_deref())).collect();
    assert_eq!(skipped, vec![("voice-measure", Some("2"))], "octave -1 has no spelling");

    let score = &report.score;
    assert_eq!(score.parts[0].name, "Piano Right Hand");
    let text = to_text(score).expect("imported score has a text form");
    assert!(text.contains("symbol=Cadd9"), "{}", text);
    assert!(text.contains("LYRIC t=0 text=Ky rie"), "{}", text);
    assert!(text.contains("pitch=C9") && text.contains("pitch=Bb0"), "{}", text);

    let reparsed = parse_text(&text).expect("imported text should parse");
    assert_eq!(to_text(&reparsed).expect("text form"), text);
}
