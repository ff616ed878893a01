// MusicXML export -> import keeps the score, including lyrics, ties,
// harmony with its key context, several voices and part roles

use score_bridge::config::ImportSettings;
use score_bridge::converters::export_musicxml_string;
use score_bridge::{export_musicxml_file, import_musicxml_file, import_musicxml_str, parse_text, to_text, PartRole};

const CHORALE: &str = "\
PART Bass ROLE choir
VOICE 1
MEASURE 1 TIME 4/4
NOTE t=0 dur=1/2 pitch=C3 tie=start
LYRIC t=0 text=A-
NOTE t=1/2 dur=1/2 pitch=G2
LYRIC t=1/2 text=men
MEASURE 2 TIME 4/4
NOTE t=0 dur=1 pitch=C3 tie=stop

PART Organ ROLE instrument
VOICE 1
MEASURE 1 TIME 4/4
HARMONY t=0 symbol=C key=C major
NOTE t=0 dur=3/8 pitch=E4
NOTE t=3/8 dur=1/8 pitch=F#4
HARMONY t=1/2 symbol=G7/B key=C major
NOTE t=1/2 dur=1/2 pitch=G4
MEASURE 2 TIME 4/4
HARMONY t=0 symbol=C key=C major
NOTE t=0 dur=1 pitch=E4
VOICE 2
MEASURE 1 TIME 4/4
NOTE t=0 dur=1/6 pitch=C4
NOTE t=1/6 dur=1/6 pitch=Bb3
NOTE t=1/3 dur=1/6 pitch=C4
REST t=1/2 dur=1/2
MEASURE 2 TIME 4/4
NOTE t=0 dur=1 pitch=C4
";

#[test]
fn test_export_then_import_through_a_file() {
    let mut score = parse_text(CHORALE).expect("chorale should parse");
    score.metadata.title = Some("Amen".to_string());
    score.metadata.composer = Some("Trad.".to_string());

    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("amen.musicxml");
    export_musicxml_file(&score, &path).expect("export should succeed");

    let report = import_musicxml_file(&path, &ImportSettings::default()).expect("import should succeed");
    assert!(report.is_complete(), "skipped: {:?}", report.skipped);
    assert_eq!(
        to_text(&report.score).expect("imported score has a text form"),
        to_text(&score).expect("chorale has a text form")
    );
    assert_eq!(report.score.metadata.title.as_deref(), Some("Amen"));
    assert_eq!(report.score.metadata.composer.as_deref(), Some("Trad."));

    let roles: Vec<PartRole> = report.score.sorted_parts().iter().map(|p| p.role).collect();
    assert_eq!(roles, vec![PartRole::Choir, PartRole::Instrument]);
}

#[test]
fn test_exported_xml_is_well_formed_partwise() {
    let score = parse_text(CHORALE).expect("chorale should parse");
    let xml = export_musicxml_string(&score).expect("export should succeed");
    assert!(xml.contains("<score-partwise version=\"3.1\">"));
    assert!(xml.contains("<instrument-name>Voice</instrument-name>"));
    assert!(xml.contains("<fifths>0</fifths>"));

    let report = import_musicxml_str(&xml, &ImportSettings::default()).expect("re-import");
    assert_eq!(report.score.event_count(), score.event_count());
}

#[test]
fn test_failed_export_leaves_no_file() {
    let score = parse_text("PART Flute ROLE instrument\nVOICE 1\nMEASURE 1 TIME 4/4\nNOTE t=0 dur=1 pitch=C10\n")
        .expect("high note parses");
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("too-high.musicxml");

    assert!(export_musicxml_file(&score, &path).is_err());
    assert!(!path.exists());
    assert_eq!(std::fs::read_dir(dir.path()).expect("list dir").count(), 0);
}
