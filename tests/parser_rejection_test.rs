// Parser rejection: malformed or musically corrupt text never yields a
// score, and every problem is reported with its line and category

use score_bridge::parse::TextParser;
use score_bridge::config::TextSettings;
use score_bridge::{parse_text, DiagnosticKind};

fn measure_with(events: &str) -> String {
    format!("PART Soprano ROLE choir\nVOICE 1\nMEASURE 1 TIME 4/4\n{}", events)
}

#[test]
fn test_overlapping_notes_are_rejected() {
    let text = measure_with("NOTE t=0 dur=1/2 pitch=C4\nNOTE t=1/4 dur=1/4 pitch=D4\n");
    let diagnostics = parse_text(&text).expect_err("overlap must be rejected");

    assert!(diagnostics.has_kind(DiagnosticKind::Musical));
    let messages = diagnostics.messages();
    assert!(
        messages.iter().any(|m| m.contains("musical error") && m.contains("starts before")),
        "unexpected messages: {:?}",
        messages
    );
}

#[test]
fn test_negative_onset_and_zero_duration_are_rejected() {
    let text = measure_with("NOTE t=-1/4 dur=1/4 pitch=C4\nREST t=1/4 dur=0\n");
    let diagnostics = parse_text(&text).expect_err("negative values must be rejected");

    let messages = diagnostics.messages();
    assert_eq!(messages.len(), 2, "both lines are reported: {:?}", messages);
    assert!(messages[0].starts_with("Line 4: musical error"));
    assert!(messages[0].contains("negative"));
    assert!(messages[1].starts_with("Line 5: musical error"));
}

#[test]
fn test_every_line_is_checked() {
    let text = "\
PART Bass ROLE drums
VOICE 1
MEASURE one TIME 4/4
NOTE t=0 dur=1 pitch=C4
VOICE 2
MEASURE 1 TIME 4/4
NOTE t=0 dur=0.5 pitch=C3
REST t=1/2 dur=1/2
";
    let diagnostics = parse_text(text).expect_err("several problems");
    let lines: Vec<usize> = diagnostics.entries.iter().map(|d| d.line).collect();
    assert!(lines.contains(&1), "bad role reported: {}", diagnostics);
    assert!(lines.contains(&3), "bad measure number reported: {}", diagnostics);
    assert!(lines.contains(&7), "decimal duration reported: {}", diagnostics);
    assert!(!lines.contains(&4), "events under a broken header raise no follow-on errors: {}", diagnostics);
    assert!(diagnostics.has_kind(DiagnosticKind::Format));
}

#[test]
fn test_structure_problems() {
    let diagnostics = parse_text("").expect_err("empty text");
    assert!(diagnostics.to_string().contains("no PART"));

    let diagnostics = parse_text("PART Alto ROLE choir\nVOICE 1\n").expect_err("voice without measures");
    assert!(diagnostics.has_kind(DiagnosticKind::Structure));

    let diagnostics = parse_text("NOTE t=0 dur=1/4 pitch=C4\n").expect_err("event outside a measure");
    assert!(diagnostics.has_kind(DiagnosticKind::Structure));
}

#[test]
fn test_capacity_is_configurable() {
    let text = measure_with("NOTE t=0 dur=1 pitch=C4\nNOTE t=1 dur=1/4 pitch=D4\n");
    assert!(parse_text(&text).is_err(), "strict by default");

    let lenient = TextParser::new(TextSettings { strict_measure_capacity: false });
    assert!(lenient.parse(&text).is_ok());
}

#[test]
fn test_extreme_fractions_are_diagnosed_not_fatal() {
    let text = measure_with("NOTE t=1/4294967291 dur=1/4294967279 pitch=C4\nNOTE t=1/2 dur=1/4 pitch=D4\n");
    let diagnostics = parse_text(&text).expect_err("out-of-range fractions must be rejected");
    assert!(diagnostics.has_kind(DiagnosticKind::Format));
    let messages = diagnostics.messages();
    assert!(
        messages.iter().any(|m| m.starts_with("Line 4:") && m.contains("out of range")),
        "unexpected messages: {:?}",
        messages
    );

    // In range one by one, but their sum needs a denominator past i64
    let text = measure_with(
        "NOTE t=0 dur=1/999983 pitch=C4\nNOTE t=1/4 dur=1/999979 pitch=D4\n\
         NOTE t=1/2 dur=1/999961 pitch=E4\nNOTE t=3/4 dur=1/999959 pitch=F4\n",
    );
    let diagnostics = parse_text(&text).expect_err("unsummable measure must be rejected");
    assert!(diagnostics.has_kind(DiagnosticKind::Musical));
    assert!(
        diagnostics.messages().iter().any(|m| m.contains("too finely")),
        "unexpected messages: {:?}",
        diagnostics.messages()
    );
}
