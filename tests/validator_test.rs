// Transformation validator: granted categories decide what a model edit
// may change, everything else is rejected with a readable reason

use score_bridge::validation::prompt_constraints;
use score_bridge::{parse_text, validate_transformation, Category, Score};

fn line(notes: &[&str]) -> Score {
    let mut text = String::from("PART Soprano ROLE choir\nVOICE 1\nMEASURE 1 TIME 3/4\n");
    for (i, pitch) in notes.iter().enumerate() {
        text.push_str(&format!("NOTE t={}/4 dur=1/4 pitch={}\n", i, pitch));
    }
    parse_text(&text).expect("test score should parse")
}

fn with_harmony(symbol: &str, melody: &[&str]) -> Score {
    let mut text = String::from("PART Piano ROLE instrument\nVOICE 1\nMEASURE 1 TIME 3/4\n");
    text.push_str(&format!("HARMONY t=0 symbol={}\n", symbol));
    for (i, pitch) in melody.iter().enumerate() {
        text.push_str(&format!("NOTE t={}/4 dur=1/4 pitch={}\n", i, pitch));
    }
    parse_text(&text).expect("test score should parse")
}

#[test]
fn test_uniform_transposition_is_accepted() {
    let original = line(&["C4", "D4", "E4"]);
    let up_a_third = line(&["E4", "F#4", "G#4"]);
    let report = validate_transformation(&original, &up_a_third, &["transpose"]);
    assert!(report.accepted, "violations: {:?}", report.violations);
    assert!(report.violations.is_empty());
}

#[test]
fn test_mixed_shifts_are_rejected_as_inconsistent() {
    let original = line(&["C4", "D4", "E4"]);
    let uneven = line(&["Eb4", "F4", "G#4"]);
    let report = validate_transformation(&original, &uneven, &["transpose"]);
    assert!(!report.accepted);
    assert!(
        report.violations.iter().any(|v| v.contains("inconsistent")),
        "violations: {:?}",
        report.violations
    );
}

#[test]
fn test_reharmonization_keeps_melody() {
    let original = with_harmony("C", &["E4", "G4", "C5"]);
    let reharmonized = with_harmony("Am7", &["E4", "G4", "C5"]);
    let report = validate_transformation(&original, &reharmonized, &["harmonic_reharm"]);
    assert!(report.accepted, "violations: {:?}", report.violations);

    let melody_changed = with_harmony("Am7", &["E4", "A4", "C5"]);
    let report = validate_transformation(&original, &melody_changed, &["harmonic_reharm"]);
    assert!(!report.accepted);
    assert!(report.violations.iter().any(|v| v.contains("melody")), "violations: {:?}", report.violations);
}

#[test]
fn test_reharmonization_rejects_changes_outside_the_chords() {
    let original = parse_text(
        "PART P ROLE instrument\nVOICE 1\nMEASURE 1 TIME 4/4\nHARMONY t=0 symbol=C\n\
         NOTE t=0 dur=1/4 pitch=C4\nREST t=1/4 dur=3/4\nLYRIC t=0 text=la\n",
    )
    .expect("original should parse");
    let rewritten = parse_text(
        "PART Q ROLE choir\nVOICE 7\nMEASURE 9 TIME 3/4\nHARMONY t=1/2 symbol=Am\n\
         NOTE t=0 dur=1/4 pitch=C4\nLYRIC t=0 text=other words\n",
    )
    .expect("rewrite should parse");

    let report = validate_transformation(&original, &rewritten, &["harmonic_reharm"]);
    assert!(!report.accepted);
    for expected in ["renamed part P to Q", "role", "voice 1", "measure 9", "time signature", "rests", "lyrics"] {
        assert!(
            report.violations.iter().any(|v| v.contains(expected)),
            "no '{}' in {:?}",
            expected,
            report.violations
        );
    }
}

#[test]
fn test_empty_grant_rejects() {
    let original = line(&["C4", "D4", "E4"]);
    let report = validate_transformation::<&str>(&original, &original.clone(), &[]);
    assert!(!report.accepted);
    assert_eq!(report.violations.len(), 1);
}

#[test]
fn test_unknown_category_rejects() {
    let original = line(&["C4", "D4", "E4"]);
    let report = validate_transformation(&original, &original.clone(), &["make_it_jazzy"]);
    assert!(!report.accepted);
    assert_eq!(report.violations, vec!["Rejected: unknown transformation category 'make_it_jazzy'".to_string()]);
}

#[test]
fn test_prompt_constraints_name_granted_categories() {
    let text = prompt_constraints(&[Category::Transpose]);
    assert!(text.contains("TRANSPOSE"));
    assert!(text.contains("Forbidden changes: duration"));
}
