//! Constraint text appended to a model prompt for the granted categories

use super::Category;

impl Category {
    pub fn description(&self) -> &'static str {
        match self {
            Category::Transpose => "Move every pitch by the same number of semitones",
            Category::RhythmSimplify => "Simplify rhythms, for example dotted figures to straight ones",
            Category::StyleChange => "Change the musical style while keeping the overall structure",
            Category::HarmonicReharm => "Change chord symbols while keeping the melody exactly as it is",
        }
    }

    pub fn allowed_changes(&self) -> &'static [&'static str] {
        match self {
            Category::Transpose => &["pitch step", "alteration", "octave"],
            Category::RhythmSimplify => &["duration", "onset"],
            Category::StyleChange => &["duration", "pitch step", "alteration", "octave", "harmony"],
            Category::HarmonicReharm => &["harmony symbols"],
        }
    }

    pub fn forbidden_changes(&self) -> &'static [&'static str] {
        match self {
            Category::Transpose => &["duration", "onset", "number of notes", "different shifts for different notes"],
            Category::RhythmSimplify => &["pitches", "total length of each measure"],
            Category::StyleChange => &["number of parts", "number of measures"],
            Category::HarmonicReharm => &[
                "melody pitches",
                "melody rhythm",
                "rests",
                "lyrics",
                "part names, roles, voices, measure numbers and time signatures",
            ],
        }
    }
}

/// Constraint block for a prompt; empty when nothing is granted
pub fn prompt_constraints(categories: &[Category]) -> String {
    if categories.is_empty() {
        return String::new();
    }
    let mut sorted = categories.to_vec();
    sorted.sort();
    sorted.dedup();

    let mut lines = vec!["ALLOWED TRANSFORMATIONS:".to_string()];
    for category in &sorted {
        lines.push(format!("- {}: {}", category.as_str().to_uppercase(), category.description()));
        lines.push(format!("  Allowed changes: {}", category.allowed_changes().join(", ")));
        lines.push(format!("  Forbidden changes: {}", category.forbidden_changes().join(", ")));
    }
    lines.push(String::new());
    lines.push("RULES:".to_string());
    lines.push("- Only perform the transformations listed above.".to_string());
    lines.push("- Never make a change listed as forbidden for any granted transformation.".to_string());
    lines.push("- Keep the exact text format: one PART, VOICE, MEASURE or event per line.".to_string());
    lines.join("\n")
}
