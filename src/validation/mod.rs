//! Guard for model-generated edits
//!
//! The caller grants a set of change categories; a transformed score is only
//! accepted when every granted category's checks pass and the transformed
//! score is free of overlapping events. No grant, or a grant naming an
//! unknown category, always rejects. Rejection is a normal outcome reported
//! in a [`ValidationReport`], not an error.

pub mod checks;
pub mod prompt;

pub use prompt::prompt_constraints;

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::config::ValidationSettings;
use crate::models::Score;

/// A category of permitted change
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Transpose,
    RhythmSimplify,
    StyleChange,
    HarmonicReharm,
}

impl Category {
    pub const ALL: [Category; 4] =
        [Category::Transpose, Category::RhythmSimplify, Category::StyleChange, Category::HarmonicReharm];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Transpose => "transpose",
            Category::RhythmSimplify => "rhythm_simplify",
            Category::StyleChange => "style_change",
            Category::HarmonicReharm => "harmonic_reharm",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCategory(pub String);

impl fmt::Display for UnknownCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown transformation category '{}'", self.0)
    }
}

impl std::error::Error for UnknownCategory {}

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

/// Accept/reject plus every violation found
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ValidationReport {
    pub accepted: bool,
    pub violations: Vec<String>,
}

impl ValidationReport {
    fn from_violations(violations: Vec<String>) -> Self {
        Self { accepted: violations.is_empty(), violations }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TransformationValidator {
    settings: ValidationSettings,
}

impl TransformationValidator {
    pub fn new(settings: ValidationSettings) -> Self {
        Self { settings }
    }

    /// Check `transformed` against `original` under the granted category tags
    pub fn validate<S: AsRef<str>>(&self, original: &Score, transformed: &Score, tags: &[S]) -> ValidationReport {
        if tags.is_empty() {
            return ValidationReport::from_violations(vec![
                "No transformation categories were granted, so no change is allowed".to_string(),
            ]);
        }

        let mut violations = Vec::new();
        let mut granted = BTreeSet::new();
        for tag in tags {
            match tag.as_ref().parse::<Category>() {
                Ok(category) => {
                    granted.insert(category);
                }
                Err(unknown) => violations.push(format!("Rejected: {}", unknown)),
            }
        }

        for category in &granted {
            let found = match category {
                Category::Transpose => checks::check_transpose(original, transformed),
                Category::RhythmSimplify => {
                    checks::check_rhythm_simplify(original, transformed, self.settings.rhythm_tolerance)
                }
                Category::StyleChange => checks::check_style_change(original, transformed),
                Category::HarmonicReharm => checks::check_harmonic_reharm(original, transformed),
            };
            violations.extend(found);
        }
        violations.extend(checks::check_overlaps(transformed));

        if !violations.is_empty() {
            log::info!("transformation rejected with {} violation(s)", violations.len());
        }
        ValidationReport::from_violations(violations)
    }
}

/// Validate with default settings
pub fn validate_transformation<S: AsRef<str>>(original: &Score, transformed: &Score, tags: &[S]) -> ValidationReport {
    TransformationValidator::default().validate(original, transformed, tags)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_text;

    fn score() -> Score {
        parse_text("PART Alto ROLE choir\nVOICE 1\nMEASURE 1 TIME 2/4\nNOTE t=0 dur=1/2 pitch=A4\n").unwrap()
    }

    #[test]
    fn test_category_names() {
        for category in Category::ALL {
            assert_eq!(category.as_str().parse::<Category>(), Ok(category));
        }
        assert!("transposition".parse::<Category>().is_err());
    }

    #[test]
    fn test_no_grant_rejects_even_identical_scores() {
        let report = validate_transformation::<&str>(&score(), &score(), &[]);
        assert!(!report.accepted);
        assert_eq!(report.violations.len(), 1);
    }

    #[test]
    fn test_unknown_tag_rejects() {
        let report = validate_transformation(&score(), &score(), &["transpose", "add_drums"]);
        assert!(!report.accepted);
        assert!(report.violations[0].contains("add_drums"));
    }
}
