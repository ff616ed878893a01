//! Settings for parsing, import, diffing and validation
//!
//! Every field has a default, so an empty YAML document (or no file at all)
//! gives the standard behaviour. The model endpoint lives here as a plain
//! value handed to whichever outer component talks to the model; nothing in
//! this crate opens a connection.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::models::time::{ratio, Rational};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read settings file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid settings: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid settings: {0}")]
    Invalid(String),
}

/// Text-form parsing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextSettings {
    /// Reject measures whose notes and rests exceed the time signature
    pub strict_measure_capacity: bool,
}

impl Default for TextSettings {
    fn default() -> Self {
        Self { strict_measure_capacity: true }
    }
}

/// Notation import
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportSettings {
    /// Skip imported measures that would fail the strict capacity check
    pub strict_measure_capacity: bool,
    /// Lower-case words in an instrument or part name that mark a sung part
    pub vocal_keywords: Vec<String>,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            strict_measure_capacity: true,
            vocal_keywords: [
                "choir", "chorus", "choral", "voice", "vocal", "soprano", "mezzo", "alto", "contralto",
                "tenor", "baritone", "satb",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

/// Semantic diff
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffSettings {
    /// Pitch changes sharing one interval that collapse into a transposition
    pub transposition_min_notes: usize,
    /// Leading measures per voice that feed key estimation
    pub key_window_measures: usize,
    /// Notes shorter than this count as short subdivisions for style labels
    pub short_note_threshold: Rational,
}

impl Default for DiffSettings {
    fn default() -> Self {
        Self {
            transposition_min_notes: 3,
            key_window_measures: 4,
            short_note_threshold: ratio(1, 4),
        }
    }
}

/// Transformation validation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationSettings {
    /// Allowed drift of summed duration per measure under `rhythm_simplify`
    pub rhythm_tolerance: Rational,
}

impl Default for ValidationSettings {
    fn default() -> Self {
        Self { rhythm_tolerance: ratio(1, 32) }
    }
}

/// Where the outer application reaches the text model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelEndpoint {
    pub url: Option<String>,
    pub model: String,
    pub timeout_secs: u64,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for ModelEndpoint {
    fn default() -> Self {
        Self {
            url: None,
            model: "default".to_string(),
            timeout_secs: 60,
            max_tokens: 4096,
            temperature: 0.2,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub text: TextSettings,
    pub import: ImportSettings,
    pub diff: DiffSettings,
    pub validation: ValidationSettings,
    pub model: ModelEndpoint,
}

impl Settings {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let settings: Settings = serde_yaml::from_str(yaml)?;
        settings.check()?;
        Ok(settings)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml_str(&yaml)
    }

    fn check(&self) -> Result<(), ConfigError> {
        if self.diff.transposition_min_notes == 0 {
            return Err(ConfigError::Invalid("diff.transposition_min_notes must be at least 1".into()));
        }
        if self.diff.short_note_threshold <= ratio(0, 1) {
            return Err(ConfigError::Invalid("diff.short_note_threshold must be positive".into()));
        }
        if self.validation.rhythm_tolerance < ratio(0, 1) {
            return Err(ConfigError::Invalid("validation.rhythm_tolerance must not be negative".into()));
        }
        if !(0.0..=2.0).contains(&self.model.temperature) {
            return Err(ConfigError::Invalid("model.temperature must be between 0 and 2".into()));
        }
        Ok(())
    }
}
