use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Weather summary handed to the generator. Deliberately independent of
/// the provider's types; the caller maps its snapshot into this brief.
#[derive(Debug, Clone, Serialize)]
pub struct WeatherBrief {
    pub description: String,
    pub temperature: f64,
    pub apparent_temperature: f64,
    pub humidity: u8,
    pub wind_speed: f64,
    pub is_day: bool,
    /// Today's curve as (label, temperature) points, e.g. ("morning", 15.5).
    pub timeline: Vec<(String, f64)>,
    pub tomorrow: Option<DayBrief>,
    pub after_tomorrow: Option<DayBrief>,
}

/// One upcoming day in the brief.
#[derive(Debug, Clone, Serialize)]
pub struct DayBrief {
    pub description: String,
    pub min_temp: f64,
    pub max_temp: f64,
}

/// One persona's commentary. The response contract changed shape over
/// time: early revisions returned a plain string, later ones a
/// `{text, outfit}` object. Both remain valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CommentaryEntry {
    Styled { text: String, outfit: String },
    Plain(String),
}

impl CommentaryEntry {
    pub fn text(&self) -> &str {
        match self {
            CommentaryEntry::Styled { text, .. } => text,
            CommentaryEntry::Plain(text) => text,
        }
    }

    pub fn outfit(&self) -> Option<&str> {
        match self {
            CommentaryEntry::Styled { outfit, .. } => Some(outfit),
            CommentaryEntry::Plain(_) => None,
        }
    }
}

/// Persona key -> commentary, as returned by the generator.
pub type CommentarySet = BTreeMap<String, CommentaryEntry>;

/// Commentary generation errors.
///
/// `InvalidResponse` is deliberately distinct from `Network`: the model
/// answered, but not with parseable JSON. The raw text is kept for
/// diagnosis.
#[derive(Debug, thiserror::Error)]
pub enum CommentaryError {
    #[error("Missing API key")]
    MissingApiKey,
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Generator returned status {status}: {body}")]
    Api { status: u16, body: String },
    #[error("Generator response contained no text")]
    EmptyResponse,
    #[error("Invalid AI response (not parseable JSON)")]
    InvalidResponse { raw: String },
}
