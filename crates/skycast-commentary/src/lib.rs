//! Persona weather commentary for Skycast
//!
//! Client for a Gemini-style text-generation API that turns a weather
//! brief into stylized persona commentary. The model is asked for strict
//! JSON; responses wrapped in code fences are unwrapped before parsing,
//! and anything still unparsable is a typed error rather than a panic or
//! a silently empty result.

pub mod client;
pub mod persona;
pub mod types;

pub use client::CommentaryClient;
pub use persona::{Persona, PersonaScope};
pub use types::{CommentaryEntry, CommentaryError, CommentarySet, DayBrief, WeatherBrief};
