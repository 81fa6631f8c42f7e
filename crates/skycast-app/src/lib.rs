//! Request orchestration for Skycast: cache guard in front of the
//! weather, geocoding and commentary collaborators.

pub mod orchestrator;

pub use orchestrator::{FetchOutcome, Orchestrator, WeatherReport};
