//! Weather data access for Skycast
//!
//! Provides weather data via the Open-Meteo API, reverse geocoding via
//! Nominatim, and a single-slot forecast cache keyed by geographic
//! proximity and age.

pub mod cache;
pub mod geo;
pub mod geocode;
pub mod location;
pub mod provider;
pub mod types;

pub use cache::{CacheMiss, CachePolicy, ForecastCache};
pub use geo::haversine_km;
pub use geocode::ReverseGeocoder;
pub use location::{acquire_with_timeout, FixedLocation, LocationSource};
pub use provider::WeatherProvider;
pub use types::*;
