//! Geolocation collaborator seam.
//!
//! The actual position source (browser API, system service, fixed config)
//! lives behind [`LocationSource`]; the one policy owned here is the
//! bounded wait, after which acquisition fails with a timeout.

use std::future::Future;
use std::time::Duration;

use crate::types::{Coordinate, LocationError};

/// Supplies the user's current coordinate. Consumed once per trigger.
pub trait LocationSource {
    fn current(&self) -> impl Future<Output = Result<Coordinate, LocationError>> + Send;
}

/// A preconfigured coordinate, for the CLI and tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedLocation(pub Coordinate);

impl LocationSource for FixedLocation {
    async fn current(&self) -> Result<Coordinate, LocationError> {
        Ok(self.0)
    }
}

/// Acquire a coordinate with a bounded wait. Geolocation is the only step
/// with an application-level deadline; HTTP fetches rely on transport
/// timeouts.
pub async fn acquire_with_timeout<S: LocationSource>(
    source: &S,
    deadline: Duration,
) -> Result<Coordinate, LocationError> {
    match tokio::time::timeout(deadline, source.current()).await {
        Ok(result) => result,
        Err(_) => Err(LocationError::Timeout),
    }
}
