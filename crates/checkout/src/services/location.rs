//! Device geolocation contract.
//!
//! The real provider lives in the host shell (platform location services plus
//! the runtime permission prompt); the subsystem only consumes this seam.

use std::time::Duration;

use async_trait::async_trait;
use mockall::automock;
use thiserror::Error;

use crate::models::Coordinates;

/// Failures from the device location provider.
///
/// "Can't get a location" splits into two reportable kinds so the caller can
/// tell a denied permission from a fix that never arrived.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocateError {
    /// The user denied the location permission.
    #[error("location permission denied")]
    PermissionDenied,

    /// No fix arrived within the requested timeout.
    #[error("location request timed out")]
    Timeout,
}

/// Device geolocation provider.
#[automock]
#[async_trait]
pub trait LocationProvider: Send + Sync {
    /// Resolve the device's current position, waiting at most `timeout`.
    async fn current_position(&self, timeout: Duration) -> Result<Coordinates, LocateError>;
}
