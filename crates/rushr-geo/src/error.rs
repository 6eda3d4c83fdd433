//! Location error taxonomy
//!
//! Every variant renders as user-facing prose, never a raw backend code.
//! The native and browser paths keep their own wording for the same
//! failure class; callers display `LocationError` text directly.

use crate::coords::Coordinates;

/// Outcome of a one-shot location request
pub type LocationOutcome = Result<Coordinates, LocationError>;

/// Location acquisition failure
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LocationError {
    /// Native shell: permission denied, or a bridge error mentioning "denied"
    #[error("Location permission denied. Please enable location access in Settings.")]
    PermissionDenied,

    /// Native shell: the fix did not arrive within the timeout
    #[error("Location request timed out. Please try again.")]
    Timeout,

    /// Native shell: location services off (GPS disabled)
    #[error("Location services unavailable. Please ensure GPS is enabled.")]
    ServicesUnavailable,

    /// Browser: user rejected the permission prompt
    #[error("Permission denied. Please allow location access in your browser settings.")]
    BrowserPermissionDenied,

    /// Browser: position could not be determined
    #[error("Location information is unavailable.")]
    BrowserPositionUnavailable,

    /// Browser: the fix did not arrive within the timeout
    #[error("Location request timed out.")]
    BrowserTimeout,

    /// Browser: error code outside the standard three
    #[error("An unknown error occurred.")]
    BrowserUnknown,

    /// No geolocation capability exists at all
    #[error("Geolocation is not supported by your browser.")]
    Unsupported,

    /// Unclassified native failure; the bridge message passes through as-is
    #[error("{0}")]
    Backend(String),

    /// Native failure that carried no message
    #[error("Unknown location error.")]
    Unknown,
}
