//! Rushr geolocation
//!
//! Unified location acquisition for the Rushr app: one contract over
//! the native mobile-shell bridge and the browser geolocation API.
//!
//! # Features
//! - Permission negotiation with deny-by-default error handling
//! - One-shot high-accuracy acquisition with per-path timeouts
//! - Continuous tracking with idempotent cancellation
//! - Best-effort reverse geocoding via OpenStreetMap Nominatim
//!
//! Backends are injected through [`ShellRuntime`], so the service runs
//! against fakes in tests and against the real platform bridges in the
//! app shell.
//!
//! # Example
//! ```rust,ignore
//! use rushr_geo::LocationService;
//!
//! let service = LocationService::new(runtime);
//! match service.current_location().await {
//!     Ok(coords) => println!("{}", service.reverse_geocode(coords.latitude, coords.longitude).await),
//!     Err(err) => eprintln!("{err}"),
//! }
//! ```

pub mod coords;
pub mod error;
pub mod geocode;
pub mod platform;
pub mod service;
pub mod watch;

pub use coords::{Coordinates, Position};
pub use error::{LocationError, LocationOutcome};
pub use geocode::{GeocodeError, GeocodeTransport, HttpTransport, ReverseGeocoder};
pub use platform::{
    BrowserError, BrowserGeolocation, BrowserWatchId, BrowserWatchSink, NativeError,
    NativeGeolocation, NativeWatchId, NativeWatchSink, PermissionState, PositionOptions,
    ShellRuntime,
};
pub use service::{LocationService, ServiceConfig};
pub use watch::WatchHandle;
