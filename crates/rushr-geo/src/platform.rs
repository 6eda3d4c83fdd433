//! Platform geolocation backends
//!
//! Two capabilities exist: the native mobile-shell bridge and the plain
//! browser geolocation API. Both are injected through [`ShellRuntime`]
//! so the service stays testable with fake backends; the service picks
//! one per call based on the runtime predicate.

use std::sync::Arc;

use async_trait::async_trait;

use crate::coords::Position;

/// Native permission state, derived fresh on each check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionState {
    Granted,
    Denied,
    Prompt,
    PromptWithRationale,
}

/// Position request options
#[derive(Debug, Clone, Copy)]
pub struct PositionOptions {
    pub enable_high_accuracy: bool,
    pub timeout_ms: u64,
    /// Maximum acceptable age of a cached fix; 0 = never reuse
    pub maximum_age_ms: u64,
}

impl Default for PositionOptions {
    fn default() -> Self {
        Self {
            enable_high_accuracy: false,
            timeout_ms: 5000,
            maximum_age_ms: 0,
        }
    }
}

impl PositionOptions {
    /// High-accuracy request with no cache tolerance
    pub fn high_accuracy(timeout_ms: u64) -> Self {
        Self {
            enable_high_accuracy: true,
            timeout_ms,
            maximum_age_ms: 0,
        }
    }
}

/// Error reported by the native bridge; carries whatever message the
/// platform supplied, if any
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NativeError {
    pub message: Option<String>,
}

impl NativeError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
        }
    }
}

/// Error reported by the browser geolocation API
///
/// `code` follows the web enumeration; anything outside the three
/// standard values maps to the generic sentence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BrowserError {
    pub code: u16,
    pub message: Option<String>,
}

impl BrowserError {
    pub const PERMISSION_DENIED: u16 = 1;
    pub const POSITION_UNAVAILABLE: u16 = 2;
    pub const TIMEOUT: u16 = 3;

    pub fn new(code: u16, message: impl Into<String>) -> Self {
        Self {
            code,
            message: Some(message.into()),
        }
    }

    pub fn timeout() -> Self {
        Self {
            code: Self::TIMEOUT,
            message: None,
        }
    }
}

/// Opaque native watch identifier (the bridge hands back a token string)
pub type NativeWatchId = String;

/// Numeric browser watch identifier
pub type BrowserWatchId = u64;

/// Continuous updates from the native bridge
pub type NativeWatchSink = Box<dyn FnMut(Result<Position, NativeError>) + Send>;

/// Continuous updates from the browser API
pub type BrowserWatchSink = Box<dyn FnMut(Result<Position, BrowserError>) + Send>;

/// Native shell geolocation bridge
#[async_trait]
pub trait NativeGeolocation: Send + Sync {
    /// Current permission state, queried fresh
    async fn check_permissions(&self) -> Result<PermissionState, NativeError>;

    /// Show the permission prompt and report the resulting state
    async fn request_permissions(&self) -> Result<PermissionState, NativeError>;

    /// One-shot position fix
    async fn current_position(&self, options: PositionOptions) -> Result<Position, NativeError>;

    /// Start a continuous watch; positions and errors both flow through
    /// the sink, matching the bridge's single-callback shape
    async fn watch_position(&self, options: PositionOptions, sink: NativeWatchSink)
        -> NativeWatchId;

    /// Stop a previously started watch
    async fn clear_watch(&self, id: NativeWatchId);
}

/// Browser geolocation API
#[async_trait]
pub trait BrowserGeolocation: Send + Sync {
    /// One-shot position fix
    async fn current_position(&self, options: PositionOptions) -> Result<Position, BrowserError>;

    /// Start a continuous watch; registration is synchronous in the
    /// browser API and the id comes back immediately
    fn watch_position(&self, options: PositionOptions, sink: BrowserWatchSink) -> BrowserWatchId;

    /// Stop a previously started watch
    fn clear_watch(&self, id: BrowserWatchId);
}

/// Host runtime capabilities
///
/// `is_native` is a pure predicate consulted fresh on every operation;
/// the embedding runtime is fixed for the process lifetime in practice,
/// but re-evaluation costs nothing and avoids stale-state bugs.
pub trait ShellRuntime: Send + Sync {
    /// True when running inside the native mobile shell
    fn is_native(&self) -> bool;

    /// Native geolocation bridge; only consulted when `is_native` is true
    fn native_geolocation(&self) -> Option<Arc<dyn NativeGeolocation>>;

    /// Browser geolocation API; `None` means the capability is absent
    fn browser_geolocation(&self) -> Option<Arc<dyn BrowserGeolocation>>;
}
