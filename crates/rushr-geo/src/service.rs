//! Location service
//!
//! One-shot acquisition, continuous tracking, and reverse geocoding over
//! the two platform backends. The runtime predicate is consulted fresh
//! on every call; each operation is independent and shares no state
//! with concurrent calls.

use std::sync::Arc;
use std::time::Duration;

use smol::future;
use smol::Timer;

use crate::coords::Coordinates;
use crate::error::{LocationError, LocationOutcome};
use crate::geocode::ReverseGeocoder;
use crate::platform::{
    BrowserError, BrowserWatchSink, NativeError, NativeWatchSink, PermissionState,
    PositionOptions, ShellRuntime,
};
use crate::watch::WatchHandle;

/// Service configuration
///
/// The two timeouts bound the one-shot request on each path; they feed
/// both the options handed to the backend and the service's own timer,
/// so even a stuck backend resolves to a timeout failure.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub native_timeout: Duration,
    pub browser_timeout: Duration,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            native_timeout: Duration::from_secs(15),
            browser_timeout: Duration::from_secs(10),
        }
    }
}

/// Unified geolocation front-end
pub struct LocationService {
    runtime: Arc<dyn ShellRuntime>,
    geocoder: ReverseGeocoder,
    config: ServiceConfig,
}

impl LocationService {
    pub fn new(runtime: Arc<dyn ShellRuntime>) -> Self {
        Self {
            runtime,
            geocoder: ReverseGeocoder::new(),
            config: ServiceConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ServiceConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_geocoder(mut self, geocoder: ReverseGeocoder) -> Self {
        self.geocoder = geocoder;
        self
    }

    /// Negotiate location permission
    ///
    /// Outside the native shell this is always true; the browser runs
    /// its own prompt during acquisition. In the native shell: granted
    /// passes, a prompt state triggers the request dialog and passes
    /// only if it resolves to granted, and anything else (including a
    /// bridge error) denies.
    pub async fn check_and_request_permission(&self) -> bool {
        if !self.runtime.is_native() {
            return true;
        }
        let Some(native) = self.runtime.native_geolocation() else {
            tracing::warn!("native shell reported but no geolocation bridge present");
            return false;
        };
        let outcome: Result<bool, NativeError> = async {
            match native.check_permissions().await? {
                PermissionState::Granted => Ok(true),
                PermissionState::Prompt | PermissionState::PromptWithRationale => Ok(matches!(
                    native.request_permissions().await?,
                    PermissionState::Granted
                )),
                PermissionState::Denied => Ok(false),
            }
        }
        .await;
        match outcome {
            Ok(granted) => granted,
            Err(err) => {
                tracing::error!(message = ?err.message, "permission check failed");
                false
            }
        }
    }

    /// Acquire a single best-effort location reading
    ///
    /// Never blocks indefinitely: each path races the backend against
    /// its configured timeout. No caching, no retry.
    pub async fn current_location(&self) -> LocationOutcome {
        let is_native = self.runtime.is_native();
        tracing::debug!(native = is_native, "getting location");
        if is_native {
            self.native_location().await
        } else {
            self.browser_location().await
        }
    }

    async fn native_location(&self) -> LocationOutcome {
        if !self.check_and_request_permission().await {
            return Err(LocationError::PermissionDenied);
        }
        let Some(native) = self.runtime.native_geolocation() else {
            return Err(LocationError::Unknown);
        };

        tracing::debug!("requesting native position");
        let options = PositionOptions::high_accuracy(self.config.native_timeout.as_millis() as u64);
        let deadline = async {
            Timer::after(self.config.native_timeout).await;
            Err(NativeError::new("timeout"))
        };
        match future::or(native.current_position(options), deadline).await {
            Ok(position) => {
                tracing::debug!(
                    latitude = position.coords.latitude,
                    longitude = position.coords.longitude,
                    "native position acquired"
                );
                Ok(position.coords)
            }
            Err(err) => {
                tracing::error!(message = ?err.message, "native position request failed");
                Err(classify_native(err))
            }
        }
    }

    async fn browser_location(&self) -> LocationOutcome {
        let Some(browser) = self.runtime.browser_geolocation() else {
            return Err(LocationError::Unsupported);
        };

        tracing::debug!("requesting browser position");
        let options =
            PositionOptions::high_accuracy(self.config.browser_timeout.as_millis() as u64);
        let deadline = async {
            Timer::after(self.config.browser_timeout).await;
            Err(BrowserError::timeout())
        };
        match future::or(browser.current_position(options), deadline).await {
            Ok(position) => {
                tracing::debug!(
                    latitude = position.coords.latitude,
                    longitude = position.coords.longitude,
                    "browser position acquired"
                );
                Ok(position.coords)
            }
            Err(err) => {
                tracing::error!(code = err.code, "browser position request failed");
                Err(classify_browser(&err))
            }
        }
    }

    /// Start continuous position tracking
    ///
    /// Updates flow into `on_position`, failures into `on_error`, until
    /// the returned handle is cancelled. Browser errors pass their raw
    /// message through; only the one-shot path classifies.
    pub fn watch_position(
        &self,
        on_position: impl FnMut(Coordinates) + Send + 'static,
        on_error: impl FnMut(String) + Send + 'static,
    ) -> WatchHandle {
        let options = PositionOptions {
            enable_high_accuracy: true,
            ..PositionOptions::default()
        };
        if self.runtime.is_native() {
            self.watch_native(options, on_position, on_error)
        } else {
            self.watch_browser(options, on_position, on_error)
        }
    }

    fn watch_native(
        &self,
        options: PositionOptions,
        mut on_position: impl FnMut(Coordinates) + Send + 'static,
        mut on_error: impl FnMut(String) + Send + 'static,
    ) -> WatchHandle {
        let Some(native) = self.runtime.native_geolocation() else {
            on_error("Geolocation not supported".to_string());
            return WatchHandle::inert();
        };

        let handle = WatchHandle::pending();
        let gate = handle.clone();
        let sink: NativeWatchSink = Box::new(move |update| {
            if !gate.is_active() {
                return;
            }
            match update {
                Ok(position) => on_position(position.coords),
                Err(err) => on_error(
                    err.message
                        .unwrap_or_else(|| "Watch position error".to_string()),
                ),
            }
        });

        // The bridge hands the watch id back asynchronously; bind it as
        // soon as it lands so a queued cancel can clear it.
        let binder = handle.clone();
        smol::spawn(async move {
            let id = native.watch_position(options, sink).await;
            binder.bind_native(native, id).await;
        })
        .detach();
        handle
    }

    fn watch_browser(
        &self,
        options: PositionOptions,
        mut on_position: impl FnMut(Coordinates) + Send + 'static,
        mut on_error: impl FnMut(String) + Send + 'static,
    ) -> WatchHandle {
        let Some(browser) = self.runtime.browser_geolocation() else {
            on_error("Geolocation not supported".to_string());
            return WatchHandle::inert();
        };

        let handle = WatchHandle::pending();
        let gate = handle.clone();
        let sink: BrowserWatchSink = Box::new(move |update| {
            if !gate.is_active() {
                return;
            }
            match update {
                Ok(position) => on_position(position.coords),
                Err(err) => on_error(err.message.unwrap_or_default()),
            }
        });

        let id = browser.watch_position(options, sink);
        handle.bind_browser(browser, id);
        handle
    }

    /// Resolve coordinates to a display address, falling back to the
    /// coordinate label on any failure
    pub async fn reverse_geocode(&self, latitude: f64, longitude: f64) -> String {
        self.geocoder.reverse_geocode(latitude, longitude).await
    }
}

/// Map a native bridge error onto user-facing wording by inspecting
/// its message, mirroring the platform's loose error surface
fn classify_native(err: NativeError) -> LocationError {
    match err.message {
        Some(msg) if msg.contains("denied") => LocationError::PermissionDenied,
        Some(msg) if msg.contains("timeout") => LocationError::Timeout,
        Some(msg) if msg.contains("unavailable") => LocationError::ServicesUnavailable,
        Some(msg) if !msg.is_empty() => LocationError::Backend(msg),
        _ => LocationError::Unknown,
    }
}

/// Map the browser's standard error codes onto user-facing wording
fn classify_browser(err: &BrowserError) -> LocationError {
    match err.code {
        BrowserError::PERMISSION_DENIED => LocationError::BrowserPermissionDenied,
        BrowserError::POSITION_UNAVAILABLE => LocationError::BrowserPositionUnavailable,
        BrowserError::TIMEOUT => LocationError::BrowserTimeout,
        _ => LocationError::BrowserUnknown,
    }
}
