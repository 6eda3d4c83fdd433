//! Fake platform backends for service tests

// Each test binary uses a different subset of the fakes.
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use smol::Timer;

use rushr_geo::{
    BrowserError, BrowserGeolocation, BrowserWatchId, BrowserWatchSink, Coordinates, NativeError,
    NativeGeolocation, NativeWatchId, NativeWatchSink, PermissionState, Position, PositionOptions,
    ShellRuntime,
};

pub fn pos(latitude: f64, longitude: f64) -> Position {
    Position::new(Coordinates::new(latitude, longitude).with_accuracy(5.0), 0)
}

/// Scriptable native bridge
pub struct FakeNative {
    pub check: Result<PermissionState, NativeError>,
    pub request: Result<PermissionState, NativeError>,
    /// Queued one-shot responses, consumed in order; each entry delays
    /// before resolving
    pub responses: Mutex<Vec<(Duration, Result<Position, NativeError>)>>,
    pub watch_delay: Option<Duration>,
    pub check_calls: AtomicUsize,
    pub request_calls: AtomicUsize,
    pub position_calls: AtomicUsize,
    pub last_options: Mutex<Option<PositionOptions>>,
    pub watch_sink: Mutex<Option<NativeWatchSink>>,
    pub cleared: Mutex<Vec<NativeWatchId>>,
}

impl FakeNative {
    pub fn new() -> Self {
        Self {
            check: Ok(PermissionState::Granted),
            request: Ok(PermissionState::Granted),
            responses: Mutex::new(Vec::new()),
            watch_delay: None,
            check_calls: AtomicUsize::new(0),
            request_calls: AtomicUsize::new(0),
            position_calls: AtomicUsize::new(0),
            last_options: Mutex::new(None),
            watch_sink: Mutex::new(None),
            cleared: Mutex::new(Vec::new()),
        }
    }

    pub fn check(mut self, result: Result<PermissionState, NativeError>) -> Self {
        self.check = result;
        self
    }

    pub fn request(mut self, result: Result<PermissionState, NativeError>) -> Self {
        self.request = result;
        self
    }

    pub fn respond(self, delay: Duration, result: Result<Position, NativeError>) -> Self {
        self.responses.lock().unwrap().push((delay, result));
        self
    }

    pub fn watch_delay(mut self, delay: Duration) -> Self {
        self.watch_delay = Some(delay);
        self
    }

    /// Push a watch update through the stored sink, as the bridge would
    pub fn emit(&self, update: Result<Position, NativeError>) {
        if let Some(sink) = self.watch_sink.lock().unwrap().as_mut() {
            sink(update);
        }
    }

    pub fn has_sink(&self) -> bool {
        self.watch_sink.lock().unwrap().is_some()
    }
}

#[async_trait]
impl NativeGeolocation for FakeNative {
    async fn check_permissions(&self) -> Result<PermissionState, NativeError> {
        self.check_calls.fetch_add(1, Ordering::SeqCst);
        self.check.clone()
    }

    async fn request_permissions(&self) -> Result<PermissionState, NativeError> {
        self.request_calls.fetch_add(1, Ordering::SeqCst);
        self.request.clone()
    }

    async fn current_position(&self, options: PositionOptions) -> Result<Position, NativeError> {
        self.position_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_options.lock().unwrap() = Some(options);
        let (delay, result) = {
            let mut responses = self.responses.lock().unwrap();
            if responses.is_empty() {
                (Duration::ZERO, Ok(pos(1.0, 2.0)))
            } else {
                responses.remove(0)
            }
        };
        if !delay.is_zero() {
            Timer::after(delay).await;
        }
        result
    }

    async fn watch_position(
        &self,
        _options: PositionOptions,
        sink: NativeWatchSink,
    ) -> NativeWatchId {
        if let Some(delay) = self.watch_delay {
            Timer::after(delay).await;
        }
        *self.watch_sink.lock().unwrap() = Some(sink);
        "native-watch-1".to_string()
    }

    async fn clear_watch(&self, id: NativeWatchId) {
        self.cleared.lock().unwrap().push(id);
    }
}

/// Scriptable browser geolocation API
pub struct FakeBrowser {
    pub responses: Mutex<Vec<(Duration, Result<Position, BrowserError>)>>,
    pub position_calls: AtomicUsize,
    pub last_options: Mutex<Option<PositionOptions>>,
    pub sink: Mutex<Option<BrowserWatchSink>>,
    pub cleared: Mutex<Vec<BrowserWatchId>>,
}

impl FakeBrowser {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(Vec::new()),
            position_calls: AtomicUsize::new(0),
            last_options: Mutex::new(None),
            sink: Mutex::new(None),
            cleared: Mutex::new(Vec::new()),
        }
    }

    pub fn respond(self, delay: Duration, result: Result<Position, BrowserError>) -> Self {
        self.responses.lock().unwrap().push((delay, result));
        self
    }

    pub fn emit(&self, update: Result<Position, BrowserError>) {
        if let Some(sink) = self.sink.lock().unwrap().as_mut() {
            sink(update);
        }
    }
}

#[async_trait]
impl BrowserGeolocation for FakeBrowser {
    async fn current_position(&self, options: PositionOptions) -> Result<Position, BrowserError> {
        self.position_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_options.lock().unwrap() = Some(options);
        let (delay, result) = {
            let mut responses = self.responses.lock().unwrap();
            if responses.is_empty() {
                (Duration::ZERO, Ok(pos(1.0, 2.0)))
            } else {
                responses.remove(0)
            }
        };
        if !delay.is_zero() {
            Timer::after(delay).await;
        }
        result
    }

    fn watch_position(&self, _options: PositionOptions, sink: BrowserWatchSink) -> BrowserWatchId {
        *self.sink.lock().unwrap() = Some(sink);
        7
    }

    fn clear_watch(&self, id: BrowserWatchId) {
        self.cleared.lock().unwrap().push(id);
    }
}

/// Runtime wiring fakes into the service
pub struct FakeRuntime {
    pub is_native: bool,
    pub native: Option<Arc<FakeNative>>,
    pub browser: Option<Arc<FakeBrowser>>,
}

impl FakeRuntime {
    pub fn native(backend: Arc<FakeNative>) -> Arc<Self> {
        Arc::new(Self {
            is_native: true,
            native: Some(backend),
            browser: None,
        })
    }

    pub fn browser(backend: Arc<FakeBrowser>) -> Arc<Self> {
        Arc::new(Self {
            is_native: false,
            native: None,
            browser: Some(backend),
        })
    }

    /// Browser context with no geolocation capability at all
    pub fn unsupported() -> Arc<Self> {
        Arc::new(Self {
            is_native: false,
            native: None,
            browser: None,
        })
    }
}

impl ShellRuntime for FakeRuntime {
    fn is_native(&self) -> bool {
        self.is_native
    }

    fn native_geolocation(&self) -> Option<Arc<dyn NativeGeolocation>> {
        self.native
            .clone()
            .map(|backend| backend as Arc<dyn NativeGeolocation>)
    }

    fn browser_geolocation(&self) -> Option<Arc<dyn BrowserGeolocation>> {
        self.browser
            .clone()
            .map(|backend| backend as Arc<dyn BrowserGeolocation>)
    }
}

/// Poll until the condition holds or two seconds elapse
pub async fn wait_for(mut condition: impl FnMut() -> bool) -> bool {
    for _ in 0..400 {
        if condition() {
            return true;
        }
        Timer::after(Duration::from_millis(5)).await;
    }
    false
}
