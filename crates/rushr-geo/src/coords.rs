//! Geographic coordinate types
//!
//! Shared position shapes produced by both geolocation backends.

use serde::{Deserialize, Serialize};

/// Geographic coordinates
///
/// Latitude and longitude are always present together; accuracy is
/// absent when the backend does not report it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
    /// Estimated accuracy in meters, when reported
    pub accuracy: Option<f64>,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            accuracy: None,
        }
    }

    pub fn with_accuracy(mut self, accuracy: f64) -> Self {
        self.accuracy = Some(accuracy);
        self
    }

    /// Latitude in -90..90, longitude in -180..180, accuracy non-negative
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
            && self.accuracy.map_or(true, |a| a >= 0.0)
    }

    /// Human-readable coordinate pair, 4 decimal places: `"37.7749, -122.4194"`
    ///
    /// Used as the reverse-geocoding fallback when no address resolves.
    pub fn label(&self) -> String {
        format!("{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

/// A position reading as delivered by a backend
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub coords: Coordinates,
    /// Unix timestamp (seconds) of the fix, when the backend reports one
    pub timestamp: u64,
}

impl Position {
    pub fn new(coords: Coordinates, timestamp: u64) -> Self {
        Self { coords, timestamp }
    }
}
