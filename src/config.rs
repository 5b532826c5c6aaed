// Copyright 2025 Chris Custine
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Application configuration management.
//!
//! Configuration is stored in TOML format via `confy`. It carries the flight
//! API location, the ground-travel and airport processing assumptions, a
//! manual position override for devices without location services, and
//! per-airport coordinates for records that arrive without them.

use std::collections::HashMap;
use std::time::Duration;

use boarding_estimator::{GeoPoint, ProcessingParams};
use serde::{Deserialize, Serialize};

/// Name used for the config and data directories.
pub const APP_NAME: &str = "flight-planner";

/// Default flight API base URL
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8080";

/// Environment variable that overrides the configured API base URL
pub const API_URL_ENV: &str = "FLIGHT_PLANNER_API_URL";

/// Watch mode never refreshes faster than this.
pub const MIN_REFRESH_INTERVAL: Duration = Duration::from_secs(1);

/// Application configuration stored in TOML format
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AppConfig {
    /// Configuration schema version for migrations
    #[serde(default = "default_config_version")]
    pub config_version: u32,

    /// Flight API base URL
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// HTTP request timeout in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Ground speed, traffic and airport procedure durations
    #[serde(default)]
    pub processing: ProcessingParams,

    /// Override latitude (for devices without location services)
    #[serde(default)]
    pub override_latitude: Option<f64>,

    /// Override longitude (for devices without location services)
    #[serde(default)]
    pub override_longitude: Option<f64>,

    /// Look up the current position by IP address when no override is set
    #[serde(default = "default_true")]
    pub use_ip_geolocation: bool,

    /// Watch mode refresh period in seconds
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,

    /// Airport coordinates by IATA code, used when a flight record has none
    #[serde(default)]
    pub airport_coordinates: HashMap<String, [f64; 2]>,
}

// Default value functions for serde
fn default_config_version() -> u32 {
    1
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_true() -> bool {
    true
}

fn default_refresh_interval_secs() -> u64 {
    1
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            config_version: default_config_version(),
            api_base_url: default_api_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
            processing: ProcessingParams::default(),
            override_latitude: None,
            override_longitude: None,
            use_ip_geolocation: true,
            refresh_interval_secs: default_refresh_interval_secs(),
            airport_coordinates: HashMap::new(),
        }
    }
}

impl AppConfig {
    /// Load configuration from disk, creating the default file on first run
    pub fn load() -> Result<Self, confy::ConfyError> {
        confy::load(APP_NAME, "config")
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<(), confy::ConfyError> {
        confy::store(APP_NAME, "config", self)
    }

    /// Get the config file path for display to user
    pub fn get_config_path() -> Result<std::path::PathBuf, confy::ConfyError> {
        confy::get_configuration_file_path(APP_NAME, "config")
    }

    /// API base URL, with the environment variable taking precedence
    pub fn resolve_api_base_url(&self) -> String {
        if let Ok(url) = std::env::var(API_URL_ENV) {
            if !url.trim().is_empty() {
                return url.trim().to_string();
            }
        }
        self.api_base_url.clone()
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    /// Watch mode refresh period, clamped to [`MIN_REFRESH_INTERVAL`]
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs).max(MIN_REFRESH_INTERVAL)
    }

    /// Manual position override, only when both coordinates are set
    pub fn position_override(&self) -> Option<GeoPoint> {
        match (self.override_latitude, self.override_longitude) {
            (Some(lat), Some(lon)) => Some(GeoPoint::new(lat, lon)),
            _ => None,
        }
    }

    /// Configured coordinates for an airport, matched case-insensitively
    pub fn airport_position(&self, iata_code: &str) -> Option<GeoPoint> {
        let code = iata_code.trim().to_ascii_uppercase();
        self.airport_coordinates
            .iter()
            .find(|(k, _)| k.trim().eq_ignore_ascii_case(&code))
            .map(|(_, [lat, lon])| GeoPoint::new(*lat, *lon))
    }
}
