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

//! Position sources available to the command-line client.
//!
//! There is no GPS on a typical workstation, so the current position comes
//! from a manual override or an IP geolocation lookup.

use std::sync::Arc;

use async_trait::async_trait;
use boarding_estimator::{GeoPoint, GeolocationError, PositionOptions, PositionSource};
use log::{debug, info};
use reqwest::Client;
use serde_json::Value;

use crate::config::AppConfig;

const IP_LOOKUP_SERVICES: [&str; 2] = ["https://ipapi.co/json/", "http://ip-api.com/json/"];

/// A position set by the user.
#[derive(Debug, Clone, Copy)]
pub struct FixedPosition(pub GeoPoint);

#[async_trait]
impl PositionSource for FixedPosition {
    async fn current_position(
        &self,
        _options: &PositionOptions,
    ) -> Result<GeoPoint, GeolocationError> {
        Ok(self.0)
    }
}

/// Coarse position from the public IP address.
#[derive(Debug, Clone, Default)]
pub struct IpLocator {
    http: Client,
}

impl IpLocator {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PositionSource for IpLocator {
    async fn current_position(
        &self,
        options: &PositionOptions,
    ) -> Result<GeoPoint, GeolocationError> {
        let mut last_error = String::from("no lookup service answered");

        for url in IP_LOOKUP_SERVICES {
            debug!("Trying IP geolocation via {}", url);
            let response = match self.http.get(url).timeout(options.timeout).send().await {
                Ok(response) => response,
                Err(e) => {
                    last_error = e.to_string();
                    continue;
                }
            };
            let value: Value = match response.json().await {
                Ok(value) => value,
                Err(e) => {
                    last_error = e.to_string();
                    continue;
                }
            };
            if let Some(point) = parse_ip_lookup(&value) {
                info!("Location found via {}: {}", url, point);
                return Ok(point);
            }
        }

        Err(GeolocationError::Unavailable(last_error))
    }
}

/// Extract coordinates from either lookup service's response shape.
fn parse_ip_lookup(value: &Value) -> Option<GeoPoint> {
    let lat = value
        .get("latitude")
        .or_else(|| value.get("lat"))
        .and_then(Value::as_f64)?;
    let lon = value
        .get("longitude")
        .or_else(|| value.get("lon"))
        .and_then(Value::as_f64)?;
    Some(GeoPoint::new(lat, lon))
}

/// Pick the position source: explicit override, then IP lookup, else none.
pub fn position_source(config: &AppConfig, cli_override: Option<GeoPoint>) -> Option<Arc<dyn PositionSource>> {
    if let Some(point) = cli_override.or_else(|| config.position_override()) {
        info!("Using configured position {}", point);
        return Some(Arc::new(FixedPosition(point)));
    }
    if config.use_ip_geolocation {
        return Some(Arc::new(IpLocator::new()));
    }
    None
}
