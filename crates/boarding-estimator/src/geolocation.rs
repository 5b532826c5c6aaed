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

//! Current-position resolution with a fixed fallback.
//!
//! A [`PositionSource`] performs a single position query. The
//! [`GeolocationResolver`] wraps it with the query timeout, a short-lived
//! cache of the last good fix, and substitution of [`FALLBACK_POSITION`]
//! plus an advisory message whenever no fix can be obtained. Resolution never
//! fails and never retries on its own.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info, warn};
use thiserror::Error;
use tokio::time::Instant;

use crate::geo::GeoPoint;

/// Moscow city centre, used when the device position cannot be determined.
pub const FALLBACK_POSITION: GeoPoint = GeoPoint::new(55.751_244, 37.618_423);

/// Advisory shown when the device has no position capability.
pub const UNSUPPORTED_ADVISORY: &str = "Geolocation is not available on this device.";

/// Advisory shown when a position query fails or times out.
pub const FAILED_ADVISORY: &str =
    "Could not determine your location. Using Moscow as the starting point.";

/// Errors a position query can report.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeolocationError {
    #[error("geolocation is not supported")]
    Unsupported,

    #[error("permission to read the position was denied")]
    PermissionDenied,

    #[error("position query timed out")]
    Timeout,

    #[error("position unavailable: {0}")]
    Unavailable(String),
}

/// Options for a one-shot position query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionOptions {
    pub high_accuracy: bool,
    /// Give up on the query after this long.
    pub timeout: Duration,
    /// Reuse a previous fix no older than this.
    pub maximum_age: Duration,
}

impl Default for PositionOptions {
    fn default() -> Self {
        Self {
            high_accuracy: true,
            timeout: Duration::from_secs(8),
            maximum_age: Duration::from_secs(20),
        }
    }
}

/// A device capability able to report the current position once.
#[async_trait]
pub trait PositionSource: Send + Sync {
    async fn current_position(
        &self,
        options: &PositionOptions,
    ) -> Result<GeoPoint, GeolocationError>;
}

/// Where a resolved position came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionOrigin {
    Device,
    Cached,
    Fallback,
}

/// Outcome of a resolution attempt. Always carries a usable point.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPosition {
    pub point: GeoPoint,
    pub origin: PositionOrigin,
    /// Set exactly when the fallback was used.
    pub advisory: Option<String>,
}

impl ResolvedPosition {
    fn fallback(advisory: &str) -> Self {
        Self {
            point: FALLBACK_POSITION,
            origin: PositionOrigin::Fallback,
            advisory: Some(advisory.to_string()),
        }
    }

    #[must_use]
    pub fn is_fallback(&self) -> bool {
        self.origin == PositionOrigin::Fallback
    }
}

/// Resolves the current position, falling back to [`FALLBACK_POSITION`].
pub struct GeolocationResolver {
    source: Option<Arc<dyn PositionSource>>,
    options: PositionOptions,
    last_fix: Mutex<Option<(Instant, GeoPoint)>>,
}

impl std::fmt::Debug for GeolocationResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeolocationResolver")
            .field("has_source", &self.source.is_some())
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl GeolocationResolver {
    /// Create a resolver. `None` means the device has no position capability.
    #[must_use]
    pub fn new(source: Option<Arc<dyn PositionSource>>, options: PositionOptions) -> Self {
        Self {
            source,
            options,
            last_fix: Mutex::new(None),
        }
    }

    #[must_use]
    pub fn options(&self) -> &PositionOptions {
        &self.options
    }

    /// Perform one resolution attempt.
    pub async fn resolve(&self) -> ResolvedPosition {
        let Some(source) = self.source.as_ref() else {
            info!("No position source available, using fallback position");
            return ResolvedPosition::fallback(UNSUPPORTED_ADVISORY);
        };

        if let Some(point) = self.cached_fix() {
            debug!("Reusing cached position {}", point);
            return ResolvedPosition {
                point,
                origin: PositionOrigin::Cached,
                advisory: None,
            };
        }

        let query = source.current_position(&self.options);
        let result = tokio::time::timeout(self.options.timeout, query)
            .await
            .unwrap_or(Err(GeolocationError::Timeout));

        match result {
            Ok(point) => {
                info!("Position resolved: {}", point);
                if let Ok(mut last_fix) = self.last_fix.lock() {
                    *last_fix = Some((Instant::now(), point));
                }
                ResolvedPosition {
                    point,
                    origin: PositionOrigin::Device,
                    advisory: None,
                }
            }
            Err(GeolocationError::Unsupported) => {
                warn!("Geolocation unsupported, using fallback position");
                ResolvedPosition::fallback(UNSUPPORTED_ADVISORY)
            }
            Err(e) => {
                warn!("Geolocation failed ({}), using fallback position", e);
                ResolvedPosition::fallback(FAILED_ADVISORY)
            }
        }
    }

    fn cached_fix(&self) -> Option<GeoPoint> {
        let last_fix = self.last_fix.lock().ok()?;
        (*last_fix)
            .filter(|(taken, _)| taken.elapsed() <= self.options.maximum_age)
            .map(|(_, point)| point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedSource {
        result: Result<GeoPoint, GeolocationError>,
        calls: AtomicUsize,
    }

    impl FixedSource {
        fn new(result: Result<GeoPoint, GeolocationError>) -> Arc<Self> {
            Arc::new(Self {
                result,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl PositionSource for FixedSource {
        async fn current_position(
            &self,
            _options: &PositionOptions,
        ) -> Result<GeoPoint, GeolocationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.result.clone()
        }
    }

    struct HangingSource;

    #[async_trait]
    impl PositionSource for HangingSource {
        async fn current_position(
            &self,
            _options: &PositionOptions,
        ) -> Result<GeoPoint, GeolocationError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(GeoPoint::new(0.0, 0.0))
        }
    }

    #[tokio::test]
    async fn test_successful_fix() {
        let here = GeoPoint::new(59.93, 30.33);
        let resolver = GeolocationResolver::new(
            Some(FixedSource::new(Ok(here)) as Arc<dyn PositionSource>),
            PositionOptions::default(),
        );

        let resolved = resolver.resolve().await;
        assert_eq!(resolved.point, here);
        assert_eq!(resolved.origin, PositionOrigin::Device);
        assert!(resolved.advisory.is_none());
    }

    #[tokio::test]
    async fn test_permission_denied_uses_fallback_with_one_advisory() {
        let source = FixedSource::new(Err(GeolocationError::PermissionDenied));
        let resolver = GeolocationResolver::new(
            Some(source.clone() as Arc<dyn PositionSource>),
            PositionOptions::default(),
        );

        let resolved = resolver.resolve().await;
        assert_eq!(resolved.point, FALLBACK_POSITION);
        assert!(resolved.is_fallback());
        assert_eq!(resolved.advisory.as_deref(), Some(FAILED_ADVISORY));
        // No automatic retry
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_missing_source_is_unsupported() {
        let resolver = GeolocationResolver::new(None, PositionOptions::default());
        let resolved = resolver.resolve().await;
        assert_eq!(resolved.point, FALLBACK_POSITION);
        assert_eq!(resolved.advisory.as_deref(), Some(UNSUPPORTED_ADVISORY));
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_source_times_out() {
        let resolver = GeolocationResolver::new(
            Some(Arc::new(HangingSource) as Arc<dyn PositionSource>),
            PositionOptions::default(),
        );
        let started = Instant::now();

        let resolved = resolver.resolve().await;
        assert!(resolved.is_fallback());
        assert_eq!(resolved.advisory.as_deref(), Some(FAILED_ADVISORY));
        assert!(started.elapsed() >= Duration::from_secs(8));
        assert!(started.elapsed() < Duration::from_secs(60));
    }

    #[tokio::test(start_paused = true)]
    async fn test_recent_fix_is_reused() {
        let source = FixedSource::new(Ok(GeoPoint::new(59.93, 30.33)));
        let resolver = GeolocationResolver::new(
            Some(source.clone() as Arc<dyn PositionSource>),
            PositionOptions::default(),
        );

        resolver.resolve().await;
        tokio::time::advance(Duration::from_secs(10)).await;
        let second = resolver.resolve().await;
        assert_eq!(second.origin, PositionOrigin::Cached);
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);

        tokio::time::advance(Duration::from_secs(15)).await;
        let third = resolver.resolve().await;
        assert_eq!(third.origin, PositionOrigin::Device);
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }
}
