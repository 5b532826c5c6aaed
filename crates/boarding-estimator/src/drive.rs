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

//! Drive-time estimation from straight-line distance.

use crate::geo::{haversine_km, GeoPoint};

/// Average speeds below this are treated as this value.
pub const MIN_AVERAGE_SPEED_KMH: f64 = 5.0;

/// Estimated driving time between two points, in whole minutes.
///
/// Returns 0 when either point is unknown.
#[must_use]
pub fn drive_minutes(
    origin: Option<GeoPoint>,
    destination: Option<GeoPoint>,
    average_speed_kmh: f64,
    traffic_multiplier: f64,
) -> u32 {
    match (origin, destination) {
        (Some(from), Some(to)) => {
            drive_minutes_for_distance(haversine_km(from, to), average_speed_kmh, traffic_multiplier)
        }
        _ => 0,
    }
}

/// Driving time for a known distance, rounded up to the next whole minute.
#[must_use]
pub fn drive_minutes_for_distance(
    distance_km: f64,
    average_speed_kmh: f64,
    traffic_multiplier: f64,
) -> u32 {
    let speed = average_speed_kmh.max(MIN_AVERAGE_SPEED_KMH);
    let minutes = (distance_km / speed * 60.0 * traffic_multiplier).ceil();

    if !minutes.is_finite() || minutes <= 0.0 {
        return 0;
    }

    whole_minutes(minutes)
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "callers pass a finite, positive value"
)]
fn whole_minutes(minutes: f64) -> u32 {
    minutes.min(f64::from(u32::MAX)) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_point_is_zero_minutes() {
        let p = GeoPoint::new(55.751244, 37.618423);
        assert_eq!(drive_minutes(Some(p), Some(p), 32.0, 1.2), 0);
    }

    #[test]
    fn test_missing_point_is_zero_minutes() {
        let p = GeoPoint::new(55.751244, 37.618423);
        assert_eq!(drive_minutes(None, Some(p), 32.0, 1.2), 0);
        assert_eq!(drive_minutes(Some(p), None, 32.0, 1.2), 0);
    }

    #[test]
    fn test_partial_minute_rounds_up() {
        // 10.01 km at 60 km/h is 10.01 minutes
        assert_eq!(drive_minutes_for_distance(10.01, 60.0, 1.0), 11);
    }

    #[test]
    fn test_whole_minute_is_not_bumped() {
        assert_eq!(drive_minutes_for_distance(30.0, 60.0, 1.0), 30);
    }

    #[test]
    fn test_speed_is_clamped_to_minimum() {
        // 5 km at the 5 km/h floor is one hour
        assert_eq!(drive_minutes_for_distance(5.0, 1.0, 1.0), 60);
        assert_eq!(drive_minutes_for_distance(5.0, 0.0, 1.0), 60);
        assert_eq!(
            drive_minutes_for_distance(5.0, -10.0, 1.0),
            drive_minutes_for_distance(5.0, MIN_AVERAGE_SPEED_KMH, 1.0)
        );
    }

    #[test]
    fn test_traffic_multiplier_inflates() {
        assert_eq!(drive_minutes_for_distance(32.0, 32.0, 1.0), 60);
        assert_eq!(drive_minutes_for_distance(32.0, 32.0, 1.2), 72);
    }

    #[test]
    fn test_city_centre_to_domodedovo() {
        let centre = GeoPoint::new(55.751244, 37.618423);
        let dme = GeoPoint::new(55.408611, 37.906111);
        // ~42.5 km straight line at 32 km/h with 1.2 traffic
        let minutes = drive_minutes(Some(centre), Some(dme), 32.0, 1.2);
        assert!((90..=100).contains(&minutes), "got {minutes}");
    }
}
