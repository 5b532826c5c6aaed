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

//! Delay-adjusted projection of actual departure and arrival times.

use chrono::{Duration, NaiveDateTime};

use crate::flight::FlightSchedule;

/// Shift a scheduled time by a delay. Zero or absent delay leaves it unchanged.
#[must_use]
pub fn project_delay(scheduled: NaiveDateTime, delay_minutes: Option<u32>) -> NaiveDateTime {
    match delay_minutes {
        Some(delay) if delay > 0 => scheduled + Duration::minutes(i64::from(delay)),
        _ => scheduled,
    }
}

/// Actual departure and arrival times for display.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActualTimes {
    pub departure: Option<NaiveDateTime>,
    pub arrival: Option<NaiveDateTime>,
}

impl ActualTimes {
    /// Recorded actual times, filling gaps with a delay projection for
    /// completed flights that carried a delay.
    #[must_use]
    pub fn resolve(flight: &FlightSchedule) -> Self {
        let projectable = flight.status.is_completed() && flight.delay().is_some();
        let fill = |actual: Option<NaiveDateTime>, scheduled: Option<NaiveDateTime>| {
            actual.or_else(|| {
                scheduled
                    .filter(|_| projectable)
                    .map(|s| project_delay(s, flight.delay()))
            })
        };

        Self {
            departure: fill(flight.actual_departure, flight.scheduled_departure),
            arrival: fill(flight.actual_arrival, flight.scheduled_arrival),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flight::FlightStatus;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn test_project_delay() {
        assert_eq!(project_delay(at(10, 0), Some(45)), at(10, 45));
        assert_eq!(project_delay(at(10, 0), Some(0)), at(10, 0));
        assert_eq!(project_delay(at(10, 0), None), at(10, 0));
    }

    #[test]
    fn test_arrived_delayed_flight_is_projected() {
        let flight = FlightSchedule {
            status: FlightStatus::Arrived,
            scheduled_departure: Some(at(10, 0)),
            scheduled_arrival: Some(at(12, 0)),
            delay_minutes: Some(30),
            ..Default::default()
        };
        let times = ActualTimes::resolve(&flight);
        assert_eq!(times.departure, Some(at(10, 30)));
        assert_eq!(times.arrival, Some(at(12, 30)));
    }

    #[test]
    fn test_recorded_actuals_take_precedence() {
        let flight = FlightSchedule {
            status: FlightStatus::Landed,
            scheduled_departure: Some(at(10, 0)),
            scheduled_arrival: Some(at(12, 0)),
            actual_departure: Some(at(10, 20)),
            delay_minutes: Some(30),
            ..Default::default()
        };
        let times = ActualTimes::resolve(&flight);
        assert_eq!(times.departure, Some(at(10, 20)));
        assert_eq!(times.arrival, Some(at(12, 30)));
    }

    #[test]
    fn test_pending_flight_is_not_projected() {
        let flight = FlightSchedule {
            status: FlightStatus::Delayed,
            scheduled_departure: Some(at(10, 0)),
            delay_minutes: Some(30),
            ..Default::default()
        };
        assert_eq!(ActualTimes::resolve(&flight), ActualTimes::default());
    }

    #[test]
    fn test_on_time_arrival_without_actuals() {
        let flight = FlightSchedule {
            status: FlightStatus::Arrived,
            scheduled_departure: Some(at(10, 0)),
            ..Default::default()
        };
        assert!(ActualTimes::resolve(&flight).departure.is_none());
    }
}
