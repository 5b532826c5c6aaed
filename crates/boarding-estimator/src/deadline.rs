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

//! Back-calculation of "leave by" and "be at the gate by" times.
//!
//! The gate closes a fixed 30 minutes before scheduled departure regardless of
//! airline or airport. Working backwards from that, the passenger needs the
//! drive time plus the airport processing time.

use chrono::{Duration, NaiveDateTime};
use thiserror::Error;

use crate::drive::drive_minutes;
use crate::flight::FlightSchedule;
use crate::geo::GeoPoint;
use crate::params::ProcessingParams;

/// Minutes before scheduled departure at which the gate closes.
pub const GATE_CLOSE_OFFSET_MINUTES: i64 = 30;

/// Why no departure recommendation can be made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Unavailable {
    #[error("flight is cancelled")]
    Cancelled,

    #[error("flight has already departed")]
    AlreadyDeparted,

    #[error("scheduled departure is unknown")]
    MissingScheduledDeparture,

    #[error("current position is unknown")]
    MissingUserPosition,

    #[error("departure airport position is unknown")]
    MissingAirportPosition,
}

/// Recommended departure plan for a passenger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepartureAdvice {
    /// Latest time to leave the current location.
    pub leave_by: NaiveDateTime,
    /// Latest time to be at the boarding gate.
    pub be_at_gate_by: NaiveDateTime,
    pub drive_minutes: u32,
    pub processing_minutes: u32,
}

/// Latest gate arrival for a scheduled departure.
#[must_use]
pub fn gate_arrival_deadline(scheduled_departure: NaiveDateTime) -> NaiveDateTime {
    scheduled_departure - Duration::minutes(GATE_CLOSE_OFFSET_MINUTES)
}

/// Compute the departure plan, or the reason it cannot be computed.
pub fn back_calculate(
    flight: &FlightSchedule,
    user_position: Option<GeoPoint>,
    airport_position: Option<GeoPoint>,
    params: &ProcessingParams,
) -> Result<DepartureAdvice, Unavailable> {
    if flight.status.is_cancelled() {
        return Err(Unavailable::Cancelled);
    }
    if flight.status.is_completed() {
        return Err(Unavailable::AlreadyDeparted);
    }
    let scheduled = flight
        .scheduled_departure
        .ok_or(Unavailable::MissingScheduledDeparture)?;
    let user = user_position.ok_or(Unavailable::MissingUserPosition)?;
    let airport = airport_position.ok_or(Unavailable::MissingAirportPosition)?;

    let drive = drive_minutes(
        Some(user),
        Some(airport),
        params.average_speed_kmh,
        params.traffic_multiplier,
    );
    let processing = params.total_processing_minutes();

    let be_at_gate_by = gate_arrival_deadline(scheduled);
    let leave_by = be_at_gate_by - Duration::minutes(i64::from(drive) + i64::from(processing));

    Ok(DepartureAdvice {
        leave_by,
        be_at_gate_by,
        drive_minutes: drive,
        processing_minutes: processing,
    })
}
