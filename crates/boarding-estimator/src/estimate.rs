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

//! Combined estimation for one flight at one instant.

use chrono::NaiveDateTime;
use log::debug;

use crate::boarding::BoardingWindow;
use crate::deadline::{back_calculate, DepartureAdvice, Unavailable};
use crate::flight::FlightSchedule;
use crate::geo::GeoPoint;
use crate::geolocation::ResolvedPosition;
use crate::params::ProcessingParams;

/// Everything the presentation layer needs for a flight. Never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct EstimationResult {
    pub advice: Result<DepartureAdvice, Unavailable>,
    pub boarding: BoardingWindow,
    /// Advisory from a geolocation fallback, if one happened.
    pub advisory: Option<String>,
}

impl EstimationResult {
    #[must_use]
    pub fn recommended_departure_time(&self) -> Option<NaiveDateTime> {
        self.advice.as_ref().ok().map(|a| a.leave_by)
    }

    #[must_use]
    pub fn recommended_gate_arrival_time(&self) -> Option<NaiveDateTime> {
        self.advice.as_ref().ok().map(|a| a.be_at_gate_by)
    }

    #[must_use]
    pub fn drive_minutes(&self) -> Option<u32> {
        self.advice.as_ref().ok().map(|a| a.drive_minutes)
    }

    #[must_use]
    pub fn processing_minutes_total(&self) -> Option<u32> {
        self.advice.as_ref().ok().map(|a| a.processing_minutes)
    }
}

/// Evaluates flights against a fixed set of processing parameters.
#[derive(Debug, Clone, Default)]
pub struct Estimator {
    params: ProcessingParams,
}

impl Estimator {
    #[must_use]
    pub fn new(params: ProcessingParams) -> Self {
        Self { params }
    }

    #[must_use]
    pub fn params(&self) -> &ProcessingParams {
        &self.params
    }

    /// Evaluate a flight.
    ///
    /// `position` is `None` while geolocation is still outstanding, which
    /// leaves the recommendation unavailable. `airport_override` is only
    /// consulted when the flight record has no airport coordinates.
    #[must_use]
    pub fn evaluate(
        &self,
        flight: &FlightSchedule,
        position: Option<&ResolvedPosition>,
        airport_override: Option<GeoPoint>,
        now: NaiveDateTime,
    ) -> EstimationResult {
        let airport = flight.departure_position().or(airport_override);
        let advice = back_calculate(flight, position.map(|p| p.point), airport, &self.params);

        if let Err(reason) = &advice {
            debug!("No departure recommendation for flight {}: {}", flight.id, reason);
        }

        EstimationResult {
            advice,
            boarding: BoardingWindow::for_flight(flight, now),
            advisory: position.and_then(|p| p.advisory.clone()),
        }
    }
}
