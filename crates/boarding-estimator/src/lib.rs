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

//! Travel-planning estimates for scheduled flights.
//!
//! Given a flight record, the passenger's current position and the departure
//! airport's position, this library works out when the passenger should leave,
//! when they must be at the gate, and how long remains before boarding closes.
//! It is split into small layers that can be used on their own:
//!
//! - **Geometry**: [`GeoPoint`] and haversine distance
//! - **Drive time**: distance to whole minutes of driving, with a speed floor
//!   and traffic inflation
//! - **Deadlines**: gate-arrival and leave-by times, or an explicit
//!   [`Unavailable`] reason
//! - **Boarding window**: countdown classification against an injected "now"
//! - **Delay projection**: actual times filled in from the recorded delay
//! - **Geolocation**: one-shot position resolution with a fixed fallback
//!
//! # Quick Start
//!
//! ```
//! use boarding_estimator::{Estimator, FlightSchedule, GeoPoint, PositionOrigin, ResolvedPosition};
//! use chrono::NaiveDate;
//!
//! let flight: FlightSchedule = FlightSchedule {
//!     id: 1,
//!     scheduled_departure: NaiveDate::from_ymd_opt(2024, 1, 1)
//!         .and_then(|d| d.and_hms_opt(10, 0, 0)),
//!     ..Default::default()
//! };
//! let here = ResolvedPosition {
//!     point: GeoPoint::new(55.75, 37.61),
//!     origin: PositionOrigin::Device,
//!     advisory: None,
//! };
//! let now = NaiveDate::from_ymd_opt(2024, 1, 1)
//!     .and_then(|d| d.and_hms_opt(7, 0, 0))
//!     .unwrap();
//!
//! let estimate = Estimator::default().evaluate(
//!     &flight,
//!     Some(&here),
//!     Some(GeoPoint::new(55.972642, 37.414589)),
//!     now,
//! );
//! println!("Leave by {:?}", estimate.recommended_departure_time());
//! println!("{}", estimate.boarding.message());
//! ```

pub mod boarding;
pub mod deadline;
pub mod delay;
pub mod drive;
pub mod estimate;
pub mod flight;
pub mod geo;
pub mod geolocation;
pub mod params;

pub use boarding::{BoardingStatus, BoardingWindow, Severity};
pub use deadline::{back_calculate, gate_arrival_deadline, DepartureAdvice, Unavailable};
pub use delay::{project_delay, ActualTimes};
pub use drive::{drive_minutes, drive_minutes_for_distance, MIN_AVERAGE_SPEED_KMH};
pub use estimate::{EstimationResult, Estimator};
pub use flight::{AirportInfo, FlightSchedule, FlightStatus, PLACEHOLDER};
pub use geo::{haversine_km, GeoPoint, EARTH_RADIUS_KM};
pub use geolocation::{
    GeolocationError, GeolocationResolver, PositionOptions, PositionOrigin, PositionSource,
    ResolvedPosition, FALLBACK_POSITION,
};
pub use params::ProcessingParams;
