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

//! Flight views: loading, evaluation and text rendering.
//!
//! The trip plan needs two independent inputs, the flight record (network)
//! and the current position (device). [`load_plan`] waits for both to settle
//! before anything is estimated, and discards the outcome if the view is torn
//! down first. Rendering is a pure function of the loaded state and "now".

use std::fmt;
use std::time::Duration;

use boarding_estimator::{
    ActualTimes, BoardingWindow, EstimationResult, Estimator, FlightSchedule, GeoPoint,
    GeolocationResolver, ResolvedPosition, Severity, PLACEHOLDER,
};
use chrono::NaiveDateTime;
use log::{debug, info};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::api::{ApiError, FlightSource};

/// Inputs of the trip plan once both have settled.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanState {
    pub flight: FlightSchedule,
    pub position: ResolvedPosition,
}

/// Fetch the flight and resolve the position concurrently.
///
/// Returns `None` if `cancel` fires before both complete; the partial results
/// are dropped without being observed.
pub async fn load_plan(
    flights: &dyn FlightSource,
    resolver: &GeolocationResolver,
    flight_id: i64,
    cancel: &CancellationToken,
) -> Option<Result<PlanState, ApiError>> {
    info!("Loading flight {} and current position...", flight_id);
    let both = async { tokio::join!(flights.get_flight(flight_id), resolver.resolve()) };

    tokio::select! {
        () = cancel.cancelled() => {
            debug!("Plan view closed before loading finished, discarding");
            None
        }
        (flight, position) = both => Some(flight.map(|flight| PlanState { flight, position })),
    }
}

/// What the plan view needs besides its loaded state.
#[derive(Debug, Clone, Copy)]
pub struct PlanContext<'a> {
    pub estimator: &'a Estimator,
    pub resolver: &'a GeolocationResolver,
    /// Departure airport position for records without coordinates.
    pub airport_override: Option<GeoPoint>,
}

/// Re-render the plan against the wall clock until cancelled.
///
/// A device or cached position is re-resolved on every tick, so the
/// resolver's cache decides how often the source is queried. A fallback
/// position is kept as is; failed lookups are not retried.
pub async fn watch_plan<N, F>(
    mut state: PlanState,
    context: PlanContext<'_>,
    period: Duration,
    cancel: &CancellationToken,
    now: N,
    mut emit: F,
) where
    N: Fn() -> NaiveDateTime,
    F: FnMut(String),
{
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            () = cancel.cancelled() => return,
            _ = interval.tick() => {
                if !state.position.is_fallback() {
                    state.position = context.resolver.resolve().await;
                }
                let at = now();
                let estimate = context.estimator.evaluate(
                    &state.flight,
                    Some(&state.position),
                    context.airport_override,
                    at,
                );
                emit(render_plan(&state.flight, &estimate, at));
            }
        }
    }
}

fn time(value: Option<NaiveDateTime>) -> String {
    value.map_or_else(|| PLACEHOLDER.to_string(), |t| t.format("%H:%M").to_string())
}

fn date_time(value: Option<NaiveDateTime>) -> String {
    value.map_or_else(|| PLACEHOLDER.to_string(), |t| t.format("%d %b %H:%M").to_string())
}

fn severity_tag(severity: Severity) -> &'static str {
    match severity {
        Severity::Critical => "[!!] ",
        Severity::Warning => "[!] ",
        Severity::Normal => "",
    }
}

/// Trip plan: flight status card, recommendation card and boarding countdown.
struct PlanCard<'a> {
    flight: &'a FlightSchedule,
    estimate: &'a EstimationResult,
    now: NaiveDateTime,
}

impl fmt::Display for PlanCard<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self {
            flight,
            estimate,
            now,
        } = self;
        let status = &flight.status;
        let cancelled = status.is_cancelled();

        writeln!(f, "{}", flight.title())?;
        writeln!(
            f,
            "STATUS     {}{}",
            if status.is_critical() { "● " } else { "" },
            status
        )?;
        writeln!(f, "SCHEDULED  {}", time(flight.scheduled_departure))?;
        writeln!(f, "ACTUAL     {}", flight.actual_departure_label())?;
        if cancelled {
            writeln!(f, "GATE       {PLACEHOLDER} (flight cancelled)")?;
        } else {
            writeln!(f, "GATE       {}", flight.gate.as_deref().unwrap_or(PLACEHOLDER))?;
        }
        writeln!(f)?;
        writeln!(f, "NOW        {}", time(Some(*now)))?;
        writeln!(f, "Leave by   {}", time(estimate.recommended_departure_time()))?;
        writeln!(
            f,
            "           (to be at the gate by {})",
            time(estimate.recommended_gate_arrival_time())
        )?;

        if let (Some(drive), Some(processing)) =
            (estimate.drive_minutes(), estimate.processing_minutes_total())
        {
            writeln!(
                f,
                "           Drive: ~{drive} min • Airport procedures: ~{processing} min"
            )?;
        }
        if !cancelled && !status.is_completed() {
            if let Some(advisory) = &estimate.advisory {
                writeln!(f, "           {advisory}")?;
            }
        }

        writeln!(f)?;
        write!(
            f,
            "{}{}",
            severity_tag(estimate.boarding.severity()),
            estimate.boarding.message()
        )
    }
}

/// Flight details: schedule table, delay, gate and boarding state.
struct DetailsCard<'a> {
    flight: &'a FlightSchedule,
    now: NaiveDateTime,
}

impl fmt::Display for DetailsCard<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let flight = self.flight;
        let departure = flight.departure_airport.clone().unwrap_or_default();
        let arrival = flight.arrival_airport.clone().unwrap_or_default();

        writeln!(f, "{}", departure.name.as_deref().unwrap_or(PLACEHOLDER))?;
        writeln!(f, "{}", departure.iata_code)?;
        writeln!(
            f,
            "{} ({})",
            arrival.city.as_deref().unwrap_or(PLACEHOLDER),
            flight.flight_number.as_deref().unwrap_or(PLACEHOLDER)
        )?;
        writeln!(f)?;

        let window = BoardingWindow::for_flight(flight, self.now);

        if flight.status.is_cancelled() {
            writeln!(f, "Flight cancelled. No schedule data available.")?;
        } else {
            let actual = ActualTimes::resolve(flight);
            writeln!(
                f,
                "Scheduled departure: {:<16} Actual departure: {}",
                date_time(flight.scheduled_departure),
                date_time(actual.departure)
            )?;
            writeln!(
                f,
                "Scheduled arrival:   {:<16} Actual arrival:   {}",
                date_time(flight.scheduled_arrival),
                date_time(actual.arrival)
            )?;
            writeln!(f, "Status: {}", flight.status)?;
            if let Some(delay) = flight.delay() {
                writeln!(f, "Delay: {delay} min")?;
            }
            writeln!(
                f,
                "Airline: {}   Flight no.: {}",
                flight.airline.as_deref().unwrap_or(PLACEHOLDER),
                flight.flight_number.as_deref().unwrap_or(PLACEHOLDER)
            )?;
        }

        writeln!(f)?;
        if matches!(window, BoardingWindow::Countdown(_) | BoardingWindow::Unknown) {
            writeln!(
                f,
                "Boarding from gate {}",
                flight.gate.as_deref().unwrap_or(PLACEHOLDER)
            )?;
        }
        write!(f, "{}{}", severity_tag(window.severity()), window.message())
    }
}

pub fn render_plan(flight: &FlightSchedule, estimate: &EstimationResult, now: NaiveDateTime) -> String {
    PlanCard {
        flight,
        estimate,
        now,
    }
    .to_string()
}

pub fn render_details(flight: &FlightSchedule, now: NaiveDateTime) -> String {
    DetailsCard { flight, now }.to_string()
}
