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

//! Flight schedule records as returned by the flight API.
//!
//! Timestamps on the wire are zone-less local date-times
//! (`2024-01-01T10:00:00`), so they are kept as [`NaiveDateTime`] and compared
//! against a local "now" supplied by the caller.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::geo::GeoPoint;

/// Placeholder rendered for any value that is not known.
pub const PLACEHOLDER: &str = "—";

/// Flight status vocabulary.
///
/// Parsing is case-insensitive. Unknown values are preserved in
/// [`FlightStatus::Other`] so they can still be displayed.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FlightStatus {
    #[default]
    Scheduled,
    Active,
    Delayed,
    Cancelled,
    Departed,
    Arrived,
    Landed,
    Diverted,
    Incident,
    Emergency,
    Other(String),
}

impl FlightStatus {
    /// Parse a status string, ignoring case and surrounding whitespace.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "scheduled" => Self::Scheduled,
            "active" => Self::Active,
            "delayed" => Self::Delayed,
            "cancelled" => Self::Cancelled,
            "departed" => Self::Departed,
            "arrived" => Self::Arrived,
            "landed" => Self::Landed,
            "diverted" => Self::Diverted,
            "incident" => Self::Incident,
            "emergency" => Self::Emergency,
            _ => Self::Other(raw.trim().to_string()),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Scheduled => "SCHEDULED",
            Self::Active => "ACTIVE",
            Self::Delayed => "DELAYED",
            Self::Cancelled => "CANCELLED",
            Self::Departed => "DEPARTED",
            Self::Arrived => "ARRIVED",
            Self::Landed => "LANDED",
            Self::Diverted => "DIVERTED",
            Self::Incident => "INCIDENT",
            Self::Emergency => "EMERGENCY",
            Self::Other(s) => s,
        }
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// The flight has left the gate or is already on the ground at its destination.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Departed | Self::Arrived | Self::Landed)
    }

    #[must_use]
    pub fn is_delayed(&self) -> bool {
        matches!(self, Self::Delayed)
    }

    /// Statuses highlighted as needing the passenger's attention.
    #[must_use]
    pub fn is_critical(&self) -> bool {
        matches!(
            self,
            Self::Cancelled | Self::Delayed | Self::Diverted | Self::Incident | Self::Emergency
        )
    }
}

impl From<String> for FlightStatus {
    fn from(raw: String) -> Self {
        Self::parse(&raw)
    }
}

impl From<FlightStatus> for String {
    fn from(status: FlightStatus) -> Self {
        status.as_str().to_string()
    }
}

impl std::fmt::Display for FlightStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// Airport as embedded in a flight record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AirportInfo {
    #[serde(default)]
    pub iata_code: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub timezone: Option<String>,
}

impl AirportInfo {
    /// Airport position, only when both coordinates are present.
    #[must_use]
    pub fn position(&self) -> Option<GeoPoint> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Some(GeoPoint::new(lat, lon)),
            _ => None,
        }
    }

    /// "City (IATA)" label used in headers.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{} ({})", self.city.as_deref().unwrap_or(""), self.iata_code)
    }
}

/// A flight record from `GET /flights/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightSchedule {
    pub id: i64,
    #[serde(default)]
    pub flight_number: Option<String>,
    #[serde(default)]
    pub airline: Option<String>,
    #[serde(default)]
    pub departure_airport: Option<AirportInfo>,
    #[serde(default)]
    pub arrival_airport: Option<AirportInfo>,
    #[serde(default)]
    pub scheduled_departure: Option<NaiveDateTime>,
    #[serde(default)]
    pub scheduled_arrival: Option<NaiveDateTime>,
    #[serde(default)]
    pub estimated_departure: Option<NaiveDateTime>,
    #[serde(default)]
    pub estimated_arrival: Option<NaiveDateTime>,
    #[serde(default)]
    pub actual_departure: Option<NaiveDateTime>,
    #[serde(default)]
    pub actual_arrival: Option<NaiveDateTime>,
    #[serde(default)]
    pub status: FlightStatus,
    #[serde(default)]
    pub delay_minutes: Option<u32>,
    #[serde(default)]
    pub terminal: Option<String>,
    #[serde(default)]
    pub gate: Option<String>,
    #[serde(default)]
    pub last_updated: Option<NaiveDateTime>,
    #[serde(default)]
    pub subscription_count: Option<u32>,
}

impl FlightSchedule {
    /// Recorded delay, only when it is positive.
    #[must_use]
    pub fn delay(&self) -> Option<u32> {
        self.delay_minutes.filter(|&d| d > 0)
    }

    /// Departure airport position from the record, if it carries coordinates.
    #[must_use]
    pub fn departure_position(&self) -> Option<GeoPoint> {
        self.departure_airport.as_ref().and_then(AirportInfo::position)
    }

    #[must_use]
    pub fn departure_iata(&self) -> Option<&str> {
        self.departure_airport
            .as_ref()
            .map(|a| a.iata_code.as_str())
            .filter(|code| !code.is_empty())
    }

    /// "Moscow (SVO) → Istanbul (IST) — SU2130" style header line.
    #[must_use]
    pub fn title(&self) -> String {
        let from = self.departure_airport.as_ref().map(AirportInfo::label).unwrap_or_default();
        let to = self.arrival_airport.as_ref().map(AirportInfo::label).unwrap_or_default();
        format!(
            "{from} → {to} — {}",
            self.flight_number.as_deref().unwrap_or("")
        )
    }

    /// Text for the "actual departure" row.
    ///
    /// A delayed flight with a new estimate shows the estimate and the delay;
    /// otherwise the recorded actual departure, otherwise the placeholder.
    #[must_use]
    pub fn actual_departure_label(&self) -> String {
        if self.status.is_delayed() {
            if let Some(estimated) = self.estimated_departure {
                let time = estimated.format("%H:%M");
                return match self.delay() {
                    Some(delay) => format!("{time} (+{delay} min)"),
                    None => time.to_string(),
                };
            }
        }
        self.actual_departure
            .map_or_else(|| PLACEHOLDER.to_string(), |t| t.format("%H:%M").to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn test_status_parse_is_case_insensitive() {
        assert_eq!(FlightStatus::parse("cancelled"), FlightStatus::Cancelled);
        assert_eq!(FlightStatus::parse("CANCELLED"), FlightStatus::Cancelled);
        assert_eq!(FlightStatus::parse(" Landed "), FlightStatus::Landed);
        assert_eq!(
            FlightStatus::parse("Boarding"),
            FlightStatus::Other("Boarding".to_string())
        );
    }

    #[test]
    fn test_status_groups() {
        assert!(FlightStatus::Arrived.is_completed());
        assert!(FlightStatus::Departed.is_completed());
        assert!(!FlightStatus::Delayed.is_completed());
        assert!(FlightStatus::Emergency.is_critical());
        assert!(!FlightStatus::Scheduled.is_critical());
    }

    #[test]
    fn test_deserialize_flight_record() {
        let json = r#"{
            "id": 7,
            "flightNumber": "SU2130",
            "airline": "Aeroflot",
            "departureAirport": {"iataCode": "SVO", "city": "Moscow", "latitude": 55.972642, "longitude": 37.414589},
            "arrivalAirport": {"iataCode": "IST", "city": "Istanbul"},
            "scheduledDeparture": "2024-01-01T10:00:00",
            "scheduledArrival": "2024-01-01T13:30:00",
            "status": "Delayed",
            "delayMinutes": 25,
            "gate": "D12"
        }"#;

        let flight: FlightSchedule = serde_json::from_str(json).unwrap();
        assert_eq!(flight.status, FlightStatus::Delayed);
        assert_eq!(flight.scheduled_departure, Some(at(10, 0)));
        assert_eq!(flight.delay(), Some(25));
        assert_eq!(
            flight.departure_position(),
            Some(GeoPoint::new(55.972642, 37.414589))
        );
        assert!(flight.arrival_airport.unwrap().position().is_none());
        assert_eq!(flight.gate.as_deref(), Some("D12"));
    }

    #[test]
    fn test_missing_status_defaults_to_scheduled() {
        let flight: FlightSchedule = serde_json::from_str(r#"{"id": 1}"#).unwrap();
        assert_eq!(flight.status, FlightStatus::Scheduled);
        assert!(flight.scheduled_departure.is_none());
    }

    #[test]
    fn test_zero_delay_is_on_time() {
        let flight = FlightSchedule {
            delay_minutes: Some(0),
            ..Default::default()
        };
        assert_eq!(flight.delay(), None);
    }

    #[test]
    fn test_actual_departure_label() {
        let mut flight = FlightSchedule {
            status: FlightStatus::Delayed,
            estimated_departure: Some(at(10, 40)),
            delay_minutes: Some(40),
            ..Default::default()
        };
        assert_eq!(flight.actual_departure_label(), "10:40 (+40 min)");

        flight.status = FlightStatus::Departed;
        assert_eq!(flight.actual_departure_label(), PLACEHOLDER);

        flight.actual_departure = Some(at(10, 42));
        assert_eq!(flight.actual_departure_label(), "10:42");
    }

    #[test]
    fn test_title() {
        let flight = FlightSchedule {
            flight_number: Some("SU2130".to_string()),
            departure_airport: Some(AirportInfo {
                iata_code: "SVO".to_string(),
                city: Some("Moscow".to_string()),
                ..Default::default()
            }),
            arrival_airport: Some(AirportInfo {
                iata_code: "IST".to_string(),
                city: Some("Istanbul".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert_eq!(flight.title(), "Moscow (SVO) → Istanbul (IST) — SU2130");
    }
}
