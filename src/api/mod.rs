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

//! Remote flight API.
//!
//! The API owns all business data (flights, subscriptions, users). This module
//! provides the HTTP client and the wire types it exchanges.

pub mod client;

pub use client::ApiClient;

use async_trait::async_trait;
use boarding_estimator::FlightSchedule;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors returned by the flight API client.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("could not decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid API URL: {0}")]
    InvalidUrl(String),
}

/// Response from the login and register endpoints.
///
/// `token` is absent when the server rejected the request; `message` then
/// explains why.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthResponse {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub email: String,
    pub password: String,
}

/// User record as returned by the users endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: i64,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub subscription_count: Option<u32>,
}

/// Partial profile update. Unset fields are not sent and stay unchanged
/// on the server; a blank password is never sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl ProfileUpdate {
    /// Drop a blank password and report whether anything is left to send.
    #[must_use]
    pub fn normalized(mut self) -> Option<Self> {
        if self.password.as_deref().is_some_and(|p| p.trim().is_empty()) {
            self.password = None;
        }
        (self != Self::default()).then_some(self)
    }
}

/// A user's subscription to a flight.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub flight: FlightRef,
}

/// Flight reference embedded in a subscription.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightRef {
    pub id: i64,
    #[serde(default)]
    pub flight_number: Option<String>,
}

/// Filters for flight search. Unset fields are not sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlightQuery {
    pub departure_airport: Option<String>,
    pub arrival_airport: Option<String>,
    pub status: Option<String>,
}

impl FlightQuery {
    fn pairs(&self) -> Vec<(&'static str, String)> {
        [
            ("departureAirport", &self.departure_airport),
            ("arrivalAirport", &self.arrival_airport),
            ("status", &self.status),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.as_ref().map(|v| (key, v.trim().to_uppercase())))
        .filter(|(_, v)| !v.is_empty())
        .collect()
    }
}

/// Anything that can fetch a single flight record.
#[async_trait]
pub trait FlightSource: Send + Sync {
    async fn get_flight(&self, flight_id: i64) -> Result<FlightSchedule, ApiError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_pairs_skip_empty_filters() {
        let query = FlightQuery {
            departure_airport: Some("svo".to_string()),
            arrival_airport: Some("  ".to_string()),
            status: None,
        };
        assert_eq!(query.pairs(), vec![("departureAirport", "SVO".to_string())]);
    }

    #[test]
    fn test_auth_response_without_token() {
        let response: AuthResponse =
            serde_json::from_str(r#"{"message": "Invalid credentials"}"#).unwrap();
        assert!(response.token.is_none());
        assert_eq!(response.message.as_deref(), Some("Invalid credentials"));
    }

    #[test]
    fn test_subscription_decoding() {
        let json = r#"[{"id": 3, "userEmail": "a@b.c", "flight": {"id": 7, "flightNumber": "SU2130"}}]"#;
        let subs: Vec<Subscription> = serde_json::from_str(json).unwrap();
        assert_eq!(subs[0].flight.id, 7);
        assert_eq!(subs[0].flight.flight_number.as_deref(), Some("SU2130"));
    }

    #[test]
    fn test_user_profile_decoding() {
        let json = r#"{"id": 4, "email": "pax@example.com", "firstName": "Ivan",
            "lastName": "Petrov", "phoneNumber": "+7 900", "deviceToken": null,
            "createdAt": "2024-01-01T10:00:00", "subscriptionCount": 2}"#;
        let user: UserProfile = serde_json::from_str(json).unwrap();
        assert_eq!(user.id, 4);
        assert_eq!(user.phone_number.as_deref(), Some("+7 900"));
        assert_eq!(user.subscription_count, Some(2));
    }

    #[test]
    fn test_profile_update_sends_only_changed_fields() {
        let update = ProfileUpdate {
            phone_number: Some("+7 901".to_string()),
            ..Default::default()
        };
        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json, serde_json::json!({"phoneNumber": "+7 901"}));
    }

    #[test]
    fn test_profile_update_drops_blank_password() {
        let update = ProfileUpdate {
            password: Some("  ".to_string()),
            ..Default::default()
        };
        assert!(update.normalized().is_none());

        let update = ProfileUpdate {
            first_name: Some("Anna".to_string()),
            password: Some(String::new()),
            ..Default::default()
        };
        let update = update.normalized().unwrap();
        assert!(update.password.is_none());
        assert_eq!(update.first_name.as_deref(), Some("Anna"));
    }

    #[test]
    fn test_register_request_is_camel_case() {
        let request = RegisterRequest {
            first_name: "Ivan".to_string(),
            ..Default::default()
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["firstName"], "Ivan");
        assert!(json.get("first_name").is_none());
    }
}
