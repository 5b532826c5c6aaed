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

//! HTTP client for the flight API.

use std::time::Duration;

use async_trait::async_trait;
use boarding_estimator::FlightSchedule;
use log::{debug, warn};
use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::{
    ApiError, AuthResponse, FlightQuery, FlightSource, LoginRequest, ProfileUpdate,
    RegisterRequest, Subscription, UserProfile,
};

/// Client for the flight API. Attaches the session token when one is set.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: Url,
    token: Option<String>,
}

impl ApiClient {
    /// Create a client for `base_url` (e.g. `http://localhost:8080`).
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let mut normalized = base_url.trim().to_string();
        if !normalized.ends_with('/') {
            normalized.push('/');
        }
        let base_url =
            Url::parse(&normalized).map_err(|e| ApiError::InvalidUrl(format!("{base_url}: {e}")))?;
        let http = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            base_url,
            token: None,
        })
    }

    /// Attach (or clear) the bearer token sent with every request.
    #[must_use]
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| ApiError::InvalidUrl(format!("{path}: {e}")))
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<String, ApiError> {
        let response = self.authorize(request).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            warn!("Flight API returned {}", status);
            return Err(ApiError::Status {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }
        Ok(body)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let url = self.endpoint(path)?;
        debug!("GET {}", url);
        let body = self.send(self.http.get(url).query(query)).await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn send_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        body: &B,
    ) -> Result<T, ApiError> {
        let body = self.send(request.json(body)).await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// `GET /flights/{id}`
    pub async fn flight(&self, flight_id: i64) -> Result<FlightSchedule, ApiError> {
        self.get_json(&format!("flights/{flight_id}"), &[]).await
    }

    /// `GET /flights/number/{flightNumber}`
    pub async fn flight_by_number(&self, flight_number: &str) -> Result<FlightSchedule, ApiError> {
        self.get_json(&format!("flights/number/{}", flight_number.trim()), &[])
            .await
    }

    /// `GET /flights` with optional airport and status filters.
    pub async fn search_flights(&self, query: &FlightQuery) -> Result<Vec<FlightSchedule>, ApiError> {
        self.get_json("flights", &query.pairs()).await
    }

    /// `POST /api/auth/login`
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, ApiError> {
        let url = self.endpoint("api/auth/login")?;
        debug!("POST {}", url);
        self.send_json(self.http.post(url), &LoginRequest { email, password })
            .await
    }

    /// `POST /api/auth/register`
    pub async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, ApiError> {
        let url = self.endpoint("api/auth/register")?;
        debug!("POST {}", url);
        self.send_json(self.http.post(url), request).await
    }

    /// `GET /api/users/email/{email}`; the session only knows the e-mail.
    pub async fn user(&self, email: &str) -> Result<UserProfile, ApiError> {
        self.get_json(&format!("api/users/email/{}", email.trim()), &[])
            .await
    }

    /// `PUT /api/users/{id}` with only the changed fields.
    pub async fn update_user(
        &self,
        user_id: i64,
        update: &ProfileUpdate,
    ) -> Result<UserProfile, ApiError> {
        let url = self.endpoint(&format!("api/users/{user_id}"))?;
        debug!("PUT {}", url);
        self.send_json(self.http.put(url), update).await
    }

    /// `GET /api/subscriptions/user/{email}`
    pub async fn subscriptions(&self, email: &str) -> Result<Vec<Subscription>, ApiError> {
        self.get_json(&format!("api/subscriptions/user/{}", email.trim()), &[])
            .await
    }

    /// `POST /api/subscriptions/subscribe?flightId=`
    pub async fn subscribe(&self, flight_id: i64) -> Result<(), ApiError> {
        let url = self.endpoint("api/subscriptions/subscribe")?;
        self.send(self.http.post(url).query(&[("flightId", flight_id)]))
            .await
            .map(|_| ())
    }

    /// `POST /api/subscriptions/unsubscribe?flightNumber=`
    pub async fn unsubscribe(&self, flight_number: &str) -> Result<(), ApiError> {
        let url = self.endpoint("api/subscriptions/unsubscribe")?;
        self.send(
            self.http
                .post(url)
                .query(&[("flightNumber", flight_number.trim())]),
        )
        .await
        .map(|_| ())
    }
}

#[async_trait]
impl FlightSource for ApiClient {
    async fn get_flight(&self, flight_id: i64) -> Result<FlightSchedule, ApiError> {
        self.flight(flight_id).await
    }
}

/// Pull a readable message out of an error body.
///
/// The API answers errors with either `{"message": "..."}` or plain text.
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("message")
                .or_else(|| v.get("error"))
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.trim().to_string())
}
