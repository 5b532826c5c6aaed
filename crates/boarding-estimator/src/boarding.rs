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

//! Boarding-window countdown.
//!
//! The status is evaluated fresh against the supplied "now" every time; there
//! is no state carried between evaluations.

use chrono::NaiveDateTime;

use crate::flight::FlightSchedule;

/// Below this many minutes the window is urgent.
pub const CLOSING_THRESHOLD_MINUTES: i64 = 20;
/// Below this many minutes the window is a warning.
pub const CLOSING_SOON_THRESHOLD_MINUTES: i64 = 60;

/// How urgently the countdown should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Normal,
    Warning,
    Critical,
}

/// Time remaining before boarding closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardingStatus {
    Closed,
    /// Under 20 minutes left.
    Closing { minutes: i64 },
    /// 20 to 59 minutes left.
    ClosingSoon { minutes: i64 },
    /// An hour or more left.
    Open { hours: i64, minutes: i64 },
}

impl BoardingStatus {
    /// Classify the remaining time.
    ///
    /// Remaining whole minutes are floored; the 20 and 60 minute boundaries
    /// fall into the less urgent band.
    #[must_use]
    pub fn evaluate(scheduled_departure: NaiveDateTime, now: NaiveDateTime) -> Self {
        let diff_minutes = (scheduled_departure - now)
            .num_milliseconds()
            .div_euclid(60_000);

        if diff_minutes <= 0 {
            Self::Closed
        } else if diff_minutes < CLOSING_THRESHOLD_MINUTES {
            Self::Closing {
                minutes: diff_minutes,
            }
        } else if diff_minutes < CLOSING_SOON_THRESHOLD_MINUTES {
            Self::ClosingSoon {
                minutes: diff_minutes,
            }
        } else {
            Self::Open {
                hours: diff_minutes / 60,
                minutes: diff_minutes % 60,
            }
        }
    }

    #[must_use]
    pub fn severity(&self) -> Severity {
        match self {
            Self::Closed | Self::Closing { .. } => Severity::Critical,
            Self::ClosingSoon { .. } => Severity::Warning,
            Self::Open { .. } => Severity::Normal,
        }
    }

    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Closed => "Boarding closed".to_string(),
            Self::Closing { minutes } | Self::ClosingSoon { minutes } => {
                format!("Boarding closes in {minutes} min")
            }
            Self::Open { hours, minutes } => {
                format!("Boarding closes in {hours} h {minutes} min")
            }
        }
    }
}

/// What to show in place of the boarding countdown for a given flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardingWindow {
    Countdown(BoardingStatus),
    /// The flight is cancelled; there is no boarding.
    Cancelled,
    /// The flight has departed or arrived; boarding is over.
    Completed,
    /// No scheduled departure to count down to.
    Unknown,
}

impl BoardingWindow {
    #[must_use]
    pub fn for_flight(flight: &FlightSchedule, now: NaiveDateTime) -> Self {
        if flight.status.is_cancelled() {
            return Self::Cancelled;
        }
        if flight.status.is_completed() {
            return Self::Completed;
        }
        match flight.scheduled_departure {
            Some(scheduled) => Self::Countdown(BoardingStatus::evaluate(scheduled, now)),
            None => Self::Unknown,
        }
    }

    #[must_use]
    pub fn status(&self) -> Option<BoardingStatus> {
        match self {
            Self::Countdown(status) => Some(*status),
            _ => None,
        }
    }

    #[must_use]
    pub fn severity(&self) -> Severity {
        match self {
            Self::Countdown(status) => status.severity(),
            Self::Cancelled => Severity::Critical,
            Self::Completed | Self::Unknown => Severity::Normal,
        }
    }

    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Countdown(status) => status.message(),
            Self::Cancelled => "Flight cancelled, no boarding".to_string(),
            Self::Completed => "Boarding complete, the flight has left".to_string(),
            Self::Unknown => crate::flight::PLACEHOLDER.to_string(),
        }
    }
}
