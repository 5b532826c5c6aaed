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

use serde::{Deserialize, Serialize};

/// Ground travel and airport processing assumptions.
///
/// These are client-side settings; the flight API never supplies them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingParams {
    /// Average door-to-door ground speed in km/h.
    pub average_speed_kmh: f64,
    /// Traffic inflation applied to the drive time (> 1.0 inflates).
    pub traffic_multiplier: f64,
    pub checkin_minutes: u32,
    pub security_minutes: u32,
    pub passport_minutes: u32,
    /// Safety margin on top of the airport procedures.
    pub buffer_minutes: u32,
}

impl Default for ProcessingParams {
    fn default() -> Self {
        Self {
            average_speed_kmh: 32.0,
            traffic_multiplier: 1.2,
            checkin_minutes: 10,
            security_minutes: 15,
            passport_minutes: 10,
            buffer_minutes: 20,
        }
    }
}

impl ProcessingParams {
    /// Time spent inside the airport before reaching the gate.
    ///
    /// Saturates at `u32::MAX` instead of wrapping on absurd config values.
    #[must_use]
    pub fn total_processing_minutes(&self) -> u32 {
        [
            self.checkin_minutes,
            self.security_minutes,
            self.passport_minutes,
            self.buffer_minutes,
        ]
        .into_iter()
        .fold(0, u32::saturating_add)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_processing_total() {
        assert_eq!(ProcessingParams::default().total_processing_minutes(), 55);
    }

    #[test]
    fn test_oversized_stage_saturates() {
        let params: ProcessingParams =
            serde_json::from_str(r#"{"checkin_minutes": 4294967295, "security_minutes": 15}"#)
                .unwrap();
        assert_eq!(params.total_processing_minutes(), u32::MAX);
    }
}
