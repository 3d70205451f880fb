// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Access-attempt event type.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One observed attempt to operate the garage via badge or keypad.
///
/// Created by the decoder once per inbound access message and immutable
/// afterwards. When the entry came through the keypad — or the badge
/// token matched no known identity, which the wire cannot distinguish —
/// `via_pin` is `true` and the name fields carry the `"PIN"` placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessEvent {
    /// Raw token read from the badge; irrelevant for keypad entries.
    pub credential_token: String,
    /// Resolved first name, or `"PIN"` when unresolved.
    pub first_name: String,
    /// Resolved last name, or empty when unresolved.
    pub last_name: String,
    /// `true` when the entry method was the keypad rather than a badge.
    pub via_pin: bool,
    /// Capture time, assigned at decode time. Wall-clock based.
    pub observed_at_epoch_millis: i64,
}

impl AccessEvent {
    /// Creates a badge event with a resolved identity, stamped now.
    #[must_use]
    pub fn badge(
        token: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
    ) -> Self {
        Self {
            credential_token: token.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            via_pin: false,
            observed_at_epoch_millis: Utc::now().timestamp_millis(),
        }
    }

    /// Creates a keypad (or unresolved-badge) event, stamped now.
    #[must_use]
    pub fn pin(token: impl Into<String>) -> Self {
        Self {
            credential_token: token.into(),
            first_name: "PIN".to_string(),
            last_name: String::new(),
            via_pin: true,
            observed_at_epoch_millis: Utc::now().timestamp_millis(),
        }
    }

    /// Returns the capture time as a UTC datetime.
    ///
    /// Falls back to the epoch for out-of-range millis values, which
    /// cannot occur for wall-clock stamps.
    #[must_use]
    pub fn observed_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.observed_at_epoch_millis).unwrap_or_default()
    }
}
