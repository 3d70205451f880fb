// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Wire topic names for the garage installation.
//!
//! The embedded modules and this client agree on four fixed topics. The
//! strings must match the wire bit-exactly; [`Topics`] carries them as a
//! value so tests and alternative deployments can substitute their own.

/// Door command topic. Payload `"open"` or `"close"`.
pub const DOOR_COMMAND: &str = "garaza/vrata";

/// Silence-alarm command topic. Payload `"alarm_off"`.
pub const ALARM_OFF: &str = "garaza/alarm/ugasiti";

/// Alarm-active notification topic, published by the field module.
pub const ALARM_ACTIVE: &str = "garaza/alarm/aktivan";

/// Access-attempt notification topic. Payload is the credential token
/// text, possibly whitespace-padded.
pub const DOOR_USER: &str = "garaza/vrata/user";

/// The set of topics a relay session works with.
///
/// Defaults to the garage installation's wire topics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topics {
    /// Outbound door command topic.
    pub door_command: String,
    /// Outbound silence-alarm topic.
    pub alarm_off: String,
    /// Inbound alarm-active topic.
    pub alarm_active: String,
    /// Inbound access-attempt topic.
    pub door_user: String,
}

impl Default for Topics {
    fn default() -> Self {
        Self {
            door_command: DOOR_COMMAND.to_string(),
            alarm_off: ALARM_OFF.to_string(),
            alarm_active: ALARM_ACTIVE.to_string(),
            door_user: DOOR_USER.to_string(),
        }
    }
}

impl Topics {
    /// Returns the inbound topics the relay subscribes to.
    #[must_use]
    pub fn subscriptions(&self) -> [&str; 2] {
        [&self.alarm_active, &self.door_user]
    }
}
