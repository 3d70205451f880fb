// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Relay event types.

use serde::{Deserialize, Serialize};

use super::AccessEvent;

/// A transient alarm notification.
///
/// Carries the UTF-8 text of the alarm-active message verbatim. Handed
/// to subscribers and discarded; never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlarmEvent {
    /// Raw decoded text of the alarm-state message.
    pub payload: String,
}

impl AlarmEvent {
    /// Creates an alarm event from the decoded payload text.
    #[must_use]
    pub fn new(payload: impl Into<String>) -> Self {
        Self {
            payload: payload.into(),
        }
    }
}

/// A broker connectivity transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionEvent {
    /// Whether the session is now connected.
    pub connected: bool,
    /// Error message when the transition was caused by a failure.
    pub error: Option<String>,
}

/// Events broadcast by the relay to presentation subscribers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RelayEvent {
    /// The alarm-active topic delivered a message.
    Alarm(AlarmEvent),
    /// The access topic delivered a message; the event is also in the
    /// history log by the time subscribers see it.
    Access(AccessEvent),
    /// Broker connectivity changed.
    Connection(ConnectionEvent),
}

impl RelayEvent {
    /// Creates a connected event.
    #[must_use]
    pub fn connected() -> Self {
        Self::Connection(ConnectionEvent {
            connected: true,
            error: None,
        })
    }

    /// Creates a disconnected event with an optional cause.
    #[must_use]
    pub fn disconnected(error: Option<String>) -> Self {
        Self::Connection(ConnectionEvent {
            connected: false,
            error,
        })
    }

    /// Returns `true` if this is an alarm notification.
    #[must_use]
    pub fn is_alarm(&self) -> bool {
        matches!(self, Self::Alarm(_))
    }

    /// Returns `true` if this is an access-attempt event.
    #[must_use]
    pub fn is_access(&self) -> bool {
        matches!(self, Self::Access(_))
    }

    /// Returns `true` if this is a connectivity transition.
    #[must_use]
    pub fn is_connection(&self) -> bool {
        matches!(self, Self::Connection(_))
    }
}
