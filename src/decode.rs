// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Inbound payload decoding.
//!
//! Turns a raw payload, given its source topic, into a typed
//! [`RelayEvent`]. Alarm payloads pass through verbatim; access payloads
//! are trimmed and resolved against the user directory.
//!
//! The wire protocol does not distinguish an unrecognized badge from a
//! keypad entry: both arrive as a bare token on the access topic, and
//! both decode to a `via_pin` event with the `"PIN"` placeholder name.

use crate::directory::UserDirectory;
use crate::error::DecodeError;
use crate::event::{AccessEvent, AlarmEvent, RelayEvent};
use crate::topics::Topics;

/// Decodes an inbound payload into a relay event.
///
/// Returns `Ok(None)` for topics the relay does not handle. The capture
/// timestamp on access events is assigned here, at decode time.
///
/// # Errors
///
/// Returns [`DecodeError::PayloadNotUtf8`] if the payload bytes are not
/// valid UTF-8.
pub fn decode(
    topics: &Topics,
    topic: &str,
    payload: &[u8],
    directory: &dyn UserDirectory,
) -> Result<Option<RelayEvent>, DecodeError> {
    let text = std::str::from_utf8(payload)?;

    if topic == topics.alarm_active {
        return Ok(Some(RelayEvent::Alarm(AlarmEvent::new(text))));
    }

    if topic == topics.door_user {
        let token = text.trim();
        let event = match directory.lookup(token) {
            Some(record) if !record.is_anonymous() => {
                AccessEvent::badge(token, record.first_name, record.last_name)
            }
            _ => AccessEvent::pin(token),
        };
        return Ok(Some(RelayEvent::Access(event)));
    }

    tracing::trace!(topic = %topic, "Ignoring message on unhandled topic");
    Ok(None)
}
