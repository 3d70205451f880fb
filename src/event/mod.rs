// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Domain events and their fan-out.
//!
//! Inbound payloads decode into [`RelayEvent`] values, which the relay
//! broadcasts to presentation subscribers through the [`EventBus`].
//!
//! # Examples
//!
//! ```
//! use garaza_relay::event::{AlarmEvent, EventBus, RelayEvent};
//!
//! let bus = EventBus::new();
//! let mut rx = bus.subscribe();
//!
//! bus.publish(RelayEvent::Alarm(AlarmEvent::new("ALARM1")));
//! ```

mod access_event;
mod event_bus;
mod relay_event;

pub use access_event::AccessEvent;
pub use event_bus::EventBus;
pub use relay_event::{AlarmEvent, ConnectionEvent, RelayEvent};
