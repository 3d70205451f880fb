// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Garage-automation event relay over MQTT.
//!
//! This library keeps one durable MQTT session to a broker, subscribes
//! to the garage installation's notification topics, decodes inbound
//! payloads into typed domain events, records access attempts in an
//! in-memory newest-first history, and lets callers publish door and
//! alarm commands fire-and-forget. It is the headless core of a garage
//! client: UI layers subscribe to the event stream and render the
//! history snapshot, nothing more.
//!
//! # Topics
//!
//! The installation's wire protocol uses four fixed topics:
//!
//! | Topic | Direction | Payload |
//! |---|---|---|
//! | `garaza/vrata` | publish | `"open"` / `"close"` |
//! | `garaza/alarm/ugasiti` | publish | `"alarm_off"` |
//! | `garaza/alarm/aktivan` | subscribe | alarm text |
//! | `garaza/vrata/user` | subscribe | credential token |
//!
//! All payloads are UTF-8 text, delivered at-least-once.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use garaza_relay::{GarageRelay, RelayConfig, RelayEvent};
//! use garaza_relay::directory::{StaticUserDirectory, UserRecord};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), garaza_relay::SessionError> {
//!     let directory = StaticUserDirectory::from_records(vec![
//!         UserRecord::new("4159772003", "Dalila", "Hodzic"),
//!     ]);
//!
//!     let relay = GarageRelay::builder(RelayConfig::new("broker.hivemq.com"))
//!         .with_directory(Arc::new(directory))
//!         .start()
//!         .await?;
//!
//!     // Commands are fire-and-forget
//!     relay.open_door();
//!
//!     // Events arrive on a broadcast channel
//!     let mut events = relay.events();
//!     while let Ok(event) = events.recv().await {
//!         match event {
//!             RelayEvent::Alarm(alarm) => println!("ALARM: {}", alarm.payload),
//!             RelayEvent::Access(access) => {
//!                 println!("access: {} {}", access.first_name, access.last_name);
//!             }
//!             RelayEvent::Connection(conn) => println!("connected: {}", conn.connected),
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Failure model
//!
//! Nothing here is fatal. Connection drops are retried by the session's
//! event loop; publish and decode failures are logged and dropped. The
//! relay never terminates the hosting process.

pub mod command;
pub mod config;
pub mod decode;
pub mod directory;
pub mod error;
pub mod event;
pub mod history;
pub mod relay;
pub mod session;
pub mod topics;

pub use command::{Command, CommandPublisher, CommandTransport};
pub use config::{ClientIdStrategy, RelayConfig};
pub use directory::{StaticUserDirectory, UserDirectory, UserRecord};
pub use error::{DecodeError, Error, ParseError, Result, SessionError};
pub use event::{AccessEvent, AlarmEvent, ConnectionEvent, EventBus, RelayEvent};
pub use history::HistoryLog;
pub use relay::{GarageRelay, GarageRelayBuilder};
pub use session::{InboundMessage, MqttSession, SessionEvent};
pub use topics::Topics;
