// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The garage relay.
//!
//! [`GarageRelay`] wires the pieces together: it connects one MQTT
//! session, subscribes to the installation's notification topics, and
//! runs the dispatch task that decodes inbound payloads into domain
//! events, records access attempts in the history log, and broadcasts
//! everything on the event bus. The relay runs for the lifetime of the
//! hosting process, independent of whether any screen is watching.
//!
//! # Examples
//!
//! ```no_run
//! use std::sync::Arc;
//! use garaza_relay::{GarageRelay, RelayConfig, RelayEvent};
//! use garaza_relay::directory::StaticUserDirectory;
//!
//! # async fn example() -> Result<(), garaza_relay::SessionError> {
//! let relay = GarageRelay::builder(RelayConfig::new("broker.hivemq.com"))
//!     .with_directory(Arc::new(StaticUserDirectory::default()))
//!     .start()
//!     .await?;
//!
//! let mut events = relay.events();
//! relay.open_door();
//!
//! while let Ok(event) = events.recv().await {
//!     if let RelayEvent::Alarm(alarm) = event {
//!         println!("alarm: {}", alarm.payload);
//!     }
//! }
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};

use crate::command::{Command, CommandPublisher};
use crate::config::RelayConfig;
use crate::decode::decode;
use crate::directory::{StaticUserDirectory, UserDirectory};
use crate::error::SessionError;
use crate::event::{AccessEvent, EventBus, RelayEvent};
use crate::history::HistoryLog;
use crate::session::{MqttSession, SessionEvent};
use crate::topics::Topics;

/// The event relay and session-state component.
///
/// Owns the MQTT session, the history log, and the event bus. Created
/// once per process via [`GarageRelay::builder`]; torn down with
/// [`GarageRelay::shutdown`].
#[derive(Debug)]
pub struct GarageRelay {
    session: Arc<MqttSession>,
    publisher: CommandPublisher<MqttSession>,
    history: Arc<HistoryLog>,
    bus: EventBus,
    topics: Topics,
    dispatch: tokio::task::JoinHandle<()>,
}

impl GarageRelay {
    /// Creates a builder for a relay against the given broker config.
    #[must_use]
    pub fn builder(config: RelayConfig) -> GarageRelayBuilder {
        GarageRelayBuilder {
            config,
            directory: None,
        }
    }

    /// Requests a fire-and-forget publish to an arbitrary topic.
    ///
    /// Returns before the network round trip; delivery failures are
    /// logged and dropped.
    pub fn request_publish(&self, topic: impl Into<String>, message: impl Into<String>) {
        self.publisher.send(Command::new(topic, message));
    }

    /// Sends the open-door command.
    pub fn open_door(&self) {
        self.publisher
            .send(Command::new(&self.topics.door_command, "open"));
    }

    /// Sends the close-door command.
    pub fn close_door(&self) {
        self.publisher
            .send(Command::new(&self.topics.door_command, "close"));
    }

    /// Sends the silence-alarm command.
    pub fn silence_alarm(&self) {
        self.publisher
            .send(Command::new(&self.topics.alarm_off, "alarm_off"));
    }

    /// Returns a handle to the access history.
    #[must_use]
    pub fn history(&self) -> Arc<HistoryLog> {
        Arc::clone(&self.history)
    }

    /// Returns a copy of the access history, newest first.
    #[must_use]
    pub fn history_snapshot(&self) -> Vec<AccessEvent> {
        self.history.snapshot()
    }

    /// Subscribes to relay events (alarms, access attempts, and
    /// connectivity transitions).
    #[must_use]
    pub fn events(&self) -> broadcast::Receiver<RelayEvent> {
        self.bus.subscribe()
    }

    /// Returns whether the broker connection is currently up.
    ///
    /// Commands may still be issued while disconnected; they are
    /// queued or dropped on the transport's terms.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.session.is_connected()
    }

    /// Best-effort teardown: disconnects the session and stops the
    /// dispatch task. In-flight publishes may or may not be delivered.
    pub async fn shutdown(&self) {
        self.session.disconnect().await;
        self.dispatch.abort();
    }
}

/// Builder for [`GarageRelay`].
pub struct GarageRelayBuilder {
    config: RelayConfig,
    directory: Option<Arc<dyn UserDirectory>>,
}

impl GarageRelayBuilder {
    /// Sets the user directory used to resolve credential tokens.
    ///
    /// Defaults to an empty table, under which every badge decodes as a
    /// keypad entry.
    #[must_use]
    pub fn with_directory(mut self, directory: Arc<dyn UserDirectory>) -> Self {
        self.directory = Some(directory);
        self
    }

    /// Connects the session, subscribes to the notification topics, and
    /// starts the dispatch task.
    ///
    /// # Errors
    ///
    /// Returns error if the initial connect or a subscription fails.
    /// Once started, connection drops are handled internally.
    pub async fn start(self) -> Result<GarageRelay, SessionError> {
        let directory = self
            .directory
            .unwrap_or_else(|| Arc::new(StaticUserDirectory::default()));
        let topics = self.config.topics.clone();

        let (session, inbound_rx) = MqttSession::connect(self.config).await?;
        for topic in topics.subscriptions() {
            session.subscribe(topic).await?;
        }

        let session = Arc::new(session);
        let history = Arc::new(HistoryLog::new());
        let bus = EventBus::new();

        let dispatch = tokio::spawn(run_dispatch(
            inbound_rx,
            topics.clone(),
            directory,
            Arc::clone(&history),
            bus.clone(),
        ));

        Ok(GarageRelay {
            publisher: CommandPublisher::new(Arc::clone(&session)),
            session,
            history,
            bus,
            topics,
            dispatch,
        })
    }
}

/// Drains the session's inbound channel until it closes.
///
/// Access events are appended to the history before they are broadcast,
/// so a subscriber reacting to the broadcast always sees them in a
/// snapshot. Undecodable payloads are dropped with a warning.
async fn run_dispatch(
    mut inbound_rx: mpsc::Receiver<SessionEvent>,
    topics: Topics,
    directory: Arc<dyn UserDirectory>,
    history: Arc<HistoryLog>,
    bus: EventBus,
) {
    while let Some(session_event) = inbound_rx.recv().await {
        match session_event {
            SessionEvent::Connected => bus.publish(RelayEvent::connected()),
            SessionEvent::Disconnected { error } => bus.publish(RelayEvent::disconnected(error)),
            SessionEvent::Message(message) => {
                match decode(&topics, &message.topic, &message.payload, directory.as_ref()) {
                    Ok(Some(RelayEvent::Access(access))) => {
                        tracing::debug!(
                            token = %access.credential_token,
                            via_pin = access.via_pin,
                            "Access event recorded"
                        );
                        history.append(access.clone());
                        bus.publish(RelayEvent::Access(access));
                    }
                    Ok(Some(event)) => bus.publish(event),
                    Ok(None) => {}
                    Err(e) => {
                        tracing::warn!(
                            topic = %message.topic,
                            error = %e,
                            "Dropping undecodable payload"
                        );
                    }
                }
            }
        }
    }

    tracing::debug!("Inbound channel closed, dispatch task exiting");
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::time::timeout;

    use super::*;
    use crate::directory::UserRecord;
    use crate::event::AlarmEvent;
    use crate::session::InboundMessage;

    /// Spawns the dispatch task over a hand-fed inbound channel.
    fn spawn_dispatch(
        directory: StaticUserDirectory,
    ) -> (
        mpsc::Sender<SessionEvent>,
        Arc<HistoryLog>,
        broadcast::Receiver<RelayEvent>,
    ) {
        let (tx, rx) = mpsc::channel(16);
        let history = Arc::new(HistoryLog::new());
        let bus = EventBus::new();
        let events = bus.subscribe();

        tokio::spawn(run_dispatch(
            rx,
            Topics::default(),
            Arc::new(directory),
            Arc::clone(&history),
            bus,
        ));

        (tx, history, events)
    }

    fn message(topic: &str, payload: &[u8]) -> SessionEvent {
        SessionEvent::Message(InboundMessage {
            topic: topic.to_string(),
            payload: payload.to_vec(),
        })
    }

    #[tokio::test]
    async fn alarm_message_is_broadcast_exactly_once() {
        let (tx, _history, mut events) = spawn_dispatch(StaticUserDirectory::default());

        tx.send(message("garaza/alarm/aktivan", b"ALARM1"))
            .await
            .unwrap();

        let event = timeout(Duration::from_secs(1), events.recv())
            .await
            .expect("no event arrived")
            .unwrap();
        assert_eq!(event, RelayEvent::Alarm(AlarmEvent::new("ALARM1")));

        // Nothing else was produced for the single inbound frame
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn unknown_token_grows_history_with_pin_entry() {
        let (tx, history, mut events) = spawn_dispatch(StaticUserDirectory::default());

        tx.send(message("garaza/vrata/user", b"deadbeef"))
            .await
            .unwrap();

        let event = timeout(Duration::from_secs(1), events.recv())
            .await
            .expect("no event arrived")
            .unwrap();

        let RelayEvent::Access(access) = event else {
            panic!("expected Access event");
        };
        assert!(access.via_pin);
        assert_eq!(history.len(), 1);
        assert_eq!(history.snapshot()[0], access);
    }

    #[tokio::test]
    async fn known_token_is_resolved_and_recorded() {
        let directory =
            StaticUserDirectory::from_records(vec![UserRecord::new("AB12CD", "Amar", "Begic")]);
        let (tx, history, mut events) = spawn_dispatch(directory);

        tx.send(message("garaza/vrata/user", b"  AB12CD  "))
            .await
            .unwrap();

        let event = timeout(Duration::from_secs(1), events.recv())
            .await
            .expect("no event arrived")
            .unwrap();

        let RelayEvent::Access(access) = event else {
            panic!("expected Access event");
        };
        assert!(!access.via_pin);
        assert_eq!(access.first_name, "Amar");
        assert_eq!(access.credential_token, "AB12CD");
        assert_eq!(history.len(), 1);
    }

    #[tokio::test]
    async fn history_stays_newest_first_across_messages() {
        let (tx, history, _events) = spawn_dispatch(StaticUserDirectory::default());

        for token in ["one", "two", "three"] {
            tx.send(message("garaza/vrata/user", token.as_bytes()))
                .await
                .unwrap();
        }

        timeout(Duration::from_secs(1), async {
            while history.len() < 3 {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("history never filled");

        let tokens: Vec<String> = history
            .snapshot()
            .into_iter()
            .map(|e| e.credential_token)
            .collect();
        assert_eq!(tokens, ["three", "two", "one"]);
    }

    #[tokio::test]
    async fn undecodable_payload_is_dropped_silently() {
        let (tx, history, mut events) = spawn_dispatch(StaticUserDirectory::default());

        tx.send(message("garaza/vrata/user", &[0xff, 0xfe]))
            .await
            .unwrap();
        tx.send(message("garaza/alarm/aktivan", b"still alive"))
            .await
            .unwrap();

        // The bad frame produced nothing; the next one still flows
        let event = timeout(Duration::from_secs(1), events.recv())
            .await
            .expect("relay stopped after bad payload")
            .unwrap();
        assert_eq!(event, RelayEvent::Alarm(AlarmEvent::new("still alive")));
        assert_eq!(history.len(), 0);
    }

    #[tokio::test]
    async fn connectivity_transitions_are_broadcast() {
        let (tx, _history, mut events) = spawn_dispatch(StaticUserDirectory::default());

        tx.send(SessionEvent::Connected).await.unwrap();
        tx.send(SessionEvent::Disconnected {
            error: Some("connection reset".to_string()),
        })
        .await
        .unwrap();

        let first = timeout(Duration::from_secs(1), events.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(first, RelayEvent::connected());

        let second = timeout(Duration::from_secs(1), events.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            second,
            RelayEvent::disconnected(Some("connection reset".to_string()))
        );
    }

    #[tokio::test]
    async fn door_command_message_on_command_topic_is_ignored() {
        // The relay does not subscribe to its own command topics, but a
        // frame arriving there must not crash dispatch either
        let (tx, history, mut events) = spawn_dispatch(StaticUserDirectory::default());

        tx.send(message("garaza/vrata", b"open")).await.unwrap();
        tx.send(message("garaza/alarm/aktivan", b"after"))
            .await
            .unwrap();

        let event = timeout(Duration::from_secs(1), events.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(event, RelayEvent::Alarm(AlarmEvent::new("after")));
        assert!(history.is_empty());
    }
}
