// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Durable MQTT session to the garage broker.
//!
//! One session owns one logical broker connection for the lifetime of
//! the hosting process. The rumqttc event loop runs on a spawned task;
//! on a connection error the loop keeps polling after a short delay,
//! which is what makes the link self-healing, and registered topics are
//! re-subscribed on every connection acknowledgment.
//!
//! Inbound traffic is delivered as a message stream: connecting returns
//! an [`mpsc::Receiver`] of [`SessionEvent`] values carrying every
//! publish received on subscribed topics plus connectivity transitions.
//! There is no per-topic callback registration; consumers route by
//! topic themselves.
//!
//! # Examples
//!
//! ```no_run
//! use garaza_relay::{MqttSession, RelayConfig};
//!
//! # async fn example() -> Result<(), garaza_relay::SessionError> {
//! let config = RelayConfig::new("broker.hivemq.com");
//! let (session, mut events) = MqttSession::connect(config).await?;
//!
//! session.subscribe("garaza/alarm/aktivan").await?;
//! session.publish("garaza/vrata", "open").await?;
//!
//! while let Some(event) = events.recv().await {
//!     println!("{event:?}");
//! }
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::RwLock;
use rumqttc::{AsyncClient, EventLoop, MqttOptions, QoS};
use tokio::sync::{mpsc, oneshot};

use crate::config::RelayConfig;
use crate::error::SessionError;

/// Capacity of the inbound session-event channel.
const INBOUND_CHANNEL_CAPACITY: usize = 64;

/// An inbound message received on a subscribed topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    /// The topic the message arrived on.
    pub topic: String,
    /// The raw payload bytes.
    pub payload: Vec<u8>,
}

/// Events delivered on the session's inbound channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A message arrived on a subscribed topic.
    Message(InboundMessage),
    /// The broker acknowledged a (re)connection.
    Connected,
    /// The connection dropped; the session keeps retrying on its own.
    Disconnected {
        /// Cause of the drop, when one was reported.
        error: Option<String>,
    },
}

/// A durable connection to the MQTT broker.
///
/// Cheaply cloneable (via `Arc`); clones share the one underlying
/// connection. Dropping all clones does not disconnect — call
/// [`MqttSession::disconnect`] for a graceful teardown.
#[derive(Clone)]
pub struct MqttSession {
    inner: Arc<MqttSessionInner>,
}

struct MqttSessionInner {
    /// The MQTT async client for publishing and subscribing.
    client: AsyncClient,
    /// Configuration used for this session.
    config: RelayConfig,
    /// Connection status, maintained by the event loop.
    connected: AtomicBool,
    /// Set by `disconnect()`; tells the event loop to stop retrying.
    shutdown: AtomicBool,
    /// Topics to re-subscribe after a reconnect.
    subscriptions: RwLock<Vec<String>>,
}

impl MqttSession {
    /// Connects to the broker described by `config`.
    ///
    /// Spawns the event-loop task and waits for the broker's connection
    /// acknowledgment. Returns the session handle together with the
    /// inbound event stream; the receiver yields `None` only after the
    /// session has been shut down.
    ///
    /// # Errors
    ///
    /// Returns error if the host is missing, the event loop dies before
    /// acknowledging, or the acknowledgment times out. Once this call
    /// has succeeded, later connection drops are retried internally and
    /// never surface as errors.
    pub async fn connect(
        config: RelayConfig,
    ) -> Result<(Self, mpsc::Receiver<SessionEvent>), SessionError> {
        if config.host.is_empty() {
            return Err(SessionError::InvalidAddress(
                "broker host is required".to_string(),
            ));
        }

        let client_id = config.client_id.generate();
        let mut mqtt_options = MqttOptions::new(&client_id, &config.host, config.port);
        mqtt_options.set_keep_alive(config.keep_alive);
        mqtt_options.set_clean_session(true);

        if let Some((ref username, ref password)) = config.credentials {
            mqtt_options.set_credentials(username, password);
        }

        let (client, event_loop) = AsyncClient::new(mqtt_options, 10);
        let (inbound_tx, inbound_rx) = mpsc::channel::<SessionEvent>(INBOUND_CHANNEL_CAPACITY);

        let connection_timeout = config.connection_timeout;
        let session = Self {
            inner: Arc::new(MqttSessionInner {
                client,
                config,
                connected: AtomicBool::new(false),
                shutdown: AtomicBool::new(false),
                subscriptions: RwLock::new(Vec::new()),
            }),
        };

        // Channel to signal when the first ConnAck is received
        let (connack_tx, connack_rx) = oneshot::channel();

        let session_clone = session.clone();
        tokio::spawn(async move {
            handle_session_events(event_loop, session_clone, inbound_tx, connack_tx).await;
        });

        match tokio::time::timeout(connection_timeout, connack_rx).await {
            Ok(Ok(())) => {
                tracing::info!(
                    host = %session.inner.config.host,
                    port = %session.inner.config.port,
                    client_id = %client_id,
                    "Connected to MQTT broker"
                );
            }
            Ok(Err(_)) => {
                return Err(SessionError::Connect(
                    "MQTT event loop terminated unexpectedly".to_string(),
                ));
            }
            Err(_) => {
                session.inner.shutdown.store(true, Ordering::Release);
                return Err(SessionError::ConnectTimeout(connection_timeout));
            }
        }

        Ok((session, inbound_rx))
    }

    /// Returns whether the session currently holds a live connection.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.inner.connected.load(Ordering::Acquire)
    }

    /// Returns the configuration this session was built from.
    #[must_use]
    pub fn config(&self) -> &RelayConfig {
        &self.inner.config
    }

    /// Subscribes to a topic at QoS 1.
    ///
    /// The topic is remembered and re-subscribed automatically after a
    /// reconnect; callers subscribe once per topic for the process
    /// lifetime. Messages published to the topic after the broker
    /// processes the subscription arrive on the inbound channel.
    ///
    /// # Errors
    ///
    /// Returns error if the subscribe request cannot be queued.
    pub async fn subscribe(&self, topic: impl Into<String>) -> Result<(), SessionError> {
        let topic = topic.into();

        {
            let mut subscriptions = self.inner.subscriptions.write();
            if !subscriptions.contains(&topic) {
                subscriptions.push(topic.clone());
            }
        }

        tracing::debug!(topic = %topic, "Subscribing");
        self.inner
            .client
            .subscribe(&topic, QoS::AtLeastOnce)
            .await
            .map_err(|source| SessionError::Subscribe { topic, source })
    }

    /// Publishes a UTF-8 message to a topic at QoS 1, non-retained.
    ///
    /// Suspends only until the packet is queued with the client; actual
    /// delivery is at-least-once on the transport's terms.
    ///
    /// # Errors
    ///
    /// Returns error if the publish request cannot be queued.
    pub async fn publish(&self, topic: &str, message: &str) -> Result<(), SessionError> {
        tracing::debug!(topic = %topic, message = %message, "Publishing");
        self.inner
            .client
            .publish(topic, QoS::AtLeastOnce, false, message)
            .await
            .map_err(|source| SessionError::Publish {
                topic: topic.to_string(),
                source,
            })
    }

    /// Best-effort graceful teardown.
    ///
    /// Stops the event loop's reconnect behavior and asks the broker to
    /// close the connection. Teardown failures are logged and swallowed;
    /// the process is shutting down regardless.
    pub async fn disconnect(&self) {
        tracing::info!(
            host = %self.inner.config.host,
            port = %self.inner.config.port,
            "Disconnecting from MQTT broker"
        );

        self.inner.shutdown.store(true, Ordering::Release);

        if let Err(e) = self.inner.client.disconnect().await {
            tracing::warn!(error = %e, "Disconnect failed");
        }

        self.inner.connected.store(false, Ordering::Release);
    }

    /// Re-issues all registered subscriptions.
    ///
    /// Called from the event loop on every ConnAck: the session uses a
    /// clean session, so the broker forgets subscriptions across
    /// reconnects. Uses the non-suspending request path because the
    /// event loop must keep polling.
    fn resubscribe(&self) {
        let topics: Vec<String> = self.inner.subscriptions.read().clone();
        for topic in topics {
            if let Err(e) = self.inner.client.try_subscribe(&topic, QoS::AtLeastOnce) {
                tracing::warn!(topic = %topic, error = %e, "Re-subscribe failed");
            } else {
                tracing::debug!(topic = %topic, "Re-subscribed after reconnect");
            }
        }
    }
}

impl crate::command::CommandTransport for MqttSession {
    async fn publish(&self, topic: &str, message: &str) -> Result<(), SessionError> {
        MqttSession::publish(self, topic, message).await
    }
}

impl std::fmt::Debug for MqttSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MqttSession")
            .field("host", &self.inner.config.host)
            .field("port", &self.inner.config.port)
            .field("connected", &self.is_connected())
            .finish()
    }
}

/// Drives the MQTT event loop for the lifetime of the session.
///
/// Polling never stops on a connection error unless shutdown was
/// requested; rumqttc re-establishes the link on the next poll, so
/// continuing to poll after a pause is the whole reconnect policy.
async fn handle_session_events(
    mut event_loop: EventLoop,
    session: MqttSession,
    inbound_tx: mpsc::Sender<SessionEvent>,
    connack_tx: oneshot::Sender<()>,
) {
    use rumqttc::{Event, Packet};

    let mut connack_tx = Some(connack_tx);

    loop {
        match event_loop.poll().await {
            Ok(Event::Incoming(Packet::ConnAck(connack))) => {
                tracing::debug!(?connack, "MQTT session connected");
                session.inner.connected.store(true, Ordering::Release);
                if let Some(tx) = connack_tx.take() {
                    let _ = tx.send(());
                }
                session.resubscribe();
                // Ignore send errors - the consumer may have been dropped
                let _ = inbound_tx.send(SessionEvent::Connected).await;
            }
            Ok(Event::Incoming(Packet::SubAck(suback))) => {
                tracing::debug!(?suback, "MQTT subscription acknowledged");
            }
            Ok(Event::Incoming(Packet::Publish(publish))) => {
                tracing::debug!(
                    topic = %publish.topic,
                    len = publish.payload.len(),
                    "MQTT message received"
                );
                let message = InboundMessage {
                    topic: publish.topic.clone(),
                    payload: publish.payload.to_vec(),
                };
                let _ = inbound_tx.send(SessionEvent::Message(message)).await;
            }
            Ok(Event::Incoming(Packet::Disconnect)) => {
                tracing::info!("Broker closed the connection");
                if session.inner.connected.swap(false, Ordering::AcqRel) {
                    let _ = inbound_tx
                        .send(SessionEvent::Disconnected { error: None })
                        .await;
                }
                if session.inner.shutdown.load(Ordering::Acquire) {
                    break;
                }
            }
            Ok(_) => {}
            Err(e) => {
                if session.inner.shutdown.load(Ordering::Acquire) {
                    tracing::debug!("MQTT event loop stopped after shutdown");
                    break;
                }
                if session.inner.connected.swap(false, Ordering::AcqRel) {
                    let _ = inbound_tx
                        .send(SessionEvent::Disconnected {
                            error: Some(e.to_string()),
                        })
                        .await;
                }
                tracing::warn!(error = %e, "MQTT event loop error, retrying");
                tokio::time::sleep(session.inner.config.reconnect_delay).await;
            }
        }
    }
}
