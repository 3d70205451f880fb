// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Relay configuration.
//!
//! The broker endpoint, timing knobs, client-id strategy, and topic set
//! are all injected through [`RelayConfig`] rather than hard-coded, so
//! deployments and tests can point the relay at any broker.
//!
//! # Examples
//!
//! ```
//! use garaza_relay::RelayConfig;
//! use std::time::Duration;
//!
//! let config = RelayConfig::new("broker.hivemq.com")
//!     .with_port(1883)
//!     .with_keep_alive(Duration::from_secs(30));
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use uuid::Uuid;

use crate::topics::Topics;

/// Global counter for generating unique client IDs.
static CLIENT_ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Strategy for generating the MQTT client identifier.
///
/// Concurrent installs and restarts must not collide on the broker, so
/// the identifier has to come from a uniqueness source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ClientIdStrategy {
    /// `garaza_<pid>_<counter>` — unique per process and per session.
    #[default]
    ProcessUnique,
    /// `garaza-<uuid>` — unique across hosts.
    Random,
    /// A caller-supplied identifier, used verbatim.
    Fixed(String),
}

impl ClientIdStrategy {
    /// Produces a client identifier according to the strategy.
    #[must_use]
    pub fn generate(&self) -> String {
        match self {
            Self::ProcessUnique => {
                let counter = CLIENT_ID_COUNTER.fetch_add(1, Ordering::Relaxed);
                format!("garaza_{}_{}", std::process::id(), counter)
            }
            Self::Random => format!("garaza-{}", Uuid::new_v4().simple()),
            Self::Fixed(id) => id.clone(),
        }
    }
}

/// Configuration for a relay session.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Broker host address.
    pub host: String,
    /// Broker port (default: 1883).
    pub port: u16,
    /// Optional broker credentials.
    pub credentials: Option<(String, String)>,
    /// MQTT keep-alive interval (default: 30 seconds).
    pub keep_alive: Duration,
    /// How long to wait for the broker's connection acknowledgment
    /// (default: 10 seconds).
    pub connection_timeout: Duration,
    /// Delay before re-polling the event loop after a connection error
    /// (default: 1 second). This is the reconnect pacing knob.
    pub reconnect_delay: Duration,
    /// Client identifier strategy.
    pub client_id: ClientIdStrategy,
    /// Topic set for the installation.
    pub topics: Topics,
}

impl RelayConfig {
    /// Creates a configuration for the given broker host with defaults.
    #[must_use]
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: 1883,
            credentials: None,
            keep_alive: Duration::from_secs(30),
            connection_timeout: Duration::from_secs(10),
            reconnect_delay: Duration::from_secs(1),
            client_id: ClientIdStrategy::default(),
            topics: Topics::default(),
        }
    }

    /// Sets the broker port.
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Sets broker credentials.
    #[must_use]
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.credentials = Some((username.into(), password.into()));
        self
    }

    /// Sets the keep-alive interval.
    #[must_use]
    pub fn with_keep_alive(mut self, duration: Duration) -> Self {
        self.keep_alive = duration;
        self
    }

    /// Sets the connection-acknowledgment timeout.
    #[must_use]
    pub fn with_connection_timeout(mut self, duration: Duration) -> Self {
        self.connection_timeout = duration;
        self
    }

    /// Sets the delay between reconnect attempts.
    #[must_use]
    pub fn with_reconnect_delay(mut self, duration: Duration) -> Self {
        self.reconnect_delay = duration;
        self
    }

    /// Sets the client identifier strategy.
    #[must_use]
    pub fn with_client_id(mut self, strategy: ClientIdStrategy) -> Self {
        self.client_id = strategy;
        self
    }

    /// Sets the topic set.
    #[must_use]
    pub fn with_topics(mut self, topics: Topics) -> Self {
        self.topics = topics;
        self
    }
}
