// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Outbound commands.
//!
//! A [`Command`] is a one-shot instruction: a topic and a UTF-8 message.
//! The [`CommandPublisher`] sends commands fire-and-forget — `send`
//! returns before the network round trip, and publish failures are
//! logged, never surfaced to the caller. UI buttons need exactly this:
//! pressing "open" must not block on broker latency.

use std::sync::Arc;

use crate::error::SessionError;
use crate::topics;

/// A one-shot outbound instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    /// Target topic.
    pub topic: String,
    /// UTF-8 message payload.
    pub message: String,
}

impl Command {
    /// Creates a command for an arbitrary topic.
    #[must_use]
    pub fn new(topic: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            message: message.into(),
        }
    }

    /// The open-door command.
    #[must_use]
    pub fn open_door() -> Self {
        Self::new(topics::DOOR_COMMAND, "open")
    }

    /// The close-door command.
    #[must_use]
    pub fn close_door() -> Self {
        Self::new(topics::DOOR_COMMAND, "close")
    }

    /// The silence-alarm command.
    #[must_use]
    pub fn alarm_off() -> Self {
        Self::new(topics::ALARM_OFF, "alarm_off")
    }
}

/// The publish seam between the command publisher and the transport.
///
/// [`crate::MqttSession`] is the production implementation; tests
/// substitute doubles to observe timing and failure behavior.
pub trait CommandTransport: Send + Sync {
    /// Publishes a message to a topic with at-least-once delivery.
    fn publish(
        &self,
        topic: &str,
        message: &str,
    ) -> impl Future<Output = Result<(), SessionError>> + Send;
}

/// Fire-and-forget command sender.
///
/// `send` hands the publish to a background task and returns
/// immediately. There is no queuing or ordering guarantee between
/// consecutive sends beyond what the transport preserves, and no
/// failure surface: a command that cannot be delivered is logged and
/// dropped.
#[derive(Debug)]
pub struct CommandPublisher<T> {
    transport: Arc<T>,
}

impl<T> Clone for CommandPublisher<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
        }
    }
}

impl<T: CommandTransport + 'static> CommandPublisher<T> {
    /// Creates a publisher over the given transport.
    #[must_use]
    pub fn new(transport: Arc<T>) -> Self {
        Self { transport }
    }

    /// Sends a command without waiting for delivery.
    pub fn send(&self, command: Command) {
        let transport = Arc::clone(&self.transport);
        tokio::spawn(async move {
            tracing::debug!(
                topic = %command.topic,
                message = %command.message,
                "Sending command"
            );
            if let Err(e) = transport.publish(&command.topic, &command.message).await {
                tracing::warn!(
                    topic = %command.topic,
                    error = %e,
                    "Command publish failed, dropping"
                );
            }
        });
    }
}
