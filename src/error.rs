// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the garage relay.
//!
//! Failures fall into three groups: transport session failures (connect,
//! subscribe, publish), inbound payload decoding failures, and user-table
//! parsing failures. None of them are fatal to the relay — the session
//! logs and retries, the dispatch loop logs and drops.

use std::time::Duration;

use thiserror::Error;

/// The main error type for this library.
#[derive(Debug, Error)]
pub enum Error {
    /// Error in the MQTT transport session.
    #[error("session error: {0}")]
    Session(#[from] SessionError),

    /// Error decoding an inbound payload.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Error parsing external data such as the user table.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),
}

/// Errors raised by the MQTT transport session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Establishing the broker connection failed.
    #[error("connect failed: {0}")]
    Connect(String),

    /// The broker did not acknowledge the connection in time.
    #[error("connect timed out after {0:?}")]
    ConnectTimeout(Duration),

    /// Subscribing to a topic failed.
    #[error("subscribe to '{topic}' failed: {source}")]
    Subscribe {
        /// The topic the subscription targeted.
        topic: String,
        /// The underlying client error.
        source: rumqttc::ClientError,
    },

    /// Publishing to a topic failed.
    #[error("publish to '{topic}' failed: {source}")]
    Publish {
        /// The topic the publish targeted.
        topic: String,
        /// The underlying client error.
        source: rumqttc::ClientError,
    },

    /// The broker host is missing or malformed.
    #[error("invalid broker address: {0}")]
    InvalidAddress(String),
}

/// Errors raised while decoding an inbound payload.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The payload bytes are not valid UTF-8.
    #[error("payload is not valid UTF-8: {0}")]
    PayloadNotUtf8(#[from] std::str::Utf8Error),
}

/// Errors raised while parsing external data.
#[derive(Debug, Error)]
pub enum ParseError {
    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;
