// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Credential-token lookup.
//!
//! The relay resolves badge tokens to display identities through the
//! [`UserDirectory`] trait. The directory is an external collaborator:
//! the relay only ever calls [`UserDirectory::lookup`]. A static
//! in-memory table is provided as the default implementation.
//!
//! Records whose first and last name are both the `"none"` sentinel are
//! anonymous placeholders; the decoder treats a match on such a record
//! the same as no match at all.

use serde::{Deserialize, Serialize};

use crate::error::ParseError;

/// Sentinel name marking an anonymous directory record.
const ANONYMOUS_NAME: &str = "none";

/// A single entry in the user directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    /// The credential token (RFID tag identifier) this record matches.
    pub token: String,
    /// First name of the badge holder.
    pub first_name: String,
    /// Last name of the badge holder.
    pub last_name: String,
}

impl UserRecord {
    /// Creates a new record.
    #[must_use]
    pub fn new(
        token: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
    ) -> Self {
        Self {
            token: token.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
        }
    }

    /// Returns `true` if both names are the anonymous sentinel.
    #[must_use]
    pub fn is_anonymous(&self) -> bool {
        self.first_name == ANONYMOUS_NAME && self.last_name == ANONYMOUS_NAME
    }
}

/// Maps credential tokens to display identities.
pub trait UserDirectory: Send + Sync {
    /// Looks up a token, returning the matching record if any.
    fn lookup(&self, token: &str) -> Option<UserRecord>;
}

/// An in-memory user directory backed by a fixed record list.
///
/// # Examples
///
/// ```
/// use garaza_relay::directory::{StaticUserDirectory, UserDirectory, UserRecord};
///
/// let directory = StaticUserDirectory::from_records(vec![
///     UserRecord::new("4159772003", "Dalila", "Hodzic"),
/// ]);
///
/// assert!(directory.lookup("4159772003").is_some());
/// assert!(directory.lookup("deadbeef").is_none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct StaticUserDirectory {
    records: Vec<UserRecord>,
}

impl StaticUserDirectory {
    /// Creates a directory from a record list.
    #[must_use]
    pub fn from_records(records: Vec<UserRecord>) -> Self {
        Self { records }
    }

    /// Creates a directory from a JSON array of records.
    ///
    /// # Errors
    ///
    /// Returns error if the document is not a valid record array.
    pub fn from_json(json: &str) -> Result<Self, ParseError> {
        let records: Vec<UserRecord> = serde_json::from_str(json)?;
        Ok(Self { records })
    }

    /// Returns the number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if the directory holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl UserDirectory for StaticUserDirectory {
    fn lookup(&self, token: &str) -> Option<UserRecord> {
        self.records.iter().find(|r| r.token == token).cloned()
    }
}
