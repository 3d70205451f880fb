// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! In-memory access history.
//!
//! The log is newest-first, append-only, and unbounded — history lives
//! for the session and is gone on process exit. Reads take a snapshot so
//! concurrent appends never tear a render.

use parking_lot::RwLock;

use crate::event::AccessEvent;

/// Ordered log of access events, newest first.
///
/// Thread-safe: appends from the inbound dispatch path and snapshots
/// from presentation code may run concurrently without caller-side
/// locking.
#[derive(Debug, Default)]
pub struct HistoryLog {
    events: RwLock<Vec<AccessEvent>>,
}

impl HistoryLog {
    /// Creates an empty history log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an event at the front of the log.
    ///
    /// Previously appended events keep their relative order behind the
    /// new head. Nothing is ever reordered, deduplicated, or evicted.
    pub fn append(&self, event: AccessEvent) {
        self.events.write().insert(0, event);
    }

    /// Returns a copy of the current log contents, newest first.
    #[must_use]
    pub fn snapshot(&self) -> Vec<AccessEvent> {
        self.events.read().clone()
    }

    /// Returns the number of recorded events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.read().len()
    }

    /// Returns `true` if no events have been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[test]
    fn new_log_is_empty() {
        let log = HistoryLog::new();
        assert!(log.is_empty());
        assert_eq!(log.len(), 0);
        assert!(log.snapshot().is_empty());
    }

    #[test]
    fn append_inserts_at_front() {
        let log = HistoryLog::new();
        log.append(AccessEvent::pin("first"));
        log.append(AccessEvent::pin("second"));
        log.append(AccessEvent::pin("third"));

        let snapshot = log.snapshot();
        let tokens: Vec<&str> = snapshot
            .iter()
            .map(|e| e.credential_token.as_str())
            .collect();
        assert_eq!(tokens, ["third", "second", "first"]);
    }

    #[test]
    fn snapshot_is_a_copy() {
        let log = HistoryLog::new();
        log.append(AccessEvent::pin("one"));

        let snapshot = log.snapshot();
        log.append(AccessEvent::pin("two"));

        // The earlier snapshot is unaffected by the later append
        assert_eq!(snapshot.len(), 1);
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn duplicate_events_are_kept() {
        let log = HistoryLog::new();
        log.append(AccessEvent::pin("same"));
        log.append(AccessEvent::pin("same"));
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn concurrent_appends_and_snapshots_lose_nothing() {
        const WRITERS: usize = 8;
        const PER_WRITER: usize = 50;

        let log = Arc::new(HistoryLog::new());
        let mut handles = Vec::new();

        for writer in 0..WRITERS {
            let log = Arc::clone(&log);
            handles.push(std::thread::spawn(move || {
                for i in 0..PER_WRITER {
                    log.append(AccessEvent::pin(format!("w{writer}-{i}")));
                    // Interleave reads with writes
                    let _ = log.snapshot();
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        let snapshot = log.snapshot();
        assert_eq!(snapshot.len(), WRITERS * PER_WRITER);

        // Every event arrived exactly once
        let unique: std::collections::HashSet<&str> = snapshot
            .iter()
            .map(|e| e.credential_token.as_str())
            .collect();
        assert_eq!(unique.len(), WRITERS * PER_WRITER);

        // Per-writer relative order is preserved (newest first)
        for writer in 0..WRITERS {
            let prefix = format!("w{writer}-");
            let indices: Vec<usize> = snapshot
                .iter()
                .filter(|e| e.credential_token.starts_with(&prefix))
                .map(|e| e.credential_token[prefix.len()..].parse().unwrap())
                .collect();
            let mut sorted = indices.clone();
            sorted.sort_unstable_by(|a, b| b.cmp(a));
            assert_eq!(indices, sorted);
        }
    }
}
