// making-mirrors: Bare Mirror Synchronizer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Aggregation and rendering of pass results.

use std::collections::BTreeMap;

use serde::Serialize;

use super::SyncRecord;

/// Counters over the records of one pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub fatal: usize,
    /// Records per outcome label.
    pub by_outcome: BTreeMap<&'static str, usize>,
}

impl SyncReport {
    pub fn record(&mut self, record: &SyncRecord) {
        self.total += 1;
        if record.outcome.is_success() {
            self.succeeded += 1;
        } else {
            self.failed += 1;
        }
        if record.outcome.is_fatal() {
            self.fatal += 1;
        }
        *self.by_outcome.entry(record.outcome.label()).or_default() += 1;
    }

    #[must_use]
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a SyncRecord>) -> Self {
        let mut report = Self::default();
        for record in records {
            report.record(record);
        }
        report
    }

    /// True when some mirror needs manual recovery.
    #[must_use]
    pub const fn has_fatal(&self) -> bool {
        self.fatal > 0
    }

    /// `✓ owner/name: message` or `✗ owner/name: reason`.
    #[must_use]
    pub fn text_line(record: &SyncRecord) -> String {
        let mark = if record.outcome.is_success() { '✓' } else { '✗' };
        format!("{mark} {}: {}", record.repo.slug(), record.outcome)
    }

    #[must_use]
    pub fn summary_line(&self) -> String {
        format!(
            "Completed! Successfully mirrored {}/{} repositories",
            self.succeeded, self.total
        )
    }

    /// One JSON object for one record.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn json_line(record: &SyncRecord) -> serde_json::Result<String> {
        serde_json::to_string(record)
    }

    /// Summary object written after the last record.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn json_summary(&self) -> serde_json::Result<String> {
        serde_json::to_string(&Summary { summary: self })
    }
}

#[derive(Serialize)]
struct Summary<'a> {
    summary: &'a SyncReport,
}
