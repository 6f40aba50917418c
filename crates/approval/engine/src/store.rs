//! Concurrent report store.
//!
//! Reports live in a sharded map; writers serialize per report through a
//! dedicated mutex handed out by [`ReportStore::transition_lock`]. There is
//! no store-wide lock, so transitions on different reports never contend.
//! Readers see the last committed record for a report, never a partially
//! applied transition, because writers replace the record in one insert at
//! the end of their critical section.

use approval_types::{Report, ReportId};
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// In-memory report store with per-report write serialization.
#[derive(Default)]
pub struct ReportStore {
    reports: DashMap<ReportId, Report>,
    locks: DashMap<ReportId, Arc<Mutex<()>>>,
}

impl ReportStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a report record.
    pub fn insert(&self, report: Report) {
        self.reports.insert(report.id.clone(), report);
    }

    /// Fetch a copy of a report.
    pub fn get(&self, id: &ReportId) -> Option<Report> {
        self.reports.get(id).map(|r| r.clone())
    }

    /// Snapshot of every report. Order is unspecified; callers sort.
    pub fn all(&self) -> Vec<Report> {
        self.reports.iter().map(|r| r.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.reports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }

    /// The mutex serializing transitions for one report. Callers clone the
    /// handle out and lock it outside any map access.
    pub(crate) fn transition_lock(&self, id: &ReportId) -> Arc<Mutex<()>> {
        self.locks
            .entry(id.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}
