//! History sync: a snapshot of recent processing attempts.

use std::sync::Arc;

use shared::protocol::HistoryEntry;
use tracing::{debug, warn};

use crate::{controller::Completion, transport::HistoryService};

/// How many entries the surface shows. The held sequence is never truncated.
pub const HISTORY_PREVIEW_LEN: usize = 5;

pub struct HistorySync {
    service: Arc<dyn HistoryService>,
    entries: Vec<HistoryEntry>,
    mounted: bool,
    refresh_count: u64,
}

impl HistorySync {
    pub fn new(service: Arc<dyn HistoryService>) -> Self {
        Self {
            service,
            entries: Vec::new(),
            mounted: false,
            refresh_count: 0,
        }
    }

    /// The one unconditional refresh at first mount. Later calls do nothing.
    pub async fn mount(&mut self) -> bool {
        if self.mounted {
            return false;
        }
        self.mounted = true;
        self.refresh().await
    }

    /// Refresh triggered by a concluded attempt, whatever its outcome.
    pub async fn on_completion(&mut self, completion: Completion) -> bool {
        debug!(
            attempt = completion.attempt.0,
            outcome = ?completion.outcome,
            "history refresh after completed submission"
        );
        self.refresh().await
    }

    /// Replaces the held entries wholesale. A failed read keeps the previous
    /// entries and is only logged. Returns whether the entries were replaced.
    pub async fn refresh(&mut self) -> bool {
        self.refresh_count += 1;
        match self.service.fetch_history().await {
            Ok(entries) => {
                debug!(entries = entries.len(), "history refreshed");
                self.entries = entries;
                true
            }
            Err(err) => {
                warn!("could not fetch processing history: {err}");
                false
            }
        }
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    /// Newest-first prefix shown to the operator.
    pub fn visible(&self) -> &[HistoryEntry] {
        &self.entries[..self.entries.len().min(HISTORY_PREVIEW_LEN)]
    }

    pub fn refresh_count(&self) -> u64 {
        self.refresh_count
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }
}
