//! Repair drift between the broadcast store and the primary store.
//!
//! [`MirrorReconciler`] reads every poll and vote row back from the
//! broadcast store and upserts them into the primary store, polls before
//! votes. Rows the primary store rejects are logged and skipped; losing the
//! connection aborts the run.

use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::Error;
use crate::domain::ports::{MirrorSource, PollRepository, PollRepositoryError};

/// Row counts from one reconciliation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub polls: usize,
    pub votes: usize,
    pub skipped: usize,
}

/// Copies broadcast store rows into the primary store.
#[derive(Clone)]
pub struct MirrorReconciler {
    source: Arc<dyn MirrorSource>,
    polls: Arc<dyn PollRepository>,
}

enum RowOutcome {
    Applied,
    Skipped,
}

fn classify(
    table: &'static str,
    id: &dyn std::fmt::Display,
    result: Result<(), PollRepositoryError>,
) -> Result<RowOutcome, Error> {
    match result {
        Ok(()) => Ok(RowOutcome::Applied),
        Err(PollRepositoryError::Connection { message }) => Err(Error::service_unavailable(
            format!("poll repository unavailable: {message}"),
        )),
        Err(error) => {
            warn!(table, id = %id, error = %error, "skipping mirrored row");
            Ok(RowOutcome::Skipped)
        }
    }
}

impl MirrorReconciler {
    pub fn new(source: Arc<dyn MirrorSource>, polls: Arc<dyn PollRepository>) -> Self {
        Self { source, polls }
    }

    /// Upsert every mirrored poll, then every mirrored vote.
    ///
    /// # Errors
    ///
    /// Returns `service_unavailable` when the broadcast store cannot be read
    /// or the primary store connection fails.
    pub async fn reconcile(&self) -> Result<ReconcileReport, Error> {
        let snapshot = self.source.fetch_snapshot().await.map_err(|err| {
            Error::service_unavailable(format!("broadcast store unavailable: {err}"))
        })?;

        let mut report = ReconcileReport::default();
        for poll in &snapshot.polls {
            let result = self.polls.upsert_poll(poll).await;
            match classify("Poll", &poll.id(), result)? {
                RowOutcome::Applied => report.polls += 1,
                RowOutcome::Skipped => report.skipped += 1,
            }
        }
        for vote in &snapshot.votes {
            let result = self.polls.upsert_vote(vote).await;
            match classify("Vote", &vote.id, result)? {
                RowOutcome::Applied => report.votes += 1,
                RowOutcome::Skipped => report.skipped += 1,
            }
        }

        info!(
            polls = report.polls,
            votes = report.votes,
            skipped = report.skipped,
            "reconciled primary store from broadcast store"
        );
        Ok(report)
    }
}
