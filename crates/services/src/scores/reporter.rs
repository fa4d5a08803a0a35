use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use quiz_core::model::{ScoreReport, SessionId};
use storage::repository::ScoreRepository;

use crate::Clock;
use crate::error::ReportError;

/// Destination for the final score of a finished session.
#[async_trait]
pub trait ScoreReporter: Send + Sync {
    /// Short name used in log lines.
    fn name(&self) -> &'static str;

    /// Record one finished session.
    ///
    /// # Errors
    ///
    /// Returns `ReportError` when the score could not be recorded.
    async fn report(&self, report: ScoreReport) -> Result<(), ReportError>;
}

/// Hand a score to a reporter, logging and dropping any failure.
pub async fn report_best_effort(
    reporter: &dyn ScoreReporter,
    report: ScoreReport,
    session_id: SessionId,
) {
    match reporter.report(report).await {
        Ok(()) => debug!(
            reporter = reporter.name(),
            %session_id,
            score = report.score(),
            total = report.total(),
            "score reported"
        ),
        Err(ReportError::Disabled) => debug!(
            reporter = reporter.name(),
            %session_id,
            "score reporting disabled; skipping"
        ),
        Err(err) => warn!(
            reporter = reporter.name(),
            %session_id,
            error = %err,
            "failed to report score"
        ),
    }
}

/// Appends finished scores to a local history repository.
#[derive(Clone)]
pub struct RepositoryScoreReporter {
    clock: Clock,
    scores: Arc<dyn ScoreRepository>,
}

impl RepositoryScoreReporter {
    #[must_use]
    pub fn new(clock: Clock, scores: Arc<dyn ScoreRepository>) -> Self {
        Self { clock, scores }
    }
}

#[async_trait]
impl ScoreReporter for RepositoryScoreReporter {
    fn name(&self) -> &'static str {
        "repository"
    }

    async fn report(&self, report: ScoreReport) -> Result<(), ReportError> {
        self.scores.append_score(report, self.clock.now()).await?;
        Ok(())
    }
}
