mod history;
mod http;
mod reporter;

pub use history::{ScoreHistoryItem, ScoreHistoryService, ScoreHistorySummary};
pub use http::{HttpScoreReporter, RemoteScore, ScoreApiConfig};
pub use reporter::{RepositoryScoreReporter, ScoreReporter, report_best_effort};
