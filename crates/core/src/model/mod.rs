mod bank;
mod ids;
mod question;
mod score;
mod settings;

pub use bank::{BankError, QuestionBank};
pub use ids::{ScoreId, SessionId};
pub use question::{OPTION_COUNT, OptionIndex, OptionMark, Outcome, Question, QuestionError};
pub use score::{ScoreError, ScoreRecord, ScoreReport};
pub use settings::{DEFAULT_QUESTION_SECS, QuizSettings, QuizSettingsError};
