use quiz_core::model::{OptionIndex, OptionMark, Outcome, Question, SessionId};

use super::service::SessionState;

/// Everything a renderer needs to draw the quiz at one point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionView {
    NotStarted { total: usize },
    InProgress(QuestionView),
    Finished(FinishedView),
}

impl SessionView {
    #[must_use]
    pub fn is_finished(&self) -> bool {
        matches!(self, SessionView::Finished(_))
    }

    #[must_use]
    pub fn question(&self) -> Option<&QuestionView> {
        match self {
            SessionView::InProgress(view) => Some(view),
            _ => None,
        }
    }
}

/// One option button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionView {
    pub index: OptionIndex,
    pub letter: char,
    pub label: String,
    pub mark: OptionMark,
}

/// The active question, before or after resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionView {
    pub session_id: SessionId,
    /// 1-based position in the session.
    pub number: usize,
    pub total: usize,
    pub text: String,
    pub options: Vec<OptionView>,
    pub remaining_secs: u32,
    pub locked: bool,
    pub selected: Option<OptionIndex>,
    pub outcome: Option<Outcome>,
    pub score: u32,
}

impl QuestionView {
    pub(crate) fn from_state(state: &SessionState, question: &Question) -> Self {
        let outcome = state.outcome();
        let marks = if state.locked() {
            question.marks(state.selected_index())
        } else {
            Default::default()
        };
        let options = OptionIndex::all()
            .map(|index| OptionView {
                index,
                letter: index.letter(),
                label: question.option(index).to_owned(),
                mark: marks[index.value()],
            })
            .collect();

        Self {
            session_id: state.id(),
            number: state.current_index() + 1,
            total: state.total(),
            text: question.text().to_owned(),
            options,
            remaining_secs: state.time_remaining(),
            locked: state.locked(),
            selected: state.selected_index(),
            outcome,
            score: state.score(),
        }
    }

    /// Progress label, e.g. `Q3/10`.
    #[must_use]
    pub fn label(&self) -> String {
        format!("Q{}/{}", self.number, self.total)
    }

    #[must_use]
    pub fn status(&self) -> Option<&'static str> {
        self.outcome.map(Outcome::message)
    }

    /// The next button is enabled only once the question is resolved.
    #[must_use]
    pub fn can_advance(&self) -> bool {
        self.locked
    }
}

/// Final result screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FinishedView {
    pub score: u32,
    pub total: usize,
}

impl FinishedView {
    #[must_use]
    pub fn message(&self) -> String {
        format!("Your Score: {} / {}", self.score, self.total)
    }
}
