mod plan;
mod service;
mod ticker;
mod timer;
mod view;
mod workflow;

// Public API of the session subsystem.
pub use crate::error::LoopClosed;
pub use plan::{SessionPlan, SessionPlanner};
pub use service::{Advance, QuizSession, Resolution, SessionPhase, SessionState, Tick};
pub use timer::TimerHandle;
pub use view::{FinishedView, OptionView, QuestionView, SessionView};
pub use workflow::{QuizCommand, QuizHandle, QuizSessionLoop};
