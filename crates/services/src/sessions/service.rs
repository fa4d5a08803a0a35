use rand::SeedableRng;
use rand::rngs::StdRng;
use std::fmt;
use tracing::{debug, error, info};

use quiz_core::model::{
    OptionIndex, Outcome, Question, QuestionBank, QuizSettings, ScoreReport, SessionId,
};

use super::plan::SessionPlanner;
use super::timer::{Countdown, CountdownTick, TimerHandle};
use super::view::{FinishedView, QuestionView, SessionView};

//
// ─── TRANSITION RESULTS ────────────────────────────────────────────────────────
//

/// Lifecycle of a quiz session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    NotStarted,
    InProgress,
    Finished,
}

/// Outcome of resolving the active question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub question_index: usize,
    pub selected: Option<OptionIndex>,
    pub outcome: Outcome,
    pub score: u32,
}

/// Result of a successful `advance`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// Moved to the next question; its countdown uses this handle.
    Next(TimerHandle),
    /// Past the last question; the report is ready for persistence.
    Finished(ScoreReport),
}

/// Result of delivering a timer tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// The tick belongs to a countdown that is no longer active.
    Stale,
    Remaining(u32),
    TimedOut(Resolution),
}

//
// ─── SESSION STATE ─────────────────────────────────────────────────────────────
//

/// Mutable state of one quiz run, discarded on restart.
#[derive(Debug, Clone)]
pub struct SessionState {
    id: SessionId,
    questions: Vec<Question>,
    current_index: usize,
    score: u32,
    locked: bool,
    selected: Option<OptionIndex>,
    countdown: Countdown,
}

impl SessionState {
    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// The shuffled question order for this run.
    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.questions.len()
    }

    /// Index of the active question; equals `total()` once finished.
    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current_index)
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn locked(&self) -> bool {
        self.locked
    }

    #[must_use]
    pub fn time_remaining(&self) -> u32 {
        self.countdown.remaining()
    }

    /// `None` while unresolved or after a timeout.
    #[must_use]
    pub fn selected_index(&self) -> Option<OptionIndex> {
        self.selected
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.current_index >= self.questions.len()
    }

    /// Outcome of the active question once it is locked.
    #[must_use]
    pub fn outcome(&self) -> Option<Outcome> {
        if !self.locked {
            return None;
        }
        self.current_question().map(|q| q.outcome(self.selected))
    }

    fn total_u32(&self) -> u32 {
        u32::try_from(self.questions.len()).unwrap_or(u32::MAX)
    }

    fn lock(&mut self, selected: Option<OptionIndex>) -> Option<Resolution> {
        let outcome = self.current_question()?.outcome(selected);
        self.locked = true;
        self.selected = selected;
        self.countdown.cancel();
        if outcome.is_correct() {
            self.score += 1;
        }
        Some(Resolution {
            question_index: self.current_index,
            selected,
            outcome,
            score: self.score,
        })
    }

    fn start_question(&mut self, index: usize, handle: TimerHandle, secs: u32) {
        self.current_index = index;
        self.locked = false;
        self.selected = None;
        self.countdown = Countdown::start(handle, secs);
    }
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// Timed multiple-choice quiz controller.
///
/// Owns the source bank and the state of the current run. Every input is a
/// plain method call; calls that are not valid in the current state are
/// ignored and reported as `None`.
pub struct QuizSession {
    bank: QuestionBank,
    settings: QuizSettings,
    rng: StdRng,
    next_timer: u64,
    state: Option<SessionState>,
}

impl QuizSession {
    #[must_use]
    pub fn new(bank: QuestionBank, settings: QuizSettings) -> Self {
        Self::with_rng(bank, settings, StdRng::from_os_rng())
    }

    /// Build a session with a caller-provided RNG, for reproducible shuffles.
    #[must_use]
    pub fn with_rng(bank: QuestionBank, settings: QuizSettings, rng: StdRng) -> Self {
        Self {
            bank,
            settings,
            rng,
            next_timer: 0,
            state: None,
        }
    }

    #[must_use]
    pub fn settings(&self) -> QuizSettings {
        self.settings
    }

    #[must_use]
    pub fn bank(&self) -> &QuestionBank {
        &self.bank
    }

    #[must_use]
    pub fn state(&self) -> Option<&SessionState> {
        self.state.as_ref()
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        match &self.state {
            None => SessionPhase::NotStarted,
            Some(state) if state.is_finished() => SessionPhase::Finished,
            Some(_) => SessionPhase::InProgress,
        }
    }

    /// Handle of the countdown that is currently allowed to tick, if any.
    #[must_use]
    pub fn active_timer(&self) -> Option<TimerHandle> {
        self.state.as_ref().and_then(|s| s.countdown.active())
    }

    /// Start the first run. Ignored unless the session has not started yet.
    pub fn begin(&mut self) -> Option<TimerHandle> {
        if self.state.is_some() {
            debug!("begin ignored: session already started");
            return None;
        }
        Some(self.start_run())
    }

    /// Throw away the current run and start a freshly shuffled one.
    pub fn restart(&mut self) -> TimerHandle {
        if let Some(state) = &self.state {
            debug!(session_id = %state.id, score = state.score, "restarting quiz session");
        }
        self.start_run()
    }

    /// Resolve the active question with the player's choice.
    ///
    /// Ignored when the index is outside `0..4`, the question is already
    /// locked, or no question is active.
    pub fn select_option(&mut self, index: usize) -> Option<Resolution> {
        let Some(selected) = OptionIndex::new(index) else {
            debug!(index, "selection ignored: option index out of range");
            return None;
        };
        let state = self.state.as_mut()?;
        if state.locked || state.is_finished() {
            debug!(session_id = %state.id, index, "selection ignored: question already resolved");
            return None;
        }
        let resolution = state.lock(Some(selected))?;
        debug!(
            session_id = %state.id,
            question = resolution.question_index,
            outcome = ?resolution.outcome,
            "question answered"
        );
        Some(resolution)
    }

    /// Deliver one second of countdown for the given timer.
    pub fn tick(&mut self, handle: TimerHandle) -> Tick {
        let Some(state) = self.state.as_mut() else {
            return Tick::Stale;
        };
        if state.locked {
            return Tick::Stale;
        }
        match state.countdown.tick(handle) {
            CountdownTick::Stale => Tick::Stale,
            CountdownTick::Running(remaining) => Tick::Remaining(remaining),
            CountdownTick::Expired => match state.lock(None) {
                Some(resolution) => {
                    debug!(
                        session_id = %state.id,
                        question = resolution.question_index,
                        "question timed out"
                    );
                    Tick::TimedOut(resolution)
                }
                None => Tick::Stale,
            },
        }
    }

    /// Move past a resolved question. Ignored while the question is unlocked.
    pub fn advance(&mut self) -> Option<Advance> {
        let handle = TimerHandle::new(self.next_timer + 1);
        let secs = self.settings.question_secs();
        let state = self.state.as_mut()?;
        if !state.locked || state.is_finished() {
            debug!(session_id = %state.id, "advance ignored: question not resolved");
            return None;
        }

        let next = state.current_index + 1;
        if next < state.questions.len() {
            self.next_timer += 1;
            state.start_question(next, handle, secs);
            return Some(Advance::Next(handle));
        }

        state.current_index = next;
        state.countdown.cancel();
        let report = match ScoreReport::new(state.score, state.total_u32()) {
            Ok(report) => report,
            Err(err) => {
                error!(session_id = %state.id, error = %err, "finished session has an invalid score");
                return None;
            }
        };
        info!(
            session_id = %state.id,
            score = report.score(),
            total = report.total(),
            "quiz session finished"
        );
        Some(Advance::Finished(report))
    }

    /// Snapshot for the renderer.
    #[must_use]
    pub fn view(&self) -> SessionView {
        let Some(state) = &self.state else {
            return SessionView::NotStarted {
                total: self.bank.len(),
            };
        };
        match state.current_question() {
            Some(question) => SessionView::InProgress(QuestionView::from_state(state, question)),
            None => SessionView::Finished(FinishedView {
                score: state.score,
                total: state.total(),
            }),
        }
    }

    fn start_run(&mut self) -> TimerHandle {
        let plan = SessionPlanner::new(&self.bank)
            .with_shuffle(self.settings.shuffle())
            .build(&mut self.rng);
        self.next_timer += 1;
        let handle = TimerHandle::new(self.next_timer);
        let id = SessionId::generate();
        info!(session_id = %id, total = plan.total(), "quiz session started");

        self.state = Some(SessionState {
            id,
            questions: plan.questions,
            current_index: 0,
            score: 0,
            locked: false,
            selected: None,
            countdown: Countdown::start(handle, self.settings.question_secs()),
        });
        handle
    }
}

impl fmt::Debug for QuizSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizSession")
            .field("bank_len", &self.bank.len())
            .field("settings", &self.settings)
            .field("next_timer", &self.next_timer)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::OptionMark;

    fn single_question_bank() -> QuestionBank {
        QuestionBank::new(vec![
            Question::new("2+2?", ["3", "4", "5", "6"], 1).unwrap(),
        ])
        .unwrap()
    }

    fn ordered(bank: QuestionBank) -> QuizSession {
        let settings = QuizSettings::default().with_shuffle(false);
        QuizSession::with_rng(bank, settings, StdRng::seed_from_u64(11))
    }

    fn correct_index(session: &QuizSession) -> usize {
        session
            .state()
            .and_then(SessionState::current_question)
            .map(|q| q.correct_index().value())
            .unwrap()
    }

    fn run_out_the_clock(session: &mut QuizSession, handle: TimerHandle) -> Tick {
        let mut last = Tick::Stale;
        for _ in 0..session.settings().question_secs() {
            last = session.tick(handle);
        }
        last
    }

    #[test]
    fn single_question_session_finishes_with_full_score() {
        let mut session = ordered(single_question_bank());
        assert_eq!(session.phase(), SessionPhase::NotStarted);

        session.begin().unwrap();
        let resolution = session.select_option(1).unwrap();
        assert_eq!(resolution.outcome, Outcome::Correct);

        let advance = session.advance().unwrap();
        assert_eq!(advance, Advance::Finished(ScoreReport::new(1, 1).unwrap()));
        assert_eq!(session.phase(), SessionPhase::Finished);
        assert_eq!(
            session.view(),
            SessionView::Finished(FinishedView { score: 1, total: 1 })
        );
    }

    #[test]
    fn second_selection_is_ignored() {
        let mut session = ordered(QuestionBank::health_basics());
        session.begin().unwrap();
        let correct = correct_index(&session);
        let wrong = (correct + 1) % 4;

        let first = session.select_option(wrong).unwrap();
        let before = session.state().cloned().unwrap();
        assert!(session.select_option(correct).is_none());

        let after = session.state().unwrap();
        assert_eq!(first.outcome, Outcome::Wrong);
        assert_eq!(after.score(), before.score());
        assert_eq!(after.selected_index(), before.selected_index());
        assert!(after.locked());
    }

    #[test]
    fn timer_expiry_after_selection_changes_nothing() {
        let mut session = ordered(QuestionBank::health_basics());
        let handle = session.begin().unwrap();
        let correct = correct_index(&session);

        session.select_option(correct).unwrap();
        assert!(session.active_timer().is_none());
        assert_eq!(run_out_the_clock(&mut session, handle), Tick::Stale);

        let state = session.state().unwrap();
        assert_eq!(state.score(), 1);
        assert_eq!(state.selected_index().map(OptionIndex::value), Some(correct));
        assert_eq!(state.outcome(), Some(Outcome::Correct));
    }

    #[test]
    fn no_selection_times_out_after_fifteen_ticks() {
        let mut session = ordered(QuestionBank::health_basics());
        let handle = session.begin().unwrap();

        for expected in (1..15).rev() {
            assert_eq!(session.tick(handle), Tick::Remaining(expected));
        }
        let Tick::TimedOut(resolution) = session.tick(handle) else {
            panic!("expected timeout on the fifteenth tick");
        };

        assert_eq!(resolution.outcome, Outcome::Timeout);
        assert_eq!(resolution.selected, None);
        let state = session.state().unwrap();
        assert!(state.locked());
        assert_eq!(state.selected_index(), None);
        assert_eq!(state.time_remaining(), 0);
        assert_eq!(state.score(), 0);
        assert_eq!(session.tick(handle), Tick::Stale);
    }

    #[test]
    fn selection_after_timeout_is_ignored() {
        let mut session = ordered(single_question_bank());
        let handle = session.begin().unwrap();
        run_out_the_clock(&mut session, handle);

        assert!(session.select_option(1).is_none());
        assert_eq!(session.state().unwrap().score(), 0);
    }

    #[test]
    fn out_of_range_selection_is_ignored() {
        let mut session = ordered(single_question_bank());
        session.begin().unwrap();

        assert!(session.select_option(4).is_none());
        assert!(!session.state().unwrap().locked());
        assert!(session.active_timer().is_some());
    }

    #[test]
    fn advance_requires_resolution() {
        let mut session = ordered(QuestionBank::health_basics());
        assert!(session.advance().is_none());

        session.begin().unwrap();
        assert!(session.advance().is_none());
        assert_eq!(session.state().unwrap().current_index(), 0);
    }

    #[test]
    fn stale_tick_from_previous_question_has_no_effect() {
        let mut session = ordered(QuestionBank::health_basics());
        let first = session.begin().unwrap();
        session.select_option(0).unwrap();

        let Some(Advance::Next(second)) = session.advance() else {
            panic!("expected a second question");
        };
        assert_ne!(first, second);

        let before = session.state().cloned().unwrap();
        assert_eq!(run_out_the_clock(&mut session, first), Tick::Stale);
        let after = session.state().unwrap();
        assert_eq!(after.current_index(), 1);
        assert!(!after.locked());
        assert_eq!(after.time_remaining(), before.time_remaining());
        assert_eq!(session.active_timer(), Some(second));
    }

    #[test]
    fn score_stays_within_bounds_and_counts_only_correct() {
        let mut session = ordered(QuestionBank::health_basics());
        let mut handle = session.begin().unwrap();
        let mut expected = 0;

        for i in 0..10 {
            let before = session.state().unwrap().score();
            let resolution = match i % 3 {
                0 => session.select_option(correct_index(&session)).unwrap(),
                1 => session
                    .select_option((correct_index(&session) + 1) % 4)
                    .unwrap(),
                _ => match run_out_the_clock(&mut session, handle) {
                    Tick::TimedOut(resolution) => resolution,
                    other => panic!("unexpected tick {other:?}"),
                },
            };
            if resolution.outcome.is_correct() {
                expected += 1;
                assert_eq!(resolution.score, before + 1);
            } else {
                assert_eq!(resolution.score, before);
            }
            assert!(resolution.score <= 10);

            match session.advance().unwrap() {
                Advance::Next(next) => handle = next,
                Advance::Finished(report) => {
                    assert_eq!(report.score(), expected);
                    assert_eq!(report.total(), 10);
                }
            }
        }
        assert_eq!(session.phase(), SessionPhase::Finished);
    }

    #[test]
    fn restart_resets_and_reshuffles() {
        let bank = QuestionBank::health_basics();
        let mut session =
            QuizSession::with_rng(bank, QuizSettings::default(), StdRng::seed_from_u64(3));
        let mut handle = session.begin().unwrap();
        let first_order = session.state().unwrap().questions().to_vec();
        let first_id = session.state().unwrap().id();

        for i in 0..10 {
            let pick = if i < 7 {
                correct_index(&session)
            } else {
                (correct_index(&session) + 1) % 4
            };
            session.select_option(pick).unwrap();
            if let Some(Advance::Next(next)) = session.advance() {
                handle = next;
            }
        }
        assert_eq!(session.view(), SessionView::Finished(FinishedView { score: 7, total: 10 }));

        let restarted = session.restart();
        assert_ne!(restarted, handle);
        let state = session.state().unwrap();
        assert_eq!(state.score(), 0);
        assert_eq!(state.current_index(), 0);
        assert!(!state.locked());
        assert_ne!(state.id(), first_id);
        assert_eq!(session.phase(), SessionPhase::InProgress);

        // Ten questions: a new seeded shuffle matching the old order is vanishingly unlikely.
        let mut reshuffled = false;
        for _ in 0..5 {
            if session.state().unwrap().questions() != first_order.as_slice() {
                reshuffled = true;
                break;
            }
            session.restart();
        }
        assert!(reshuffled);
    }

    #[test]
    fn restart_mid_question_cancels_old_timer() {
        let mut session = ordered(QuestionBank::health_basics());
        let old = session.begin().unwrap();
        session.tick(old);

        let new = session.restart();
        assert_eq!(session.tick(old), Tick::Stale);
        assert_eq!(session.tick(new), Tick::Remaining(14));
    }

    #[test]
    fn begin_is_ignored_once_started() {
        let mut session = ordered(single_question_bank());
        session.begin().unwrap();
        session.select_option(0).unwrap();

        assert!(session.begin().is_none());
        assert!(session.state().unwrap().locked());
    }

    #[test]
    fn view_marks_options_after_wrong_answer() {
        let mut session = ordered(single_question_bank());
        session.begin().unwrap();

        let SessionView::InProgress(view) = session.view() else {
            panic!("expected question view");
        };
        assert!(view.options.iter().all(|o| o.mark == OptionMark::Neutral));
        assert_eq!(view.remaining_secs, 15);

        session.select_option(3).unwrap();
        let SessionView::InProgress(view) = session.view() else {
            panic!("expected question view");
        };
        let marks: Vec<_> = view.options.iter().map(|o| o.mark).collect();
        assert_eq!(
            marks,
            vec![
                OptionMark::Neutral,
                OptionMark::Correct,
                OptionMark::Neutral,
                OptionMark::Wrong
            ]
        );
        assert_eq!(view.status(), Some("Wrong"));
        assert!(view.can_advance());
    }
}
