use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::debug;

use quiz_core::model::ScoreReport;

use super::service::{Advance, QuizSession, SessionState};
use super::ticker::Ticker;
use super::timer::TimerHandle;
use super::view::SessionView;
use crate::error::LoopClosed;
use crate::scores::{ScoreReporter, report_best_effort};

/// Player input delivered to a running session loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizCommand {
    Begin,
    Select(usize),
    Advance,
    Restart,
}

/// Cloneable front end to a `QuizSessionLoop`.
///
/// Commands are queued and applied in order; the latest view is always
/// available without waiting for the loop.
#[derive(Clone)]
pub struct QuizHandle {
    commands: mpsc::UnboundedSender<QuizCommand>,
    views: watch::Receiver<SessionView>,
}

impl QuizHandle {
    /// # Errors
    ///
    /// Returns `LoopClosed` if the session loop has stopped.
    pub fn begin(&self) -> Result<(), LoopClosed> {
        self.send(QuizCommand::Begin)
    }

    /// # Errors
    ///
    /// Returns `LoopClosed` if the session loop has stopped.
    pub fn select_option(&self, index: usize) -> Result<(), LoopClosed> {
        self.send(QuizCommand::Select(index))
    }

    /// # Errors
    ///
    /// Returns `LoopClosed` if the session loop has stopped.
    pub fn advance(&self) -> Result<(), LoopClosed> {
        self.send(QuizCommand::Advance)
    }

    /// # Errors
    ///
    /// Returns `LoopClosed` if the session loop has stopped.
    pub fn restart(&self) -> Result<(), LoopClosed> {
        self.send(QuizCommand::Restart)
    }

    /// Most recently published view.
    #[must_use]
    pub fn view(&self) -> SessionView {
        self.views.borrow().clone()
    }

    /// Subscribe to view updates.
    #[must_use]
    pub fn views(&self) -> watch::Receiver<SessionView> {
        self.views.clone()
    }

    fn send(&self, command: QuizCommand) -> Result<(), LoopClosed> {
        self.commands.send(command).map_err(|_| LoopClosed)
    }
}

/// Drives a `QuizSession` from player commands and one-second ticks.
///
/// The loop owns the session, so commands and ticks are applied one at a
/// time. It stops once every `QuizHandle` has been dropped.
pub struct QuizSessionLoop {
    session: QuizSession,
    reporters: Vec<Arc<dyn ScoreReporter>>,
    commands: mpsc::UnboundedReceiver<QuizCommand>,
    ticks_tx: mpsc::UnboundedSender<TimerHandle>,
    ticks_rx: mpsc::UnboundedReceiver<TimerHandle>,
    views: watch::Sender<SessionView>,
    ticker: Option<Ticker>,
    tick_period: Duration,
}

impl QuizSessionLoop {
    #[must_use]
    pub fn new(session: QuizSession) -> (Self, QuizHandle) {
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        let (ticks_tx, ticks_rx) = mpsc::unbounded_channel();
        let (views_tx, views_rx) = watch::channel(session.view());

        let this = Self {
            session,
            reporters: Vec::new(),
            commands: commands_rx,
            ticks_tx,
            ticks_rx,
            views: views_tx,
            ticker: None,
            tick_period: Duration::from_secs(1),
        };
        let handle = QuizHandle {
            commands: commands_tx,
            views: views_rx,
        };
        (this, handle)
    }

    /// Add a destination for finished scores. Each reporter runs independently.
    #[must_use]
    pub fn with_reporter(mut self, reporter: Arc<dyn ScoreReporter>) -> Self {
        self.reporters.push(reporter);
        self
    }

    /// Time between countdown ticks; one second unless overridden.
    #[must_use]
    pub fn with_tick_period(mut self, period: Duration) -> Self {
        self.tick_period = period;
        self
    }

    /// Run the loop on a new tokio task.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    pub async fn run(mut self) {
        loop {
            tokio::select! {
                command = self.commands.recv() => {
                    let Some(command) = command else {
                        break;
                    };
                    self.on_command(command);
                }
                Some(handle) = self.ticks_rx.recv() => {
                    self.session.tick(handle);
                    self.sync_ticker();
                    self.publish();
                }
            }
        }
        self.ticker = None;
        debug!("quiz session loop stopped");
    }

    fn on_command(&mut self, command: QuizCommand) {
        let finished = match command {
            QuizCommand::Begin => {
                self.session.begin();
                None
            }
            QuizCommand::Select(index) => {
                self.session.select_option(index);
                None
            }
            QuizCommand::Advance => match self.session.advance() {
                Some(Advance::Finished(report)) => Some(report),
                _ => None,
            },
            QuizCommand::Restart => {
                self.session.restart();
                None
            }
        };

        self.sync_ticker();
        self.publish();
        if let Some(report) = finished {
            self.report(report);
        }
    }

    /// Keep exactly one ticker running for the active countdown.
    fn sync_ticker(&mut self) {
        match self.session.active_timer() {
            Some(active) if self.ticker.as_ref().is_some_and(|t| t.handle() == active) => {}
            Some(active) => {
                self.ticker = Some(Ticker::spawn(active, self.tick_period, self.ticks_tx.clone()));
            }
            None => self.ticker = None,
        }
    }

    fn publish(&self) {
        let next = self.session.view();
        self.views.send_if_modified(|current| {
            if *current == next {
                return false;
            }
            *current = next;
            true
        });
    }

    fn report(&self, report: ScoreReport) {
        let Some(session_id) = self.session.state().map(SessionState::id) else {
            return;
        };
        for reporter in &self.reporters {
            let reporter = Arc::clone(reporter);
            tokio::spawn(async move {
                report_best_effort(reporter.as_ref(), report, session_id).await;
            });
        }
    }
}
