//! One-second countdown ticker for the active question.
//!
//! At most one ticker task exists at a time. It is keyed by the parts of the
//! active session that decide whether the clock runs; the engine re-arms it
//! whenever the key changes. Every arm bumps the epoch, and a tick carrying an
//! older epoch is discarded by the engine, so a superseded task that is still
//! between its last `.await` and its abort can never mutate state.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use uuid::Uuid;

use crate::models::session::{CandidateSession, SessionStatus, QUESTION_COUNT};

pub const TICK_PERIOD: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountdownKey {
    pub session_id: Uuid,
    pub status: SessionStatus,
    pub question_index: usize,
    pub paused: bool,
    pub busy: bool,
}

impl CountdownKey {
    pub fn of(session: &CandidateSession, busy: bool) -> Self {
        Self {
            session_id: session.id,
            status: session.status,
            question_index: session.interview_progress.current_question_index,
            paused: session.interview_progress.is_paused,
            busy,
        }
    }

    /// Whether a ticker should run for a session in this state.
    pub fn runs(&self) -> bool {
        self.status == SessionStatus::InProgress
            && !self.paused
            && !self.busy
            && self.question_index < QUESTION_COUNT
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Continue,
    Stop,
}

#[derive(Default)]
pub struct Countdown {
    epoch: u64,
    armed: Option<(CountdownKey, JoinHandle<()>)>,
}

impl Countdown {
    pub fn key(&self) -> Option<CountdownKey> {
        self.armed.as_ref().map(|(key, _)| *key)
    }

    pub fn is_current(&self, epoch: u64) -> bool {
        self.armed.is_some() && self.epoch == epoch
    }

    /// Replaces any running ticker with the one `spawn` creates for the new epoch.
    pub fn arm(&mut self, key: CountdownKey, spawn: impl FnOnce(u64) -> JoinHandle<()>) {
        self.disarm();
        self.epoch += 1;
        self.armed = Some((key, spawn(self.epoch)));
    }

    pub fn disarm(&mut self) {
        if let Some((_, handle)) = self.armed.take() {
            handle.abort();
            self.epoch += 1;
        }
    }
}

impl Drop for Countdown {
    fn drop(&mut self) {
        self.disarm();
    }
}

/// Calls `on_tick(epoch)` once per second, first one second from now, until it
/// returns `TickOutcome::Stop`.
pub fn spawn_ticker<F>(epoch: u64, mut on_tick: F) -> JoinHandle<()>
where
    F: FnMut(u64) -> TickOutcome + Send + 'static,
{
    tokio::spawn(async move {
        let mut interval = interval_at(Instant::now() + TICK_PERIOD, TICK_PERIOD);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            if on_tick(epoch) == TickOutcome::Stop {
                break;
            }
        }
    })
}
