//! Interview engine. Owns the session store, the busy set, the drafts and
//! the countdown, and runs adapter calls for the effects the state machine
//! requests.
//!
//! Every state change goes through one `std::sync::Mutex` critical section:
//! read the session, run `machine::apply`, replace it in the store, then
//! re-sync the countdown. The lock is never held across an `.await`. Adapter
//! calls run in spawned tasks; callers await the task's `JoinHandle`, so an
//! abandoned HTTP request never cancels a call half-way.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::adapter::ResilientAdapter;
use crate::intake::document::DocumentPayload;
use crate::interview::countdown::{spawn_ticker, Countdown, CountdownKey, TickOutcome};
use crate::interview::dashboard::{list_candidates, CandidateQuery, CandidateSummary};
use crate::interview::machine::{self, Effect, Event};
use crate::interview::InterviewError;
use crate::models::session::{
    AppSnapshot, CandidateSession, Question, SessionStatus, Tab, QUESTION_COUNT,
};
use crate::store::SessionStore;

/// A session together with the engine-side state the UI needs.
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    #[serde(flatten)]
    pub session: CandidateSession,
    pub busy: bool,
    pub draft: String,
}

/// Answer to "continue where you left off?".
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResumeStatus {
    pub session_id: Uuid,
    pub status: SessionStatus,
    pub interrupted: bool,
    pub progress: Option<String>,
}

impl ResumeStatus {
    fn of(session: &CandidateSession) -> Self {
        let progress = match session.status {
            SessionStatus::CollectingInfo => Some("Collecting profile information".to_string()),
            SessionStatus::InProgress => Some(format!(
                "{}/{QUESTION_COUNT} questions completed",
                session.answered_count()
            )),
            _ => None,
        };
        Self {
            session_id: session.id,
            status: session.status,
            interrupted: progress.is_some(),
            progress,
        }
    }
}

/// Adapter work performed outside the lock.
enum Job {
    Extract(DocumentPayload),
    Generate,
    Score {
        index: usize,
        question: Question,
        answer: String,
    },
    Summarize(Vec<Question>),
}

impl Job {
    fn from_effect(effect: Effect) -> Option<Self> {
        match effect {
            Effect::GenerateQuestions => Some(Job::Generate),
            Effect::ScoreAnswer {
                index,
                question,
                answer,
            } => Some(Job::Score {
                index,
                question,
                answer,
            }),
            Effect::Summarize { questions } => Some(Job::Summarize(questions)),
            Effect::ForceSubmit => None,
        }
    }
}

struct Core {
    store: SessionStore,
    busy: HashSet<Uuid>,
    drafts: HashMap<Uuid, String>,
    countdown: Countdown,
}

impl Core {
    /// Applies `event` to session `id` and stores the result wholesale.
    fn transition(&mut self, id: Uuid, event: Event) -> Result<Option<Effect>, InterviewError> {
        let session = self
            .store
            .get(id)
            .ok_or(InterviewError::SessionNotFound(id))?;
        let step = machine::apply(session, event, Utc::now())?;
        self.store.replace(step.session)?;
        Ok(step.effect)
    }

    fn view(&self, id: Uuid) -> Result<SessionView, InterviewError> {
        let session = self
            .store
            .get(id)
            .ok_or(InterviewError::SessionNotFound(id))?;
        Ok(SessionView {
            session: session.clone(),
            busy: self.busy.contains(&id),
            draft: self.drafts.get(&id).cloned().unwrap_or_default(),
        })
    }

    /// Marks the active session busy; fails if it already is.
    fn claim_active(&mut self) -> Result<Uuid, InterviewError> {
        let id = self.store.active().id;
        if !self.busy.insert(id) {
            return Err(InterviewError::Busy);
        }
        Ok(id)
    }

    fn ensure_idle(&self, id: Uuid) -> Result<(), InterviewError> {
        if self.busy.contains(&id) {
            return Err(InterviewError::Busy);
        }
        Ok(())
    }
}

struct Inner {
    core: Mutex<Core>,
    adapter: ResilientAdapter,
}

#[derive(Clone)]
pub struct Interviewer {
    inner: Arc<Inner>,
}

impl Interviewer {
    /// The countdown is not armed here; after a restart it starts again on
    /// `resume` or on the next command that touches the active session.
    pub fn new(store: SessionStore, adapter: ResilientAdapter) -> Self {
        Self {
            inner: Arc::new(Inner {
                core: Mutex::new(Core {
                    store,
                    busy: HashSet::new(),
                    drafts: HashMap::new(),
                    countdown: Countdown::default(),
                }),
                adapter,
            }),
        }
    }

    pub fn snapshot(&self) -> AppSnapshot {
        self.inner.lock().store.snapshot().clone()
    }

    pub fn active_session(&self) -> SessionView {
        let core = self.inner.lock();
        let id = core.store.active().id;
        SessionView {
            session: core.store.active().clone(),
            busy: core.busy.contains(&id),
            draft: core.drafts.get(&id).cloned().unwrap_or_default(),
        }
    }

    pub fn session(&self, id: Uuid) -> Result<SessionView, InterviewError> {
        self.inner.lock().view(id)
    }

    pub fn candidates(&self, query: &CandidateQuery) -> Vec<CandidateSummary> {
        list_candidates(self.inner.lock().store.sessions(), query)
    }

    /// Processes a resume for the active session, which must still be waiting
    /// for one. Resolves once extraction, and question generation when the
    /// profile is complete, have been applied.
    pub async fn upload_resume(&self, document: DocumentPayload) -> Result<SessionView, InterviewError> {
        let id = self.inner.with_core(|core| {
            let session = core.store.active();
            if session.status != SessionStatus::PendingResume {
                return Err(InterviewError::SessionAlreadyStarted);
            }
            core.claim_active()
        })?;

        info!(
            "Processing resume '{}' ({}) for session {id}",
            document.file_name, document.media_type
        );
        self.inner.run(id, Job::Extract(document)).await;
        self.session(id)
    }

    /// Free text from the candidate: a profile field while collecting info,
    /// an answer while the interview runs. A blank answer falls back to the
    /// stored draft.
    pub async fn submit_input(&self, text: &str) -> Result<SessionView, InterviewError> {
        let (id, job) = self.inner.with_core(|core| {
            let (id, status) = {
                let session = core.store.active();
                (session.id, session.status)
            };
            core.ensure_idle(id)?;

            let event = match status {
                SessionStatus::CollectingInfo => Event::InfoSubmitted {
                    text: text.to_string(),
                },
                SessionStatus::InProgress => {
                    let answer = if text.trim().is_empty() {
                        core.drafts.get(&id).cloned().unwrap_or_default()
                    } else {
                        text.to_string()
                    };
                    Event::AnswerSubmitted {
                        answer,
                        timed_out: false,
                    }
                }
                status => return Err(InterviewError::InputNotAccepted { status }),
            };
            let answering = matches!(event, Event::AnswerSubmitted { .. });

            let job = core.transition(id, event)?.and_then(Job::from_effect);
            if answering {
                core.drafts.remove(&id);
            }
            if job.is_some() {
                core.busy.insert(id);
            }
            Ok((id, job))
        })?;

        if let Some(job) = job {
            self.inner.run(id, job).await;
        }
        self.session(id)
    }

    /// Stores the in-progress answer; it is submitted verbatim on timeout.
    pub fn update_draft(&self, text: &str) -> Result<(), InterviewError> {
        let mut core = self.inner.lock();
        let (id, status) = {
            let session = core.store.active();
            (session.id, session.status)
        };
        if status != SessionStatus::InProgress {
            return Err(InterviewError::InputNotAccepted { status });
        }
        core.drafts.insert(id, text.to_string());
        Ok(())
    }

    pub fn toggle_pause(&self) -> Result<SessionView, InterviewError> {
        self.inner.with_core(|core| {
            let (id, status) = {
                let session = core.store.active();
                (session.id, session.status)
            };
            if status != SessionStatus::InProgress {
                return Err(InterviewError::InputNotAccepted { status });
            }
            core.ensure_idle(id)?;
            core.transition(id, Event::TogglePause)?;
            core.view(id)
        })
    }

    /// Appends a fresh session and makes it active. Older sessions, including
    /// ones with calls still in flight, stay in the list.
    pub fn start_new_session(&self) -> SessionView {
        self.inner.with_core(|core| {
            let id = core.store.start_new().id;
            core.store.set_active_tab(Tab::Interviewee);
            info!("Started new session {id}");
            SessionView {
                session: core.store.active().clone(),
                busy: false,
                draft: String::new(),
            }
        })
    }

    /// Reports whether the active session was interrupted, re-arms the
    /// countdown, and restarts adapter work a restart left pending.
    pub fn resume(&self) -> ResumeStatus {
        let (status, pending) = self.inner.with_core(|core| {
            core.store.set_active_tab(Tab::Interviewee);
            let session = core.store.active();
            let id = session.id;
            let status = ResumeStatus::of(session);

            let pending = if core.busy.contains(&id) {
                None
            } else {
                machine::pending_work(session).and_then(Job::from_effect)
            };
            if pending.is_some() {
                core.busy.insert(id);
            }
            (status, pending.map(|job| (id, job)))
        });

        if let Some((id, job)) = pending {
            info!("Restarting pending work for session {id}");
            drop(self.inner.spawn_work(id, job));
        }
        status
    }

    pub fn set_active_tab(&self, tab: Tab) {
        self.inner.lock().store.set_active_tab(tab);
    }

    /// Resolves once every state change so far has reached the blob store.
    pub async fn flush(&self) {
        let done = self.inner.lock().store.flush_handle();
        let _ = done.await;
    }
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, Core> {
        self.core.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Runs `f` under the lock, then re-syncs the countdown.
    fn with_core<R>(self: &Arc<Self>, f: impl FnOnce(&mut Core) -> R) -> R {
        let mut core = self.lock();
        let out = f(&mut core);
        self.sync_countdown(&mut core);
        out
    }

    /// Arms, re-arms or disarms the ticker to match the active session.
    fn sync_countdown(self: &Arc<Self>, core: &mut Core) {
        let active = core.store.active();
        let key = CountdownKey::of(active, core.busy.contains(&active.id));
        if !key.runs() || active.interview_progress.current_timer_seconds == 0 {
            core.countdown.disarm();
            return;
        }
        if core.countdown.key() == Some(key) {
            return;
        }

        let weak = Arc::downgrade(self);
        core.countdown.arm(key, |epoch| {
            spawn_ticker(epoch, move |epoch| match weak.upgrade() {
                Some(inner) => inner.on_tick(epoch),
                None => TickOutcome::Stop,
            })
        });
        debug!(
            "Countdown armed for session {} question {}",
            key.session_id,
            key.question_index + 1
        );
    }

    /// One countdown second. Reaching zero submits the draft in the same
    /// critical section as the decrement.
    fn on_tick(self: &Arc<Self>, epoch: u64) -> TickOutcome {
        let mut core = self.lock();
        if !core.countdown.is_current(epoch) {
            debug!("Ignoring tick from superseded countdown (epoch {epoch})");
            return TickOutcome::Stop;
        }
        let id = core.store.active().id;

        match core.transition(id, Event::Tick) {
            Ok(None) => TickOutcome::Continue,
            Ok(Some(Effect::ForceSubmit)) => {
                let draft = core.drafts.remove(&id).unwrap_or_default();
                let submitted = core.transition(
                    id,
                    Event::AnswerSubmitted {
                        answer: draft,
                        timed_out: true,
                    },
                );
                let job = match submitted {
                    Ok(effect) => effect.and_then(Job::from_effect),
                    Err(e) => {
                        warn!("Timeout submission rejected for session {id}: {e}");
                        None
                    }
                };
                if job.is_some() {
                    core.busy.insert(id);
                }
                self.sync_countdown(&mut core);
                drop(core);

                if let Some(job) = job {
                    info!("Time expired for session {id}, submitting draft");
                    drop(self.spawn_work(id, job));
                }
                TickOutcome::Stop
            }
            Ok(Some(effect)) => {
                error!("Unexpected effect from tick: {effect:?}");
                TickOutcome::Stop
            }
            Err(e) => {
                debug!("Tick rejected for session {id}: {e}");
                core.countdown.disarm();
                TickOutcome::Stop
            }
        }
    }

    /// Spawns `job` and everything it leads to, and waits for the chain.
    async fn run(self: &Arc<Self>, id: Uuid, job: Job) {
        if let Err(e) = self.spawn_work(id, job).await {
            error!("Supervisor task for session {id} failed: {e}");
        }
    }

    /// The work runs in its own task; a supervisor releases the busy flag if
    /// that task dies.
    fn spawn_work(self: &Arc<Self>, id: Uuid, job: Job) -> JoinHandle<()> {
        let inner = Arc::clone(self);
        tokio::spawn(async move {
            let worker = tokio::spawn(Arc::clone(&inner).drive(id, job));
            if let Err(e) = worker.await {
                error!("Adapter work for session {id} failed: {e}");
                inner.recover(id);
            }
        })
    }

    async fn drive(self: Arc<Self>, id: Uuid, mut job: Job) {
        loop {
            let event = self.perform(job).await;
            match self.complete(id, event) {
                Some(next) => job = next,
                None => return,
            }
        }
    }

    async fn perform(&self, job: Job) -> Event {
        match job {
            Job::Extract(document) => {
                let profile = self.adapter.extract_profile(&document).await;
                Event::ResumeProcessed {
                    file_name: document.file_name,
                    profile,
                }
            }
            Job::Generate => Event::QuestionsReady {
                questions: self.adapter.generate_question_set().await,
            },
            Job::Score {
                index,
                question,
                answer,
            } => {
                let score = self.adapter.score_answer(&question, &answer).await;
                Event::AnswerScored {
                    index,
                    answer,
                    score,
                }
            }
            Job::Summarize(questions) => Event::Summarized {
                summary: self.adapter.summarize(&questions).await,
            },
        }
    }

    /// Applies an adapter result and returns the follow-up job, if any. The
    /// session stays busy until the chain ends.
    fn complete(self: &Arc<Self>, id: Uuid, event: Event) -> Option<Job> {
        let mut core = self.lock();
        let generated = matches!(event, Event::QuestionsReady { .. });
        let summarized = matches!(event, Event::Summarized { .. });

        let next = match core.transition(id, event) {
            Ok(effect) => {
                if summarized {
                    info!("Interview for session {id} completed");
                }
                effect.and_then(Job::from_effect)
            }
            Err(e) if generated => {
                warn!("Question set rejected for session {id}: {e}");
                if let Err(e) = core.transition(id, Event::GenerationFailed) {
                    error!("Failed to abandon interview start for session {id}: {e}");
                }
                None
            }
            Err(e) => {
                warn!("Discarding adapter result for session {id}: {e}");
                None
            }
        };

        if next.is_none() {
            core.busy.remove(&id);
        }
        self.sync_countdown(&mut core);
        next
    }

    fn recover(self: &Arc<Self>, id: Uuid) {
        self.with_core(|core| {
            core.busy.remove(&id);
            let starting = core
                .store
                .get(id)
                .is_some_and(|s| s.status == SessionStatus::StartingInterview);
            if starting {
                if let Err(e) = core.transition(id, Event::GenerationFailed) {
                    error!("Failed to abandon interview start for session {id}: {e}");
                }
            }
        });
    }
}
