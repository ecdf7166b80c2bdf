pub mod countdown;
pub mod dashboard;
pub mod engine;
pub mod handlers;
pub mod machine;

use thiserror::Error;
use uuid::Uuid;

use crate::models::session::SessionStatus;
use crate::store::StoreError;
use machine::TransitionError;

pub use engine::Interviewer;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InterviewError {
    #[error("Please wait, the previous request is still being processed")]
    Busy,

    #[error("Interview is paused")]
    Paused,

    #[error("A resume has already been processed for this session")]
    SessionAlreadyStarted,

    #[error("Input is not accepted while the session is '{status}'")]
    InputNotAccepted { status: SessionStatus },

    #[error("Input cannot be empty")]
    EmptyInput,

    #[error("Session not found: {0}")]
    SessionNotFound(Uuid),

    #[error(transparent)]
    Transition(TransitionError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<TransitionError> for InterviewError {
    fn from(e: TransitionError) -> Self {
        match e {
            TransitionError::Paused => InterviewError::Paused,
            TransitionError::EmptyInput => InterviewError::EmptyInput,
            other => InterviewError::Transition(other),
        }
    }
}
