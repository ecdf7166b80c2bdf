use crate::config::Config;
use crate::interview::Interviewer;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub interviewer: Interviewer,
    pub config: Config,
}
