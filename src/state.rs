use crate::{config::Config, services::SubmissionStore};
use axum::extract::FromRef;

#[derive(Clone)]
pub struct AppState {
    pub store: SubmissionStore,
    pub config: Config,
}

impl FromRef<AppState> for SubmissionStore {
    fn from_ref(state: &AppState) -> Self {
        state.store.clone()
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}
