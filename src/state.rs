use crate::config::Config;
use crate::services::TextService;
use axum::extract::FromRef;

#[derive(Clone)]
pub struct AppState {
    pub texts: TextService,
    pub config: Config,
}

impl FromRef<AppState> for TextService {
    fn from_ref(state: &AppState) -> Self {
        state.texts.clone()
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}
