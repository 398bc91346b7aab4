// src/handlers/root.rs

use axum::{
    Json,
    extract::State,
    http::{HeaderMap, header},
};

use crate::{config::Config, models::text::WelcomeResponse};

/// Landing page at `/`, pointing at the API prefix.
pub async fn root(State(config): State<Config>, headers: HeaderMap) -> Json<WelcomeResponse> {
    let base = headers
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .map(|host| format!("http://{host}"))
        .unwrap_or_default();

    Json(WelcomeResponse {
        welcome_text: format!(
            "This is the Wall Of Text API. Check {}{} for more info.",
            base, config.api_prefix
        ),
    })
}

/// Welcome text of the API itself, with the docs location.
#[utoipa::path(
    get,
    path = "/",
    tag = "texts",
    responses((status = 200, description = "Welcome text", body = WelcomeResponse))
)]
pub async fn api_root(State(config): State<Config>) -> Json<WelcomeResponse> {
    Json(WelcomeResponse {
        welcome_text: api_description(&config),
    })
}

pub fn api_description(config: &Config) -> String {
    let main_address = config
        .main_address
        .as_ref()
        .map(|address| format!(" Main address: {address}."))
        .unwrap_or_default();

    format!(
        "This is the Wall Of Text API. You can check the docs at {}/docs.{}",
        config.api_prefix, main_address
    )
}
