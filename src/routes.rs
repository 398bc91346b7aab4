// src/routes.rs

use axum::{
    Router,
    http::{Method, header},
    routing::get,
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    docs,
    handlers::{root, texts},
    state::AppState,
};

/// Assembles the main application router.
///
/// * Mounts the text API at `{prefix}`, `{prefix}/latest` and `{prefix}/v1`.
/// * Serves Swagger UI at `{prefix}/docs` and static files at `{prefix}/static`.
/// * Applies global middleware (Trace, CORS).
pub fn create_router(state: AppState) -> Router {
    let prefix = state.config.api_prefix.clone();

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    let text_routes = Router::new()
        .route("/", get(root::api_root))
        .route("/texts", get(texts::list_texts).post(texts::create_text))
        .route("/texts/{id}", get(texts::get_text));

    let swagger = SwaggerUi::new(format!("{prefix}/docs"))
        .url(format!("{prefix}/openapi.json"), docs::openapi(&state.config));

    Router::new()
        .route("/", get(root::root))
        .nest(&format!("{prefix}/latest"), text_routes.clone())
        .nest(&format!("{prefix}/v1"), text_routes.clone())
        .nest(&prefix, text_routes)
        .nest_service(
            &format!("{prefix}/static"),
            ServeDir::new(&state.config.static_dir),
        )
        .merge(swagger)
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
