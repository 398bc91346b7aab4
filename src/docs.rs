// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::server::Server;

use crate::{
    config::Config,
    error::ErrorBody,
    handlers::{root, texts},
    models::text::{CreateTextRequest, TextResponse, WelcomeResponse},
};

#[derive(OpenApi)]
#[openapi(
    info(title = "Wall Of Text API", version = "1.0.0"),
    paths(
        root::api_root,
        texts::create_text,
        texts::list_texts,
        texts::get_text,
    ),
    components(schemas(CreateTextRequest, TextResponse, WelcomeResponse, ErrorBody)),
    tags((name = "texts", description = "Posting and reading texts and their replies"))
)]
pub struct ApiDoc;

/// OpenAPI document for the routes mounted under `config.api_prefix`.
pub fn openapi(config: &Config) -> utoipa::openapi::OpenApi {
    let mut doc = ApiDoc::openapi();
    doc.info.description = Some(root::api_description(config));
    doc.servers = Some(vec![
        Server::new(config.api_prefix.clone()),
        Server::new(format!("{}/latest", config.api_prefix)),
        Server::new(format!("{}/v1", config.api_prefix)),
    ]);
    doc
}
