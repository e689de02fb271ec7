use crate::config::settings::AppConfig;
use crate::state::AppState;
use axum::routing::{get, post};
use axum::Router;

pub mod crop;
pub mod download_handler;
pub mod dto;
pub mod error;
pub mod handler;
pub mod model;
pub mod resolver;
pub mod service;

pub fn router(config: &AppConfig) -> Router<AppState> {
    Router::new()
        .route(
            "/submit",
            post(handler::submit).fallback(handler::method_not_allowed),
        )
        .route(&config.download_route(), get(download_handler::download))
}
