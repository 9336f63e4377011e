//! HTTP surface: health check plus the exam start/answer endpoints.

pub mod exam;
pub mod health;

use axum::Router;
use serde::Serialize;
use tower_http::cors::CorsLayer;

use crate::AppState;

/// Standard response envelope for all exam endpoints.
#[derive(Debug, Serialize)]
pub struct ServiceResponse<T: Serialize> {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ServiceResponse<T> {
    pub fn success(message: impl Into<String>, data: T) -> Self {
        Self {
            status: "success",
            message: Some(message.into()),
            data: Some(data),
        }
    }

    pub fn success_empty() -> Self {
        Self {
            status: "success",
            message: None,
            data: None,
        }
    }
}

/// Build the application router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(health::routes())
        .nest("/api/v1", exam::routes())
        .with_state(state)
        .layer(CorsLayer::permissive())
}
