use std::sync::Arc;

use axum::response::Response;
use serde::Serialize;

use crate::storage::EventStore;
use crate::utils::response::success;

pub mod events;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn EventStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn EventStore>) -> Self {
        Self { store }
    }
}

#[derive(Serialize)]
struct HealthPayload {
    status: &'static str,
    service: &'static str,
}

pub async fn health_check() -> Response {
    let payload = HealthPayload {
        status: "ok",
        service: "events-api",
    };

    success(payload)
}
