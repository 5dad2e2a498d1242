use axum::{routing::get, Json, Router};
use chrono::{Local, Utc};
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RootResponse {
    pub message: &'static str,
    pub status: &'static str,
    pub datetime: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HeartbeatResponse {
    pub status: &'static str,
    pub timestamp: String,
    pub message: &'static str,
}

pub fn router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new().route("/", get(root)).route("/api/heartbeat", get(heartbeat))
}

pub async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        message: "Cardline card services API",
        status: "running",
        datetime: Utc::now().to_rfc3339(),
    })
}

pub async fn heartbeat() -> Json<HeartbeatResponse> {
    Json(HeartbeatResponse {
        status: "running",
        timestamp: Local::now().to_rfc3339(),
        message: "Cardline card services API is operational",
    })
}
