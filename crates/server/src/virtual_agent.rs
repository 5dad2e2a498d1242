use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use cardline_agent::actions::{capabilities, Capabilities};
use cardline_agent::auth::{authenticate, AuthResult};
use cardline_agent::{ChatInput, ChatReply};
use cardline_core::domain::conversation::ChatTurn;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::bootstrap::AppState;
use crate::error::{correlation_id, ApiError};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/virtual-agent/capabilities", get(get_capabilities))
        .route("/api/virtual-agent/authenticate", post(authenticate_user))
        .route("/api/virtual-agent/chat", post(chat))
        .route("/api/virtual-agent/card", get(card_state))
}

#[derive(Clone, Debug, Deserialize)]
pub struct AuthenticationRequest {
    pub code: String,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub conversation_history: Vec<ChatTurn>,
    #[serde(default)]
    pub authenticated: bool,
}

impl From<ChatRequest> for ChatInput {
    fn from(request: ChatRequest) -> Self {
        Self {
            message: request.message,
            conversation_history: request.conversation_history,
            authenticated: request.authenticated,
            ..ChatInput::default()
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CardView {
    pub card_id: String,
    pub last_four: String,
    pub status: String,
    pub last_updated: Option<DateTime<Utc>>,
}

pub async fn get_capabilities() -> Json<Capabilities> {
    Json(capabilities())
}

pub async fn authenticate_user(Json(body): Json<AuthenticationRequest>) -> Json<AuthResult> {
    Json(authenticate(&body.code))
}

pub async fn chat(
    State(state): State<AppState>,
    Json(body): Json<ChatRequest>,
) -> Result<Json<ChatReply>, ApiError> {
    let correlation_id = correlation_id();
    let input = ChatInput::from(body);
    state
        .agent
        .process_chat(&input, &correlation_id)
        .await
        .map(Json)
        .map_err(|error| ApiError::new(error, &correlation_id))
}

pub async fn card_state(State(state): State<AppState>) -> Result<Json<CardView>, ApiError> {
    let correlation_id = correlation_id();
    let account =
        state.agent.account().snapshot().map_err(|error| ApiError::new(error.into(), &correlation_id))?;
    let card = account.card();

    Ok(Json(CardView {
        card_id: card.id().0.clone(),
        last_four: card.last_four().to_string(),
        status: card.status().to_string(),
        last_updated: card.last_updated(),
    }))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::extract::State;
    use axum::http::{header, Method, Request, StatusCode};
    use axum::Json;
    use cardline_agent::llm::{ScriptedCompletionClient, UnconfiguredCompletionClient};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::{authenticate_user, card_state, get_capabilities, AuthenticationRequest};
    use crate::bootstrap::test_support::{app_with, state_with};

    async fn post_json(app: &axum::Router, uri: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request");
        let response = app.clone().oneshot(request).await.expect("response");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    async fn get_json(app: &axum::Router, uri: &str) -> Value {
        let request = Request::builder().uri(uri).body(Body::empty()).expect("request");
        let response = app.clone().oneshot(request).await.expect("response");
        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        serde_json::from_slice(&bytes).expect("json")
    }

    #[tokio::test]
    async fn capabilities_include_greeting() {
        let Json(payload) = get_capabilities().await;
        assert_eq!(payload.capabilities.len(), 5);
        assert!(payload.greeting.contains("Tracy"));
    }

    #[tokio::test]
    async fn authentication_is_stateless() {
        let Json(failed) =
            authenticate_user(Json(AuthenticationRequest { code: "123".to_string() })).await;
        let Json(again) =
            authenticate_user(Json(AuthenticationRequest { code: "456".to_string() })).await;
        assert_eq!(failed.attempts_remaining, Some(2));
        assert_eq!(again.attempts_remaining, Some(2));

        let Json(verified) =
            authenticate_user(Json(AuthenticationRequest { code: "999".to_string() })).await;
        assert!(verified.verified);
    }

    #[tokio::test]
    async fn card_starts_active_without_timestamp() {
        let Json(card) = card_state(State(state_with(Arc::new(UnconfiguredCompletionClient))))
            .await
            .expect("card");
        assert_eq!(card.card_id, "card_1115");
        assert_eq!(card.status, "active");
        assert!(card.last_updated.is_none());
    }

    #[tokio::test]
    async fn chat_freeze_updates_card_endpoint() {
        let app = app_with(Arc::new(ScriptedCompletionClient::constant(
            "Your card ending in 1115 is now frozen.",
        )));

        let (status, reply) = post_json(
            &app,
            "/api/virtual-agent/chat",
            json!({"message": "Please freeze my card", "conversation_history": [], "authenticated": true}),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(reply["intent"], "freeze_card");
        assert_eq!(reply["sentiment"], "neutral");
        assert_eq!(reply["transfer_to_agent"], false);
        assert_eq!(reply["suggested_actions"][0], "Freeze card now");

        let card = get_json(&app, "/api/virtual-agent/card").await;
        assert_eq!(card["status"], "frozen");
        assert!(card["last_updated"].is_string());
    }

    #[tokio::test]
    async fn third_off_topic_message_transfers_to_agent() {
        let app = app_with(Arc::new(ScriptedCompletionClient::constant("unused")));
        let history = json!([
            {"role": "user", "content": "what's the weather", "sentiment": "off_topic"},
            {"role": "assistant", "content": "redirect"},
            {"role": "user", "content": "tell me a joke", "sentiment": "off_topic"},
            {"role": "assistant", "content": "redirect"}
        ]);

        let (status, reply) = post_json(
            &app,
            "/api/virtual-agent/chat",
            json!({"message": "what's your favorite movie?", "conversation_history": history}),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(reply["transfer_to_agent"], true);
        assert_eq!(reply["intent"], "transfer");
        assert_eq!(reply["off_topic_count"], 3);
        assert_eq!(reply["suggested_actions"], json!([]));
    }

    #[tokio::test]
    async fn blank_message_is_a_bad_request() {
        let app = app_with(Arc::new(ScriptedCompletionClient::constant("unused")));
        let (status, body) = post_json(&app, "/api/virtual-agent/chat", json!({"message": "  "})).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["detail"], "message is required");
    }

    #[tokio::test]
    async fn completion_timeout_maps_to_gateway_timeout() {
        use std::time::Duration;

        use cardline_agent::llm::TimeoutCompletionClient;

        let slow = ScriptedCompletionClient::constant("late").with_delay(Duration::from_secs(5));
        let app = app_with(Arc::new(TimeoutCompletionClient::new(slow, Duration::from_millis(20))));
        let (status, body) =
            post_json(&app, "/api/virtual-agent/chat", json!({"message": "what's my balance"})).await;

        assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
        assert!(body["correlation_id"].is_string());
    }
}
