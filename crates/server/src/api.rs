use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use cardline_agent::analysis::{
    ConnectionCheck, DisputeAnalysis, FraudAnalysis, MerchantNarrative, PromptTest,
    UpgradeRecommendation,
};
use cardline_core::catalog::{
    CustomerProfile, CustomerSummary, DisputeCase, DisputeSummary, FraudScenario, Merchant,
    MerchantSummary,
};
use serde::{Deserialize, Serialize};

use crate::bootstrap::AppState;
use crate::error::{correlation_id, required, ApiError, ErrorBody};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/scenarios", get(list_scenarios))
        .route("/api/analyze-fraud", post(analyze_fraud))
        .route("/api/test-connection", post(test_connection))
        .route("/api/test-prompt", post(test_prompt))
        .route("/api/merchants", get(list_merchants))
        .route("/api/merchants/{merchant_id}", get(get_merchant))
        .route("/api/generate-merchant-narrative", post(generate_merchant_narrative))
        .route("/api/customers", get(list_customers))
        .route("/api/customers/{customer_id}", get(get_customer))
        .route("/api/analyze-customer-upgrade", post(analyze_customer_upgrade))
        .route("/api/disputes", get(list_disputes))
        .route("/api/disputes/{case_id}", get(get_dispute))
        .route("/api/analyze-dispute", post(analyze_dispute))
}

pub async fn not_found() -> (StatusCode, Json<ErrorBody>) {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorBody { detail: "Not Found".to_string(), correlation_id: correlation_id() }),
    )
}

#[derive(Clone, Debug, Serialize)]
pub struct ScenarioList {
    pub scenarios: Vec<FraudScenario>,
    pub total: usize,
}

#[derive(Clone, Debug, Serialize)]
pub struct MerchantList {
    pub merchants: Vec<MerchantSummary>,
}

#[derive(Clone, Debug, Serialize)]
pub struct CustomerList {
    pub customers: Vec<CustomerSummary>,
}

#[derive(Clone, Debug, Serialize)]
pub struct DisputeList {
    pub disputes: Vec<DisputeSummary>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct FraudAnalysisRequest {
    pub scenario_id: i64,
    pub audience: String,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct PromptRequest {
    pub prompt: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct MerchantNarrativeRequest {
    pub merchant_id: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct CustomerUpgradeRequest {
    pub customer_id: Option<String>,
    pub output_mode: Option<String>,
    pub format_mode: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct DisputeAnalysisRequest {
    pub case_id: Option<String>,
}

pub async fn list_scenarios(State(state): State<AppState>) -> Json<ScenarioList> {
    let scenarios = state.analysis.catalog().fraud_scenarios().to_vec();
    Json(ScenarioList { total: scenarios.len(), scenarios })
}

pub async fn analyze_fraud(
    State(state): State<AppState>,
    Json(body): Json<FraudAnalysisRequest>,
) -> Result<Json<FraudAnalysis>, ApiError> {
    let correlation_id = correlation_id();
    state
        .analysis
        .analyze_fraud(body.scenario_id, &body.audience)
        .await
        .map(Json)
        .map_err(|error| ApiError::new(error, &correlation_id))
}

pub async fn test_connection(
    State(state): State<AppState>,
) -> Result<Json<ConnectionCheck>, ApiError> {
    let correlation_id = correlation_id();
    state
        .analysis
        .test_connection()
        .await
        .map(Json)
        .map_err(|error| ApiError::new(error, &correlation_id))
}

pub async fn test_prompt(
    State(state): State<AppState>,
    Json(body): Json<PromptRequest>,
) -> Result<Json<PromptTest>, ApiError> {
    let correlation_id = correlation_id();
    state
        .analysis
        .test_prompt(body.prompt.as_deref())
        .await
        .map(Json)
        .map_err(|error| ApiError::new(error, &correlation_id))
}

pub async fn list_merchants(State(state): State<AppState>) -> Json<MerchantList> {
    Json(MerchantList { merchants: state.analysis.catalog().merchant_summaries() })
}

pub async fn get_merchant(
    State(state): State<AppState>,
    Path(merchant_id): Path<String>,
) -> Result<Json<Merchant>, ApiError> {
    let correlation_id = correlation_id();
    state
        .analysis
        .catalog()
        .merchant(&merchant_id)
        .cloned()
        .map(Json)
        .map_err(|error| ApiError::new(error, &correlation_id))
}

pub async fn generate_merchant_narrative(
    State(state): State<AppState>,
    Json(body): Json<MerchantNarrativeRequest>,
) -> Result<Json<MerchantNarrative>, ApiError> {
    let correlation_id = correlation_id();
    let merchant_id = required(body.merchant_id.as_deref(), "merchant_id")
        .map_err(|error| ApiError::new(error, &correlation_id))?;
    state
        .analysis
        .merchant_narrative(merchant_id)
        .await
        .map(Json)
        .map_err(|error| ApiError::new(error, &correlation_id))
}

pub async fn list_customers(State(state): State<AppState>) -> Json<CustomerList> {
    Json(CustomerList { customers: state.analysis.catalog().customer_summaries() })
}

pub async fn get_customer(
    State(state): State<AppState>,
    Path(customer_id): Path<String>,
) -> Result<Json<CustomerProfile>, ApiError> {
    let correlation_id = correlation_id();
    state
        .analysis
        .catalog()
        .customer(&customer_id)
        .cloned()
        .map(Json)
        .map_err(|error| ApiError::new(error, &correlation_id))
}

pub async fn analyze_customer_upgrade(
    State(state): State<AppState>,
    Json(body): Json<CustomerUpgradeRequest>,
) -> Result<Json<UpgradeRecommendation>, ApiError> {
    let correlation_id = correlation_id();
    let customer_id = required(body.customer_id.as_deref(), "customer_id")
        .map_err(|error| ApiError::new(error, &correlation_id))?;
    state
        .analysis
        .customer_upgrade(customer_id, body.output_mode.as_deref(), body.format_mode.as_deref())
        .await
        .map(Json)
        .map_err(|error| ApiError::new(error, &correlation_id))
}

pub async fn list_disputes(State(state): State<AppState>) -> Json<DisputeList> {
    Json(DisputeList { disputes: state.analysis.catalog().dispute_summaries() })
}

pub async fn get_dispute(
    State(state): State<AppState>,
    Path(case_id): Path<String>,
) -> Result<Json<DisputeCase>, ApiError> {
    let correlation_id = correlation_id();
    state
        .analysis
        .catalog()
        .dispute(&case_id)
        .cloned()
        .map(Json)
        .map_err(|error| ApiError::new(error, &correlation_id))
}

pub async fn analyze_dispute(
    State(state): State<AppState>,
    Json(body): Json<DisputeAnalysisRequest>,
) -> Result<Json<DisputeAnalysis>, ApiError> {
    let correlation_id = correlation_id();
    let case_id = required(body.case_id.as_deref(), "case_id")
        .map_err(|error| ApiError::new(error, &correlation_id))?;
    state
        .analysis
        .analyze_dispute(case_id)
        .await
        .map(Json)
        .map_err(|error| ApiError::new(error, &correlation_id))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::extract::{Path, State};
    use axum::http::{header, Method, Request, StatusCode};
    use axum::Json;
    use cardline_agent::llm::{ScriptedCompletionClient, UnconfiguredCompletionClient};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::{analyze_dispute, get_merchant, list_scenarios, DisputeAnalysisRequest};
    use crate::bootstrap::test_support::{app_with, state_with};

    async fn send(app: axum::Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(value) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };
        let response = app.oneshot(builder.body(body).expect("request")).await.expect("response");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    #[tokio::test]
    async fn scenario_listing_reports_total() {
        let Json(payload) = list_scenarios(State(state_with(Arc::new(UnconfiguredCompletionClient)))).await;
        assert_eq!(payload.total, 20);
        assert_eq!(payload.scenarios.len(), 20);
    }

    #[tokio::test]
    async fn lookups_work_without_completion_credentials() {
        let app = app_with(Arc::new(UnconfiguredCompletionClient));

        let (status, body) = send(app.clone(), Method::GET, "/api/customers", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["customers"].as_array().map(Vec::len), Some(15));

        let (status, body) = send(app.clone(), Method::GET, "/api/disputes/DISP-99283", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["dispute_details"]["item"], "Limited Edition Air Jordan 1");

        let (status, body) = send(app, Method::GET, "/api/merchants", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["merchants"][0]["id"], "MERCH001");
    }

    #[tokio::test]
    async fn unknown_merchant_is_not_found_with_correlation_id() {
        let state = state_with(Arc::new(UnconfiguredCompletionClient));
        let error = get_merchant(State(state), Path("MERCH404".to_string()))
            .await
            .expect_err("unknown merchant");
        assert_eq!(error.status(), StatusCode::NOT_FOUND);
        assert!(!error.0.correlation_id().is_empty());
    }

    #[tokio::test]
    async fn analysis_without_credentials_is_a_server_error() {
        let app = app_with(Arc::new(UnconfiguredCompletionClient));
        let (status, body) = send(
            app,
            Method::POST,
            "/api/analyze-fraud",
            Some(json!({"scenario_id": 0, "audience": "Risk Analyst"})),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["detail"], "OpenAI API key not configured on server");
        assert!(body["correlation_id"].is_string());
    }

    #[tokio::test]
    async fn fraud_analysis_relays_model_text() {
        let app = app_with(Arc::new(ScriptedCompletionClient::constant("Risk: Critical")));
        let (status, body) = send(
            app,
            Method::POST,
            "/api/analyze-fraud",
            Some(json!({"scenario_id": 2, "audience": "Executive Summary"})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["analysis"], "Risk: Critical");
        assert_eq!(body["audience"], "Executive Summary");
        assert_eq!(body["scenario"]["id"], 2);
    }

    #[tokio::test]
    async fn missing_fraud_fields_are_rejected_by_the_extractor() {
        let app = app_with(Arc::new(ScriptedCompletionClient::constant("unused")));
        let (status, _) =
            send(app, Method::POST, "/api/analyze-fraud", Some(json!({"audience": "x"}))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn missing_identifiers_are_bad_requests() {
        let app = app_with(Arc::new(ScriptedCompletionClient::constant("unused")));
        for (uri, field) in [
            ("/api/generate-merchant-narrative", "merchant_id"),
            ("/api/analyze-customer-upgrade", "customer_id"),
            ("/api/analyze-dispute", "case_id"),
        ] {
            let (status, body) = send(app.clone(), Method::POST, uri, Some(json!({}))).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
            assert_eq!(body["detail"], format!("{field} is required"));
        }
    }

    #[tokio::test]
    async fn dispute_analysis_returns_case_id() {
        let state = state_with(Arc::new(ScriptedCompletionClient::constant("Trust Score: 12/100")));
        let Json(result) = analyze_dispute(
            State(state),
            Json(DisputeAnalysisRequest { case_id: Some("DISP-99283".to_string()) }),
        )
        .await
        .expect("analysis");

        assert!(result.success);
        assert_eq!(result.case_id, "DISP-99283");
        assert_eq!(result.analysis, "Trust Score: 12/100");
    }

    #[tokio::test]
    async fn customer_upgrade_echoes_modes() {
        let app = app_with(Arc::new(ScriptedCompletionClient::constant("narrative")));
        let (status, body) = send(
            app,
            Method::POST,
            "/api/analyze-customer-upgrade",
            Some(json!({"customer_id": "CUST003", "output_mode": "Analyst", "format_mode": "Text"})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["output_mode"], "Analyst");
        assert_eq!(body["format_mode"], "Text");
        assert_eq!(body["recommendation"], "narrative");
    }

    #[tokio::test]
    async fn prompt_test_reports_usage() {
        let app = app_with(Arc::new(ScriptedCompletionClient::constant("Hello back")));
        let (status, body) = send(app, Method::POST, "/api/test-prompt", Some(json!({}))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["response"], "Hello back");
        assert_eq!(body["usage"]["total_tokens"], 2);
    }
}
