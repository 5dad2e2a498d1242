pub mod prompts;

use std::sync::Arc;

use cardline_core::catalog::{Catalog, FraudScenario};
use cardline_core::errors::ApplicationError;
use serde::Serialize;
use tracing::{info, warn};

use crate::llm::{CompletionClient, CompletionError, CompletionRequest, TokenUsage};
use prompts::{
    customer_upgrade_prompt, dispute_analysis_prompt, fraud_analysis_prompt,
    merchant_narrative_prompt, CONNECTION_TEST_PROMPT, CUSTOMER_SYSTEM, DISPUTE_SYSTEM,
    FRAUD_SYSTEM, MERCHANT_SYSTEM,
};

pub const FRAUD_MAX_TOKENS: u32 = 800;
pub const MERCHANT_MAX_TOKENS: u32 = 2000;
pub const CUSTOMER_MAX_TOKENS: u32 = 1500;
pub const DISPUTE_MAX_TOKENS: u32 = 1500;
pub const CONNECTION_TEST_MAX_TOKENS: u32 = 50;
pub const PROMPT_TEST_MAX_TOKENS: u32 = 500;
pub const DEFAULT_TEST_PROMPT: &str = "Hello!";
pub const DEFAULT_OUTPUT_MODE: &str = "Executive";
pub const DEFAULT_FORMAT_MODE: &str = "JSON";

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FraudAnalysis {
    pub scenario: FraudScenario,
    pub analysis: String,
    pub audience: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MerchantNarrative {
    pub success: bool,
    pub narrative: String,
    pub merchant_name: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct UpgradeRecommendation {
    pub success: bool,
    pub customer_name: String,
    pub recommendation: String,
    pub output_mode: String,
    pub format_mode: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DisputeAnalysis {
    pub success: bool,
    pub case_id: String,
    pub analysis: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ConnectionCheck {
    pub success: bool,
    pub message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PromptTest {
    pub success: bool,
    pub response: String,
    pub model: String,
    pub usage: TokenUsage,
}

/// Resolves catalog entities, renders prompts and relays the model's text.
#[derive(Clone)]
pub struct AnalysisService {
    catalog: Arc<Catalog>,
    completion: Arc<dyn CompletionClient>,
    model: String,
}

impl AnalysisService {
    pub fn new(
        catalog: Arc<Catalog>,
        completion: Arc<dyn CompletionClient>,
        model: impl Into<String>,
    ) -> Self {
        Self { catalog, completion, model: model.into() }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub async fn analyze_fraud(
        &self,
        scenario_id: i64,
        audience: &str,
    ) -> Result<FraudAnalysis, ApplicationError> {
        let scenario = usize::try_from(scenario_id)
            .map_err(|_| ApplicationError::not_found("fraud scenario", scenario_id.to_string()))
            .and_then(|index| self.catalog.fraud_scenario(index))?;
        let prompt = fraud_analysis_prompt(scenario, audience)?;
        let analysis = self.run("fraud", FRAUD_SYSTEM, prompt, FRAUD_MAX_TOKENS).await?;

        Ok(FraudAnalysis { scenario: scenario.clone(), analysis, audience: audience.to_string() })
    }

    pub async fn merchant_narrative(
        &self,
        merchant_id: &str,
    ) -> Result<MerchantNarrative, ApplicationError> {
        let merchant = self.catalog.merchant(merchant_id)?;
        let prompt = merchant_narrative_prompt(merchant)?;
        let narrative = self.run("merchant", MERCHANT_SYSTEM, prompt, MERCHANT_MAX_TOKENS).await?;

        Ok(MerchantNarrative { success: true, narrative, merchant_name: merchant.name.clone() })
    }

    pub async fn customer_upgrade(
        &self,
        customer_id: &str,
        output_mode: Option<&str>,
        format_mode: Option<&str>,
    ) -> Result<UpgradeRecommendation, ApplicationError> {
        let output_mode = output_mode.unwrap_or(DEFAULT_OUTPUT_MODE);
        let format_mode = format_mode.unwrap_or(DEFAULT_FORMAT_MODE);
        let customer = self.catalog.customer(customer_id)?;
        let prompt = customer_upgrade_prompt(customer, output_mode, format_mode)?;
        let recommendation =
            self.run("customer", CUSTOMER_SYSTEM, prompt, CUSTOMER_MAX_TOKENS).await?;

        Ok(UpgradeRecommendation {
            success: true,
            customer_name: customer.name.clone(),
            recommendation,
            output_mode: output_mode.to_string(),
            format_mode: format_mode.to_string(),
        })
    }

    pub async fn analyze_dispute(&self, case_id: &str) -> Result<DisputeAnalysis, ApplicationError> {
        let dispute = self.catalog.dispute(case_id)?;
        let prompt = dispute_analysis_prompt(dispute)?;
        let analysis = self.run("dispute", DISPUTE_SYSTEM, prompt, DISPUTE_MAX_TOKENS).await?;

        Ok(DisputeAnalysis { success: true, case_id: dispute.case_id.clone(), analysis })
    }

    /// Upstream failures are reported in the body; only a missing
    /// credential is an error.
    pub async fn test_connection(&self) -> Result<ConnectionCheck, ApplicationError> {
        let request = CompletionRequest::prompt_only(
            self.model.clone(),
            CONNECTION_TEST_PROMPT,
            CONNECTION_TEST_MAX_TOKENS,
        );
        match self.completion.complete(request).await {
            Ok(response) => Ok(ConnectionCheck {
                success: true,
                message: "API connection successful",
                response: Some(response.content),
                model: Some(response.model),
                error: None,
            }),
            Err(error @ CompletionError::Configuration(_)) => Err(error.into()),
            Err(error) => {
                warn!(
                    event_name = "analysis.connection_test.failed",
                    error = %error,
                    "completion connection test failed"
                );
                Ok(ConnectionCheck {
                    success: false,
                    message: "API connection failed",
                    response: None,
                    model: None,
                    error: Some(error.to_string()),
                })
            }
        }
    }

    pub async fn test_prompt(&self, prompt: Option<&str>) -> Result<PromptTest, ApplicationError> {
        let prompt = prompt.unwrap_or(DEFAULT_TEST_PROMPT);
        let request =
            CompletionRequest::prompt_only(self.model.clone(), prompt, PROMPT_TEST_MAX_TOKENS);
        let response = self.completion.complete(request).await?;

        Ok(PromptTest {
            success: true,
            response: response.content,
            model: response.model,
            usage: response.usage.unwrap_or_default(),
        })
    }

    async fn run(
        &self,
        kind: &'static str,
        system: &str,
        prompt: String,
        max_tokens: u32,
    ) -> Result<String, ApplicationError> {
        let request = CompletionRequest::single_turn(self.model.clone(), system, prompt, max_tokens);
        let response = self.completion.complete(request).await?;
        info!(
            event_name = "analysis.completed",
            analysis_kind = kind,
            model = %response.model,
            "analysis completion received"
        );
        Ok(response.content)
    }
}
