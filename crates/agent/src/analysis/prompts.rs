//! Prompt text for the analysis endpoints. Builders are pure: the same
//! entity and options always yield the same prompt.

use cardline_core::catalog::{CustomerProfile, DisputeCase, FraudScenario, Merchant};
use cardline_core::errors::ApplicationError;
use serde::Serialize;

pub const FRAUD_SYSTEM: &str = "You are a fraud analysis expert for Mastercard. Analyze transaction data and explain fraud risks clearly.";

pub const MERCHANT_SYSTEM: &str =
    "You are a Senior Strategic Fintech Consultant acting as a Virtual CFO.";

pub const CUSTOMER_SYSTEM: &str = "You are Mastercard AI, an internal product strategy assistant. You analyze credit card customers to identify upgrade opportunities that increase revenue, retention, and cardholder satisfaction.";

pub const DISPUTE_SYSTEM: &str = "You are the Mastercard First-Party Trust AI, a forensic agent that identifies friendly fraud (first-party misuse) by cross-referencing customer claims against merchant telemetry and carrier evidence.";

pub const CONNECTION_TEST_PROMPT: &str = "Say 'Connection successful!' if you can read this.";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Audience {
    RiskAnalyst,
    ExecutiveSummary,
    CustomerFriendly,
}

impl Audience {
    /// Unknown labels are answered with the analyst instruction.
    pub fn from_label(label: &str) -> Self {
        match label {
            "Executive Summary" => Self::ExecutiveSummary,
            "Customer-friendly" => Self::CustomerFriendly,
            _ => Self::RiskAnalyst,
        }
    }

    pub fn instruction(&self) -> &'static str {
        match self {
            Self::RiskAnalyst => "Provide a detailed technical analysis with specific fraud indicators, risk scores, and model reasoning. Use industry terminology.",
            Self::ExecutiveSummary => "Provide a concise, high-level summary focusing on business impact and key risk factors. Keep it brief and actionable.",
            Self::CustomerFriendly => "Explain in simple, non-technical language that a cardholder would understand. Be empathetic and clear.",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputMode {
    Executive,
    Analyst,
    CustomerFriendly,
}

impl OutputMode {
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "Executive" => Some(Self::Executive),
            "Analyst" => Some(Self::Analyst),
            "Customer-friendly" => Some(Self::CustomerFriendly),
            _ => None,
        }
    }

    fn tone(&self) -> &'static str {
        match self {
            Self::Executive => {
                "Tone: Concise, strategic, business-focused. Highlight ROI and retention metrics."
            }
            Self::Analyst => "Tone: Detailed, data-driven, analytical. Include specific numbers and behavioral patterns.",
            Self::CustomerFriendly => {
                "Tone: Warm, benefit-focused, easy to understand. Emphasize value to the customer."
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormatMode {
    Json,
    Narrative,
}

impl FormatMode {
    pub fn from_label(label: &str) -> Self {
        if label == "JSON" {
            Self::Json
        } else {
            Self::Narrative
        }
    }
}

fn pretty<T: Serialize>(what: &str, value: &T) -> Result<String, ApplicationError> {
    serde_json::to_string_pretty(value)
        .map_err(|error| ApplicationError::Service(format!("could not encode {what}: {error}")))
}

pub fn fraud_analysis_prompt(
    scenario: &FraudScenario,
    audience: &str,
) -> Result<String, ApplicationError> {
    let scenario_json = pretty("fraud scenario", scenario)?;
    let instruction = Audience::from_label(audience).instruction();

    Ok(format!(
        "Analyze this transaction that was flagged for potential fraud:\n\n\
         {scenario_json}\n\n\
         Audience: {audience}\n\
         Instructions: {instruction}\n\n\
         Please provide:\n\
         1. A risk score assessment (Low/Medium/High/Critical)\n\
         2. Key fraud indicators identified\n\
         3. Explanation of why this transaction was flagged\n\
         4. Recommended action\n\n\
         Format your response appropriately for the {audience} audience."
    ))
}

pub fn merchant_narrative_prompt(merchant: &Merchant) -> Result<String, ApplicationError> {
    let monthly_json = pretty("merchant monthly data", &merchant.monthly_data)?;
    let months = merchant.monthly_data.len();

    Ok(format!(
        "You are provided with a JSON dataset containing {months} months of KPI data for a specific merchant. \
         Act as their Virtual CFO and generate a structured, actionable Merchant Growth & Health Narrative.\n\n\
         **Merchant Profile:**\n\
         - Name: {name}\n\
         - Business Type: {business_type}\n\
         - Location: {location}\n\
         - Known Business Challenge: {problem}\n\n\
         **{months}-Month KPI Data:**\n\
         {monthly_json}\n\n\
         **Your Task:**\n\
         Generate a strategic report with the following sections:\n\n\
         1. **Executive Scorecard**: A 2-sentence summary of the business's current state (e.g. 'Scaling Rapidly', 'Efficiency Recovery Phase', 'Churn Risk Alert').\n\n\
         2. **The \"Why\" Behind the Numbers**: Explain one non-obvious correlation in the data, such as how average ticket size relates to transaction volume or how Saturday revenue share affects overall performance.\n\n\
         3. **Anomaly Detection**: Identify the most significant outlier in the last 90 days (the last 3 months of data) and hypothesize a business reason for it.\n\n\
         4. **Strategic Roadmap**: Provide 3 hyper-specific, actionable recommendations grounded in the data. Do NOT give generic advice like 'increase sales'.\n\n\
         5. **Risk Assessment**: Flag any brewing issues in chargeback rates, refund rates, terminal downtime, or customer retention that need immediate attention.\n\n\
         **Tone**: Professional, encouraging, and data-driven. Reference actual numbers from the data.\n\n\
         Format your response with clear section headers using **bold** for section titles.",
        name = merchant.name,
        business_type = merchant.business_type,
        location = merchant.location,
        problem = merchant.problem_statement,
    ))
}

pub fn customer_upgrade_prompt(
    customer: &CustomerProfile,
    output_mode: &str,
    format_mode: &str,
) -> Result<String, ApplicationError> {
    let customer_json = pretty("customer profile", customer)?;
    let mut prompt = format!(
        "You analyze fictitious credit card customers to identify upgrade opportunities that increase revenue, retention, and cardholder satisfaction.\n\
         You NEVER reference confidential network data. All examples are generic and public-safe.\n\
         Respond with professional, concise wording suitable for an internal strategy review.\n\n\
         CUSTOMER_PROFILE:\n\
         {customer_json}\n\n\
         OUTPUT_MODE: \"{output_mode}\"\n\
         FORMAT: \"{format_mode}\"\n\n\
         TASK:\n\
         Based on CUSTOMER_PROFILE, determine:\n\n\
         1. Their spending patterns\n\
         2. Their probable financial behavior\n\
         3. Which upgrade(s) would fit:\n   \
            - Premium card tier (cashback, travel rewards, concierge)\n   \
            - Fraud-protection or subscription-management add-ons\n   \
            - Credit limit increase or BNPL offers\n\
         4. Why the upgrade makes sense (business justification + customer value)\n\
         5. A 1-to-3 sentence pitch that could be emailed or shown in-app (only if OUTPUT_MODE is \"Customer-friendly\")\n"
    );

    match FormatMode::from_label(format_mode) {
        FormatMode::Json => prompt.push_str(
            "\nPlease provide your response in the following JSON structure:\n\
             {\n  \"recommended_upgrades\": [\n    {\n      \"offer\": \"Upgrade name\",\n      \"reasoning\": \"Why this fits the customer's behavior\",\n      \"business_value\": \"Revenue/retention impact\",\n      \"customer_value_statement\": \"Customer-facing benefit statement\"\n    }\n  ]\n}\n",
        ),
        FormatMode::Narrative => prompt.push_str(
            "\nPlease provide a narrative response with clear sections:\n\
             - **Spending Analysis**\n\
             - **Recommended Upgrades**\n\
             - **Business Justification**\n\
             - **Customer Pitch** (if Customer-friendly mode)\n",
        ),
    }

    if let Some(mode) = OutputMode::from_label(output_mode) {
        prompt.push('\n');
        prompt.push_str(mode.tone());
    }

    Ok(prompt)
}

pub fn dispute_analysis_prompt(dispute: &DisputeCase) -> Result<String, ApplicationError> {
    let dispute_json = pretty("dispute case", dispute)?;

    Ok(format!(
        "You are analyzing a chargeback dispute to determine whether it is legitimate or friendly fraud (first-party misuse).\n\n\
         DISPUTE CASE:\n\
         {dispute_json}\n\n\
         INSTRUCTIONS:\n\n\
         1. **Analyze Inconsistencies**: Compare the customer's dispute reason against the merchant evidence. Look for contradictions, impossible claims, or suspicious patterns.\n\n\
         2. **Assign a Trust Score** (0-100):\n   \
            - 0-20: High-confidence fraud\n   \
            - 21-40: Likely fraud\n   \
            - 41-60: Uncertain (conflicting evidence)\n   \
            - 61-80: Likely legitimate\n   \
            - 81-100: High-confidence legitimate\n\n\
         3. **Draft an Evidence Summary**: A concise, objective summary suitable for the issuing bank.\n\n\
         4. **Highlight Smoking Guns**: Point out the specific data points (GPS coordinates, signatures, device activation logs, usage patterns, access logs) that prove or disprove the claim.\n\n\
         5. **Provide a Recommendation**: \"Deny Chargeback\", \"Approve Chargeback\", or \"Request Additional Evidence\".\n\n\
         **TONE**: Objective, evidence-based, and authoritative.\n\n\
         **FORMAT YOUR RESPONSE AS**:\n\n\
         **AI Dispute Analysis: {case_id}**\n\
         **Trust Score**: [0-100]/100 ([Risk Level])\n\n\
         **Evidence Summary**:\n[analysis of what the evidence shows]\n\n\
         **Key Inconsistencies** (or **Supporting Evidence** if legitimate):\n[bullet points]\n\n\
         **Smoking Gun Evidence**:\n[the most damning or exonerating piece of evidence]\n\n\
         **Recommendation**:\n[final recommendation with brief justification]\n",
        case_id = dispute.case_id,
    ))
}

#[cfg(test)]
mod tests {
    use cardline_core::Catalog;

    use super::{
        customer_upgrade_prompt, dispute_analysis_prompt, fraud_analysis_prompt,
        merchant_narrative_prompt, Audience,
    };

    fn catalog() -> Catalog {
        Catalog::load_embedded().expect("fixtures")
    }

    #[test]
    fn unknown_audience_uses_analyst_instruction_but_echoes_label() {
        let catalog = catalog();
        let scenario = catalog.fraud_scenario(0).expect("scenario");
        let prompt = fraud_analysis_prompt(scenario, "Board of Directors").expect("prompt");

        assert!(prompt.contains(Audience::RiskAnalyst.instruction()));
        assert!(prompt.contains("Audience: Board of Directors"));
        assert!(prompt.contains("TXN-2024-1230-894521"));
    }

    #[test]
    fn executive_audience_gets_its_own_instruction() {
        let catalog = catalog();
        let scenario = catalog.fraud_scenario(1).expect("scenario");
        let prompt = fraud_analysis_prompt(scenario, "Executive Summary").expect("prompt");
        assert!(prompt.contains(Audience::ExecutiveSummary.instruction()));
    }

    #[test]
    fn customer_prompt_switches_on_format_and_output_mode() {
        let catalog = catalog();
        let customer = catalog.customer("CUST001").expect("customer");

        let json = customer_upgrade_prompt(customer, "Executive", "JSON").expect("prompt");
        assert!(json.contains("\"recommended_upgrades\""));
        assert!(json.contains("Highlight ROI"));

        let narrative = customer_upgrade_prompt(customer, "Analyst", "Markdown").expect("prompt");
        assert!(narrative.contains("**Spending Analysis**"));
        assert!(!narrative.contains("\"recommended_upgrades\""));
        assert!(narrative.contains("behavioral patterns"));

        let unknown = customer_upgrade_prompt(customer, "Poet", "JSON").expect("prompt");
        assert!(!unknown.contains("Tone:"));
    }

    #[test]
    fn merchant_prompt_carries_profile_and_kpis() {
        let catalog = catalog();
        let merchant = catalog.merchant("MERCH001").expect("merchant");
        let prompt = merchant_narrative_prompt(merchant).expect("prompt");

        assert!(prompt.contains("Name: Maple Leaf Coffee Roasters"));
        assert!(prompt.contains("12-Month KPI Data"));
        assert!(prompt.contains("\"saturday_revenue_share\""));
    }

    #[test]
    fn dispute_prompt_names_the_case() {
        let catalog = catalog();
        let dispute = catalog.dispute("DISP-99283").expect("dispute");
        let prompt = dispute_analysis_prompt(dispute).expect("prompt");

        assert!(prompt.contains("**AI Dispute Analysis: DISP-99283**"));
        assert!(prompt.contains("FDX8827364829"));
    }
}
