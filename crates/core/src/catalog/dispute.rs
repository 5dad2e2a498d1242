use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DisputeCase {
    pub case_id: String,
    pub status: String,
    pub dispute_details: DisputeDetails,
    /// Evidence shapes differ per case (tracking data, device logs, usage
    /// history), so the map is kept as free-form JSON.
    pub merchant_evidence: Map<String, Value>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisputeDetails {
    pub customer_claim: String,
    pub transaction_amount: String,
    pub transaction_date: String,
    pub item: String,
    pub customer_statement: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DisputeSummary {
    pub case_id: String,
    pub status: String,
    pub customer_claim: String,
    pub transaction_amount: String,
    pub item: String,
    pub transaction_date: String,
}

impl From<&DisputeCase> for DisputeSummary {
    fn from(case: &DisputeCase) -> Self {
        Self {
            case_id: case.case_id.clone(),
            status: case.status.clone(),
            customer_claim: case.dispute_details.customer_claim.clone(),
            transaction_amount: case.dispute_details.transaction_amount.clone(),
            item: case.dispute_details.item.clone(),
            transaction_date: case.dispute_details.transaction_date.clone(),
        }
    }
}
