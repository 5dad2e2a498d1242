use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerProfile {
    pub customer_id: String,
    pub name: String,
    pub age: u32,
    pub occupation: String,
    pub monthly_spend: u32,
    pub spend_categories: BTreeMap<String, u32>,
    /// Percent of the credit line in use, 0-100.
    pub credit_utilization: u32,
    pub payment_behavior: String,
    pub chargebacks_last_12mo: u32,
    pub income_band: String,
    pub card_type: String,
    pub location: String,
    pub account_age_months: u32,
    pub credit_score_band: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CustomerSummary {
    pub customer_id: String,
    pub name: String,
    pub age: u32,
    pub occupation: String,
    pub monthly_spend: u32,
    pub card_type: String,
    pub location: String,
    pub credit_utilization: u32,
}

impl From<&CustomerProfile> for CustomerSummary {
    fn from(profile: &CustomerProfile) -> Self {
        Self {
            customer_id: profile.customer_id.clone(),
            name: profile.name.clone(),
            age: profile.age,
            occupation: profile.occupation.clone(),
            monthly_spend: profile.monthly_spend,
            card_type: profile.card_type.clone(),
            location: profile.location.clone(),
            credit_utilization: profile.credit_utilization,
        }
    }
}
