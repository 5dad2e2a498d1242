use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FraudScenario {
    pub id: usize,
    pub case_name: String,
    pub account: FraudAccount,
    pub flagged_transaction: FlaggedTransaction,
    pub fraud_indicators: BTreeMap<String, IndicatorValue>,
    pub historical_transactions: Vec<HistoricalTransaction>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FraudAccount {
    pub account_number: String,
    pub cardholder_name: String,
    pub account_age_days: u32,
    pub address: String,
    pub typical_monthly_spend: f64,
    pub past_chargebacks: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FlaggedTransaction {
    pub amount: f64,
    pub merchant: String,
    pub mcc: String,
    pub mcc_description: String,
    pub location: String,
    pub timestamp: String,
    pub device_id: String,
    pub card_present: bool,
    pub ip_address: String,
    pub transaction_id: String,
}

/// Indicators are either a descriptive finding or a raw flag.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IndicatorValue {
    Flag(bool),
    Finding(String),
}

impl fmt::Display for IndicatorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flag(true) => f.write_str("Yes"),
            Self::Flag(false) => f.write_str("No"),
            Self::Finding(text) => f.write_str(text),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HistoricalTransaction {
    pub date: String,
    pub amount: f64,
    pub merchant: String,
    pub location: String,
}
