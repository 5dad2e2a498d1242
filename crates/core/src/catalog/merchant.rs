use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Merchant {
    pub id: String,
    pub name: String,
    pub business_type: String,
    pub location: String,
    pub problem_statement: String,
    pub monthly_data: Vec<MonthlyKpi>,
}

/// One month of point-of-sale performance; rates are fractions, not percents.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MonthlyKpi {
    pub month: String,
    pub revenue: f64,
    pub transaction_count: u32,
    pub average_ticket: f64,
    pub chargeback_rate: f64,
    pub refund_rate: f64,
    pub saturday_revenue_share: f64,
    pub repeat_customer_rate: f64,
    pub terminal_downtime_hours: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MerchantSummary {
    pub id: String,
    pub name: String,
    pub business_type: String,
    pub location: String,
}

impl From<&Merchant> for MerchantSummary {
    fn from(merchant: &Merchant) -> Self {
        Self {
            id: merchant.id.clone(),
            name: merchant.name.clone(),
            business_type: merchant.business_type.clone(),
            location: merchant.location.clone(),
        }
    }
}
