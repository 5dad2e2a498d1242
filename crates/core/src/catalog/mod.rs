//! Static sample data served by the lookup endpoints and fed into analysis prompts.
//!
//! Fixtures are embedded at compile time and validated once at startup; a
//! malformed fixture fails bootstrap instead of surfacing per request.

pub mod customer;
pub mod dispute;
pub mod fraud;
pub mod merchant;

use std::collections::HashSet;

use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::errors::ApplicationError;

pub use customer::{CustomerProfile, CustomerSummary};
pub use dispute::{DisputeCase, DisputeDetails, DisputeSummary};
pub use fraud::{
    FlaggedTransaction, FraudAccount, FraudScenario, HistoricalTransaction, IndicatorValue,
};
pub use merchant::{Merchant, MerchantSummary, MonthlyKpi};

const FRAUD_SCENARIOS: &str = include_str!("../../data/fraud_scenarios.json");
const MERCHANTS: &str = include_str!("../../data/merchants.json");
const CUSTOMER_PROFILES: &str = include_str!("../../data/customer_profiles.json");
const DISPUTE_CASES: &str = include_str!("../../data/dispute_cases.json");

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("fixture `{fixture}` is not valid JSON for its schema: {source}")]
    Parse {
        fixture: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("fixture `{fixture}` failed validation: {message}")]
    Invalid { fixture: &'static str, message: String },
}

/// Raw JSON documents a catalog is built from.
#[derive(Clone, Copy, Debug)]
pub struct CatalogSources<'a> {
    pub fraud_scenarios: &'a str,
    pub merchants: &'a str,
    pub customer_profiles: &'a str,
    pub dispute_cases: &'a str,
}

impl CatalogSources<'static> {
    pub fn embedded() -> Self {
        Self {
            fraud_scenarios: FRAUD_SCENARIOS,
            merchants: MERCHANTS,
            customer_profiles: CUSTOMER_PROFILES,
            dispute_cases: DISPUTE_CASES,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Catalog {
    fraud_scenarios: Vec<FraudScenario>,
    merchants: Vec<Merchant>,
    customers: Vec<CustomerProfile>,
    disputes: Vec<DisputeCase>,
}

impl Catalog {
    pub fn load_embedded() -> Result<Self, CatalogError> {
        Self::from_sources(CatalogSources::embedded())
    }

    pub fn from_sources(sources: CatalogSources<'_>) -> Result<Self, CatalogError> {
        let fraud_scenarios: Vec<FraudScenario> =
            parse("fraud_scenarios", sources.fraud_scenarios)?;
        let merchants: Vec<Merchant> = parse("merchants", sources.merchants)?;
        let customers: Vec<CustomerProfile> =
            parse("customer_profiles", sources.customer_profiles)?;
        let disputes: Vec<DisputeCase> = parse("dispute_cases", sources.dispute_cases)?;

        for (index, scenario) in fraud_scenarios.iter().enumerate() {
            if scenario.id != index {
                return Err(CatalogError::Invalid {
                    fixture: "fraud_scenarios",
                    message: format!("scenario at position {index} carries id {}", scenario.id),
                });
            }
        }
        for merchant in &merchants {
            if merchant.monthly_data.is_empty() {
                return Err(CatalogError::Invalid {
                    fixture: "merchants",
                    message: format!("merchant `{}` has no monthly data", merchant.id),
                });
            }
        }
        ensure_unique("merchants", merchants.iter().map(|merchant| merchant.id.as_str()))?;
        ensure_unique(
            "customer_profiles",
            customers.iter().map(|customer| customer.customer_id.as_str()),
        )?;
        ensure_unique("dispute_cases", disputes.iter().map(|case| case.case_id.as_str()))?;

        Ok(Self { fraud_scenarios, merchants, customers, disputes })
    }

    pub fn fraud_scenarios(&self) -> &[FraudScenario] {
        &self.fraud_scenarios
    }

    pub fn fraud_scenario(&self, index: usize) -> Result<&FraudScenario, ApplicationError> {
        self.fraud_scenarios
            .get(index)
            .ok_or_else(|| ApplicationError::not_found("fraud scenario", index.to_string()))
    }

    pub fn merchant_summaries(&self) -> Vec<MerchantSummary> {
        self.merchants.iter().map(MerchantSummary::from).collect()
    }

    pub fn merchant(&self, id: &str) -> Result<&Merchant, ApplicationError> {
        self.merchants
            .iter()
            .find(|merchant| merchant.id == id)
            .ok_or_else(|| ApplicationError::not_found("merchant", id))
    }

    pub fn customer_summaries(&self) -> Vec<CustomerSummary> {
        self.customers.iter().map(CustomerSummary::from).collect()
    }

    pub fn customer(&self, id: &str) -> Result<&CustomerProfile, ApplicationError> {
        self.customers
            .iter()
            .find(|customer| customer.customer_id == id)
            .ok_or_else(|| ApplicationError::not_found("customer", id))
    }

    pub fn dispute_summaries(&self) -> Vec<DisputeSummary> {
        self.disputes.iter().map(DisputeSummary::from).collect()
    }

    pub fn dispute(&self, case_id: &str) -> Result<&DisputeCase, ApplicationError> {
        self.disputes
            .iter()
            .find(|case| case.case_id == case_id)
            .ok_or_else(|| ApplicationError::not_found("dispute case", case_id))
    }
}

fn parse<T: DeserializeOwned>(fixture: &'static str, raw: &str) -> Result<Vec<T>, CatalogError> {
    serde_json::from_str(raw).map_err(|source| CatalogError::Parse { fixture, source })
}

fn ensure_unique<'a>(
    fixture: &'static str,
    ids: impl Iterator<Item = &'a str>,
) -> Result<(), CatalogError> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(CatalogError::Invalid { fixture, message: format!("duplicate id `{id}`") });
        }
    }
    Ok(())
}
