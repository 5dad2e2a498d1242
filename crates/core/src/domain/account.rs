use std::sync::{Arc, Mutex};

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::Serialize;

use crate::domain::card::{CardCommand, CardId, CardResource, CardTransition};
use crate::errors::DomainError;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LastPurchase {
    pub amount_cents: i64,
    pub merchant: String,
}

/// Confidential snapshot the virtual agent may reference but never echo verbatim.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AccountProfile {
    pub holder_name: String,
    pub account_number: String,
    pub address: String,
    pub standing: String,
    pub balance_cents: i64,
    pub minimum_payment_cents: i64,
    pub next_payment_date: NaiveDate,
    pub last_purchase: LastPurchase,
    pub number_of_cards: u32,
}

impl AccountProfile {
    pub fn first_name(&self) -> &str {
        self.holder_name.split_whitespace().next().unwrap_or(&self.holder_name)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Account {
    profile: AccountProfile,
    card: CardResource,
}

impl Account {
    pub fn new(profile: AccountProfile, card: CardResource) -> Self {
        Self { profile, card }
    }

    /// The demo cardholder every session talks about.
    pub fn demo() -> Self {
        let profile = AccountProfile {
            holder_name: "Michael Miebach".to_string(),
            account_number: "8765309".to_string(),
            address: "1 King Street West, Toronto, Ontario, M3J 3P8".to_string(),
            standing: "Good Standing".to_string(),
            balance_cents: 1_647_500,
            minimum_payment_cents: 40_332,
            next_payment_date: NaiveDate::from_ymd_opt(2026, 1, 29).unwrap_or_default(),
            last_purchase: LastPurchase {
                amount_cents: 235,
                merchant: "Starbucks - Store #2456".to_string(),
            },
            number_of_cards: 1,
        };
        Self::new(profile, CardResource::new(CardId("card_1115".to_string()), "1115"))
    }

    pub fn profile(&self) -> &AccountProfile {
        &self.profile
    }

    pub fn card(&self) -> &CardResource {
        &self.card
    }

    pub fn apply_card_command(
        &mut self,
        command: CardCommand,
        at: DateTime<Utc>,
    ) -> CardTransition {
        self.card.apply(command, at)
    }
}

/// Process-shared handle to one account. Callers must not hold the guard
/// across an `.await`; every method here completes inside one lock scope.
#[derive(Clone, Debug)]
pub struct SharedAccount {
    inner: Arc<Mutex<Account>>,
}

impl SharedAccount {
    pub fn new(account: Account) -> Self {
        Self { inner: Arc::new(Mutex::new(account)) }
    }

    pub fn snapshot(&self) -> Result<Account, DomainError> {
        self.with(|account| account.clone())
    }

    /// Applies an optional command and returns the post-update account
    /// alongside the transition, all under one lock acquisition.
    pub fn apply_card_command(
        &self,
        command: Option<CardCommand>,
        at: DateTime<Utc>,
    ) -> Result<(Account, Option<CardTransition>), DomainError> {
        self.with(|account| {
            let transition = command.map(|command| account.apply_card_command(command, at));
            (account.clone(), transition)
        })
    }

    fn with<R>(&self, f: impl FnOnce(&mut Account) -> R) -> Result<R, DomainError> {
        let mut guard = self.inner.lock().map_err(|poisoned| {
            DomainError::AccountUnavailable(poisoned.get_ref().profile.account_number.clone())
        })?;
        Ok(f(&mut guard))
    }
}

impl Default for SharedAccount {
    fn default() -> Self {
        Self::new(Account::demo())
    }
}

pub fn format_cents(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let absolute = cents.unsigned_abs();
    let dollars = (absolute / 100).to_string();

    let mut grouped = String::with_capacity(dollars.len() + dollars.len() / 3);
    for (index, digit) in dollars.chars().enumerate() {
        if index > 0 && (dollars.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    format!("{sign}${grouped}.{:02}", absolute % 100)
}

/// Renders dates the way the contact center scripts read them, e.g. "January 29th, 2026".
pub fn format_long_date(date: NaiveDate) -> String {
    let day = date.day();
    let suffix = match (day % 10, day % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{} {day}{suffix}, {}", date.format("%B"), date.year())
}

#[cfg(test)]
mod tests {
    use std::thread;

    use chrono::{NaiveDate, Utc};

    use crate::domain::card::{CardCommand, CardStatus};

    use super::{format_cents, format_long_date, Account, SharedAccount};

    #[test]
    fn demo_account_matches_contact_center_fixture() {
        let account = Account::demo();
        assert_eq!(account.profile().holder_name, "Michael Miebach");
        assert_eq!(account.profile().first_name(), "Michael");
        assert_eq!(account.card().last_four(), "1115");
        assert_eq!(account.card().status(), CardStatus::Active);
    }

    #[test]
    fn money_is_rendered_with_grouping() {
        assert_eq!(format_cents(1_647_500), "$16,475.00");
        assert_eq!(format_cents(40_332), "$403.32");
        assert_eq!(format_cents(235), "$2.35");
        assert_eq!(format_cents(100_000_000), "$1,000,000.00");
        assert_eq!(format_cents(-1_250), "-$12.50");
    }

    #[test]
    fn long_dates_use_ordinal_suffixes() {
        let date = |d| NaiveDate::from_ymd_opt(2026, 1, d).expect("valid date");
        assert_eq!(format_long_date(date(29)), "January 29th, 2026");
        assert_eq!(format_long_date(date(1)), "January 1st, 2026");
        assert_eq!(format_long_date(date(22)), "January 22nd, 2026");
        assert_eq!(format_long_date(date(13)), "January 13th, 2026");
    }

    #[test]
    fn shared_account_applies_command_and_reports_previous_status() {
        let account = SharedAccount::default();
        let (after, transition) = account
            .apply_card_command(Some(CardCommand::Freeze), Utc::now())
            .expect("lock should be healthy");

        let transition = transition.expect("a command was supplied");
        assert_eq!(transition.from, CardStatus::Active);
        assert_eq!(after.card().status(), CardStatus::Frozen);

        let (unchanged, none) =
            account.apply_card_command(None, Utc::now()).expect("lock should be healthy");
        assert!(none.is_none());
        assert_eq!(unchanged.card().status(), CardStatus::Frozen);
    }

    #[test]
    fn concurrent_commands_leave_a_consistent_status() {
        let account = SharedAccount::default();
        let handles = (0..16)
            .map(|index| {
                let account = account.clone();
                thread::spawn(move || {
                    let command =
                        if index % 2 == 0 { CardCommand::Freeze } else { CardCommand::Unfreeze };
                    account.apply_card_command(Some(command), Utc::now()).map(|(_, t)| t)
                })
            })
            .collect::<Vec<_>>();

        let mut transitions = Vec::new();
        for handle in handles {
            let transition = handle.join().expect("thread").expect("lock").expect("transition");
            transitions.push(transition);
        }

        let changed = transitions.iter().filter(|transition| transition.changed()).count();
        let final_status = account.snapshot().expect("snapshot").card().status();
        assert!(matches!(final_status, CardStatus::Active | CardStatus::Frozen));
        // Starting from active, an odd number of real changes ends frozen.
        assert_eq!(changed % 2 == 1, final_status == CardStatus::Frozen);
    }
}
