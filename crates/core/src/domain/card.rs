use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CardId(pub String);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardStatus {
    Active,
    Frozen,
    LostStolen,
    Deactivated,
}

impl CardStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Frozen => "frozen",
            Self::LostStolen => "lost_stolen",
            Self::Deactivated => "deactivated",
        }
    }
}

impl fmt::Display for CardStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Requested change to a card, derived from the conversation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardCommand {
    ReportLostStolen,
    Freeze,
    Unfreeze,
}

impl CardCommand {
    pub fn target_status(&self) -> CardStatus {
        match self {
            Self::ReportLostStolen => CardStatus::LostStolen,
            Self::Freeze => CardStatus::Frozen,
            Self::Unfreeze => CardStatus::Active,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CardTransition {
    pub card_id: CardId,
    pub command: CardCommand,
    pub from: CardStatus,
    pub to: CardStatus,
}

impl CardTransition {
    pub fn changed(&self) -> bool {
        self.from != self.to
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CardResource {
    id: CardId,
    last_four: String,
    status: CardStatus,
    last_updated: Option<DateTime<Utc>>,
}

impl CardResource {
    pub fn new(id: CardId, last_four: impl Into<String>) -> Self {
        Self { id, last_four: last_four.into(), status: CardStatus::Active, last_updated: None }
    }

    pub fn id(&self) -> &CardId {
        &self.id
    }

    pub fn last_four(&self) -> &str {
        &self.last_four
    }

    pub fn status(&self) -> CardStatus {
        self.status
    }

    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.last_updated
    }

    /// Every command is accepted from every status; re-applying the current
    /// status leaves `last_updated` untouched.
    pub fn apply(&mut self, command: CardCommand, at: DateTime<Utc>) -> CardTransition {
        let from = self.status;
        let to = command.target_status();
        if from != to {
            self.status = to;
            self.last_updated = Some(at);
        }

        CardTransition { card_id: self.id.clone(), command, from, to }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::{CardCommand, CardId, CardResource, CardStatus};

    fn card() -> CardResource {
        CardResource::new(CardId("card_1115".to_string()), "1115")
    }

    #[test]
    fn new_cards_start_active_without_timestamp() {
        let card = card();
        assert_eq!(card.status(), CardStatus::Active);
        assert!(card.last_updated().is_none());
    }

    #[test]
    fn freezing_twice_is_idempotent() {
        let mut card = card();
        let first_at = Utc::now();
        let first = card.apply(CardCommand::Freeze, first_at);
        let second = card.apply(CardCommand::Freeze, first_at + Duration::seconds(5));

        assert!(first.changed());
        assert!(!second.changed());
        assert_eq!(second.from, CardStatus::Frozen);
        assert_eq!(card.status(), CardStatus::Frozen);
        assert_eq!(card.last_updated(), Some(first_at));
    }

    #[test]
    fn unfreeze_returns_card_to_active() {
        let mut card = card();
        card.apply(CardCommand::Freeze, Utc::now());
        let transition = card.apply(CardCommand::Unfreeze, Utc::now());

        assert_eq!(transition.from, CardStatus::Frozen);
        assert_eq!(transition.to, CardStatus::Active);
        assert_eq!(card.status(), CardStatus::Active);
    }

    #[test]
    fn lost_stolen_report_is_accepted_from_any_status() {
        for command in [CardCommand::Freeze, CardCommand::Unfreeze, CardCommand::ReportLostStolen] {
            let mut card = card();
            card.apply(command, Utc::now());
            card.apply(CardCommand::ReportLostStolen, Utc::now());
            assert_eq!(card.status(), CardStatus::LostStolen);
        }
    }

    #[test]
    fn status_serializes_as_snake_case() {
        let encoded = serde_json::to_string(&CardStatus::LostStolen).expect("serialize");
        assert_eq!(encoded, "\"lost_stolen\"");
        assert_eq!(CardStatus::LostStolen.to_string(), "lost_stolen");
    }
}
