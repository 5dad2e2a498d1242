use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
    Frustrated,
}

impl Sentiment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Neutral => "neutral",
            Self::Negative => "negative",
            Self::Frustrated => "frustrated",
        }
    }

    pub fn needs_empathy(&self) -> bool {
        matches!(self, Self::Negative | Self::Frustrated)
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    CheckBalance,
    LostCard,
    FreezeCard,
    Dispute,
    NewCard,
    Rewards,
    Travel,
    Activate,
    LiveAgent,
    Address,
    OffTopic,
    GeneralInquiry,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CheckBalance => "check_balance",
            Self::LostCard => "lost_card",
            Self::FreezeCard => "freeze_card",
            Self::Dispute => "dispute",
            Self::NewCard => "new_card",
            Self::Rewards => "rewards",
            Self::Travel => "travel",
            Self::Activate => "activate",
            Self::LiveAgent => "live_agent",
            Self::Address => "address",
            Self::OffTopic => "off_topic",
            Self::GeneralInquiry => "general_inquiry",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
