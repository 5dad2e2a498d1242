//! Keyword classifiers for chat messages.
//!
//! Matching is case-insensitive substring membership against ordered tables;
//! the first row with a hit wins, so table order is behavior.

use cardline_core::domain::classification::{Intent, Sentiment};

pub const SENTIMENT_PRIORITY: [(Sentiment, &[&str]); 3] = [
    (
        Sentiment::Frustrated,
        &[
            "angry",
            "upset",
            "frustrated",
            "terrible",
            "awful",
            "horrible",
            "worst",
            "ridiculous",
            "unacceptable",
        ],
    ),
    (
        Sentiment::Negative,
        &["problem", "issue", "error", "wrong", "not working", "help", "lost", "stolen"],
    ),
    (Sentiment::Positive, &["thank", "thanks", "great", "good", "perfect", "excellent", "appreciate"]),
];

pub const INTENT_PRIORITY: [(Intent, &[&str]); 10] = [
    (Intent::CheckBalance, &["balance", "how much", "account balance"]),
    (Intent::LostCard, &["lost", "stolen", "missing card", "lost my card", "lost wallet"]),
    (Intent::FreezeCard, &["freeze", "lock", "disable", "turn off"]),
    (Intent::Dispute, &["dispute", "charge", "transaction", "didn't make", "unauthorized"]),
    (Intent::NewCard, &["new card", "replacement", "replace card"]),
    (Intent::Rewards, &["rewards", "points", "cashback", "cash back"]),
    (Intent::Travel, &["travel", "abroad", "overseas", "international"]),
    (Intent::Activate, &["activate", "activation"]),
    (Intent::LiveAgent, &["agent", "human", "person", "representative", "speak to someone"]),
    (Intent::Address, &["address", "billing address", "update address"]),
];

pub const OFF_TOPIC_PHRASES: [&str; 13] = [
    "weather",
    "joke",
    "tell me a joke",
    "how are you",
    "what's your name",
    "where do you live",
    "personal life",
    "hobby",
    "favorite",
    "movie",
    "sports",
    "politics",
    "news",
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Classification {
    pub sentiment: Sentiment,
    pub intent: Intent,
    pub off_topic: bool,
}

pub fn classify(message: &str) -> Classification {
    Classification {
        sentiment: classify_sentiment(message),
        intent: classify_intent(message),
        off_topic: is_off_topic(message),
    }
}

pub fn classify_sentiment(message: &str) -> Sentiment {
    first_match(&message.to_lowercase(), &SENTIMENT_PRIORITY).unwrap_or(Sentiment::Neutral)
}

pub fn classify_intent(message: &str) -> Intent {
    first_match(&message.to_lowercase(), &INTENT_PRIORITY).unwrap_or(Intent::GeneralInquiry)
}

/// Independent of [`classify_intent`]; `off_topic` is never produced by the intent table.
pub fn is_off_topic(message: &str) -> bool {
    contains_any(&message.to_lowercase(), &OFF_TOPIC_PHRASES)
}

pub(crate) fn contains_any(normalized: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|keyword| normalized.contains(keyword))
}

fn first_match<T: Copy>(normalized: &str, table: &[(T, &[&str])]) -> Option<T> {
    table.iter().find(|(_, keywords)| contains_any(normalized, keywords)).map(|(label, _)| *label)
}
