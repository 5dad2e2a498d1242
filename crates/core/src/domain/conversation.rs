use serde::{Deserialize, Serialize};

use crate::domain::classification::Sentiment;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// Tag a client attaches to a recorded turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnTag {
    Positive,
    Neutral,
    Negative,
    Frustrated,
    OffTopic,
    #[serde(other)]
    Unrecognized,
}

impl From<Sentiment> for TurnTag {
    fn from(value: Sentiment) -> Self {
        match value {
            Sentiment::Positive => Self::Positive,
            Sentiment::Neutral => Self::Neutral,
            Sentiment::Negative => Self::Negative,
            Sentiment::Frustrated => Self::Frustrated,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: Role,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<TurnTag>,
}

impl ChatTurn {
    pub fn user(content: impl Into<String>, sentiment: Option<TurnTag>) -> Self {
        Self { role: Role::User, content: content.into(), timestamp: None, sentiment }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: content.into(), timestamp: None, sentiment: None }
    }

    pub fn is_off_topic(&self) -> bool {
        self.sentiment == Some(TurnTag::OffTopic)
    }
}

/// Caller-owned record of a conversation. The engine reads it and hands back
/// an updated off-topic count; it never stores turns itself.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConversationState {
    turns: Vec<ChatTurn>,
    off_topic_count: u32,
}

impl ConversationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_history(turns: Vec<ChatTurn>) -> Self {
        let off_topic_count = turns.iter().filter(|turn| turn.is_off_topic()).count() as u32;
        Self { turns, off_topic_count }
    }

    pub fn turns(&self) -> &[ChatTurn] {
        &self.turns
    }

    pub fn off_topic_count(&self) -> u32 {
        self.off_topic_count
    }

    pub fn tail(&self, limit: usize) -> &[ChatTurn] {
        let start = self.turns.len().saturating_sub(limit);
        &self.turns[start..]
    }

    pub fn record_exchange(
        &mut self,
        user_message: impl Into<String>,
        user_tag: TurnTag,
        assistant_reply: impl Into<String>,
        off_topic_count: u32,
    ) {
        self.turns.push(ChatTurn::user(user_message, Some(user_tag)));
        self.turns.push(ChatTurn::assistant(assistant_reply));
        self.off_topic_count = self.off_topic_count.max(off_topic_count);
    }
}

#[cfg(test)]
mod tests {
    use super::{ChatTurn, ConversationState, Role, TurnTag};

    #[test]
    fn history_derives_off_topic_count_from_tags() {
        let state = ConversationState::from_history(vec![
            ChatTurn::user("what's the weather", Some(TurnTag::OffTopic)),
            ChatTurn::assistant("I'm here for card support."),
            ChatTurn::user("check my balance", Some(TurnTag::Neutral)),
            ChatTurn::user("tell me a joke", Some(TurnTag::OffTopic)),
        ]);

        assert_eq!(state.off_topic_count(), 2);
    }

    #[test]
    fn tail_returns_most_recent_turns_in_order() {
        let turns = (0..7).map(|index| ChatTurn::assistant(format!("turn {index}"))).collect();
        let state = ConversationState::from_history(turns);

        let tail = state.tail(5);
        assert_eq!(tail.len(), 5);
        assert_eq!(tail[0].content, "turn 2");
        assert_eq!(tail[4].content, "turn 6");
        assert_eq!(state.tail(50).len(), 7);
    }

    #[test]
    fn off_topic_count_never_decreases() {
        let mut state = ConversationState::new();
        state.record_exchange("weather?", TurnTag::OffTopic, "redirect", 1);
        state.record_exchange("balance?", TurnTag::Neutral, "$16,475.00", 0);

        assert_eq!(state.off_topic_count(), 1);
        assert_eq!(state.turns().len(), 4);
        assert_eq!(state.turns()[1].role, Role::Assistant);
    }

    #[test]
    fn unknown_client_tags_are_tolerated() {
        let turn: ChatTurn = serde_json::from_str(
            r#"{"role":"user","content":"hi","timestamp":"2026-01-02T10:00:00Z","sentiment":"ecstatic"}"#,
        )
        .expect("turn should deserialize");

        assert_eq!(turn.sentiment, Some(TurnTag::Unrecognized));
        assert!(!turn.is_off_topic());
    }
}
