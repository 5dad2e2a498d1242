use cardline_core::config::AgentConfig;

pub const OFF_TOPIC_REDIRECT_MESSAGE: &str = "I appreciate your message, but I'm here specifically to help with Mastercard support. Is there anything related to your Mastercard account I can help you with today?";

pub const ESCALATION_MESSAGE: &str = "I understand you may have other questions, but I'm specifically here to help with Mastercard-related inquiries. Let me transfer you to a live agent who can better assist you.";

pub const OFF_TOPIC_SUGGESTED_ACTIONS: [&str; 3] =
    ["Check account balance", "Report lost card", "Dispute transaction"];

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GuardrailDecision {
    /// On-topic; proceed to card handling and completion.
    Allow,
    Redirect { off_topic_count: u32, user_message: &'static str },
    Escalate { off_topic_count: u32, user_message: &'static str },
}

impl GuardrailDecision {
    pub fn reason_code(&self) -> &'static str {
        match self {
            Self::Allow => "on_topic",
            Self::Redirect { .. } => "off_topic_redirect",
            Self::Escalate { .. } => "off_topic_escalation",
        }
    }
}

/// Keeps the conversation on card support and hands off to a human once
/// the caller keeps drifting.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OffTopicPolicy {
    pub escalation_threshold: u32,
}

impl Default for OffTopicPolicy {
    fn default() -> Self {
        Self { escalation_threshold: 3 }
    }
}

impl From<&AgentConfig> for OffTopicPolicy {
    fn from(config: &AgentConfig) -> Self {
        Self { escalation_threshold: config.off_topic_escalation_threshold }
    }
}

impl OffTopicPolicy {
    /// `prior_count` is the number of earlier turns already answered with the redirect.
    pub fn evaluate(&self, off_topic: bool, prior_count: u32) -> GuardrailDecision {
        if !off_topic {
            return GuardrailDecision::Allow;
        }

        let off_topic_count = prior_count.saturating_add(1);
        if off_topic_count >= self.escalation_threshold {
            GuardrailDecision::Escalate { off_topic_count, user_message: ESCALATION_MESSAGE }
        } else {
            GuardrailDecision::Redirect {
                off_topic_count,
                user_message: OFF_TOPIC_REDIRECT_MESSAGE,
            }
        }
    }
}
