use std::fmt;
use std::sync::Arc;

use cardline_core::config::AppConfig;
use cardline_core::domain::account::SharedAccount;
use cardline_core::domain::card::{CardCommand, CardStatus};
use cardline_core::domain::classification::{Intent, Sentiment};
use cardline_core::domain::conversation::{ChatTurn, ConversationState, TurnTag};
use cardline_core::errors::ApplicationError;
use chrono::Utc;
use serde::{Serialize, Serializer};
use tracing::{info, warn};

use crate::actions::suggested_actions;
use crate::classify::{classify, contains_any};
use crate::guardrails::{GuardrailDecision, OffTopicPolicy, OFF_TOPIC_SUGGESTED_ACTIONS};
use crate::instruction::{build_instruction, InstructionContext};
use crate::llm::{CompletionClient, CompletionRequest};

pub const AGENT_MAX_TOKENS: u32 = 300;

/// Intent label reported back to the caller. Escalations carry `transfer`,
/// which the classifier never produces.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReplyIntent {
    Classified(Intent),
    Transfer,
}

impl ReplyIntent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Classified(intent) => intent.as_str(),
            Self::Transfer => "transfer",
        }
    }
}

impl fmt::Display for ReplyIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ReplyIntent {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ChatReply {
    pub response: String,
    pub sentiment: Sentiment,
    pub intent: Option<ReplyIntent>,
    pub suggested_actions: Vec<String>,
    pub transfer_to_agent: bool,
    pub off_topic_count: u32,
}

impl ChatReply {
    pub fn was_redirected(&self) -> bool {
        self.intent == Some(ReplyIntent::Classified(Intent::OffTopic))
    }

    /// Redirects and transfers both answer an off-topic message.
    pub fn was_off_topic(&self) -> bool {
        self.was_redirected() || self.intent == Some(ReplyIntent::Transfer)
    }

    /// Tag the caller stores on the user turn that produced this reply.
    pub fn user_turn_tag(&self) -> TurnTag {
        if self.was_off_topic() {
            TurnTag::OffTopic
        } else {
            self.sentiment.into()
        }
    }
}

/// Inbound chat turn. History is caller-owned; the agent only reads it.
#[derive(Clone, Debug, Default)]
pub struct ChatInput {
    pub message: String,
    pub conversation_history: Vec<ChatTurn>,
    pub authenticated: bool,
    /// Off-topic count the caller already holds; the engine never reports less.
    pub off_topic_count: u32,
}

#[derive(Clone, Debug)]
pub struct AgentSettings {
    pub model: String,
    pub conversation_tail: usize,
    pub off_topic: OffTopicPolicy,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

impl From<&AppConfig> for AgentSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            model: config.llm.agent_model.clone(),
            conversation_tail: config.agent.conversation_tail,
            off_topic: OffTopicPolicy::from(&config.agent),
        }
    }
}

/// Card command implied by a classified message, if any.
pub fn card_command_for(intent: Intent, message: &str) -> Option<CardCommand> {
    let normalized = message.to_lowercase();
    match intent {
        Intent::LostCard if normalized.contains("confirm") => Some(CardCommand::ReportLostStolen),
        Intent::FreezeCard if contains_any(&normalized, &["unfreeze", "unlock"]) => {
            Some(CardCommand::Unfreeze)
        }
        Intent::FreezeCard => Some(CardCommand::Freeze),
        _ => None,
    }
}

#[derive(Clone)]
pub struct VirtualAgent {
    account: SharedAccount,
    completion: Arc<dyn CompletionClient>,
    settings: AgentSettings,
}

impl VirtualAgent {
    pub fn new(
        account: SharedAccount,
        completion: Arc<dyn CompletionClient>,
        settings: AgentSettings,
    ) -> Self {
        Self { account, completion, settings }
    }

    pub fn account(&self) -> &SharedAccount {
        &self.account
    }

    pub async fn process_chat(
        &self,
        input: &ChatInput,
        correlation_id: &str,
    ) -> Result<ChatReply, ApplicationError> {
        let message = input.message.trim();
        if message.is_empty() {
            return Err(ApplicationError::missing_field("message"));
        }

        let classification = classify(message);
        let history = ConversationState::from_history(input.conversation_history.clone());
        let prior_off_topic = history.off_topic_count().max(input.off_topic_count);
        info!(
            event_name = "agent.chat.classified",
            correlation_id,
            sentiment = %classification.sentiment,
            intent = %classification.intent,
            off_topic = classification.off_topic,
            authenticated = input.authenticated,
            "chat message classified"
        );

        match self.settings.off_topic.evaluate(classification.off_topic, prior_off_topic) {
            GuardrailDecision::Allow => {}
            GuardrailDecision::Redirect { off_topic_count, user_message } => {
                info!(
                    event_name = "agent.chat.redirected",
                    correlation_id,
                    off_topic_count,
                    "off-topic message redirected"
                );
                return Ok(ChatReply {
                    response: user_message.to_string(),
                    sentiment: Sentiment::Neutral,
                    intent: Some(ReplyIntent::Classified(Intent::OffTopic)),
                    suggested_actions: OFF_TOPIC_SUGGESTED_ACTIONS
                        .iter()
                        .map(ToString::to_string)
                        .collect(),
                    transfer_to_agent: false,
                    off_topic_count,
                });
            }
            GuardrailDecision::Escalate { off_topic_count, user_message } => {
                warn!(
                    event_name = "agent.chat.escalated",
                    correlation_id,
                    off_topic_count,
                    "conversation transferred to a live agent"
                );
                return Ok(ChatReply {
                    response: user_message.to_string(),
                    sentiment: Sentiment::Neutral,
                    intent: Some(ReplyIntent::Transfer),
                    suggested_actions: Vec::new(),
                    transfer_to_agent: true,
                    off_topic_count,
                });
            }
        }

        let command = card_command_for(classification.intent, message);
        // Lock scope ends here; nothing below holds the account guard.
        let (account, transition) = self.account.apply_card_command(command, Utc::now())?;
        let old_card_status =
            transition.as_ref().map(|transition| transition.from).unwrap_or(account.card().status());
        if let Some(transition) = &transition {
            info!(
                event_name = "agent.card.transition",
                correlation_id,
                card_id = %transition.card_id.0,
                from = %transition.from,
                to = %transition.to,
                changed = transition.changed(),
                "card command applied"
            );
        }

        let instruction = build_instruction(InstructionContext {
            account: &account,
            intent: classification.intent,
            sentiment: classification.sentiment,
            old_card_status,
            conversation_tail: history.tail(self.settings.conversation_tail),
        });
        let request = CompletionRequest::single_turn(
            self.settings.model.clone(),
            instruction,
            message,
            AGENT_MAX_TOKENS,
        );

        let completion = self.completion.complete(request).await.map_err(|error| {
            warn!(
                event_name = "agent.chat.completion_failed",
                correlation_id,
                error = %error,
                "completion failed after card state was committed"
            );
            ApplicationError::from(error)
        })?;

        Ok(ChatReply {
            response: completion.content,
            sentiment: classification.sentiment,
            intent: Some(ReplyIntent::Classified(classification.intent)),
            suggested_actions: suggested_actions(classification.intent),
            transfer_to_agent: false,
            off_topic_count: prior_off_topic,
        })
    }

    /// Runs one turn against a caller-owned conversation and records it there.
    pub async fn converse(
        &self,
        state: &mut ConversationState,
        message: &str,
        correlation_id: &str,
    ) -> Result<ChatReply, ApplicationError> {
        let input = ChatInput {
            message: message.to_string(),
            conversation_history: state.turns().to_vec(),
            authenticated: true,
            off_topic_count: state.off_topic_count(),
        };
        let reply = self.process_chat(&input, correlation_id).await?;
        state.record_exchange(
            message,
            reply.user_turn_tag(),
            reply.response.clone(),
            reply.off_topic_count,
        );
        Ok(reply)
    }

    pub fn card_status(&self) -> Result<CardStatus, ApplicationError> {
        Ok(self.account.snapshot()?.card().status())
    }
}
