//! Virtual agent and analysis runtime for the card-services backend.
//!
//! A chat turn runs a fixed pipeline:
//! 1. **Classification** (`classify`) - keyword sentiment, intent and off-topic detection
//! 2. **Guardrail** (`guardrails`) - redirect or escalate drifting conversations
//! 3. **Card handling** (`runtime`) - apply the implied card command to the shared account
//! 4. **Instruction** (`instruction`) - assemble the confidential system prompt
//! 5. **Completion** (`llm`) - one model call under a deadline
//!
//! The analysis endpoints reuse the completion client through `analysis`.
//!
//! # Safety Principle
//!
//! The model only phrases replies. Card state, escalation and authentication
//! are decided deterministically before any completion is requested.

pub mod actions;
pub mod analysis;
pub mod auth;
pub mod classify;
pub mod guardrails;
pub mod instruction;
pub mod llm;
pub mod runtime;

pub use runtime::{AgentSettings, ChatInput, ChatReply, ReplyIntent, VirtualAgent};
