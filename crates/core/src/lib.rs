pub mod catalog;
pub mod config;
pub mod domain;
pub mod errors;

pub use catalog::{Catalog, CatalogError};
pub use domain::account::{format_cents, format_long_date, Account, AccountProfile, SharedAccount};
pub use domain::card::{CardCommand, CardId, CardResource, CardStatus, CardTransition};
pub use domain::classification::{Intent, Sentiment};
pub use domain::conversation::{ChatTurn, ConversationState, Role, TurnTag};
pub use errors::{ApplicationError, DomainError, InterfaceError};
