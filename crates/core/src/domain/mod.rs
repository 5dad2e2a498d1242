pub mod account;
pub mod card;
pub mod classification;
pub mod conversation;
