//! Quote relay: turns web-form quote requests into emails for the business inbox.

pub mod api;
pub mod config;
pub mod error;
pub mod mail;
pub mod quote;
