//! # Recap
//!
//! A terminal client for a remote summarisation service.
//!
//! ## Features
//!
//! - **Summarise**: send a URL and a style, get back a summary and key insights
//! - **Converse**: ask follow-up questions within the session the service opened
//! - **Server-authoritative history**: the conversation shown is always the one the service returned

pub mod client;
pub mod config;
pub mod session;
pub mod summary;
pub mod ui;

pub use client::{ClientError, ServiceClient};
pub use config::Config;
pub use session::{Outcome, Rejected, SessionState};
pub use summary::{ContentType, Exchange, Style, SummaryResult};
