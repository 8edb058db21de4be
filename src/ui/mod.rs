//! Terminal front end
//!
//! The chat view for streaming sessions and listings for backend records.

pub mod chat;
pub mod tables;

pub use chat::run_chat;
