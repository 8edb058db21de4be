//! llm-manager library
//!
//! Console client for a local LLM inference backend: preset and model
//! management over REST and streaming chat sessions over WebSocket.

pub mod api;
pub mod session;
pub mod storage;
pub mod types;
pub mod ui;
