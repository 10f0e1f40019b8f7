//! Infrastructure layer: external systems
//!
//! The hosted LLM, the Telegram Bot API and log output

pub mod llm;
pub mod logger;
pub mod telegram;
