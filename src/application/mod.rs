//! Application layer: per-message orchestration and the polling loop

pub mod bot;
pub mod orchestrator;
