//! Domain layer
//!
//! Message and command entities shared by every other layer

pub mod command;
pub mod message;

pub use command::Command;
pub use message::*;
