//! Core layer: rate limiting, the completion seam, transport interfaces,
//! configuration and reply texts

pub mod completion;
pub mod config;
pub mod rate_limiter;
pub mod replies;
pub mod transport;
