/// Command, button, callback and inline-mode handlers
pub mod handlers;
/// Retry wrappers for outbound Telegram operations
pub mod resilient;
/// Per-user conversation state tracking
pub mod session;
