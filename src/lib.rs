#![deny(missing_docs)]
//! VX Coder Bot
//!
//! A Telegram bot offering a reversible text transformation: base64
//! encoding behind a fixed tag prefix, driven by chat commands, reply
//! buttons, inline keyboards and inline-mode queries.

/// Telegram bot implementation
pub mod bot;
/// Tagged base64 transform engine
pub mod codec;
/// Configuration management
pub mod config;
