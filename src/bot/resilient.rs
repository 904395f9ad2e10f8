//! Outbound messaging with automatic retry on transient Telegram failures.
//!
//! Polling hiccups and short network outages should not drop a reply on the
//! floor, so every message the bot sends or edits goes through an
//! exponential-backoff retry with jitter. Errors surviving all attempts are
//! returned to the caller, which logs and moves on.

use anyhow::Result;
use std::time::Duration;
use teloxide::prelude::*;
use teloxide::types::{ChatId, InlineKeyboardMarkup, Message, MessageId, ParseMode, ReplyMarkup};
use tokio_retry::strategy::{jitter, ExponentialBackoff};
use tokio_retry::Retry;
use tracing::warn;

const INITIAL_BACKOFF_MS: u64 = 250;
const MAX_BACKOFF_MS: u64 = 4000;
const MAX_RETRIES: usize = 3;

/// Retries a Telegram API operation with exponential backoff and jitter.
async fn retry_telegram_operation<F, Fut, T>(operation: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T>>,
{
    let retry_strategy = ExponentialBackoff::from_millis(INITIAL_BACKOFF_MS)
        .max_delay(Duration::from_millis(MAX_BACKOFF_MS))
        .map(jitter)
        .take(MAX_RETRIES);

    Retry::spawn(retry_strategy, operation).await.map_err(|e| {
        warn!(
            "Telegram API operation failed after {} attempts: {}",
            MAX_RETRIES, e
        );
        e
    })
}

/// Sends an HTML-formatted message, optionally with an inline keyboard.
///
/// # Errors
///
/// Returns the last Telegram error once all retries are exhausted.
pub async fn send_html_resilient(
    bot: &Bot,
    chat_id: ChatId,
    text: impl Into<String>,
    keyboard: Option<ReplyMarkup>,
) -> Result<Message> {
    let text = text.into();
    retry_telegram_operation(|| async {
        let mut req = bot
            .send_message(chat_id, text.clone())
            .parse_mode(ParseMode::Html);
        if let Some(kb) = keyboard.clone() {
            req = req.reply_markup(kb);
        }
        req.await
            .map_err(|e| anyhow::anyhow!("Telegram send error: {e}"))
    })
    .await
}

/// Edits a message in place, optionally replacing its inline keyboard.
///
/// # Errors
///
/// Returns the last Telegram error once all retries are exhausted.
pub async fn edit_html_resilient(
    bot: &Bot,
    chat_id: ChatId,
    msg_id: MessageId,
    text: impl Into<String>,
    keyboard: Option<InlineKeyboardMarkup>,
) -> Result<Message> {
    let text = text.into();
    retry_telegram_operation(|| async {
        let mut req = bot
            .edit_message_text(chat_id, msg_id, text.clone())
            .parse_mode(ParseMode::Html);
        if let Some(kb) = keyboard.clone() {
            req = req.reply_markup(kb);
        }
        req.await
            .map_err(|e| anyhow::anyhow!("Telegram edit error: {e}"))
    })
    .await
}
