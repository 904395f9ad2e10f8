//! Command, button, callback and inline-mode handlers.
//!
//! Routing order for free text mirrors the user's mental model: button
//! labels first, then whatever transform the user was asked to provide
//! input for, then the auto-detection fallback. Anything else is ignored.

use crate::bot::resilient::{edit_html_resilient, send_html_resilient};
use crate::bot::session::{ConversationState, SessionTracker};
use crate::codec;
use crate::config::Settings;
use anyhow::Result;
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::types::{
    CallbackQuery, InlineKeyboardButton, InlineKeyboardMarkup, InlineQuery, InlineQueryResult,
    InlineQueryResultArticle, InputMessageContent, InputMessageContentText, KeyboardButton,
    KeyboardMarkup, ParseMode,
};
use teloxide::utils::command::BotCommands;
use tracing::{info, warn};

// Reply-keyboard labels are user-visible triggers and part of the bot's
// surface; changing them orphans keyboards already shown in chats.

/// Label arming the encode state.
pub const BTN_ENCRYPT: &str = "🔒 Encrypt";
/// Label arming the decode state.
pub const BTN_DECRYPT: &str = "🔓 Decrypt";
/// Label for the developer-contact view.
pub const BTN_ABOUT: &str = "👤 About Me";
/// Label for the channel-links view.
pub const BTN_CHANNELS: &str = "📢 Channels";

const BTN_INLINE_DECRYPT: &str = "🔓 Decrypt";
const BTN_INLINE_ENCRYPT_AGAIN: &str = "🔒 Encrypt Again";

const ENCRYPT_CALLBACK_PREFIX: &str = "encrypt:";
const DECRYPT_CALLBACK_PREFIX: &str = "decrypt:";

/// Supported bot commands.
#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase", description = "Supported commands:")]
pub enum Command {
    /// Welcome message with the main keyboard.
    #[command(description = "Show the welcome message.")]
    Start,
    /// Command summary.
    #[command(description = "Show usage help.")]
    Help,
    /// Arm the encode state, same as the Encrypt button.
    #[command(description = "Encrypt your next message.")]
    Encrypt,
    /// Arm the decode state, same as the Decrypt button.
    #[command(description = "Decrypt your next message.")]
    Decrypt,
}

/// A parsed inline-button press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackAction {
    /// Encrypt the carried plaintext.
    Encrypt(String),
    /// Decrypt the carried candidate text.
    Decrypt(String),
}

impl CallbackAction {
    /// Parses callback data of the form `encrypt:<payload>` or
    /// `decrypt:<payload>`. Anything else is not ours.
    #[must_use]
    pub fn parse(data: &str) -> Option<Self> {
        if let Some(payload) = data.strip_prefix(ENCRYPT_CALLBACK_PREFIX) {
            Some(Self::Encrypt(payload.to_string()))
        } else {
            data.strip_prefix(DECRYPT_CALLBACK_PREFIX)
                .map(|payload| Self::Decrypt(payload.to_string()))
        }
    }
}

/// The persistent reply keyboard shown under the input field.
#[must_use]
pub fn main_keyboard() -> KeyboardMarkup {
    let keyboard = vec![
        vec![
            KeyboardButton::new(BTN_ENCRYPT),
            KeyboardButton::new(BTN_DECRYPT),
        ],
        vec![
            KeyboardButton::new(BTN_ABOUT),
            KeyboardButton::new(BTN_CHANNELS),
        ],
    ];
    KeyboardMarkup::new(keyboard).resize_keyboard()
}

fn decrypt_keyboard(encoded: &str) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::callback(
        BTN_INLINE_DECRYPT,
        format!("{DECRYPT_CALLBACK_PREFIX}{encoded}"),
    )]])
}

fn encrypt_again_keyboard(plaintext: &str) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::callback(
        BTN_INLINE_ENCRYPT_AGAIN,
        format!("{ENCRYPT_CALLBACK_PREFIX}{plaintext}"),
    )]])
}

fn encrypted_view(encoded: &str) -> String {
    format!(
        "<b>Encrypted Text:</b>\n\n<code>{}</code>",
        html_escape::encode_text(encoded)
    )
}

fn decrypted_view(decoded: &str) -> String {
    format!(
        "<b>Decrypted Text:</b>\n\n<code>{}</code>",
        html_escape::encode_text(decoded)
    )
}

fn auto_decrypted_view(decoded: &str) -> String {
    format!(
        "<b>Auto-Detected Encrypted Text! Decrypted:</b>\n\n<code>{}</code>",
        html_escape::encode_text(decoded)
    )
}

fn welcome_view() -> String {
    format!(
        "<b>Welcome to VX Encoder &amp; Decoder Bot</b> 👋\n\n\
         📚 <b>Bot Functionality:</b>\n\n\
         You send your text to the bot and it encrypts it. For example:\n\n\
         <code>echo \"hello how are you\";</code>\n\n\
         The bot will encrypt this text and convert it to:\n\n\
         <code>{}</code>\n\n\
         If you want to decrypt it, press the {BTN_DECRYPT} button and send the encrypted text.\n\n\
         <b>You can also use inline mode by typing the bot's username in any chat!</b>",
        codec::encode("echo \"hello how are you\";")
    )
}

/// `/start`: welcome message, main keyboard, best-effort pin.
///
/// # Errors
///
/// Returns an error if the welcome message cannot be sent. Pin failures are
/// logged and ignored; bots lack pin rights in most private chats.
pub async fn start(bot: Bot, msg: Message) -> Result<()> {
    let welcome = send_html_resilient(
        &bot,
        msg.chat.id,
        welcome_view(),
        Some(main_keyboard().into()),
    )
    .await?;

    if let Err(e) = bot
        .pin_chat_message(msg.chat.id, welcome.id)
        .disable_notification(true)
        .await
    {
        warn!("Cannot pin welcome message in chat {}: {}", msg.chat.id, e);
    }

    Ok(())
}

/// `/help`: command summary plus the main keyboard.
///
/// # Errors
///
/// Returns an error if sending fails.
pub async fn help(bot: Bot, msg: Message) -> Result<()> {
    let text = format!(
        "{}\n\nOr use the {BTN_ENCRYPT} / {BTN_DECRYPT} buttons below.",
        Command::descriptions()
    );
    bot.send_message(msg.chat.id, text)
        .reply_markup(main_keyboard())
        .await?;
    Ok(())
}

/// Shows channel links from the settings.
///
/// # Errors
///
/// Returns an error if sending fails.
pub async fn show_channels(bot: Bot, msg: Message, settings: Arc<Settings>) -> Result<()> {
    let links = settings
        .channels()
        .iter()
        .map(|handle| channel_link(handle))
        .collect::<Vec<_>>()
        .join("\n");

    bot.send_message(msg.chat.id, format!("<b>Join our channels:</b>\n\n{links}"))
        .parse_mode(ParseMode::Html)
        .await?;
    Ok(())
}

/// Shows the developer contact from the settings.
///
/// # Errors
///
/// Returns an error if sending fails.
pub async fn show_about(bot: Bot, msg: Message, settings: Arc<Settings>) -> Result<()> {
    let contact = channel_link(&settings.developer_contact);
    bot.send_message(
        msg.chat.id,
        format!("<b>Developer information:</b>\n\n{contact}"),
    )
    .parse_mode(ParseMode::Html)
    .await?;
    Ok(())
}

fn channel_link(handle: &str) -> String {
    let name = handle.trim_start_matches('@');
    format!(
        "<a href=\"https://t.me/{name}\">@{}</a>",
        html_escape::encode_text(name)
    )
}

/// Arms the encode state and prompts for input.
///
/// # Errors
///
/// Returns an error if the prompt cannot be sent.
pub async fn request_encrypt_input(
    bot: Bot,
    msg: Message,
    sessions: Arc<SessionTracker>,
) -> Result<()> {
    let Some(user) = msg.from.as_ref() else {
        return Ok(());
    };
    sessions
        .set(user.id, ConversationState::AwaitingEncodeInput)
        .await;
    bot.send_message(
        msg.chat.id,
        "<b>Please enter the text you want to encrypt:</b>",
    )
    .parse_mode(ParseMode::Html)
    .await?;
    Ok(())
}

/// Arms the decode state and prompts for input.
///
/// # Errors
///
/// Returns an error if the prompt cannot be sent.
pub async fn request_decrypt_input(
    bot: Bot,
    msg: Message,
    sessions: Arc<SessionTracker>,
) -> Result<()> {
    let Some(user) = msg.from.as_ref() else {
        return Ok(());
    };
    sessions
        .set(user.id, ConversationState::AwaitingDecodeInput)
        .await;
    bot.send_message(
        msg.chat.id,
        "<b>Please enter the text you want to decrypt:</b>",
    )
    .parse_mode(ParseMode::Html)
    .await?;
    Ok(())
}

/// Routes a free-text message: button labels, then the armed state, then
/// auto-detection. Messages that match none of these are left alone.
///
/// # Errors
///
/// Returns an error if a reply cannot be sent.
pub async fn handle_text(
    bot: Bot,
    msg: Message,
    sessions: Arc<SessionTracker>,
    settings: Arc<Settings>,
) -> Result<()> {
    let Some(text) = msg.text() else {
        return Ok(());
    };
    let Some(user) = msg.from.as_ref() else {
        return Ok(());
    };

    match text {
        BTN_ENCRYPT => return request_encrypt_input(bot, msg, sessions).await,
        BTN_DECRYPT => return request_decrypt_input(bot, msg, sessions).await,
        BTN_ABOUT => return show_about(bot, msg, settings).await,
        BTN_CHANNELS => return show_channels(bot, msg, settings).await,
        _ => {}
    }

    match sessions.take(user.id).await {
        ConversationState::AwaitingEncodeInput => {
            let encoded = codec::encode(text);
            send_html_resilient(
                &bot,
                msg.chat.id,
                encrypted_view(&encoded),
                Some(decrypt_keyboard(&encoded).into()),
            )
            .await?;
        }
        ConversationState::AwaitingDecodeInput => {
            let decoded = codec::decode(text);
            send_html_resilient(
                &bot,
                msg.chat.id,
                decrypted_view(&decoded),
                Some(encrypt_again_keyboard(&decoded).into()),
            )
            .await?;
        }
        ConversationState::Idle => {
            if codec::looks_encoded(text) {
                info!("Auto-detected encoded text from user {}", user.id);
                let decoded = codec::decode(text);
                send_html_resilient(
                    &bot,
                    msg.chat.id,
                    auto_decrypted_view(&decoded),
                    Some(encrypt_again_keyboard(&decoded).into()),
                )
                .await?;
            }
            // Ordinary chatter: nothing to do.
        }
    }

    Ok(())
}

/// Handles an inline-button press: run the opposite-direction transform and
/// rewrite the message in place.
///
/// # Errors
///
/// Returns an error if the edit fails after retries.
pub async fn handle_callback(bot: Bot, q: CallbackQuery) -> Result<()> {
    let Some(action) = q.data.as_deref().and_then(CallbackAction::parse) else {
        return Ok(());
    };

    // Stop the button spinner; failure here is cosmetic.
    let _ = bot.answer_callback_query(q.id.clone()).await;

    let Some(message) = q.message.as_ref() else {
        return Ok(());
    };
    let chat_id = message.chat().id;
    let msg_id = message.id();

    match action {
        CallbackAction::Encrypt(plaintext) => {
            let encoded = codec::encode(&plaintext);
            edit_html_resilient(
                &bot,
                chat_id,
                msg_id,
                encrypted_view(&encoded),
                Some(decrypt_keyboard(&encoded)),
            )
            .await?;
        }
        CallbackAction::Decrypt(candidate) => {
            let decoded = codec::decode(&candidate);
            edit_html_resilient(
                &bot,
                chat_id,
                msg_id,
                decrypted_view(&decoded),
                Some(encrypt_again_keyboard(&decoded)),
            )
            .await?;
        }
    }

    Ok(())
}

/// Answers an inline-mode query with an Encrypt article, plus a Decrypt
/// article when the query itself looks encoded.
///
/// # Errors
///
/// Returns an error if the answer cannot be delivered.
pub async fn handle_inline_query(bot: Bot, q: InlineQuery) -> Result<()> {
    let text = if q.query.is_empty() {
        "Type something to encrypt/decrypt"
    } else {
        q.query.as_str()
    };

    let mut results = Vec::with_capacity(2);

    let encoded = codec::encode(text);
    results.push(InlineQueryResult::Article(inline_article(
        "1",
        "🔒 Encrypt Text",
        format!("Encrypt: {}", truncate_for_preview(text)),
        encrypted_view(&encoded),
        decrypt_keyboard(&encoded),
    )));

    if codec::looks_encoded(text) {
        let decoded = codec::decode(text);
        results.push(InlineQueryResult::Article(inline_article(
            "2",
            "🔓 Decrypt Text",
            format!("Decrypt: {}", truncate_for_preview(text)),
            decrypted_view(&decoded),
            encrypt_again_keyboard(&decoded),
        )));
    }

    bot.answer_inline_query(q.id, results).cache_time(1).await?;
    Ok(())
}

fn inline_article(
    id: &str,
    title: &str,
    description: String,
    message_html: String,
    keyboard: InlineKeyboardMarkup,
) -> InlineQueryResultArticle {
    let mut content = InputMessageContentText::new(message_html);
    content.parse_mode = Some(ParseMode::Html);

    let mut article =
        InlineQueryResultArticle::new(id, title, InputMessageContent::Text(content));
    article.description = Some(description);
    article.reply_markup = Some(keyboard);
    article
}

/// Clips inline-result descriptions to a readable length, respecting char
/// boundaries.
fn truncate_for_preview(text: &str) -> String {
    const PREVIEW_CHARS: usize = 20;
    if text.chars().count() <= PREVIEW_CHARS {
        text.to_string()
    } else {
        let clipped: String = text.chars().take(PREVIEW_CHARS).collect();
        format!("{clipped}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn callback_parse_recognizes_both_prefixes() {
        assert_eq!(
            CallbackAction::parse("encrypt:hello"),
            Some(CallbackAction::Encrypt("hello".to_string()))
        );
        assert_eq!(
            CallbackAction::parse("decrypt:VX_ENCRYPTED:aGk="),
            Some(CallbackAction::Decrypt("VX_ENCRYPTED:aGk=".to_string()))
        );
    }

    #[test]
    fn callback_parse_rejects_foreign_data() {
        assert_eq!(CallbackAction::parse("unknown:payload"), None);
        assert_eq!(CallbackAction::parse("encrypt"), None);
        assert_eq!(CallbackAction::parse(""), None);
    }

    #[test]
    fn callback_parse_keeps_empty_payload() {
        assert_eq!(
            CallbackAction::parse("encrypt:"),
            Some(CallbackAction::Encrypt(String::new()))
        );
    }

    #[test]
    fn views_escape_user_text() {
        let view = encrypted_view("<script>");
        assert!(view.contains("&lt;script&gt;"));
        assert!(!view.contains("<script>"));
    }

    #[test]
    fn preview_truncation_respects_char_boundaries() {
        assert_eq!(truncate_for_preview("short"), "short");
        let long = "это довольно длинная строка текста";
        let preview = truncate_for_preview(long);
        assert!(preview.ends_with("..."));
        assert_eq!(preview.chars().count(), 23);
    }

    #[test]
    fn main_keyboard_exposes_all_four_triggers() {
        let kb = main_keyboard();
        let labels: Vec<&str> = kb
            .keyboard
            .iter()
            .flatten()
            .map(|b| b.text.as_str())
            .collect();
        assert_eq!(labels, vec![BTN_ENCRYPT, BTN_DECRYPT, BTN_ABOUT, BTN_CHANNELS]);
    }
}
