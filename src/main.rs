use dotenvy::dotenv;
use std::sync::Arc;
use teloxide::dispatching::UpdateHandler;
use teloxide::prelude::*;
use teloxide::types::{CallbackQuery, InlineQuery};
use tracing::{error, info};
use tracing_subscriber::{prelude::*, EnvFilter};
use vx_coder_bot::bot::handlers::{self, Command};
use vx_coder_bot::bot::session::SessionTracker;
use vx_coder_bot::config::Settings;

#[tokio::main]
async fn main() {
    // Load .env file
    dotenv().ok();

    init_logging();

    info!("Starting VX Coder Bot...");

    let settings = init_settings();
    let bot = Bot::new(settings.telegram_token.clone());
    let sessions = Arc::new(SessionTracker::new());
    let handler = setup_handler();

    info!("Bot is running...");

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![settings, sessions])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_settings() -> Arc<Settings> {
    match Settings::new() {
        Ok(s) => {
            info!("Configuration loaded successfully.");
            Arc::new(s)
        }
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    }
}

fn setup_handler() -> UpdateHandler<teloxide::RequestError> {
    dptree::entry()
        .branch(Update::filter_callback_query().endpoint(handle_callback_event))
        .branch(Update::filter_inline_query().endpoint(handle_inline_event))
        .branch(
            Update::filter_message()
                .branch(
                    dptree::entry()
                        .filter_command::<Command>()
                        .endpoint(handle_command),
                )
                .branch(
                    Update::filter_message()
                        .filter(|msg: Message| msg.text().is_some())
                        .endpoint(handle_text_event),
                ),
        )
}

async fn handle_command(
    bot: Bot,
    msg: Message,
    cmd: Command,
    sessions: Arc<SessionTracker>,
) -> Result<(), teloxide::RequestError> {
    let res = match cmd {
        Command::Start => handlers::start(bot, msg).await,
        Command::Help => handlers::help(bot, msg).await,
        Command::Encrypt => handlers::request_encrypt_input(bot, msg, sessions).await,
        Command::Decrypt => handlers::request_decrypt_input(bot, msg, sessions).await,
    };
    if let Err(e) = res {
        error!("Command error: {}", e);
    }
    respond(())
}

async fn handle_text_event(
    bot: Bot,
    msg: Message,
    sessions: Arc<SessionTracker>,
    settings: Arc<Settings>,
) -> Result<(), teloxide::RequestError> {
    if let Err(e) = handlers::handle_text(bot, msg, sessions, settings).await {
        error!("Text handler error: {}", e);
    }
    respond(())
}

async fn handle_callback_event(bot: Bot, q: CallbackQuery) -> Result<(), teloxide::RequestError> {
    if let Err(e) = handlers::handle_callback(bot, q).await {
        error!("Callback handler error: {}", e);
    }
    respond(())
}

async fn handle_inline_event(bot: Bot, q: InlineQuery) -> Result<(), teloxide::RequestError> {
    if let Err(e) = handlers::handle_inline_query(bot, q).await {
        error!("Inline query handler error: {}", e);
    }
    respond(())
}
