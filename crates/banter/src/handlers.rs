// SPDX-FileCopyrightText: 2026 Banter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message routing and the four conversation flows.
//!
//! Every message that survives the allow list is captured into the store
//! first; the reply gate and command routing only decide what, if
//! anything, the bot says back. Store and provider failures are logged
//! and end the affected flow without taking the process down.

use std::sync::Arc;

use teloxide::net::Download;
use teloxide::prelude::*;
use teloxide::types::{ChatId, InputFile, Message};
use tracing::{debug, error, info, warn};

use banter_config::BanterConfig;
use banter_context::{MISSING_STATE_PAYLOAD, render_overview_prompt, render_reply_prompt};
use banter_core::ConversationStore;
use banter_openai::ChatClient;
use banter_telegram::export::ExportBundle;
use banter_telegram::{BotIdentity, from_telegram, gate};

/// Prompt template for conversational replies.
const CHAT_MESSAGE_TEMPLATE: &str = include_str!("prompts/chat_message.txt");

/// Prompt template for the history overview analysis.
const CHAT_OVERVIEW_TEMPLATE: &str = include_str!("prompts/chat_overview.txt");

/// Generic user-facing apology for failures that are logged in detail.
const APOLOGY: &str = "Sorry, something went wrong on my side. Please try again later.";

/// Everything a handler invocation needs, built once in `serve`.
pub struct App {
    pub config: BanterConfig,
    pub store: Arc<dyn ConversationStore>,
    pub reply_client: ChatClient,
    pub overview_client: ChatClient,
    pub identity: BotIdentity,
}

/// The reply model answers with this JSON object; only the message part is
/// consumed, the analysis field exists to make the model think first.
#[derive(Debug, serde::Deserialize)]
struct ReplyPayload {
    #[serde(default)]
    response_message: String,
}

/// Entry point for every inbound message.
pub async fn process_message(bot: &Bot, app: &App, msg: &Message) {
    let chat_id = msg.chat.id;

    // Allow-list gate.
    if !gate::is_chat_allowed(&app.config.telegram.allowed_chat_ids, chat_id.0) {
        warn!(chat_id = chat_id.0, "rejecting message from unauthorized chat");
        send_text(bot, chat_id, "Sorry, this bot is not available in this chat.").await;
        return;
    }

    // Capture history before routing, commands and media included. The
    // message is lost for this conversation if the store is down; the
    // process keeps serving everyone else.
    if let Err(error) = app.store.append_message(chat_id.0, from_telegram(msg)).await {
        error!(chat_id = chat_id.0, %error, "failed to store inbound message");
        return;
    }

    // Reply gate.
    if !gate::should_reply(msg, &app.identity, app.config.telegram.group_reply_probability) {
        return;
    }

    // Routing.
    let text = msg.text().unwrap_or_default();
    if let Some((command, args)) = parse_command(text) {
        match command {
            "persona" => handle_persona(bot, app, msg, args).await,
            "overview" => handle_overview(bot, app, msg).await,
            // Unknown commands are just conversation.
            _ => handle_reply(bot, app, msg).await,
        }
        return;
    }

    if is_json_document(msg) {
        handle_import(bot, app, msg).await;
        return;
    }

    if text.is_empty() {
        debug!(chat_id = chat_id.0, "ignoring non-text message");
        return;
    }

    handle_reply(bot, app, msg).await;
}

/// Conversational reply flow: window the history, ask the reply model,
/// relay its message, and record what was sent.
async fn handle_reply(bot: &Bot, app: &App, msg: &Message) {
    let chat_id = msg.chat.id;

    let state = match app.store.state(chat_id.0).await {
        Ok(state) => state,
        Err(error) => {
            error!(chat_id = chat_id.0, %error, "failed to load chat state");
            send_text(bot, chat_id, APOLOGY).await;
            return;
        }
    };

    let prompt = match render_reply_prompt(
        CHAT_MESSAGE_TEMPLATE,
        state.as_ref(),
        &app.identity.mention(),
        app.config.context.history_budget,
        app.config.context.recent_count,
    ) {
        Ok(prompt) => prompt,
        Err(error) => {
            error!(chat_id = chat_id.0, %error, "failed to assemble reply prompt");
            send_text(bot, chat_id, APOLOGY).await;
            return;
        }
    };

    if prompt == MISSING_STATE_PAYLOAD {
        send_text(bot, chat_id, "I have no history for this chat yet. Say something first!").await;
        return;
    }

    let raw = match app.reply_client.complete(&prompt, true).await {
        Ok(raw) => raw,
        Err(error) => {
            error!(chat_id = chat_id.0, %error, "reply model call failed");
            return;
        }
    };

    match serde_json::from_str::<ReplyPayload>(&raw) {
        Ok(payload) => {
            let reply = payload.response_message.trim();
            if !reply.is_empty() {
                send_and_record(bot, app, chat_id, reply).await;
            }
        }
        Err(error) => {
            debug!(chat_id = chat_id.0, %error, "reply model returned malformed JSON");
            send_and_record(bot, app, chat_id, &format_fallback(&raw)).await;
        }
    }
}

/// `/persona <description>`: stores the character prompt for this chat.
async fn handle_persona(bot: &Bot, app: &App, msg: &Message, args: &str) {
    if !msg.chat.is_private() {
        return;
    }
    let chat_id = msg.chat.id;

    if args.is_empty() {
        send_text(
            bot,
            chat_id,
            "Usage: /persona <character description>\n\
             Please provide a character description to set as the prompt.",
        )
        .await;
        return;
    }

    if let Err(error) = app.store.set_prompt(chat_id.0, args).await {
        error!(chat_id = chat_id.0, %error, "failed to store persona prompt");
        send_text(bot, chat_id, APOLOGY).await;
        return;
    }

    send_text(
        bot,
        chat_id,
        "Character prompt has been set. The bot will respond according to this character description.",
    )
    .await;
}

/// `/overview`: analyses the stored history with the overview model,
/// caches the result as the chat summary, and delivers it as a document.
async fn handle_overview(bot: &Bot, app: &App, msg: &Message) {
    let chat_id = msg.chat.id;

    // Private chats only, to avoid spamming groups with documents.
    if !msg.chat.is_private() {
        send_text(bot, chat_id, "This command can only be used in private chats").await;
        return;
    }

    send_text(bot, chat_id, "Analyzing chat history... This might take a moment.").await;

    let state = match app.store.state(chat_id.0).await {
        Ok(state) => state,
        Err(error) => {
            error!(chat_id = chat_id.0, %error, "failed to load chat state");
            send_text(bot, chat_id, APOLOGY).await;
            return;
        }
    };
    let state = match state {
        Some(state) if !state.messages.is_empty() => state,
        _ => {
            send_text(bot, chat_id, "No chat history found. Please import a chat first.").await;
            return;
        }
    };

    let prompt = match render_overview_prompt(
        CHAT_OVERVIEW_TEMPLATE,
        &state,
        &app.identity.descriptor(),
        app.config.context.overview_budget,
    ) {
        Ok(prompt) => prompt,
        Err(error) => {
            error!(chat_id = chat_id.0, %error, "failed to assemble overview prompt");
            send_text(bot, chat_id, "Error processing chat history").await;
            return;
        }
    };

    let analysis = match app.overview_client.complete(&prompt, false).await {
        Ok(analysis) => analysis,
        Err(error) => {
            error!(chat_id = chat_id.0, %error, "overview model call failed");
            send_text(bot, chat_id, "Error analyzing chat. Please try again later.").await;
            return;
        }
    };

    // Cache the summary for future reply prompts. The analysis is still
    // delivered even if caching fails.
    if let Err(error) = app.store.set_summary(chat_id.0, &analysis).await {
        error!(chat_id = chat_id.0, %error, "failed to store chat summary");
    }

    let document = InputFile::memory(analysis.into_bytes()).file_name("chat_analysis.txt");
    if let Err(error) = bot
        .send_document(chat_id, document)
        .caption("\u{1F4CA} Chat Analysis")
        .await
    {
        error!(chat_id = chat_id.0, %error, "failed to send analysis document");
    }
}

/// Export import flow: download the attached JSON bundle, normalize it,
/// and replace the bundle's conversation wholesale.
async fn handle_import(bot: &Bot, app: &App, msg: &Message) {
    if !msg.chat.is_private() {
        return;
    }
    let chat_id = msg.chat.id;
    let Some(document) = msg.document() else {
        return;
    };

    info!(
        chat_id = chat_id.0,
        file_name = document.file_name.as_deref().unwrap_or(""),
        size = document.file.size,
        "received export file"
    );

    let file = match bot.get_file(document.file.id.clone()).await {
        Ok(file) => file,
        Err(error) => {
            error!(chat_id = chat_id.0, %error, "failed to look up export file");
            return;
        }
    };

    let mut buffer = std::io::Cursor::new(Vec::new());
    if let Err(error) = bot.download_file(&file.path, &mut buffer).await {
        error!(chat_id = chat_id.0, %error, "failed to download export file");
        return;
    }

    let bundle = match ExportBundle::from_slice(&buffer.into_inner()) {
        Ok(bundle) => bundle,
        Err(error) => {
            error!(chat_id = chat_id.0, %error, "export file is not a chat export");
            send_text(bot, chat_id, "That JSON file does not look like a chat export.").await;
            return;
        }
    };

    let messages = bundle.canonical_messages();
    let count = messages.len();
    // The history lands under the exported chat's own id, which is not
    // necessarily the chat the file was sent from.
    if let Err(error) = app.store.import_messages(bundle.id, messages).await {
        error!(chat_id = chat_id.0, export_id = bundle.id, %error, "failed to import chat export");
        send_text(bot, chat_id, APOLOGY).await;
        return;
    }

    send_text(
        bot,
        chat_id,
        &format!(
            "Successfully imported chat export with {count} messages from chat {}",
            bundle.name
        ),
    )
    .await;
}

/// Sends a message and records the sent copy in the chat history.
async fn send_and_record(bot: &Bot, app: &App, chat_id: ChatId, text: &str) {
    match bot.send_message(chat_id, text).await {
        Ok(sent) => {
            if let Err(error) = app.store.append_message(chat_id.0, from_telegram(&sent)).await {
                error!(chat_id = chat_id.0, %error, "failed to store bot reply");
            }
        }
        Err(error) => error!(chat_id = chat_id.0, %error, "failed to send message"),
    }
}

/// Sends a plain status/service message (not recorded in history).
async fn send_text(bot: &Bot, chat_id: ChatId, text: &str) {
    if let Err(error) = bot.send_message(chat_id, text).await {
        error!(chat_id = chat_id.0, %error, "failed to send message");
    }
}

/// Splits `/cmd@botname args` into the bare command name and its trimmed
/// argument string. Returns `None` for non-command text.
pub fn parse_command(text: &str) -> Option<(&str, &str)> {
    let rest = text.strip_prefix('/')?;
    let token_end = rest.find(char::is_whitespace).unwrap_or(rest.len());
    let (token, args) = rest.split_at(token_end);
    let command = token.split('@').next().unwrap_or(token);
    if command.is_empty() {
        return None;
    }
    Some((command, args.trim()))
}

/// A document message whose file name ends in `.json`.
pub fn is_json_document(msg: &Message) -> bool {
    msg.document()
        .and_then(|doc| doc.file_name.as_deref())
        .is_some_and(|name| std::path::Path::new(name).extension().is_some_and(|ext| ext == "json"))
}

/// Apology sent when the reply model does not return valid JSON, carrying
/// the raw output truncated to Telegram-friendly length.
fn format_fallback(raw: &str) -> String {
    let mut fallback = format!("Sorry, I had trouble formatting my response. Raw output: {raw}");
    if fallback.len() > 4000 {
        let mut end = 4000;
        while !fallback.is_char_boundary(end) {
            end -= 1;
        }
        fallback.truncate(end);
        fallback.push_str("...");
    }
    fallback
}
