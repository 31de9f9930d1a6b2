// SPDX-FileCopyrightText: 2026 Banter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end tests for the message pipeline.
//!
//! Drives `process_message` against an in-memory store, a mock Telegram
//! Bot API server and a mock completion endpoint, so the full
//! capture -> gate -> prompt -> reply -> record path runs without any live
//! service.

use std::sync::Arc;

use serde_json::json;
use teloxide::Bot;
use teloxide::types::{Message, UserId};
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

use banter::handlers::{self, App};
use banter_config::BanterConfig;
use banter_core::ConversationStore;
use banter_openai::ChatClient;
use banter_storage::ChatStore;
use banter_telegram::BotIdentity;
use banter_test_utils::MemoryBackend;

const CHAT_ID: i64 = 12345;

fn inbound(overrides: serde_json::Value) -> Message {
    let mut base = json!({
        "message_id": 100,
        "date": 1_700_000_000i64,
        "chat": {"id": CHAT_ID, "type": "private", "first_name": "Test"},
        "from": {"id": 7u64, "is_bot": false, "first_name": "Ada"},
    });
    if let (Some(base_map), Some(overlay)) = (base.as_object_mut(), overrides.as_object()) {
        for (key, value) in overlay {
            base_map.insert(key.clone(), value.clone());
        }
    }
    serde_json::from_value(base).expect("failed to deserialize mock message")
}

/// A `sendMessage` result that echoes what the bot would have sent.
fn sent_message(text: &str) -> serde_json::Value {
    json!({
        "ok": true,
        "result": {
            "message_id": 900,
            "date": 1_700_000_500i64,
            "chat": {"id": CHAT_ID, "type": "private", "first_name": "Test"},
            "from": {"id": 999u64, "is_bot": true, "first_name": "Banter", "username": "banterbot"},
            "text": text,
        }
    })
}

fn completion(content: &str) -> serde_json::Value {
    json!({
        "id": "cmpl-1",
        "object": "chat.completion",
        "choices": [
            {"index": 0, "message": {"role": "assistant", "content": content}}
        ],
    })
}

struct TestStack {
    telegram: MockServer,
    #[allow(dead_code)]
    model: MockServer,
    bot: Bot,
    app: App,
    store: Arc<dyn ConversationStore>,
}

/// Builds the full stack: in-memory store, mock servers, default config.
async fn stack(config: BanterConfig, model_content: &str) -> TestStack {
    let telegram = MockServer::start().await;
    let model = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(model_content)))
        .mount(&model)
        .await;

    let store: Arc<dyn ConversationStore> = Arc::new(ChatStore::new(MemoryBackend::new()));
    let reply_client = ChatClient::new(&model.uri(), "test-key", "grok-3-mini-beta")
        .unwrap()
        .with_reasoning_effort(Some("low".into()));
    let overview_client = ChatClient::new(&model.uri(), "test-key", "gemini-2.5-pro").unwrap();

    let app = App {
        config,
        store: Arc::clone(&store),
        reply_client,
        overview_client,
        identity: BotIdentity {
            id: UserId(999),
            username: "banterbot".into(),
            first_name: "Banter".into(),
            last_name: String::new(),
        },
    };

    let api_url = reqwest::Url::parse(&format!("{}/", telegram.uri())).unwrap();
    let bot = Bot::new("123456:TEST").set_api_url(api_url);

    TestStack {
        telegram,
        model,
        bot,
        app,
        store,
    }
}

#[tokio::test]
async fn reply_flow_records_both_sides_of_the_exchange() {
    let payload = r#"{"conversation_analysis":"calm","response_message":"Ahoy!"}"#;
    let stack = stack(BanterConfig::default(), payload).await;

    Mock::given(method("POST"))
        .and(path_regex("(?i)sendmessage$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sent_message("Ahoy!")))
        .expect(1)
        .mount(&stack.telegram)
        .await;

    handlers::process_message(&stack.bot, &stack.app, &inbound(json!({"text": "hello"}))).await;

    let state = stack.store.state(CHAT_ID).await.unwrap().unwrap();
    assert_eq!(state.messages.len(), 2);
    assert_eq!(state.messages[0].id, 100);
    assert_eq!(state.messages[0].text, "hello");
    assert!(!state.messages[0].is_from_bot);
    assert_eq!(state.messages[1].id, 900);
    assert_eq!(state.messages[1].text, "Ahoy!");
    assert!(state.messages[1].is_from_bot);
}

#[tokio::test]
async fn malformed_model_json_falls_back_to_raw_output() {
    let stack = stack(BanterConfig::default(), "not json at all").await;

    Mock::given(method("POST"))
        .and(path_regex("(?i)sendmessage$"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(sent_message(
                "Sorry, I had trouble formatting my response. Raw output: not json at all",
            )),
        )
        .expect(1)
        .mount(&stack.telegram)
        .await;

    handlers::process_message(&stack.bot, &stack.app, &inbound(json!({"text": "hello"}))).await;

    let state = stack.store.state(CHAT_ID).await.unwrap().unwrap();
    assert_eq!(state.messages.len(), 2);
    assert!(state.messages[1].text.starts_with("Sorry, I had trouble"));
}

#[tokio::test]
async fn persona_command_sets_the_prompt_without_calling_the_model() {
    let stack = stack(BanterConfig::default(), "unused").await;

    Mock::given(method("POST"))
        .and(path_regex("(?i)sendmessage$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sent_message("ok")))
        .expect(1)
        .mount(&stack.telegram)
        .await;

    handlers::process_message(
        &stack.bot,
        &stack.app,
        &inbound(json!({"text": "/persona a weary pirate captain"})),
    )
    .await;

    let state = stack.store.state(CHAT_ID).await.unwrap().unwrap();
    assert_eq!(state.prompt, "a weary pirate captain");
    // The command itself is part of the history; the confirmation is not.
    assert_eq!(state.messages.len(), 1);
    assert_eq!(state.messages[0].text, "/persona a weary pirate captain");
}

#[tokio::test]
async fn unauthorized_chats_are_rejected_before_capture() {
    let mut config = BanterConfig::default();
    config.telegram.allowed_chat_ids = vec![777];
    let stack = stack(config, "unused").await;

    Mock::given(method("POST"))
        .and(path_regex("(?i)sendmessage$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sent_message("rejected")))
        .expect(1)
        .mount(&stack.telegram)
        .await;

    handlers::process_message(&stack.bot, &stack.app, &inbound(json!({"text": "hello"}))).await;

    // Nothing stored for the unauthorized chat.
    assert!(stack.store.state(CHAT_ID).await.unwrap().is_none());
}

#[tokio::test]
async fn non_text_messages_are_captured_but_not_answered() {
    let stack = stack(BanterConfig::default(), "unused").await;

    Mock::given(method("POST"))
        .and(path_regex("(?i)sendmessage$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sent_message("never")))
        .expect(0)
        .mount(&stack.telegram)
        .await;

    let photo = inbound(json!({
        "photo": [{"file_id": "f", "file_unique_id": "u", "width": 90, "height": 90}],
        "caption": "sunset",
    }));
    handlers::process_message(&stack.bot, &stack.app, &photo).await;

    let state = stack.store.state(CHAT_ID).await.unwrap().unwrap();
    assert_eq!(state.messages.len(), 1);
    assert_eq!(state.messages[0].media_type, "photo");
}

#[tokio::test]
async fn overview_command_caches_the_summary_and_sends_a_document() {
    let stack = stack(BanterConfig::default(), "A thorough overview.").await;

    Mock::given(method("POST"))
        .and(path_regex("(?i)sendmessage$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sent_message("status")))
        .mount(&stack.telegram)
        .await;
    Mock::given(method("POST"))
        .and(path_regex("(?i)senddocument$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ok": true,
            "result": {
                "message_id": 901,
                "date": 1_700_000_600i64,
                "chat": {"id": CHAT_ID, "type": "private", "first_name": "Test"},
                "from": {"id": 999u64, "is_bot": true, "first_name": "Banter", "username": "banterbot"},
                "document": {"file_id": "f", "file_unique_id": "u"},
                "caption": "\u{1F4CA} Chat Analysis",
            }
        })))
        .expect(1)
        .mount(&stack.telegram)
        .await;

    // Seed some history, then ask for the overview.
    stack
        .store
        .append_message(CHAT_ID, banter_test_utils::text_message(1, "we sailed at dawn"))
        .await
        .unwrap();
    handlers::process_message(&stack.bot, &stack.app, &inbound(json!({"text": "/overview"}))).await;

    let state = stack.store.state(CHAT_ID).await.unwrap().unwrap();
    assert_eq!(state.summary, "A thorough overview.");
}

#[tokio::test]
async fn json_export_import_replaces_the_target_conversation() {
    let stack = stack(BanterConfig::default(), "unused").await;

    let export = json!({
        "name": "Crew",
        "type": "private_supergroup",
        "id": 424242i64,
        "messages": [
            {"id": 2, "type": "message", "date_unixtime": "20", "from": "Bo", "from_id": "user8", "text": "second"},
            {"id": 1, "type": "message", "date_unixtime": "10", "from": "Al", "from_id": "user9",
             "text": [{"text": "fir"}, {"type": "bold", "text": "st"}]},
        ],
    });

    Mock::given(method("POST"))
        .and(path_regex("(?i)getfile$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ok": true,
            "result": {
                "file_id": "f",
                "file_unique_id": "u",
                "file_size": 64,
                "file_path": "documents/export.json",
            }
        })))
        .mount(&stack.telegram)
        .await;
    Mock::given(method("GET"))
        .and(path_regex("/file/bot.*/documents/export.json$"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(export.to_string().into_bytes()))
        .mount(&stack.telegram)
        .await;
    Mock::given(method("POST"))
        .and(path_regex("(?i)sendmessage$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sent_message("imported")))
        .mount(&stack.telegram)
        .await;

    // Pre-existing state for the exported chat id gets wiped by the import.
    stack
        .store
        .import_messages(424242, vec![banter_test_utils::text_message(99, "old")])
        .await
        .unwrap();
    stack.store.set_prompt(424242, "stale persona").await.unwrap();

    let document = inbound(json!({
        "document": {"file_id": "f", "file_unique_id": "u", "file_size": 64, "file_name": "export.json"},
    }));
    handlers::process_message(&stack.bot, &stack.app, &document).await;

    let state = stack.store.state(424242).await.unwrap().unwrap();
    assert_eq!(state.messages.len(), 2);
    assert_eq!(state.messages[0].id, 1);
    assert_eq!(state.messages[0].text, "first");
    assert_eq!(state.messages[0].from_id, 9);
    assert_eq!(state.messages[1].id, 2);
    assert_eq!(state.prompt, "");
    assert_eq!(state.summary, "");
}
