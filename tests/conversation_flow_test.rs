//! End-to-end conversation tests
//!
//! Drives whole conversations through `process_turn` with in-memory state and
//! a mocked knowledge base.

mod helpers;

use assert_matches::assert_matches;
use serde_json::json;
use serial_test::serial;

use helpers::*;
use RegionBuddy::dialogs::main_menu::{GREETING, REGIONS};
use RegionBuddy::dialogs::region::{CITIES, CITY_DETAILS, CITY_PROMPT, NO_ANSWER, QUESTION_PROMPT};
use RegionBuddy::dialogs::FOLLOW_UP_MESSAGE;
use RegionBuddy::handlers::turn::{cancel_conversation, handle_turn_error, process_turn, restart_conversation, ERROR_HINT, ERROR_MESSAGE};
use RegionBuddy::state::dialog_stack::{CANCEL_MESSAGE, HELP_MESSAGE};
use RegionBuddy::services::ServiceFactory;
use RegionBuddy::state::StateStorage;
use RegionBuddy::{QnaError, RegionBuddyError};

const CHAT: i64 = 4242;

fn region_labels() -> Vec<String> {
    REGIONS.iter().map(|r| r.to_string()).collect()
}

fn city_labels() -> Vec<String> {
    CITIES.iter().map(|c| c.to_string()).collect()
}

#[tokio::test]
#[serial]
async fn test_first_message_shows_region_menu() {
    let ctx = TestContext::new().await;

    let replies = ctx.send(CHAT, "hello").await.unwrap();

    assert_eq!(texts(&replies), vec![GREETING]);
    assert_eq!(card_labels(&replies), vec![region_labels()]);
}

#[tokio::test]
#[serial]
async fn test_non_branching_regions_restart_immediately() {
    let ctx = TestContext::new().await;

    for (offset, region) in ["Karnataka", "Tamil Nadu", "Andhra Pradesh"].into_iter().enumerate() {
        let chat = CHAT + offset as i64;
        let replies = ctx.send_all(chat, &["hi", region]).await.unwrap();

        assert_eq!(texts(&replies), vec![FOLLOW_UP_MESSAGE], "region {}", region);
        assert_eq!(card_labels(&replies), vec![region_labels()]);
    }

    assert!(ctx.qna_mock.received_queries().await.is_empty());
}

#[tokio::test]
#[serial]
async fn test_maharashtra_opens_city_menu() {
    let ctx = TestContext::new().await;

    let replies = ctx.send_all(CHAT, &["hi", "Maharashtra"]).await.unwrap();

    assert_eq!(texts(&replies), vec![CITY_PROMPT]);
    assert_eq!(card_labels(&replies), vec![city_labels()]);
}

#[tokio::test]
#[serial]
async fn test_concrete_city_shows_details_then_restarts() {
    let ctx = TestContext::new().await;

    for (offset, city) in ["Mumbai", "Pune", "Nagpur", "Aurangabad"].into_iter().enumerate() {
        let chat = CHAT + offset as i64;
        let replies = ctx.send_all(chat, &["hi", "Maharashtra", city]).await.unwrap();

        let selected = format!("You have selected {}", city);
        assert_eq!(texts(&replies), vec![selected.as_str(), CITY_DETAILS, FOLLOW_UP_MESSAGE]);
        assert_eq!(card_labels(&replies), vec![region_labels()]);
    }

    assert!(ctx.qna_mock.received_queries().await.is_empty());
}

#[tokio::test]
#[serial]
async fn test_ordinal_and_case_insensitive_choices() {
    let ctx = TestContext::new().await;

    let replies = ctx.send_all(CHAT, &["hi", "1", "pune"]).await.unwrap();

    assert_eq!(texts(&replies)[0], "You have selected Pune");
}

#[tokio::test]
#[serial]
async fn test_other_forwards_question_to_knowledge_base() {
    let ctx = TestContext::new().await;
    ctx.qna_mock.mock_single_answer("9am-5pm").await;

    let replies = ctx.send_all(CHAT, &["hi", "Maharashtra", "Other"]).await.unwrap();
    assert_eq!(texts(&replies), vec![QUESTION_PROMPT]);
    assert!(card_labels(&replies).is_empty());

    let replies = ctx.send(CHAT, "What are the office hours?").await.unwrap();
    assert_eq!(texts(&replies), vec!["9am-5pm", FOLLOW_UP_MESSAGE]);
    assert_eq!(card_labels(&replies), vec![region_labels()]);

    let queries = ctx.qna_mock.received_queries().await;
    assert_eq!(queries.len(), 1);
    assert_eq!(queries[0]["question"], json!("What are the office hours?"));
    assert_eq!(queries[0]["top"], json!(1));
}

#[tokio::test]
#[serial]
async fn test_question_layout_reaches_knowledge_base_unchanged() {
    let ctx = TestContext::new().await;
    ctx.qna_mock.mock_single_answer("9am-5pm").await;

    ctx.send_all(CHAT, &["hi", "Maharashtra", "Other"]).await.unwrap();
    ctx.send(CHAT, "  Office hours?\n\nAnd  on holidays?  ").await.unwrap();

    let queries = ctx.qna_mock.received_queries().await;
    assert_eq!(queries.len(), 1);
    assert_eq!(queries[0]["question"], json!("Office hours?\n\nAnd  on holidays?"));
}

#[tokio::test]
#[serial]
async fn test_oversized_state_ttl_does_not_break_turns() {
    let qna_mock = QnaMockServer::new().await;
    let mut settings = create_test_settings(&qna_mock.host());
    settings.state.ttl_seconds = 10_000_000_000_000;
    assert!(settings.validate().is_err());

    let storage = StateStorage::in_memory(settings.state.ttl_seconds);
    let services = ServiceFactory::with_storage(&settings, storage).unwrap();

    let replies = process_turn(&services, CHAT, "hi").await.unwrap();
    assert_eq!(texts(&replies), vec![GREETING]);
}

#[tokio::test]
#[serial]
async fn test_unscored_answer_is_still_delivered() {
    let ctx = TestContext::new().await;
    ctx.qna_mock.mock_answers(json!([{ "answer": "9am-5pm" }])).await;

    let replies = ctx
        .send_all(CHAT, &["hi", "Maharashtra", "Other", "What are the office hours?"])
        .await
        .unwrap();

    assert_eq!(texts(&replies), vec!["9am-5pm", FOLLOW_UP_MESSAGE]);
}

#[tokio::test]
#[serial]
async fn test_low_score_answers_are_discarded() {
    let ctx = TestContext::new().await;
    ctx.qna_mock
        .mock_answers(json!([{ "questions": [], "answer": "maybe", "score": 12.0, "id": 7 }]))
        .await;

    let replies = ctx.send_all(CHAT, &["hi", "Maharashtra", "Other", "anything?"]).await.unwrap();

    assert_eq!(texts(&replies), vec![NO_ANSWER, FOLLOW_UP_MESSAGE]);
}

#[tokio::test]
#[serial]
async fn test_empty_answer_list_reports_no_answer() {
    let ctx = TestContext::new().await;
    ctx.qna_mock.mock_answers(json!([])).await;

    let replies = ctx.send_all(CHAT, &["hi", "Maharashtra", "Other", "Where is the office?"]).await.unwrap();

    assert_eq!(texts(&replies), vec![NO_ANSWER, FOLLOW_UP_MESSAGE]);
    assert_eq!(ctx.qna_mock.received_queries().await.len(), 1);
}

#[tokio::test]
#[serial]
async fn test_knowledge_base_failure_resets_conversation() {
    let ctx = TestContext::new().await;
    ctx.qna_mock.mock_status(500).await;

    ctx.send_all(CHAT, &["hi", "Maharashtra", "Other"]).await.unwrap();
    let err = ctx.send(CHAT, "Will this fail?").await.unwrap_err();
    assert_matches!(err, RegionBuddyError::Qna(QnaError::RequestFailed(_)));

    let replies = handle_turn_error(&ctx.services, CHAT, &err).await;
    assert_eq!(texts(&replies), vec![ERROR_MESSAGE, ERROR_HINT]);
    assert!(!ctx.services.state_storage.context_exists(CHAT).await.unwrap());

    let replies = ctx.send(CHAT, "hello again").await.unwrap();
    assert_eq!(texts(&replies), vec![GREETING]);
}

#[tokio::test]
#[serial]
async fn test_rejected_endpoint_key_is_unauthorized() {
    let ctx = TestContext::new().await;
    ctx.qna_mock.mock_status(401).await;

    let err = ctx
        .send_all(CHAT, &["hi", "Maharashtra", "Other", "hours?"])
        .await
        .unwrap_err();

    assert_matches!(err, RegionBuddyError::Qna(QnaError::Unauthorized));
}

#[tokio::test]
#[serial]
async fn test_invalid_choice_reprompts_same_menu() {
    let ctx = TestContext::new().await;

    let replies = ctx.send_all(CHAT, &["hi", "Goa"]).await.unwrap();
    assert!(texts(&replies).is_empty());
    assert_eq!(card_labels(&replies), vec![region_labels()]);

    let replies = ctx.send_all(CHAT, &["Maharashtra", "Chennai"]).await.unwrap();
    assert!(texts(&replies).is_empty());
    assert_eq!(card_labels(&replies), vec![city_labels()]);
}

#[tokio::test]
#[serial]
async fn test_help_inside_region_flow_keeps_position() {
    let ctx = TestContext::new().await;

    let replies = ctx.send_all(CHAT, &["hi", "Maharashtra", "help"]).await.unwrap();
    assert_eq!(texts(&replies), vec![HELP_MESSAGE]);

    let replies = ctx.send(CHAT, "Nagpur").await.unwrap();
    assert_eq!(texts(&replies)[0], "You have selected Nagpur");
}

#[tokio::test]
#[serial]
async fn test_cancel_inside_region_flow_ends_conversation() {
    let ctx = TestContext::new().await;

    let replies = ctx.send_all(CHAT, &["hi", "Maharashtra", "cancel"]).await.unwrap();
    assert_eq!(texts(&replies), vec![CANCEL_MESSAGE]);
    assert!(!ctx.services.state_storage.context_exists(CHAT).await.unwrap());

    let replies = ctx.send(CHAT, "hi").await.unwrap();
    assert_eq!(texts(&replies), vec![GREETING]);
}

#[tokio::test]
#[serial]
async fn test_question_text_cancel_is_an_interruption() {
    let ctx = TestContext::new().await;
    ctx.qna_mock.mock_single_answer("unused").await;

    let replies = ctx.send_all(CHAT, &["hi", "Maharashtra", "Other", "quit"]).await.unwrap();

    assert_eq!(texts(&replies), vec![CANCEL_MESSAGE]);
    assert!(ctx.qna_mock.received_queries().await.is_empty());
}

#[tokio::test]
#[serial]
async fn test_restart_discards_running_flow() {
    let ctx = TestContext::new().await;
    ctx.send_all(CHAT, &["hi", "Maharashtra"]).await.unwrap();

    let replies = restart_conversation(&ctx.services, CHAT).await.unwrap();
    assert_eq!(texts(&replies), vec![GREETING]);

    let context = ctx.services.state_storage.load_context(CHAT).await.unwrap().unwrap();
    assert_eq!(context.stack.len(), 1);
}

#[tokio::test]
#[serial]
async fn test_cancel_command_forgets_root_menu() {
    let ctx = TestContext::new().await;
    ctx.send(CHAT, "hi").await.unwrap();
    assert!(ctx.services.state_storage.context_exists(CHAT).await.unwrap());

    cancel_conversation(&ctx.services, CHAT).await.unwrap();

    assert!(!ctx.services.state_storage.context_exists(CHAT).await.unwrap());
}

#[tokio::test]
#[serial]
async fn test_state_persists_between_turns() {
    let ctx = TestContext::new().await;

    ctx.send_all(CHAT, &["hi", "Maharashtra"]).await.unwrap();

    let context = ctx.services.state_storage.load_context(CHAT).await.unwrap().unwrap();
    let summary = context.summary();
    assert_eq!(summary.stack.len(), 2);
    assert!(summary.waiting);
    assert!(summary.expires_at.is_some());
}

#[tokio::test]
#[serial]
async fn test_conversations_are_isolated_per_chat() {
    let ctx = TestContext::new().await;

    ctx.send_all(CHAT, &["hi", "Maharashtra"]).await.unwrap();
    let replies = ctx.send(CHAT + 1, "Pune").await.unwrap();

    // A new chat starts at the region menu regardless of other chats.
    assert_eq!(texts(&replies), vec![GREETING]);
}
