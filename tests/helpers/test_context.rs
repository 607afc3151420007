//! Test context for unified test setup
//!
//! Builds a `ServiceFactory` with in-memory state storage and a QnA Maker
//! client pointed at a mock server.

use RegionBuddy::config::Settings;
use RegionBuddy::handlers::turn::process_turn;
use RegionBuddy::models::Reply;
use RegionBuddy::services::ServiceFactory;
use RegionBuddy::state::StateStorage;
use RegionBuddy::Result;

use super::qna_mock::{QnaMockServer, TEST_ENDPOINT_KEY, TEST_KB_ID};

pub struct TestContext {
    pub qna_mock: QnaMockServer,
    pub services: ServiceFactory,
    pub settings: Settings,
}

impl TestContext {
    pub async fn new() -> Self {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();

        let qna_mock = QnaMockServer::new().await;
        let settings = create_test_settings(&qna_mock.host());
        let storage = StateStorage::in_memory(settings.state.ttl_seconds);
        let services = ServiceFactory::with_storage(&settings, storage)
            .expect("Failed to build services");

        Self {
            qna_mock,
            services,
            settings,
        }
    }

    /// Deliver one user message and return the bot's replies
    pub async fn send(&self, chat_id: i64, text: &str) -> Result<Vec<Reply>> {
        process_turn(&self.services, chat_id, text).await
    }

    /// Deliver a sequence of messages, returning the replies to the last one
    pub async fn send_all(&self, chat_id: i64, inputs: &[&str]) -> Result<Vec<Reply>> {
        let mut last = Vec::new();
        for input in inputs {
            last = self.send(chat_id, input).await?;
        }
        Ok(last)
    }
}

/// Create test-specific settings
pub fn create_test_settings(qna_host: &str) -> Settings {
    let mut settings = Settings::default();
    settings.bot.token = "12345:test_token".to_string();
    settings.qna.knowledge_base_id = TEST_KB_ID.to_string();
    settings.qna.endpoint_key = TEST_ENDPOINT_KEY.to_string();
    settings.qna.host = qna_host.to_string();
    settings.qna.timeout_seconds = 2;
    settings.logging.level = "debug".to_string();
    settings
}

/// Plain-text replies in order
pub fn texts(replies: &[Reply]) -> Vec<&str> {
    replies.iter().filter_map(Reply::as_text).collect()
}

/// Labels of every card among the replies
pub fn card_labels(replies: &[Reply]) -> Vec<Vec<String>> {
    replies
        .iter()
        .filter_map(Reply::as_card)
        .map(|card| card.labels().into_iter().map(String::from).collect())
        .collect()
}
