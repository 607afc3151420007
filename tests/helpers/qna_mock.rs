//! Mock QnA Maker server for testing
//!
//! Uses wiremock to stand in for the `generateAnswer` endpoint of a knowledge
//! base so flows can be driven end to end without network access.

use serde_json::{json, Value};
use wiremock::{
    matchers::{header, method, path},
    Mock, MockServer, ResponseTemplate,
};

pub const TEST_KB_ID: &str = "kb-test";
pub const TEST_ENDPOINT_KEY: &str = "test-endpoint-key";

/// Mock QnA Maker server
pub struct QnaMockServer {
    pub server: MockServer,
}

impl QnaMockServer {
    pub async fn new() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    /// Value for `QnaConfig::host`
    pub fn host(&self) -> String {
        format!("{}/qnamaker", self.server.uri())
    }

    fn generate_answer_path() -> String {
        format!("/qnamaker/knowledgebases/{}/generateAnswer", TEST_KB_ID)
    }

    /// Answer every authorised query with `answers`
    pub async fn mock_answers(&self, answers: Value) {
        let authorization = format!("EndpointKey {}", TEST_ENDPOINT_KEY);
        Mock::given(method("POST"))
            .and(path(Self::generate_answer_path()))
            .and(header("Authorization", authorization.as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "answers": answers })))
            .mount(&self.server)
            .await;
    }

    /// Answer with a single high-confidence record
    pub async fn mock_single_answer(&self, answer: &str) {
        self.mock_answers(json!([{
            "questions": ["sample question"],
            "answer": answer,
            "score": 92.5,
            "id": 1,
            "source": "faq.tsv",
            "metadata": []
        }]))
        .await;
    }

    /// Fail every query with `status`
    pub async fn mock_status(&self, status: u16) {
        Mock::given(method("POST"))
            .and(path(Self::generate_answer_path()))
            .respond_with(ResponseTemplate::new(status).set_body_string("upstream failure"))
            .mount(&self.server)
            .await;
    }

    /// JSON bodies of every generateAnswer request received so far
    pub async fn received_queries(&self) -> Vec<Value> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter(|req| req.url.path() == Self::generate_answer_path())
            .map(|req| serde_json::from_slice(&req.body).expect("request body is JSON"))
            .collect()
    }
}
