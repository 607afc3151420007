//! QnA Maker knowledge base client
//!
//! Sends free-text questions to the `generateAnswer` endpoint of a QnA Maker
//! knowledge base and returns ranked answers.

use std::cmp::Ordering;
use std::time::Duration;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;
use crate::config::QnaConfig;
use crate::utils::errors::{RegionBuddyError, QnaError, Result};

/// Options for a single knowledge base query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QueryOptions {
    /// Maximum number of answers to return
    pub top: usize,
    /// Overrides the configured score threshold
    pub score_threshold: Option<f32>,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            top: 1,
            score_threshold: None,
        }
    }
}

/// A ranked answer from the knowledge base
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    pub questions: Vec<String>,
    pub answer: String,
    /// Confidence in `0.0..=1.0`; `None` when the knowledge base sent no score
    pub score: Option<f32>,
    pub id: i64,
    pub source: Option<String>,
}

/// generateAnswer request body
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateAnswerRequest<'a> {
    question: &'a str,
    top: usize,
    score_threshold: f32,
}

/// generateAnswer response body
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GenerateAnswerResponse {
    #[serde(default)]
    pub answers: Vec<RawAnswer>,
}

/// Answer as returned on the wire, score in `0..=100`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawAnswer {
    #[serde(default)]
    pub questions: Vec<String>,
    pub answer: String,
    #[serde(default)]
    pub score: Option<f32>,
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub source: Option<String>,
}

/// Knowledge base service
#[derive(Clone, Debug)]
pub struct QnaMakerService {
    client: Client,
    endpoint: Url,
    endpoint_key: String,
    score_threshold: f32,
}

impl QnaMakerService {
    /// Create a new QnaMakerService instance
    pub fn new(config: &QnaConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent("RegionBuddy-Bot/1.0")
            .build()
            .map_err(RegionBuddyError::Http)?;

        let endpoint = Url::parse(&format!(
            "{}/knowledgebases/{}/generateAnswer",
            config.host.trim_end_matches('/'),
            config.knowledge_base_id
        ))?;

        Ok(Self {
            client,
            endpoint,
            endpoint_key: config.endpoint_key.clone(),
            score_threshold: config.score_threshold,
        })
    }

    /// Full generateAnswer URL
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Query the knowledge base.
    ///
    /// An empty vector means no answer cleared the score threshold.
    pub async fn get_answers(&self, question: &str, options: &QueryOptions) -> Result<Vec<QueryResult>> {
        let question = question.trim();
        if question.is_empty() {
            return Err(RegionBuddyError::InvalidInput("Question must not be empty".to_string()));
        }

        let threshold = options.score_threshold.unwrap_or(self.score_threshold);
        let body = GenerateAnswerRequest {
            question,
            top: options.top,
            score_threshold: threshold * 100.0,
        };

        debug!(url = %self.endpoint, top = options.top, "Making QnA Maker request");

        let response = self.client
            .post(self.endpoint.clone())
            .header("Authorization", format!("EndpointKey {}", self.endpoint_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    QnaError::Timeout
                } else if e.is_connect() {
                    QnaError::ServiceUnavailable
                } else {
                    QnaError::RequestFailed(e.to_string())
                }
            })?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            warn!(status = %status, "QnA Maker rejected endpoint key");
            return Err(QnaError::Unauthorized.into());
        }
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(QnaError::RequestFailed(format!("HTTP {}: {}", status, error_text)).into());
        }

        let parsed: GenerateAnswerResponse = response.json().await
            .map_err(|e| QnaError::InvalidResponse(e.to_string()))?;

        Ok(rank_answers(parsed.answers, threshold, options.top))
    }
}

/// Normalise scores, drop scored answers under the threshold, best first.
///
/// Unscored answers are kept and rank after every scored one.
fn rank_answers(answers: Vec<RawAnswer>, threshold: f32, top: usize) -> Vec<QueryResult> {
    let mut results: Vec<QueryResult> = answers
        .into_iter()
        .map(|a| QueryResult {
            questions: a.questions,
            answer: a.answer,
            score: a.score.map(|score| score / 100.0),
            id: a.id,
            source: a.source,
        })
        .filter(|r| match r.score {
            Some(score) => score >= threshold && score > 0.0,
            None => true,
        })
        .collect();

    results.sort_by(|a, b| match (a.score, b.score) {
        (Some(a), Some(b)) => b.total_cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
    results.truncate(top);
    results
}
