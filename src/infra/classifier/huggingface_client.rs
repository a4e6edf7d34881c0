// Hugging Face Inference API client for zero-shot classification.
//
// Implements the core `Classifier` trait. The hosted pipeline has answered
// in two shapes over time, so both are accepted:
//   {"sequence": "...", "labels": ["AI", "Human"], "scores": [0.8, 0.2]}
//   [{"label": "AI", "score": 0.8}, {"label": "Human", "score": 0.2}]

use crate::core::moderation::{
    ClassificationError, ClassificationResult, Classifier, LabelScore,
};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

pub const DEFAULT_MODEL: &str = "roberta-large-openai-detector";
pub const DEFAULT_BASE_URL: &str = "https://api-inference.huggingface.co/models";

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ZeroShotResponse {
    Parallel { labels: Vec<String>, scores: Vec<f32> },
    Pairs(Vec<LabelScore>),
}

pub struct HuggingFaceClassifier {
    client: Client,
    endpoint: String,
    api_token: Option<String>,
}

impl HuggingFaceClassifier {
    pub fn new(
        base_url: &str,
        model: &str,
        api_token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, ClassificationError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClassificationError::Request(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: format!("{}/{}", base_url.trim_end_matches('/'), model),
            api_token,
        })
    }
}

/// Decode a zero-shot response body into a ranked result.
fn parse_response(body: &str) -> Result<ClassificationResult, ClassificationError> {
    let parsed: ZeroShotResponse = serde_json::from_str(body)
        .map_err(|e| ClassificationError::MalformedResult(e.to_string()))?;

    let scores = match parsed {
        ZeroShotResponse::Parallel { labels, scores } => {
            if labels.len() != scores.len() {
                return Err(ClassificationError::MalformedResult(format!(
                    "{} labels but {} scores",
                    labels.len(),
                    scores.len()
                )));
            }
            labels
                .into_iter()
                .zip(scores)
                .map(|(label, score)| LabelScore::new(label, score))
                .collect()
        }
        ZeroShotResponse::Pairs(pairs) => pairs,
    };

    Ok(ClassificationResult::new(scores))
}

#[async_trait]
impl Classifier for HuggingFaceClassifier {
    async fn classify(
        &self,
        text: &str,
        labels: &[&str],
    ) -> Result<ClassificationResult, ClassificationError> {
        let payload = json!({
            "inputs": text,
            "parameters": {
                "candidate_labels": labels,
                "multi_label": false,
            },
        });

        let mut request = self.client.post(&self.endpoint).json(&payload);
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ClassificationError::Request(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ClassificationError::Request(e.to_string()))?;

        if !status.is_success() {
            return Err(ClassificationError::Api {
                status: status.as_u16(),
                body,
            });
        }

        parse_response(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_parallel_arrays() {
        let body = r#"{"sequence":"hello there","labels":["AI","Human"],"scores":[0.8,0.2]}"#;

        let result = parse_response(body).unwrap();

        let top = result.top().unwrap();
        assert_eq!(top.label, "AI");
        assert!((top.score - 0.8).abs() < f32::EPSILON);
        assert_eq!(result.ranked().len(), 2);
    }

    #[test]
    fn parses_label_score_pairs_and_ranks_them() {
        let body = r#"[{"label":"Human","score":0.35},{"label":"AI","score":0.65}]"#;

        let result = parse_response(body).unwrap();

        assert_eq!(result.top().unwrap().label, "AI");
    }

    #[test]
    fn rejects_mismatched_arrays() {
        let body = r#"{"labels":["AI","Human"],"scores":[0.8]}"#;

        assert!(matches!(
            parse_response(body),
            Err(ClassificationError::MalformedResult(_))
        ));
    }

    #[test]
    fn rejects_error_payloads() {
        let body = r#"{"error":"Model is currently loading","estimated_time":20.0}"#;

        assert!(matches!(
            parse_response(body),
            Err(ClassificationError::MalformedResult(_))
        ));
    }

    #[test]
    fn builds_endpoint_from_base_and_model() {
        let client = HuggingFaceClassifier::new(
            "https://example.test/models/",
            DEFAULT_MODEL,
            None,
            Duration::from_secs(5),
        )
        .unwrap();

        assert_eq!(
            client.endpoint,
            "https://example.test/models/roberta-large-openai-detector"
        );
    }
}
