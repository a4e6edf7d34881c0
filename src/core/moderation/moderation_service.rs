// AI-text detection service - core business logic for deciding whether a
// message gets suppressed.
//
// This service handles:
// - Normalizing text before it reaches the classifier
// - Skipping trivial content (short or numeric-only messages)
// - Applying the confidence threshold to the classifier verdict
// - Failing open when the classifier is unavailable
//
// NO Discord dependencies here - just pure domain logic.

use super::moderation_models::{
    ClassificationResult, DecisionReason, ModerationConfig, ModerationDecision, AI_LABEL,
    CANDIDATE_LABELS,
};
use super::text_normalizer::{is_all_digits, normalize};
use async_trait::async_trait;
use std::collections::HashSet;
use thiserror::Error;

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Error)]
pub enum ClassificationError {
    #[error("Request failed: {0}")]
    Request(String),

    #[error("Classifier API error: {status} - {body}")]
    Api { status: u16, body: String },

    #[error("Malformed classification result: {0}")]
    MalformedResult(String),
}

// ============================================================================
// CLASSIFIER TRAIT (PORT)
// ============================================================================

/// Zero-shot text classifier.
///
/// Given text and a set of candidate labels, returns every label with a
/// confidence in [0, 1], ranked highest first.
#[async_trait]
pub trait Classifier: Send + Sync {
    async fn classify(
        &self,
        text: &str,
        labels: &[&str],
    ) -> Result<ClassificationResult, ClassificationError>;
}

/// Reject results that do not cover each candidate label exactly once with a
/// finite score in [0, 1].
pub fn validate_result(
    result: &ClassificationResult,
    labels: &[&str],
) -> Result<(), ClassificationError> {
    if result.is_empty() {
        return Err(ClassificationError::MalformedResult(
            "no labels returned".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    for entry in result.ranked() {
        if !labels.contains(&entry.label.as_str()) {
            return Err(ClassificationError::MalformedResult(format!(
                "unexpected label '{}'",
                entry.label
            )));
        }
        if !entry.score.is_finite() || !(0.0..=1.0).contains(&entry.score) {
            return Err(ClassificationError::MalformedResult(format!(
                "score {} for '{}' is outside [0, 1]",
                entry.score, entry.label
            )));
        }
        if !seen.insert(entry.label.as_str()) {
            return Err(ClassificationError::MalformedResult(format!(
                "label '{}' returned twice",
                entry.label
            )));
        }
    }

    if seen.len() != labels.len() {
        return Err(ClassificationError::MalformedResult(format!(
            "expected {} labels, got {}",
            labels.len(),
            seen.len()
        )));
    }

    Ok(())
}

// ============================================================================
// CORE SERVICE
// ============================================================================

/// Decides whether a message looks AI-generated enough to be removed.
pub struct ModerationService<C: Classifier> {
    classifier: C,
    config: ModerationConfig,
}

impl<C: Classifier> ModerationService<C> {
    pub fn new(classifier: C, config: ModerationConfig) -> Self {
        Self { classifier, config }
    }

    /// Evaluate raw message text.
    ///
    /// Never returns an error: classifier failures are logged and the message
    /// passes.
    pub async fn evaluate(&self, raw_text: &str) -> ModerationDecision {
        if !self.config.enabled {
            return ModerationDecision::pass(DecisionReason::Disabled);
        }

        let normalized = normalize(raw_text);

        if normalized.chars().count() < self.config.min_length {
            return ModerationDecision::pass(DecisionReason::TooShort);
        }
        if is_all_digits(&normalized) {
            return ModerationDecision::pass(DecisionReason::NumericOnly);
        }

        match self.classify(&normalized).await {
            Ok(result) => self.decide(&result),
            Err(e) => {
                tracing::warn!("AI detection failed, letting message through: {}", e);
                ModerationDecision::pass(DecisionReason::ClassifierFailed(e.to_string()))
            }
        }
    }

    async fn classify(&self, normalized: &str) -> Result<ClassificationResult, ClassificationError> {
        let result = self
            .classifier
            .classify(normalized, &CANDIDATE_LABELS)
            .await?;
        validate_result(&result, &CANDIDATE_LABELS)?;
        Ok(result)
    }

    /// Apply the threshold to a validated result.
    fn decide(&self, result: &ClassificationResult) -> ModerationDecision {
        match result.top() {
            Some(top) => {
                let suppress =
                    top.label == AI_LABEL && top.score > self.config.confidence_threshold;
                ModerationDecision::classified(suppress, top)
            }
            // validate_result already rejects empty results
            None => ModerationDecision::pass(DecisionReason::ClassifierFailed(
                "no labels returned".to_string(),
            )),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
