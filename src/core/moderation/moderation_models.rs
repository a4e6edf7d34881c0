// Moderation domain models - data structures for AI-text detection.
//
// These are pure domain types with no Discord dependencies.
// The Discord layer will convert these to Discord-specific actions.

use serde::{Deserialize, Serialize};

/// Label the classifier uses for machine-generated text.
pub const AI_LABEL: &str = "AI";
/// Label the classifier uses for human-written text.
pub const HUMAN_LABEL: &str = "Human";
/// The fixed candidate set every classification is run against.
pub const CANDIDATE_LABELS: [&str; 2] = [AI_LABEL, HUMAN_LABEL];

/// One (label, confidence) pair returned by the classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelScore {
    pub label: String,
    pub score: f32,
}

impl LabelScore {
    pub fn new(label: impl Into<String>, score: f32) -> Self {
        Self {
            label: label.into(),
            score,
        }
    }
}

/// Ranked classifier output. Entries are kept in descending score order,
/// so the first entry is always the decision.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ClassificationResult {
    ranked: Vec<LabelScore>,
}

impl ClassificationResult {
    /// Build a result from scores in any order.
    pub fn new(mut scores: Vec<LabelScore>) -> Self {
        scores.sort_by(|a, b| b.score.total_cmp(&a.score));
        Self { ranked: scores }
    }

    /// The highest-ranked entry, if any.
    pub fn top(&self) -> Option<&LabelScore> {
        self.ranked.first()
    }

    pub fn ranked(&self) -> &[LabelScore] {
        &self.ranked
    }

    pub fn is_empty(&self) -> bool {
        self.ranked.is_empty()
    }
}

/// Why the policy reached its decision.
#[derive(Debug, Clone, PartialEq)]
pub enum DecisionReason {
    /// AI detection is switched off
    Disabled,
    /// Normalized text was shorter than the configured minimum
    TooShort,
    /// Normalized text was nothing but digits
    NumericOnly,
    /// Classifier said "AI" above the threshold
    ClassifiedAi,
    /// Classifier said "Human", or "AI" at or below the threshold
    BelowThreshold,
    /// Classifier call failed; the message passes (fail open)
    ClassifierFailed(String),
}

impl std::fmt::Display for DecisionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DecisionReason::Disabled => write!(f, "Detection Disabled"),
            DecisionReason::TooShort => write!(f, "Too Short"),
            DecisionReason::NumericOnly => write!(f, "Numeric Only"),
            DecisionReason::ClassifiedAi => write!(f, "Classified AI"),
            DecisionReason::BelowThreshold => write!(f, "Below Threshold"),
            DecisionReason::ClassifierFailed(err) => write!(f, "Classifier Failed ({})", err),
        }
    }
}

/// Result of evaluating a message. Derived per message, never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct ModerationDecision {
    /// Whether the message should be removed
    pub suppress: bool,
    pub reason: DecisionReason,
    /// Top classifier label, when the classifier ran successfully
    pub label: Option<String>,
    /// Confidence of the top label
    pub confidence: Option<f32>,
}

impl ModerationDecision {
    /// A decision that lets the message through without a classifier verdict.
    pub fn pass(reason: DecisionReason) -> Self {
        Self {
            suppress: false,
            reason,
            label: None,
            confidence: None,
        }
    }

    /// A decision backed by a classifier verdict.
    pub fn classified(suppress: bool, top: &LabelScore) -> Self {
        Self {
            suppress,
            reason: if suppress {
                DecisionReason::ClassifiedAi
            } else {
                DecisionReason::BelowThreshold
            },
            label: Some(top.label.clone()),
            confidence: Some(top.score),
        }
    }
}

/// Tunables for AI-text detection.
#[derive(Debug, Clone)]
pub struct ModerationConfig {
    /// Master switch
    pub enabled: bool,
    /// "AI" must score strictly above this to suppress
    pub confidence_threshold: f32,
    /// Normalized texts shorter than this (in chars) skip classification
    pub min_length: usize,
}

impl Default for ModerationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            confidence_threshold: 0.55,
            min_length: 10,
        }
    }
}
