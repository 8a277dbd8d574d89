// src/core/types.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How a spoken token was judged against the vocabulary and the phase's history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    Target,
    Distractor,
    Intrusion,
    Repeat,
}

/// One final transcript segment as delivered by the speech-to-text layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Utterance {
    pub text: String,
    pub timestamp: DateTime<Utc>,
    pub confidence: Option<f32>,
}

impl Utterance {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            timestamp: Utc::now(),
            confidence: None,
        }
    }

    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = Some(confidence);
        self
    }

    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }
}

/// A classified word (or multi-word phrase, in fluency). Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpokenToken {
    pub raw_text: String,
    pub canonical_text: String,
    /// The identity the token resolved to, when it resolved to one.
    pub mapped_identity: Option<String>,
    pub classification: Classification,
    pub timestamp: DateTime<Utc>,
    pub confidence: Option<f32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecallResult {
    pub tokens: Vec<SpokenToken>,
    /// Newly credited identities, in first-occurrence order.
    pub hits: Vec<String>,
    pub intrusions: Vec<SpokenToken>,
    pub repeats: Vec<SpokenToken>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecognitionResult {
    pub tokens: Vec<SpokenToken>,
    pub hits: Vec<String>,
    pub distractor_hits: Vec<SpokenToken>,
    pub intrusions: Vec<SpokenToken>,
    pub repeats: Vec<SpokenToken>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FluencyResult {
    pub tokens: Vec<SpokenToken>,
    /// Newly credited animals as canonical phrases, in spoken order.
    pub animals: Vec<String>,
    pub invalid: Vec<SpokenToken>,
    pub repeats: Vec<SpokenToken>,
}
