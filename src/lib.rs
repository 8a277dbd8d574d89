// src/lib.rs

pub mod c_api;
pub mod core;
pub mod error;
pub mod persistence;
pub mod session;

pub use crate::core::engine::{score_fluency, score_recall, score_recognition, ScoringEngine};
pub use crate::core::normalizer::normalize;
pub use crate::core::tokenizer::tokenize;
pub use crate::core::types::{
    Classification, FluencyResult, RecallResult, RecognitionResult, SpokenToken, Utterance,
};
pub use crate::core::vocabulary::{AnimalDictionary, CollisionPolicy, Vocabulary, VocabularyConfig};
pub use crate::error::{Error, Result};
pub use crate::session::{ClockEvaluator, ClockScore, Phase, ScreeningSession, TranscriptEvent};
