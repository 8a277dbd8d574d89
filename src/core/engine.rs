// File: src/core/engine.rs
//! Phase scorers: recall, recognition and verbal fluency.

use crate::core::classifier::{Classifier, SeenSet};
use crate::core::normalizer::normalize;
use crate::core::tokenizer::{split_compound, tokenize};
use crate::core::types::{
    Classification, FluencyResult, RecallResult, RecognitionResult, SpokenToken, Utterance,
};
use crate::core::vocabulary::{canonical_phrase, AnimalDictionary, Vocabulary, VocabularyConfig};
use crate::error::Result;
use tracing::debug;

/// Tokens of one utterance plus the identities they newly credited.
struct ClassifiedUtterance {
    tokens: Vec<SpokenToken>,
    hits: Vec<String>,
}

fn classify_utterance(
    vocabulary: &Vocabulary,
    utterance: &Utterance,
    already_hit: &[String],
    allow_distractors: bool,
) -> ClassifiedUtterance {
    let classifier = Classifier::new(vocabulary);
    let mut seen = SeenSet::seeded(already_hit);
    let mut hits = Vec::new();

    let tokens: Vec<SpokenToken> = tokenize(&utterance.text)
        .into_iter()
        .map(|word| classifier.classify(word, &mut seen, allow_distractors, utterance))
        .collect();

    // Every Target token is a first sighting, so this list is already deduplicated.
    for token in &tokens {
        if token.classification == Classification::Target {
            if let Some(identity) = &token.mapped_identity {
                hits.push(identity.clone());
            }
        }
    }

    ClassifiedUtterance { tokens, hits }
}

/// Scores one final utterance in a free-recall phase (naming, incidental,
/// immediate, learning and delayed memory).
pub fn score_recall(vocabulary: &Vocabulary, utterance: &Utterance, already_hit: &[String]) -> RecallResult {
    let ClassifiedUtterance { tokens, hits } = classify_utterance(vocabulary, utterance, already_hit, false);

    let mut result = RecallResult {
        hits,
        ..RecallResult::default()
    };
    for token in &tokens {
        match token.classification {
            Classification::Intrusion => result.intrusions.push(token.clone()),
            Classification::Repeat => result.repeats.push(token.clone()),
            Classification::Target | Classification::Distractor => {}
        }
    }
    result.tokens = tokens;

    debug!(
        tokens = result.tokens.len(),
        hits = result.hits.len(),
        intrusions = result.intrusions.len(),
        repeats = result.repeats.len(),
        "Recall utterance scored"
    );
    result
}

/// Scores one final utterance while the recognition sheet is shown. Foils
/// named from the sheet land in `distractor_hits` instead of `intrusions`.
pub fn score_recognition(
    vocabulary: &Vocabulary,
    utterance: &Utterance,
    already_hit: &[String],
) -> RecognitionResult {
    let ClassifiedUtterance { tokens, hits } = classify_utterance(vocabulary, utterance, already_hit, true);

    let mut result = RecognitionResult {
        hits,
        ..RecognitionResult::default()
    };
    for token in &tokens {
        match token.classification {
            Classification::Distractor => result.distractor_hits.push(token.clone()),
            Classification::Intrusion => result.intrusions.push(token.clone()),
            Classification::Repeat => result.repeats.push(token.clone()),
            Classification::Target => {}
        }
    }
    result.tokens = tokens;

    debug!(
        tokens = result.tokens.len(),
        hits = result.hits.len(),
        distractors = result.distractor_hits.len(),
        intrusions = result.intrusions.len(),
        "Recognition utterance scored"
    );
    result
}

/// A dictionary phrase found in the word sequence.
struct PhraseMatch {
    start: usize,
    width: usize,
    phrase: String,
}

/// Greedy longest-first matching: every window of the widest size is tried
/// left to right, then the next size down over the words still free.
fn match_phrases(canonical: &[String], dictionary: &AnimalDictionary) -> Vec<PhraseMatch> {
    let mut consumed = vec![false; canonical.len()];
    let mut matches = Vec::new();

    for width in (1..=dictionary.longest_phrase()).rev() {
        let mut start = 0;
        while start + width <= canonical.len() {
            let window = &canonical[start..start + width];
            let free = !consumed[start..start + width].iter().any(|&used| used);
            let matched = if !free || window.iter().any(String::is_empty) {
                None
            } else if width == 1 {
                dictionary.resolve_word(&window[0])
            } else {
                let phrase = window.join(" ");
                dictionary.contains(&phrase).then_some(phrase)
            };

            match matched {
                Some(phrase) => {
                    consumed[start..start + width].fill(true);
                    matches.push(PhraseMatch { start, width, phrase });
                    start += width;
                }
                None => start += 1,
            }
        }
    }

    matches.sort_by_key(|m| m.start);
    matches
}

/// Scores one final utterance in the animal fluency phase. Multi-word names
/// are matched before their parts, so "mico leão dourado" is one animal.
/// Hyphenated compounds are windowed part by part, so "mico-leão-dourado"
/// and "mico leão dourado" are the same animal.
pub fn score_fluency(
    utterance: &Utterance,
    dictionary: &AnimalDictionary,
    already_produced: &[String],
) -> FluencyResult {
    let words: Vec<&str> = tokenize(&utterance.text)
        .into_iter()
        .flat_map(split_compound)
        .collect();
    let canonical: Vec<String> = words.iter().map(|word| normalize(word)).collect();
    let mut produced = SeenSet::seeded(already_produced.iter().map(|name| canonical_phrase(name)));

    let mut result = FluencyResult::default();
    let mut pending = match_phrases(&canonical, dictionary).into_iter().peekable();
    let mut position = 0;

    while position < words.len() {
        let token = if let Some(found) = pending.next_if(|m| m.start == position) {
            let end = position + found.width;
            let classification = if produced.insert(&found.phrase) {
                result.animals.push(found.phrase.clone());
                Classification::Target
            } else {
                Classification::Repeat
            };
            let token = SpokenToken {
                raw_text: words[position..end].join(" "),
                canonical_text: canonical[position..end].join(" "),
                mapped_identity: Some(found.phrase),
                classification,
                timestamp: utterance.timestamp,
                confidence: utterance.confidence,
            };
            if classification == Classification::Repeat {
                result.repeats.push(token.clone());
            }
            position = end;
            token
        } else {
            let token = SpokenToken {
                raw_text: words[position].to_string(),
                canonical_text: canonical[position].clone(),
                mapped_identity: None,
                classification: Classification::Intrusion,
                timestamp: utterance.timestamp,
                confidence: utterance.confidence,
            };
            result.invalid.push(token.clone());
            position += 1;
            token
        };
        result.tokens.push(token);
    }

    debug!(
        tokens = result.tokens.len(),
        animals = result.animals.len(),
        invalid = result.invalid.len(),
        repeats = result.repeats.len(),
        "Fluency utterance scored"
    );
    result
}

/// Owns the vocabulary for the lifetime of the process and exposes the three
/// scorers over it.
#[derive(Debug, Clone)]
pub struct ScoringEngine {
    vocabulary: Vocabulary,
}

impl ScoringEngine {
    pub fn new(vocabulary: Vocabulary) -> Self {
        Self { vocabulary }
    }

    pub fn from_config(config: &VocabularyConfig) -> Result<Self> {
        Ok(Self::new(Vocabulary::build(config)?))
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn score_recall(&self, transcript: &str, already_hit: &[String]) -> RecallResult {
        self.score_recall_utterance(&Utterance::new(transcript), already_hit)
    }

    pub fn score_recall_utterance(&self, utterance: &Utterance, already_hit: &[String]) -> RecallResult {
        score_recall(&self.vocabulary, utterance, already_hit)
    }

    pub fn score_recognition(&self, transcript: &str, already_hit: &[String]) -> RecognitionResult {
        self.score_recognition_utterance(&Utterance::new(transcript), already_hit)
    }

    pub fn score_recognition_utterance(
        &self,
        utterance: &Utterance,
        already_hit: &[String],
    ) -> RecognitionResult {
        score_recognition(&self.vocabulary, utterance, already_hit)
    }

    /// Fluency against the vocabulary's own animal dictionary.
    pub fn score_fluency(&self, transcript: &str, already_produced: &[String]) -> FluencyResult {
        self.score_fluency_utterance(&Utterance::new(transcript), already_produced)
    }

    pub fn score_fluency_utterance(&self, utterance: &Utterance, already_produced: &[String]) -> FluencyResult {
        score_fluency(utterance, self.vocabulary.animals(), already_produced)
    }
}
