// File: src/core/classifier.rs
use crate::core::normalizer::normalize;
use crate::core::types::{Classification, SpokenToken, Utterance};
use crate::core::vocabulary::Vocabulary;
use std::collections::HashSet;

/// Canonical identities already credited in the current phase attempt.
/// Only grows; a new phase starts from a fresh set.
#[derive(Debug, Clone, Default)]
pub struct SeenSet {
    canonical: HashSet<String>,
}

impl SeenSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the set from identities credited by earlier utterances.
    /// Blank entries are ignored.
    pub fn seeded<I, S>(identities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let canonical = identities
            .into_iter()
            .map(|identity| normalize(identity.as_ref()))
            .filter(|canonical| !canonical.is_empty())
            .collect();
        Self { canonical }
    }

    pub fn contains(&self, canonical: &str) -> bool {
        self.canonical.contains(canonical)
    }

    /// Returns false if the identity was already present.
    pub fn insert(&mut self, canonical: &str) -> bool {
        self.canonical.insert(canonical.to_string())
    }

    pub fn len(&self) -> usize {
        self.canonical.len()
    }

    pub fn is_empty(&self) -> bool {
        self.canonical.is_empty()
    }
}

/// Classifies single words against the target, recognition and distractor tables.
pub struct Classifier<'a> {
    vocabulary: &'a Vocabulary,
}

impl<'a> Classifier<'a> {
    pub fn new(vocabulary: &'a Vocabulary) -> Self {
        Self { vocabulary }
    }

    /// Credits `canonical_identity` unless it was seen before.
    fn credit(seen: &mut SeenSet, canonical_identity: &str) -> Classification {
        if seen.insert(canonical_identity) {
            Classification::Target
        } else {
            Classification::Repeat
        }
    }

    /// Looks one form up in every table allowed in this phase. The target table
    /// wins over recognition and distractor lookups.
    fn resolve(
        &self,
        form: &str,
        seen: &mut SeenSet,
        allow_distractors: bool,
    ) -> Option<(String, Classification)> {
        if let Some(entry) = self.vocabulary.target(form) {
            return Some((entry.identity.clone(), Self::credit(seen, &entry.canonical)));
        }
        if allow_distractors {
            if let Some(entry) = self.vocabulary.recognition_entry(form) {
                let classification = if entry.is_target {
                    Self::credit(seen, &entry.canonical)
                } else {
                    Classification::Distractor
                };
                return Some((entry.identity.clone(), classification));
            }
        }
        let distractor = self.vocabulary.distractor(form)?;
        let classification = if allow_distractors {
            Classification::Distractor
        } else {
            // Foils are never valid recall answers.
            Classification::Intrusion
        };
        Some((distractor.to_string(), classification))
    }

    /// Classifies one word. The spoken form is looked up in every table before
    /// any singular form is tried, so an exact match always wins.
    /// `allow_distractors` is set only in recognition.
    pub fn classify(
        &self,
        word: &str,
        seen: &mut SeenSet,
        allow_distractors: bool,
        utterance: &Utterance,
    ) -> SpokenToken {
        let canonical = normalize(word);

        let resolved = self
            .vocabulary
            .lookup_forms(&canonical)
            .iter()
            .find_map(|form| self.resolve(form, seen, allow_distractors));
        let (mapped_identity, classification) = match resolved {
            Some((identity, classification)) => (Some(identity), classification),
            None => (None, Classification::Intrusion),
        };

        SpokenToken {
            raw_text: word.to_string(),
            canonical_text: canonical,
            mapped_identity,
            classification,
            timestamp: utterance.timestamp,
            confidence: utterance.confidence,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::vocabulary::{TargetSpec, VocabularyConfig};
    use chrono::{TimeZone, Utc};

    fn vocabulary() -> Vocabulary {
        Vocabulary::build(&VocabularyConfig::default()).unwrap()
    }

    #[test]
    fn first_mention_is_target_then_repeat() {
        let vocab = vocabulary();
        let classifier = Classifier::new(&vocab);
        let utterance = Utterance::new("casa casa");
        let mut seen = SeenSet::new();

        let first = classifier.classify("casa", &mut seen, false, &utterance);
        let second = classifier.classify("Casa", &mut seen, false, &utterance);
        assert_eq!(first.classification, Classification::Target);
        assert_eq!(second.classification, Classification::Repeat);
        assert_eq!(second.mapped_identity.as_deref(), Some("casa"));
    }

    #[test]
    fn synonyms_share_one_seen_entry() {
        let vocab = vocabulary();
        let classifier = Classifier::new(&vocab);
        let utterance = Utterance::new("tênis sapato");
        let mut seen = SeenSet::new();

        let synonym = classifier.classify("tênis", &mut seen, false, &utterance);
        let primary = classifier.classify("sapato", &mut seen, false, &utterance);
        assert_eq!(synonym.classification, Classification::Target);
        assert_eq!(synonym.mapped_identity.as_deref(), Some("sapato"));
        assert_eq!(primary.classification, Classification::Repeat);
        assert_eq!(seen.len(), 1);
    }

    #[test]
    fn distractor_outside_recognition_is_intrusion() {
        let vocab = vocabulary();
        let classifier = Classifier::new(&vocab);
        let token = classifier.classify("chaleira", &mut SeenSet::new(), false, &Utterance::new("chaleira"));
        assert_eq!(token.classification, Classification::Intrusion);
        assert_eq!(token.mapped_identity.as_deref(), Some("chaleira"));
    }

    #[test]
    fn unknown_word_is_unmapped_intrusion() {
        let vocab = vocabulary();
        let classifier = Classifier::new(&vocab);
        let token = classifier.classify("Foguete", &mut SeenSet::new(), true, &Utterance::new("Foguete"));
        assert_eq!(token.classification, Classification::Intrusion);
        assert_eq!(token.canonical_text, "foguete");
        assert!(token.mapped_identity.is_none());
    }

    #[test]
    fn recognition_only_target_synonym_dedupes_with_primary() {
        let vocab = vocabulary();
        let classifier = Classifier::new(&vocab);
        let utterance = Utterance::new("sapatilha sapato");
        let mut seen = SeenSet::new();

        let synonym = classifier.classify("sapatilha", &mut seen, true, &utterance);
        let primary = classifier.classify("sapato", &mut seen, true, &utterance);
        assert_eq!(synonym.classification, Classification::Target);
        assert_eq!(primary.classification, Classification::Repeat);
    }

    #[test]
    fn target_wins_over_distractor_form() {
        let mut config = VocabularyConfig::default();
        config.targets.push(TargetSpec {
            word: "chapéu".to_string(),
            synonyms: vec!["chaleira".to_string()],
        });
        let vocab = Vocabulary::build(&config).unwrap();
        let classifier = Classifier::new(&vocab);
        let utterance = Utterance::new("chaleira");

        for allow_distractors in [false, true] {
            let token = classifier.classify("chaleira", &mut SeenSet::new(), allow_distractors, &utterance);
            assert_eq!(token.classification, Classification::Target);
            assert_eq!(token.mapped_identity.as_deref(), Some("chapéu"));
        }
    }

    #[test]
    fn exact_distractor_beats_singular_target() {
        let mut config = VocabularyConfig::default();
        config.distractors.push("colheres".to_string());
        let vocab = Vocabulary::build(&config).unwrap();
        let classifier = Classifier::new(&vocab);
        let utterance = Utterance::new("colheres");

        let recall = classifier.classify("colheres", &mut SeenSet::new(), false, &utterance);
        assert_eq!(recall.classification, Classification::Intrusion);
        assert_eq!(recall.mapped_identity.as_deref(), Some("colheres"));

        let mut seen = SeenSet::new();
        let recognition = classifier.classify("colheres", &mut seen, true, &utterance);
        assert_eq!(recognition.classification, Classification::Distractor);
        assert!(seen.is_empty());
    }

    #[test]
    fn plural_falls_back_to_singular_target() {
        let vocab = vocabulary();
        let classifier = Classifier::new(&vocab);
        let token = classifier.classify("Aviões", &mut SeenSet::new(), false, &Utterance::new("Aviões"));
        assert_eq!(token.classification, Classification::Target);
        assert_eq!(token.mapped_identity.as_deref(), Some("avião"));
        assert_eq!(token.canonical_text, "avioes");
    }

    #[test]
    fn seeded_set_ignores_blank_entries() {
        let seen = SeenSet::seeded(["Avião", "", "  "]);
        assert_eq!(seen.len(), 1);
        assert!(seen.contains("aviao"));
    }

    #[test]
    fn token_carries_utterance_metadata() {
        let vocab = vocabulary();
        let classifier = Classifier::new(&vocab);
        let spoken_at = Utc.with_ymd_and_hms(2026, 3, 14, 9, 30, 0).unwrap();
        let utterance = Utterance::new("pente").with_confidence(0.87).at(spoken_at);
        let token = classifier.classify("pente", &mut SeenSet::new(), false, &utterance);
        assert_eq!(token.timestamp, spoken_at);
        assert_eq!(token.confidence, Some(0.87));
    }
}
