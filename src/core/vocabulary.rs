// File: src/core/vocabulary.rs
//! Lookup tables built once from static configuration and read-only afterwards.

use crate::core::defaults;
use crate::core::normalizer::{normalize, singular_candidates};
use crate::core::tokenizer::{split_compound, tokenize};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

/// What to do when two identities claim the same canonical form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollisionPolicy {
    /// The later registration overwrites the earlier one.
    #[default]
    LastWins,
    /// Building the vocabulary fails.
    Reject,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetSpec {
    pub word: String,
    #[serde(default)]
    pub synonyms: Vec<String>,
}

/// One figure on the recognition sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecognitionItem {
    pub word: String,
    pub is_target: bool,
    #[serde(default)]
    pub synonyms: Vec<String>,
}

/// Static configuration the tables are built from. Missing fields fall back
/// to the built-in stimulus set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VocabularyConfig {
    pub targets: Vec<TargetSpec>,
    pub distractors: Vec<String>,
    pub recognition_items: Vec<RecognitionItem>,
    pub animals: Vec<String>,
    pub collision_policy: CollisionPolicy,
    /// Try singular forms when an exact lookup misses.
    pub match_plurals: bool,
}

impl Default for VocabularyConfig {
    fn default() -> Self {
        Self {
            targets: defaults::targets(),
            distractors: defaults::distractors(),
            recognition_items: defaults::recognition_items(),
            animals: defaults::animals(),
            collision_policy: CollisionPolicy::default(),
            match_plurals: true,
        }
    }
}

/// A target identity as stored under each of its canonical forms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetEntry {
    /// Display form of the primary word, e.g. "avião".
    pub identity: String,
    /// Canonical primary form; the key used for deduplication.
    pub canonical: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecognitionEntry {
    pub identity: String,
    pub canonical: String,
    pub is_target: bool,
}

trait Identified {
    fn identity(&self) -> &str;
}

impl Identified for TargetEntry {
    fn identity(&self) -> &str {
        &self.identity
    }
}

impl Identified for RecognitionEntry {
    fn identity(&self) -> &str {
        &self.identity
    }
}

impl Identified for String {
    fn identity(&self) -> &str {
        self
    }
}

/// Inserts `value` under `form`, applying the collision policy when the form
/// already belongs to a different identity.
fn register<V: Identified>(
    table: &mut HashMap<String, V>,
    form: String,
    value: V,
    policy: CollisionPolicy,
) -> Result<()> {
    if form.is_empty() {
        warn!(identity = value.identity(), "Skipping empty vocabulary form");
        return Ok(());
    }
    if let Some(existing) = table.get(&form) {
        if existing.identity() != value.identity() {
            match policy {
                CollisionPolicy::Reject => {
                    return Err(Error::VocabularyCollision {
                        form,
                        existing: existing.identity().to_string(),
                        incoming: value.identity().to_string(),
                    });
                }
                CollisionPolicy::LastWins => {
                    warn!(
                        form = %form,
                        existing = existing.identity(),
                        incoming = value.identity(),
                        "Vocabulary collision, last registration wins"
                    );
                }
            }
        }
    }
    table.insert(form, value);
    Ok(())
}

/// Canonical form of a possibly multi-word phrase: hyphenated compounds split
/// into their parts, each word canonicalized, joined by single spaces.
/// "Lobo-Guará" and "lobo  guará" both give "lobo guara".
pub fn canonical_phrase(text: &str) -> String {
    tokenize(text)
        .into_iter()
        .flat_map(split_compound)
        .map(normalize)
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Animal names for the fluency phase, stored in canonical form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimalDictionary {
    canonical: HashSet<String>,
    /// Word count of the longest phrase; the widest window fluency scoring tries.
    longest_phrase: usize,
    match_plurals: bool,
}

impl AnimalDictionary {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut dictionary = Self {
            canonical: HashSet::new(),
            longest_phrase: 0,
            match_plurals: true,
        };
        for name in names {
            dictionary.insert(name.as_ref());
        }
        dictionary
    }

    pub fn with_plurals(mut self, match_plurals: bool) -> Self {
        self.match_plurals = match_plurals;
        self
    }

    pub fn insert(&mut self, name: &str) {
        let phrase = canonical_phrase(name);
        if phrase.is_empty() {
            return;
        }
        let words = phrase.split(' ').count();
        self.longest_phrase = self.longest_phrase.max(words);
        self.canonical.insert(phrase);
    }

    /// `phrase` must already be canonical.
    pub fn contains(&self, phrase: &str) -> bool {
        self.canonical.contains(phrase)
    }

    /// Resolves a single canonical word, falling back to its singular forms.
    pub fn resolve_word(&self, word: &str) -> Option<String> {
        if self.canonical.contains(word) {
            return Some(word.to_string());
        }
        if !self.match_plurals {
            return None;
        }
        singular_candidates(word)
            .into_iter()
            .find(|candidate| self.canonical.contains(candidate))
    }

    pub fn longest_phrase(&self) -> usize {
        self.longest_phrase
    }

    pub fn len(&self) -> usize {
        self.canonical.len()
    }

    pub fn is_empty(&self) -> bool {
        self.canonical.is_empty()
    }
}

/// All lookup tables used by the scorers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vocabulary {
    targets: HashMap<String, TargetEntry>,
    /// Targets in configuration order, primary forms only.
    target_order: Vec<TargetEntry>,
    /// canonical form -> display form
    distractors: HashMap<String, String>,
    recognition: HashMap<String, RecognitionEntry>,
    animals: AnimalDictionary,
    match_plurals: bool,
}

impl Vocabulary {
    pub fn build(config: &VocabularyConfig) -> Result<Self> {
        let policy = config.collision_policy;

        let mut targets = HashMap::new();
        let mut target_order = Vec::with_capacity(config.targets.len());
        for spec in &config.targets {
            let entry = TargetEntry {
                identity: spec.word.trim().to_string(),
                canonical: normalize(&spec.word),
            };
            register(&mut targets, entry.canonical.clone(), entry.clone(), policy)?;
            for synonym in &spec.synonyms {
                register(&mut targets, normalize(synonym), entry.clone(), policy)?;
            }
            target_order.push(entry);
        }

        let mut distractors = HashMap::new();
        for word in &config.distractors {
            register(&mut distractors, normalize(word), word.trim().to_string(), policy)?;
        }

        let mut recognition = HashMap::new();
        for item in &config.recognition_items {
            let entry = RecognitionEntry {
                identity: item.word.trim().to_string(),
                canonical: normalize(&item.word),
                is_target: item.is_target,
            };
            register(&mut recognition, entry.canonical.clone(), entry.clone(), policy)?;
            for synonym in &item.synonyms {
                register(&mut recognition, normalize(synonym), entry.clone(), policy)?;
            }
        }

        let animals = AnimalDictionary::new(&config.animals).with_plurals(config.match_plurals);

        debug!(
            target_forms = targets.len(),
            distractor_forms = distractors.len(),
            recognition_forms = recognition.len(),
            animals = animals.len(),
            "Vocabulary built"
        );

        Ok(Self {
            targets,
            target_order,
            distractors,
            recognition,
            animals,
            match_plurals: config.match_plurals,
        })
    }

    /// Forms a spoken word may match, in the order they are tried: the word
    /// itself, then its singular candidates when plural matching is on.
    pub fn lookup_forms(&self, canonical: &str) -> Vec<String> {
        let mut forms = vec![canonical.to_string()];
        if self.match_plurals {
            forms.extend(singular_candidates(canonical));
        }
        forms
    }

    /// Exact lookups. Plural handling lives in `lookup_forms`, so that an exact
    /// form in any table wins over a singular form in another.
    pub fn target(&self, form: &str) -> Option<&TargetEntry> {
        self.targets.get(form)
    }

    pub fn recognition_entry(&self, form: &str) -> Option<&RecognitionEntry> {
        self.recognition.get(form)
    }

    /// Display form of the distractor a canonical word refers to.
    pub fn distractor(&self, form: &str) -> Option<&str> {
        self.distractors.get(form).map(String::as_str)
    }

    pub fn targets(&self) -> &[TargetEntry] {
        &self.target_order
    }

    pub fn animals(&self) -> &AnimalDictionary {
        &self.animals
    }
}
