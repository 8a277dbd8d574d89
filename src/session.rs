// File: src/session.rs
//! Cumulative state of one battery administration: which phase is live, what
//! each phase has credited so far, and the clock drawing result.

use crate::core::engine::ScoringEngine;
use crate::core::types::{FluencyResult, RecallResult, RecognitionResult, SpokenToken, Utterance};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Naming,
    IncidentalMemory,
    ImmediateMemory,
    Learning,
    DelayedMemory,
    Recognition,
    Fluency,
    ClockDrawing,
}

/// Which scorer a phase feeds its transcripts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoringMode {
    Recall,
    Recognition,
    Fluency,
    /// Scored from the drawing, not from speech.
    Drawing,
}

impl Phase {
    pub const ALL: [Phase; 8] = [
        Phase::Naming,
        Phase::IncidentalMemory,
        Phase::ImmediateMemory,
        Phase::Learning,
        Phase::DelayedMemory,
        Phase::Recognition,
        Phase::Fluency,
        Phase::ClockDrawing,
    ];

    pub fn scoring_mode(self) -> ScoringMode {
        match self {
            Phase::Naming
            | Phase::IncidentalMemory
            | Phase::ImmediateMemory
            | Phase::Learning
            | Phase::DelayedMemory => ScoringMode::Recall,
            Phase::Recognition => ScoringMode::Recognition,
            Phase::Fluency => ScoringMode::Fluency,
            Phase::ClockDrawing => ScoringMode::Drawing,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Phase::Naming => "naming",
            Phase::IncidentalMemory => "incidental_memory",
            Phase::ImmediateMemory => "immediate_memory",
            Phase::Learning => "learning",
            Phase::DelayedMemory => "delayed_memory",
            Phase::Recognition => "recognition",
            Phase::Fluency => "fluency",
            Phase::ClockDrawing => "clock_drawing",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let wanted = name.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL.into_iter().find(|phase| {
            phase.name() == wanted || phase.name().split('_').next() == Some(wanted.as_str())
        })
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A `(transcript, is_final)` event from continuous speech recognition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptEvent {
    pub text: String,
    pub is_final: bool,
    #[serde(default)]
    pub confidence: Option<f32>,
}

impl TranscriptEvent {
    pub fn interim(text: impl Into<String>) -> Self {
        Self { text: text.into(), is_final: false, confidence: None }
    }

    pub fn final_text(text: impl Into<String>) -> Self {
        Self { text: text.into(), is_final: true, confidence: None }
    }
}

/// Result of the external clock drawing evaluator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockScore {
    score: u8,
    pub reasoning: String,
}

impl ClockScore {
    pub const MAX: u8 = 5;

    pub fn new(score: u8, reasoning: impl Into<String>) -> Result<Self> {
        if score > Self::MAX {
            return Err(Error::InvalidClockScore(score));
        }
        Ok(Self { score, reasoning: reasoning.into() })
    }

    pub fn score(&self) -> u8 {
        self.score
    }
}

/// The collaborator that grades a clock drawing image.
pub trait ClockEvaluator {
    fn evaluate(&self, image: &[u8]) -> Result<ClockScore>;
}

/// Everything one phase attempt has accumulated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PhaseTally {
    /// Credited identities (targets or canonical animal names), first occurrence order.
    pub found: Vec<String>,
    pub intrusions: Vec<SpokenToken>,
    pub repeats: Vec<SpokenToken>,
    pub distractor_hits: Vec<SpokenToken>,
}

impl PhaseTally {
    pub fn score(&self) -> usize {
        self.found.len()
    }

    /// Appends identities not already found. Returns how many were new.
    fn absorb_hits(&mut self, hits: &[String]) -> usize {
        let before = self.found.len();
        for hit in hits {
            if !self.found.contains(hit) {
                self.found.push(hit.clone());
            }
        }
        self.found.len() - before
    }
}

/// What one scored transcript changed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum PhaseUpdate {
    Recall { phase: Phase, result: RecallResult, score: usize },
    Recognition { phase: Phase, result: RecognitionResult, score: usize },
    Fluency { phase: Phase, result: FluencyResult, score: usize },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseSummary {
    pub phase: Phase,
    pub score: usize,
    pub found: Vec<String>,
    pub intrusions: usize,
    pub repeats: usize,
    pub distractor_hits: usize,
}

/// Per-phase scores for report export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatterySummary {
    pub phases: Vec<PhaseSummary>,
    pub clock: Option<ClockScore>,
}

/// Owns the active phase and every phase's tally. Scoring calls are pure; this
/// is where their deltas are merged.
#[derive(Debug, Clone, Default)]
pub struct ScreeningSession {
    active: Option<Phase>,
    tallies: BTreeMap<Phase, PhaseTally>,
    clock: Option<ClockScore>,
}

impl ScreeningSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active_phase(&self) -> Option<Phase> {
        self.active
    }

    /// Starts (or restarts) a phase with an empty tally.
    pub fn begin_phase(&mut self, phase: Phase) {
        info!(%phase, "Phase started");
        self.tallies.insert(phase, PhaseTally::default());
        if phase == Phase::ClockDrawing {
            self.clock = None;
        }
        self.active = Some(phase);
    }

    /// Closes the live phase; its tally is kept for the summary.
    pub fn end_phase(&mut self) -> Option<Phase> {
        let ended = self.active.take();
        if let Some(phase) = ended {
            info!(%phase, score = self.tally(phase).map_or(0, PhaseTally::score), "Phase ended");
        }
        ended
    }

    /// Clears every phase and the clock result.
    pub fn restart(&mut self) {
        info!("Session restarted");
        *self = Self::default();
    }

    pub fn tally(&self, phase: Phase) -> Option<&PhaseTally> {
        self.tallies.get(&phase)
    }

    pub fn clock(&self) -> Option<&ClockScore> {
        self.clock.as_ref()
    }

    /// Identities credited so far in the live phase, to seed the next scoring call.
    pub fn already_found(&self) -> &[String] {
        self.active
            .and_then(|phase| self.tallies.get(&phase))
            .map(|tally| tally.found.as_slice())
            .unwrap_or(&[])
    }

    fn live_tally(&mut self, expected: ScoringMode) -> Result<(Phase, &mut PhaseTally)> {
        let phase = self.active.ok_or(Error::NoActivePhase)?;
        if phase.scoring_mode() != expected {
            return Err(Error::PhaseMismatch {
                expected: format!("{expected:?}").to_lowercase(),
                actual: phase.to_string(),
            });
        }
        Ok((phase, self.tallies.entry(phase).or_default()))
    }

    /// Merges a recall result into the live phase. Returns the phase score.
    pub fn merge_recall(&mut self, result: &RecallResult) -> Result<usize> {
        let (phase, tally) = self.live_tally(ScoringMode::Recall)?;
        let added = tally.absorb_hits(&result.hits);
        tally.intrusions.extend(result.intrusions.iter().cloned());
        tally.repeats.extend(result.repeats.iter().cloned());
        debug!(%phase, added, score = tally.score(), "Recall merged");
        Ok(tally.score())
    }

    pub fn merge_recognition(&mut self, result: &RecognitionResult) -> Result<usize> {
        let (phase, tally) = self.live_tally(ScoringMode::Recognition)?;
        let added = tally.absorb_hits(&result.hits);
        tally.distractor_hits.extend(result.distractor_hits.iter().cloned());
        tally.intrusions.extend(result.intrusions.iter().cloned());
        tally.repeats.extend(result.repeats.iter().cloned());
        debug!(%phase, added, score = tally.score(), "Recognition merged");
        Ok(tally.score())
    }

    pub fn merge_fluency(&mut self, result: &FluencyResult) -> Result<usize> {
        let (phase, tally) = self.live_tally(ScoringMode::Fluency)?;
        let added = tally.absorb_hits(&result.animals);
        tally.intrusions.extend(result.invalid.iter().cloned());
        tally.repeats.extend(result.repeats.iter().cloned());
        debug!(%phase, added, score = tally.score(), "Fluency merged");
        Ok(tally.score())
    }

    /// Scores a transcript event against the live phase and merges the result.
    /// Interim events are display-only and return `Ok(None)`.
    pub fn handle_transcript(
        &mut self,
        engine: &ScoringEngine,
        event: &TranscriptEvent,
    ) -> Result<Option<PhaseUpdate>> {
        if !event.is_final {
            return Ok(None);
        }
        let phase = self.active.ok_or(Error::NoActivePhase)?;
        let mut utterance = Utterance::new(event.text.as_str());
        utterance.confidence = event.confidence;

        let update = match phase.scoring_mode() {
            ScoringMode::Recall => {
                let result = engine.score_recall_utterance(&utterance, self.already_found());
                let score = self.merge_recall(&result)?;
                PhaseUpdate::Recall { phase, result, score }
            }
            ScoringMode::Recognition => {
                let result = engine.score_recognition_utterance(&utterance, self.already_found());
                let score = self.merge_recognition(&result)?;
                PhaseUpdate::Recognition { phase, result, score }
            }
            ScoringMode::Fluency => {
                let result = engine.score_fluency_utterance(&utterance, self.already_found());
                let score = self.merge_fluency(&result)?;
                PhaseUpdate::Fluency { phase, result, score }
            }
            ScoringMode::Drawing => {
                return Err(Error::PhaseMismatch {
                    expected: "a spoken phase".to_string(),
                    actual: phase.to_string(),
                });
            }
        };
        Ok(Some(update))
    }

    pub fn record_clock(&mut self, score: ClockScore) -> Result<()> {
        match self.active {
            Some(Phase::ClockDrawing) => {
                info!(score = score.score(), "Clock drawing scored");
                self.clock = Some(score);
                Ok(())
            }
            Some(phase) => Err(Error::PhaseMismatch {
                expected: Phase::ClockDrawing.to_string(),
                actual: phase.to_string(),
            }),
            None => Err(Error::NoActivePhase),
        }
    }

    /// Runs the evaluator over the exported drawing and records its score.
    pub fn score_clock<E: ClockEvaluator>(&mut self, evaluator: &E, image: &[u8]) -> Result<u8> {
        let score = evaluator.evaluate(image)?;
        let value = score.score();
        self.record_clock(score)?;
        Ok(value)
    }

    pub fn summary(&self) -> BatterySummary {
        let phases = self
            .tallies
            .iter()
            .filter(|(phase, _)| phase.scoring_mode() != ScoringMode::Drawing)
            .map(|(&phase, tally)| PhaseSummary {
                phase,
                score: tally.score(),
                found: tally.found.clone(),
                intrusions: tally.intrusions.len(),
                repeats: tally.repeats.len(),
                distractor_hits: tally.distractor_hits.len(),
            })
            .collect();
        BatterySummary { phases, clock: self.clock.clone() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::vocabulary::VocabularyConfig;

    fn engine() -> ScoringEngine {
        ScoringEngine::from_config(&VocabularyConfig::default()).unwrap()
    }

    struct FixedEvaluator(u8);

    impl ClockEvaluator for FixedEvaluator {
        fn evaluate(&self, _image: &[u8]) -> Result<ClockScore> {
            ClockScore::new(self.0, "fixed")
        }
    }

    #[test]
    fn interim_events_are_not_scored() {
        let engine = engine();
        let mut session = ScreeningSession::new();
        session.begin_phase(Phase::ImmediateMemory);

        let update = session.handle_transcript(&engine, &TranscriptEvent::interim("casa sapato")).unwrap();
        assert!(update.is_none());
        assert_eq!(session.tally(Phase::ImmediateMemory).unwrap().score(), 0);
    }

    #[test]
    fn final_events_accumulate_without_double_counting() {
        let engine = engine();
        let mut session = ScreeningSession::new();
        session.begin_phase(Phase::DelayedMemory);

        for text in ["casa tênis", "sapato casa árvore", "calçado"] {
            session.handle_transcript(&engine, &TranscriptEvent::final_text(text)).unwrap();
        }
        let tally = session.tally(Phase::DelayedMemory).unwrap();
        assert_eq!(tally.found, vec!["casa", "sapato", "árvore"]);
        assert_eq!(tally.repeats.len(), 3);
    }

    #[test]
    fn restarting_a_phase_clears_its_tally() {
        let engine = engine();
        let mut session = ScreeningSession::new();
        session.begin_phase(Phase::Learning);
        session.handle_transcript(&engine, &TranscriptEvent::final_text("pente")).unwrap();
        session.begin_phase(Phase::Learning);
        assert!(session.already_found().is_empty());

        let update = session.handle_transcript(&engine, &TranscriptEvent::final_text("pente")).unwrap();
        match update {
            Some(PhaseUpdate::Recall { score, result, .. }) => {
                assert_eq!(score, 1);
                assert!(result.repeats.is_empty());
            }
            other => panic!("unexpected update {other:?}"),
        }
    }

    #[test]
    fn merging_into_wrong_phase_is_rejected() {
        let engine = engine();
        let mut session = ScreeningSession::new();
        let result = engine.score_recall("casa", &[]);
        assert!(matches!(session.merge_recall(&result), Err(Error::NoActivePhase)));

        session.begin_phase(Phase::Fluency);
        assert!(matches!(session.merge_recall(&result), Err(Error::PhaseMismatch { .. })));
    }

    #[test]
    fn fluency_phase_scores_animals() {
        let engine = engine();
        let mut session = ScreeningSession::new();
        session.begin_phase(Phase::Fluency);
        session.handle_transcript(&engine, &TranscriptEvent::final_text("gato urso polar")).unwrap();
        session.handle_transcript(&engine, &TranscriptEvent::final_text("gato mesa")).unwrap();

        let tally = session.tally(Phase::Fluency).unwrap();
        assert_eq!(tally.found, vec!["gato", "urso polar"]);
        assert_eq!(tally.intrusions.len(), 1);
        assert_eq!(tally.repeats.len(), 1);
    }

    #[test]
    fn recognition_phase_tracks_distractors() {
        let engine = engine();
        let mut session = ScreeningSession::new();
        session.begin_phase(Phase::Recognition);
        session.handle_transcript(&engine, &TranscriptEvent::final_text("avião chaleira")).unwrap();

        let tally = session.tally(Phase::Recognition).unwrap();
        assert_eq!(tally.score(), 1);
        assert_eq!(tally.distractor_hits.len(), 1);
    }

    #[test]
    fn clock_scores_are_bounded() {
        assert!(matches!(ClockScore::new(6, "too high"), Err(Error::InvalidClockScore(6))));
        assert_eq!(ClockScore::new(5, "perfect").unwrap().score(), 5);
    }

    #[test]
    fn clock_score_requires_clock_phase() {
        let mut session = ScreeningSession::new();
        session.begin_phase(Phase::Naming);
        assert!(session.score_clock(&FixedEvaluator(4), b"png").is_err());

        session.begin_phase(Phase::ClockDrawing);
        assert_eq!(session.score_clock(&FixedEvaluator(4), b"png").unwrap(), 4);
        assert_eq!(session.summary().clock.unwrap().score(), 4);
    }

    #[test]
    fn clock_phase_does_not_take_transcripts() {
        let mut session = ScreeningSession::new();
        session.begin_phase(Phase::ClockDrawing);
        let outcome = session.handle_transcript(&engine(), &TranscriptEvent::final_text("doze"));
        assert!(matches!(outcome, Err(Error::PhaseMismatch { .. })));
    }

    #[test]
    fn summary_lists_spoken_phases_in_battery_order() {
        let engine = engine();
        let mut session = ScreeningSession::new();
        session.begin_phase(Phase::ImmediateMemory);
        session.handle_transcript(&engine, &TranscriptEvent::final_text("casa livro")).unwrap();
        session.end_phase();
        session.begin_phase(Phase::Naming);
        session.handle_transcript(&engine, &TranscriptEvent::final_text("casa")).unwrap();
        session.end_phase();

        let summary = session.summary();
        let phases: Vec<_> = summary.phases.iter().map(|p| (p.phase, p.score)).collect();
        assert_eq!(phases, vec![(Phase::Naming, 1), (Phase::ImmediateMemory, 2)]);
        assert!(session.active_phase().is_none());
    }

    #[test]
    fn phase_names_parse_loosely() {
        assert_eq!(Phase::from_name("Delayed"), Some(Phase::DelayedMemory));
        assert_eq!(Phase::from_name("clock-drawing"), Some(Phase::ClockDrawing));
        assert_eq!(Phase::from_name("fluency"), Some(Phase::Fluency));
        assert_eq!(Phase::from_name("unknown"), None);
    }
}
