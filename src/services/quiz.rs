//! Quiz runner: one pass through a deck in quiz mode.
//!
//! ```text
//! SelectingDeckAndType -> Answering(0) -> ShowingFeedback(0) -> Answering(1) -> ... -> Complete
//! ```
//!
//! Each answer is appended to the result log as soon as it is checked. The
//! session is written only when the last card's feedback is dismissed;
//! cancelling or starting over discards the partial session.

use chrono::Utc;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use thiserror::Error;

use crate::config::DISTRACTOR_COUNT;
use crate::domain::{accuracy_percent, Card, QuizResult, QuizSession, QuizType};
use crate::services::{ActivityLog, ContentStore};
use crate::storage::StorageError;
use crate::validation::{answers_match, normalize_answer};

#[derive(Debug, Error)]
pub enum QuizError {
    #[error("Unknown deck: {0}")]
    UnknownDeck(String),

    #[error("Deck {0} has no cards")]
    EmptyDeck(String),

    #[error("Answer is empty")]
    EmptyAnswer,

    #[error("Cannot {action} while {phase}")]
    InvalidTransition {
        action: &'static str,
        phase: &'static str,
    },

    #[error(transparent)]
    Storage(#[from] StorageError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizPhase {
    SelectingDeckAndType,
    Answering { index: usize },
    ShowingFeedback { index: usize, correct: bool },
    Complete,
}

impl QuizPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SelectingDeckAndType => "selecting deck and type",
            Self::Answering { .. } => "answering",
            Self::ShowingFeedback { .. } => "showing feedback",
            Self::Complete => "complete",
        }
    }
}

/// Score of the answers given so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizSummary {
    pub correct: u32,
    pub incorrect: u32,
    pub total: u32,
    pub accuracy: u32,
}

pub struct QuizRun {
    deck_id: Option<String>,
    quiz_type: Option<QuizType>,
    cards: Vec<Card>,
    /// Cards distractors are drawn from
    pool: Vec<Card>,
    options: Vec<String>,
    results: Vec<QuizResult>,
    phase: QuizPhase,
}

impl Default for QuizRun {
    fn default() -> Self {
        Self::new()
    }
}

impl QuizRun {
    pub fn new() -> Self {
        Self {
            deck_id: None,
            quiz_type: None,
            cards: Vec::new(),
            pool: Vec::new(),
            options: Vec::new(),
            results: Vec::new(),
            phase: QuizPhase::SelectingDeckAndType,
        }
    }

    // ==================== Transitions ====================

    /// Start a quiz over a shuffled copy of the deck. Any run in progress is
    /// abandoned without recording a session.
    pub fn start(
        &mut self,
        store: &ContentStore,
        deck_id: &str,
        quiz_type: QuizType,
    ) -> Result<(), QuizError> {
        if store.get_deck(deck_id).is_none() {
            return Err(QuizError::UnknownDeck(deck_id.to_string()));
        }
        let mut cards = store.list_cards(deck_id);
        if cards.is_empty() {
            return Err(QuizError::EmptyDeck(deck_id.to_string()));
        }

        self.cancel();
        cards.shuffle(&mut rand::rng());
        self.deck_id = Some(deck_id.to_string());
        self.quiz_type = Some(quiz_type);
        self.cards = cards;
        self.pool = store.all_cards();
        self.phase = QuizPhase::Answering { index: 0 };
        self.refresh_options();

        tracing::debug!(
            "Started {} quiz on deck {} with {} cards",
            quiz_type,
            deck_id,
            self.cards.len()
        );
        Ok(())
    }

    /// Check an answer for the current card and record the result.
    pub fn submit_answer(&mut self, answer: &str, log: &ActivityLog) -> Result<QuizResult, QuizError> {
        let QuizPhase::Answering { index } = self.phase else {
            return Err(self.invalid("submit an answer"));
        };
        let answer = answer.trim();
        if answer.is_empty() {
            return Err(QuizError::EmptyAnswer);
        }

        let card = &self.cards[index];
        let correct = answers_match(answer, &card.english);
        let result = QuizResult {
            card_id: card.id.clone(),
            correct,
            user_answer: answer.to_string(),
            correct_answer: card.english.clone(),
            timestamp: Utc::now(),
        };
        log.record_quiz_result(&result)?;

        self.results.push(result.clone());
        self.phase = QuizPhase::ShowingFeedback { index, correct };
        Ok(result)
    }

    /// Move past the feedback screen; after the last card the session is recorded.
    pub fn advance(&mut self, log: &ActivityLog) -> Result<QuizPhase, QuizError> {
        let QuizPhase::ShowingFeedback { index, .. } = self.phase else {
            return Err(self.invalid("advance"));
        };

        if index + 1 < self.cards.len() {
            self.phase = QuizPhase::Answering { index: index + 1 };
            self.refresh_options();
        } else {
            let session = QuizSession {
                deck_id: self.deck_id.clone().unwrap_or_default(),
                quiz_type: self.quiz_type.unwrap_or_default(),
                results: self.results.clone(),
                timestamp: Utc::now(),
            };
            log.record_quiz_session(&session)?;
            self.phase = QuizPhase::Complete;
            self.options.clear();
        }
        Ok(self.phase)
    }

    /// Return to deck selection. Results already recorded stay in the log.
    pub fn cancel(&mut self) {
        if matches!(
            self.phase,
            QuizPhase::Answering { .. } | QuizPhase::ShowingFeedback { .. }
        ) {
            tracing::debug!(
                "Abandoned quiz on deck {} after {} answers",
                self.deck_id.as_deref().unwrap_or("?"),
                self.results.len()
            );
        }
        *self = Self::new();
    }

    // ==================== State ====================

    pub fn phase(&self) -> QuizPhase {
        self.phase
    }

    pub fn deck_id(&self) -> Option<&str> {
        self.deck_id.as_deref()
    }

    pub fn quiz_type(&self) -> Option<QuizType> {
        self.quiz_type
    }

    /// Card being asked or just answered
    pub fn current_card(&self) -> Option<&Card> {
        match self.phase {
            QuizPhase::Answering { index } | QuizPhase::ShowingFeedback { index, .. } => {
                self.cards.get(index)
            }
            _ => None,
        }
    }

    /// Text shown to the user: the translated word
    pub fn prompt(&self) -> Option<&str> {
        self.current_card().map(|c| c.translated.as_str())
    }

    /// Choices for multiple choice; empty for fill-in-blank
    pub fn options(&self) -> &[String] {
        &self.options
    }

    pub fn results(&self) -> &[QuizResult] {
        &self.results
    }

    /// (1-based position of the current card, total cards)
    pub fn progress(&self) -> (usize, usize) {
        let position = match self.phase {
            QuizPhase::Answering { index } | QuizPhase::ShowingFeedback { index, .. } => index + 1,
            QuizPhase::Complete => self.cards.len(),
            QuizPhase::SelectingDeckAndType => 0,
        };
        (position, self.cards.len())
    }

    pub fn summary(&self) -> QuizSummary {
        let total = self.results.len() as u32;
        let correct = self.results.iter().filter(|r| r.correct).count() as u32;
        QuizSummary {
            correct,
            incorrect: total - correct,
            total,
            accuracy: accuracy_percent(correct, total),
        }
    }

    fn refresh_options(&mut self) {
        let options = match (self.quiz_type, self.current_card()) {
            (Some(QuizType::MultipleChoice), Some(card)) => {
                generate_options(card, &self.pool, &mut rand::rng())
            }
            _ => Vec::new(),
        };
        self.options = options;
    }

    fn invalid(&self, action: &'static str) -> QuizError {
        QuizError::InvalidTransition {
            action,
            phase: self.phase.as_str(),
        }
    }
}

/// Multiple choice options: the card's English word plus up to
/// `DISTRACTOR_COUNT` other distinct English words from `pool`, shuffled.
pub(crate) fn generate_options(card: &Card, pool: &[Card], rng: &mut impl Rng) -> Vec<String> {
    let correct = normalize_answer(&card.english);

    let mut distractors: Vec<String> = pool
        .iter()
        .filter(|c| c.id != card.id && normalize_answer(&c.english) != correct)
        .map(|c| c.english.clone())
        .collect();

    // Deduplicate before shuffling so each word has the same chance
    distractors.sort_by_key(|w| normalize_answer(w));
    distractors.dedup_by_key(|w| normalize_answer(w));
    distractors.shuffle(rng);
    distractors.truncate(DISTRACTOR_COUNT);

    let mut options = vec![card.english.clone()];
    options.extend(distractors);
    options.shuffle(rng);
    options
}
