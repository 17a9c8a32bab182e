//! Activity records: quiz answers, quiz and study sessions, study snapshots.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::config::SNAPSHOT_EXPIRY_HOURS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuizType {
  /// Pick the English word from four options
  #[default]
  MultipleChoice,
  /// Type the English word
  FillInBlank,
}

impl QuizType {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::MultipleChoice => "multiple-choice",
      Self::FillInBlank => "fill-in-blank",
    }
  }

  pub fn from_str(s: &str) -> Option<Self> {
    match s {
      "multiple-choice" => Some(Self::MultipleChoice),
      "fill-in-blank" => Some(Self::FillInBlank),
      _ => None,
    }
  }
}

impl std::fmt::Display for QuizType {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

/// One answered quiz question.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct QuizResult {
  pub card_id: String,
  pub correct: bool,
  pub user_answer: String,
  pub correct_answer: String,
  #[serde(with = "chrono::serde::ts_milliseconds")]
  pub timestamp: DateTime<Utc>,
}

/// A completed quiz over one deck.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct QuizSession {
  pub deck_id: String,
  pub quiz_type: QuizType,
  pub results: Vec<QuizResult>,
  #[serde(with = "chrono::serde::ts_milliseconds")]
  pub timestamp: DateTime<Utc>,
}

impl QuizSession {
  pub fn correct_count(&self) -> u32 {
    self.results.iter().filter(|r| r.correct).count() as u32
  }

  pub fn answer_count(&self) -> u32 {
    self.results.len() as u32
  }
}

/// Summary of a completed study pass.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StudySessionRecord {
  pub deck_id: String,
  pub total_cards: u32,
  pub total_answers: u32,
  pub correct_answers: u32,
  #[serde(with = "chrono::serde::ts_milliseconds")]
  pub timestamp: DateTime<Utc>,
}

/// Resumable progress of an in-progress study pass.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StudySnapshot {
  pub selected_deck: String,
  pub current_card_index: usize,
  pub correct_card_ids: BTreeSet<String>,
  pub incorrect_card_ids: BTreeSet<String>,
  #[serde(with = "chrono::serde::ts_milliseconds")]
  pub timestamp: DateTime<Utc>,
}

impl StudySnapshot {
  /// True once the snapshot is more than `SNAPSHOT_EXPIRY_HOURS` old at `now`
  pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
    now - self.timestamp > Duration::hours(SNAPSHOT_EXPIRY_HOURS)
  }
}

/// Rounded percentage of correct answers, 0 when nothing was answered
pub fn accuracy_percent(correct: u32, total: u32) -> u32 {
  if total == 0 {
    return 0;
  }
  (correct as f64 / total as f64 * 100.0).round() as u32
}
