//! Append-only activity logs and the resumable study snapshot.
//!
//! Quiz results, quiz sessions and study sessions each live in their own
//! list. Records are appended, never edited; only `clear_all` removes them.

use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;

use crate::domain::{QuizResult, QuizSession, StudySessionRecord, StudySnapshot};
use crate::storage::{
    keys, load_blob, load_list, load_list_for_write, save_blob, LogOnError, Result, SharedStorage,
    StorageError,
};

pub struct ActivityLog {
    storage: SharedStorage,
}

impl ActivityLog {
    pub fn new(storage: SharedStorage) -> Self {
        Self { storage }
    }

    // ==================== Recording ====================

    pub fn record_quiz_result(&self, result: &QuizResult) -> Result<()> {
        self.append(keys::QUIZ_RESULTS, result)?;
        self.touch(result.timestamp);
        Ok(())
    }

    pub fn record_quiz_session(&self, session: &QuizSession) -> Result<()> {
        self.append(keys::QUIZ_SESSIONS, session)?;
        tracing::info!(
            "Recorded {} quiz for deck {}: {}/{} correct",
            session.quiz_type,
            session.deck_id,
            session.correct_count(),
            session.answer_count()
        );
        self.touch(session.timestamp);
        Ok(())
    }

    pub fn record_study_session(&self, record: &StudySessionRecord) -> Result<()> {
        self.append(keys::STUDY_SESSIONS, record)?;
        tracing::info!(
            "Recorded study session for deck {}: {}/{} known",
            record.deck_id,
            record.correct_answers,
            record.total_answers
        );
        self.touch(record.timestamp);
        Ok(())
    }

    /// Erase every log, the study snapshot and the activity stamp.
    pub fn clear_all(&self) -> Result<()> {
        for key in keys::ACTIVITY_KEYS {
            self.storage.remove_item(key)?;
        }
        tracing::info!("Cleared all activity data");
        Ok(())
    }

    // ==================== Reading ====================

    pub fn quiz_results(&self) -> Vec<QuizResult> {
        load_list(&*self.storage, keys::QUIZ_RESULTS)
    }

    pub fn quiz_sessions(&self) -> Vec<QuizSession> {
        load_list(&*self.storage, keys::QUIZ_SESSIONS)
    }

    pub fn study_sessions(&self) -> Vec<StudySessionRecord> {
        load_list(&*self.storage, keys::STUDY_SESSIONS)
    }

    /// Time of the most recent recorded activity
    pub fn last_activity(&self) -> Option<DateTime<Utc>> {
        load_blob::<i64>(&*self.storage, keys::LAST_ACTIVITY)
            .log_warn("Failed to load last activity")
            .flatten()
            .and_then(|millis| Utc.timestamp_millis_opt(millis).single())
    }

    // ==================== Study snapshot ====================

    pub fn save_study_snapshot(&self, snapshot: &StudySnapshot) -> Result<()> {
        save_blob(&*self.storage, keys::STUDY_SNAPSHOT, snapshot)
    }

    pub fn load_study_snapshot(&self) -> Option<StudySnapshot> {
        self.load_study_snapshot_at(Utc::now())
    }

    /// Load the snapshot as of `now`; an expired or unreadable snapshot is cleared.
    pub fn load_study_snapshot_at(&self, now: DateTime<Utc>) -> Option<StudySnapshot> {
        let loaded = load_blob::<StudySnapshot>(&*self.storage, keys::STUDY_SNAPSHOT);
        let snapshot = match loaded {
            Ok(Some(snapshot)) => snapshot,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!("Discarding unreadable study snapshot: {}", e);
                self.clear_study_snapshot()
                    .log_warn("Failed to clear study snapshot");
                return None;
            }
        };

        if snapshot.is_expired_at(now) {
            tracing::debug!(
                "Study snapshot for deck {} expired (saved {})",
                snapshot.selected_deck,
                snapshot.timestamp
            );
            self.clear_study_snapshot()
                .log_warn("Failed to clear expired study snapshot");
            return None;
        }
        Some(snapshot)
    }

    pub fn clear_study_snapshot(&self) -> Result<()> {
        self.storage.remove_item(keys::STUDY_SNAPSHOT)
    }

    // Entries are kept as raw JSON so fields this version doesn't know survive the rewrite
    fn append<T: Serialize>(&self, key: &str, item: &T) -> Result<()> {
        let mut items: Vec<serde_json::Value> = load_list_for_write(&*self.storage, key)?;
        items.push(serde_json::to_value(item)?);
        save_blob(&*self.storage, key, &items)
    }

    // The record is already stored; a stale stamp only affects the streak
    fn touch(&self, at: DateTime<Utc>) {
        let previous = match load_blob::<i64>(&*self.storage, keys::LAST_ACTIVITY) {
            Ok(previous) => previous,
            Err(StorageError::Json(e)) => {
                tracing::warn!("Replacing malformed last activity: {}", e);
                None
            }
            Err(e) => {
                tracing::warn!("Failed to update last activity: {}", e);
                return;
            }
        };
        let latest = previous.map_or(at.timestamp_millis(), |p| p.max(at.timestamp_millis()));
        save_blob(&*self.storage, keys::LAST_ACTIVITY, &latest)
            .log_warn("Failed to update last activity");
    }
}
