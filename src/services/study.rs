//! Study mode: a flip-and-mark pass through one deck, resumable for 24 hours.
//!
//! Cards are shown in deck order so a saved index still points at the same
//! card after a restart. The snapshot is rewritten on every mark and removed
//! when the pass completes or is exited; flipping never touches storage.

use std::collections::{BTreeSet, HashSet};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::{accuracy_percent, Card, StudySessionRecord, StudySnapshot};
use crate::services::{ActivityLog, ContentStore};
use crate::storage::{LogOnError, Result};

/// Outcome of marking a card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StudyProgress {
    /// Another card is up
    Next,
    Complete(StudySummary),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudySummary {
    pub deck_id: String,
    pub total_cards: u32,
    pub known: u32,
    pub unknown: u32,
    pub accuracy: u32,
}

pub struct StudyPass {
    deck_id: String,
    cards: Vec<Card>,
    index: usize,
    flipped: bool,
    known: BTreeSet<String>,
    unknown: BTreeSet<String>,
    finished: bool,
}

impl StudyPass {
    /// Begin a fresh pass. `None` if the deck has no cards.
    pub fn start(store: &ContentStore, deck_id: &str) -> Option<Self> {
        let cards = store.list_cards(deck_id);
        if cards.is_empty() {
            tracing::debug!("Cannot study deck {}: no cards", deck_id);
            return None;
        }
        Some(Self {
            deck_id: deck_id.to_string(),
            cards,
            index: 0,
            flipped: false,
            known: BTreeSet::new(),
            unknown: BTreeSet::new(),
            finished: false,
        })
    }

    /// Rebuild the pass saved in the study snapshot, if there is a fresh one.
    pub fn resume(store: &ContentStore, log: &ActivityLog) -> Option<Self> {
        Self::resume_at(store, log, Utc::now())
    }

    pub fn resume_at(store: &ContentStore, log: &ActivityLog, now: DateTime<Utc>) -> Option<Self> {
        let snapshot = log.load_study_snapshot_at(now)?;

        let cards = match store.get_deck(&snapshot.selected_deck) {
            Some(_) => store.list_cards(&snapshot.selected_deck),
            None => Vec::new(),
        };
        if cards.is_empty() {
            tracing::debug!(
                "Dropping study snapshot for deck {}: deck missing or empty",
                snapshot.selected_deck
            );
            log.clear_study_snapshot()
                .log_warn("Failed to clear study snapshot");
            return None;
        }

        let ids: HashSet<&str> = cards.iter().map(|c| c.id.as_str()).collect();
        let keep = |set: BTreeSet<String>| -> BTreeSet<String> {
            set.into_iter().filter(|id| ids.contains(id.as_str())).collect()
        };
        let known = keep(snapshot.correct_card_ids);
        let unknown = keep(snapshot.incorrect_card_ids);
        let index = snapshot.current_card_index.min(cards.len() - 1);

        tracing::debug!(
            "Resuming study of deck {} at card {}/{}",
            snapshot.selected_deck,
            index + 1,
            cards.len()
        );
        Some(Self {
            deck_id: snapshot.selected_deck,
            cards,
            index,
            flipped: false,
            known,
            unknown,
            finished: false,
        })
    }

    // ==================== Transitions ====================

    /// Show the other side of the current card
    pub fn flip(&mut self) {
        if !self.finished {
            self.flipped = !self.flipped;
        }
    }

    pub fn mark_known(&mut self, log: &ActivityLog) -> Result<StudyProgress> {
        self.mark(log, true)
    }

    pub fn mark_unknown(&mut self, log: &ActivityLog) -> Result<StudyProgress> {
        self.mark(log, false)
    }

    /// Leave the pass without recording a session.
    pub fn exit(self, log: &ActivityLog) -> Result<()> {
        tracing::debug!(
            "Exited study of deck {} at card {}/{}",
            self.deck_id,
            self.index + 1,
            self.cards.len()
        );
        log.clear_study_snapshot()
    }

    fn mark(&mut self, log: &ActivityLog, known: bool) -> Result<StudyProgress> {
        if self.finished {
            return Ok(StudyProgress::Complete(self.summary()));
        }

        let id = self.cards[self.index].id.clone();
        if known {
            self.unknown.remove(&id);
            self.known.insert(id);
        } else {
            self.known.remove(&id);
            self.unknown.insert(id);
        }
        self.flipped = false;

        if self.index + 1 < self.cards.len() {
            self.index += 1;
            log.save_study_snapshot(&self.snapshot())?;
            return Ok(StudyProgress::Next);
        }

        let summary = self.summary();
        log.record_study_session(&StudySessionRecord {
            deck_id: self.deck_id.clone(),
            total_cards: summary.total_cards,
            total_answers: summary.known + summary.unknown,
            correct_answers: summary.known,
            timestamp: Utc::now(),
        })?;
        self.finished = true;
        log.clear_study_snapshot()
            .log_warn("Failed to clear finished study snapshot");
        Ok(StudyProgress::Complete(summary))
    }

    // ==================== State ====================

    pub fn deck_id(&self) -> &str {
        &self.deck_id
    }

    pub fn current_card(&self) -> Option<&Card> {
        if self.finished {
            return None;
        }
        self.cards.get(self.index)
    }

    pub fn is_flipped(&self) -> bool {
        self.flipped
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// (1-based position, total cards)
    pub fn position(&self) -> (usize, usize) {
        (self.index + 1, self.cards.len())
    }

    pub fn summary(&self) -> StudySummary {
        let known = self.known.len() as u32;
        let unknown = self.unknown.len() as u32;
        StudySummary {
            deck_id: self.deck_id.clone(),
            total_cards: self.cards.len() as u32,
            known,
            unknown,
            accuracy: accuracy_percent(known, known + unknown),
        }
    }

    fn snapshot(&self) -> StudySnapshot {
        StudySnapshot {
            selected_deck: self.deck_id.clone(),
            current_card_index: self.index,
            correct_card_ids: self.known.clone(),
            incorrect_card_ids: self.unknown.clone(),
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{keys, SharedStorage};
    use crate::testing::{flaky_storage, memory_storage, TestEnv};
    use chrono::Duration;

    fn setup() -> (SharedStorage, ContentStore, ActivityLog) {
        let storage = memory_storage();
        (
            storage.clone(),
            ContentStore::new(storage.clone()),
            ActivityLog::new(storage),
        )
    }

    #[test]
    fn test_start_requires_cards() {
        let (_, store, _) = setup();
        assert!(StudyPass::start(&store, "missing").is_none());
        let deck = store.create_deck("Empty", None).unwrap().unwrap();
        assert!(StudyPass::start(&store, &deck.id).is_none());
    }

    #[test]
    fn test_full_pass_records_session() {
        let (storage, store, log) = setup();
        let mut pass = StudyPass::start(&store, "animals").unwrap();
        assert_eq!(pass.current_card().unwrap().id, "animal-1");

        for _ in 0..4 {
            assert_eq!(pass.mark_known(&log).unwrap(), StudyProgress::Next);
        }
        let StudyProgress::Complete(summary) = pass.mark_unknown(&log).unwrap() else {
            panic!("pass should be complete");
        };
        assert_eq!(summary.known, 4);
        assert_eq!(summary.unknown, 1);
        assert_eq!(summary.accuracy, 80);
        assert!(pass.is_finished());
        assert!(pass.current_card().is_none());

        let sessions = log.study_sessions();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].deck_id, "animals");
        assert_eq!(sessions[0].total_cards, 5);
        assert_eq!(sessions[0].total_answers, 5);
        assert_eq!(sessions[0].correct_answers, 4);
        assert_eq!(storage.get_item(keys::STUDY_SNAPSHOT).unwrap(), None);

        // Marking again after completion records nothing new
        pass.mark_known(&log).unwrap();
        assert_eq!(log.study_sessions().len(), 1);
    }

    #[test]
    fn test_flip_does_not_write() {
        let (storage, store, log) = setup();
        let mut pass = StudyPass::start(&store, "food").unwrap();
        pass.flip();
        assert!(pass.is_flipped());
        assert_eq!(storage.get_item(keys::STUDY_SNAPSHOT).unwrap(), None);

        pass.mark_known(&log).unwrap();
        assert!(!pass.is_flipped());
        let snapshot = log.load_study_snapshot().unwrap();
        assert_eq!(snapshot.selected_deck, "food");
        assert_eq!(snapshot.current_card_index, 1);
        assert!(snapshot.correct_card_ids.contains("food-1"));
    }

    #[test]
    fn test_resume_continues_where_left_off() {
        let env = TestEnv::new().unwrap();
        {
            let store = ContentStore::new(env.storage.clone());
            let log = ActivityLog::new(env.storage.clone());
            let mut pass = StudyPass::start(&store, "verbs").unwrap();
            pass.mark_known(&log).unwrap();
            pass.mark_unknown(&log).unwrap();
        }

        let storage = env.reopen().unwrap();
        let store = ContentStore::new(storage.clone());
        let log = ActivityLog::new(storage);
        let mut pass = StudyPass::resume(&store, &log).unwrap();
        assert_eq!(pass.deck_id(), "verbs");
        assert_eq!(pass.position(), (3, 5));
        assert_eq!(pass.summary().known, 1);
        assert_eq!(pass.summary().unknown, 1);

        pass.mark_known(&log).unwrap();
        pass.mark_known(&log).unwrap();
        assert!(matches!(pass.mark_known(&log).unwrap(), StudyProgress::Complete(_)));
        assert_eq!(log.study_sessions()[0].correct_answers, 4);
    }

    #[test]
    fn test_resume_clamps_to_remaining_cards() {
        let (_, store, log) = setup();
        let deck = store.create_deck("Travel", None).unwrap().unwrap();
        let a = store.create_card(&deck.id, "train", "поезд", None).unwrap().unwrap();
        let b = store.create_card(&deck.id, "ticket", "билет", None).unwrap().unwrap();
        store.create_card(&deck.id, "map", "карта", None).unwrap();

        let mut pass = StudyPass::start(&store, &deck.id).unwrap();
        pass.mark_known(&log).unwrap();
        pass.mark_unknown(&log).unwrap();

        assert!(store.delete_card(&a.id).unwrap());
        assert!(store.delete_card(&b.id).unwrap());

        let pass = StudyPass::resume(&store, &log).unwrap();
        assert_eq!(pass.position(), (1, 1));
        assert_eq!(pass.current_card().unwrap().english, "map");
        assert_eq!(pass.summary().known + pass.summary().unknown, 0);
    }

    #[test]
    fn test_resume_drops_snapshot_for_deleted_deck() {
        let (storage, store, log) = setup();
        let deck = store.create_deck("Travel", None).unwrap().unwrap();
        store.create_card(&deck.id, "train", "поезд", None).unwrap();
        store.create_card(&deck.id, "map", "карта", None).unwrap();

        let mut pass = StudyPass::start(&store, &deck.id).unwrap();
        pass.mark_known(&log).unwrap();
        assert!(store.delete_deck(&deck.id).unwrap());

        assert!(StudyPass::resume(&store, &log).is_none());
        assert_eq!(storage.get_item(keys::STUDY_SNAPSHOT).unwrap(), None);
    }

    #[test]
    fn test_resume_ignores_expired_snapshot() {
        let (_, store, log) = setup();
        let mut pass = StudyPass::start(&store, "animals").unwrap();
        pass.mark_known(&log).unwrap();

        let later = Utc::now() + Duration::hours(25);
        assert!(StudyPass::resume_at(&store, &log, later).is_none());
        assert!(StudyPass::resume(&store, &log).is_none());
    }

    #[test]
    fn test_completion_recorded_once_when_snapshot_clear_fails() {
        let (flaky, storage) = flaky_storage();
        let store = ContentStore::new(storage.clone());
        let log = ActivityLog::new(storage);
        let deck = store.create_deck("Tiny", None).unwrap().unwrap();
        store.create_card(&deck.id, "sun", "солнце", None).unwrap();

        flaky.fail_writes(keys::STUDY_SNAPSHOT);
        let mut pass = StudyPass::start(&store, &deck.id).unwrap();
        assert!(matches!(pass.mark_known(&log).unwrap(), StudyProgress::Complete(_)));
        assert!(pass.is_finished());

        // Retrying after the failed cleanup must not record a second session
        pass.mark_known(&log).unwrap();
        assert_eq!(log.study_sessions().len(), 1);
    }

    #[test]
    fn test_failed_record_leaves_pass_open() {
        let (flaky, storage) = flaky_storage();
        let store = ContentStore::new(storage.clone());
        let log = ActivityLog::new(storage);
        let deck = store.create_deck("Tiny", None).unwrap().unwrap();
        store.create_card(&deck.id, "sun", "солнце", None).unwrap();

        let mut pass = StudyPass::start(&store, &deck.id).unwrap();
        flaky.fail_writes(keys::STUDY_SESSIONS);
        assert!(pass.mark_known(&log).is_err());
        assert!(!pass.is_finished());

        flaky.heal();
        assert!(matches!(pass.mark_known(&log).unwrap(), StudyProgress::Complete(_)));
        assert_eq!(log.study_sessions().len(), 1);
    }

    #[test]
    fn test_exit_clears_without_recording() {
        let (storage, store, log) = setup();
        let mut pass = StudyPass::start(&store, "animals").unwrap();
        pass.mark_known(&log).unwrap();
        pass.exit(&log).unwrap();

        assert_eq!(storage.get_item(keys::STUDY_SNAPSHOT).unwrap(), None);
        assert!(log.study_sessions().is_empty());
    }
}
