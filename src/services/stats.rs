//! Statistics derived from the activity logs and the current deck list.
//!
//! Nothing here is persisted: every report is recomputed from the logs.
//! Deck statistics come from the session logs; the flat per-answer log only
//! feeds per-card statistics, so no answer is ever counted twice.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::domain::{accuracy_percent, Deck};
use crate::services::{ActivityLog, ContentStore};

/// Counters for one deck.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeckStats {
    pub deck_id: String,
    pub deck_name: String,
    pub study_sessions: u32,
    pub quiz_sessions: u32,
    pub total_cards: u32,
    pub correct_answers: u32,
    pub total_answers: u32,
    /// Rounded percentage of correct answers
    pub accuracy: u32,
    #[serde(with = "chrono::serde::ts_milliseconds_option")]
    pub last_activity: Option<DateTime<Utc>>,
}

impl DeckStats {
    fn empty(deck: &Deck) -> Self {
        Self {
            deck_id: deck.id.clone(),
            deck_name: deck.name.clone(),
            study_sessions: 0,
            quiz_sessions: 0,
            total_cards: 0,
            correct_answers: 0,
            total_answers: 0,
            accuracy: 0,
            last_activity: None,
        }
    }

    fn note_activity(&mut self, at: DateTime<Utc>) {
        self.last_activity = Some(self.last_activity.map_or(at, |current| current.max(at)));
    }
}

/// Totals across all active decks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverallStats {
    pub total_study_sessions: u32,
    pub total_quiz_sessions: u32,
    pub total_cards_studied: u32,
    pub total_correct_answers: u32,
    pub total_answers: u32,
    pub overall_accuracy: u32,
    pub streak_days: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsReport {
    /// Only decks with at least one answer appear here
    pub per_deck: BTreeMap<String, DeckStats>,
    pub overall: OverallStats,
}

/// Answer history for one card, from the flat result log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardStats {
    pub card_id: String,
    pub attempts: u32,
    pub correct: u32,
    #[serde(with = "chrono::serde::ts_milliseconds_option")]
    pub last_attempt_at: Option<DateTime<Utc>>,
}

impl CardStats {
    pub fn lifetime_rate(&self) -> f64 {
        if self.attempts > 0 {
            self.correct as f64 / self.attempts as f64
        } else {
            0.0
        }
    }

    pub fn misses(&self) -> u32 {
        self.attempts - self.correct
    }
}

pub struct StatsAggregator<'a> {
    content: &'a ContentStore,
    activity: &'a ActivityLog,
}

impl<'a> StatsAggregator<'a> {
    pub fn new(content: &'a ContentStore, activity: &'a ActivityLog) -> Self {
        Self { content, activity }
    }

    pub fn compute_stats(&self) -> StatsReport {
        self.compute_stats_at(Utc::now())
    }

    /// Compute the report with `now` as the reference for the streak.
    pub fn compute_stats_at(&self, now: DateTime<Utc>) -> StatsReport {
        let mut per_deck: BTreeMap<String, DeckStats> = self
            .content
            .list_decks()
            .iter()
            .map(|deck| (deck.id.clone(), DeckStats::empty(deck)))
            .collect();

        let quiz_sessions = self.activity.quiz_sessions();
        let study_sessions = self.activity.study_sessions();

        for session in &quiz_sessions {
            let Some(stat) = per_deck.get_mut(&session.deck_id) else {
                tracing::debug!("Ignoring quiz session for unknown deck {}", session.deck_id);
                continue;
            };
            stat.quiz_sessions = stat.quiz_sessions.saturating_add(1);
            stat.total_cards = stat.total_cards.saturating_add(session.answer_count());
            stat.total_answers = stat.total_answers.saturating_add(session.answer_count());
            stat.correct_answers = stat.correct_answers.saturating_add(session.correct_count());
            stat.note_activity(session.timestamp);
        }

        for record in &study_sessions {
            let Some(stat) = per_deck.get_mut(&record.deck_id) else {
                tracing::debug!("Ignoring study session for unknown deck {}", record.deck_id);
                continue;
            };
            stat.study_sessions = stat.study_sessions.saturating_add(1);
            stat.total_cards = stat.total_cards.saturating_add(record.total_cards);
            stat.total_answers = stat.total_answers.saturating_add(record.total_answers);
            stat.correct_answers = stat.correct_answers.saturating_add(record.correct_answers);
            stat.note_activity(record.timestamp);
        }

        per_deck.retain(|_, stat| stat.total_answers > 0);
        for stat in per_deck.values_mut() {
            stat.accuracy = accuracy_percent(stat.correct_answers, stat.total_answers);
        }

        let mut overall = OverallStats::default();
        for stat in per_deck.values() {
            overall.total_study_sessions = overall.total_study_sessions.saturating_add(stat.study_sessions);
            overall.total_quiz_sessions = overall.total_quiz_sessions.saturating_add(stat.quiz_sessions);
            overall.total_correct_answers = overall.total_correct_answers.saturating_add(stat.correct_answers);
            overall.total_answers = overall.total_answers.saturating_add(stat.total_answers);
        }
        overall.total_cards_studied = overall.total_answers;
        overall.overall_accuracy = accuracy_percent(overall.total_correct_answers, overall.total_answers);

        let mut days: BTreeSet<NaiveDate> = quiz_sessions
            .iter()
            .map(|s| s.timestamp)
            .chain(study_sessions.iter().map(|s| s.timestamp))
            .chain(self.activity.quiz_results().iter().map(|r| r.timestamp))
            .map(|at| at.date_naive())
            .collect();
        if let Some(last) = self.activity.last_activity() {
            days.insert(last.date_naive());
        }
        overall.streak_days = streak_days(&days, now.date_naive());

        StatsReport { per_deck, overall }
    }

    /// Per-card answer history, ordered by card id
    pub fn card_stats(&self) -> Vec<CardStats> {
        let mut by_card: HashMap<String, CardStats> = HashMap::new();
        for result in self.activity.quiz_results() {
            let entry = by_card.entry(result.card_id.clone()).or_insert_with(|| CardStats {
                card_id: result.card_id.clone(),
                attempts: 0,
                correct: 0,
                last_attempt_at: None,
            });
            entry.attempts += 1;
            if result.correct {
                entry.correct += 1;
            }
            entry.last_attempt_at = Some(
                entry
                    .last_attempt_at
                    .map_or(result.timestamp, |current| current.max(result.timestamp)),
            );
        }

        let mut stats: Vec<CardStats> = by_card.into_values().collect();
        stats.sort_by(|a, b| a.card_id.cmp(&b.card_id));
        stats
    }

    /// Cards answered wrong at least once, lowest accuracy first
    pub fn problem_cards(&self, limit: usize) -> Vec<CardStats> {
        let mut stats: Vec<CardStats> = self
            .card_stats()
            .into_iter()
            .filter(|s| s.misses() > 0)
            .collect();
        stats.sort_by(|a, b| {
            a.lifetime_rate()
                .total_cmp(&b.lifetime_rate())
                .then_with(|| b.misses().cmp(&a.misses()))
                .then_with(|| a.card_id.cmp(&b.card_id))
        });
        stats.truncate(limit);
        stats
    }
}

/// Consecutive active days ending at the most recent one, 0 if that day is
/// older than yesterday
pub fn streak_days(active_days: &BTreeSet<NaiveDate>, today: NaiveDate) -> u32 {
    let Some(&latest) = active_days.iter().next_back() else {
        return 0;
    };
    if (today - latest).num_days() > 1 {
        return 0;
    }

    let mut streak = 0;
    let mut day = latest;
    while active_days.contains(&day) {
        streak += 1;
        match day.pred_opt() {
            Some(previous) => day = previous,
            None => break,
        }
    }
    streak
}
