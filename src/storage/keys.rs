//! Storage keys, one per persisted collection.

pub const CUSTOM_DECKS: &str = "flashcard-custom-decks";
pub const CUSTOM_CARDS: &str = "flashcard-custom-cards";
pub const QUIZ_RESULTS: &str = "flashcard-quiz-results";
pub const QUIZ_SESSIONS: &str = "flashcard-quiz-sessions";
pub const STUDY_SESSIONS: &str = "flashcard-study-sessions";
/// Single resumable study snapshot (absent when no pass is in progress)
pub const STUDY_SNAPSHOT: &str = "flashcard-study-session";
/// Epoch millis of the most recent recorded activity
pub const LAST_ACTIVITY: &str = "flashcard-last-activity";

/// Keys erased by a full activity reset
pub const ACTIVITY_KEYS: [&str; 5] = [
    QUIZ_RESULTS,
    QUIZ_SESSIONS,
    STUDY_SESSIONS,
    STUDY_SNAPSHOT,
    LAST_ACTIVITY,
];
