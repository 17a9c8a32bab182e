//! Application services.
//!
//! Stores own persistence; the quiz and study runners drive a single pass
//! through a deck and write to the activity log as they go.

pub mod activity_log;
pub mod content_store;
pub mod quiz;
pub mod stats;
pub mod study;

pub use activity_log::ActivityLog;
pub use content_store::ContentStore;
pub use quiz::{QuizError, QuizPhase, QuizRun, QuizSummary};
pub use stats::{CardStats, DeckStats, OverallStats, StatsAggregator, StatsReport};
pub use study::{StudyPass, StudyProgress, StudySummary};
