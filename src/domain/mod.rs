pub mod activity;
pub mod card;

pub use activity::{accuracy_percent, QuizResult, QuizSession, QuizType, StudySessionRecord, StudySnapshot};
pub use card::{new_card_id, new_deck_id, Card, CardUpdate, Deck};
