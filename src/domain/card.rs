use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::{CUSTOM_CARD_ID_PREFIX, CUSTOM_DECK_ID_PREFIX};

/// A named group of cards.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Deck {
  pub id: String,
  pub name: String,
  pub description: String,
}

impl Deck {
  pub fn new(id: impl Into<String>, name: impl Into<String>, description: impl Into<String>) -> Self {
    Self {
      id: id.into(),
      name: name.into(),
      description: description.into(),
    }
  }
}

/// A word pair. `english` is the answer side, `translated` the prompt side.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Card {
  pub id: String,
  pub english: String,
  /// Older blobs stored the translation under `russian`
  #[serde(alias = "russian")]
  pub translated: String,
  #[serde(rename = "deck", alias = "deckId")]
  pub deck_id: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub example: Option<String>,
}

impl Card {
  pub fn new(
    id: impl Into<String>,
    english: impl Into<String>,
    translated: impl Into<String>,
    deck_id: impl Into<String>,
    example: Option<String>,
  ) -> Self {
    Self {
      id: id.into(),
      english: english.into(),
      translated: translated.into(),
      deck_id: deck_id.into(),
      example,
    }
  }
}

/// Field changes for a user card. `None` leaves a field untouched; an empty
/// `example` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardUpdate {
  pub english: Option<String>,
  pub translated: Option<String>,
  pub example: Option<String>,
}

/// Fresh id for a user deck
pub fn new_deck_id() -> String {
  format!("{}{}", CUSTOM_DECK_ID_PREFIX, Uuid::new_v4())
}

/// Fresh id for a user card
pub fn new_card_id() -> String {
  format!("{}{}", CUSTOM_CARD_ID_PREFIX, Uuid::new_v4())
}
