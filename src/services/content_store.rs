//! User decks and cards, merged with the built-in catalog on read.
//!
//! Built-in content is immutable: every mutation only touches user content,
//! and each one rewrites both user collections before returning. Invalid
//! input and unknown ids are no-ops (`None` / `false`), logged at debug.

use std::collections::HashSet;

use crate::config::DEFAULT_DECK_DESCRIPTION;
use crate::content;
use crate::domain::{new_card_id, new_deck_id, Card, CardUpdate, Deck};
use crate::storage::{keys, load_list, load_list_for_write, save_blob, Result, SharedStorage};
use crate::validation::{optional_text, required_text};

pub struct ContentStore {
    storage: SharedStorage,
}

impl ContentStore {
    pub fn new(storage: SharedStorage) -> Self {
        Self { storage }
    }

    // ==================== Reads ====================

    /// User decks in insertion order
    pub fn user_decks(&self) -> Vec<Deck> {
        load_list::<Deck>(&*self.storage, keys::CUSTOM_DECKS)
            .into_iter()
            .filter(|d| !d.id.is_empty())
            .collect()
    }

    /// User cards in insertion order
    pub fn user_cards(&self) -> Vec<Card> {
        load_list::<Card>(&*self.storage, keys::CUSTOM_CARDS)
            .into_iter()
            .filter(|c| !c.id.is_empty())
            .collect()
    }

    /// Built-in decks followed by user decks, without duplicate ids
    pub fn list_decks(&self) -> Vec<Deck> {
        let mut seen = HashSet::new();
        let mut decks = Vec::new();
        for deck in content::builtin_decks().iter().cloned().chain(self.user_decks()) {
            if seen.insert(deck.id.clone()) {
                decks.push(deck);
            } else {
                tracing::warn!("Skipping duplicate deck id {}", deck.id);
            }
        }
        decks
    }

    /// Built-in cards for the deck followed by its user cards, without duplicate ids
    pub fn list_cards(&self, deck_id: &str) -> Vec<Card> {
        dedup_cards(
            content::builtin_cards_for(deck_id)
                .cloned()
                .chain(self.user_cards().into_iter().filter(|c| c.deck_id == deck_id)),
        )
    }

    /// Every card across all decks, built-in first
    pub fn all_cards(&self) -> Vec<Card> {
        dedup_cards(content::builtin_cards().iter().cloned().chain(self.user_cards()))
    }

    pub fn get_deck(&self, deck_id: &str) -> Option<Deck> {
        if let Some(deck) = content::builtin_deck(deck_id) {
            return Some(deck.clone());
        }
        self.user_decks().into_iter().find(|d| d.id == deck_id)
    }

    pub fn get_card(&self, card_id: &str) -> Option<Card> {
        self.all_cards().into_iter().find(|c| c.id == card_id)
    }

    pub fn is_user_deck(&self, deck_id: &str) -> bool {
        !content::is_builtin_deck(deck_id) && self.user_decks().iter().any(|d| d.id == deck_id)
    }

    // ==================== Decks ====================

    /// Create a user deck. Returns `None` when the trimmed name is empty.
    pub fn create_deck(&self, name: &str, description: Option<&str>) -> Result<Option<Deck>> {
        let Some(name) = required_text(name) else {
            tracing::debug!("Rejected deck with empty name");
            return Ok(None);
        };
        let description =
            optional_text(description).unwrap_or_else(|| DEFAULT_DECK_DESCRIPTION.to_string());

        let deck = Deck::new(new_deck_id(), name, description);
        let mut decks = self.stored_decks()?;
        decks.push(deck.clone());
        self.persist(&decks, &self.stored_cards()?)?;

        tracing::info!("Created deck {} ({})", deck.id, deck.name);
        Ok(Some(deck))
    }

    /// Delete a user deck and all of its user cards.
    pub fn delete_deck(&self, deck_id: &str) -> Result<bool> {
        if content::is_builtin_deck(deck_id) {
            tracing::debug!("Refusing to delete built-in deck {}", deck_id);
            return Ok(false);
        }

        let mut decks = self.stored_decks()?;
        let before = decks.len();
        decks.retain(|d| d.id != deck_id);
        if decks.len() == before {
            tracing::debug!("Delete of unknown deck {} ignored", deck_id);
            return Ok(false);
        }

        let mut cards = self.stored_cards()?;
        let card_count = cards.len();
        cards.retain(|c| c.deck_id != deck_id);
        self.persist(&decks, &cards)?;

        tracing::info!(
            "Deleted deck {} and {} of its cards",
            deck_id,
            card_count - cards.len()
        );
        Ok(true)
    }

    // ==================== Cards ====================

    /// Add a user card to an existing deck (built-in or user).
    pub fn create_card(
        &self,
        deck_id: &str,
        english: &str,
        translated: &str,
        example: Option<&str>,
    ) -> Result<Option<Card>> {
        let (Some(english), Some(translated)) = (required_text(english), required_text(translated))
        else {
            tracing::debug!("Rejected card with empty text for deck {}", deck_id);
            return Ok(None);
        };
        if self.get_deck(deck_id).is_none() {
            tracing::debug!("Rejected card for unknown deck {}", deck_id);
            return Ok(None);
        }

        let card = Card::new(new_card_id(), english, translated, deck_id, optional_text(example));
        let mut cards = self.stored_cards()?;
        cards.push(card.clone());
        self.persist(&self.stored_decks()?, &cards)?;

        tracing::info!("Created card {} in deck {}", card.id, deck_id);
        Ok(Some(card))
    }

    /// Edit a user card in place. Built-in cards cannot be edited.
    pub fn update_card(&self, card_id: &str, update: &CardUpdate) -> Result<Option<Card>> {
        if content::is_builtin_card(card_id) {
            tracing::debug!("Refusing to edit built-in card {}", card_id);
            return Ok(None);
        }

        let mut cards = self.stored_cards()?;
        let Some(card) = cards.iter_mut().find(|c| c.id == card_id) else {
            tracing::debug!("Update of unknown card {} ignored", card_id);
            return Ok(None);
        };

        let english = match &update.english {
            Some(text) => required_text(text),
            None => Some(card.english.clone()),
        };
        let translated = match &update.translated {
            Some(text) => required_text(text),
            None => Some(card.translated.clone()),
        };
        let (Some(english), Some(translated)) = (english, translated) else {
            tracing::debug!("Rejected update leaving card {} with empty text", card_id);
            return Ok(None);
        };

        card.english = english;
        card.translated = translated;
        if let Some(example) = &update.example {
            card.example = optional_text(Some(example));
        }
        let updated = card.clone();

        self.persist(&self.stored_decks()?, &cards)?;
        tracing::info!("Updated card {}", card_id);
        Ok(Some(updated))
    }

    /// Delete a user card. Built-in cards cannot be deleted.
    pub fn delete_card(&self, card_id: &str) -> Result<bool> {
        if content::is_builtin_card(card_id) {
            tracing::debug!("Refusing to delete built-in card {}", card_id);
            return Ok(false);
        }

        let mut cards = self.stored_cards()?;
        let before = cards.len();
        cards.retain(|c| c.id != card_id);
        if cards.len() == before {
            tracing::debug!("Delete of non-user card {} ignored", card_id);
            return Ok(false);
        }

        self.persist(&self.stored_decks()?, &cards)?;
        tracing::info!("Deleted card {}", card_id);
        Ok(true)
    }

    // Mutations load through these so a failed read aborts instead of
    // writing back an empty collection
    fn stored_decks(&self) -> Result<Vec<Deck>> {
        Ok(load_list_for_write::<Deck>(&*self.storage, keys::CUSTOM_DECKS)?
            .into_iter()
            .filter(|d| !d.id.is_empty())
            .collect())
    }

    fn stored_cards(&self) -> Result<Vec<Card>> {
        Ok(load_list_for_write::<Card>(&*self.storage, keys::CUSTOM_CARDS)?
            .into_iter()
            .filter(|c| !c.id.is_empty())
            .collect())
    }

    fn persist(&self, decks: &[Deck], cards: &[Card]) -> Result<()> {
        save_blob(&*self.storage, keys::CUSTOM_DECKS, &decks)?;
        save_blob(&*self.storage, keys::CUSTOM_CARDS, &cards)
    }
}

fn dedup_cards(cards: impl Iterator<Item = Card>) -> Vec<Card> {
    let mut seen = HashSet::new();
    cards
        .filter(|card| {
            let fresh = seen.insert(card.id.clone());
            if !fresh {
                tracing::warn!("Skipping duplicate card id {}", card.id);
            }
            fresh
        })
        .collect()
}
