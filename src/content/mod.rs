//! Built-in content catalog.
//!
//! The catalog is compiled into the binary and never changes at runtime. Deck
//! order here is the order decks are listed in; user decks always follow.

use std::sync::LazyLock;

use crate::domain::{Card, Deck};

struct Catalog {
    decks: Vec<Deck>,
    cards: Vec<Card>,
}

static CATALOG: LazyLock<Catalog> = LazyLock::new(build_catalog);

/// Built-in decks in display order
pub fn builtin_decks() -> &'static [Deck] {
    &CATALOG.decks
}

/// All built-in cards, grouped by deck in catalog order
pub fn builtin_cards() -> &'static [Card] {
    &CATALOG.cards
}

pub fn builtin_deck(deck_id: &str) -> Option<&'static Deck> {
    CATALOG.decks.iter().find(|d| d.id == deck_id)
}

pub fn builtin_cards_for(deck_id: &str) -> impl Iterator<Item = &'static Card> + '_ {
    CATALOG.cards.iter().filter(move |c| c.deck_id == deck_id)
}

pub fn is_builtin_deck(deck_id: &str) -> bool {
    builtin_deck(deck_id).is_some()
}

pub fn is_builtin_card(card_id: &str) -> bool {
    CATALOG.cards.iter().any(|c| c.id == card_id)
}

// Helper to create a catalog card with an example sentence
fn card(id: &str, english: &str, translated: &str, deck: &str, example: &str) -> Card {
    Card::new(id, english, translated, deck, Some(example.to_string()))
}

fn build_catalog() -> Catalog {
    let decks = vec![
        Deck::new("animals", "Animals", "Common animals and pets"),
        Deck::new("food", "Food", "Food and drinks"),
        Deck::new("verbs", "Verbs", "Common action verbs"),
    ];

    let animals = [
        ("animal-1", "cat", "кот", "The cat is sleeping on the sofa."),
        ("animal-2", "dog", "собака", "My dog loves to play in the park."),
        ("animal-3", "bird", "птица", "A bird is singing outside my window."),
        ("animal-4", "fish", "рыба", "We had fish for dinner last night."),
        ("animal-5", "horse", "лошадь", "The horse galloped across the field."),
    ];

    let food = [
        ("food-1", "apple", "яблоко", "I eat an apple every morning."),
        ("food-2", "bread", "хлеб", "Please buy some bread from the store."),
        ("food-3", "water", "вода", "Drink plenty of water every day."),
        ("food-4", "cheese", "сыр", "This cheese tastes delicious."),
        ("food-5", "coffee", "кофе", "I need coffee to wake up in the morning."),
    ];

    let verbs = [
        ("verb-1", "run", "бегать", "I run every morning for exercise."),
        ("verb-2", "walk", "ходить", "Let's walk to the park together."),
        ("verb-3", "read", "читать", "I like to read books before bed."),
        ("verb-4", "write", "писать", "Please write your name on the paper."),
        ("verb-5", "speak", "говорить", "Can you speak English fluently?"),
    ];

    let mut cards = Vec::new();
    for (deck, entries) in [("animals", animals), ("food", food), ("verbs", verbs)] {
        for (id, english, translated, example) in entries {
            cards.push(card(id, english, translated, deck, example));
        }
    }

    Catalog { decks, cards }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_builtin_deck_order() {
        let ids: Vec<&str> = builtin_decks().iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["animals", "food", "verbs"]);
    }

    #[test]
    fn test_card_ids_are_unique() {
        let ids: HashSet<&str> = builtin_cards().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids.len(), builtin_cards().len());
    }

    #[test]
    fn test_every_card_references_a_builtin_deck() {
        for card in builtin_cards() {
            assert!(is_builtin_deck(&card.deck_id), "{} has unknown deck", card.id);
        }
    }

    #[test]
    fn test_cards_for_deck() {
        let animals: Vec<&str> = builtin_cards_for("animals").map(|c| c.english.as_str()).collect();
        assert_eq!(animals, vec!["cat", "dog", "bird", "fish", "horse"]);
        assert_eq!(builtin_cards_for("custom-x").count(), 0);
    }

    #[test]
    fn test_lookup_helpers() {
        assert!(is_builtin_card("verb-3"));
        assert!(!is_builtin_card("custom-card-1"));
        assert_eq!(builtin_deck("food").map(|d| d.name.as_str()), Some("Food"));
    }
}
