use serde::Serialize;
use std::process::ExitCode;
use std::sync::Arc;
use thiserror::Error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vocab_flashcards::config::{self, PROBLEM_CARDS_LIMIT};
use vocab_flashcards::services::{ActivityLog, ContentStore, StatsAggregator};
use vocab_flashcards::storage::{SharedStorage, SqliteStorage, StorageError};

#[derive(Debug, Error)]
enum CliError {
  #[error("usage: vocab-flashcards <decks | cards <deck-id> | stats | reset --yes>")]
  Usage,

  #[error("Unknown deck: {0}")]
  UnknownDeck(String),

  #[error("Refusing to erase activity data without --yes")]
  ResetNotConfirmed,

  #[error(transparent)]
  Storage(#[from] StorageError),

  #[error(transparent)]
  Json(#[from] serde_json::Error),
}

fn main() -> ExitCode {
  tracing_subscriber::registry()
    .with(
      tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "vocab_flashcards=info".into()),
    )
    .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
    .init();

  let args: Vec<String> = std::env::args().skip(1).collect();

  let db_path = config::load_database_path();
  let storage: SharedStorage = match SqliteStorage::open(&db_path) {
    Ok(storage) => Arc::new(storage),
    Err(e) => {
      tracing::error!("Failed to open storage at {}: {}", db_path.display(), e);
      return ExitCode::FAILURE;
    }
  };

  match run(&args, storage) {
    Ok(()) => ExitCode::SUCCESS,
    Err(e) => {
      eprintln!("{}", e);
      ExitCode::FAILURE
    }
  }
}

fn run(args: &[String], storage: SharedStorage) -> Result<(), CliError> {
  let content = ContentStore::new(storage.clone());
  let activity = ActivityLog::new(storage);
  let args: Vec<&str> = args.iter().map(String::as_str).collect();

  match args.as_slice() {
    ["decks"] => print_json(&content.list_decks()),
    ["cards", deck_id] => {
      if content.get_deck(deck_id).is_none() {
        return Err(CliError::UnknownDeck(deck_id.to_string()));
      }
      print_json(&content.list_cards(deck_id))
    }
    ["stats"] => {
      let aggregator = StatsAggregator::new(&content, &activity);
      print_json(&serde_json::json!({
        "stats": aggregator.compute_stats(),
        "problemCards": aggregator.problem_cards(PROBLEM_CARDS_LIMIT),
      }))
    }
    ["reset", "--yes"] => {
      activity.clear_all()?;
      println!("{{\"cleared\":true}}");
      Ok(())
    }
    ["reset"] => Err(CliError::ResetNotConfirmed),
    _ => Err(CliError::Usage),
  }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
  println!("{}", serde_json::to_string_pretty(value)?);
  Ok(())
}
