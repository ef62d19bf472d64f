//! JSON import/export module for flashcard decks.
//! Provides functionality to save and load Deck structures to/from JSON files, plus
//! full backups and parsing of cards produced by a text generation service.

use crate::database::{StoreError, StoreResult};
use crate::models::{Card, Deck};
use chrono::Utc;
use log::info;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Export files hold either one deck or an array of decks.
#[derive(Deserialize)]
#[serde(untagged)]
enum DeckFile {
    Many(Vec<Deck>),
    One(Box<Deck>),
}

/// Exports a deck to a JSON file at the specified path.
pub fn export_json_to_path(deck: &Deck, path: impl AsRef<Path>) -> StoreResult<()> {
    let json_string = serde_json::to_string_pretty(deck)?;
    fs::write(path.as_ref(), json_string)?;
    info!("Deck '{}' exported to {}", deck.title, path.as_ref().display());
    Ok(())
}

/// Writes `<deck-id>.json` into `dir`, creating the directory if needed.
pub fn backup_deck(deck: &Deck, dir: impl AsRef<Path>) -> StoreResult<PathBuf> {
    fs::create_dir_all(dir.as_ref())?;
    let path = dir.as_ref().join(format!("{}.json", deck.id));
    export_json_to_path(deck, &path)?;
    Ok(path)
}

/// Writes every deck into `all_decks_<unix-millis>.json` inside `dir` and returns the path.
pub fn export_all_to_dir(decks: &[Deck], dir: impl AsRef<Path>) -> StoreResult<PathBuf> {
    fs::create_dir_all(dir.as_ref())?;
    let path = dir
        .as_ref()
        .join(format!("all_decks_{}.json", Utc::now().timestamp_millis()));
    fs::write(&path, serde_json::to_string_pretty(decks)?)?;
    info!("Exported {} decks to {}", decks.len(), path.display());
    Ok(path)
}

/// Imports decks from a JSON file holding a single deck or an array of decks.
/// Returns an error if the file doesn't exist, contains invalid JSON, or holds a card
/// with more correct answers than attempts.
pub fn import_json(path: impl AsRef<Path>) -> StoreResult<Vec<Deck>> {
    let contents = fs::read_to_string(path.as_ref())?;

    let decks = match serde_json::from_str::<DeckFile>(&contents)? {
        DeckFile::Many(decks) => decks,
        DeckFile::One(deck) => vec![*deck],
    };

    if let Some(card) = decks
        .iter()
        .flat_map(|deck| deck.cards.iter())
        .find(|card| !card.has_valid_stats())
    {
        return Err(StoreError::InvalidCard {
            question: card.question.clone(),
            attempts: card.attempts,
            correct: card.correct_attempts,
        });
    }

    info!(
        "Imported {} decks from '{}'",
        decks.len(),
        path.as_ref().display()
    );
    Ok(decks)
}

/// Parses the card list returned by a text generation service.
///
/// The reply is expected to be a JSON array of `{"question", "answer"}` objects, possibly
/// wrapped in a Markdown code fence.
pub fn parse_generated_cards(reply: &str) -> StoreResult<Vec<Card>> {
    let value: serde_json::Value = serde_json::from_str(strip_code_fence(reply))?;
    if !value.as_array().is_some_and(|items| !items.is_empty()) {
        return Err(StoreError::NoCardsGenerated);
    }

    let mut cards: Vec<Card> = serde_json::from_value(value)?;
    for card in &mut cards {
        card.reset_stats();
    }
    Ok(cards)
}

fn strip_code_fence(reply: &str) -> &str {
    let mut text = reply.trim();
    if let Some(rest) = text.strip_prefix("```") {
        // Drop the info string ("json") along with the rest of the opening line.
        text = rest.split_once('\n').map_or("", |(_, body)| body);
    }
    if let Some(body) = text.trim_end().strip_suffix("```") {
        text = body;
    }
    text.trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CardStatus;

    fn create_test_deck() -> Deck {
        Deck::new(
            "Test Deck",
            vec![Card::new("hello", "cześć"), Card::new("goodbye", "do widzenia")],
        )
    }

    #[test]
    fn test_export_json_to_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deck.json");

        export_json_to_path(&create_test_deck(), &path).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert!(written.contains("\"title\": \"Test Deck\""));
        assert!(written.contains("\"correctAttempts\""));
    }

    #[test]
    fn test_import_single_deck() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("single.json");
        fs::write(
            &path,
            r#"{
  "title": "Import Test Deck",
  "cards": [
    {
      "question": "test question",
      "answer": "test answer",
      "attempts": 3,
      "correctAttempts": 2,
      "status": "seen"
    }
  ]
}"#,
        )
        .unwrap();

        let decks = import_json(&path).unwrap();

        assert_eq!(decks.len(), 1);
        assert_eq!(decks[0].title, "Import Test Deck");
        assert_eq!(decks[0].cards[0].question, "test question");
        assert_eq!(decks[0].cards[0].attempts, 3);
        assert_eq!(decks[0].cards[0].correct_attempts, 2);
        assert_eq!(decks[0].cards[0].status, CardStatus::Seen);
    }

    #[test]
    fn test_export_all_then_import() {
        let dir = tempfile::tempdir().unwrap();
        let decks = vec![create_test_deck(), Deck::new("Second", Vec::new())];

        let path = export_all_to_dir(&decks, dir.path().join("backups")).unwrap();
        let file_name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(file_name.starts_with("all_decks_"));

        let imported = import_json(&path).unwrap();
        assert_eq!(imported, decks);
    }

    #[test]
    fn test_backup_deck_uses_id_as_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let deck = create_test_deck();

        let path = backup_deck(&deck, dir.path()).unwrap();

        assert_eq!(path, dir.path().join(format!("{}.json", deck.id)));
        assert_eq!(import_json(&path).unwrap()[0].id, deck.id);
    }

    #[test]
    fn test_import_nonexistent_file() {
        let result = import_json("nonexistent_file_xyz123.json");
        assert!(matches!(result, Err(StoreError::Io(_))));
    }

    #[test]
    fn test_import_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("invalid.json");
        fs::write(&path, "{ this is not valid json }").unwrap();

        assert!(matches!(import_json(&path), Err(StoreError::Json(_))));
    }

    #[test]
    fn test_import_rejects_more_correct_than_attempts() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(
            &path,
            r#"{"title":"Bad","cards":[{"question":"Q","answer":"A","attempts":0,"correctAttempts":5}]}"#,
        )
        .unwrap();

        let result = import_json(&path);
        assert!(matches!(
            result,
            Err(StoreError::InvalidCard { ref question, attempts: 0, correct: 5 }) if question == "Q"
        ));
    }

    #[test]
    fn test_import_rejects_bad_card_anywhere_in_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad_array.json");
        fs::write(
            &path,
            r#"[
  {"title":"Good","cards":[{"question":"Q1","answer":"A1","attempts":2,"correctAttempts":2}]},
  {"title":"Bad","cards":[{"question":"Q2","answer":"A2","attempts":1,"correctAttempts":3}]}
]"#,
        )
        .unwrap();

        assert!(matches!(import_json(&path), Err(StoreError::InvalidCard { .. })));
    }

    #[test]
    fn test_parse_generated_cards_in_code_fence() {
        let reply = "```json\n[\n  {\"question\": \"What is Rust?\", \"answer\": \"A language.\"},\n  {\"question\": \"Who?\", \"answer\": \"Everyone.\"}\n]\n```";

        let cards = parse_generated_cards(reply).unwrap();

        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0].question, "What is Rust?");
        assert_eq!(cards[1].answer, "Everyone.");
        assert!(cards.iter().all(|c| c.attempts == 0));
    }

    #[test]
    fn test_parse_generated_cards_plain() {
        let cards = parse_generated_cards(r#" [{"question": "Q", "answer": "A"}] "#).unwrap();
        assert_eq!(cards, vec![Card::new("Q", "A")]);
    }

    #[test]
    fn test_parse_generated_cards_rejects_empty_or_non_array() {
        assert!(matches!(
            parse_generated_cards("[]"),
            Err(StoreError::NoCardsGenerated)
        ));
        assert!(matches!(
            parse_generated_cards(r#"{"question": "Q", "answer": "A"}"#),
            Err(StoreError::NoCardsGenerated)
        ));
        assert!(matches!(
            parse_generated_cards("Sorry, I cannot help with that."),
            Err(StoreError::Json(_))
        ));
    }
}
