//! Runtime configuration read from the environment (and an optional `.env` file).

use log::warn;
use std::path::PathBuf;

pub const DB_PATH_VAR: &str = "FLASHCARDS_DB";
pub const BACKUP_DIR_VAR: &str = "FLASHCARDS_BACKUP_DIR";
pub const SEED_VAR: &str = "FLASHCARDS_SEED";

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub database_path: PathBuf,
    /// Where per-deck backups and full exports are written.
    pub backup_dir: PathBuf,
    /// Fixed seed for the study shuffle, mostly useful when reproducing a session.
    pub rng_seed: Option<u64>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("db.sqlite3"),
            backup_dir: PathBuf::from("decks"),
            rng_seed: None,
        }
    }
}

impl AppConfig {
    /// Loads `.env` if present, then reads the process environment.
    pub fn from_env() -> Self {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                warn!("Ignoring unreadable .env file: {}", e);
            }
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup; unset keys keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let rng_seed = lookup(SEED_VAR).and_then(|raw| match raw.trim().parse::<u64>() {
            Ok(seed) => Some(seed),
            Err(_) => {
                warn!("{} is not a valid u64 ({:?}), using entropy", SEED_VAR, raw);
                None
            }
        });

        Self {
            database_path: lookup(DB_PATH_VAR)
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.database_path),
            backup_dir: lookup(BACKUP_DIR_VAR)
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.backup_dir),
            rng_seed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = AppConfig::from_lookup(lookup_from(&[]));
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_values_from_environment() {
        let config = AppConfig::from_lookup(lookup_from(&[
            (DB_PATH_VAR, "/tmp/cards.sqlite3"),
            (BACKUP_DIR_VAR, "/tmp/backups"),
            (SEED_VAR, " 42 "),
        ]));

        assert_eq!(config.database_path, PathBuf::from("/tmp/cards.sqlite3"));
        assert_eq!(config.backup_dir, PathBuf::from("/tmp/backups"));
        assert_eq!(config.rng_seed, Some(42));
    }

    #[test]
    fn test_invalid_seed_and_blank_paths_fall_back() {
        let config = AppConfig::from_lookup(lookup_from(&[
            (DB_PATH_VAR, "   "),
            (SEED_VAR, "not-a-number"),
        ]));

        assert_eq!(config.database_path, PathBuf::from("db.sqlite3"));
        assert_eq!(config.rng_seed, None);
    }
}
