use crate::error::{BlockchainError, Result};
use crate::wallet::WALLET_FILE;
use std::env;
use std::path::{Path, PathBuf};

static DEFAULT_DB_DIR: &str = "data";
pub const DEFAULT_DIFFICULTY: u64 = 16;
pub const MAX_DIFFICULTY: u64 = 255;

const DB_PATH_KEY: &str = "LEDGER_DB_PATH";
const WALLET_FILE_KEY: &str = "LEDGER_WALLET_FILE";
const DIFFICULTY_KEY: &str = "LEDGER_DIFFICULTY";

/// Where the chain and wallets live and how hard blocks are to mine.
///
/// Built once at startup and handed to [`Blockchain`](crate::core::Blockchain)
/// and [`Wallets`](crate::wallet::Wallets); nothing reads it globally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    db_path: PathBuf,
    wallet_file: PathBuf,
    difficulty: u64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            db_path: PathBuf::from(DEFAULT_DB_DIR),
            wallet_file: PathBuf::from(WALLET_FILE),
            difficulty: DEFAULT_DIFFICULTY,
        }
    }
}

impl Config {
    /// Defaults overridden by `LEDGER_DB_PATH`, `LEDGER_WALLET_FILE` and
    /// `LEDGER_DIFFICULTY`
    pub fn from_env() -> Result<Config> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Config> {
        let mut config = Config::default();
        if let Some(path) = lookup(DB_PATH_KEY) {
            config.db_path = PathBuf::from(path);
        }
        if let Some(path) = lookup(WALLET_FILE_KEY) {
            config.wallet_file = PathBuf::from(path);
        }
        if let Some(raw) = lookup(DIFFICULTY_KEY) {
            let difficulty = raw.trim().parse::<u64>().map_err(|e| {
                BlockchainError::Config(format!("{DIFFICULTY_KEY}={raw} is not a number: {e}"))
            })?;
            config = config.with_difficulty(difficulty)?;
        }
        Ok(config)
    }

    pub fn with_db_path(mut self, path: impl AsRef<Path>) -> Config {
        self.db_path = path.as_ref().to_path_buf();
        self
    }

    pub fn with_wallet_file(mut self, path: impl AsRef<Path>) -> Config {
        self.wallet_file = path.as_ref().to_path_buf();
        self
    }

    /// Number of leading zero bits a block hash needs, 1..=255
    pub fn with_difficulty(mut self, difficulty: u64) -> Result<Config> {
        if difficulty == 0 || difficulty > MAX_DIFFICULTY {
            return Err(BlockchainError::Config(format!(
                "difficulty must be between 1 and {MAX_DIFFICULTY}, got {difficulty}"
            )));
        }
        self.difficulty = difficulty;
        Ok(self)
    }

    pub fn get_db_path(&self) -> &Path {
        &self.db_path
    }

    pub fn get_wallet_file(&self) -> &Path {
        &self.wallet_file
    }

    pub fn get_difficulty(&self) -> u64 {
        self.difficulty
    }
}
