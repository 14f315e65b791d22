//! Shared configuration.
//!
//! Loaded once at startup and passed by reference into each component's
//! constructor; nothing reads ambient global state after construction.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::commit::{CommitterConfig, DEFAULT_BATCH_SIZE, DEFAULT_WORKERS};
use crate::dedup::DEFAULT_DUPLICATE_THRESHOLD;
use crate::fingerprint::{
    MinHashConfig, DEFAULT_SEED, DEFAULT_SHINGLE_LEN, DEFAULT_SIGNATURE_LEN,
};

/// Central configuration loaded from environment variables.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LexGraphConfig {
    /// Graph store address (e.g. `localhost:1729`).
    #[validate(length(min = 1))]
    pub store_uri: String,

    /// Database name within the store.
    #[validate(length(min = 1))]
    pub database: String,

    /// Min-hash signature length N.
    #[validate(range(min = 1))]
    pub signature_len: usize,

    /// Character shingle length.
    #[validate(range(min = 1))]
    pub shingle_len: usize,

    /// Permutation seed; fixed for reproducible signatures.
    pub minhash_seed: u64,

    /// Minimum similarity for duplicate/version routing, in `(0, 1]`.
    pub duplicate_threshold: f64,

    /// Statements per commit batch.
    #[validate(range(min = 1))]
    pub batch_size: usize,

    /// Commit worker pool size.
    #[validate(range(min = 1))]
    pub worker_count: usize,
}

impl Default for LexGraphConfig {
    fn default() -> Self {
        Self {
            store_uri: "localhost:1729".to_string(),
            database: "documents".to_string(),
            signature_len: DEFAULT_SIGNATURE_LEN,
            shingle_len: DEFAULT_SHINGLE_LEN,
            minhash_seed: DEFAULT_SEED,
            duplicate_threshold: DEFAULT_DUPLICATE_THRESHOLD,
            batch_size: DEFAULT_BATCH_SIZE,
            worker_count: DEFAULT_WORKERS,
        }
    }
}

impl LexGraphConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv().ok()` first (non-fatal if `.env` is absent),
    /// then reads each `LEXGRAPH_*` variable, falling back to defaults.
    /// Unparseable or out-of-range values return a
    /// [`crate::LexGraphError::Validation`] error.
    pub fn from_env() -> crate::Result<Self> {
        dotenvy::dotenv().ok();

        let store_uri =
            std::env::var("LEXGRAPH_STORE_URI").unwrap_or_else(|_| "localhost:1729".to_string());
        let database =
            std::env::var("LEXGRAPH_DATABASE").unwrap_or_else(|_| "documents".to_string());

        let signature_len = parse_env("LEXGRAPH_SIGNATURE_LEN", DEFAULT_SIGNATURE_LEN)?;
        let shingle_len = parse_env("LEXGRAPH_SHINGLE_LEN", DEFAULT_SHINGLE_LEN)?;
        let minhash_seed = parse_env("LEXGRAPH_MINHASH_SEED", DEFAULT_SEED)?;
        let duplicate_threshold =
            parse_env("LEXGRAPH_DUPLICATE_THRESHOLD", DEFAULT_DUPLICATE_THRESHOLD)?;
        let batch_size = parse_env("LEXGRAPH_BATCH_SIZE", DEFAULT_BATCH_SIZE)?;
        let worker_count = parse_env("LEXGRAPH_WORKERS", DEFAULT_WORKERS)?;

        let config = Self {
            store_uri,
            database,
            signature_len,
            shingle_len,
            minhash_seed,
            duplicate_threshold,
            batch_size,
            worker_count,
        };

        if !(0.0..=1.0).contains(&config.duplicate_threshold) || config.duplicate_threshold == 0.0
        {
            return Err(crate::LexGraphError::Validation(
                "LEXGRAPH_DUPLICATE_THRESHOLD must be in (0, 1]".to_string(),
            ));
        }

        config
            .validate()
            .map_err(|e| crate::LexGraphError::Validation(e.to_string()))?;

        Ok(config)
    }

    /// Fingerprint generator parameters.
    pub fn minhash(&self) -> MinHashConfig {
        MinHashConfig {
            signature_len: self.signature_len,
            shingle_len: self.shingle_len,
            seed: self.minhash_seed,
        }
    }

    /// Batched committer parameters.
    pub fn committer(&self) -> CommitterConfig {
        CommitterConfig {
            batch_size: self.batch_size,
            workers: self.worker_count,
        }
    }
}

fn parse_env<T: std::str::FromStr>(name: &str, default: T) -> crate::Result<T> {
    match std::env::var(name) {
        Ok(value) => value.parse::<T>().map_err(|_| {
            crate::LexGraphError::Validation(format!("{name} has an invalid value: {value:?}"))
        }),
        Err(_) => Ok(default),
    }
}
