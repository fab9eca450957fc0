//! One-time result store
//!
//! Scored CSVs wait here between the results page and the download click.
//! Tokens are single use: the first retrieval removes the entry, and both
//! repeat attempts and expired entries surface as an expired link. Expiry is
//! lazy; entries are swept on insert or an explicit prune and checked on
//! read, so no background task is needed.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use std::time::{Duration, Instant};

use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Token length in characters.
const TOKEN_LEN: usize = 22;

/// Retention settings for pending downloads.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// How long a result stays retrievable
    pub ttl: Duration,
    /// Hard cap on pending results; the oldest is evicted beyond this
    pub max_entries: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        let ttl_secs = std::env::var("FRAUD_SHIELD_RESULT_TTL_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(900);
        Self {
            ttl: Duration::from_secs(ttl_secs),
            max_entries: 64,
        }
    }
}

impl StoreConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the retention window
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Builder method to set the entry cap
    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries;
        self
    }
}

/// Payload waiting for its download click.
#[derive(Debug, Clone)]
pub struct ResultArtifact {
    pub csv: Vec<u8>,
    pub rows: usize,
}

struct TokenEntry {
    artifact: ResultArtifact,
    created_at: Instant,
}

impl TokenEntry {
    fn is_expired(&self, ttl: Duration) -> bool {
        self.created_at.elapsed() >= ttl
    }
}

/// Counters surfaced by the status endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreStats {
    pub entries: usize,
    pub inserts: u64,
    pub takes: u64,
    pub misses: u64,
    pub evictions: u64,
}

/// Token-addressed store of pending downloads.
pub struct ResultStore {
    config: StoreConfig,
    inner: RwLock<HashMap<String, TokenEntry>>,

    inserts: AtomicU64,
    takes: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

impl ResultStore {
    pub fn new(config: StoreConfig) -> Self {
        Self {
            config,
            inner: RwLock::new(HashMap::new()),
            inserts: AtomicU64::new(0),
            takes: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    /// Store an artifact and return its fresh download token.
    pub fn insert(&self, artifact: ResultArtifact) -> String {
        let token: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(TOKEN_LEN)
            .map(char::from)
            .collect();

        if let Ok(mut inner) = self.inner.write() {
            self.sweep(&mut inner);

            while inner.len() >= self.config.max_entries {
                let oldest = inner
                    .iter()
                    .min_by_key(|(_, entry)| entry.created_at)
                    .map(|(token, _)| token.clone());
                match oldest {
                    Some(key) => {
                        inner.remove(&key);
                        self.evictions.fetch_add(1, Ordering::Relaxed);
                    }
                    None => break,
                }
            }

            inner.insert(
                token.clone(),
                TokenEntry {
                    artifact,
                    created_at: Instant::now(),
                },
            );
        }

        self.inserts.fetch_add(1, Ordering::Relaxed);
        token
    }

    /// Destructive read. The entry is gone after the first successful call;
    /// unknown, already-taken and expired tokens all return `None`.
    pub fn take(&self, token: &str) -> Option<ResultArtifact> {
        let result = self
            .inner
            .write()
            .ok()
            .and_then(|mut inner| match inner.remove(token) {
                Some(entry) if !entry.is_expired(self.config.ttl) => Some(entry.artifact),
                Some(_) => {
                    self.evictions.fetch_add(1, Ordering::Relaxed);
                    None
                }
                None => None,
            });

        match result {
            Some(artifact) => {
                self.takes.fetch_add(1, Ordering::Relaxed);
                Some(artifact)
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Drop expired entries now instead of waiting for the next insert.
    /// Returns how many were removed.
    pub fn prune_expired(&self) -> usize {
        match self.inner.write() {
            Ok(mut inner) => self.sweep(&mut inner),
            Err(_) => 0,
        }
    }

    fn sweep(&self, inner: &mut HashMap<String, TokenEntry>) -> usize {
        let before = inner.len();
        let ttl = self.config.ttl;
        inner.retain(|_, entry| !entry.is_expired(ttl));
        let swept = before - inner.len();
        if swept > 0 {
            self.evictions.fetch_add(swept as u64, Ordering::Relaxed);
        }
        swept
    }

    /// Number of pending entries, expired ones included until the next sweep.
    pub fn len(&self) -> usize {
        self.inner.read().map(|inner| inner.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> StoreStats {
        StoreStats {
            entries: self.len(),
            inserts: self.inserts.load(Ordering::Relaxed),
            takes: self.takes.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
        }
    }
}

impl Default for ResultStore {
    fn default() -> Self {
        Self::new(StoreConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn artifact(rows: usize) -> ResultArtifact {
        ResultArtifact {
            csv: format!("rows={rows}").into_bytes(),
            rows,
        }
    }

    #[test]
    fn test_insert_take_round_trip() {
        let store = ResultStore::default();
        let token = store.insert(artifact(10));
        assert_eq!(token.len(), TOKEN_LEN);
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));

        let got = store.take(&token).unwrap();
        assert_eq!(got.rows, 10);
        assert_eq!(got.csv, b"rows=10");
    }

    #[test]
    fn test_token_is_single_use() {
        let store = ResultStore::default();
        let token = store.insert(artifact(1));
        assert!(store.take(&token).is_some());
        assert!(store.take(&token).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_unknown_token_misses() {
        let store = ResultStore::default();
        assert!(store.take("nope").is_none());
        assert_eq!(store.stats().misses, 1);
    }

    #[test]
    fn test_entries_expire() {
        let config = StoreConfig::new().with_ttl(Duration::from_millis(40));
        let store = ResultStore::new(config);
        let token = store.insert(artifact(1));
        thread::sleep(Duration::from_millis(80));
        assert!(store.take(&token).is_none());
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let config = StoreConfig::new().with_max_entries(2);
        let store = ResultStore::new(config);
        let first = store.insert(artifact(1));
        thread::sleep(Duration::from_millis(5));
        let second = store.insert(artifact(2));
        thread::sleep(Duration::from_millis(5));
        let third = store.insert(artifact(3));

        assert!(store.take(&first).is_none());
        assert!(store.take(&second).is_some());
        assert!(store.take(&third).is_some());
    }

    #[test]
    fn test_stats_counters() {
        let store = ResultStore::default();
        let token = store.insert(artifact(1));
        store.take(&token);
        store.take(&token);

        let stats = store.stats();
        assert_eq!(stats.inserts, 1);
        assert_eq!(stats.takes, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.entries, 0);
    }

    #[test]
    fn test_prune_expired_clears_stale_entries() {
        let config = StoreConfig::new().with_ttl(Duration::from_millis(40));
        let store = ResultStore::new(config);
        store.insert(artifact(1));
        store.insert(artifact(2));
        thread::sleep(Duration::from_millis(80));

        assert_eq!(store.prune_expired(), 2);
        assert!(store.is_empty());
        assert_eq!(store.stats().evictions, 2);
    }

    #[test]
    fn test_tokens_are_unique() {
        let store = ResultStore::default();
        let a = store.insert(artifact(1));
        let b = store.insert(artifact(2));
        assert_ne!(a, b);
    }
}
