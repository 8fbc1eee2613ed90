// src/store/memory.rs

use std::{
    collections::BTreeMap,
    sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{KvError, KvStore};

/// Process-local store used when no database is configured, and by tests.
///
/// Counts every call so callers can assert which operations happened, and can
/// be told to fail operations on keys with a given prefix.
#[derive(Debug, Default)]
pub struct MemoryKv {
    entries: RwLock<BTreeMap<String, String>>,
    gets: AtomicUsize,
    puts: AtomicUsize,
    lists: AtomicUsize,
    failing_puts: Mutex<Vec<String>>,
    failing_gets: Mutex<Vec<String>>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_calls(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    pub fn put_calls(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }

    pub fn list_calls(&self) -> usize {
        self.lists.load(Ordering::SeqCst)
    }

    /// Total number of store operations issued so far.
    pub fn total_calls(&self) -> usize {
        self.get_calls() + self.put_calls() + self.list_calls()
    }

    /// Makes every later `put` on a key starting with `prefix` fail.
    pub fn fail_puts_with_prefix(&self, prefix: &str) {
        if let Ok(mut failing) = self.failing_puts.lock() {
            failing.push(prefix.to_string());
        }
    }

    /// Makes every later `get` on a key starting with `prefix` fail.
    pub fn fail_gets_with_prefix(&self, prefix: &str) {
        if let Ok(mut failing) = self.failing_gets.lock() {
            failing.push(prefix.to_string());
        }
    }

    /// Clears all injected failures.
    pub fn heal(&self) {
        if let Ok(mut failing) = self.failing_puts.lock() {
            failing.clear();
        }
        if let Ok(mut failing) = self.failing_gets.lock() {
            failing.clear();
        }
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    fn injected(list: &Mutex<Vec<String>>, key: &str) -> bool {
        list.lock()
            .map(|prefixes| prefixes.iter().any(|p| key.starts_with(p.as_str())))
            .unwrap_or(false)
    }
}

#[async_trait]
impl KvStore for MemoryKv {
    async fn get(&self, key: &str) -> Result<Option<String>, KvError> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        if Self::injected(&self.failing_gets, key) {
            return Err(KvError::Unavailable(format!("injected get failure for '{}'", key)));
        }
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn put(&self, key: &str, value: String) -> Result<(), KvError> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        if Self::injected(&self.failing_puts, key) {
            return Err(KvError::Unavailable(format!("injected put failure for '{}'", key)));
        }
        self.entries.write().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn list(&self, prefix: Option<&str>) -> Result<Vec<String>, KvError> {
        self.lists.fetch_add(1, Ordering::SeqCst);
        let entries = self.entries.read().await;
        Ok(entries
            .keys()
            .filter(|k| prefix.is_none_or(|p| k.starts_with(p)))
            .cloned()
            .collect())
    }
}
