//! In-memory implementation of the login attempt repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;

use crate::{
    Error,
    repositories::{AttemptRecord, LoginAttemptRepository},
};

/// Process-local attempt store backed by a sharded concurrent map.
///
/// The map shard lock is held for the whole entry operation in
/// [`record_attempt`](LoginAttemptRepository::record_attempt), so the
/// read-increment-write cannot lose updates under concurrent failures for
/// the same username, and writers for different usernames rarely contend
/// with each other.
///
/// Expired entries are skipped on read and overwritten on write; they
/// occupy memory until [`purge_expired`](LoginAttemptRepository::purge_expired)
/// drops them.
pub struct InMemoryLoginAttemptRepository {
    records: DashMap<String, AttemptRecord>,
}

impl InMemoryLoginAttemptRepository {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            records: DashMap::new(),
        }
    }

    /// Number of usernames currently stored, expired entries included.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl Default for InMemoryLoginAttemptRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LoginAttemptRepository for InMemoryLoginAttemptRepository {
    async fn record_attempt(
        &self,
        username: &str,
        expired_before: DateTime<Utc>,
    ) -> Result<AttemptRecord, Error> {
        let now = Utc::now();
        let mut entry = self
            .records
            .entry(username.to_string())
            .or_insert(AttemptRecord {
                failed_attempts: 0,
                last_attempt_at: now,
            });
        let record = entry.value_mut();

        // A stale entry restarts from zero rather than resuming its count
        if record.last_attempt_at < expired_before {
            record.failed_attempts = 0;
        }

        record.failed_attempts += 1;
        record.last_attempt_at = now;

        Ok(record.clone())
    }

    async fn get_record(
        &self,
        username: &str,
        expired_before: DateTime<Utc>,
    ) -> Result<Option<AttemptRecord>, Error> {
        Ok(self
            .records
            .get(username)
            .filter(|record| record.last_attempt_at >= expired_before)
            .map(|record| record.value().clone()))
    }

    async fn clear_attempts(&self, username: &str) -> Result<Option<AttemptRecord>, Error> {
        Ok(self.records.remove(username).map(|(_, record)| record))
    }

    async fn purge_expired(&self, expired_before: DateTime<Utc>) -> Result<u64, Error> {
        let mut removed: u64 = 0;
        self.records.retain(|_, record| {
            let live = record.last_attempt_at >= expired_before;
            if !live {
                removed += 1;
            }
            live
        });
        Ok(removed)
    }
}
