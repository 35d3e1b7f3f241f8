//! Repository trait for the attempt store
//!
//! This module defines the storage interface for per-username failure
//! counters. The service layer owns all policy (thresholds, window
//! length); the repository only stores counters and answers questions
//! relative to an expiry cutoff the caller computes.

pub mod memory;

pub use memory::InMemoryLoginAttemptRepository;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Error;

/// A username's failure counter together with its last write time.
///
/// The last write time doubles as the expiry anchor: an entry is live
/// while `last_attempt_at` is at or after the caller's cutoff, and every
/// write refreshes it, which is what makes the expiry window sliding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptRecord {
    /// Number of failures recorded in the current window. At least 1 for
    /// any stored entry; absent usernames are implicitly 0.
    pub failed_attempts: u32,
    /// When the counter was last written.
    pub last_attempt_at: DateTime<Utc>,
}

/// Repository for login attempt counters.
///
/// All methods that read or modify a single username take an
/// `expired_before` cutoff (typically `now - ttl`). Entries last written
/// before the cutoff are expired and must never surface as live data:
/// reads treat them as absent and writes restart their counter. This
/// mirrors how the service would behave if the entry had been physically
/// removed, so implementations are free to drop expired entries eagerly
/// or leave them for [`purge_expired`](LoginAttemptRepository::purge_expired).
///
/// # Concurrency
///
/// Implementations must be safe under concurrent invocation for the same
/// or different usernames, and
/// [`record_attempt`](LoginAttemptRepository::record_attempt) must apply
/// its read-increment-write atomically per username: two concurrent calls
/// for one username must add 2, never 1.
#[async_trait]
pub trait LoginAttemptRepository: Send + Sync + 'static {
    /// Increment the failure counter for a username and refresh its write
    /// time, restarting the counter at 1 if the existing entry is expired
    /// or absent.
    ///
    /// Returns the updated record.
    async fn record_attempt(
        &self,
        username: &str,
        expired_before: DateTime<Utc>,
    ) -> Result<AttemptRecord, Error>;

    /// Fetch the live record for a username.
    ///
    /// Returns `None` for absent and expired entries alike.
    async fn get_record(
        &self,
        username: &str,
        expired_before: DateTime<Utc>,
    ) -> Result<Option<AttemptRecord>, Error>;

    /// Remove the entry for a username.
    ///
    /// Returns the removed record, or `None` if there was nothing to
    /// remove. The record is returned as stored, without expiry
    /// filtering; the caller decides whether it was still live.
    async fn clear_attempts(&self, username: &str) -> Result<Option<AttemptRecord>, Error>;

    /// Drop every entry last written before the cutoff.
    ///
    /// Expiry is already enforced on each read and write; this exists so
    /// a background task can bound the store's memory footprint.
    ///
    /// Returns the number of entries removed.
    async fn purge_expired(&self, expired_before: DateTime<Utc>) -> Result<u64, Error>;
}
