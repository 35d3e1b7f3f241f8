//! Account lockout service.
//!
//! This module implements account-based brute force mitigation with
//! per-username failure counting and threshold-based blocking.
//!
//! # Features
//!
//! - Per-username failure counters with a sliding expiry window
//! - Automatic blocking after a configurable number of failures
//! - Reset on successful login, plus an explicit administrative unlock
//! - Security events for audit logging and alerting
//! - Background purging of expired counter entries
//!
//! # Example
//!
//! ```rust,ignore
//! use portcullis::{InMemoryLoginAttemptRepository, LockoutConfig, LockoutService};
//!
//! let service = LockoutService::new(
//!     Arc::new(InMemoryLoginAttemptRepository::new()),
//!     LockoutConfig::default(),
//! );
//!
//! // Check before verifying credentials
//! if service.is_blocked("alice").await? {
//!     // Reject the attempt without touching the password check
//! }
//!
//! // Report the outcome afterwards
//! service.record_failure("alice").await?;
//! // ...or...
//! service.record_success("alice").await?;
//! ```

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    config::LockoutConfig,
    events::{Event, EventBus, UnlockReason},
    repositories::{AttemptRecord, LoginAttemptRepository},
};

/// How often the background task sweeps expired entries
const PURGE_INTERVAL: std::time::Duration = std::time::Duration::from_secs(3600);

/// Outcome of a lockout check for one username.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockoutStatus {
    /// The username the status describes
    pub username: String,
    /// Live failure count; 0 for unseen or expired usernames
    pub failed_attempts: u32,
    /// Whether logins for this username should be rejected
    pub is_blocked: bool,
    /// When the block lapses absent further failures; only set while blocked
    pub expires_at: Option<DateTime<Utc>>,
}

impl LockoutStatus {
    fn unblocked(username: &str) -> Self {
        Self {
            username: username.to_string(),
            failed_attempts: 0,
            is_blocked: false,
            expires_at: None,
        }
    }

    /// Seconds until the block lapses, if blocked.
    ///
    /// Clamped to zero for a block that expired between the status read
    /// and this call.
    pub fn retry_after_seconds(&self) -> Option<i64> {
        self.expires_at
            .map(|expires_at| (expires_at - Utc::now()).num_seconds().max(0))
    }
}

/// Service that tracks failed login attempts and blocks noisy accounts.
///
/// One instance is constructed at service start and shared by reference
/// across all request handlers. Counters live in the repository; the
/// service owns the policy: when to block, when an entry expires, and
/// which events to publish.
///
/// # Thread Safety
///
/// All methods take `&self` and are safe under concurrent invocation from
/// multiple tasks. Counter increments are atomic per username, so
/// concurrent failures for one account all count.
pub struct LockoutService<R: LoginAttemptRepository> {
    repository: Arc<R>,
    config: LockoutConfig,
    events: EventBus,
}

impl<R: LoginAttemptRepository> LockoutService<R> {
    /// Create a new LockoutService with no event subscribers.
    ///
    /// # Arguments
    ///
    /// * `repository` - The repository implementation holding the counters
    /// * `config` - Policy for blocking and expiry
    pub fn new(repository: Arc<R>, config: LockoutConfig) -> Self {
        Self {
            repository,
            config,
            events: EventBus::new(),
        }
    }

    /// Attach an event bus for security event notifications.
    pub fn with_event_bus(mut self, events: EventBus) -> Self {
        self.events = events;
        self
    }

    /// Get the current configuration.
    pub fn config(&self) -> &LockoutConfig {
        &self.config
    }

    /// Check if lockout tracking is enabled.
    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Record a failed login attempt and return the updated status.
    ///
    /// The first failure for an unseen or expired username stores a count
    /// of 1; every failure restarts the entry's expiry window. When the
    /// count reaches the threshold the service logs a warning and emits
    /// [`Event::AccountLocked`], once per lockout episode.
    ///
    /// No-op for an empty username or a disabled config; both return an
    /// unblocked status.
    pub async fn record_failure(&self, username: &str) -> Result<LockoutStatus, Error> {
        if !self.config.enabled || username.is_empty() {
            return Ok(LockoutStatus::unblocked(username));
        }

        let record = self
            .repository
            .record_attempt(username, self.expiry_cutoff())
            .await?;

        self.emit(Event::LoginFailed {
            username: username.to_string(),
            failed_attempts: record.failed_attempts,
            timestamp: record.last_attempt_at,
        })
        .await;

        // Exactly the threshold crossing, not every blocked failure
        if record.failed_attempts == self.config.max_attempts {
            tracing::warn!(
                username,
                failed_attempts = record.failed_attempts,
                "Account blocked after repeated login failures"
            );
            self.emit(Event::AccountLocked {
                username: username.to_string(),
                failed_attempts: record.failed_attempts,
                locked_until: record.last_attempt_at + self.config.ttl,
                timestamp: record.last_attempt_at,
            })
            .await;
        }

        Ok(self.status_from(username, Some(&record)))
    }

    /// Clear the failure history for a username after a successful login.
    ///
    /// A no-op if the username has no entry. Emits
    /// [`Event::AccountUnlocked`] if the removed entry was still blocking
    /// the account.
    pub async fn record_success(&self, username: &str) -> Result<(), Error> {
        if username.is_empty() {
            return Ok(());
        }

        if let Some(record) = self.repository.clear_attempts(username).await? {
            tracing::debug!(username, "Cleared login failure history");
            if self.was_blocking(&record) {
                self.emit(Event::AccountUnlocked {
                    username: username.to_string(),
                    reason: UnlockReason::SuccessfulLogin,
                    timestamp: Utc::now(),
                })
                .await;
            }
        }

        Ok(())
    }

    /// Check whether logins for a username should be rejected.
    ///
    /// True iff the live failure count has reached the configured
    /// threshold. Unseen, expired, and empty usernames are never blocked,
    /// so callers can pass any string straight from the request.
    pub async fn is_blocked(&self, username: &str) -> Result<bool, Error> {
        Ok(self.lockout_status(username).await?.is_blocked)
    }

    /// Get the full lockout status for a username.
    ///
    /// If tracking is disabled, always reports unblocked.
    pub async fn lockout_status(&self, username: &str) -> Result<LockoutStatus, Error> {
        if !self.config.enabled || username.is_empty() {
            return Ok(LockoutStatus::unblocked(username));
        }

        let record = self
            .repository
            .get_record(username, self.expiry_cutoff())
            .await?;

        Ok(self.status_from(username, record.as_ref()))
    }

    /// Unblock an account manually (operator action).
    ///
    /// Clears the failure history regardless of count. Returns `true` if
    /// the account was blocked.
    pub async fn unlock(&self, username: &str) -> Result<bool, Error> {
        if username.is_empty() {
            return Ok(false);
        }

        let was_blocked = self.is_blocked(username).await?;
        self.repository.clear_attempts(username).await?;

        if was_blocked {
            self.emit(Event::AccountUnlocked {
                username: username.to_string(),
                reason: UnlockReason::AdminAction,
                timestamp: Utc::now(),
            })
            .await;
        }

        Ok(was_blocked)
    }

    /// Start the background purge task.
    ///
    /// Expiry is enforced on every read and write; this task only drops
    /// expired entries so the store does not grow without bound. It runs
    /// hourly until the watch channel signals shutdown.
    ///
    /// # Returns
    ///
    /// A `JoinHandle` for the spawned task.
    pub fn start_purge_task(
        &self,
        mut shutdown: tokio::sync::watch::Receiver<bool>,
    ) -> tokio::task::JoinHandle<()> {
        let repository = Arc::clone(&self.repository);
        let ttl = self.config.ttl;

        tokio::spawn(async move {
            let mut interval_timer = tokio::time::interval(PURGE_INTERVAL);

            loop {
                tokio::select! {
                    _ = interval_timer.tick() => {
                        let expired_before = Utc::now() - ttl;
                        match repository.purge_expired(expired_before).await {
                            Ok(count) if count > 0 => {
                                tracing::info!(count, "Purged expired login attempt entries");
                            }
                            Err(e) => {
                                tracing::warn!(error = %e, "Failed to purge expired login attempt entries");
                            }
                            _ => {}
                        }
                    }
                    _ = shutdown.changed() => {
                        tracing::info!("Shutting down login attempt purge task");
                        break;
                    }
                }
            }
        })
    }

    /// Entries last written before this instant are expired.
    fn expiry_cutoff(&self) -> DateTime<Utc> {
        Utc::now() - self.config.ttl
    }

    /// Whether a removed record was still live and over the threshold.
    fn was_blocking(&self, record: &AttemptRecord) -> bool {
        record.failed_attempts >= self.config.max_attempts
            && record.last_attempt_at >= self.expiry_cutoff()
    }

    fn status_from(&self, username: &str, record: Option<&AttemptRecord>) -> LockoutStatus {
        let Some(record) = record else {
            return LockoutStatus::unblocked(username);
        };

        let is_blocked = record.failed_attempts >= self.config.max_attempts;
        LockoutStatus {
            username: username.to_string(),
            failed_attempts: record.failed_attempts,
            is_blocked,
            expires_at: is_blocked.then(|| record.last_attempt_at + self.config.ttl),
        }
    }

    async fn emit(&self, event: Event) {
        // Handler failures must not fail the login flow
        if let Err(e) = self.events.emit(&event).await {
            tracing::warn!(error = %e, "Login event handler failed");
        }
    }
}
