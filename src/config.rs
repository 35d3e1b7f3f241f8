//! Lockout policy configuration

use chrono::Duration;

/// Policy controlling when repeated login failures block an account.
///
/// The default policy blocks after 5 failed attempts and retains attempt
/// entries for a sliding 60 minute window. A disabled config turns every
/// operation into a no-op that reports "not blocked", which lets callers
/// keep the service wired in while toggling protection off.
#[derive(Debug, Clone)]
pub struct LockoutConfig {
    /// Whether attempt tracking is active at all.
    pub enabled: bool,

    /// Number of failed attempts at which an account becomes blocked.
    /// The boundary is inclusive: reaching this count blocks, one less
    /// does not.
    pub max_attempts: u32,

    /// Sliding retention window for attempt entries. Every write to an
    /// entry restarts the countdown; an entry that goes unwritten for
    /// longer than this is treated as if it never existed.
    pub ttl: Duration,
}

impl Default for LockoutConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_attempts: 5,
            ttl: Duration::minutes(60),
        }
    }
}

impl LockoutConfig {
    /// Create a config with protection turned off.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }
}
