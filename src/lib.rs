//! In-memory account lockout for authentication services
//!
//! This crate tracks failed login attempts per username and temporarily
//! blocks accounts that exceed a threshold, to slow down brute-force
//! credential guessing.
//!
//! The login flow drives a [`LockoutService`] with three calls: it asks
//! [`LockoutService::is_blocked`] before verifying credentials, reports
//! failures with [`LockoutService::record_failure`], and clears the slate
//! with [`LockoutService::record_success`]. Counters live in a
//! [`LoginAttemptRepository`]; the bundled
//! [`InMemoryLoginAttemptRepository`] keeps them in a process-local
//! concurrent map with a sliding expiry window.
//!
//! State is process-local and lost on restart. Lockout here is advisory,
//! best-effort protection, not durable security state, and is not shared
//! across service instances.
//!
//! See [`LockoutConfig`] for the policy knobs and [`EventBus`] for
//! observing security events such as [`Event::AccountLocked`].
pub mod config;
pub mod error;
pub mod events;
pub mod repositories;
pub mod services;

pub use config::LockoutConfig;
pub use error::Error;
pub use events::{Event, EventBus, EventHandler, UnlockReason};
pub use repositories::{AttemptRecord, InMemoryLoginAttemptRepository, LoginAttemptRepository};
pub use services::{LockoutService, LockoutStatus};
