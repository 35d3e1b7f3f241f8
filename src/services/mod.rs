//! Service layer for lockout policy
//!
//! This module contains the service that applies lockout policy on top of
//! the attempt repository.

pub mod lockout;

pub use lockout::{LockoutService, LockoutStatus};
