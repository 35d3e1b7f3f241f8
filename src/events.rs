//! Security event notifications
//!
//! The lockout service publishes events on an [`EventBus`] so that audit
//! logging, alerting, or metrics collectors can observe login failures and
//! lockout transitions without being wired into the login flow itself.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::error::EventError;

/// Reason why an account left the blocked state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum UnlockReason {
    /// The account owner authenticated successfully
    SuccessfulLogin,
    /// An operator cleared the account manually
    AdminAction,
}

/// Events emitted while tracking login attempts.
///
/// Each event carries the affected username and a timestamp so handlers
/// can feed audit trails or alerting without querying the store again.
#[derive(Debug, Clone)]
pub enum Event {
    /// Emitted every time a login failure is recorded.
    LoginFailed {
        /// The username that was attempted
        username: String,
        /// Failure count for the current attempt window, this failure included
        failed_attempts: u32,
        /// When the failure was recorded
        timestamp: DateTime<Utc>,
    },

    /// Emitted once when an account crosses the failure threshold.
    ///
    /// This is the event to alert on.
    AccountLocked {
        /// The username that was blocked
        username: String,
        /// Failure count that triggered the block
        failed_attempts: u32,
        /// When the block lapses if no further failures are recorded
        locked_until: DateTime<Utc>,
        /// When the block was triggered
        timestamp: DateTime<Utc>,
    },

    /// Emitted when a blocked account becomes usable again.
    AccountUnlocked {
        /// The username that was unblocked
        username: String,
        /// Why the account was unblocked
        reason: UnlockReason,
        /// When the unblock occurred
        timestamp: DateTime<Utc>,
    },
}

/// A trait for handling events emitted by the event bus
///
/// Implementors of this trait can be registered with the [`EventBus`] to
/// receive and process events. The handler is called asynchronously for
/// each event emitted.
#[async_trait]
pub trait EventHandler: Send + Sync + 'static {
    async fn handle_event(&self, event: &Event) -> Result<(), EventError>;
}

/// Event bus that can emit events and register event handlers
///
/// The bus fans each event out to all registered handlers, in registration
/// order. Cloning the bus is cheap and clones share the handler list.
///
/// # Examples
///
/// ```rust,ignore
/// let event_bus = EventBus::new();
/// event_bus.register(Arc::new(AuditLogHandler)).await;
///
/// let service = LockoutService::new(repository, LockoutConfig::default())
///     .with_event_bus(event_bus);
/// ```
#[derive(Clone)]
pub struct EventBus {
    handlers: Arc<RwLock<Vec<Arc<dyn EventHandler>>>>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    /// Create a new event bus with no handlers.
    pub fn new() -> Self {
        Self {
            handlers: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Register an event handler with the event bus
    pub async fn register(&self, handler: Arc<dyn EventHandler>) {
        self.handlers.write().await.push(handler);
    }

    /// Emit an event to all registered handlers
    ///
    /// Stops at the first handler that fails and propagates its error.
    pub async fn emit(&self, event: &Event) -> Result<(), EventError> {
        for handler in self.handlers.read().await.iter() {
            handler.handle_event(event).await?;
        }

        Ok(())
    }
}
