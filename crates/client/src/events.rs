//! Session lifecycle notifications
//!
//! The host subscribes to these instead of the gateway reaching into any UI
//! reset mechanism.

use std::fmt;
use std::sync::{Arc, Mutex};

/// Session lifecycle event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// A token was stored after a successful login
    Established,
    /// The token was removed by an explicit logout
    Ended,
    /// The server answered 401 and the token was discarded
    Invalidated,
}

type Listener = Arc<dyn Fn(SessionEvent) + Send + Sync>;

/// Fan-out of session events to registered listeners
#[derive(Clone, Default)]
pub struct SessionEvents {
    listeners: Arc<Mutex<Vec<Listener>>>,
}

impl SessionEvents {
    /// Create a hub with no listeners
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener for every subsequent event
    pub fn subscribe<F>(&self, listener: F)
    where
        F: Fn(SessionEvent) + Send + Sync + 'static,
    {
        let mut listeners = self
            .listeners
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        listeners.push(Arc::new(listener));
    }

    /// Deliver an event to all listeners
    pub fn emit(&self, event: SessionEvent) {
        // Snapshot so listeners may subscribe without deadlocking
        let listeners: Vec<Listener> = self
            .listeners
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone();

        for listener in listeners {
            listener(event);
        }
    }
}

impl fmt::Debug for SessionEvents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let count = self
            .listeners
            .lock()
            .map(|listeners| listeners.len())
            .unwrap_or_default();
        f.debug_struct("SessionEvents")
            .field("listeners", &count)
            .finish()
    }
}
