//! Session token storage
//!
//! The gateway never owns the session token. It reads it from, and clears it
//! in, a [`SessionStore`] supplied by the host application. A store holds at
//! most one token; absence means the client is unauthenticated.

use crate::error::ClientError;
use std::sync::{Arc, RwLock};

/// Key under which stores persist the session token
pub const SESSION_TOKEN_KEY: &str = "token";

/// Storage capability for the single session token
pub trait SessionStore: Send + Sync {
    /// Current token, if any
    fn get(&self) -> Result<Option<String>, ClientError>;

    /// Replace the stored token
    fn set(&self, token: &str) -> Result<(), ClientError>;

    /// Remove the stored token. Clearing an empty store is not an error.
    fn clear(&self) -> Result<(), ClientError>;
}


/// Process-local session store
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    token: Arc<RwLock<Option<String>>>,
}

impl MemorySessionStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that already holds a token
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Arc::new(RwLock::new(Some(token.into()))),
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self) -> Result<Option<String>, ClientError> {
        let guard = self
            .token
            .read()
            .map_err(|_| ClientError::Session("session lock poisoned".into()))?;
        Ok(guard.clone())
    }

    fn set(&self, token: &str) -> Result<(), ClientError> {
        let mut guard = self
            .token
            .write()
            .map_err(|_| ClientError::Session("session lock poisoned".into()))?;
        *guard = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), ClientError> {
        let mut guard = self
            .token
            .write()
            .map_err(|_| ClientError::Session("session lock poisoned".into()))?;
        *guard = None;
        Ok(())
    }
}
