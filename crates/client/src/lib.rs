//! Client for the authors API
//!
//! [`ApiGateway`] is the single choke-point for outbound calls: it resolves
//! paths against the configured origin, attaches the session token held by a
//! [`SessionStore`], encodes JSON bodies and discards the session when the
//! server answers 401. Typed operations for the account and authors
//! endpoints are layered on top of [`ApiGateway::send`].

pub mod authors;
pub mod error;
pub mod events;
pub mod gateway;
pub mod response;
pub mod session;
pub mod types;
pub mod users;

pub use error::ClientError;
pub use events::{SessionEvent, SessionEvents};
pub use gateway::{
    ApiGateway, ApiGatewayBuilder, DEFAULT_BASE_URL, DEFAULT_TOKEN_HEADER, RequestOptions,
};
pub use session::{MemorySessionStore, SESSION_TOKEN_KEY, SessionStore};
pub use types::{Author, ErrorBody, LoginResponse, NewUser, UserSummary};

// Re-exported so callers can name methods and inspect responses
pub use reqwest::{Method, Response, StatusCode};
