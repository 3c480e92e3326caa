//! Authenticated request gateway
//!
//! Every outbound call to the authors API goes through [`ApiGateway::send`].
//! It resolves the target against the configured origin, builds the header
//! set, attaches the session token, encodes the JSON body and recovers from
//! authentication failures by discarding the session.

use crate::error::ClientError;
use crate::events::{SessionEvent, SessionEvents};
use crate::session::{MemorySessionStore, SessionStore};
use reqwest::header::{self, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, ClientBuilder, Method, Response, StatusCode};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, warn};

/// Origin used by the reference deployment
pub const DEFAULT_BASE_URL: &str = "http://localhost:3000/api";

/// Header carrying the raw session token
pub const DEFAULT_TOKEN_HEADER: &str = "x-token";

const JSON_CONTENT_TYPE: &str = "application/json";

/// Per-call request description
#[derive(Debug, Clone)]
pub struct RequestOptions {
    method: Method,
    headers: Vec<(String, String)>,
    payload: Option<String>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            method: Method::GET,
            headers: Vec::new(),
            payload: None,
        }
    }
}

impl RequestOptions {
    /// GET with default headers and no body
    pub fn new() -> Self {
        Self::default()
    }

    /// Options for the given method
    pub fn with_method(method: Method) -> Self {
        Self {
            method,
            ..Self::default()
        }
    }

    /// Set the HTTP method
    #[must_use]
    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Add a header override. Overrides win over the gateway defaults.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Attach a JSON body, serialized now
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, ClientError> {
        self.payload = Some(serde_json::to_string(body)?);
        Ok(self)
    }

    /// The method this request will use
    pub const fn get_method(&self) -> &Method {
        &self.method
    }

    /// The serialized body, if one was attached
    pub fn payload(&self) -> Option<&str> {
        self.payload.as_deref()
    }
}

/// Gateway to the authors API
#[derive(Clone)]
pub struct ApiGateway {
    client: Client,
    base_url: String,
    token_header: HeaderName,
    session: Arc<dyn SessionStore>,
    events: SessionEvents,
}

impl std::fmt::Debug for ApiGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiGateway")
            .field("base_url", &self.base_url)
            .field("token_header", &self.token_header)
            .field("events", &self.events)
            .finish_non_exhaustive()
    }
}

impl ApiGateway {
    /// Create a gateway with an in-memory session store
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        Self::builder().base_url(base_url).build()
    }

    /// Create a new gateway builder
    pub fn builder() -> ApiGatewayBuilder {
        ApiGatewayBuilder::default()
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The session store this gateway reads tokens from
    pub fn session(&self) -> &Arc<dyn SessionStore> {
        &self.session
    }

    /// The event hub session changes are published on
    pub const fn events(&self) -> &SessionEvents {
        &self.events
    }

    /// Whether a session token is currently resident
    pub fn is_authenticated(&self) -> Result<bool, ClientError> {
        Ok(self.session.get()?.is_some_and(|token| !token.is_empty()))
    }

    /// Send a request to `path` relative to the configured origin.
    ///
    /// The response is returned as-is, including 401 responses. A 401 has
    /// already cleared the session store and emitted
    /// [`SessionEvent::Invalidated`] by the time this returns.
    pub async fn send(&self, path: &str, options: RequestOptions) -> Result<Response, ClientError> {
        let url = format!("{}{}", self.base_url, path);
        let headers = self.build_headers(&options.headers)?;

        debug!(method = %options.method, url = %url, "Sending API request");

        let mut request = self.client.request(options.method, url).headers(headers);
        if let Some(payload) = options.payload {
            request = request.body(payload);
        }

        let response = request.send().await?;
        let status = response.status();
        debug!(status = status.as_u16(), "Received API response");

        if status == StatusCode::UNAUTHORIZED {
            self.invalidate_session();
        }

        Ok(response)
    }

    fn build_headers(&self, overrides: &[(String, String)]) -> Result<HeaderMap, ClientError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static(JSON_CONTENT_TYPE),
        );

        for (name, value) in overrides {
            let name = HeaderName::from_bytes(name.as_bytes()).map_err(|err| {
                ClientError::Configuration(format!("invalid header name {name:?}: {err}"))
            })?;
            let value = HeaderValue::from_str(value).map_err(|err| {
                ClientError::Configuration(format!("invalid value for header {name}: {err}"))
            })?;
            headers.insert(name, value);
        }

        if let Some(token) = self.session.get()?.filter(|token| !token.is_empty()) {
            let mut value = HeaderValue::from_str(&token).map_err(|err| {
                ClientError::Configuration(format!("session token is not a valid header: {err}"))
            })?;
            value.set_sensitive(true);
            headers.insert(self.token_header.clone(), value);
        }

        Ok(headers)
    }

    fn invalidate_session(&self) {
        warn!("API answered 401 Unauthorized, discarding session token");
        if let Err(err) = self.session.clear() {
            error!("Failed to clear session token: {err}");
        }
        self.events.emit(SessionEvent::Invalidated);
    }
}

/// Builder for [`ApiGateway`]
#[derive(Default)]
pub struct ApiGatewayBuilder {
    base_url: Option<String>,
    token_header: Option<String>,
    session: Option<Arc<dyn SessionStore>>,
    events: Option<SessionEvents>,
    timeout: Option<Duration>,
    user_agent: Option<String>,
}

impl ApiGatewayBuilder {
    /// Set the base URL
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the header the session token travels in
    #[must_use]
    pub fn token_header(mut self, name: impl Into<String>) -> Self {
        self.token_header = Some(name.into());
        self
    }

    /// Set the session store
    #[must_use]
    pub fn session_store(mut self, store: Arc<dyn SessionStore>) -> Self {
        self.session = Some(store);
        self
    }

    /// Share an existing event hub
    #[must_use]
    pub fn events(mut self, events: SessionEvents) -> Self {
        self.events = Some(events);
        self
    }

    /// Set the request timeout. Requests never time out unless this is set.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the user agent
    #[must_use]
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Build the gateway
    pub fn build(self) -> Result<ApiGateway, ClientError> {
        let base_url = self
            .base_url
            .ok_or_else(|| ClientError::Configuration("base_url is required".into()))?;

        url::Url::parse(&base_url)
            .map_err(|err| ClientError::Configuration(format!("invalid base_url: {err}")))?;

        // Paths always start with '/', so the origin must not end with one
        let base_url = base_url.trim_end_matches('/').to_string();

        let token_header = self
            .token_header
            .as_deref()
            .unwrap_or(DEFAULT_TOKEN_HEADER);
        let token_header = HeaderName::from_bytes(token_header.as_bytes()).map_err(|err| {
            ClientError::Configuration(format!("invalid token header {token_header:?}: {err}"))
        })?;

        let mut client_builder = ClientBuilder::new();

        if let Some(timeout) = self.timeout {
            client_builder = client_builder.timeout(timeout);
        }

        let user_agent = self
            .user_agent
            .unwrap_or_else(|| concat!("autores-client/", env!("CARGO_PKG_VERSION")).to_string());
        client_builder = client_builder.user_agent(user_agent);

        let client = client_builder.build()?;

        Ok(ApiGateway {
            client,
            base_url,
            token_header,
            session: self
                .session
                .unwrap_or_else(|| Arc::new(MemorySessionStore::new())),
            events: self.events.unwrap_or_default(),
        })
    }
}
