//! Wire types of the authors API

use serde::{Deserialize, Serialize};

/// Author record owned by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    #[serde(rename = "_id")]
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub biography: Option<String>,
}

impl Author {
    /// First and last name joined by a space
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// `{ "data": ... }` envelope used by the authors endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct DataEnvelope<T> {
    pub data: T,
}

/// Credentials for `POST /usuarios/login`
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Successful login
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    #[serde(default = "default_status")]
    pub status: bool,
    pub token: String,
    pub user: UserSummary,
}

fn default_status() -> bool {
    true
}

/// The signed-in user as reported by the login endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct UserSummary {
    pub first_name: String,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// Registration payload for `POST /usuarios`
#[derive(Debug, Clone, Serialize)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

/// Failure body. The backend reports the reason under `message` on most
/// endpoints and under `msg` on login, both are accepted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub status: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub msg: Option<String>,
}

impl ErrorBody {
    /// The reported reason, preferring `message` over `msg`
    pub fn reason(&self) -> Option<&str> {
        self.message
            .as_deref()
            .or(self.msg.as_deref())
            .map(str::trim)
            .filter(|reason| !reason.is_empty())
    }
}
