//! Account API client methods

use crate::error::ClientError;
use crate::events::SessionEvent;
use crate::gateway::{ApiGateway, RequestOptions};
use crate::response;
use crate::types::{LoginRequest, LoginResponse, NewUser};
use reqwest::Method;
use tracing::info;

impl ApiGateway {
    /// Log in and store the returned session token
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ClientError> {
        let credentials = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let options = RequestOptions::with_method(Method::POST).json(&credentials)?;
        let response = self.send("/usuarios/login", options).await?;
        let login: LoginResponse = response::decode(response, "Login failed").await?;

        self.session().set(&login.token)?;
        self.events().emit(SessionEvent::Established);
        info!(user = %login.user.first_name, "Logged in");

        Ok(login)
    }

    /// Forget the stored session token
    pub fn logout(&self) -> Result<(), ClientError> {
        self.session().clear()?;
        self.events().emit(SessionEvent::Ended);
        info!("Logged out");
        Ok(())
    }

    /// Create a user account
    pub async fn register(&self, user: &NewUser) -> Result<(), ClientError> {
        let options = RequestOptions::with_method(Method::POST).json(user)?;
        let response = self.send("/usuarios", options).await?;
        response::expect_success(response, "Registration failed").await?;
        info!(email = %user.email, "Registered user");
        Ok(())
    }
}
