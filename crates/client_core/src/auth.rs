//! Sign-in, registration and sign-out on top of the API client and session.

use std::sync::Arc;

use shared::protocol::{LoginQuery, RegisterRequest};
use thiserror::Error;
use tracing::{info, warn};

use crate::{
    error::ClientError,
    navigation::{Navigator, HOME_PATH, LOGIN_PATH},
    session::{SessionStore, User},
    token::extract_display_name,
    transport::ApiClient,
    validation::{LoginForm, RegisterForm, Validate, ValidationErrors},
};

pub const LOGIN_FAILED: &str = "login failed; check email and password";
pub const REGISTER_FAILED: &str = "registration failed; check the submitted details";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error(transparent)]
    Invalid(#[from] ValidationErrors),
    /// The request went out and did not succeed. `message` is what the
    /// user is shown: the server's own words when it sent any.
    #[error("{message}")]
    Failed {
        message: String,
        #[source]
        source: ClientError,
    },
}

impl AuthError {
    fn failed(source: ClientError, fallback: &str) -> Self {
        let message = source
            .server_message()
            .filter(|message| !message.trim().is_empty())
            .unwrap_or(fallback)
            .to_string();
        AuthError::Failed { message, source }
    }
}

pub struct AuthService {
    api: Arc<ApiClient>,
    session: Arc<SessionStore>,
    navigator: Arc<dyn Navigator>,
}

impl AuthService {
    pub fn new(api: Arc<ApiClient>, session: Arc<SessionStore>, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            api,
            session,
            navigator,
        }
    }

    pub async fn login(&self, form: &LoginForm) -> Result<User, AuthError> {
        form.validate()?;
        let credentials = LoginQuery {
            email: form.email.clone(),
            password: form.password.clone(),
        };
        let data = self.api.login(&credentials).await.map_err(|err| {
            warn!(email = %form.email, "auth: login failed: {err}");
            AuthError::failed(err, LOGIN_FAILED)
        })?;

        let user = User {
            email: form.email.clone(),
            name: extract_display_name(&data.token),
        };
        self.session.login(user.clone(), data.token);
        self.navigator.push(HOME_PATH, None);
        Ok(user)
    }

    pub async fn register(&self, form: &RegisterForm) -> Result<(), AuthError> {
        form.validate()?;
        let body = RegisterRequest {
            email: form.email.clone(),
            password: form.password.clone(),
            fullname: form.fullname.clone(),
            phone: form.phone.clone(),
        };
        self.api.register(&body).await.map_err(|err| {
            warn!(email = %form.email, "auth: registration failed: {err}");
            AuthError::failed(err, REGISTER_FAILED)
        })?;

        info!(email = %form.email, "auth: registered");
        self.navigator.push(LOGIN_PATH, None);
        Ok(())
    }

    /// Tells the API the session is over, then forgets it locally whatever
    /// the API answered.
    pub async fn logout(&self) {
        if let Err(err) = self.api.logout().await {
            warn!("auth: logout request failed: {err}");
        }
        self.session.logout();
    }
}

#[cfg(test)]
#[path = "tests/auth_tests.rs"]
mod tests;
