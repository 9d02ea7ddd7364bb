//! Authenticated-user session, passed explicitly to whoever needs it.

use std::sync::{PoisonError, RwLock};

use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub email: String,
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user: User,
    pub token: String,
}

/// Holds at most one session. Cloned reads only; all writes go through
/// `login`/`logout`.
#[derive(Debug, Default)]
pub struct SessionStore {
    current: RwLock<Option<Session>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(session: Session) -> Self {
        Self {
            current: RwLock::new(Some(session)),
        }
    }

    pub fn login(&self, user: User, token: impl Into<String>) {
        info!(email = %user.email, "session: signed in");
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        *current = Some(Session {
            user,
            token: token.into(),
        });
    }

    pub fn logout(&self) {
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        if current.take().is_some() {
            info!("session: signed out");
        }
    }

    pub fn token(&self) -> Option<String> {
        self.read().map(|session| session.token)
    }

    pub fn user(&self) -> Option<User> {
        self.read().map(|session| session.user)
    }

    pub fn is_authenticated(&self) -> bool {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    fn read(&self) -> Option<Session> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// Two-letter badge for the header: the display name when the token carried
/// one, the email otherwise.
pub fn avatar_initials(user: &User) -> String {
    let source = user
        .name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| user.email.trim());
    source.chars().take(2).collect::<String>().to_uppercase()
}
