//! Authentication manager collaborator.
//!
//! The pipeline treats credential validation as an external concern behind
//! a narrow trait. An in-memory implementation backed by a user store is
//! provided for tests and small deployments.

use std::collections::HashMap;
use std::sync::Arc;

use crate::http::error::AuthenticationError;
use crate::http::security::authentication::{Authentication, AuthenticationDetails};
use crate::http::security::crypto::{NoOpPasswordEncoder, PasswordEncoder};
use crate::http::security::user::User;

/// Credentials extracted from a request, not yet validated.
#[derive(Debug, Clone)]
pub struct UsernamePasswordCredentials {
    pub username: String,
    pub password: String,
    pub details: Option<AuthenticationDetails>,
}

impl UsernamePasswordCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        UsernamePasswordCredentials {
            username: username.into(),
            password: password.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: AuthenticationDetails) -> Self {
        self.details = Some(details);
        self
    }
}

/// Validates credentials and produces a fully authenticated token.
pub trait AuthenticationManager {
    fn authenticate(
        &self,
        credentials: UsernamePasswordCredentials,
    ) -> Result<Authentication, AuthenticationError>;
}

/// In-memory user store with a pluggable password encoder.
///
/// # Example
/// ```
/// use actix_sentinel_core::http::security::{
///     AuthenticationManager, InMemoryAuthenticationManager, User, UsernamePasswordCredentials,
/// };
///
/// let manager = InMemoryAuthenticationManager::new()
///     .with_user(User::new("admin".into(), "secret".into()).roles(&["ADMIN".into()]));
///
/// let auth = manager
///     .authenticate(UsernamePasswordCredentials::new("admin", "secret"))
///     .unwrap();
/// assert!(auth.has_authority("ROLE_ADMIN"));
/// ```
pub struct InMemoryAuthenticationManager {
    users: HashMap<String, User>,
    password_encoder: Arc<dyn PasswordEncoder>,
    role_prefix: String,
}

impl InMemoryAuthenticationManager {
    pub fn new() -> Self {
        InMemoryAuthenticationManager {
            users: HashMap::new(),
            password_encoder: Arc::new(NoOpPasswordEncoder),
            role_prefix: "ROLE_".to_string(),
        }
    }

    /// Sets the encoder used to verify passwords.
    pub fn password_encoder<E: PasswordEncoder + 'static>(mut self, encoder: E) -> Self {
        self.password_encoder = Arc::new(encoder);
        self
    }

    /// Overrides the prefix expanded in front of role names.
    pub fn role_prefix(mut self, prefix: &str) -> Self {
        self.role_prefix = prefix.to_string();
        self
    }

    /// Adds a user. A duplicate username keeps the first registration.
    pub fn with_user(mut self, user: User) -> Self {
        use std::collections::hash_map::Entry;
        let username = user.get_username().to_string();
        match self.users.entry(username) {
            Entry::Occupied(e) => {
                log::warn!("user {} already exists, skipping", e.key());
            }
            Entry::Vacant(e) => {
                e.insert(user);
            }
        }
        self
    }
}

impl Default for InMemoryAuthenticationManager {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthenticationManager for InMemoryAuthenticationManager {
    fn authenticate(
        &self,
        credentials: UsernamePasswordCredentials,
    ) -> Result<Authentication, AuthenticationError> {
        let user = self
            .users
            .get(&credentials.username)
            .ok_or_else(|| AuthenticationError::bad_credentials("unknown user"))?;

        if !self
            .password_encoder
            .matches(&credentials.password, user.get_password())
        {
            return Err(AuthenticationError::bad_credentials("invalid password"));
        }

        let mut authentication = Authentication::full(
            user.get_username(),
            user.granted_authorities(&self.role_prefix),
        );
        if let Some(details) = credentials.details {
            authentication = authentication.with_details(details);
        }
        Ok(authentication)
    }
}
