//! Authentication token model.
//!
//! An [`Authentication`] is a principal plus proof-state and granted
//! authorities. Three trust levels exist: anonymous (installed by the
//! anonymous authenticator when nothing else identified the caller),
//! remember-me (recognized from a persistent token rather than fresh
//! credentials) and full (validated by the authentication manager during
//! this or an earlier request).
//!
//! Absence of authentication is represented as an empty security context,
//! never as a token with `authenticated == false` placed in the context.

use serde::{Deserialize, Serialize};

/// Trust level of an authentication token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthenticationKind {
    /// Fallback identity for otherwise unauthenticated requests.
    Anonymous,
    /// Recognized from a remember-me token; not fully authenticated.
    RememberMe,
    /// Validated against real credentials.
    Full,
}

/// Opaque request metadata attached to a token at authentication time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticationDetails {
    pub remote_addr: Option<String>,
}

/// The identity a request acts as, with its granted authorities.
///
/// Credentials are request-scoped only: they are skipped during
/// serialization so they never reach the durable session store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Authentication {
    principal: String,
    #[serde(skip)]
    credentials: Option<String>,
    authorities: Vec<String>,
    authenticated: bool,
    kind: AuthenticationKind,
    details: Option<AuthenticationDetails>,
}

impl Authentication {
    /// Creates a fully authenticated token, as produced by an
    /// authentication manager after validating credentials.
    pub fn full(principal: impl Into<String>, authorities: Vec<String>) -> Self {
        Authentication {
            principal: principal.into(),
            credentials: None,
            authorities,
            authenticated: true,
            kind: AuthenticationKind::Full,
            details: None,
        }
    }

    /// Creates the fixed anonymous token.
    pub fn anonymous(principal: impl Into<String>, authorities: Vec<String>) -> Self {
        Authentication {
            principal: principal.into(),
            credentials: None,
            authorities,
            authenticated: true,
            kind: AuthenticationKind::Anonymous,
            details: None,
        }
    }

    /// Creates a remember-me token.
    pub fn remember_me(principal: impl Into<String>, authorities: Vec<String>) -> Self {
        Authentication {
            principal: principal.into(),
            credentials: None,
            authorities,
            authenticated: true,
            kind: AuthenticationKind::RememberMe,
            details: None,
        }
    }

    pub fn with_details(mut self, details: AuthenticationDetails) -> Self {
        self.details = Some(details);
        self
    }

    pub fn with_credentials(mut self, credentials: impl Into<String>) -> Self {
        self.credentials = Some(credentials.into());
        self
    }

    pub fn principal(&self) -> &str {
        &self.principal
    }

    pub fn credentials(&self) -> Option<&str> {
        self.credentials.as_deref()
    }

    pub fn authorities(&self) -> &[String] {
        &self.authorities
    }

    pub fn details(&self) -> Option<&AuthenticationDetails> {
        self.details.as_ref()
    }

    pub fn kind(&self) -> AuthenticationKind {
        self.kind
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    pub fn is_anonymous(&self) -> bool {
        self.kind == AuthenticationKind::Anonymous
    }

    pub fn is_remember_me(&self) -> bool {
        self.kind == AuthenticationKind::RememberMe
    }

    /// True only for tokens validated against real credentials; anonymous
    /// and remember-me tokens are not fully authenticated.
    pub fn is_fully_authenticated(&self) -> bool {
        self.authenticated && self.kind == AuthenticationKind::Full
    }

    pub fn has_authority(&self, authority: &str) -> bool {
        self.authorities.iter().any(|a| a == authority)
    }

    pub fn has_any_authority(&self, authorities: &[&str]) -> bool {
        authorities.iter().any(|a| self.has_authority(a))
    }

    /// Drops the credential secret once it is no longer needed.
    pub fn erase_credentials(&mut self) {
        self.credentials = None;
    }
}
