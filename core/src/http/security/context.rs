//! The per-request security context.
//!
//! Exactly one optional [`Authentication`] per request. The context is owned
//! by the request's exchange and threaded explicitly through every stage
//! call; there is no ambient thread-local or global holder. Cross-request
//! continuity goes through the [`SecurityContextRepository`] only.
//!
//! [`SecurityContextRepository`]: crate::http::security::repository::SecurityContextRepository

use serde::{Deserialize, Serialize};

use crate::http::security::authentication::Authentication;

/// Holder of the current request's authentication.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SecurityContext {
    authentication: Option<Authentication>,
}

impl SecurityContext {
    /// An empty context: no authentication established yet.
    pub fn empty() -> Self {
        SecurityContext {
            authentication: None,
        }
    }

    pub fn with_authentication(authentication: Authentication) -> Self {
        SecurityContext {
            authentication: Some(authentication),
        }
    }

    pub fn authentication(&self) -> Option<&Authentication> {
        self.authentication.as_ref()
    }

    pub fn set_authentication(&mut self, authentication: Option<Authentication>) {
        self.authentication = authentication;
    }

    pub fn clear(&mut self) {
        self.authentication = None;
    }

    /// True when an authentication is present at all, anonymous included.
    pub fn is_established(&self) -> bool {
        self.authentication.is_some()
    }

    /// True when the held authentication is present and non-anonymous.
    ///
    /// This is the persistence criterion: anonymous contexts are never
    /// written to the durable store.
    pub fn is_worth_saving(&self) -> bool {
        self.authentication
            .as_ref()
            .map(|auth| !auth.is_anonymous())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_context_is_not_saved() {
        assert!(!SecurityContext::empty().is_worth_saving());
    }

    #[test]
    fn anonymous_context_is_not_saved() {
        let ctx = SecurityContext::with_authentication(Authentication::anonymous(
            "anonymousUser",
            vec!["ROLE_ANONYMOUS".into()],
        ));
        assert!(ctx.is_established());
        assert!(!ctx.is_worth_saving());
    }

    #[test]
    fn full_context_is_saved() {
        let ctx = SecurityContext::with_authentication(Authentication::full(
            "alice",
            vec!["ROLE_USER".into()],
        ));
        assert!(ctx.is_worth_saving());
    }
}
