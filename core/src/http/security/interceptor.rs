//! Authorization of the protected invocation.
//!
//! # Overview
//! The [`AuthorizationInterceptor`] brackets the call into the protected
//! service. Before the call it resolves the access rule for the request
//! path and checks the established authentication against it, yielding an
//! [`InterceptorStatusToken`]. The token travels through an
//! [`AuthorizationGuard`] so the closing half of the bracket runs even
//! when the invocation unwinds early.

use std::cell::Cell;
use std::rc::Rc;

use regex::Regex;

use crate::http::error::{AccessDeniedError, AuthenticationError, SecurityFailure};
use crate::http::security::authentication::Authentication;
use crate::http::security::exchange::Exchange;

/// Roles and authorities granting access to a resource.
#[derive(Debug, Clone, Default)]
pub struct Access {
    roles: Vec<String>,
    authorities: Vec<String>,
}

impl Access {
    /// Access granted to any of the given roles.
    pub fn roles(roles: &[&str]) -> Self {
        Access {
            roles: roles.iter().map(|role| role.to_string()).collect(),
            authorities: Vec::new(),
        }
    }

    /// Access granted to any of the given authorities.
    pub fn authorities(authorities: &[&str]) -> Self {
        Access {
            roles: Vec::new(),
            authorities: authorities.iter().map(|a| a.to_string()).collect(),
        }
    }

    /// Adds alternative roles to an existing rule.
    pub fn or_roles(mut self, roles: &[&str]) -> Self {
        self.roles.extend(roles.iter().map(|role| role.to_string()));
        self
    }

    /// Adds alternative authorities to an existing rule.
    pub fn or_authorities(mut self, authorities: &[&str]) -> Self {
        self.authorities.extend(authorities.iter().map(|a| a.to_string()));
        self
    }

    /// Access denied to everyone. An empty rule satisfies no caller.
    pub fn nobody() -> Self {
        Access::default()
    }

    fn permits(&self, authentication: &Authentication, role_prefix: &str) -> bool {
        self.roles
            .iter()
            .any(|role| authentication.has_authority(&format!("{}{}", role_prefix, role)))
            || self
                .authorities
                .iter()
                .any(|authority| authentication.has_authority(authority))
    }
}

/// Source of access rules keyed by request path.
pub trait SecurityMetadataSource {
    /// The rule protecting `path`, or `None` when the path is unrestricted.
    fn attributes_for(&self, path: &str) -> Option<Access>;
}

/// Ordered list of `(pattern, rule)` pairs; the first full match wins.
pub struct RequestMatcherMetadataSource {
    matchers: Vec<(Regex, Access)>,
}

impl RequestMatcherMetadataSource {
    pub fn new() -> Self {
        RequestMatcherMetadataSource {
            matchers: Vec::new(),
        }
    }

    /// Protects every path matching `pattern` with `access`. The pattern is
    /// anchored to span the whole path. An invalid pattern is logged and
    /// skipped.
    pub fn protect(mut self, pattern: &str, access: Access) -> Self {
        match Regex::new(&format!("^{}$", pattern)) {
            Ok(regex) => self.matchers.push((regex, access)),
            Err(error) => log::error!("invalid path pattern '{}': {}", pattern, error),
        }
        self
    }
}

impl Default for RequestMatcherMetadataSource {
    fn default() -> Self {
        RequestMatcherMetadataSource::new()
    }
}

impl SecurityMetadataSource for RequestMatcherMetadataSource {
    fn attributes_for(&self, path: &str) -> Option<Access> {
        self.matchers
            .iter()
            .find(|(regex, _)| regex.is_match(path))
            .map(|(_, access)| access.clone())
    }
}

/// Carries the outcome of the opening bracket half to the closing half.
#[derive(Debug)]
pub struct InterceptorStatusToken {
    skipped: bool,
    released: bool,
}

impl InterceptorStatusToken {
    fn skipped() -> Self {
        InterceptorStatusToken {
            skipped: true,
            released: true,
        }
    }

    fn active() -> Self {
        InterceptorStatusToken {
            skipped: false,
            released: false,
        }
    }

    pub fn is_released(&self) -> bool {
        self.released
    }
}

pub struct AuthorizationInterceptor {
    metadata_source: Box<dyn SecurityMetadataSource>,
    role_prefix: String,
    observe_once_per_request: bool,
    active: Cell<usize>,
}

impl AuthorizationInterceptor {
    pub fn new(metadata_source: Box<dyn SecurityMetadataSource>) -> Self {
        AuthorizationInterceptor {
            metadata_source,
            role_prefix: "ROLE_".to_string(),
            observe_once_per_request: true,
            active: Cell::new(0),
        }
    }

    pub fn role_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.role_prefix = prefix.into();
        self
    }

    /// When unset, the authorization decision is re-made on every pass
    /// through the interceptor instead of once per request.
    pub fn observe_once_per_request(mut self, once: bool) -> Self {
        self.observe_once_per_request = once;
        self
    }

    /// Number of invocations currently inside the bracket.
    pub fn active_invocations(&self) -> usize {
        self.active.get()
    }

    /// Opening half of the bracket: authorizes the request.
    pub fn before(&self, exchange: &mut Exchange) -> Result<InterceptorStatusToken, SecurityFailure> {
        if self.observe_once_per_request && exchange.applied_mut().mark_authorization() {
            return Ok(InterceptorStatusToken::skipped());
        }

        let path = exchange.http_request().path().to_string();
        let access = match self.metadata_source.attributes_for(&path) {
            Some(access) => access,
            None => {
                // Unrestricted path; nothing to close later.
                return Ok(InterceptorStatusToken::skipped());
            }
        };

        let authentication = exchange.context().authentication().ok_or_else(|| {
            SecurityFailure::from(AuthenticationError::insufficient(
                "an authentication is required to access this resource",
            ))
        })?;

        if !access.permits(authentication, &self.role_prefix) {
            log::debug!(
                "denying '{}' access to {}",
                authentication.principal(),
                path
            );
            return Err(SecurityFailure::from(AccessDeniedError {
                message: format!("access to {} is denied", path),
            }));
        }

        log::debug!("authorized '{}' for {}", authentication.principal(), path);
        self.active.set(self.active.get() + 1);
        Ok(InterceptorStatusToken::active())
    }

    /// Closing half of the bracket. Runs on every exit path, balanced with
    /// the opening half.
    pub fn finally_invocation(&self, mut token: InterceptorStatusToken) -> InterceptorStatusToken {
        if !token.skipped && !token.released {
            self.active.set(self.active.get().saturating_sub(1));
            token.released = true;
        }
        token
    }

    /// Success-only hook, after the invocation completed normally.
    pub fn after_invocation(&self, token: &InterceptorStatusToken) {
        if !token.skipped {
            log::trace!("protected invocation completed");
        }
    }
}

/// Ties the closing bracket half to scope exit.
///
/// Dropping the guard releases the token; [`complete`](Self::complete)
/// additionally runs the success hook.
pub struct AuthorizationGuard {
    interceptor: Rc<AuthorizationInterceptor>,
    token: Option<InterceptorStatusToken>,
}

impl AuthorizationGuard {
    pub fn new(interceptor: Rc<AuthorizationInterceptor>, token: InterceptorStatusToken) -> Self {
        AuthorizationGuard {
            interceptor,
            token: Some(token),
        }
    }

    /// Marks the invocation as successful.
    pub fn complete(mut self) {
        if let Some(token) = self.token.take() {
            let token = self.interceptor.finally_invocation(token);
            self.interceptor.after_invocation(&token);
        }
    }
}

impl Drop for AuthorizationGuard {
    fn drop(&mut self) {
        if let Some(token) = self.token.take() {
            self.interceptor.finally_invocation(token);
        }
    }
}
