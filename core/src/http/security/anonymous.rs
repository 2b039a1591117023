//! Anonymous authentication stage.
//!
//! Guarantees a non-empty security context for the rest of the chain: when
//! no earlier stage established an authentication, a fixed anonymous token
//! built from a configured key, principal label and authority set is
//! installed. Later stages can then reason about trust level instead of
//! absence.

use rand::distributions::Alphanumeric;
use rand::{thread_rng, Rng};

use crate::http::security::authentication::{Authentication, AuthenticationDetails};
use crate::http::security::exchange::{Exchange, Outcome, SecurityStage};

pub struct AnonymousAuthenticationStage {
    key: String,
    principal: String,
    authorities: Vec<String>,
}

impl AnonymousAuthenticationStage {
    /// Creates a stage with the conventional defaults: a random key, the
    /// `anonymousUser` principal and the `ROLE_ANONYMOUS` authority.
    pub fn new() -> Self {
        let key: String = thread_rng()
            .sample_iter(&Alphanumeric)
            .take(30)
            .map(char::from)
            .collect();
        AnonymousAuthenticationStage {
            key,
            principal: "anonymousUser".to_string(),
            authorities: vec!["ROLE_ANONYMOUS".to_string()],
        }
    }

    pub fn key(mut self, key: &str) -> Self {
        self.key = key.to_string();
        self
    }

    pub fn principal(mut self, principal: &str) -> Self {
        self.principal = principal.to_string();
        self
    }

    pub fn authorities(mut self, authorities: Vec<&str>) -> Self {
        self.authorities = authorities.into_iter().map(String::from).collect();
        self
    }

    pub fn get_key(&self) -> &str {
        &self.key
    }
}

impl Default for AnonymousAuthenticationStage {
    fn default() -> Self {
        Self::new()
    }
}

impl SecurityStage for AnonymousAuthenticationStage {
    fn name(&self) -> &'static str {
        "anonymous"
    }

    fn handle(&self, exchange: &mut Exchange) -> Result<Outcome, actix_web::Error> {
        if exchange.context().is_established() {
            return Ok(Outcome::Continue);
        }

        let details = AuthenticationDetails {
            remote_addr: exchange
                .http_request()
                .peer_addr()
                .map(|addr| addr.to_string()),
        };
        let authentication =
            Authentication::anonymous(self.principal.clone(), self.authorities.clone())
                .with_details(details);

        log::debug!("populated security context with anonymous token");
        exchange
            .context_mut()
            .set_authentication(Some(authentication));
        Ok(Outcome::Continue)
    }
}
