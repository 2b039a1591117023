//! Saving and replaying the request that triggered an authentication.

use actix_session::SessionExt;
use actix_web::{HttpMessage, HttpRequest};
use serde::{Deserialize, Serialize};

/// The parts of a request worth replaying after a successful login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedRequest {
    pub method: String,
    pub uri: String,
}

impl SavedRequest {
    pub fn of(req: &HttpRequest) -> Self {
        SavedRequest {
            method: req.method().to_string(),
            uri: req.uri().to_string(),
        }
    }

    /// Whether the incoming request reaches the same resource as the saved
    /// one. Only `GET` retrievals count as a replay.
    pub fn matches(&self, req: &HttpRequest) -> bool {
        req.method() == actix_web::http::Method::GET && req.uri().to_string() == self.uri
    }
}

pub trait RequestCache {
    /// Stores the request for a later replay.
    fn save_request(&self, req: &HttpRequest);

    /// Returns the saved request if the incoming one replays it, consuming
    /// the cache entry.
    fn matching_request(&self, req: &HttpRequest) -> Option<SavedRequest>;

    fn remove_request(&self, req: &HttpRequest);
}

/// Keeps the saved request in the caller's session.
pub struct SessionRequestCache {
    session_key: String,
}

pub const DEFAULT_SAVED_REQUEST_KEY: &str = "sentinel.saved.request";

impl SessionRequestCache {
    pub fn new() -> Self {
        SessionRequestCache {
            session_key: DEFAULT_SAVED_REQUEST_KEY.to_string(),
        }
    }

    pub fn session_key(mut self, key: impl Into<String>) -> Self {
        self.session_key = key.into();
        self
    }
}

impl Default for SessionRequestCache {
    fn default() -> Self {
        SessionRequestCache::new()
    }
}

impl RequestCache for SessionRequestCache {
    fn save_request(&self, req: &HttpRequest) {
        let saved = SavedRequest::of(req);
        log::debug!("saving request {} {}", saved.method, saved.uri);
        if req.get_session().insert(&self.session_key, saved).is_err() {
            log::warn!("unable to store the saved request in the session");
        }
    }

    fn matching_request(&self, req: &HttpRequest) -> Option<SavedRequest> {
        let session = req.get_session();
        let saved: SavedRequest = session.get(&self.session_key).ok().flatten()?;
        if saved.matches(req) {
            session.remove(&self.session_key);
            Some(saved)
        } else {
            None
        }
    }

    fn remove_request(&self, req: &HttpRequest) {
        req.get_session().remove(&self.session_key);
    }
}

use crate::http::security::exchange::{Exchange, Outcome, SecurityStage};

/// Detects a replay of the saved request and exposes it to the handler.
pub struct RequestCacheStage {
    cache: std::rc::Rc<dyn RequestCache>,
}

impl RequestCacheStage {
    pub fn new(cache: std::rc::Rc<dyn RequestCache>) -> Self {
        RequestCacheStage { cache }
    }
}

impl SecurityStage for RequestCacheStage {
    fn name(&self) -> &'static str {
        "request-cache"
    }

    fn handle(&self, exchange: &mut Exchange) -> Result<Outcome, actix_web::Error> {
        let req = exchange.http_request().clone();
        if let Some(saved) = self.cache.matching_request(&req) {
            log::debug!("replaying saved request {} {}", saved.method, saved.uri);
            req.extensions_mut().insert(saved);
        }
        Ok(Outcome::Continue)
    }
}
