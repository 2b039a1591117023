//! Deferred, commit-triggered response header writers.
//!
//! # Overview
//! A configured ordered list of writers runs exactly once per request,
//! either when a stage commits a terminal response (redirect, challenge,
//! error body) or in the chain epilogue, whichever happens first. The
//! once-only discipline lives in the exchange; writers themselves are
//! stateless.
//!
//! Shipped writers cover the usual hardening set:
//!
//! - `Cache-Control` / `Pragma` / `Expires` cache suppression
//! - `X-Content-Type-Options: nosniff`
//! - `X-Frame-Options`
//! - `X-XSS-Protection: 0`
//! - `Strict-Transport-Security`

use actix_web::http::header::{
    HeaderMap, HeaderValue, CACHE_CONTROL, EXPIRES, PRAGMA, STRICT_TRANSPORT_SECURITY,
    X_CONTENT_TYPE_OPTIONS, X_FRAME_OPTIONS, X_XSS_PROTECTION,
};
use actix_web::HttpRequest;

/// Writes one or more headers into a response head.
pub trait HeaderWriter {
    fn write_headers(&self, req: &HttpRequest, headers: &mut HeaderMap);
}

/// Suppresses caching of secured content.
#[derive(Debug, Clone, Default)]
pub struct CacheControlHeaderWriter;

impl HeaderWriter for CacheControlHeaderWriter {
    fn write_headers(&self, _req: &HttpRequest, headers: &mut HeaderMap) {
        if headers.contains_key(&CACHE_CONTROL) {
            return;
        }
        headers.insert(
            CACHE_CONTROL,
            HeaderValue::from_static("no-cache, no-store, max-age=0, must-revalidate"),
        );
        headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));
        headers.insert(EXPIRES, HeaderValue::from_static("0"));
    }
}

/// `X-Content-Type-Options: nosniff`.
#[derive(Debug, Clone, Default)]
pub struct ContentTypeOptionsHeaderWriter;

impl HeaderWriter for ContentTypeOptionsHeaderWriter {
    fn write_headers(&self, _req: &HttpRequest, headers: &mut HeaderMap) {
        headers.insert(X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
    }
}

/// Frame embedding policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameOptions {
    Deny,
    SameOrigin,
}

/// `X-Frame-Options` writer (default: `DENY`).
#[derive(Debug, Clone)]
pub struct FrameOptionsHeaderWriter {
    mode: FrameOptions,
}

impl FrameOptionsHeaderWriter {
    pub fn new(mode: FrameOptions) -> Self {
        FrameOptionsHeaderWriter { mode }
    }
}

impl Default for FrameOptionsHeaderWriter {
    fn default() -> Self {
        Self::new(FrameOptions::Deny)
    }
}

impl HeaderWriter for FrameOptionsHeaderWriter {
    fn write_headers(&self, _req: &HttpRequest, headers: &mut HeaderMap) {
        let value = match self.mode {
            FrameOptions::Deny => "DENY",
            FrameOptions::SameOrigin => "SAMEORIGIN",
        };
        headers.insert(X_FRAME_OPTIONS, HeaderValue::from_static(value));
    }
}

/// `X-XSS-Protection: 0` (the auditor is more dangerous than helpful).
#[derive(Debug, Clone, Default)]
pub struct XssProtectionHeaderWriter;

impl HeaderWriter for XssProtectionHeaderWriter {
    fn write_headers(&self, _req: &HttpRequest, headers: &mut HeaderMap) {
        headers.insert(X_XSS_PROTECTION, HeaderValue::from_static("0"));
    }
}

/// `Strict-Transport-Security` writer. Not part of the default set; enable
/// it only when the deployment terminates TLS.
#[derive(Debug, Clone)]
pub struct HstsHeaderWriter {
    max_age: u64,
    include_subdomains: bool,
}

impl HstsHeaderWriter {
    pub fn new(max_age: u64, include_subdomains: bool) -> Self {
        HstsHeaderWriter {
            max_age,
            include_subdomains,
        }
    }
}

impl HeaderWriter for HstsHeaderWriter {
    fn write_headers(&self, _req: &HttpRequest, headers: &mut HeaderMap) {
        let value = if self.include_subdomains {
            format!("max-age={}; includeSubDomains", self.max_age)
        } else {
            format!("max-age={}", self.max_age)
        };
        match HeaderValue::from_str(&value) {
            Ok(value) => {
                headers.insert(STRICT_TRANSPORT_SECURITY, value);
            }
            Err(err) => log::warn!("invalid HSTS header value: {}", err),
        }
    }
}

/// The default writer set applied when none is configured explicitly.
pub fn default_header_writers() -> Vec<std::rc::Rc<dyn HeaderWriter>> {
    vec![
        std::rc::Rc::new(CacheControlHeaderWriter),
        std::rc::Rc::new(ContentTypeOptionsHeaderWriter),
        std::rc::Rc::new(FrameOptionsHeaderWriter::default()),
        std::rc::Rc::new(XssProtectionHeaderWriter),
    ]
}
