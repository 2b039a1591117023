//! Password encoding seam for the in-memory manager.
//!
//! # Feature Flags
//! - `bcrypt`: enables [`BCryptPasswordEncoder`]

/// Verifies a raw password against a stored (possibly encoded) one.
pub trait PasswordEncoder {
    fn encode(&self, raw: &str) -> String;

    fn matches(&self, raw: &str, encoded: &str) -> bool;
}

/// Plain-text comparison. Test and demo use only.
#[derive(Debug, Clone, Default)]
pub struct NoOpPasswordEncoder;

impl PasswordEncoder for NoOpPasswordEncoder {
    fn encode(&self, raw: &str) -> String {
        raw.to_string()
    }

    fn matches(&self, raw: &str, encoded: &str) -> bool {
        raw == encoded
    }
}

/// BCrypt password encoder.
///
/// Requires the `bcrypt` feature. Stored passwords are salted hashes;
/// verification never compares plain text.
///
/// # Example
/// ```ignore
/// let manager = InMemoryAuthenticationManager::new()
///     .password_encoder(BCryptPasswordEncoder::new())
///     .with_user(User::new("admin".into(), hashed.into()));
/// ```
#[cfg(feature = "bcrypt")]
#[derive(Debug, Clone)]
pub struct BCryptPasswordEncoder {
    cost: u32,
}

#[cfg(feature = "bcrypt")]
impl BCryptPasswordEncoder {
    /// Uses the default cost of 12.
    pub fn new() -> Self {
        BCryptPasswordEncoder { cost: 12 }
    }

    /// Overrides the cost factor, clamped to the valid bcrypt range.
    pub fn with_cost(cost: u32) -> Self {
        BCryptPasswordEncoder {
            cost: cost.clamp(4, 31),
        }
    }
}

#[cfg(feature = "bcrypt")]
impl Default for BCryptPasswordEncoder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "bcrypt")]
impl PasswordEncoder for BCryptPasswordEncoder {
    fn encode(&self, raw: &str) -> String {
        match bcrypt::hash(raw, self.cost) {
            Ok(hash) => hash,
            // hash only fails on an out-of-range cost, which the
            // constructor clamps away; an empty hash never matches.
            Err(err) => {
                log::error!("bcrypt hashing failed: {}", err);
                String::new()
            }
        }
    }

    fn matches(&self, raw: &str, encoded: &str) -> bool {
        bcrypt::verify(raw, encoded).unwrap_or(false)
    }
}
