//! User account model for the in-memory authentication manager.

/// A stored account: identifier, (possibly encoded) password, role and
/// authority grants.
///
/// # Example
/// ```
/// use actix_sentinel_core::http::security::User;
///
/// let user = User::new("admin".into(), "password".into())
///     .roles(&["ADMIN".into(), "USER".into()])
///     .authorities(&["users:read".into(), "users:write".into()]);
///
/// assert!(user.has_role("ADMIN"));
/// assert!(user.has_authority("users:read"));
/// ```
#[derive(Clone, Debug)]
pub struct User {
    username: String,
    password: String,
    roles: Vec<String>,
    authorities: Vec<String>,
}

impl User {
    /// Creates a user with a plain-text password. Prefer
    /// `with_encoded_password` together with a real password encoder.
    pub fn new(username: String, password: String) -> Self {
        User {
            username,
            password,
            roles: Vec::new(),
            authorities: Vec::new(),
        }
    }

    /// Creates a user whose password has already been run through an
    /// encoder.
    pub fn with_encoded_password(username: &str, encoded_password: String) -> Self {
        User {
            username: username.to_string(),
            password: encoded_password,
            roles: Vec::new(),
            authorities: Vec::new(),
        }
    }

    pub fn get_username(&self) -> &str {
        &self.username
    }

    pub fn get_password(&self) -> &str {
        &self.password
    }

    pub fn get_roles(&self) -> &[String] {
        &self.roles
    }

    pub fn get_authorities(&self) -> &[String] {
        &self.authorities
    }

    /// Adds roles (builder pattern). Duplicates are ignored.
    pub fn roles(mut self, roles: &[String]) -> Self {
        for role in roles {
            if !self.roles.contains(role) {
                self.roles.push(role.clone());
            }
        }
        self
    }

    /// Adds authorities (builder pattern). Duplicates are ignored.
    pub fn authorities(mut self, authorities: &[String]) -> Self {
        for authority in authorities {
            if !self.authorities.contains(authority) {
                self.authorities.push(authority.clone());
            }
        }
        self
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    pub fn has_authority(&self, authority: &str) -> bool {
        self.authorities.iter().any(|a| a == authority)
    }

    /// The full authority set this account grants: every plain authority
    /// plus each role expanded with the given prefix.
    pub fn granted_authorities(&self, role_prefix: &str) -> Vec<String> {
        let mut granted: Vec<String> = self
            .roles
            .iter()
            .map(|role| format!("{}{}", role_prefix, role))
            .collect();
        for authority in &self.authorities {
            if !granted.contains(authority) {
                granted.push(authority.clone());
            }
        }
        granted
    }
}
