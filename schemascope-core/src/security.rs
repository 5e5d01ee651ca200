//! Credential container with automatic memory zeroing.
//!
//! # Security
//! - Username and password live in `Zeroizing` containers
//! - Memory is cleared when the credentials go out of scope
//! - The password never shows up in `Debug` output

use zeroize::Zeroizing;

/// Database login that zeroes its memory on drop.
///
/// # Example
///
/// ```rust
/// use schemascope_core::security::Credentials;
///
/// let creds = Credentials::new("postgres".to_string(), Some("secret".to_string()));
/// assert_eq!(creds.username(), "postgres");
/// assert!(creds.has_password());
/// assert!(!format!("{:?}", creds).contains("secret"));
/// ```
#[derive(Clone)]
pub struct Credentials {
    username: Zeroizing<String>,
    password: Zeroizing<Option<String>>,
}

impl Credentials {
    /// Creates new credentials with automatic memory zeroing.
    pub fn new(username: String, password: Option<String>) -> Self {
        Self {
            username: Zeroizing::new(username),
            password: Zeroizing::new(password),
        }
    }

    /// Gets the username.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Gets the password for handing to the driver. Never log this.
    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }

    /// Checks if a password is present without exposing it.
    pub fn has_password(&self) -> bool {
        self.password.is_some()
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username.as_str())
            .field("password", &self.password.as_ref().map(|_| "****"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_new() {
        let creds = Credentials::new("testuser".to_string(), Some("testpass".to_string()));
        assert_eq!(creds.username(), "testuser");
        assert_eq!(creds.password(), Some("testpass"));
        assert!(creds.has_password());
    }

    #[test]
    fn test_credentials_no_password() {
        let creds = Credentials::new("testuser".to_string(), None);
        assert!(!creds.has_password());
        assert_eq!(creds.password(), None);
    }

    #[test]
    fn test_debug_masks_password() {
        let creds = Credentials::new("testuser".to_string(), Some("hunter2".to_string()));
        let debug = format!("{:?}", creds);
        assert!(debug.contains("testuser"));
        assert!(debug.contains("****"));
        assert!(!debug.contains("hunter2"));
    }
}
