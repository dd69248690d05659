//! Server configuration.

/// Password policy check. Policy sophistication is an external concern;
/// the default only requires more than six characters.
pub type PasswordPolicy = fn(&str) -> bool;

fn default_password_policy(password: &str) -> bool {
    password.len() > 6
}

/// Configuration for the sync server.
#[derive(Debug, Clone, Copy)]
pub struct ServerConfig {
    /// When set, error responses carry full detail for unexpected errors
    /// instead of the generic internal-error message.
    pub debug: bool,
    /// Predicate a password must satisfy at sign-up and conversion.
    pub password_policy: PasswordPolicy,
}

impl ServerConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self {
            debug: false,
            password_policy: default_password_policy,
        }
    }

    /// Enables debug error responses.
    #[must_use]
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Sets the password policy.
    #[must_use]
    pub fn with_password_policy(mut self, policy: PasswordPolicy) -> Self {
        self.password_policy = policy;
        self
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::new()
    }
}
