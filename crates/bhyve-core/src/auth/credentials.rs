use secrecy::{ExposeSecret, SecretString};

/// The email/password pair used for the last successful login.
///
/// Kept in memory so an expired token can be renewed without asking the
/// dashboard user to sign in again. `SecretString` keeps the password out of
/// `Debug` output.
#[derive(Debug)]
pub struct Credentials {
    email: String,
    password: SecretString,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: SecretString::from(password.into()),
        }
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn password(&self) -> &str {
        self.password.expose_secret()
    }
}
