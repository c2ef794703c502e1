use secrecy::{ExposeSecret, SecretString};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("sender address is required")]
    MissingAddress,
    #[error("sender password is required")]
    MissingSecret,
}

/// Sender address and password for one send. Held only for the duration of
/// the action and never written anywhere.
#[derive(Debug, Clone)]
pub struct MailCredentials {
    address: String,
    secret: SecretString,
}

impl MailCredentials {
    pub fn new(address: impl Into<String>, secret: impl Into<String>) -> Self {
        let secret: String = secret.into();
        Self::from_secret(address, SecretString::from(secret))
    }

    pub fn from_secret(address: impl Into<String>, secret: SecretString) -> Self {
        Self {
            address: address.into().trim().to_string(),
            secret,
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn secret(&self) -> &SecretString {
        &self.secret
    }

    /// Both fields must be non-blank before anything is saved or sent.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.address.is_empty() {
            return Err(ValidationError::MissingAddress);
        }
        if self.secret.expose_secret().trim().is_empty() {
            return Err(ValidationError::MissingSecret);
        }
        Ok(())
    }
}
