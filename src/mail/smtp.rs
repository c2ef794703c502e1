use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use secrecy::ExposeSecret;

use super::{MailTransport, SendError};
use crate::core::credentials::MailCredentials;

/// SMTP submission relay: plain connect, STARTTLS upgrade, AUTH with the
/// sender's credentials. Socket timeouts are lettre's defaults.
#[derive(Debug, Clone)]
pub struct SmtpRelay {
    host: String,
    port: u16,
}

impl SmtpRelay {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }
}

impl MailTransport for SmtpRelay {
    async fn deliver(
        &self,
        message: Message,
        credentials: &MailCredentials,
    ) -> Result<(), SendError> {
        let auth = Credentials::new(
            credentials.address().to_string(),
            credentials.secret().expose_secret().to_string(),
        );

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.host)
            .map_err(|e| SendError::Transport(Box::new(e)))?
            .port(self.port)
            .credentials(auth)
            .build();

        log::debug!("Connecting to {}:{}", self.host, self.port);
        let response = transport
            .send(message)
            .await
            .map_err(|e| SendError::Transport(Box::new(e)))?;
        log::debug!("SMTP relay answered {}", response.code());

        Ok(())
    }
}
