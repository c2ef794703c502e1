pub mod keyring;
pub mod smtp;

use std::future::Future;

use lettre::Message;
use lettre::message::Mailbox;
use lettre::message::header::ContentType;

use crate::core::credentials::MailCredentials;

pub use smtp::SmtpRelay;

#[derive(Debug, thiserror::Error)]
pub enum SendError {
    #[error("invalid sender address: {0}")]
    InvalidAddress(#[from] lettre::address::AddressError),
    #[error("failed to compose message: {0}")]
    Compose(#[from] lettre::error::Error),
    #[error("mail delivery failed: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Delivers a finished message. One call is one connection and one attempt.
pub trait MailTransport {
    fn deliver(
        &self,
        message: Message,
        credentials: &MailCredentials,
    ) -> impl Future<Output = Result<(), SendError>> + Send;
}

/// Mails a rendered report to the sender's own address.
///
/// There is no retry: a failure is returned once and calling again after a
/// failure may deliver a duplicate.
pub struct MailDispatcher<T> {
    transport: T,
}

impl<T: MailTransport> MailDispatcher<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub async fn send(
        &self,
        report_text: &str,
        subject: &str,
        credentials: &MailCredentials,
    ) -> Result<(), SendError> {
        let mailbox: Mailbox = credentials.address().parse()?;
        let message = Message::builder()
            .from(mailbox.clone())
            .to(mailbox)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(report_text.to_string())?;

        log::info!("Sending \"{}\" to {}", subject, credentials.address());
        match self.transport.deliver(message, credentials).await {
            Ok(()) => {
                log::info!("Report sent to {}", credentials.address());
                Ok(())
            }
            Err(e) => {
                log::error!("Report send failed: {}", e);
                Err(e)
            }
        }
    }
}
