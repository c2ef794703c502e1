use secrecy::{ExposeSecret, SecretString};

mod collector;

use scrum_helper::config::ScrumConfig;
use scrum_helper::core::credentials::{MailCredentials, ValidationError};
use scrum_helper::mail::{SmtpRelay, keyring};
use scrum_helper::workflow::{ActionError, ActionOutcome, ScrumSession};

use collector::TerminalForm;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (config, config_error) = match ScrumConfig::load() {
        Ok(config) => (config, None),
        Err(e) => (ScrumConfig::default(), Some(e)),
    };

    // Log to the systemd user journal (`journalctl --user -t scrum-helper -f`).
    // Wrapper filters: this crate at info/debug (per config), everything else at warn.
    {
        struct FilteredJournal {
            inner: systemd_journal_logger::JournalLog,
        }

        impl log::Log for FilteredJournal {
            fn enabled(&self, metadata: &log::Metadata) -> bool {
                let target = metadata.target();
                if target.starts_with("scrum_helper") {
                    let max = if scrum_helper::debug_logging() {
                        log::LevelFilter::Debug
                    } else {
                        log::LevelFilter::Info
                    };
                    metadata.level() <= max
                } else {
                    metadata.level() <= log::LevelFilter::Warn
                }
            }
            fn log(&self, record: &log::Record) {
                if self.enabled(record.metadata()) {
                    self.inner.log(record);
                }
            }
            fn flush(&self) {
                self.inner.flush();
            }
        }

        scrum_helper::set_debug_logging(config.debug_logging);

        match systemd_journal_logger::JournalLog::new() {
            Ok(journal) => {
                let journal = journal.with_syslog_identifier("scrum-helper".to_string());
                if log::set_boxed_logger(Box::new(FilteredJournal { inner: journal })).is_ok() {
                    // Global max must be Debug so debug logs can pass through when toggled
                    log::set_max_level(log::LevelFilter::Debug);
                }
            }
            Err(e) => eprintln!("Journal logging unavailable: {}", e),
        }
    }

    if let Some(e) = config_error {
        log::warn!("Using default settings: {}", e);
    }

    let relay = SmtpRelay::new(config.smtp.host.clone(), config.smtp.port);
    let session = ScrumSession::new(&config, relay)?;
    let today = chrono::Local::now().date_naive();

    let stdin = std::io::stdin();
    let mut form = TerminalForm::new(stdin.lock(), std::io::stdout());
    let values = form.collect(session.schema(), today)?;

    if !form.ask_yes_no("\nSave and send the report by email?", true)? {
        let outcome = session.save_only(&values).map_err(|e| {
            log::error!("Failed to save record: {}", e);
            e
        })?;
        form.show(&format!("Saved to {}", outcome.path().display()))?;
        return Ok(());
    }

    let address = form.ask("Sender address")?;
    let mut secret = SecretString::from(form.ask("Password (empty to use the keyring)")?);
    if secret.expose_secret().is_empty() && !address.trim().is_empty() {
        match keyring::load_secret(address.trim()).await {
            Ok(Some(stored)) => secret = stored,
            Ok(None) => log::debug!("No keyring entry for {}", address.trim()),
            Err(e) => log::warn!("Keyring lookup failed: {}", e),
        }
    }
    let credentials = MailCredentials::from_secret(address, secret);

    match session.save_and_send(&values, &credentials).await {
        Ok(ActionOutcome::Sent { path }) => {
            form.show(&format!("Saved to {} and sent to {}", path.display(), credentials.address()))?;
        }
        Ok(ActionOutcome::SendFailed { path, error }) => {
            form.show(&format!("Saved to {}, but the email was not sent: {}", path.display(), error))?;
        }
        Ok(ActionOutcome::Saved { path }) => {
            form.show(&format!("Saved to {}", path.display()))?;
        }
        Err(ActionError::Validation(e)) => {
            let hint = match e {
                ValidationError::MissingAddress => "enter the sender address",
                ValidationError::MissingSecret => "enter the password or store it in the keyring",
            };
            form.show(&format!("Nothing saved: {} ({})", e, hint))?;
        }
        Err(ActionError::Store(e)) => {
            log::error!("Failed to save record: {}", e);
            form.show(&format!("Failed to save record: {}", e))?;
            return Err(e.into());
        }
    }

    Ok(())
}
