use std::path::PathBuf;

use chrono::NaiveDate;

use crate::config::ScrumConfig;
use crate::core::credentials::{MailCredentials, ValidationError};
use crate::core::record::{DailyRecord, EntryInput, RecordBuilder};
use crate::core::schema::{ChecklistSchema, SchemaError};
use crate::mail::{MailDispatcher, MailTransport, SendError};
use crate::report::{ReportRenderer, StatusStyle, subject_for};
use crate::store::{RecordStore, StoreError};

/// Field values handed over by whatever front end collected them.
#[derive(Debug, Clone)]
pub struct FormValues {
    pub date: NaiveDate,
    pub goal: String,
    pub entries: Vec<(String, EntryInput)>,
    pub notes: String,
}

/// Errors that stop an action before anything is sent.
#[derive(Debug, thiserror::Error)]
pub enum ActionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// How an action ended. A failed send still leaves the saved record in place.
#[derive(Debug)]
pub enum ActionOutcome {
    Saved { path: PathBuf },
    Sent { path: PathBuf },
    SendFailed { path: PathBuf, error: SendError },
}

impl ActionOutcome {
    pub fn path(&self) -> &PathBuf {
        match self {
            ActionOutcome::Saved { path }
            | ActionOutcome::Sent { path }
            | ActionOutcome::SendFailed { path, .. } => path,
        }
    }
}

/// The two user actions: save only, or save and mail the report.
pub struct ScrumSession<T> {
    schema: ChecklistSchema,
    store: RecordStore,
    style: StatusStyle,
    subject_prefix: String,
    dispatcher: MailDispatcher<T>,
}

impl<T: MailTransport> ScrumSession<T> {
    pub fn new(config: &ScrumConfig, transport: T) -> Result<Self, SchemaError> {
        Ok(Self {
            schema: config.schema()?,
            store: config.record_store(),
            style: config.status_style,
            subject_prefix: config.subject_prefix.clone(),
            dispatcher: MailDispatcher::new(transport),
        })
    }

    pub fn schema(&self) -> &ChecklistSchema {
        &self.schema
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    pub fn dispatcher(&self) -> &MailDispatcher<T> {
        &self.dispatcher
    }

    pub fn build_record(&self, form: &FormValues) -> DailyRecord {
        RecordBuilder::new(&self.schema).build(
            form.date,
            &form.goal,
            form.entries.iter().cloned(),
            &form.notes,
        )
    }

    pub fn render(&self, record: &DailyRecord) -> String {
        ReportRenderer::new(&self.schema, self.style).render(record)
    }

    pub fn save_only(&self, form: &FormValues) -> Result<ActionOutcome, ActionError> {
        let record = self.build_record(form);
        let path = self.store.save(&record)?;
        Ok(ActionOutcome::Saved { path })
    }

    /// Validate credentials, save, then send. Nothing is written when the
    /// credentials are incomplete, and nothing is sent when the save fails.
    pub async fn save_and_send(
        &self,
        form: &FormValues,
        credentials: &MailCredentials,
    ) -> Result<ActionOutcome, ActionError> {
        if let Err(e) = credentials.validate() {
            log::warn!("Not saving or sending: {}", e);
            return Err(e.into());
        }

        let record = self.build_record(form);
        let path = self.store.save(&record)?;

        let report = self.render(&record);
        let subject = subject_for(&self.subject_prefix, &record);
        match self.dispatcher.send(&report, &subject, credentials).await {
            Ok(()) => Ok(ActionOutcome::Sent { path }),
            Err(error) => {
                log::warn!("Record kept at {} although the send failed", path.display());
                Ok(ActionOutcome::SendFailed { path, error })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mail::testing::FakeTransport;

    fn config(dir: &std::path::Path) -> ScrumConfig {
        ScrumConfig {
            records_dir: dir.join("scrum_daily_logs"),
            ..ScrumConfig::default()
        }
    }

    fn form() -> FormValues {
        FormValues {
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            goal: "Ship v2".to_string(),
            entries: vec![(
                "Write tests".to_string(),
                EntryInput::with_detail(true, "JIRA-42"),
            )],
            notes: "went well".to_string(),
        }
    }

    fn creds() -> MailCredentials {
        MailCredentials::new("me@example.com", "app-password")
    }

    #[test]
    fn save_only_writes_record() {
        let dir = tempfile::tempdir().unwrap();
        let session = ScrumSession::new(&config(dir.path()), FakeTransport::default()).unwrap();

        let outcome = session.save_only(&form()).unwrap();
        assert!(matches!(outcome, ActionOutcome::Saved { .. }));
        let loaded = session.store().load(form().date).unwrap();
        assert_eq!(loaded, session.build_record(&form()));
        assert_eq!(session.dispatcher().transport().attempts(), 0);
    }

    #[tokio::test]
    async fn save_and_send_mails_the_report() {
        let dir = tempfile::tempdir().unwrap();
        let session = ScrumSession::new(&config(dir.path()), FakeTransport::default()).unwrap();

        let outcome = session.save_and_send(&form(), &creds()).await.unwrap();
        assert!(matches!(outcome, ActionOutcome::Sent { .. }));
        assert!(outcome.path().exists());

        let delivered = session.dispatcher().transport().delivered.lock().unwrap();
        assert_eq!(delivered.len(), 1);
        assert!(delivered[0].contains("Subject: Daily Scrum Report 2024-03-01"));
        assert!(delivered[0].contains("From: me@example.com"));
        assert!(delivered[0].contains("To: me@example.com"));

        // The body may be transfer-encoded, so check the report the saved record renders to.
        let saved = session.store().load(form().date).unwrap();
        let report = session.render(&saved);
        assert!(report.lines().any(|l| l == "[DONE] Write tests -> (JIRA-42)"));
    }

    #[tokio::test]
    async fn missing_address_stops_before_save_and_send() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());
        let session = ScrumSession::new(&config, FakeTransport::default()).unwrap();

        let creds = MailCredentials::new("", "app-password");
        let err = session.save_and_send(&form(), &creds).await.unwrap_err();
        assert!(matches!(err, ActionError::Validation(ValidationError::MissingAddress)));
        assert_eq!(session.dispatcher().transport().attempts(), 0);
        assert!(!config.records_dir.exists());
    }

    #[tokio::test]
    async fn login_failure_keeps_saved_record() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());
        let session = ScrumSession::new(&config, FakeTransport::rejecting_login()).unwrap();

        session.save_only(&form()).unwrap();
        let path = session.store().path_for(form().date);
        let before = std::fs::read(&path).unwrap();

        let outcome = session.save_and_send(&form(), &creds()).await.unwrap();
        match outcome {
            ActionOutcome::SendFailed { path: failed_path, error } => {
                assert_eq!(failed_path, path);
                assert!(matches!(error, SendError::Transport(_)));
            }
            other => panic!("expected SendFailed, got {:?}", other),
        }
        assert_eq!(std::fs::read(&path).unwrap(), before);
        assert_eq!(session.dispatcher().transport().attempts(), 1);
    }

    #[tokio::test]
    async fn store_failure_aborts_send() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, "").unwrap();
        let config = ScrumConfig {
            records_dir: blocker.join("logs"),
            ..ScrumConfig::default()
        };
        let session = ScrumSession::new(&config, FakeTransport::default()).unwrap();

        let err = session.save_and_send(&form(), &creds()).await.unwrap_err();
        assert!(matches!(err, ActionError::Store(StoreError::Io { .. })));
        assert_eq!(session.dispatcher().transport().attempts(), 0);
    }
}
