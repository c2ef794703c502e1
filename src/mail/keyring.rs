use std::collections::HashMap;

use secrecy::SecretString;

pub(crate) const SERVICE_NAME: &str = "scrum-helper";

#[derive(Debug, thiserror::Error)]
pub enum KeyringError {
    #[error("failed to reach keyring: {0}")]
    Keyring(#[from] oo7::Error),
    #[error("invalid UTF-8 in stored secret")]
    NotUtf8,
}

/// Look up the mail password for `address` in the Secret Service keyring.
///
/// Read-only: this program never stores anything there.
pub async fn load_secret(address: &str) -> Result<Option<SecretString>, KeyringError> {
    let keyring = oo7::Keyring::new().await?;

    let mut attrs = HashMap::new();
    attrs.insert("service", SERVICE_NAME);
    attrs.insert("account", address);

    let items = keyring.search_items(&attrs).await?;

    if let Some(item) = items.first() {
        let secret_bytes = item.secret().await?;
        let secret =
            String::from_utf8(secret_bytes.to_vec()).map_err(|_| KeyringError::NotUtf8)?;
        log::debug!("Found keyring secret for {}", address);
        return Ok(Some(SecretString::from(secret)));
    }

    Ok(None)
}
