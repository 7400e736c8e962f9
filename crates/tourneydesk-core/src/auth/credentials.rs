use anyhow::{Context, Result};
use keyring::Entry;

const SERVICE_NAME: &str = "tourneydesk";

/// Passwords remembered in the OS keychain, one entry per username.
pub struct CredentialStore {
    service: String,
}

impl Default for CredentialStore {
    fn default() -> Self {
        Self::new(SERVICE_NAME)
    }
}

impl CredentialStore {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    fn entry(&self, username: &str) -> Result<Entry> {
        Entry::new(&self.service, username).context("Failed to create keyring entry")
    }

    pub fn remember(&self, username: &str, password: &str) -> Result<()> {
        self.entry(username)?
            .set_password(password)
            .context("Failed to store password in keychain")
    }

    pub fn recall(&self, username: &str) -> Result<String> {
        self.entry(username)?
            .get_password()
            .context("Failed to retrieve password from keychain")
    }

    pub fn forget(&self, username: &str) -> Result<()> {
        self.entry(username)?
            .delete_credential()
            .context("Failed to delete credential from keychain")
    }

    pub fn has_credentials(&self, username: &str) -> bool {
        self.entry(username)
            .map(|entry| entry.get_password().is_ok())
            .unwrap_or(false)
    }
}
