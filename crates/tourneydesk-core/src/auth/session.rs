use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::sealed::{self, SealedBox};
use crate::models::{Role, UserId};

/// Session file name in cache directory
const SESSION_FILE: &str = "session.json";

/// Buffer before expiry at which a session should be renewed
const REFRESH_BUFFER_MINUTES: i64 = 5;

/// What the backend grants on login: role, bearer token and user id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionData {
    pub token: String,
    pub role: Role,
    pub user_id: UserId,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

impl SessionData {
    pub fn expires_at(&self, max_age: Duration) -> DateTime<Utc> {
        self.created_at + max_age
    }

    pub fn is_expired(&self, max_age: Duration) -> bool {
        Utc::now() > self.expires_at(max_age)
    }

    /// Check if the session will expire soon and should be renewed
    pub fn needs_refresh(&self, max_age: Duration) -> bool {
        Utc::now() > self.expires_at(max_age) - Duration::minutes(REFRESH_BUFFER_MINUTES)
    }

    /// Get minutes remaining until expiry (for display)
    pub fn minutes_until_expiry(&self, max_age: Duration) -> i64 {
        (self.expires_at(max_age) - Utc::now()).num_minutes().max(0)
    }
}

/// The current login, persisted in the cache directory.
///
/// With a secret the file holds a [`SealedBox`] instead of plain JSON.
pub struct Session {
    cache_dir: PathBuf,
    max_age: Duration,
    secret: Option<String>,
    pub data: Option<SessionData>,
}

impl Session {
    pub fn new(cache_dir: PathBuf, max_age: Duration, secret: Option<String>) -> Self {
        Self {
            cache_dir,
            max_age,
            secret,
            data: None,
        }
    }

    /// Load session from disk. Returns whether a live session was found.
    pub fn load(&mut self) -> Result<bool> {
        let path = self.session_path();
        if !path.exists() {
            return Ok(false);
        }

        let contents = std::fs::read_to_string(&path).context("Failed to read session file")?;
        let data = self.decode(&contents)?;

        if data.is_expired(self.max_age) {
            debug!(username = %data.username, "Stored session expired");
            return Ok(false);
        }
        self.data = Some(data);
        Ok(true)
    }

    /// Save session to disk
    pub fn save(&self) -> Result<()> {
        if let Some(ref data) = self.data {
            let path = self.session_path();
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, self.encode(data)?)?;
        }
        Ok(())
    }

    fn encode(&self, data: &SessionData) -> Result<String> {
        let json = serde_json::to_string_pretty(data)?;
        match self.secret {
            Some(ref secret) => {
                let sealed = sealed::seal(secret, json.as_bytes())?;
                Ok(serde_json::to_string(&sealed)?)
            }
            None => Ok(json),
        }
    }

    fn decode(&self, contents: &str) -> Result<SessionData> {
        match self.secret {
            Some(ref secret) => {
                let sealed: SealedBox =
                    serde_json::from_str(contents).context("Failed to parse sealed session file")?;
                let plain = sealed::open(secret, &sealed)?;
                serde_json::from_slice(&plain).context("Failed to parse session file")
            }
            None => serde_json::from_str(contents).context("Failed to parse session file"),
        }
    }

    /// Clear session data
    pub fn clear(&mut self) -> Result<()> {
        self.data = None;
        let path = self.session_path();
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }

    /// Update session with new data
    pub fn update(&mut self, data: SessionData) {
        self.data = Some(data);
    }

    /// Get the bearer token if session is valid
    pub fn token(&self) -> Option<&str> {
        self.data
            .as_ref()
            .filter(|d| !d.is_expired(self.max_age))
            .map(|d| d.token.as_str())
    }

    pub fn role(&self) -> Option<Role> {
        self.data.as_ref().map(|d| d.role)
    }

    pub fn user_id(&self) -> Option<&UserId> {
        self.data.as_ref().map(|d| &d.user_id)
    }

    /// Check if session is valid (exists and not expired)
    pub fn is_valid(&self) -> bool {
        self.token().is_some()
    }

    pub fn max_age(&self) -> Duration {
        self.max_age
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    fn session_path(&self) -> PathBuf {
        self.cache_dir.join(SESSION_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "tourneydesk-session-{}-{}",
            name,
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    fn data(created_at: DateTime<Utc>) -> SessionData {
        SessionData {
            token: "tok".to_string(),
            role: Role::Manager,
            user_id: UserId::new("7"),
            username: "manager".to_string(),
            created_at,
        }
    }

    #[test]
    fn test_expiry() {
        let max_age = Duration::minutes(30);
        assert!(!data(Utc::now()).is_expired(max_age));
        assert!(data(Utc::now() - Duration::minutes(31)).is_expired(max_age));
        assert!(data(Utc::now() - Duration::minutes(26)).needs_refresh(max_age));
        assert_eq!(data(Utc::now() - Duration::minutes(40)).minutes_until_expiry(max_age), 0);
    }

    #[test]
    fn test_save_and_load_plain() {
        let dir = temp_dir("plain");
        let mut session = Session::new(dir.clone(), Duration::minutes(30), None);
        session.update(data(Utc::now()));
        session.save().unwrap();

        let mut loaded = Session::new(dir.clone(), Duration::minutes(30), None);
        assert!(loaded.load().unwrap());
        assert_eq!(loaded.token(), Some("tok"));
        assert_eq!(loaded.role(), Some(Role::Manager));

        loaded.clear().unwrap();
        assert!(!loaded.is_valid());
        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn test_save_and_load_sealed() {
        let dir = temp_dir("sealed");
        let secret = Some("s3cret".to_string());
        let mut session = Session::new(dir.clone(), Duration::minutes(30), secret.clone());
        session.update(data(Utc::now()));
        session.save().unwrap();

        let raw = std::fs::read_to_string(dir.join(SESSION_FILE)).unwrap();
        assert!(!raw.contains("\"tok\""));

        let mut loaded = Session::new(dir.clone(), Duration::minutes(30), secret);
        assert!(loaded.load().unwrap());
        assert_eq!(loaded.user_id(), Some(&UserId::new("7")));

        let mut wrong = Session::new(dir.clone(), Duration::minutes(30), Some("nope".to_string()));
        assert!(wrong.load().is_err());
        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn test_expired_session_not_loaded() {
        let dir = temp_dir("expired");
        let mut session = Session::new(dir.clone(), Duration::minutes(30), None);
        session.update(data(Utc::now() - Duration::hours(2)));
        session.save().unwrap();

        let mut loaded = Session::new(dir.clone(), Duration::minutes(30), None);
        assert!(!loaded.load().unwrap());
        assert!(loaded.data.is_none());
        let _ = std::fs::remove_dir_all(dir);
    }
}
