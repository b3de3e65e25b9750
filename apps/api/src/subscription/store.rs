//! Flat-file subscriber list.
//!
//! The file is a JSON array of email strings in insertion order. Every
//! subscribe call runs load → mutate → rewrite under one async mutex, so two
//! concurrent subscriptions cannot overwrite each other.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::sync::Mutex;
use tracing::info;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Invalid email address.")]
    InvalidEmail,

    #[error("Subscriber file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Subscriber file is not a JSON array of strings: {0}")]
    Corrupt(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscribeOutcome {
    Subscribed,
    AlreadySubscribed,
}

pub struct SubscriberStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl SubscriberStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Adds `email` unless it is already present. Duplicates are not an error.
    pub async fn subscribe(&self, email: &str) -> Result<SubscribeOutcome, StoreError> {
        let email = email.trim();
        if !email.contains('@') {
            return Err(StoreError::InvalidEmail);
        }

        let _guard = self.lock.lock().await;

        let mut subscribers = self.load().await?;
        if subscribers.iter().any(|existing| existing == email) {
            return Ok(SubscribeOutcome::AlreadySubscribed);
        }

        subscribers.push(email.to_string());
        self.rewrite(&subscribers).await?;

        info!("New subscriber added ({} total)", subscribers.len());
        Ok(SubscribeOutcome::Subscribed)
    }

    /// Current list, in insertion order. A missing file is an empty list.
    pub async fn list(&self) -> Result<Vec<String>, StoreError> {
        let _guard = self.lock.lock().await;
        self.load().await
    }

    async fn load(&self) -> Result<Vec<String>, StoreError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(Vec::new()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// Whole-file rewrite via a sibling temp file and rename.
    async fn rewrite(&self, subscribers: &[String]) -> Result<(), StoreError> {
        let json = serde_json::to_vec_pretty(subscribers)?;

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        let written = match tokio::fs::write(&tmp, json).await {
            Ok(()) => tokio::fs::rename(&tmp, &self.path).await,
            Err(e) => Err(e),
        };
        if let Err(e) = written {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        Ok(())
    }
}
