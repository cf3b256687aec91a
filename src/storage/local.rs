//! Local filesystem fingerprint store.
//!
//! A missing or empty file means the channel has never been observed. Writes
//! go to a temp file first and are renamed into place.

use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::pipeline::Fingerprint;
use crate::storage::Channel;

/// Flat-file digest store rooted at a state directory.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root_dir: PathBuf,
}

impl LocalStorage {
    /// Create a new LocalStorage rooted at the given directory.
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
        }
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    /// Full path of a channel's digest file.
    pub fn path(&self, channel: Channel) -> PathBuf {
        self.root_dir.join(channel.file_name())
    }

    /// Read the stored digest for a channel, if any.
    pub async fn read(&self, channel: Channel) -> Result<Option<Fingerprint>> {
        match tokio::fs::read_to_string(self.path(channel)).await {
            Ok(text) if text.is_empty() => Ok(None),
            Ok(text) => Ok(Some(Fingerprint::from_hex(text))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Io(e)),
        }
    }

    /// Replace the stored digest for a channel.
    pub async fn write(&self, channel: Channel, fingerprint: &Fingerprint) -> Result<()> {
        tokio::fs::create_dir_all(&self.root_dir).await?;

        let path = self.path(channel);
        let tmp = path.with_extension("hash.tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(fingerprint.as_str().as_bytes()).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    /// Compare a fresh digest against the stored one.
    ///
    /// The first observation of a channel is stored and reported as
    /// unchanged. A mismatch overwrites the stored digest and reports a
    /// change. A match leaves storage untouched.
    pub async fn is_changed(&self, fingerprint: &Fingerprint, channel: Channel) -> Result<bool> {
        match self.read(channel).await? {
            None => {
                log::info!("No hash found for {channel}! Writing given hash to file");
                self.write(channel, fingerprint).await?;
                Ok(false)
            }
            Some(existing) if existing != *fingerprint => {
                log::info!("Hash mismatch for type: {channel}");
                self.write(channel, fingerprint).await?;
                Ok(true)
            }
            Some(_) => Ok(false),
        }
    }
}
