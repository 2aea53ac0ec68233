//! Local file backend.
//!
//! Used for development and for single-host deployments. The blob is written
//! with owner-only permissions (`0600`) on Unix.

use super::{Backend, BackendError};
use std::io::ErrorKind;
use std::path::PathBuf;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, instrument};

/// A [`Backend`] storing the blob in a single file.
#[derive(Debug, Clone)]
pub struct DiskBackend {
    path: PathBuf,
}

impl DiskBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Backend for DiskBackend {
    fn address(&self) -> String {
        self.path.display().to_string()
    }

    #[instrument(level = "debug", skip_all, fields(path = %self.path.display()))]
    async fn read(&self) -> Result<Option<Vec<u8>>, BackendError> {
        match fs::read(&self.path).await {
            Ok(bytes) => {
                debug!(bytes = bytes.len(), "Read article file");
                Ok(Some(bytes))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("Article file does not exist yet");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    #[instrument(level = "debug", skip_all, fields(path = %self.path.display(), bytes = bytes.len()))]
    async fn write(&self, bytes: Vec<u8>) -> Result<(), BackendError> {
        let mut options = fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        options.mode(0o600);

        let mut file = options.open(&self.path).await?;

        // mode() only applies when the file is created
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(std::fs::Permissions::from_mode(0o600))
                .await?;
        }

        file.write_all(&bytes).await?;
        file.flush().await?;
        debug!("Wrote article file");
        Ok(())
    }
}
