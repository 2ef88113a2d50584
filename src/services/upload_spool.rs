//! Temporary spool backing an upload body.
//!
//! The multipart body is written to a temp file before the provider call
//! so the upload can be streamed with a known length. The spool is
//! released (file removed) exactly once on every exit path: explicitly
//! after the provider call, or by the `Drop` backstop when an error path
//! skips the explicit release.

use crate::errors::{GatewayError, GatewayResult};
use bytes::Bytes;
use futures::{Stream, StreamExt, pin_mut};
use std::path::{Path, PathBuf};
use tokio::{
    fs::{self, File},
    io::AsyncWriteExt,
};
use uuid::Uuid;

pub struct UploadSpool {
    path: PathBuf,
    size: u64,
    released: bool,
}

impl UploadSpool {
    /// Spool an upload body to a fresh temp file under `dir`. The partial
    /// file is removed if reading or writing fails midway.
    pub async fn create<S, E>(dir: &Path, stream: S) -> GatewayResult<Self>
    where
        S: Stream<Item = Result<Bytes, E>>,
        E: std::fmt::Display,
    {
        fs::create_dir_all(dir)
            .await
            .map_err(|e| GatewayError::provider(format!("creating spool directory: {e}")))?;
        let path = dir.join(format!(".spool-{}", Uuid::new_v4()));
        let mut file = File::create(&path)
            .await
            .map_err(|e| GatewayError::provider(format!("creating spool file: {e}")))?;

        let mut size: u64 = 0;
        pin_mut!(stream);
        while let Some(chunk_res) = stream.next().await {
            let chunk = match chunk_res {
                Ok(chunk) => chunk,
                Err(err) => {
                    let _ = fs::remove_file(&path).await;
                    return Err(GatewayError::validation(format!(
                        "reading upload body: {err}"
                    )));
                }
            };
            size += chunk.len() as u64;
            if let Err(err) = file.write_all(&chunk).await {
                let _ = fs::remove_file(&path).await;
                return Err(GatewayError::provider(format!("writing spool file: {err}")));
            }
        }
        if let Err(err) = file.flush().await {
            let _ = fs::remove_file(&path).await;
            return Err(GatewayError::provider(format!("flushing spool file: {err}")));
        }

        Ok(Self {
            path,
            size,
            released: false,
        })
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    /// Reopen the spooled bytes for streaming to the provider.
    pub async fn open(&self) -> GatewayResult<File> {
        File::open(&self.path)
            .await
            .map_err(|e| GatewayError::provider(format!("reopening spool file: {e}")))
    }

    /// Remove the backing file. Consumes the spool, so a second release
    /// cannot happen; `Drop` skips removal once this has run.
    pub async fn release(mut self) {
        self.released = true;
        if let Err(err) = fs::remove_file(&self.path).await {
            tracing::warn!(path = %self.path.display(), "failed to remove spool file: {err}");
        }
    }
}

impl Drop for UploadSpool {
    fn drop(&mut self) {
        if !self.released {
            // Synchronous removal; spool files are small enough that this
            // does not stall the runtime in the rare abandon case.
            let _ = std::fs::remove_file(&self.path);
        }
    }
}
