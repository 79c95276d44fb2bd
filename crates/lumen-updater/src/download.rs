use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use futures_util::StreamExt;
use log::{debug, info, warn};
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::task::JoinHandle;

use crate::release::ReleaseInfo;

/// Installer package extension used for derived filenames.
const INSTALLER_EXT: &str = "apk";

/// Opaque handle to one enqueued transfer.
///
/// Issued by the [`Downloader`]; callers must not assume any numeric scheme
/// beyond "distinct per call within one downloader instance".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DownloadId(u64);

impl DownloadId {
    #[must_use]
    pub fn new(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for DownloadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Hands a transfer off to the platform download mechanism.
///
/// Fire-and-forget from the caller's perspective: progress, retries, and
/// cancellation belong entirely to the implementation.
pub trait Downloader: Send + Sync {
    fn enqueue(&self, url: &str, filename: &str) -> DownloadId;
}

impl<D: Downloader + ?Sized> Downloader for &D {
    fn enqueue(&self, url: &str, filename: &str) -> DownloadId {
        (**self).enqueue(url, filename)
    }
}

/// Triggers installation of a completed transfer. External contract; nothing
/// in this crate drives it.
pub trait InstallInvoker: Send + Sync {
    fn install(&self, id: DownloadId);
}

/// `{app}-{version}.apk`, with the version name kept exactly as published
/// (prefix included).
#[must_use]
pub fn installer_filename(app_name: &str, version_name: &str) -> String {
    format!("{app_name}-{version_name}.{INSTALLER_EXT}")
}

/// Derives installer filenames and enqueues confirmed updates with a
/// [`Downloader`].
pub struct DownloadOrchestrator<D> {
    downloader: D,
    app_name: String,
}

impl<D: Downloader> DownloadOrchestrator<D> {
    pub fn new(downloader: D, app_name: impl Into<String>) -> Self {
        Self {
            downloader,
            app_name: app_name.into(),
        }
    }

    /// Enqueue the installer for `release` and return the transfer id.
    ///
    /// Returns `None` without any side effect when the release carries no
    /// installer URL. Each call enqueues an independent transfer; there is
    /// no deduplication.
    pub fn download(&self, release: &ReleaseInfo) -> Option<DownloadId> {
        let url = release.installer_url.as_deref()?;
        let filename = installer_filename(&self.app_name, &release.version_name);
        info!("Enqueueing installer download as {filename}");
        Some(self.downloader.enqueue(url, &filename))
    }
}

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("{context}: {source}")]
    Http {
        context: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("{context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("Download failed with HTTP {status}")]
    HttpStatus { status: u16 },
    #[error("Unknown download id {0}")]
    UnknownId(DownloadId),
    #[error("Download task panicked")]
    TaskPanicked,
}

/// [`Downloader`] that streams installers over HTTP into a destination
/// directory.
///
/// Ids are issued monotonically starting at 1 and each transfer runs on its
/// own tokio task, so `enqueue` must be called from within a runtime.
/// Transfer failures never surface through `enqueue`; they are reported by
/// [`Self::wait`] and otherwise only logged.
pub struct HttpDownloader {
    client: reqwest::Client,
    dest_dir: PathBuf,
    next_id: AtomicU64,
    transfers: Mutex<HashMap<DownloadId, JoinHandle<Result<PathBuf, DownloadError>>>>,
}

impl HttpDownloader {
    #[must_use]
    pub fn new(client: reqwest::Client, dest_dir: PathBuf) -> Self {
        Self {
            client,
            dest_dir,
            next_id: AtomicU64::new(1),
            transfers: Mutex::new(HashMap::new()),
        }
    }

    /// Wait for a previously enqueued transfer and return the downloaded
    /// path. Each id can be waited on once.
    ///
    /// # Errors
    /// Returns an error when the id is unknown, the transfer failed, or the
    /// transfer task panicked.
    pub async fn wait(&self, id: DownloadId) -> Result<PathBuf, DownloadError> {
        let handle = self
            .transfers
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .remove(&id)
            .ok_or(DownloadError::UnknownId(id))?;
        handle.await.map_err(|_| DownloadError::TaskPanicked)?
    }
}

impl Downloader for HttpDownloader {
    fn enqueue(&self, url: &str, filename: &str) -> DownloadId {
        let id = DownloadId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let client = self.client.clone();
        let url = url.to_string();
        let dest = self.dest_dir.join(filename);

        let handle = tokio::spawn(async move {
            let result = fetch_to_file(&client, &url, &dest).await;
            match &result {
                Ok(path) => info!("Download complete: {}", path.display()),
                Err(error) => warn!("Download failed: {error}"),
            }
            result
        });
        self.transfers
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .insert(id, handle);
        id
    }
}

async fn fetch_to_file(
    client: &reqwest::Client,
    url: &str,
    dest: &Path,
) -> Result<PathBuf, DownloadError> {
    if let Some(parent) = dest.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|source| DownloadError::Io {
                context: "failed to create download directory",
                source,
            })?;
    }

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|source| DownloadError::Http {
            context: "download request failed",
            source,
        })?;
    let status = response.status();
    if !status.is_success() {
        return Err(DownloadError::HttpStatus {
            status: status.as_u16(),
        });
    }

    let mut file = tokio::fs::File::create(dest)
        .await
        .map_err(|source| DownloadError::Io {
            context: "failed to create download file",
            source,
        })?;

    let mut downloaded: u64 = 0;
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|source| DownloadError::Http {
            context: "download stream error",
            source,
        })?;
        file.write_all(&chunk)
            .await
            .map_err(|source| DownloadError::Io {
                context: "failed to write download data",
                source,
            })?;
        downloaded += chunk.len() as u64;
    }

    file.flush().await.map_err(|source| DownloadError::Io {
        context: "failed to flush download file",
        source,
    })?;

    debug!("Downloaded {downloaded} bytes to {}", dest.display());
    Ok(dest.to_path_buf())
}
