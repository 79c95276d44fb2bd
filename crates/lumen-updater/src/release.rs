use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Metadata describing one published release of the application.
///
/// Field names serialize in camelCase for the CLI JSON surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseInfo {
    /// The release's own version label. May carry a leading `v`/`V` prefix
    /// and is never normalized.
    pub version_name: String,
    /// Link to the release page.
    pub release_url: String,
    /// Direct installer URL; absent when the release cannot be downloaded
    /// through this mechanism.
    #[serde(default)]
    pub installer_url: Option<String>,
    /// Installer size in bytes, present only together with `installer_url`.
    #[serde(default)]
    pub installer_size: Option<u64>,
    #[serde(default)]
    pub changelog: Option<String>,
}

impl ReleaseInfo {
    /// A release without an installer URL must never be surfaced as a
    /// downloadable update, regardless of how its version compares.
    #[must_use]
    pub fn is_actionable(&self) -> bool {
        self.installer_url.is_some()
    }
}

/// Typed failure for release metadata fetches. The check coordinator only
/// distinguishes "success with a record" from one of these; it never retries
/// and never inspects transport details.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NetworkError {
    #[error("Request timed out")]
    Timeout,
    #[error("No network connectivity")]
    NoConnectivity,
    #[error("Server error: HTTP {status}")]
    ServerError { status: u16 },
    #[error("Release metadata not found")]
    NotFound,
    #[error("Update request failed: {0}")]
    Unknown(String),
}

impl From<reqwest::Error> for NetworkError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout
        } else if error.is_connect() {
            Self::NoConnectivity
        } else {
            Self::Unknown(error.to_string())
        }
    }
}

/// Source of release metadata for the application.
#[async_trait]
pub trait ReleaseRepository: Send + Sync {
    /// Fetch the latest published release. One network round trip per call;
    /// no retries.
    async fn fetch_latest(&self) -> Result<ReleaseInfo, NetworkError>;
}

#[async_trait]
impl<R: ReleaseRepository + ?Sized> ReleaseRepository for &R {
    async fn fetch_latest(&self) -> Result<ReleaseInfo, NetworkError> {
        (**self).fetch_latest().await
    }
}
