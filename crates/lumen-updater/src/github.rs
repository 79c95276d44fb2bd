use async_trait::async_trait;
use log::debug;
use serde::Deserialize;

use crate::release::{NetworkError, ReleaseInfo, ReleaseRepository};

const USER_AGENT: &str = concat!("lumen-updater/", env!("CARGO_PKG_VERSION"));

/// Installer packages are published as release assets with this extension.
const INSTALLER_ASSET_EXT: &str = ".apk";

#[derive(Debug, Clone, Deserialize)]
pub struct GitHubAsset {
    pub name: String,
    pub browser_download_url: String,
    pub size: u64,
}

#[derive(Debug, Deserialize)]
pub struct GitHubRelease {
    pub tag_name: String,
    pub html_url: String,
    pub body: Option<String>,
    #[serde(default)]
    pub assets: Vec<GitHubAsset>,
}

impl From<GitHubRelease> for ReleaseInfo {
    fn from(release: GitHubRelease) -> Self {
        // The tag is kept verbatim, prefix included; comparison strips it.
        let installer = release
            .assets
            .into_iter()
            .find(|asset| asset.name.ends_with(INSTALLER_ASSET_EXT));
        let (installer_url, installer_size) = match installer {
            Some(asset) => (Some(asset.browser_download_url), Some(asset.size)),
            None => (None, None),
        };

        Self {
            version_name: release.tag_name,
            release_url: release.html_url,
            installer_url,
            installer_size,
            changelog: release.body,
        }
    }
}

/// [`ReleaseRepository`] over the GitHub releases API of the application
/// repository.
pub struct GitHubReleaseRepository {
    client: reqwest::Client,
    owner: String,
    repo: String,
}

impl GitHubReleaseRepository {
    #[must_use]
    pub fn new(
        client: reqwest::Client,
        owner: impl Into<String>,
        repo: impl Into<String>,
    ) -> Self {
        Self {
            client,
            owner: owner.into(),
            repo: repo.into(),
        }
    }

    fn latest_release_url(&self) -> String {
        format!(
            "https://api.github.com/repos/{}/{}/releases/latest",
            self.owner, self.repo
        )
    }
}

#[async_trait]
impl ReleaseRepository for GitHubReleaseRepository {
    async fn fetch_latest(&self) -> Result<ReleaseInfo, NetworkError> {
        let url = self.latest_release_url();
        debug!("Fetching latest release from {url}");

        let response = self
            .client
            .get(&url)
            .header("User-Agent", USER_AGENT)
            .send()
            .await
            .map_err(NetworkError::from)?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(NetworkError::NotFound);
        }
        if status.is_server_error() {
            return Err(NetworkError::ServerError {
                status: status.as_u16(),
            });
        }
        if !status.is_success() {
            return Err(NetworkError::Unknown(format!("HTTP {status}")));
        }

        let release: GitHubRelease = response
            .json()
            .await
            .map_err(|error| NetworkError::Unknown(error.to_string()))?;
        Ok(release.into())
    }
}
