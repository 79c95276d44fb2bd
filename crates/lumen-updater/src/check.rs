use log::{debug, info, warn};

use crate::dismissal::DismissalStore;
use crate::release::{NetworkError, ReleaseInfo, ReleaseRepository};
use crate::version::{self, VersionParseError};

/// Everything a single update check can conclude.
///
/// Only `UpdateAvailable` is surfaced to the user; the other outcomes exist
/// so callers such as the CLI can tell a quiet "up to date" apart from a
/// swallowed network failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    UpdateAvailable(ReleaseInfo),
    /// The latest release is not newer than the running version.
    UpToDate,
    /// The latest release is newer but carries no installer URL.
    NotDownloadable,
    /// The latest release was previously dismissed and the check was not
    /// forced.
    Dismissed,
    FetchFailed(NetworkError),
    /// One of the two version strings could not be parsed into integer
    /// components.
    UnparsableVersion(VersionParseError),
}

/// Decides whether a newer release should be surfaced to the user.
///
/// Stateless across calls apart from its two external reads; performs no
/// writes, no retries, and no request coalescing. Concurrent checks are safe
/// but each performs its own fetch.
pub struct UpdateChecker<R, S> {
    repository: R,
    dismissals: S,
    current_version: String,
}

impl<R: ReleaseRepository, S: DismissalStore> UpdateChecker<R, S> {
    pub fn new(repository: R, dismissals: S, current_version: impl Into<String>) -> Self {
        Self {
            repository,
            dismissals,
            current_version: current_version.into(),
        }
    }

    /// Run one update check and report the release when it should be
    /// surfaced.
    ///
    /// Network failures and unparsable versions are deliberately absorbed
    /// into `None` so a background check can never interrupt the caller; use
    /// [`Self::check_outcome`] when the distinction matters.
    pub async fn check(&self, force: bool) -> Option<ReleaseInfo> {
        match self.check_outcome(force).await {
            CheckOutcome::UpdateAvailable(release) => Some(release),
            _ => None,
        }
    }

    /// Run one update check and report the full outcome.
    ///
    /// Decision order: fetch the latest release, require an installer URL,
    /// require a strictly newer version, then honor a recorded dismissal
    /// unless `force` is set. Exactly one repository call per invocation.
    pub async fn check_outcome(&self, force: bool) -> CheckOutcome {
        let release = match self.repository.fetch_latest().await {
            Ok(release) => release,
            Err(error) => {
                warn!("Update check failed: {error}");
                return CheckOutcome::FetchFailed(error);
            }
        };

        if !release.is_actionable() {
            debug!(
                "Latest release {} has no installer, not surfacing",
                release.version_name
            );
            return CheckOutcome::NotDownloadable;
        }

        let newer = match version::is_newer(&release.version_name, &self.current_version) {
            Ok(newer) => newer,
            Err(error) => {
                warn!(
                    "Could not compare {} against {}: {error}",
                    release.version_name, self.current_version
                );
                return CheckOutcome::UnparsableVersion(error);
            }
        };
        if !newer {
            debug!(
                "Latest release {} is not newer than {}",
                release.version_name, self.current_version
            );
            return CheckOutcome::UpToDate;
        }

        // Dismissal matches on the exact stored string, prefix included.
        if !force
            && self
                .dismissals
                .get()
                .is_some_and(|dismissed| dismissed == release.version_name)
        {
            debug!(
                "Release {} was dismissed, suppressing",
                release.version_name
            );
            return CheckOutcome::Dismissed;
        }

        info!("Update available: {}", release.version_name);
        CheckOutcome::UpdateAvailable(release)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::{CheckOutcome, UpdateChecker};
    use crate::dismissal::DismissalStore;
    use crate::release::{NetworkError, ReleaseInfo, ReleaseRepository};

    struct FakeRepository {
        result: Result<ReleaseInfo, NetworkError>,
        calls: AtomicUsize,
    }

    impl FakeRepository {
        fn new(result: Result<ReleaseInfo, NetworkError>) -> Self {
            Self {
                result,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl ReleaseRepository for FakeRepository {
        async fn fetch_latest(&self) -> Result<ReleaseInfo, NetworkError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.result.clone()
        }
    }

    #[derive(Default)]
    struct FakeStore(Mutex<Option<String>>);

    impl FakeStore {
        fn with(version: &str) -> Self {
            Self(Mutex::new(Some(version.to_string())))
        }
    }

    impl DismissalStore for FakeStore {
        fn get(&self) -> Option<String> {
            self.0
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner)
                .clone()
        }

        fn set(&self, version: &str) {
            *self
                .0
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner) = Some(version.to_string());
        }
    }

    fn release(version: &str, installer: bool) -> ReleaseInfo {
        ReleaseInfo {
            version_name: version.to_string(),
            release_url: format!("https://example.com/releases/{version}"),
            installer_url: installer.then(|| format!("https://example.com/lumen-{version}.apk")),
            installer_size: installer.then_some(8_000_000),
            changelog: None,
        }
    }

    #[tokio::test]
    async fn newer_actionable_release_is_surfaced() {
        let checker = UpdateChecker::new(
            FakeRepository::new(Ok(release("1.0.4", true))),
            FakeStore::default(),
            "1.0.3",
        );

        let found = checker.check(false).await;
        assert_eq!(found, Some(release("1.0.4", true)));
    }

    #[tokio::test]
    async fn dismissed_release_is_suppressed() {
        let checker = UpdateChecker::new(
            FakeRepository::new(Ok(release("1.0.4", true))),
            FakeStore::with("1.0.4"),
            "1.0.3",
        );

        assert_eq!(checker.check(false).await, None);
        assert_eq!(checker.check_outcome(false).await, CheckOutcome::Dismissed);
    }

    #[tokio::test]
    async fn forced_check_bypasses_dismissal() {
        let checker = UpdateChecker::new(
            FakeRepository::new(Ok(release("1.0.4", true))),
            FakeStore::with("1.0.4"),
            "1.0.3",
        );

        assert_eq!(checker.check(true).await, Some(release("1.0.4", true)));
    }

    #[tokio::test]
    async fn network_failure_is_absorbed_into_none() {
        for error in [
            NetworkError::Timeout,
            NetworkError::NoConnectivity,
            NetworkError::ServerError { status: 500 },
            NetworkError::NotFound,
            NetworkError::Unknown("boom".to_string()),
        ] {
            let checker = UpdateChecker::new(
                FakeRepository::new(Err(error.clone())),
                FakeStore::default(),
                "1.0.3",
            );

            assert_eq!(checker.check(false).await, None);
            assert_eq!(
                checker.check_outcome(false).await,
                CheckOutcome::FetchFailed(error)
            );
        }
    }

    #[tokio::test]
    async fn newer_release_without_installer_is_not_surfaced() {
        let checker = UpdateChecker::new(
            FakeRepository::new(Ok(release("1.0.4", false))),
            FakeStore::default(),
            "1.0.3",
        );

        assert_eq!(checker.check(false).await, None);
        assert_eq!(
            checker.check_outcome(false).await,
            CheckOutcome::NotDownloadable
        );
    }

    #[tokio::test]
    async fn forced_check_still_requires_an_installer() {
        let checker = UpdateChecker::new(
            FakeRepository::new(Ok(release("1.0.4", false))),
            FakeStore::default(),
            "1.0.3",
        );

        assert_eq!(checker.check(true).await, None);
    }

    #[tokio::test]
    async fn equal_and_older_releases_are_up_to_date() {
        for remote in ["1.0.3", "1.0.2"] {
            let checker = UpdateChecker::new(
                FakeRepository::new(Ok(release(remote, true))),
                FakeStore::default(),
                "1.0.3",
            );

            assert_eq!(checker.check_outcome(false).await, CheckOutcome::UpToDate);
        }
    }

    #[tokio::test]
    async fn dismissal_match_is_exact_including_prefix() {
        // "v1.0.4" was dismissed but the repository publishes "1.0.4"; the
        // strings differ byte-for-byte, so the release is still surfaced.
        let checker = UpdateChecker::new(
            FakeRepository::new(Ok(release("1.0.4", true))),
            FakeStore::with("v1.0.4"),
            "1.0.3",
        );

        assert_eq!(checker.check(false).await, Some(release("1.0.4", true)));
    }

    #[tokio::test]
    async fn unparsable_remote_version_is_absorbed() {
        let checker = UpdateChecker::new(
            FakeRepository::new(Ok(release("1.0.x", true))),
            FakeStore::default(),
            "1.0.3",
        );

        assert_eq!(checker.check(false).await, None);
        assert!(matches!(
            checker.check_outcome(false).await,
            CheckOutcome::UnparsableVersion(_)
        ));
    }

    #[tokio::test]
    async fn each_check_performs_its_own_fetch() {
        let repository = FakeRepository::new(Ok(release("1.0.4", true)));
        let store = FakeStore::default();
        let checker = UpdateChecker::new(&repository, &store, "1.0.3");

        let _ = checker.check(false).await;
        let _ = checker.check(false).await;
        let _ = checker.check(true).await;

        assert_eq!(repository.calls.load(Ordering::SeqCst), 3);
    }
}
