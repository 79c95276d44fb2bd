//! Update subsystem for the Lumen application.
//!
//! This crate decides whether a newer release exists, whether it should be
//! surfaced to the user given prior dismissals, and how a confirmed update
//! is handed off to a downloader:
//! - Version ordering across heterogeneous version strings.
//! - The update-availability decision (forced re-checks, dismissal
//!   suppression, installer actionability).
//! - Download enqueueing and identifier issuance.
//!
//! Release fetching, dismissal persistence, and the download mechanism sit
//! behind traits; GitHub-, JSON-file-, and HTTP-backed implementations are
//! provided.

mod check;
mod dismissal;
mod download;
mod github;
mod release;
mod version;

/// Update decision logic and its outcome type.
pub use check::{CheckOutcome, UpdateChecker};
/// Dismissal persistence contract, recorder, and file-backed store.
pub use dismissal::{DismissalRecorder, DismissalStore, FileDismissalStore};
/// Download hand-off: orchestrator, downloader contracts, and HTTP downloader.
pub use download::{
    DownloadError, DownloadId, DownloadOrchestrator, Downloader, HttpDownloader, InstallInvoker,
    installer_filename,
};
/// GitHub releases-backed release repository.
pub use github::{GitHubAsset, GitHubRelease, GitHubReleaseRepository};
/// Release metadata model, network error taxonomy, and repository contract.
pub use release::{NetworkError, ReleaseInfo, ReleaseRepository};
/// Version-vector parsing and ordering helpers.
pub use version::{VersionParseError, VersionVector, is_newer};
