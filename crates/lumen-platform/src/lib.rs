//! Per-platform filesystem locations for the Lumen updater.

mod paths;

pub use paths::{AppPaths, AppPathsError};
