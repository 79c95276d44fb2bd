mod cli;
mod config;
mod logging;

use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use log::debug;
use lumen_platform::AppPaths;
use lumen_updater::{
    CheckOutcome, DismissalRecorder, DownloadOrchestrator, FileDismissalStore,
    GitHubReleaseRepository, HttpDownloader, UpdateChecker,
};

use crate::cli::{Cli, Command};
use crate::config::Config;

const EXIT_UPDATE_AVAILABLE: u8 = 1;
const EXIT_NETWORK_ERROR: u8 = 2;
const EXIT_ENVIRONMENT_ERROR: u8 = 3;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.debug);
    let config = Config::load();

    let paths = match AppPaths::new() {
        Ok(paths) => paths,
        Err(error) => {
            eprintln!("lumen: {error}");
            return ExitCode::from(EXIT_ENVIRONMENT_ERROR);
        }
    };

    match cli.command {
        Command::Check { force, current } => run_check(&config, &paths, force, current).await,
        Command::Dismiss { version } => {
            DismissalRecorder::new(FileDismissalStore::new(paths.dismissal_file()))
                .dismiss(&version);
            println!("Dismissed {version}.");
            ExitCode::SUCCESS
        }
        Command::Download { force, current } => {
            run_download(&config, &paths, force, current).await
        }
    }
}

async fn run_check(
    config: &Config,
    paths: &AppPaths,
    force: bool,
    current: Option<String>,
) -> ExitCode {
    let checker = match build_checker(config, paths, current) {
        Ok(checker) => checker,
        Err(code) => return code,
    };

    match checker.check_outcome(force).await {
        CheckOutcome::UpdateAvailable(release) => {
            match serde_json::to_string_pretty(&release) {
                Ok(json) => println!("{json}"),
                Err(error) => {
                    eprintln!("lumen: failed to render release: {error}");
                    return ExitCode::from(EXIT_ENVIRONMENT_ERROR);
                }
            }
            ExitCode::from(EXIT_UPDATE_AVAILABLE)
        }
        CheckOutcome::FetchFailed(error) => {
            eprintln!("lumen: update check failed: {error}");
            ExitCode::from(EXIT_NETWORK_ERROR)
        }
        outcome => {
            debug!("No update surfaced: {outcome:?}");
            ExitCode::SUCCESS
        }
    }
}

async fn run_download(
    config: &Config,
    paths: &AppPaths,
    force: bool,
    current: Option<String>,
) -> ExitCode {
    let checker = match build_checker(config, paths, current) {
        Ok(checker) => checker,
        Err(code) => return code,
    };

    let Some(release) = checker.check(force).await else {
        println!("No update available.");
        return ExitCode::SUCCESS;
    };

    let client = match http_client(config) {
        Ok(client) => client,
        Err(code) => return code,
    };
    let downloader = HttpDownloader::new(client, paths.downloads_dir());
    let orchestrator = DownloadOrchestrator::new(&downloader, config.app_name.clone());

    // check() only surfaces actionable releases, so an enqueue always
    // happens here.
    let Some(id) = orchestrator.download(&release) else {
        println!("No update available.");
        return ExitCode::SUCCESS;
    };

    println!(
        "Downloading {} ({} bytes)...",
        release.version_name,
        release.installer_size.unwrap_or(0)
    );
    match downloader.wait(id).await {
        Ok(path) => {
            println!("Saved installer to {}", path.display());
            ExitCode::SUCCESS
        }
        Err(error) => {
            eprintln!("lumen: download failed: {error}");
            ExitCode::from(EXIT_NETWORK_ERROR)
        }
    }
}

fn build_checker(
    config: &Config,
    paths: &AppPaths,
    current: Option<String>,
) -> Result<UpdateChecker<GitHubReleaseRepository, FileDismissalStore>, ExitCode> {
    let client = http_client(config)?;
    let current = current.unwrap_or_else(|| config.current_version.clone());
    debug!(
        "Checking {}/{} against current version {current}",
        config.github_owner, config.github_repo
    );

    Ok(UpdateChecker::new(
        GitHubReleaseRepository::new(client, &config.github_owner, &config.github_repo),
        FileDismissalStore::new(paths.dismissal_file()),
        current,
    ))
}

fn http_client(config: &Config) -> Result<reqwest::Client, ExitCode> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(config.http_timeout_secs))
        .user_agent(format!("lumen/{}", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|error| {
            eprintln!("lumen: failed to build HTTP client: {error}");
            ExitCode::from(EXIT_ENVIRONMENT_ERROR)
        })
}
