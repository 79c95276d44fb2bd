use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "lumen",
    about = "Update checker and installer fetcher for the Lumen app",
    version
)]
pub struct Cli {
    /// Enable verbose terminal logging.
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Check whether a newer release is available.
    ///
    /// Prints the release as JSON on stdout when an update is found. Exits 0
    /// when there is no update (or it was dismissed), 1 when an update is
    /// available, and 2 on a network failure.
    Check {
        /// Bypass a recorded dismissal.
        #[arg(long)]
        force: bool,

        /// Version to treat as currently installed (defaults to the
        /// configured one).
        #[arg(long, value_name = "VERSION")]
        current: Option<String>,
    },

    /// Suppress a specific version until the next forced check.
    Dismiss {
        /// Version name to dismiss, stored verbatim.
        #[arg(value_name = "VERSION")]
        version: String,
    },

    /// Check for an update and, when one exists, download its installer.
    Download {
        /// Bypass a recorded dismissal.
        #[arg(long)]
        force: bool,

        /// Version to treat as currently installed (defaults to the
        /// configured one).
        #[arg(long, value_name = "VERSION")]
        current: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::Cli;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn check_parses_force_and_current() {
        use clap::Parser as _;

        let cli = Cli::parse_from(["lumen", "check", "--force", "--current", "1.0.3"]);
        match cli.command {
            super::Command::Check { force, current } => {
                assert!(force);
                assert_eq!(current.as_deref(), Some("1.0.3"));
            }
            other => panic!("expected check command, got {other:?}"),
        }
    }
}
