use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::level_filters::LevelFilter;

use crate::cli::Cli;
use crate::domain::{RecordPolicy, RunMode};
use crate::errors::{SaugError, SaugResult};

const DEFAULT_DIRECTORY: &str = "~/Podcasts";
const DEFAULT_CONFIG_PATH: &str = "~/.saug/feeds.txt";
const DEFAULT_LEDGER_PATH: &str = "~/.saug/ledger.db";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    Silent,
    Normal,
    Verbose,
}

impl Verbosity {
    pub fn level_filter(&self) -> LevelFilter {
        match self {
            Verbosity::Silent => LevelFilter::OFF,
            Verbosity::Normal => LevelFilter::INFO,
            Verbosity::Verbose => LevelFilter::DEBUG,
        }
    }
}

impl TryFrom<u8> for Verbosity {
    type Error = SaugError;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        match level {
            0 => Ok(Verbosity::Silent),
            1 => Ok(Verbosity::Normal),
            2 => Ok(Verbosity::Verbose),
            _ => Err(SaugError::InvalidInput(format!(
                "verbosity must be 0, 1 or 2, got {}",
                level
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub target_directory: PathBuf,
    pub config_path: PathBuf,
    pub ledger_path: PathBuf,
    pub update_only: bool,
    pub debug: bool,
    pub verbosity: Verbosity,
    pub cutoff_days: Option<u32>,
    pub feed_filter: Option<String>,
    pub only_new: bool,
    pub record_policy: RecordPolicy,
    pub transfer_timeout: Duration,
}

impl Config {
    /// Get the directory where the executable is located
    fn exe_dir() -> Option<PathBuf> {
        std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
    }

    /// Load `.env` overrides so clap can pick up `SAUG_*` defaults.
    pub fn load_env() {
        // Try to load .env from executable's directory first
        if let Some(dir) = Self::exe_dir() {
            let env_path = dir.join(".env");
            if env_path.exists() {
                dotenvy::from_path(&env_path).ok();
            }
        }
        // Fall back to current directory
        dotenvy::dotenv().ok();
    }

    pub fn from_cli(cli: &Cli) -> SaugResult<Self> {
        let directory = cli.directory.as_deref().unwrap_or(DEFAULT_DIRECTORY);
        let config_path = cli.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);
        let ledger_path = cli.ledger.as_deref().unwrap_or(DEFAULT_LEDGER_PATH);

        if cli.timeout == 0 {
            return Err(SaugError::Config(
                "transfer timeout must be at least one second".to_string(),
            ));
        }

        let record_policy = if cli.retry_failed {
            RecordPolicy::RecordSuccessOnly
        } else {
            RecordPolicy::RecordAttempts
        };

        Ok(Self {
            target_directory: expand_home(directory),
            config_path: expand_home(config_path),
            ledger_path: expand_home(ledger_path),
            update_only: cli.update,
            debug: cli.debug,
            verbosity: Verbosity::try_from(cli.verbosity)?,
            cutoff_days: cli.days,
            feed_filter: cli.feed.clone(),
            only_new: !cli.all,
            record_policy,
            transfer_timeout: Duration::from_secs(cli.timeout),
        })
    }

    /// Minimum publish date for this run: midnight UTC today, minus the day count.
    pub fn cutoff(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let days = self.cutoff_days?;
        let midnight = now.date_naive().and_hms_opt(0, 0, 0)?.and_utc();
        Some(midnight - chrono::Duration::days(i64::from(days)))
    }

    pub fn run_mode(&self) -> RunMode {
        RunMode {
            debug: self.debug,
            update: self.update_only,
            record_policy: self.record_policy,
        }
    }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_home(path: &str) -> PathBuf {
    let home = std::env::var_os("HOME").map(PathBuf::from);

    match (path.strip_prefix('~'), home) {
        (Some(""), Some(home)) => home,
        (Some(rest), Some(home)) if rest.starts_with('/') => {
            home.join(rest.trim_start_matches('/'))
        }
        _ => Path::new(path).to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use clap::Parser;

    fn config_from(args: &[&str]) -> Config {
        let mut argv = vec!["saug"];
        argv.extend_from_slice(args);
        let cli = Cli::try_parse_from(argv).unwrap();
        Config::from_cli(&cli).unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[
            "-c", "/tmp/feeds.txt", "-L", "/tmp/ledger.db", "-d", "/tmp/pods",
        ]);

        assert_eq!(config.config_path, PathBuf::from("/tmp/feeds.txt"));
        assert_eq!(config.ledger_path, PathBuf::from("/tmp/ledger.db"));
        assert_eq!(config.target_directory, PathBuf::from("/tmp/pods"));
        assert_eq!(config.verbosity, Verbosity::Normal);
        assert!(config.only_new);
        assert!(!config.update_only);
        assert!(!config.debug);
        assert_eq!(config.cutoff_days, None);
        assert_eq!(config.record_policy, RecordPolicy::RecordAttempts);
        assert_eq!(config.transfer_timeout, Duration::from_secs(300));
    }

    #[test]
    fn test_flags_map_to_fields() {
        let config = config_from(&[
            "-u", "--debug", "-v", "2", "-t", "7", "-f", "econtalk", "--all", "--retry-failed",
        ]);

        assert!(config.update_only);
        assert!(config.debug);
        assert_eq!(config.verbosity, Verbosity::Verbose);
        assert_eq!(config.cutoff_days, Some(7));
        assert_eq!(config.feed_filter.as_deref(), Some("econtalk"));
        assert!(!config.only_new);
        assert_eq!(config.record_policy, RecordPolicy::RecordSuccessOnly);

        let mode = config.run_mode();
        assert!(mode.debug && mode.update);
    }

    #[test]
    fn test_verbosity_out_of_range_rejected() {
        assert!(Cli::try_parse_from(["saug", "-v", "3"]).is_err());
        assert!(Verbosity::try_from(3).is_err());
    }

    #[test]
    fn test_no_days_means_no_cutoff() {
        let config = config_from(&[]);
        assert_eq!(config.cutoff(Utc::now()), None);
    }

    #[test]
    fn test_zero_days_is_midnight_today() {
        let config = config_from(&["-t", "0"]);
        let now = Utc.with_ymd_and_hms(2024, 3, 15, 17, 30, 0).unwrap();

        assert_eq!(
            config.cutoff(now),
            Some(Utc.with_ymd_and_hms(2024, 3, 15, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_days_counted_back_from_midnight() {
        let config = config_from(&["-t", "7"]);
        let now = Utc.with_ymd_and_hms(2024, 3, 15, 17, 30, 0).unwrap();

        assert_eq!(
            config.cutoff(now),
            Some(Utc.with_ymd_and_hms(2024, 3, 8, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_expand_home() {
        let home = std::env::var_os("HOME").map(PathBuf::from);
        if let Some(home) = home {
            assert_eq!(expand_home("~/Podcasts"), home.join("Podcasts"));
            assert_eq!(expand_home("~"), home);
        }
        assert_eq!(expand_home("/abs/path"), PathBuf::from("/abs/path"));
        assert_eq!(expand_home("~other/x"), PathBuf::from("~other/x"));
    }
}
