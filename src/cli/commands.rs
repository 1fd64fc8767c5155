use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "saug")]
#[command(about = "Personal podcast aggregator: downloads new enclosures from your feeds")]
#[command(version)]
pub struct Cli {
    /// Directory episodes are downloaded into
    #[arg(short, long, env = "SAUG_DIRECTORY")]
    pub directory: Option<String>,

    /// Mark new items as downloaded without fetching them
    #[arg(short, long)]
    pub update: bool,

    /// List configured feeds and exit
    #[arg(short, long)]
    pub list: bool,

    /// Only consider items published within the last N days (0 = today only)
    #[arg(short = 't', long, value_name = "N")]
    pub days: Option<u32>,

    /// Restrict the run to a single configured feed
    #[arg(short, long, value_name = "URL")]
    pub feed: Option<String>,

    /// Path to the feed list
    #[arg(short, long, env = "SAUG_CONFIG", value_name = "PATH")]
    pub config: Option<String>,

    /// Path to the download ledger database
    #[arg(short = 'L', long, env = "SAUG_LEDGER", value_name = "PATH")]
    pub ledger: Option<String>,

    /// Dry run - select items and record them, but never transfer anything
    #[arg(long)]
    pub debug: bool,

    /// Output level: 0 = silent, 1 = normal, 2 = verbose
    #[arg(short, long, default_value_t = 1, value_parser = clap::value_parser!(u8).range(0..=2))]
    pub verbosity: u8,

    /// Consider every item, including ones already downloaded
    #[arg(short, long)]
    pub all: bool,

    /// Only mark items as downloaded when the transfer succeeded
    #[arg(long)]
    pub retry_failed: bool,

    /// Timeout for a single enclosure transfer, in seconds
    #[arg(long, value_name = "SECS", default_value_t = 300)]
    pub timeout: u64,
}
