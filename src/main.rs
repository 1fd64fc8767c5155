use std::io::IsTerminal;

use chrono::Utc;
use clap::Parser;
use tracing::{info, warn};

use saug::cli::Cli;
use saug::config::{Config, Verbosity};
use saug::errors::SaugResult;
use saug::services::{dedup_sources, FeedCollection, RunOptions};
use saug::sources::RssAtomSource;
use saug::storage::{FeedListStore, FileFeedList, SqliteLedgerStore, SqliteStorage};
use saug::transfer::HttpDownloader;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> SaugResult<()> {
    Config::load_env();
    let cli = Cli::parse();
    let config = Config::from_cli(&cli)?;

    init_logging(config.verbosity);

    let feed_list = FileFeedList::new(&config.config_path);

    if cli.list {
        cmd_list(feed_list);
        return Ok(());
    }

    cmd_run(feed_list, &config)
}

fn init_logging(verbosity: Verbosity) {
    tracing_subscriber::fmt()
        .with_max_level(verbosity.level_filter())
        .with_target(false)
        .without_time()
        .with_ansi(std::io::stdout().is_terminal())
        .init();
}

fn cmd_list(feed_list: FileFeedList) {
    match feed_list.load() {
        Ok(sources) => {
            for source in dedup_sources(sources) {
                println!("{}", source);
            }
        }
        Err(e) => warn!("Could not read feed list: {}", e),
    }
}

fn cmd_run(feed_list: FileFeedList, config: &Config) -> SaugResult<()> {
    let storage = SqliteStorage::new(&config.ledger_path)?;
    let collection = FeedCollection::new(
        feed_list,
        SqliteLedgerStore::new(storage),
        RssAtomSource::new(),
        HttpDownloader::new(config.transfer_timeout),
    );

    if config.update_only {
        info!("Update mode: marking new items as downloaded without fetching them");
    } else if config.debug {
        info!("Debug mode: nothing will be transferred");
    }

    let options = RunOptions {
        directory: config.target_directory.clone(),
        min_date: config.cutoff(Utc::now()),
        only_new: config.only_new,
        mode: config.run_mode(),
        feed_filter: config.feed_filter.clone(),
    };

    collection.run(&options)?;
    Ok(())
}
