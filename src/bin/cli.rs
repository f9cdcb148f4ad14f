use bankbook::{HtmlStore, Session, config::AppConfig};

use std::io;
use std::path::PathBuf;
use anyhow::Context;
use clap::Parser;
use log::info;

#[derive(Parser, Debug)]
#[clap(version, about)]
struct Cli {
    /// Ledger file to read and update
    #[clap(short, long, value_parser)]
    ledger: Option<PathBuf>,

    /// TOML file overriding the ledger location and messages
    #[clap(short, long, value_parser)]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Cli::parse();

    let mut config = match &args.config {
        Some(path) => AppConfig::read(path)?,
        None => AppConfig::default()
    };
    if let Some(ledger) = args.ledger {
        config.ledger = ledger;
    }

    let store = HtmlStore::new(&config.ledger);
    info!("using ledger {}", store.path().display());
    let stdin = io::stdin();
    let mut session = Session::new(store, config.messages, stdin.lock(), io::stdout());
    session.run().context("failed to talk to the terminal")?;
    Ok(())
}
