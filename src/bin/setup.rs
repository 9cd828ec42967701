//! Resets the record store.
//!
//! Every stored record is deleted. If a CSV file of submissions is given, the store is then seeded
//! from it.

use anyhow::Result;
use clap::Parser;
use dropout::RecordStore;
use dropout::settings::Settings;
use std::path::PathBuf;

#[derive(Parser, Debug)]
struct Args {
    /// A CSV file of submissions to seed the store with.
    seed: Option<PathBuf>,

    /// Path of the `sqlite3` database file.
    #[arg(long)]
    database: Option<String>,

    /// An extra configuration file, read after `config.toml`.
    #[arg(long)]
    config: Option<PathBuf>,
}

pub fn main() -> Result<()> {
    let args = Args::parse();

    let mut settings = Settings::load(args.config.as_deref())?;
    if let Some(database) = args.database {
        settings.store.database_url = database;
    }
    dropout::init_logging(&settings.log.filter);

    let store = RecordStore::open(settings.store.database_url)?;

    // Delete the entire store before seeding a new one.
    let removed = store.clear()?;
    println!("Removed {removed} records from '{}'", store.database_url());

    if let Some(seed) = args.seed {
        let summary = dropout::transfer::import_csv(&store, &seed)?;
        println!("Seeded {} records", summary.imported);
        if !summary.rejected.is_empty() {
            println!("Rejected rows: {:?}", summary.rejected);
        }
    }

    Ok(())
}
