use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

pub mod cli;
pub mod display;
pub mod error;
pub mod models;
pub mod rule;
pub mod schema;
pub mod settings;
pub mod stats;
pub mod store;
pub mod transfer;

pub use crate::error::StoreError;
pub use crate::models::{FamilyIncome, PromotionStatus, StudentInput, StudentRecord};
pub use crate::store::RecordStore;

use crate::cli::{Cli, Command};
use crate::settings::Settings;

/// Installs a `tracing` subscriber writing to stderr. `RUST_LOG` takes precedence over the
/// configured filter.
pub fn init_logging(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    // Ignore the error if a subscriber was already installed.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Loads the configuration, letting `--database` override the configured store location.
pub fn load_settings(cli: &Cli) -> Result<Settings> {
    let mut settings =
        Settings::load(cli.config.as_deref()).context("failed to load configuration")?;

    if let Some(database) = &cli.database {
        settings.store.database_url = database.clone();
    }

    Ok(settings)
}

/// Runs a parsed command against the store described by `settings`. The store is only opened by
/// commands that need it.
pub fn run(command: Command, settings: &Settings) -> Result<()> {
    let open_store = || RecordStore::open(settings.store.database_url.as_str());

    match command {
        Command::Init => {
            let store = open_store()?;
            println!("Record store ready at '{}'", store.database_url());
        }
        Command::Predict(input) => {
            let record = open_store()?.upsert(&input)?;
            display::show_prediction(&record, &rule::factors(&input));
        }
        Command::List { statuses, incomes } => {
            let records = open_store()?.list_all()?;
            display::show_records(&stats::filter(&records, &statuses, &incomes));
        }
        Command::Delete { student_id } => match open_store()?.delete(student_id)? {
            Some(_) => println!("Student {student_id} deleted successfully!"),
            None => println!("No record found for student {student_id}."),
        },
        Command::Summary => {
            let records = open_store()?.list_all()?;
            display::show_overview(&stats::overview(&records));
        }
        Command::Analytics => {
            let records = open_store()?.list_all()?;
            display::show_analytics(&records);
        }
        Command::Criteria => display::show_criteria(),
        Command::Export { file_path } => {
            let count = transfer::export_csv(&open_store()?, &file_path)
                .with_context(|| format!("failed to export to {}", file_path.display()))?;
            println!("Exported {count} records to {}", file_path.display());
        }
        Command::Import { file_path } => {
            let summary = transfer::import_csv(&open_store()?, &file_path)
                .with_context(|| format!("failed to import {}", file_path.display()))?;
            println!("Imported {} records", summary.imported);
            if !summary.rejected.is_empty() {
                println!("Rejected rows: {:?}", summary.rejected);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{LogSettings, StoreSettings};
    use tempfile::TempDir;

    fn settings_in(dir: &TempDir) -> Settings {
        Settings {
            store: StoreSettings {
                database_url: dir.path().join("students.db").to_str().unwrap().to_string(),
            },
            log: LogSettings {
                filter: "info".to_string(),
            },
        }
    }

    fn unreachable_settings(dir: &TempDir) -> Settings {
        let mut settings = settings_in(dir);
        settings.store.database_url = dir
            .path()
            .join("missing")
            .join("students.db")
            .to_str()
            .unwrap()
            .to_string();
        settings
    }

    fn input(student_id: i32) -> StudentInput {
        StudentInput {
            student_id,
            school_satisfaction: 4.0,
            attendance_rate: 85.0,
            failed_courses: 0,
            commute_time: 20,
            disciplinary_incidents: 0,
            homework_completion: 90.0,
            family_income: FamilyIncome::Medium,
        }
    }

    #[test]
    fn deleting_a_missing_student_succeeds() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings_in(&dir);

        assert!(run(Command::Delete { student_id: 99 }, &settings).is_ok());
    }

    #[test]
    fn reports_run_on_an_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings_in(&dir);

        assert!(run(Command::Summary, &settings).is_ok());
        assert!(run(Command::Analytics, &settings).is_ok());
        assert!(
            run(
                Command::List {
                    statuses: vec![],
                    incomes: vec![],
                },
                &settings
            )
            .is_ok()
        );
    }

    #[test]
    fn predict_then_delete_goes_through_the_store() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings_in(&dir);

        run(Command::Predict(input(5)), &settings).unwrap();
        run(Command::Analytics, &settings).unwrap();

        let store = RecordStore::open(settings.store.database_url.as_str()).unwrap();
        assert_eq!(
            store.get(5).unwrap().map(|r| r.promotion_status),
            Some(PromotionStatus::Promoted)
        );

        run(Command::Delete { student_id: 5 }, &settings).unwrap();
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn criteria_do_not_open_the_store() {
        let dir = tempfile::tempdir().unwrap();
        let settings = unreachable_settings(&dir);

        assert!(run(Command::Criteria, &settings).is_ok());
    }

    #[test]
    fn store_failures_are_returned_not_panicked() {
        let dir = tempfile::tempdir().unwrap();
        let settings = unreachable_settings(&dir);

        assert!(run(Command::Summary, &settings).is_err());
        assert!(run(Command::Delete { student_id: 1 }, &settings).is_err());
    }
}
