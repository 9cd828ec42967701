//! This module contains the command-line interface [`Cli`] parser for recording student metrics
//! and reporting on promotion risk.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::models::{FamilyIncome, PromotionStatus, StudentInput};

/// The command line configuration struct, where the command-line interface parser is automatically
/// derived by [`clap::Parser`].
#[derive(Parser, Debug)]
#[command(name = "dropout", version, about = "Student dropout prediction and reporting")]
pub struct Cli {
    /// Path of the `sqlite3` database file. Overrides every other configuration source.
    #[arg(long, global = true)]
    pub database: Option<String>,

    /// An extra configuration file, read after `config.toml`.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// The different commands available for managing student records.
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create the database if it does not exist yet.
    Init,

    /// Predict a student's promotion status and save the result.
    Predict(StudentInput),

    /// List the stored student records.
    List {
        /// Only show students with this status. May be repeated.
        #[arg(long = "status", value_enum)]
        statuses: Vec<PromotionStatus>,

        /// Only show students with this income level. May be repeated.
        #[arg(long = "income", value_enum)]
        incomes: Vec<FamilyIncome>,
    },

    /// Delete a student's record.
    Delete {
        #[arg(value_parser = clap::value_parser!(i32).range(1..))]
        student_id: i32,
    },

    /// Show the total, promoted, and at-risk counts with average attendance and satisfaction.
    Summary,

    /// Show distributions and average metrics by status.
    Analytics,

    /// Show the criteria used to predict promotion.
    Criteria,

    /// Write every record to a CSV file.
    Export { file_path: PathBuf },

    /// Predict and save every student in a CSV file.
    Import { file_path: PathBuf },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn predict_uses_form_defaults() {
        let cli = Cli::try_parse_from(["dropout", "predict", "--id", "12"]).unwrap();

        let Command::Predict(input) = cli.command else {
            panic!("expected predict");
        };
        assert_eq!(input.student_id, 12);
        assert_eq!(input.school_satisfaction, 3.0);
        assert_eq!(input.attendance_rate, 75.0);
        assert_eq!(input.failed_courses, 0);
        assert_eq!(input.commute_time, 30);
        assert_eq!(input.disciplinary_incidents, 0);
        assert_eq!(input.homework_completion, 85.0);
        assert_eq!(input.family_income, FamilyIncome::Low);
    }

    #[test]
    fn predict_rejects_out_of_range_values() {
        let base = ["dropout", "predict", "--id", "1"];

        for extra in [
            ["--satisfaction", "5.5"],
            ["--attendance", "101"],
            ["--failed-courses", "11"],
            ["--commute", "0"],
            ["--disciplinary", "-1"],
            ["--homework", "-0.5"],
            ["--income", "rich"],
        ] {
            let args = base.iter().chain(extra.iter()).copied();
            assert!(Cli::try_parse_from(args).is_err(), "accepted {extra:?}");
        }

        assert!(Cli::try_parse_from(["dropout", "predict", "--id", "0"]).is_err());
    }

    #[test]
    fn list_accepts_repeated_filters() {
        let cli = Cli::try_parse_from([
            "dropout", "list", "--status", "at-risk", "--income", "low", "--income", "high",
        ])
        .unwrap();

        let Command::List { statuses, incomes } = cli.command else {
            panic!("expected list");
        };
        assert_eq!(statuses, vec![PromotionStatus::AtRisk]);
        assert_eq!(incomes, vec![FamilyIncome::Low, FamilyIncome::High]);
    }

    #[test]
    fn database_flag_is_global() {
        let cli = Cli::try_parse_from(["dropout", "summary", "--database", "x.db"]).unwrap();
        assert_eq!(cli.database.as_deref(), Some("x.db"));
    }
}
