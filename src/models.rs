use crate::error::ParseLabelError;
use crate::rule;
use crate::schema::students;
use chrono::NaiveDateTime;
use clap::{Args, ValueEnum};
use diesel::backend::Backend;
use diesel::deserialize::{self, FromSql, FromSqlRow};
use diesel::expression::AsExpression;
use diesel::prelude::*;
use diesel::serialize::{self, IsNull, Output, ToSql};
use diesel::sql_types::Text;
use diesel::sqlite::Sqlite;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tabled::Tabled;

/// The outcome of the promotion rule.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    AsExpression,
    FromSqlRow,
    Serialize,
    Deserialize,
    ValueEnum,
)]
#[diesel(sql_type = Text)]
pub enum PromotionStatus {
    #[value(name = "promoted")]
    Promoted,
    #[serde(rename = "At Risk of Dropout")]
    #[value(name = "at-risk")]
    AtRisk,
}

impl PromotionStatus {
    pub const ALL: [PromotionStatus; 2] = [PromotionStatus::Promoted, PromotionStatus::AtRisk];

    /// The label stored in the database and shown to the user.
    pub fn as_str(&self) -> &'static str {
        match self {
            PromotionStatus::Promoted => "Promoted",
            PromotionStatus::AtRisk => "At Risk of Dropout",
        }
    }
}

impl fmt::Display for PromotionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PromotionStatus {
    type Err = ParseLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PromotionStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| ParseLabelError {
                kind: "promotion status",
                label: s.to_string(),
            })
    }
}

impl ToSql<Text, Sqlite> for PromotionStatus {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Sqlite>) -> serialize::Result {
        out.set_value(self.as_str());
        Ok(IsNull::No)
    }
}

impl FromSql<Text, Sqlite> for PromotionStatus {
    fn from_sql(value: <Sqlite as Backend>::RawValue<'_>) -> deserialize::Result<Self> {
        let label = <String as FromSql<Text, Sqlite>>::from_sql(value)?;
        Ok(label.parse()?)
    }
}

/// The self-reported family income bracket of a student.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    AsExpression,
    FromSqlRow,
    Serialize,
    Deserialize,
    ValueEnum,
)]
#[diesel(sql_type = Text)]
#[serde(rename_all = "lowercase")]
pub enum FamilyIncome {
    #[default]
    Low,
    Medium,
    High,
}

impl FamilyIncome {
    pub const ALL: [FamilyIncome; 3] = [FamilyIncome::Low, FamilyIncome::Medium, FamilyIncome::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            FamilyIncome::Low => "low",
            FamilyIncome::Medium => "medium",
            FamilyIncome::High => "high",
        }
    }
}

impl fmt::Display for FamilyIncome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FamilyIncome {
    type Err = ParseLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FamilyIncome::ALL
            .into_iter()
            .find(|income| income.as_str() == s)
            .ok_or_else(|| ParseLabelError {
                kind: "family income",
                label: s.to_string(),
            })
    }
}

impl ToSql<Text, Sqlite> for FamilyIncome {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Sqlite>) -> serialize::Result {
        out.set_value(self.as_str());
        Ok(IsNull::No)
    }
}

impl FromSql<Text, Sqlite> for FamilyIncome {
    fn from_sql(value: <Sqlite as Backend>::RawValue<'_>) -> deserialize::Result<Self> {
        let label = <String as FromSql<Text, Sqlite>>::from_sql(value)?;
        Ok(label.parse()?)
    }
}

/// The metrics submitted for a single student.
///
/// This is both the `predict` command's argument group and the row format read by CSV imports.
/// Ranges are enforced by the argument parser; rows imported from CSV are checked by the table's
/// constraints instead.
#[derive(Args, Debug, Clone, PartialEq, Deserialize)]
pub struct StudentInput {
    /// The student's ID. Submitting an existing ID replaces that student's record.
    #[arg(long = "id", value_parser = clap::value_parser!(i32).range(1..))]
    pub student_id: i32,

    /// School satisfaction, from 1 to 5.
    #[arg(long = "satisfaction", default_value_t = 3.0, value_parser = parse_satisfaction)]
    pub school_satisfaction: f64,

    /// Attendance rate as a percentage.
    #[arg(long = "attendance", default_value_t = 75.0, value_parser = parse_percentage)]
    pub attendance_rate: f64,

    /// Number of failed courses, from 0 to 10.
    #[arg(long, default_value_t = 0, value_parser = clap::value_parser!(i32).range(0..=10))]
    pub failed_courses: i32,

    /// Commute time in minutes, from 1 to 120.
    #[arg(long = "commute", default_value_t = 30, value_parser = clap::value_parser!(i32).range(1..=120))]
    pub commute_time: i32,

    /// Number of disciplinary incidents, from 0 to 10.
    #[arg(long = "disciplinary", default_value_t = 0, value_parser = clap::value_parser!(i32).range(0..=10))]
    pub disciplinary_incidents: i32,

    /// Homework completion as a percentage.
    #[arg(long = "homework", default_value_t = 85.0, value_parser = parse_percentage)]
    pub homework_completion: f64,

    /// Family income level.
    #[arg(long = "income", value_enum, default_value_t = FamilyIncome::Low)]
    pub family_income: FamilyIncome,
}

fn parse_bounded(s: &str, min: f64, max: f64) -> Result<f64, String> {
    let value: f64 = s.parse().map_err(|_| format!("'{s}' is not a number"))?;
    if (min..=max).contains(&value) {
        Ok(value)
    } else {
        Err(format!("{value} is not in {min}..={max}"))
    }
}

fn parse_satisfaction(s: &str) -> Result<f64, String> {
    parse_bounded(s, 1.0, 5.0)
}

fn parse_percentage(s: &str) -> Result<f64, String> {
    parse_bounded(s, 0.0, 100.0)
}

/// A stored student record, as read from and written to the `students` table.
#[derive(Queryable, Selectable, Insertable, Tabled, Serialize, Debug, Clone, PartialEq)]
#[diesel(table_name = students)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct StudentRecord {
    #[tabled(rename = "ID")]
    pub student_id: i32,
    #[tabled(rename = "Satisfaction")]
    pub school_satisfaction: f64,
    #[tabled(rename = "Attendance %")]
    pub attendance_rate: f64,
    #[tabled(rename = "Failed")]
    pub failed_courses: i32,
    #[tabled(rename = "Commute")]
    pub commute_time: i32,
    #[tabled(rename = "Disciplinary")]
    pub disciplinary_incidents: i32,
    #[tabled(rename = "Homework %")]
    pub homework_completion: f64,
    #[tabled(rename = "Income")]
    pub family_income: FamilyIncome,
    #[tabled(rename = "Status")]
    pub promotion_status: PromotionStatus,
    #[tabled(rename = "Predicted At")]
    pub prediction_date: NaiveDateTime,
}

impl StudentRecord {
    /// Builds the record for a submission, running the promotion rule over its metrics.
    pub fn evaluate(input: &StudentInput, prediction_date: NaiveDateTime) -> Self {
        Self {
            student_id: input.student_id,
            school_satisfaction: input.school_satisfaction,
            attendance_rate: input.attendance_rate,
            failed_courses: input.failed_courses,
            commute_time: input.commute_time,
            disciplinary_incidents: input.disciplinary_incidents,
            homework_completion: input.homework_completion,
            family_income: input.family_income,
            promotion_status: rule::classify(input),
            prediction_date,
        }
    }
}
