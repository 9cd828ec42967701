//! The promotion rule.
//!
//! A student is [`PromotionStatus::Promoted`] only when every one of six thresholds holds, and
//! [`PromotionStatus::AtRisk`] otherwise. Family income is part of a submission but is not one of
//! the thresholds.

use crate::models::{PromotionStatus, StudentInput};

/// Satisfaction must be strictly above this.
pub const MIN_SATISFACTION: f64 = 3.0;
/// Attendance (percent) must be strictly above this.
pub const MIN_ATTENDANCE: f64 = 70.0;
pub const MAX_FAILED_COURSES: i32 = 2;
/// Commute in minutes.
pub const MAX_COMMUTE: i32 = 40;
pub const MAX_DISCIPLINARY: i32 = 2;
/// Homework completion (percent) must be strictly above this.
pub const MIN_HOMEWORK: f64 = 80.0;

/// One clause of the rule evaluated against a submission.
#[derive(Debug, Clone, PartialEq)]
pub struct Factor {
    pub name: &'static str,
    pub value: String,
    pub passed: bool,
}

/// Evaluates each of the six clauses for `input`, in a fixed order.
pub fn factors(input: &StudentInput) -> [Factor; 6] {
    [
        Factor {
            name: "School Satisfaction",
            value: format!("{:.1}/5", input.school_satisfaction),
            passed: input.school_satisfaction > MIN_SATISFACTION,
        },
        Factor {
            name: "Attendance Rate",
            value: format!("{:.1}%", input.attendance_rate),
            passed: input.attendance_rate > MIN_ATTENDANCE,
        },
        Factor {
            name: "Failed Courses",
            value: input.failed_courses.to_string(),
            passed: input.failed_courses <= MAX_FAILED_COURSES,
        },
        Factor {
            name: "Commute Time",
            value: format!("{} min", input.commute_time),
            passed: input.commute_time <= MAX_COMMUTE,
        },
        Factor {
            name: "Disciplinary Cases",
            value: input.disciplinary_incidents.to_string(),
            passed: input.disciplinary_incidents <= MAX_DISCIPLINARY,
        },
        Factor {
            name: "Homework Completion",
            value: format!("{:.1}%", input.homework_completion),
            passed: input.homework_completion > MIN_HOMEWORK,
        },
    ]
}

/// Classifies a submission.
pub fn classify(input: &StudentInput) -> PromotionStatus {
    if factors(input).iter().all(|factor| factor.passed) {
        PromotionStatus::Promoted
    } else {
        PromotionStatus::AtRisk
    }
}

/// Human-readable descriptions of the six criteria, in the same order as [`factors`].
pub fn criteria() -> [String; 6] {
    [
        format!("School Satisfaction > {MIN_SATISFACTION} (out of 5)"),
        format!("Attendance Rate > {MIN_ATTENDANCE}%"),
        format!("Failed Courses <= {MAX_FAILED_COURSES}"),
        format!("Commute Time <= {MAX_COMMUTE} minutes"),
        format!("Disciplinary Incidents <= {MAX_DISCIPLINARY}"),
        format!("Homework Completion > {MIN_HOMEWORK}%"),
    ]
}
