//! Aggregate views over the stored records.
//!
//! Everything here is recomputed from the full record set on each call.

use crate::models::{FamilyIncome, PromotionStatus, StudentRecord};
use std::collections::BTreeMap;

/// The headline numbers shown by the `summary` command.
#[derive(Debug, Clone, PartialEq)]
pub struct Overview {
    pub total: usize,
    pub promoted: usize,
    pub at_risk: usize,
    /// `None` when there are no records.
    pub mean_attendance: Option<f64>,
    pub mean_satisfaction: Option<f64>,
}

/// The mean of every numeric field over the records sharing a status.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusMeans {
    pub status: PromotionStatus,
    pub count: usize,
    pub school_satisfaction: f64,
    pub attendance_rate: f64,
    pub failed_courses: f64,
    pub commute_time: f64,
    pub disciplinary_incidents: f64,
    pub homework_completion: f64,
}

/// How many students of each status failed a given number of courses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistogramBin {
    pub failed_courses: i32,
    pub promoted: usize,
    pub at_risk: usize,
}

fn mean<I: IntoIterator<Item = f64>>(values: I) -> Option<f64> {
    let (sum, n) = values
        .into_iter()
        .fold((0.0, 0usize), |(sum, n), value| (sum + value, n + 1));

    (n > 0).then(|| sum / n as f64)
}

pub fn overview(records: &[StudentRecord]) -> Overview {
    let counts = status_counts(records);

    Overview {
        total: records.len(),
        promoted: counts[&PromotionStatus::Promoted],
        at_risk: counts[&PromotionStatus::AtRisk],
        mean_attendance: mean(records.iter().map(|r| r.attendance_rate)),
        mean_satisfaction: mean(records.iter().map(|r| r.school_satisfaction)),
    }
}

/// Counts records per status. Both statuses are always present.
pub fn status_counts(records: &[StudentRecord]) -> BTreeMap<PromotionStatus, usize> {
    let mut counts: BTreeMap<_, _> = PromotionStatus::ALL.into_iter().map(|s| (s, 0)).collect();

    for record in records {
        *counts.entry(record.promotion_status).or_insert(0) += 1;
    }

    counts
}

/// Counts records per income level. All income levels are always present.
pub fn income_counts(records: &[StudentRecord]) -> BTreeMap<FamilyIncome, usize> {
    let mut counts: BTreeMap<_, _> = FamilyIncome::ALL.into_iter().map(|i| (i, 0)).collect();

    for record in records {
        *counts.entry(record.family_income).or_insert(0) += 1;
    }

    counts
}

/// Groups records by status and averages each numeric field. Statuses with no records are left
/// out.
pub fn means_by_status(records: &[StudentRecord]) -> Vec<StatusMeans> {
    PromotionStatus::ALL
        .into_iter()
        .filter_map(|status| {
            let group: Vec<&StudentRecord> = records
                .iter()
                .filter(|r| r.promotion_status == status)
                .collect();

            let field_mean = |field: fn(&StudentRecord) -> f64| mean(group.iter().map(|r| field(r)));

            Some(StatusMeans {
                status,
                count: group.len(),
                school_satisfaction: field_mean(|r| r.school_satisfaction)?,
                attendance_rate: field_mean(|r| r.attendance_rate)?,
                failed_courses: field_mean(|r| r.failed_courses as f64)?,
                commute_time: field_mean(|r| r.commute_time as f64)?,
                disciplinary_incidents: field_mean(|r| r.disciplinary_incidents as f64)?,
                homework_completion: field_mean(|r| r.homework_completion)?,
            })
        })
        .collect()
}

/// Distribution of failed courses, split by status, ordered by the number of failed courses.
pub fn failed_courses_histogram(records: &[StudentRecord]) -> Vec<HistogramBin> {
    let mut bins: BTreeMap<i32, HistogramBin> = BTreeMap::new();

    for record in records {
        let bin = bins
            .entry(record.failed_courses)
            .or_insert_with(|| HistogramBin {
                failed_courses: record.failed_courses,
                promoted: 0,
                at_risk: 0,
            });

        match record.promotion_status {
            PromotionStatus::Promoted => bin.promoted += 1,
            PromotionStatus::AtRisk => bin.at_risk += 1,
        }
    }

    bins.into_values().collect()
}

/// One student on the attendance vs. satisfaction plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScatterPoint {
    pub student_id: i32,
    pub attendance_rate: f64,
    pub school_satisfaction: f64,
}

/// Attendance bands are 20 percentage points wide.
pub const ATTENDANCE_BANDS: usize = 5;
/// Satisfaction bands are one point wide, starting at 1.
pub const SATISFACTION_BANDS: usize = 4;

/// Per-status counts for one attendance × satisfaction band.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GridCell {
    pub promoted: usize,
    pub at_risk: usize,
}

/// Rows are satisfaction bands (lowest first), columns attendance bands (lowest first).
pub type ScatterGrid = [[GridCell; ATTENDANCE_BANDS]; SATISFACTION_BANDS];

/// Attendance against satisfaction for every record, grouped by status. Statuses with no
/// records map to an empty list.
pub fn attendance_vs_satisfaction(
    records: &[StudentRecord],
) -> BTreeMap<PromotionStatus, Vec<ScatterPoint>> {
    let mut points: BTreeMap<_, _> = PromotionStatus::ALL
        .into_iter()
        .map(|s| (s, Vec::new()))
        .collect();

    for record in records {
        points
            .entry(record.promotion_status)
            .or_insert_with(Vec::new)
            .push(ScatterPoint {
                student_id: record.student_id,
                attendance_rate: record.attendance_rate,
                school_satisfaction: record.school_satisfaction,
            });
    }

    points
}

/// The band index of an attendance rate. 100% falls in the top band.
pub fn attendance_band(rate: f64) -> usize {
    ((rate / 20.0) as usize).min(ATTENDANCE_BANDS - 1)
}

/// The band index of a satisfaction score. 5 falls in the top band.
pub fn satisfaction_band(score: f64) -> usize {
    ((score - 1.0) as usize).min(SATISFACTION_BANDS - 1)
}

/// Buckets the scatter points into a coarse grid of per-status counts.
pub fn scatter_grid(points: &BTreeMap<PromotionStatus, Vec<ScatterPoint>>) -> ScatterGrid {
    let mut grid = [[GridCell::default(); ATTENDANCE_BANDS]; SATISFACTION_BANDS];

    for (status, group) in points {
        for point in group {
            let cell = &mut grid[satisfaction_band(point.school_satisfaction)]
                [attendance_band(point.attendance_rate)];

            match status {
                PromotionStatus::Promoted => cell.promoted += 1,
                PromotionStatus::AtRisk => cell.at_risk += 1,
            }
        }
    }

    grid
}

/// Keeps the records whose status is in `statuses` and whose income is in `incomes`. An empty
/// filter matches everything.
pub fn filter<'a>(
    records: &'a [StudentRecord],
    statuses: &[PromotionStatus],
    incomes: &[FamilyIncome],
) -> Vec<&'a StudentRecord> {
    records
        .iter()
        .filter(|r| statuses.is_empty() || statuses.contains(&r.promotion_status))
        .filter(|r| incomes.is_empty() || incomes.contains(&r.family_income))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    fn record(
        id: i32,
        attendance: f64,
        satisfaction: f64,
        failed: i32,
        income: FamilyIncome,
        status: PromotionStatus,
    ) -> StudentRecord {
        StudentRecord {
            student_id: id,
            school_satisfaction: satisfaction,
            attendance_rate: attendance,
            failed_courses: failed,
            commute_time: 20,
            disciplinary_incidents: 0,
            homework_completion: 90.0,
            family_income: income,
            promotion_status: status,
            prediction_date: DateTime::UNIX_EPOCH.naive_utc(),
        }
    }

    fn sample() -> Vec<StudentRecord> {
        use FamilyIncome::*;
        use PromotionStatus::*;

        vec![
            record(1, 90.0, 4.0, 0, Low, Promoted),
            record(2, 80.0, 5.0, 1, Low, Promoted),
            record(3, 50.0, 2.0, 4, High, AtRisk),
            record(4, 60.0, 3.0, 0, Medium, AtRisk),
        ]
    }

    #[test]
    fn overview_of_sample() {
        let overview = overview(&sample());

        assert_eq!(overview.total, 4);
        assert_eq!(overview.promoted, 2);
        assert_eq!(overview.at_risk, 2);
        assert_eq!(overview.mean_attendance, Some(70.0));
        assert_eq!(overview.mean_satisfaction, Some(3.5));
    }

    #[test]
    fn overview_of_nothing() {
        let overview = overview(&[]);

        assert_eq!(overview.total, 0);
        assert_eq!(overview.promoted, 0);
        assert_eq!(overview.mean_attendance, None);
        assert_eq!(overview.mean_satisfaction, None);
    }

    #[test]
    fn counts_include_empty_groups() {
        let records = sample();

        let incomes = income_counts(&records);
        assert_eq!(incomes[&FamilyIncome::Low], 2);
        assert_eq!(incomes[&FamilyIncome::Medium], 1);
        assert_eq!(incomes[&FamilyIncome::High], 1);

        let statuses = status_counts(&records[..2]);
        assert_eq!(statuses[&PromotionStatus::Promoted], 2);
        assert_eq!(statuses[&PromotionStatus::AtRisk], 0);
    }

    #[test]
    fn grouped_means() {
        let means = means_by_status(&sample());
        assert_eq!(means.len(), 2);

        let promoted = &means[0];
        assert_eq!(promoted.status, PromotionStatus::Promoted);
        assert_eq!(promoted.count, 2);
        assert_eq!(promoted.attendance_rate, 85.0);
        assert_eq!(promoted.school_satisfaction, 4.5);
        assert_eq!(promoted.failed_courses, 0.5);

        let at_risk = &means[1];
        assert_eq!(at_risk.status, PromotionStatus::AtRisk);
        assert_eq!(at_risk.failed_courses, 2.0);
        assert_eq!(at_risk.homework_completion, 90.0);
    }

    #[test]
    fn grouped_means_skip_missing_statuses() {
        let records = sample();
        let means = means_by_status(&records[2..]);

        assert_eq!(means.len(), 1);
        assert_eq!(means[0].status, PromotionStatus::AtRisk);
        assert!(means_by_status(&[]).is_empty());
    }

    #[test]
    fn histogram_is_split_by_status() {
        let histogram = failed_courses_histogram(&sample());

        assert_eq!(
            histogram,
            vec![
                HistogramBin { failed_courses: 0, promoted: 1, at_risk: 1 },
                HistogramBin { failed_courses: 1, promoted: 1, at_risk: 0 },
                HistogramBin { failed_courses: 4, promoted: 0, at_risk: 1 },
            ]
        );
    }

    #[test]
    fn scatter_points_are_grouped_by_status() {
        let points = attendance_vs_satisfaction(&sample());

        let at_risk: Vec<i32> = points[&PromotionStatus::AtRisk]
            .iter()
            .map(|p| p.student_id)
            .collect();
        assert_eq!(at_risk, vec![3, 4]);

        let promoted = &points[&PromotionStatus::Promoted];
        assert_eq!(
            promoted[0],
            ScatterPoint {
                student_id: 1,
                attendance_rate: 90.0,
                school_satisfaction: 4.0,
            }
        );
        assert_eq!(promoted.len(), 2);

        let empty = attendance_vs_satisfaction(&[]);
        assert!(empty.values().all(Vec::is_empty));
        assert_eq!(empty.len(), 2);
    }

    #[test]
    fn bands_clamp_the_top_of_each_range() {
        assert_eq!(attendance_band(0.0), 0);
        assert_eq!(attendance_band(19.9), 0);
        assert_eq!(attendance_band(20.0), 1);
        assert_eq!(attendance_band(100.0), ATTENDANCE_BANDS - 1);

        assert_eq!(satisfaction_band(1.0), 0);
        assert_eq!(satisfaction_band(2.5), 1);
        assert_eq!(satisfaction_band(4.0), 3);
        assert_eq!(satisfaction_band(5.0), SATISFACTION_BANDS - 1);
    }

    #[test]
    fn scatter_grid_counts_each_status() {
        let grid = scatter_grid(&attendance_vs_satisfaction(&sample()));

        // Students 1 (90%, 4.0) and 2 (80%, 5.0) share the top-right cell.
        assert_eq!(grid[3][4], GridCell { promoted: 2, at_risk: 0 });
        // Student 3 (50%, 2.0) and student 4 (60%, 3.0).
        assert_eq!(grid[1][2], GridCell { promoted: 0, at_risk: 1 });
        assert_eq!(grid[2][3], GridCell { promoted: 0, at_risk: 1 });

        let total: usize = grid
            .iter()
            .flatten()
            .map(|cell| cell.promoted + cell.at_risk)
            .sum();
        assert_eq!(total, 4);
    }

    #[test]
    fn filters_combine() {
        let records = sample();

        assert_eq!(filter(&records, &[], &[]).len(), 4);

        let at_risk = filter(&records, &[PromotionStatus::AtRisk], &[]);
        assert_eq!(at_risk.iter().map(|r| r.student_id).collect::<Vec<_>>(), vec![3, 4]);

        let low_promoted = filter(&records, &[PromotionStatus::Promoted], &[FamilyIncome::Low]);
        assert_eq!(low_promoted.len(), 2);

        let none = filter(&records, &[PromotionStatus::Promoted], &[FamilyIncome::High]);
        assert!(none.is_empty());
    }
}
