use crate::models::{PromotionStatus, StudentRecord};
use crate::rule::{self, Factor};
use crate::stats::{
    self, ATTENDANCE_BANDS, GridCell, HistogramBin, Overview, SATISFACTION_BANDS, ScatterGrid,
    StatusMeans,
};
use tabled::builder::Builder;
use tabled::{Table, Tabled, settings::Style};

/// Width of the longest bar in the distribution charts.
const BAR_WIDTH: usize = 30;

fn bar(count: usize, max: usize) -> String {
    if max == 0 {
        return String::new();
    }
    "█".repeat(count * BAR_WIDTH / max)
}

fn percent(count: usize, total: usize) -> String {
    if total == 0 {
        return "-".to_string();
    }
    format!("{:.1}%", count as f64 * 100.0 / total as f64)
}

fn optional(value: Option<f64>, suffix: &str) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.1}{suffix}"))
}

/// Prints the result of a prediction followed by the factors that contributed to it.
pub fn show_prediction(record: &StudentRecord, factors: &[Factor]) {
    match record.promotion_status {
        PromotionStatus::Promoted => println!(
            "Student {} is predicted to be {}",
            record.student_id, record.promotion_status
        ),
        PromotionStatus::AtRisk => println!(
            "Student {} is {}",
            record.student_id, record.promotion_status
        ),
    }

    #[derive(Tabled)]
    struct FactorRow {
        #[tabled(rename = "Factor")]
        name: &'static str,
        #[tabled(rename = "Value")]
        value: String,
        #[tabled(rename = "Met")]
        met: &'static str,
    }

    let rows = factors.iter().map(|factor| FactorRow {
        name: factor.name,
        value: factor.value.clone(),
        met: if factor.passed { "yes" } else { "no" },
    });

    let mut table = Table::new(rows);
    table.with(Style::modern());
    println!("Contributing factors:\n{table}");
}

/// Pretty prints the given records.
pub fn show_records(records: &[&StudentRecord]) {
    if records.is_empty() {
        println!("No student records found. Add predictions to see data here.");
        return;
    }

    let mut table = Table::new(records.iter().map(|&record| record.clone()));
    table.with(Style::modern());
    println!("Students ({}):\n{table}", records.len());
}

/// Prints the headline numbers.
pub fn show_overview(overview: &Overview) {
    #[derive(Tabled)]
    struct Metric {
        #[tabled(rename = "Metric")]
        name: &'static str,
        #[tabled(rename = "Value")]
        value: String,
    }

    let metrics = [
        Metric {
            name: "Total Students",
            value: overview.total.to_string(),
        },
        Metric {
            name: "Promoted",
            value: overview.promoted.to_string(),
        },
        Metric {
            name: "At Risk",
            value: overview.at_risk.to_string(),
        },
        Metric {
            name: "Avg Attendance",
            value: optional(overview.mean_attendance, "%"),
        },
        Metric {
            name: "Avg Satisfaction",
            value: optional(overview.mean_satisfaction, "/5"),
        },
    ];

    let mut table = Table::new(metrics);
    table.with(Style::modern());
    println!("{table}");
}

/// Prints every analytics view over `records`.
pub fn show_analytics(records: &[StudentRecord]) {
    if records.is_empty() {
        println!("No data available for analytics. Add student predictions first.");
        return;
    }

    #[derive(Tabled)]
    struct Share {
        #[tabled(rename = "Group")]
        label: String,
        #[tabled(rename = "Count")]
        count: usize,
        #[tabled(rename = "Share")]
        share: String,
        #[tabled(rename = "")]
        bar: String,
    }

    let total = records.len();
    let shares = |counts: Vec<(String, usize)>| {
        let max = counts.iter().map(|(_, c)| *c).max().unwrap_or(0);
        let rows = counts.into_iter().map(|(label, count)| Share {
            label,
            count,
            share: percent(count, total),
            bar: bar(count, max),
        });
        let mut table = Table::new(rows);
        table.with(Style::modern());
        table
    };

    let statuses: Vec<_> = stats::status_counts(records)
        .into_iter()
        .map(|(status, count)| (status.to_string(), count))
        .collect();
    println!("Promotion status distribution:\n{}", shares(statuses));

    let incomes: Vec<_> = stats::income_counts(records)
        .into_iter()
        .map(|(income, count)| (income.to_string(), count))
        .collect();
    println!("Income level distribution:\n{}", shares(incomes));

    show_scatter_grid(&stats::scatter_grid(&stats::attendance_vs_satisfaction(records)));
    show_histogram(&stats::failed_courses_histogram(records));
    show_means(&stats::means_by_status(records));
}

fn cell_label(cell: &GridCell) -> String {
    if cell.promoted == 0 && cell.at_risk == 0 {
        return String::new();
    }
    format!("P:{} R:{}", cell.promoted, cell.at_risk)
}

/// Prints attendance against satisfaction as a grid of per-status counts, highest satisfaction
/// first.
fn show_scatter_grid(grid: &ScatterGrid) {
    let mut builder = Builder::default();

    let mut header = vec!["Satisfaction \\ Attendance".to_string()];
    header.extend((0..ATTENDANCE_BANDS).map(|band| format!("{}-{}%", band * 20, (band + 1) * 20)));
    builder.push_record(header);

    for band in (0..SATISFACTION_BANDS).rev() {
        let mut row = vec![format!("{}-{}", band + 1, band + 2)];
        row.extend(grid[band].iter().map(cell_label));
        builder.push_record(row);
    }

    let mut table = builder.build();
    table.with(Style::modern());
    println!("Attendance vs satisfaction (P = promoted, R = at risk):\n{table}");
}

fn show_histogram(bins: &[HistogramBin]) {
    #[derive(Tabled)]
    struct Row {
        #[tabled(rename = "Failed Courses")]
        failed_courses: i32,
        #[tabled(rename = "Promoted")]
        promoted: usize,
        #[tabled(rename = "At Risk")]
        at_risk: usize,
    }

    let rows = bins.iter().map(|bin| Row {
        failed_courses: bin.failed_courses,
        promoted: bin.promoted,
        at_risk: bin.at_risk,
    });

    let mut table = Table::new(rows);
    table.with(Style::modern());
    println!("Failed courses distribution:\n{table}");
}

fn show_means(means: &[StatusMeans]) {
    #[derive(Tabled)]
    struct Row {
        #[tabled(rename = "Status")]
        status: PromotionStatus,
        #[tabled(rename = "Students")]
        count: usize,
        #[tabled(rename = "Satisfaction")]
        satisfaction: String,
        #[tabled(rename = "Attendance %")]
        attendance: String,
        #[tabled(rename = "Failed")]
        failed: String,
        #[tabled(rename = "Commute")]
        commute: String,
        #[tabled(rename = "Disciplinary")]
        disciplinary: String,
        #[tabled(rename = "Homework %")]
        homework: String,
    }

    let rows = means.iter().map(|m| Row {
        status: m.status,
        count: m.count,
        satisfaction: format!("{:.2}", m.school_satisfaction),
        attendance: format!("{:.2}", m.attendance_rate),
        failed: format!("{:.2}", m.failed_courses),
        commute: format!("{:.2}", m.commute_time),
        disciplinary: format!("{:.2}", m.disciplinary_incidents),
        homework: format!("{:.2}", m.homework_completion),
    });

    let mut table = Table::new(rows);
    table.with(Style::modern());
    println!("Average metrics by status:\n{table}");
}

/// Prints the criteria a student must meet to be promoted.
pub fn show_criteria() {
    println!("A student is considered Promoted if they meet ALL of the following criteria:");
    for criterion in rule::criteria() {
        println!("  - {criterion}");
    }
    println!("Otherwise the student is considered At Risk of Dropout.");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bars_scale_to_the_largest_count() {
        assert_eq!(bar(10, 10).chars().count(), BAR_WIDTH);
        assert_eq!(bar(5, 10).chars().count(), BAR_WIDTH / 2);
        assert_eq!(bar(0, 10), "");
        assert_eq!(bar(0, 0), "");
    }

    #[test]
    fn percentages_handle_empty_totals() {
        assert_eq!(percent(1, 4), "25.0%");
        assert_eq!(percent(0, 0), "-");
    }

    #[test]
    fn empty_grid_cells_render_blank() {
        assert_eq!(cell_label(&GridCell::default()), "");
        assert_eq!(cell_label(&GridCell { promoted: 2, at_risk: 1 }), "P:2 R:1");
    }

    #[test]
    fn missing_means_render_as_a_dash() {
        assert_eq!(optional(None, "%"), "-");
        assert_eq!(optional(Some(72.26), "%"), "72.3%");
    }
}
