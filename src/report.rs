use std::fmt::Write;

use chrono::NaiveDate;

use crate::engine::AnalyticsReport;
use crate::operators::leaderboard;

pub fn build_report(report: &AnalyticsReport, scope: Option<&str>, today: NaiveDate) -> String {
    let mut output = String::new();
    let scope_label = scope.unwrap_or("entire fleet");

    let _ = writeln!(output, "# Equipment Rental Analytics Report");
    let _ = writeln!(output, "Generated for {} on {}", scope_label, today);
    let _ = writeln!(output);
    let _ = writeln!(output, "## Fleet Overview");

    if report.is_empty() {
        let _ = writeln!(output, "No rental records in this snapshot.");
        return output;
    }

    let summary = &report.summary;
    let _ = writeln!(output, "- Rental records: {}", summary.total_records);
    let _ = writeln!(output, "- Currently rented: {}", summary.current_rentals);
    let _ = writeln!(output, "- Returned: {}", summary.historical_rentals);
    let _ = writeln!(output, "- Overdue: {}", summary.overdue_rentals);

    let _ = writeln!(output);
    let _ = writeln!(output, "## Usage Per Site");

    if report.usage_by_site.is_empty() {
        let _ = writeln!(output, "No rentals assigned to a site.");
    } else {
        for (site_id, count) in &report.usage_by_site {
            let _ = writeln!(output, "- {}: {} rentals", site_id, count);
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Operator Leaderboard");

    if report.operator_scores.is_empty() {
        let _ = writeln!(output, "No assigned operators in this snapshot.");
    } else {
        for score in leaderboard(&report.operator_scores).iter().take(10) {
            let _ = writeln!(
                output,
                "- {} score {:.2} across {} rentals (avg engine {:.2}h, avg idle {:.2}h, {} overdue)",
                score.operator_id,
                score.score,
                score.rental_count,
                score.avg_engine_hours,
                score.avg_idle_hours,
                score.overdue_count
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Demand Forecast");

    if report.forecasts.is_empty() {
        let _ = writeln!(output, "No site demand recorded.");
    } else {
        for forecast in &report.forecasts {
            let _ = writeln!(
                output,
                "- {}: {} ({} confidence)",
                forecast.site_id,
                forecast.most_demanded_type,
                forecast.confidence_label()
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Anomalies");

    if report.anomalies.is_empty() {
        let _ = writeln!(output, "No anomalies detected on open rentals.");
    } else {
        for anomaly in &report.anomalies {
            let _ = writeln!(
                output,
                "- {} {} ({}, operator {}): {}",
                anomaly.kind,
                anomaly.equipment_id,
                anomaly.equipment_type,
                anomaly.operator_id,
                anomaly.details
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Monthly Efficiency");

    if report.monthly_efficiency.is_empty() {
        let _ = writeln!(output, "No dated check-outs in this snapshot.");
    } else {
        for month in &report.monthly_efficiency {
            let _ = writeln!(
                output,
                "- {}: {:.2} across {} rentals",
                month.label, month.average_efficiency, month.record_count
            );
        }
    }

    output
}
