use std::io::Write;

use chrono::NaiveDate;
use fleet_rental_analytics::{ingest, report, AnalyticsReport, AnomalyKind};

const SNAPSHOT: &str = "\
Equipment ID,Type,Site ID,Check-Out Date,Planned Check-In Date,Actual Check-In Date,Engine Hours/Day,Idle Hours/Day,Operating Days,Fuel Usage/Day (Liters),Operator ID
EQ1001,Excavator,S001,2024-01-05,2024-03-05,,8,1,20,10,OP100
EQ1002,Excavator,S001,2024-01-20,2024-03-30,,0,1,12,0,OP100
EQ1003,Crane,S001,2024-02-02,2024-02-20,2024-02-21,6,6,15,20,OP200
EQ1004,Excavator,S001,2024-02-11,2024-03-03,,4,6.5,9,30,OP200
EQ1005,Bulldozer,NULL,2023-12-28,2024-01-15,,0,2,10,400,NULL
EQ1006,Loader,S002,2024-02-15,2024-04-01,,,,,,
";

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
}

fn load() -> Vec<fleet_rental_analytics::EquipmentRecord> {
    ingest::parse_records(SNAPSHOT).unwrap()
}

#[tokio::test]
async fn reads_snapshot_from_disk() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(SNAPSHOT.as_bytes()).unwrap();
    let records = ingest::read_snapshot(file.path()).await.unwrap();
    assert_eq!(records.len(), 6);
}

#[tokio::test]
async fn missing_snapshot_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = ingest::read_snapshot(&dir.path().join("absent.csv"))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("failed to read equipment snapshot"));
}

#[test]
fn full_pass_over_snapshot() {
    let records = load();
    let analytics = AnalyticsReport::compute(&records, today());

    assert!(analytics
        .records
        .iter()
        .all(|r| r.efficiency.is_some_and(|e| (0.0..=100.0).contains(&e))));
    assert_eq!(analytics.records[0].efficiency, Some(51.2));

    // OP100: avg engine 4, avg idle 1, no overdue -> 20 - 2 + 50
    let op100 = analytics
        .operator_scores
        .iter()
        .find(|s| s.operator_id == "OP100")
        .unwrap();
    assert_eq!(op100.score, 68.0);
    assert_eq!(op100.rental_count, 2);

    // OP200: EQ1004 is open and was due 2024-03-03 -> not overdue yet
    let op200 = analytics
        .operator_scores
        .iter()
        .find(|s| s.operator_id == "OP200")
        .unwrap();
    assert_eq!(op200.overdue_count, 0);
    assert_eq!(analytics.operator_scores.len(), 2);

    assert_eq!(analytics.forecasts.len(), 2);
    assert_eq!(analytics.forecasts[0].site_id, "S001");
    assert_eq!(analytics.forecasts[0].most_demanded_type, "Excavator");
    assert_eq!(analytics.forecasts[0].confidence_label(), "75.00%");

    let labels: Vec<_> = analytics
        .monthly_efficiency
        .iter()
        .map(|m| m.label.as_str())
        .collect();
    assert_eq!(labels, vec!["Dec 2023", "Jan 2024", "Feb 2024"]);

    assert_eq!(analytics.summary.current_rentals, 5);
    assert_eq!(analytics.summary.overdue_rentals, 1);
}

#[test]
fn anomalies_cover_open_rentals_only() {
    let analytics = AnalyticsReport::compute(&load(), today());

    assert!(analytics.anomalies.iter().all(|a| a.equipment_id != "EQ1003"));

    let for_eq = |id: &str| -> Vec<AnomalyKind> {
        analytics
            .anomalies
            .iter()
            .filter(|a| a.equipment_id == id)
            .map(|a| a.kind)
            .collect()
    };
    assert_eq!(
        for_eq("EQ1004"),
        vec![AnomalyKind::HighIdleHours, AnomalyKind::HighFuelUsage]
    );
    // zero engine hours: no fuel finding despite 400 L/day
    assert_eq!(for_eq("EQ1005"), vec![AnomalyKind::UnassignedEquipment]);
    assert!(for_eq("EQ1006").is_empty());

    let unassigned = analytics
        .anomalies
        .iter()
        .find(|a| a.equipment_id == "EQ1005")
        .unwrap();
    assert_eq!(unassigned.operator_id, "N/A");
}

#[test]
fn markdown_report_and_json_export() {
    let analytics = AnalyticsReport::compute(&load(), today());

    let text = report::build_report(&analytics, None, today());
    assert!(text.contains("## Operator Leaderboard"));
    assert!(text.contains("- S002: Loader (100.00% confidence)"));

    let json = serde_json::to_value(&analytics).unwrap();
    assert_eq!(json["anomalies"][0]["kind"], "High Idle Hours");
    assert_eq!(json["forecasts"][0]["confidence_pct"], 75.0);
    assert_eq!(json["usage_by_site"]["S001"], 4);
    assert_eq!(json["today"], "2024-03-01");
    assert_eq!(json["records"][0]["check_out_date"], "2024-01-05");
    assert!(json["records"][0]["actual_check_in_date"].is_null());
}
