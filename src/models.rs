use std::fmt;

use serde::Serialize;

use crate::dates::{MonthKey, RentalDate};

/// One rental event from the fleet snapshot, already normalized.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EquipmentRecord {
    pub equipment_id: String,
    pub equipment_type: Option<String>,
    pub site_id: Option<String>,
    pub check_out_date: Option<RentalDate>,
    pub planned_check_in_date: Option<RentalDate>,
    pub actual_check_in_date: Option<RentalDate>,
    pub engine_hours_per_day: f64,
    pub idle_hours_per_day: f64,
    pub operating_days: f64,
    pub fuel_usage_per_day: f64,
    pub operator_id: Option<String>,
    /// Filled in by the efficiency scorer.
    pub efficiency: Option<f64>,
}

impl EquipmentRecord {
    /// Still checked out: no actual check-in recorded.
    pub fn is_current(&self) -> bool {
        self.actual_check_in_date.is_none()
    }

    pub fn is_historical(&self) -> bool {
        !self.is_current()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperatorScore {
    pub operator_id: String,
    pub rental_count: usize,
    pub avg_engine_hours: f64,
    pub avg_idle_hours: f64,
    pub overdue_count: usize,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DemandForecast {
    pub site_id: String,
    pub most_demanded_type: String,
    pub most_demanded_count: usize,
    pub site_total: usize,
    /// Share of the site's typed records, as a percentage rounded to 2 places.
    pub confidence_pct: f64,
    pub type_counts: indexmap::IndexMap<String, usize>,
}

impl DemandForecast {
    pub fn confidence_label(&self) -> String {
        format!("{:.2}%", self.confidence_pct)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AnomalyKind {
    #[serde(rename = "High Idle Hours")]
    HighIdleHours,
    #[serde(rename = "Unassigned Equipment")]
    UnassignedEquipment,
    #[serde(rename = "High Fuel Usage")]
    HighFuelUsage,
}

impl fmt::Display for AnomalyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::HighIdleHours => "High Idle Hours",
            Self::UnassignedEquipment => "Unassigned Equipment",
            Self::HighFuelUsage => "High Fuel Usage",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Anomaly {
    pub equipment_id: String,
    pub equipment_type: String,
    /// Operator id, or `N/A` when the record has none.
    pub operator_id: String,
    pub kind: AnomalyKind,
    pub details: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyEfficiency {
    pub month: MonthKey,
    pub label: String,
    pub record_count: usize,
    pub average_efficiency: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RentalStatus {
    OnRent,
    DueSoon,
    Overdue,
    Returned,
    ReturnedLate,
}

impl fmt::Display for RentalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::OnRent => "On Rent",
            Self::DueSoon => "Due Soon",
            Self::Overdue => "Overdue",
            Self::Returned => "Returned",
            Self::ReturnedLate => "Returned Late",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FleetSummary {
    pub total_records: usize,
    pub current_rentals: usize,
    pub historical_rentals: usize,
    pub overdue_rentals: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IdleDistribution {
    pub low: usize,
    pub medium: usize,
    pub high: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpcomingReturn {
    pub equipment_id: String,
    pub equipment_type: Option<String>,
    pub planned_check_in_date: chrono::NaiveDate,
    pub days_until_return: i64,
}

/// One operator's open rentals, as the operator dashboard totals them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperatorOverview {
    pub operator_id: String,
    pub current_rentals: usize,
    /// Engine hours per day times operating days, summed.
    pub total_rented_hours: f64,
    /// Idle hours per day times operating days, summed.
    pub total_downtime_hours: f64,
    /// `None` when the operator has nothing checked out.
    pub average_efficiency: Option<f64>,
    pub anomalies: Vec<Anomaly>,
}
