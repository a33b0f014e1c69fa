use chrono::NaiveDate;
use indexmap::IndexMap;

use crate::anomaly::detect_anomalies;
use crate::efficiency::{round2, score};
use crate::models::{
    EquipmentRecord, FleetSummary, IdleDistribution, OperatorOverview, RentalStatus,
    UpcomingReturn,
};
use crate::operators::is_overdue;

/// Days before the planned return at which an open rental shows as due soon.
pub const DUE_SOON_DAYS: i64 = 3;
pub const RETURN_NOTICE_DAYS: i64 = 5;
/// Units of each type the depot is assumed to hold.
pub const DEFAULT_TYPE_CAPACITY: usize = 100;

pub fn rental_status(record: &EquipmentRecord, today: NaiveDate) -> RentalStatus {
    if record.is_historical() {
        let late = match (record.actual_check_in_date, record.planned_check_in_date) {
            (Some(actual), Some(planned)) => actual.is_after(&planned),
            _ => false,
        };
        return if late {
            RentalStatus::ReturnedLate
        } else {
            RentalStatus::Returned
        };
    }

    match record
        .planned_check_in_date
        .and_then(|planned| planned.days_until(today))
    {
        Some(days) if days < 0 => RentalStatus::Overdue,
        Some(days) if days <= DUE_SOON_DAYS => RentalStatus::DueSoon,
        _ => RentalStatus::OnRent,
    }
}

pub fn fleet_summary(records: &[EquipmentRecord], today: NaiveDate) -> FleetSummary {
    let current_rentals = records.iter().filter(|record| record.is_current()).count();
    FleetSummary {
        total_records: records.len(),
        current_rentals,
        historical_rentals: records.len() - current_rentals,
        overdue_rentals: records
            .iter()
            .filter(|record| is_overdue(record, today))
            .count(),
    }
}

pub fn usage_by_type(records: &[EquipmentRecord]) -> IndexMap<String, usize> {
    count_by(records, |record| record.equipment_type.as_deref())
}

pub fn usage_by_site(records: &[EquipmentRecord]) -> IndexMap<String, usize> {
    count_by(records, |record| record.site_id.as_deref())
}

fn count_by<F>(records: &[EquipmentRecord], key: F) -> IndexMap<String, usize>
where
    F: Fn(&EquipmentRecord) -> Option<&str>,
{
    let mut counts: IndexMap<String, usize> = IndexMap::new();
    for record in records {
        if let Some(value) = key(record) {
            *counts.entry(value.to_string()).or_insert(0) += 1;
        }
    }
    counts
}

pub fn idle_distribution(records: &[EquipmentRecord]) -> IdleDistribution {
    let mut distribution = IdleDistribution::default();
    for record in records {
        let idle = record.idle_hours_per_day;
        if idle <= 2.0 {
            distribution.low += 1;
        } else if idle <= 4.0 {
            distribution.medium += 1;
        } else {
            distribution.high += 1;
        }
    }
    distribution
}

/// Units of each type still in the depot, given a fixed per-type capacity.
pub fn availability_by_type(
    records: &[EquipmentRecord],
    capacity: usize,
) -> IndexMap<String, usize> {
    let mut available: IndexMap<String, usize> = IndexMap::new();
    for record in records {
        let Some(equipment_type) = record.equipment_type.as_deref() else {
            continue;
        };
        let slot = available
            .entry(equipment_type.to_string())
            .or_insert(capacity);
        if record.is_current() {
            *slot = slot.saturating_sub(1);
        }
    }
    available
}

/// Open rentals due back within `horizon_days`, soonest first.
pub fn upcoming_returns(
    records: &[EquipmentRecord],
    today: NaiveDate,
    horizon_days: i64,
) -> Vec<UpcomingReturn> {
    let mut returns: Vec<UpcomingReturn> = records
        .iter()
        .filter(|record| record.is_current())
        .filter_map(|record| {
            let planned = record.planned_check_in_date?.date()?;
            let days = (planned - today).num_days();
            (0..=horizon_days).contains(&days).then(|| UpcomingReturn {
                equipment_id: record.equipment_id.clone(),
                equipment_type: record.equipment_type.clone(),
                planned_check_in_date: planned,
                days_until_return: days,
            })
        })
        .collect();

    returns.sort_by_key(|upcoming| upcoming.days_until_return);
    returns
}

/// Totals over the operator's open rentals. Records not yet scored are scored
/// on the fly.
pub fn operator_overview(records: &[EquipmentRecord], operator_id: &str) -> OperatorOverview {
    let current: Vec<EquipmentRecord> = records
        .iter()
        .filter(|record| {
            record.is_current() && record.operator_id.as_deref() == Some(operator_id)
        })
        .cloned()
        .collect();

    let total_rented_hours: f64 = current
        .iter()
        .map(|record| record.engine_hours_per_day * record.operating_days)
        .sum();
    let total_downtime_hours: f64 = current
        .iter()
        .map(|record| record.idle_hours_per_day * record.operating_days)
        .sum();
    let average_efficiency = (!current.is_empty()).then(|| {
        let total: f64 = current
            .iter()
            .map(|record| record.efficiency.unwrap_or_else(|| score(record)))
            .sum();
        round2(total / current.len() as f64)
    });

    OperatorOverview {
        operator_id: operator_id.to_string(),
        current_rentals: current.len(),
        total_rented_hours: round2(total_rented_hours),
        total_downtime_hours: round2(total_downtime_hours),
        average_efficiency,
        anomalies: detect_anomalies(&current),
    }
}
