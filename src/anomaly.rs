use crate::models::{Anomaly, AnomalyKind, EquipmentRecord};

pub const IDLE_HOURS_THRESHOLD: f64 = 5.0;
/// Litres burned per engine hour.
pub const FUEL_RATIO_THRESHOLD: f64 = 6.0;

const NO_OPERATOR: &str = "N/A";

/// Flags open rentals that break any of the fixed rules.
///
/// Each rule is evaluated on its own, so one record can yield several
/// findings. Returned rentals are never flagged.
pub fn detect_anomalies(records: &[EquipmentRecord]) -> Vec<Anomaly> {
    let mut anomalies = Vec::new();

    for record in records.iter().filter(|record| record.is_current()) {
        let operator_id = record.operator_id.as_deref().unwrap_or(NO_OPERATOR);
        let mut flag = |kind: AnomalyKind, details: String| {
            anomalies.push(Anomaly {
                equipment_id: record.equipment_id.clone(),
                equipment_type: record.equipment_type.clone().unwrap_or_default(),
                operator_id: operator_id.to_string(),
                kind,
                details,
            });
        };

        if record.idle_hours_per_day > IDLE_HOURS_THRESHOLD {
            flag(
                AnomalyKind::HighIdleHours,
                format!(
                    "Idle time is {} hours/day, exceeding the threshold of {}.",
                    record.idle_hours_per_day, IDLE_HOURS_THRESHOLD
                ),
            );
        }

        if record.site_id.is_none() {
            flag(
                AnomalyKind::UnassignedEquipment,
                "This equipment has been checked out but is not assigned to a site.".to_string(),
            );
        }

        if has_high_fuel_usage(record) {
            flag(
                AnomalyKind::HighFuelUsage,
                format!(
                    "Fuel usage is {:.2} L/day for only {:.2} engine hours. Ratio exceeds {} L/hr.",
                    record.fuel_usage_per_day, record.engine_hours_per_day, FUEL_RATIO_THRESHOLD
                ),
            );
        }
    }

    tracing::debug!(count = anomalies.len(), "anomaly rules evaluated");
    anomalies
}

/// Machines with no engine hours never trip this rule.
fn has_high_fuel_usage(record: &EquipmentRecord) -> bool {
    record.engine_hours_per_day > 0.0
        && record.fuel_usage_per_day / record.engine_hours_per_day > FUEL_RATIO_THRESHOLD
}
