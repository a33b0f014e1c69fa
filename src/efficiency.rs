use crate::models::EquipmentRecord;

const ENGINE_HOURS_WEIGHT: f64 = 0.5;
const IDLE_HOURS_WEIGHT: f64 = -0.8;
const FUEL_USAGE_WEIGHT: f64 = -0.2;
const BIAS: f64 = 50.0;

pub fn score(record: &EquipmentRecord) -> f64 {
    let raw = ENGINE_HOURS_WEIGHT * record.engine_hours_per_day
        + IDLE_HOURS_WEIGHT * record.idle_hours_per_day
        + FUEL_USAGE_WEIGHT * record.fuel_usage_per_day
        + BIAS;
    round2(clamp_score(raw))
}

/// Copies the snapshot with `efficiency` filled in on every record.
pub fn add_efficiency_scores(records: &[EquipmentRecord]) -> Vec<EquipmentRecord> {
    records
        .iter()
        .map(|record| EquipmentRecord {
            efficiency: Some(score(record)),
            ..record.clone()
        })
        .collect()
}

pub fn clamp_score(raw: f64) -> f64 {
    if raw.is_nan() {
        return 0.0;
    }
    raw.clamp(0.0, 100.0)
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
