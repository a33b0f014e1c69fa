use std::io::Read;
use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

use crate::dates::RentalDate;
use crate::models::EquipmentRecord;

/// Marker used by the rental export for "no site" / "no operator".
const UNASSIGNED: &str = "NULL";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CsvRow {
    #[serde(rename = "Equipment ID")]
    equipment_id: String,
    #[serde(rename = "Type")]
    equipment_type: String,
    #[serde(rename = "Site ID")]
    site_id: String,
    #[serde(rename = "Check-Out Date")]
    check_out_date: String,
    #[serde(rename = "Planned Check-In Date")]
    planned_check_in_date: String,
    #[serde(rename = "Actual Check-In Date")]
    actual_check_in_date: String,
    #[serde(rename = "Engine Hours/Day")]
    engine_hours_per_day: String,
    #[serde(rename = "Idle Hours/Day")]
    idle_hours_per_day: String,
    #[serde(rename = "Operating Days")]
    operating_days: String,
    #[serde(rename = "Fuel Usage/Day (Liters)")]
    fuel_usage_per_day: String,
    #[serde(rename = "Operator ID")]
    operator_id: String,
}

impl CsvRow {
    fn into_record(self) -> EquipmentRecord {
        EquipmentRecord {
            equipment_id: self.equipment_id,
            equipment_type: non_blank(self.equipment_type),
            site_id: assigned(self.site_id),
            check_out_date: RentalDate::parse(&self.check_out_date),
            planned_check_in_date: RentalDate::parse(&self.planned_check_in_date),
            actual_check_in_date: RentalDate::parse(&self.actual_check_in_date),
            engine_hours_per_day: measurement(&self.engine_hours_per_day),
            idle_hours_per_day: measurement(&self.idle_hours_per_day),
            operating_days: measurement(&self.operating_days),
            fuel_usage_per_day: measurement(&self.fuel_usage_per_day),
            operator_id: assigned(self.operator_id),
            efficiency: None,
        }
    }
}

/// Missing, unparsable and non-finite measurements all count as zero.
pub fn measurement(raw: &str) -> f64 {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .unwrap_or(0.0)
}

/// Blank cells and the `NULL` marker both mean "unassigned".
pub fn assigned(raw: String) -> Option<String> {
    non_blank(raw).filter(|value| value != UNASSIGNED)
}

fn non_blank(raw: String) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

pub fn load_records<R: Read>(reader: R) -> anyhow::Result<Vec<EquipmentRecord>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = lossy(csv_reader.byte_headers().context("failed to read CSV header")?);

    let mut records = Vec::new();
    for result in csv_reader.byte_records() {
        let raw = result.map_err(|err| {
            let line = err.position().map(|pos| pos.line()).unwrap_or_default();
            anyhow::anyhow!("CSV parse error at line {line}: {err}")
        })?;
        let line = raw.position().map(|pos| pos.line()).unwrap_or_default();
        let row: CsvRow = lossy(&raw)
            .deserialize(Some(&headers))
            .map_err(|err| anyhow::anyhow!("CSV parse error at line {line}: {err}"))?;
        records.push(row.into_record());
    }

    tracing::info!(records = records.len(), "decoded equipment snapshot");
    Ok(records)
}

/// Bytes that are not UTF-8 become U+FFFD instead of failing the row.
fn lossy(record: &csv::ByteRecord) -> csv::StringRecord {
    record
        .iter()
        .map(|field| String::from_utf8_lossy(field))
        .collect()
}

pub fn parse_records(contents: &str) -> anyhow::Result<Vec<EquipmentRecord>> {
    load_records(contents.as_bytes())
}

pub async fn read_snapshot(path: &Path) -> anyhow::Result<Vec<EquipmentRecord>> {
    let contents = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read equipment snapshot {}", path.display()))?;
    load_records(contents.as_slice())
        .with_context(|| format!("failed to decode equipment snapshot {}", path.display()))
}
