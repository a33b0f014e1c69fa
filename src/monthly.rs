use std::collections::BTreeMap;

use crate::dates::MonthKey;
use crate::efficiency::round2;
use crate::models::{EquipmentRecord, MonthlyEfficiency};

/// Average efficiency per check-out month, oldest month first.
///
/// Reads the `efficiency` already attached to each record (missing counts as
/// zero). Records without a usable check-out date fall in no bucket.
pub fn monthly_averages(records: &[EquipmentRecord]) -> Vec<MonthlyEfficiency> {
    let mut buckets: BTreeMap<MonthKey, (f64, usize)> = BTreeMap::new();

    for record in records {
        let Some(month) = record.check_out_date.and_then(|date| date.month_key()) else {
            continue;
        };

        let entry = buckets.entry(month).or_insert((0.0, 0));
        entry.0 += record.efficiency.unwrap_or(0.0);
        entry.1 += 1;
    }

    buckets
        .into_iter()
        .map(|(month, (total, count))| MonthlyEfficiency {
            month,
            label: month.label(),
            record_count: count,
            average_efficiency: round2(total / count as f64),
        })
        .collect()
}
