use indexmap::IndexMap;

use crate::efficiency::round2;
use crate::models::{DemandForecast, EquipmentRecord};

/// Predicts the most demanded equipment type per site.
///
/// Records without a site or a type are left out of every tally. When two
/// types share the top count, the one seen first at that site wins.
pub fn demand_forecasting(records: &[EquipmentRecord]) -> Vec<DemandForecast> {
    let mut patterns: IndexMap<&str, IndexMap<&str, usize>> = IndexMap::new();

    for record in records {
        let (Some(site_id), Some(equipment_type)) =
            (record.site_id.as_deref(), record.equipment_type.as_deref())
        else {
            continue;
        };

        *patterns
            .entry(site_id)
            .or_default()
            .entry(equipment_type)
            .or_insert(0) += 1;
    }

    patterns
        .into_iter()
        .filter_map(|(site_id, types)| {
            let site_total: usize = types.values().sum();
            let mut top: Option<(&str, usize)> = None;
            for (&ty, &count) in &types {
                if top.map_or(true, |(_, best)| count > best) {
                    top = Some((ty, count));
                }
            }
            let (most_demanded_type, most_demanded_count) = top?;

            Some(DemandForecast {
                site_id: site_id.to_string(),
                most_demanded_type: most_demanded_type.to_string(),
                most_demanded_count,
                site_total,
                confidence_pct: round2(most_demanded_count as f64 / site_total as f64 * 100.0),
                type_counts: types
                    .into_iter()
                    .map(|(ty, count)| (ty.to_string(), count))
                    .collect(),
            })
        })
        .collect()
}
