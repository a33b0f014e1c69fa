use crate::models::EquipmentRecord;

/// Narrows a snapshot the way the dashboard tables do.
#[derive(Debug, Clone, Default)]
pub struct RecordFilter {
    /// Case-insensitive substring of equipment id, type, site or operator.
    pub query: Option<String>,
    pub equipment_type: Option<String>,
    pub site_id: Option<String>,
    pub operator_id: Option<String>,
}

impl RecordFilter {
    pub fn for_operator(operator_id: impl Into<String>) -> Self {
        Self {
            operator_id: Some(operator_id.into()),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.query.is_none()
            && self.equipment_type.is_none()
            && self.site_id.is_none()
            && self.operator_id.is_none()
    }

    pub fn matches(&self, record: &EquipmentRecord) -> bool {
        if let Some(query) = self.query.as_deref() {
            let needle = query.to_lowercase();
            let hit = [
                Some(record.equipment_id.as_str()),
                record.equipment_type.as_deref(),
                record.site_id.as_deref(),
                record.operator_id.as_deref(),
            ]
            .into_iter()
            .flatten()
            .any(|field| field.to_lowercase().contains(&needle));
            if !hit {
                return false;
            }
        }

        exact(self.equipment_type.as_deref(), record.equipment_type.as_deref())
            && exact(self.site_id.as_deref(), record.site_id.as_deref())
            && exact(self.operator_id.as_deref(), record.operator_id.as_deref())
    }

    pub fn apply(&self, records: &[EquipmentRecord]) -> Vec<EquipmentRecord> {
        records
            .iter()
            .filter(|record| self.matches(record))
            .cloned()
            .collect()
    }
}

fn exact(wanted: Option<&str>, actual: Option<&str>) -> bool {
    wanted.map_or(true, |wanted| actual == Some(wanted))
}
