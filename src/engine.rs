use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::Serialize;

use crate::anomaly::detect_anomalies;
use crate::efficiency::add_efficiency_scores;
use crate::fleet;
use crate::forecast::demand_forecasting;
use crate::models::{
    Anomaly, DemandForecast, EquipmentRecord, FleetSummary, IdleDistribution, MonthlyEfficiency,
    OperatorScore, UpcomingReturn,
};
use crate::monthly::monthly_averages;
use crate::operators::calculate_operator_scores;

/// Everything derived from one snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct AnalyticsReport {
    pub today: NaiveDate,
    pub records: Vec<EquipmentRecord>,
    pub operator_scores: Vec<OperatorScore>,
    pub forecasts: Vec<DemandForecast>,
    pub anomalies: Vec<Anomaly>,
    pub monthly_efficiency: Vec<MonthlyEfficiency>,
    pub summary: FleetSummary,
    pub usage_by_type: IndexMap<String, usize>,
    pub usage_by_site: IndexMap<String, usize>,
    pub idle_distribution: IdleDistribution,
    pub availability_by_type: IndexMap<String, usize>,
    pub upcoming_returns: Vec<UpcomingReturn>,
}

impl AnalyticsReport {
    pub fn compute(records: &[EquipmentRecord], today: NaiveDate) -> Self {
        let scored = add_efficiency_scores(records);

        let report = Self {
            today,
            operator_scores: calculate_operator_scores(records, today),
            forecasts: demand_forecasting(records),
            anomalies: detect_anomalies(records),
            monthly_efficiency: monthly_averages(&scored),
            summary: fleet::fleet_summary(records, today),
            usage_by_type: fleet::usage_by_type(records),
            usage_by_site: fleet::usage_by_site(records),
            idle_distribution: fleet::idle_distribution(records),
            availability_by_type: fleet::availability_by_type(
                records,
                fleet::DEFAULT_TYPE_CAPACITY,
            ),
            upcoming_returns: fleet::upcoming_returns(records, today, fleet::RETURN_NOTICE_DAYS),
            records: scored,
        };

        tracing::debug!(
            records = report.records.len(),
            operators = report.operator_scores.len(),
            sites = report.forecasts.len(),
            anomalies = report.anomalies.len(),
            months = report.monthly_efficiency.len(),
            "analytics pass complete"
        );
        report
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
