//! Analytics over equipment-rental snapshots: efficiency scoring, operator
//! scores, per-site demand forecasts, anomaly flags and monthly trends.
//!
//! Every analytic function is a pure pass over an in-memory slice of
//! [`EquipmentRecord`]s; only [`ingest`] touches I/O.

pub mod anomaly;
pub mod dates;
pub mod efficiency;
pub mod engine;
pub mod filter;
pub mod fleet;
pub mod forecast;
pub mod ingest;
pub mod models;
pub mod monthly;
pub mod operators;
pub mod report;

pub use engine::AnalyticsReport;
pub use filter::RecordFilter;
pub use models::{
    Anomaly, AnomalyKind, DemandForecast, EquipmentRecord, MonthlyEfficiency, OperatorScore,
};
