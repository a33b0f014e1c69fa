use std::path::PathBuf;

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use fleet_rental_analytics::{dates, fleet, ingest, operators, report};
use fleet_rental_analytics::{AnalyticsReport, RecordFilter};

#[derive(Parser)]
#[command(name = "fleet-analytics")]
#[command(about = "Efficiency, operator and demand analytics for rented heavy equipment", long_about = None)]
struct Cli {
    /// Equipment rental snapshot (CSV)
    #[arg(long, env = "FLEET_DATA_PATH", global = true)]
    data: Option<PathBuf>,
    /// Evaluate due dates against this day instead of the local date (YYYY-MM-DD)
    #[arg(long, env = "FLEET_TODAY", global = true)]
    today: Option<NaiveDate>,
    /// Emit log lines as JSON
    #[arg(long, env = "FLEET_LOG_JSON", global = true)]
    log_json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct FilterArgs {
    /// Case-insensitive match on equipment, type, site or operator
    #[arg(long)]
    search: Option<String>,
    #[arg(long = "type")]
    equipment_type: Option<String>,
    #[arg(long)]
    site: Option<String>,
}

impl FilterArgs {
    fn into_filter(self) -> RecordFilter {
        RecordFilter {
            query: self.search,
            equipment_type: self.equipment_type,
            site_id: self.site,
            operator_id: None,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// List rentals ranked by efficiency score
    Scores {
        #[command(flatten)]
        filter: FilterArgs,
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Rank operators, or show one operator's rentals
    Operators {
        #[arg(long)]
        operator: Option<String>,
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Most demanded equipment type per site
    Forecast,
    /// Rule-based anomalies on open rentals
    Anomalies,
    /// Average efficiency per check-out month
    Monthly,
    /// Generate a markdown report
    Report {
        #[command(flatten)]
        filter: FilterArgs,
        #[arg(long, default_value = "fleet-report.md")]
        out: PathBuf,
    },
    /// Write the full analytics pass as JSON
    Export {
        #[arg(long, default_value = "fleet-analytics.json")]
        out: PathBuf,
    },
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    let data_path = cli
        .data
        .context("FLEET_DATA_PATH or --data must point at an equipment snapshot")?;
    let today = cli.today.unwrap_or_else(dates::today);

    let records = ingest::read_snapshot(&data_path).await?;
    tracing::info!(path = %data_path.display(), %today, "running analytics pass");

    match cli.command {
        Commands::Scores { filter, limit } => {
            let records = filter.into_filter().apply(&records);
            let analytics = AnalyticsReport::compute(&records, today);

            if analytics.is_empty() {
                println!("No rentals match this filter.");
                return Ok(());
            }

            let mut ranked = analytics.records.clone();
            ranked.sort_by(|a, b| {
                b.efficiency
                    .partial_cmp(&a.efficiency)
                    .unwrap_or(std::cmp::Ordering::Equal)
            });

            println!("Rentals by efficiency:");
            for record in ranked.iter().take(limit) {
                println!(
                    "- {} ({}, site {}) efficiency {:.2} [{}]",
                    record.equipment_id,
                    record.equipment_type.as_deref().unwrap_or("-"),
                    record.site_id.as_deref().unwrap_or("unassigned"),
                    record.efficiency.unwrap_or(0.0),
                    fleet::rental_status(record, today)
                );
            }
        }
        Commands::Operators { operator, limit } => {
            let analytics = AnalyticsReport::compute(&records, today);

            if let Some(operator_id) = operator {
                let Some(score) = operators::find_operator(&analytics.operator_scores, &operator_id)
                else {
                    println!("No rentals recorded for operator {operator_id}.");
                    return Ok(());
                };
                let own =
                    RecordFilter::for_operator(operator_id.as_str()).apply(&analytics.records);
                let overview = fleet::operator_overview(&own, &operator_id);

                println!(
                    "Operator {} score {:.2} across {} rentals ({} overdue)",
                    score.operator_id, score.score, score.rental_count, score.overdue_count
                );
                println!(
                    "Currently rented: {}, rented hours {:.2}, downtime {:.2}h, efficiency {}",
                    overview.current_rentals,
                    overview.total_rented_hours,
                    overview.total_downtime_hours,
                    overview
                        .average_efficiency
                        .map_or_else(|| "-".to_string(), |value| format!("{value:.2}"))
                );
                for record in &own {
                    println!(
                        "- {} ({}) efficiency {:.2} [{}]",
                        record.equipment_id,
                        record.equipment_type.as_deref().unwrap_or("-"),
                        record.efficiency.unwrap_or(0.0),
                        fleet::rental_status(record, today)
                    );
                }
                for anomaly in &overview.anomalies {
                    println!("! [{}] {}: {}", anomaly.kind, anomaly.equipment_id, anomaly.details);
                }
                for upcoming in fleet::upcoming_returns(&own, today, fleet::RETURN_NOTICE_DAYS) {
                    println!(
                        "Heads up: {} is due back on {} ({} days)",
                        upcoming.equipment_id,
                        upcoming.planned_check_in_date,
                        upcoming.days_until_return
                    );
                }
                return Ok(());
            }

            if analytics.operator_scores.is_empty() {
                println!("No assigned operators in this snapshot.");
                return Ok(());
            }

            println!("Top operators by score:");
            for score in operators::leaderboard(&analytics.operator_scores)
                .iter()
                .take(limit)
            {
                println!(
                    "- {} score {:.2} across {} rentals (avg engine {:.2}h, avg idle {:.2}h, {} overdue)",
                    score.operator_id,
                    score.score,
                    score.rental_count,
                    score.avg_engine_hours,
                    score.avg_idle_hours,
                    score.overdue_count
                );
            }
        }
        Commands::Forecast => {
            let analytics = AnalyticsReport::compute(&records, today);
            if analytics.forecasts.is_empty() {
                println!("No site demand recorded.");
            }
            for forecast in &analytics.forecasts {
                println!(
                    "- {}: {} ({} confidence, {} of {} rentals)",
                    forecast.site_id,
                    forecast.most_demanded_type,
                    forecast.confidence_label(),
                    forecast.most_demanded_count,
                    forecast.site_total
                );
            }
        }
        Commands::Anomalies => {
            let analytics = AnalyticsReport::compute(&records, today);
            if analytics.anomalies.is_empty() {
                println!("No anomalies detected on open rentals.");
            }
            for anomaly in &analytics.anomalies {
                println!(
                    "- [{}] {} ({}, operator {}): {}",
                    anomaly.kind,
                    anomaly.equipment_id,
                    anomaly.equipment_type,
                    anomaly.operator_id,
                    anomaly.details
                );
            }
        }
        Commands::Monthly => {
            let analytics = AnalyticsReport::compute(&records, today);
            for month in &analytics.monthly_efficiency {
                println!("{}\t{:.2}", month.label, month.average_efficiency);
            }
        }
        Commands::Report { filter, out } => {
            let filter = filter.into_filter();
            let scope = describe_scope(&filter);
            let analytics = AnalyticsReport::compute(&filter.apply(&records), today);
            let report = report::build_report(&analytics, scope.as_deref(), today);
            std::fs::write(&out, report)
                .with_context(|| format!("failed to write report {}", out.display()))?;
            println!("Report written to {}.", out.display());
        }
        Commands::Export { out } => {
            let analytics = AnalyticsReport::compute(&records, today);
            let json = serde_json::to_string_pretty(&analytics)?;
            std::fs::write(&out, json)
                .with_context(|| format!("failed to write export {}", out.display()))?;
            println!("Analytics written to {}.", out.display());
        }
    }

    Ok(())
}

fn describe_scope(filter: &RecordFilter) -> Option<String> {
    if filter.is_empty() {
        return None;
    }

    let mut parts = Vec::new();
    if let Some(site) = &filter.site_id {
        parts.push(format!("site {site}"));
    }
    if let Some(equipment_type) = &filter.equipment_type {
        parts.push(format!("type {equipment_type}"));
    }
    if let Some(query) = &filter.query {
        parts.push(format!("search \"{query}\""));
    }
    Some(parts.join(", "))
}
