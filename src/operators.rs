use chrono::NaiveDate;
use indexmap::IndexMap;

use crate::efficiency::{clamp_score, round2};
use crate::models::{EquipmentRecord, OperatorScore};

const ENGINE_HOURS_WEIGHT: f64 = 5.0;
const IDLE_HOURS_WEIGHT: f64 = 2.0;
const OVERDUE_PENALTY: f64 = 10.0;
const BASELINE: f64 = 50.0;

#[derive(Debug, Default)]
struct OperatorTotals {
    rentals: usize,
    engine_hours: f64,
    idle_hours: f64,
    overdue: usize,
}

/// Current rental whose planned return day has already passed.
pub fn is_overdue(record: &EquipmentRecord, today: NaiveDate) -> bool {
    record.is_current()
        && record
            .planned_check_in_date
            .is_some_and(|planned| planned.is_before(today))
}

/// One score per assigned operator, in order of first appearance.
pub fn calculate_operator_scores(
    records: &[EquipmentRecord],
    today: NaiveDate,
) -> Vec<OperatorScore> {
    let mut totals: IndexMap<&str, OperatorTotals> = IndexMap::new();

    for record in records {
        let Some(operator_id) = record.operator_id.as_deref() else {
            continue;
        };

        let entry = totals.entry(operator_id).or_default();
        entry.rentals += 1;
        entry.engine_hours += record.engine_hours_per_day;
        entry.idle_hours += record.idle_hours_per_day;
        if is_overdue(record, today) {
            entry.overdue += 1;
        }
    }

    totals
        .into_iter()
        .map(|(operator_id, totals)| {
            let count = totals.rentals as f64;
            let avg_engine_hours = totals.engine_hours / count;
            let avg_idle_hours = totals.idle_hours / count;
            let raw = avg_engine_hours * ENGINE_HOURS_WEIGHT
                - avg_idle_hours * IDLE_HOURS_WEIGHT
                - totals.overdue as f64 * OVERDUE_PENALTY
                + BASELINE;

            OperatorScore {
                operator_id: operator_id.to_string(),
                rental_count: totals.rentals,
                avg_engine_hours: round2(avg_engine_hours),
                avg_idle_hours: round2(avg_idle_hours),
                overdue_count: totals.overdue,
                score: round2(clamp_score(raw)),
            }
        })
        .collect()
}

/// Highest score first; ties fall back to operator id.
pub fn leaderboard(scores: &[OperatorScore]) -> Vec<OperatorScore> {
    let mut ranked = scores.to_vec();
    ranked.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.operator_id.cmp(&b.operator_id))
    });
    ranked
}

pub fn find_operator<'a>(
    scores: &'a [OperatorScore],
    operator_id: &str,
) -> Option<&'a OperatorScore> {
    scores.iter().find(|score| score.operator_id == operator_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dates::RentalDate;
    use crate::models::fixtures::{hours, record};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    fn with_operator(mut record: EquipmentRecord, operator: Option<&str>) -> EquipmentRecord {
        record.operator_id = operator.map(str::to_string);
        record.planned_check_in_date = RentalDate::parse("2024-04-01");
        record
    }

    #[test]
    fn averages_feed_the_score() {
        let records = vec![
            with_operator(hours("EQ1", 10.0, 1.0, 0.0), Some("OP1")),
            with_operator(hours("EQ2", 0.0, 1.0, 0.0), Some("OP1")),
        ];
        let scores = calculate_operator_scores(&records, today());

        assert_eq!(scores.len(), 1);
        let score = &scores[0];
        assert_eq!(score.rental_count, 2);
        assert_eq!(score.avg_engine_hours, 5.0);
        assert_eq!(score.avg_idle_hours, 1.0);
        assert_eq!(score.overdue_count, 0);
        assert_eq!(score.score, 73.0);
    }

    #[test]
    fn score_uses_unrounded_averages() {
        // avg engine 1/3: 5/3 + 50 = 51.666.. -> 51.67; rounding first would give 51.65
        let records = vec![
            with_operator(hours("EQ1", 1.0, 0.0, 0.0), Some("OP1")),
            with_operator(hours("EQ2", 0.0, 0.0, 0.0), Some("OP1")),
            with_operator(hours("EQ3", 0.0, 0.0, 0.0), Some("OP1")),
        ];
        let scores = calculate_operator_scores(&records, today());
        assert_eq!(scores[0].avg_engine_hours, 0.33);
        assert_eq!(scores[0].score, 51.67);
    }

    #[test]
    fn unassigned_operators_are_skipped() {
        let records = vec![
            with_operator(record("EQ1"), None),
            with_operator(record("EQ2"), Some("OP2")),
        ];
        let scores = calculate_operator_scores(&records, today());
        assert_eq!(scores.len(), 1);
        assert_eq!(scores[0].operator_id, "OP2");
    }

    #[test]
    fn overdue_counts_only_open_rentals_past_due() {
        let mut overdue = record("EQ1");
        overdue.planned_check_in_date = RentalDate::parse("2024-02-29");
        let mut due_today = record("EQ2");
        due_today.planned_check_in_date = RentalDate::parse("2024-03-01");
        let mut returned = record("EQ3");
        returned.planned_check_in_date = RentalDate::parse("2024-01-01");
        returned.actual_check_in_date = RentalDate::parse("2024-01-05");
        let mut garbled = record("EQ4");
        garbled.planned_check_in_date = RentalDate::parse("next week");

        let scores = calculate_operator_scores(&[overdue, due_today, returned, garbled], today());
        assert_eq!(scores[0].overdue_count, 1);
        assert_eq!(scores[0].score, 40.0);
    }

    #[test]
    fn scores_stay_within_bounds() {
        let mut late = Vec::new();
        for i in 0..8 {
            let mut rental = hours(&format!("EQ{i}"), 0.0, 20.0, 0.0);
            rental.operator_id = Some("LATE".to_string());
            rental.planned_check_in_date = RentalDate::parse("2023-01-01");
            late.push(rental);
        }
        let busy = with_operator(hours("EQ9", 24.0, 0.0, 0.0), Some("BUSY"));
        late.push(busy);

        let scores = calculate_operator_scores(&late, today());
        assert_eq!(find_operator(&scores, "LATE").unwrap().score, 0.0);
        assert_eq!(find_operator(&scores, "BUSY").unwrap().score, 100.0);
    }

    #[test]
    fn operators_are_independent_and_ordered_by_first_seen() {
        let records = vec![
            with_operator(hours("EQ1", 2.0, 0.0, 0.0), Some("OP2")),
            with_operator(hours("EQ2", 4.0, 0.0, 0.0), Some("OP1")),
            with_operator(hours("EQ3", 2.0, 0.0, 0.0), Some("OP2")),
        ];
        let scores = calculate_operator_scores(&records, today());
        assert_eq!(scores[0].operator_id, "OP2");
        assert_eq!(scores[0].score, 60.0);
        assert_eq!(scores[1].operator_id, "OP1");
        assert_eq!(scores[1].score, 70.0);

        let ranked = leaderboard(&scores);
        assert_eq!(ranked[0].operator_id, "OP1");
    }
}
