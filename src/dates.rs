use chrono::{DateTime, Datelike, Local, NaiveDate, NaiveDateTime};
use serde::Serialize;

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];
const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
];

/// A calendar date as it arrived in the snapshot.
///
/// Values that fail to parse are kept as `Invalid` instead of being dropped so
/// that "a date was recorded" stays distinguishable from "no date at all".
/// An invalid date is never before, after or within a window of any day.
/// Serializes as the plain `YYYY-MM-DD` string, or `null` when invalid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum RentalDate {
    Valid(NaiveDate),
    Invalid,
}

impl RentalDate {
    /// Returns `None` for a blank cell.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }

        for format in DATE_FORMATS {
            if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
                return Some(Self::Valid(date));
            }
        }

        for format in DATETIME_FORMATS {
            if let Ok(timestamp) = NaiveDateTime::parse_from_str(raw, format) {
                return Some(Self::Valid(timestamp.date()));
            }
        }

        if let Ok(timestamp) = DateTime::parse_from_rfc3339(raw) {
            return Some(Self::Valid(timestamp.date_naive()));
        }

        Some(Self::Invalid)
    }

    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            Self::Valid(date) => Some(*date),
            Self::Invalid => None,
        }
    }

    /// Strictly earlier calendar day.
    pub fn is_before(&self, day: NaiveDate) -> bool {
        self.date().is_some_and(|date| date < day)
    }

    /// Strictly later calendar day.
    pub fn is_after(&self, other: &RentalDate) -> bool {
        match (self.date(), other.date()) {
            (Some(a), Some(b)) => a > b,
            _ => false,
        }
    }

    /// Whole days from `today` until this date; negative when already past.
    pub fn days_until(&self, today: NaiveDate) -> Option<i64> {
        self.date().map(|date| (date - today).num_days())
    }

    pub fn month_key(&self) -> Option<MonthKey> {
        self.date().map(MonthKey::from_date)
    }
}

/// Bucketing key for calendar months. Orders chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct MonthKey {
    pub year: i32,
    pub month: u32,
}

impl MonthKey {
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Short display label, e.g. `Jan 2024`.
    pub fn label(&self) -> String {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
            .map(|first| first.format("%b %Y").to_string())
            .unwrap_or_else(|| format!("{:02}/{}", self.month, self.year))
    }
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parses_supported_formats() {
        assert_eq!(
            RentalDate::parse("2024-03-05"),
            Some(RentalDate::Valid(day(2024, 3, 5)))
        );
        assert_eq!(
            RentalDate::parse("2024/03/05"),
            Some(RentalDate::Valid(day(2024, 3, 5)))
        );
        assert_eq!(
            RentalDate::parse("03/05/2024"),
            Some(RentalDate::Valid(day(2024, 3, 5)))
        );
        assert_eq!(
            RentalDate::parse("2024-03-05T18:30:00+00:00"),
            Some(RentalDate::Valid(day(2024, 3, 5)))
        );
    }

    #[test]
    fn timestamps_without_offset_keep_their_day() {
        for raw in [
            "2024-01-05 10:00:00",
            "2024-01-05T10:00:00",
            "2024-01-05 23:59:59.250",
            "2024-01-05T00:00:00.5",
        ] {
            assert_eq!(
                RentalDate::parse(raw),
                Some(RentalDate::Valid(day(2024, 1, 5))),
                "{raw}"
            );
        }
    }

    #[test]
    fn serializes_as_plain_date_or_null() {
        let valid = RentalDate::Valid(day(2024, 1, 5));
        assert_eq!(serde_json::to_string(&valid).unwrap(), "\"2024-01-05\"");
        assert_eq!(serde_json::to_string(&RentalDate::Invalid).unwrap(), "null");
    }

    #[test]
    fn blank_is_absent_and_garbage_is_invalid() {
        assert_eq!(RentalDate::parse("   "), None);
        assert_eq!(RentalDate::parse("soon"), Some(RentalDate::Invalid));
    }

    #[test]
    fn comparisons_are_day_granular() {
        let today = day(2024, 6, 10);
        assert!(RentalDate::Valid(day(2024, 6, 9)).is_before(today));
        assert!(!RentalDate::Valid(today).is_before(today));
        assert_eq!(RentalDate::Valid(day(2024, 6, 13)).days_until(today), Some(3));
    }

    #[test]
    fn invalid_date_never_compares() {
        let today = day(2024, 6, 10);
        assert!(!RentalDate::Invalid.is_before(today));
        assert!(!RentalDate::Invalid.is_after(&RentalDate::Valid(today)));
        assert!(!RentalDate::Valid(today).is_after(&RentalDate::Invalid));
        assert_eq!(RentalDate::Invalid.days_until(today), None);
        assert_eq!(RentalDate::Invalid.month_key(), None);
    }

    #[test]
    fn month_keys_order_and_label() {
        let dec = MonthKey::from_date(day(2023, 12, 31));
        let jan = MonthKey::from_date(day(2024, 1, 1));
        assert!(dec < jan);
        assert_eq!(jan.label(), "Jan 2024");
        assert_eq!(dec.label(), "Dec 2023");
    }
}
