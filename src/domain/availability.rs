//! Daily availability of a node endpoint.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::store::NodeValidationRecord;

use super::report::AvailabilityPoint;

/// Percentage of passing validations per day, oldest day first.
pub fn daily_availability(rows: &[NodeValidationRecord]) -> Vec<AvailabilityPoint> {
    let mut days: BTreeMap<NaiveDate, (i64, i64)> = BTreeMap::new();
    for row in rows {
        let (passed, total) = days.entry(row.validation_date.date_naive()).or_default();
        *total += 1;
        if row.all_checks_ok.is_passing() {
            *passed += 1;
        }
    }

    days.into_iter()
        .map(|(date, (passed, total))| AvailabilityPoint {
            date,
            availability: (passed * 100 / total.max(1)) as i32,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::report::NodeType;
    use crate::domain::status::StatusLevel;
    use chrono::{TimeZone, Utc};

    fn row(day: u32, hour: u32, level: StatusLevel) -> NodeValidationRecord {
        NodeValidationRecord {
            id: format!("{day}-{hour}"),
            guild: "g".into(),
            node_type: NodeType::History,
            validation_date: Utc.with_ymd_and_hms(2026, 10, day, hour, 0, 0).unwrap(),
            endpoint_url: "https://g.io".into(),
            is_ssl: true,
            server_version: None,
            location_latitude: None,
            location_longitude: None,
            all_checks_ok: level,
            checks: Vec::new(),
        }
    }

    #[test]
    fn groups_by_day() {
        let rows = vec![
            row(2, 1, StatusLevel::Success),
            row(1, 1, StatusLevel::Success),
            row(1, 2, StatusLevel::Error),
            row(1, 3, StatusLevel::Success),
            row(2, 2, StatusLevel::SuccessAll),
        ];
        let points = daily_availability(&rows);
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].date, NaiveDate::from_ymd_opt(2026, 10, 1).unwrap());
        assert_eq!(points[0].availability, 66);
        assert_eq!(points[1].availability, 100);
    }

    #[test]
    fn no_rows_no_points() {
        assert!(daily_availability(&[]).is_empty());
    }
}
