//! Endpoint listings across guilds.

use std::collections::{BTreeMap, HashSet};

use crate::store::NodeValidationRecord;

use super::report::{Coordinates, EndpointSummary};
use super::status::{worst_of, StatusLevel};

pub(crate) fn coordinates(row: &NodeValidationRecord) -> Option<Coordinates> {
    match (row.location_latitude, row.location_longitude) {
        (Some(latitude), Some(longitude)) => Some(Coordinates {
            latitude,
            longitude,
        }),
        _ => None,
    }
}

/// One summary per (guild, endpoint), ordered by guild then endpoint.
///
/// With `only_healthy`, an endpoint is listed only if every row in the
/// window passed. Otherwise every endpoint is listed with the best level it
/// reached in the window.
pub fn summarize_endpoints(rows: &[NodeValidationRecord], only_healthy: bool) -> Vec<EndpointSummary> {
    let failing: HashSet<&str> = rows
        .iter()
        .filter(|r| !r.all_checks_ok.is_passing())
        .map(|r| r.endpoint_url.as_str())
        .collect();

    let mut grouped: BTreeMap<(&str, &str), Vec<&NodeValidationRecord>> = BTreeMap::new();
    for row in rows {
        if only_healthy && failing.contains(row.endpoint_url.as_str()) {
            continue;
        }
        grouped
            .entry((row.guild.as_str(), row.endpoint_url.as_str()))
            .or_default()
            .push(row);
    }

    grouped
        .into_values()
        .filter_map(|group| {
            let latest = group.iter().max_by_key(|r| r.validation_date)?;
            let levels: Vec<StatusLevel> = group.iter().map(|r| r.all_checks_ok).collect();
            let overall_level = if only_healthy {
                worst_of(&levels)
            } else {
                levels.iter().copied().max().unwrap_or_default()
            };
            Some(EndpointSummary {
                endpoint_url: latest.endpoint_url.clone(),
                guild: latest.guild.clone(),
                is_ssl: latest.is_ssl,
                coordinates: coordinates(latest),
                server_version: latest.server_version.clone(),
                overall_level,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::report::NodeType;
    use chrono::{Duration, TimeZone, Utc};
    use StatusLevel::*;

    fn row(guild: &str, endpoint: &str, minute: i64, level: StatusLevel) -> NodeValidationRecord {
        NodeValidationRecord {
            id: format!("{guild}-{minute}"),
            guild: guild.into(),
            node_type: NodeType::Api,
            validation_date: Utc.with_ymd_and_hms(2026, 10, 1, 12, 0, 0).unwrap()
                + Duration::minutes(minute),
            endpoint_url: endpoint.into(),
            is_ssl: endpoint.starts_with("https"),
            server_version: Some(format!("v{minute}")),
            location_latitude: Some(47.0),
            location_longitude: Some(8.0),
            all_checks_ok: level,
            checks: Vec::new(),
        }
    }

    #[test]
    fn healthy_excludes_any_failure() {
        let rows = vec![
            row("b", "https://b.io", 0, Success),
            row("b", "https://b.io", 5, Success),
            row("a", "https://a.io", 0, Success),
            row("a", "https://a.io", 5, Error),
            row("c", "http://c.io", 1, Warn),
        ];
        let healthy = summarize_endpoints(&rows, true);
        assert_eq!(healthy.len(), 1);
        assert_eq!(healthy[0].endpoint_url, "https://b.io");
        assert_eq!(healthy[0].overall_level, SuccessAll);
        assert_eq!(healthy[0].server_version.as_deref(), Some("v5"));
    }

    #[test]
    fn all_mode_keeps_best_level_sorted() {
        let rows = vec![
            row("b", "https://b.io", 0, Error),
            row("a", "https://a.io", 0, Error),
            row("a", "https://a.io", 5, Success),
        ];
        let all = summarize_endpoints(&rows, false);
        let listed: Vec<(&str, StatusLevel)> = all
            .iter()
            .map(|e| (e.guild.as_str(), e.overall_level))
            .collect();
        assert_eq!(listed, vec![("a", Success), ("b", Error)]);
        assert_eq!(
            all[0].coordinates,
            Some(Coordinates {
                latitude: 47.0,
                longitude: 8.0
            })
        );
    }
}
