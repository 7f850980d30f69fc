//! Stations and relevance-ranked station search.

use serde::{Deserialize, Serialize};

use crate::table::TableRow;
use crate::types::{deserialize_id, EntityId};

/// Read-only station reference data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Station {
    #[serde(alias = "_id", deserialize_with = "deserialize_id")]
    pub id: EntityId,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
}

impl Station {
    /// `CODE - Name`, or just the name when the station has no code.
    pub fn label(&self) -> String {
        if self.code.is_empty() {
            self.name.clone()
        } else {
            format!("{} - {}", self.code, self.name)
        }
    }
}

impl TableRow for Station {
    fn row_id(&self) -> Option<String> {
        Some(self.id.clone()).filter(|id| !id.is_empty())
    }
}

// ---------------------------------------------------------------------------
// Ranking
// ---------------------------------------------------------------------------

/// Relevance group of a matching station. Lower sorts first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum MatchRank {
    Exact,
    Prefix,
    Contains,
}

fn match_rank(station: &Station, needle: &str) -> Option<MatchRank> {
    let name = station.name.to_lowercase();
    let code = station.code.to_lowercase();

    if name == needle || code == needle {
        return Some(MatchRank::Exact);
    }
    if name.starts_with(needle) || code.starts_with(needle) {
        return Some(MatchRank::Prefix);
    }
    let in_address = station
        .address
        .as_deref()
        .is_some_and(|a| a.to_lowercase().contains(needle));
    (name.contains(needle) || code.contains(needle) || in_address).then_some(MatchRank::Contains)
}

/// Stations matching `query` on name, code or address, case-insensitively.
///
/// Exact name/code matches come first, then prefix matches, then any other
/// containment. Input order is kept within each group. A blank query returns
/// every station in input order.
pub fn rank_stations<'a>(stations: &'a [Station], query: &str) -> Vec<&'a Station> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return stations.iter().collect();
    }

    let mut ranked: Vec<(MatchRank, &Station)> = stations
        .iter()
        .filter_map(|s| match_rank(s, &needle).map(|rank| (rank, s)))
        .collect();
    ranked.sort_by_key(|(rank, _)| *rank);
    ranked.into_iter().map(|(_, s)| s).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn station(id: &str, code: &str, name: &str, address: Option<&str>) -> Station {
        Station {
            id: id.to_string(),
            code: code.to_string(),
            name: name.to_string(),
            address: address.map(str::to_string),
        }
    }

    fn names(ranked: &[&Station]) -> Vec<String> {
        ranked.iter().map(|s| s.name.clone()).collect()
    }

    #[test]
    fn central_query_keeps_prefix_matches_in_order() {
        let stations = vec![
            station("1", "CS", "Central Station", None),
            station("2", "NS", "North Station", None),
            station("3", "CD", "Central Depot", None),
        ];
        let ranked = rank_stations(&stations, "central");
        assert_eq!(names(&ranked), vec!["Central Station", "Central Depot"]);
    }

    #[test]
    fn exact_then_prefix_then_contains() {
        let stations = vec![
            station("1", "A1", "Old Central Yard", None),
            station("2", "A2", "Central Depot", None),
            station("3", "A3", "Riverside", Some("12 Central Ave")),
            station("4", "A4", "Central", None),
        ];
        let ranked = rank_stations(&stations, "CENTRAL");
        assert_eq!(
            names(&ranked),
            vec!["Central", "Central Depot", "Old Central Yard", "Riverside"]
        );
    }

    #[test]
    fn code_matches_count_as_exact() {
        let stations = vec![
            station("1", "HN01", "Hoan Kiem", None),
            station("2", "HN", "Ha Noi Hub", None),
        ];
        let ranked = rank_stations(&stations, "hn");
        assert_eq!(names(&ranked), vec!["Ha Noi Hub", "Hoan Kiem"]);
    }

    #[test]
    fn blank_query_returns_all() {
        let stations = vec![station("1", "A", "x", None), station("2", "B", "y", None)];
        assert_eq!(rank_stations(&stations, "  ").len(), 2);
    }

    #[test]
    fn label_includes_code() {
        assert_eq!(station("1", "CS", "Central", None).label(), "CS - Central");
        assert_eq!(station("1", "", "Central", None).label(), "Central");
    }

    #[test]
    fn deserializes_underscore_id() {
        let s: Station = serde_json::from_value(serde_json::json!({
            "_id": "s1", "code": "CS", "name": "Central", "address": null
        }))
        .unwrap();
        assert_eq!(s.id, "s1");
        assert_eq!(s.address, None);
    }
}
