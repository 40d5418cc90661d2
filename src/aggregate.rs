use serde::Serialize;
use std::collections::{HashMap, HashSet};

use crate::error::DashboardError;
use crate::field::Field;
use crate::filter::FilteredView;

/// Number of artists shown in the popularity hierarchy.
pub const TOP_ARTISTS: usize = 10;

/// Display cap for ranked bar charts.
pub const BAR_CAP: usize = 50;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupTotal {
    pub key: String,
    pub total: f64,
}

/// Per-group sums, in the order each group was first seen.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateResult {
    pub group_field: Field,
    pub value_field: Field,
    pub groups: Vec<GroupTotal>,
}

impl AggregateResult {
    pub fn get(&self, key: &str) -> Option<f64> {
        self.groups.iter().find(|g| g.key == key).map(|g| g.total)
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// The highest-valued groups of an aggregate, largest first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopKSet {
    pub entries: Vec<GroupTotal>,
}

impl TopKSet {
    pub fn keys(&self) -> HashSet<&str> {
        self.entries.iter().map(|e| e.key.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Sum `value_field` over the rows of each `group_field` group.
pub fn aggregate_by_group(
    view: &FilteredView<'_>,
    group_field: Field,
    value_field: Field,
) -> Result<AggregateResult, DashboardError> {
    if !value_field.is_numeric() {
        return Err(DashboardError::NotNumeric(value_field));
    }

    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<GroupTotal> = Vec::new();

    for row in view.iter() {
        let key = row.value(group_field).group_key();
        let value = row.value(value_field).as_number().unwrap_or_default();

        match index.get(&key) {
            Some(&i) => groups[i].total += value,
            None => {
                index.insert(key.clone(), groups.len());
                groups.push(GroupTotal { key, total: value });
            }
        }
    }

    log::debug!(
        "Aggregated {} rows into {} groups by {}",
        view.len(),
        groups.len(),
        group_field
    );

    Ok(AggregateResult {
        group_field,
        value_field,
        groups,
    })
}

/// Sort descending by total and keep the first `k` groups.
///
/// The sort is stable, so equal totals stay in first-seen order.
pub fn top_k(result: &AggregateResult, k: usize) -> TopKSet {
    let mut entries = result.groups.clone();
    entries.sort_by(|a, b| b.total.total_cmp(&a.total));
    entries.truncate(k);
    TopKSet { entries }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::tests::song;
    use crate::data::Dataset;
    use crate::filter::{filter, restrict_to_groups};
    use crate::selection::Selection;

    fn dataset() -> Dataset {
        Dataset::new(vec![
            song("A", "S1", "pop", 2000, 100.0, 10),
            song("B", "S2", "rock", 2010, 120.0, 5),
            song("C", "S3", "pop", 2005, 90.0, 7),
            song("A", "S4", "rock", 2015, 140.0, 2),
            song("D", "S5", "latin", 2019, 120.0, 9),
            song("E", "S6", "latin", 2019, 120.0, 5),
        ])
        .unwrap()
    }

    #[test]
    fn test_scenario_two_artists() {
        let dataset = Dataset::new(vec![
            song("A", "S1", "pop", 2000, 100.0, 10),
            song("B", "S2", "rock", 2010, 120.0, 5),
        ])
        .unwrap();
        let view = filter(&dataset, &Selection::default());
        let result = aggregate_by_group(&view, Field::Artist, Field::Popularity).unwrap();
        assert_eq!(result.get("A"), Some(10.0));
        assert_eq!(result.get("B"), Some(5.0));

        let top = top_k(&result, 1);
        assert_eq!(
            top.entries,
            vec![GroupTotal { key: "A".to_string(), total: 10.0 }]
        );
    }

    #[test]
    fn test_totals_are_conserved() {
        let dataset = dataset();
        let view = filter(&dataset, &Selection::default());
        let result = aggregate_by_group(&view, Field::Genre, Field::Popularity).unwrap();
        let grouped: f64 = result.groups.iter().map(|g| g.total).sum();
        let direct: f64 = view.iter().map(|r| r.popularity as f64).sum();
        assert_eq!(grouped, direct);
        assert_eq!(result.get("pop"), Some(17.0));
        assert_eq!(result.get("jazz"), None);
    }

    #[test]
    fn test_groups_in_first_seen_order() {
        let dataset = dataset();
        let view = filter(&dataset, &Selection::default());
        let result = aggregate_by_group(&view, Field::Artist, Field::Popularity).unwrap();
        let keys: Vec<&str> = result.groups.iter().map(|g| g.key.as_str()).collect();
        assert_eq!(keys, vec!["A", "B", "C", "D", "E"]);
    }

    #[test]
    fn test_group_by_numeric_field() {
        let dataset = dataset();
        let view = filter(&dataset, &Selection::default());
        let result = aggregate_by_group(&view, Field::Year, Field::Popularity).unwrap();
        assert_eq!(result.get("2019"), Some(14.0));
    }

    #[test]
    fn test_text_value_field_is_rejected() {
        let dataset = dataset();
        let view = filter(&dataset, &Selection::default());
        let err = aggregate_by_group(&view, Field::Genre, Field::Artist).unwrap_err();
        assert_eq!(err, DashboardError::NotNumeric(Field::Artist));
    }

    #[test]
    fn test_top_k_sorted_with_stable_ties() {
        let dataset = dataset();
        let view = filter(&dataset, &Selection::default());
        let result = aggregate_by_group(&view, Field::Artist, Field::Popularity).unwrap();
        let top = top_k(&result, 4);
        let keys: Vec<&str> = top.entries.iter().map(|e| e.key.as_str()).collect();
        // A=12, D=9, C=7, then B and E tie on 5 and B was seen first
        assert_eq!(keys, vec!["A", "D", "C", "B"]);
        assert!(top.entries.windows(2).all(|w| w[0].total >= w[1].total));
    }

    #[test]
    fn test_top_k_with_fewer_groups_returns_all() {
        let dataset = dataset();
        let view = filter(&dataset, &Selection::default());
        let result = aggregate_by_group(&view, Field::Genre, Field::Popularity).unwrap();
        let top = top_k(&result, TOP_ARTISTS);
        assert_eq!(top.len(), 3);
        for entry in &top.entries {
            assert_eq!(result.get(&entry.key), Some(entry.total));
        }
    }

    #[test]
    fn test_empty_view_aggregates_to_nothing() {
        let dataset = dataset();
        let view = filter(&dataset, &Selection::default().with_artists(["Nobody"]));
        let result = aggregate_by_group(&view, Field::Artist, Field::Popularity).unwrap();
        assert!(result.is_empty());
        assert!(top_k(&result, TOP_ARTISTS).is_empty());
    }

    #[test]
    fn test_restrict_to_top_k_keys() {
        let dataset = dataset();
        let view = filter(&dataset, &Selection::default());
        let result = aggregate_by_group(&view, Field::Artist, Field::Popularity).unwrap();
        let top = top_k(&result, 2);
        let keys = top.keys();
        let scoped = restrict_to_groups(&view, Field::Artist, &keys);
        assert_eq!(scoped.len(), 3);
        assert!(scoped.iter().all(|r| keys.contains(r.artist.as_str())));
    }
}
