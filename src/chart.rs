// Chart-ready tables built from a filtered view

use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::aggregate::{aggregate_by_group, top_k, GroupTotal};
use crate::error::DashboardError;
use crate::field::Field;
use crate::filter::FilteredView;
use crate::labels::display_label;

/// A chart axis: the field it plots and the title shown for it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Axis {
    pub field: Field,
    pub label: String,
}

impl Axis {
    pub fn new(field: Field) -> Self {
        Self {
            field,
            label: display_label(field),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterPoint {
    pub x: f64,
    pub y: f64,
    pub song: String,
    pub artist: String,
}

/// One point per row. Points are coloured by their y value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterChart {
    pub x: Axis,
    pub y: Axis,
    pub points: Vec<ScatterPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedBarChart {
    pub group: Axis,
    pub value: Axis,
    pub bars: Vec<GroupTotal>,
}

/// How a hierarchy chart is laid out. Only the renderer cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HierarchyShape {
    #[default]
    Sunburst,
    Treemap,
}

impl FromStr for HierarchyShape {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sunburst" => Ok(HierarchyShape::Sunburst),
            "treemap" => Ok(HierarchyShape::Treemap),
            _ => Err(DashboardError::Unmapped(s.to_string())),
        }
    }
}

impl fmt::Display for HierarchyShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HierarchyShape::Sunburst => f.write_str("Sunburst"),
            HierarchyShape::Treemap => f.write_str("Treemap"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HierarchyLeaf {
    pub label: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HierarchyGroup {
    pub label: String,
    /// Sum of the children's values
    pub value: f64,
    pub children: Vec<HierarchyLeaf>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HierarchyChart {
    pub shape: HierarchyShape,
    pub outer: Field,
    pub inner: Field,
    pub value: Axis,
    pub groups: Vec<HierarchyGroup>,
}

/// Any chart the dashboard can produce.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Chart {
    Scatter(ScatterChart),
    RankedBar(RankedBarChart),
    Hierarchy(HierarchyChart),
}

impl Chart {
    pub fn is_empty(&self) -> bool {
        match self {
            Chart::Scatter(c) => c.points.is_empty(),
            Chart::RankedBar(c) => c.bars.is_empty(),
            Chart::Hierarchy(c) => c.groups.is_empty(),
        }
    }
}

/// Convert a raw cell into the unit it is plotted in.
fn plotted_value(field: Field, raw: f64) -> f64 {
    match field {
        Field::DurationMs => raw / 1000.0,
        _ => raw,
    }
}

fn numeric(field: Field) -> Result<(), DashboardError> {
    if field.is_numeric() {
        Ok(())
    } else {
        Err(DashboardError::NotNumeric(field))
    }
}

/// Per-row x/y values with song and artist for hover text.
///
/// Durations are emitted in seconds. The conversion happens on the values
/// copied into the chart, so building the same chart twice gives the same
/// numbers.
pub fn build_scatter(
    view: &FilteredView<'_>,
    x_field: Field,
    y_field: Field,
) -> Result<ScatterChart, DashboardError> {
    numeric(x_field)?;
    numeric(y_field)?;

    let points = view
        .iter()
        .filter_map(|row| {
            let x = row.value(x_field).as_number()?;
            let y = row.value(y_field).as_number()?;
            Some(ScatterPoint {
                x: plotted_value(x_field, x),
                y: plotted_value(y_field, y),
                song: row.song.clone(),
                artist: row.artist.clone(),
            })
        })
        .collect();

    Ok(ScatterChart {
        x: Axis::new(x_field),
        y: Axis::new(y_field),
        points,
    })
}

/// Group, sum, sort descending, keep at most `cap` bars.
///
/// Only text fields and the year can name a bar.
pub fn build_ranked_bar(
    view: &FilteredView<'_>,
    group_field: Field,
    value_field: Field,
    cap: usize,
) -> Result<RankedBarChart, DashboardError> {
    if !group_field.is_categorical() {
        return Err(DashboardError::NotCategorical(group_field));
    }
    let totals = aggregate_by_group(view, group_field, value_field)?;
    let ranked = top_k(&totals, cap);
    Ok(RankedBarChart {
        group: Axis::new(group_field),
        value: Axis::new(value_field),
        bars: ranked.entries,
    })
}

/// Two-level outer → inner hierarchy sized by `value_field`.
///
/// Rows sharing the same outer and inner value are merged into one leaf.
/// Groups and leaves are ordered largest first.
pub fn build_hierarchy(
    view: &FilteredView<'_>,
    outer_field: Field,
    inner_field: Field,
    value_field: Field,
    shape: HierarchyShape,
) -> Result<HierarchyChart, DashboardError> {
    let outer_totals = aggregate_by_group(view, outer_field, value_field)?;
    let ranked = top_k(&outer_totals, outer_totals.len());

    let mut leaves: HashMap<String, Vec<HierarchyLeaf>> = HashMap::new();
    for row in view.iter() {
        let outer = row.value(outer_field).group_key();
        let inner = row.value(inner_field).group_key();
        let value = row.value(value_field).as_number().unwrap_or_default();

        let children = leaves.entry(outer).or_default();
        match children.iter_mut().find(|leaf| leaf.label == inner) {
            Some(leaf) => leaf.value += value,
            None => children.push(HierarchyLeaf { label: inner, value }),
        }
    }

    let groups = ranked
        .entries
        .into_iter()
        .map(|entry| {
            let mut children = leaves.remove(&entry.key).unwrap_or_default();
            children.sort_by(|a, b| b.value.total_cmp(&a.value));
            HierarchyGroup {
                label: entry.key,
                value: entry.total,
                children,
            }
        })
        .collect();

    Ok(HierarchyChart {
        shape,
        outer: outer_field,
        inner: inner_field,
        value: Axis::new(value_field),
        groups,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::tests::song;
    use crate::data::Dataset;
    use crate::filter::filter;
    use crate::selection::Selection;

    fn dataset() -> Dataset {
        let mut long = song("A", "S1", "pop", 2000, 100.0, 10);
        long.duration_ms = 240_000;
        Dataset::new(vec![
            long,
            song("B", "S2", "rock", 2010, 120.0, 5),
            song("A", "S3", "pop", 2005, 90.0, 7),
            song("A", "S1", "pop", 2012, 90.0, 1),
        ])
        .unwrap()
    }

    #[test]
    fn test_scatter_converts_duration_to_seconds() {
        let dataset = dataset();
        let view = filter(&dataset, &Selection::default());
        let chart = build_scatter(&view, Field::Year, Field::DurationMs).unwrap();
        assert_eq!(chart.points.len(), 4);
        assert_eq!(chart.points[0].x, 2000.0);
        assert_eq!(chart.points[0].y, 240.0);
        assert_eq!(chart.points[0].song, "S1");
        assert_eq!(chart.points[0].artist, "A");
        assert_eq!(chart.y.label, "Duração (segundos)");
        assert_eq!(chart.x.label, "year");
    }

    #[test]
    fn test_repeated_scatter_does_not_compound() {
        let dataset = dataset();
        let view = filter(&dataset, &Selection::default());
        let first = build_scatter(&view, Field::Year, Field::DurationMs).unwrap();
        let second = build_scatter(&view, Field::Year, Field::DurationMs).unwrap();
        assert_eq!(first, second);
        assert_eq!(dataset.records()[0].duration_ms, 240_000);
        assert_eq!(view.rows()[0].duration_ms, 240_000);
    }

    #[test]
    fn test_scatter_labels_profile_axes() {
        let dataset = dataset();
        let view = filter(&dataset, &Selection::default());
        let chart = build_scatter(&view, Field::Energy, Field::Loudness).unwrap();
        assert_eq!(chart.x.label, "Energia");
        assert_eq!(chart.y.label, "Volume");
        assert_eq!(chart.points[0].y, -5.0);
    }

    #[test]
    fn test_scatter_rejects_text_axis() {
        let dataset = dataset();
        let view = filter(&dataset, &Selection::default());
        assert_eq!(
            build_scatter(&view, Field::Genre, Field::Energy),
            Err(DashboardError::NotNumeric(Field::Genre))
        );
    }

    #[test]
    fn test_ranked_bar_caps_and_sorts() {
        let dataset = dataset();
        let view = filter(&dataset, &Selection::default());
        let chart = build_ranked_bar(&view, Field::Genre, Field::Popularity, 1).unwrap();
        assert_eq!(chart.bars.len(), 1);
        assert_eq!(chart.bars[0].key, "pop");
        assert_eq!(chart.bars[0].total, 18.0);
        assert_eq!(chart.group.label, "Gênero");

        let chart = build_ranked_bar(&view, Field::Artist, Field::Popularity, 50).unwrap();
        let keys: Vec<&str> = chart.bars.iter().map(|b| b.key.as_str()).collect();
        assert_eq!(keys, vec!["A", "B"]);
    }

    #[test]
    fn test_ranked_bar_rejects_continuous_group() {
        let dataset = dataset();
        let view = filter(&dataset, &Selection::default());
        assert_eq!(
            build_ranked_bar(&view, Field::DurationMs, Field::Popularity, 50),
            Err(DashboardError::NotCategorical(Field::DurationMs))
        );
        assert!(build_ranked_bar(&view, Field::Year, Field::Popularity, 50).is_ok());
    }

    #[test]
    fn test_hierarchy_merges_duplicate_paths() {
        let dataset = dataset();
        let view = filter(&dataset, &Selection::default());
        let chart = build_hierarchy(
            &view,
            Field::Artist,
            Field::Song,
            Field::Popularity,
            HierarchyShape::Treemap,
        )
        .unwrap();
        assert_eq!(chart.shape, HierarchyShape::Treemap);
        assert_eq!(chart.groups.len(), 2);

        let a = &chart.groups[0];
        assert_eq!(a.label, "A");
        assert_eq!(a.value, 18.0);
        assert_eq!(
            a.children,
            vec![
                HierarchyLeaf { label: "S1".to_string(), value: 11.0 },
                HierarchyLeaf { label: "S3".to_string(), value: 7.0 },
            ]
        );
        let child_sum: f64 = a.children.iter().map(|c| c.value).sum();
        assert_eq!(child_sum, a.value);
    }

    #[test]
    fn test_shape_does_not_change_data() {
        let dataset = dataset();
        let view = filter(&dataset, &Selection::default());
        let sunburst =
            build_hierarchy(&view, Field::Artist, Field::Song, Field::Popularity, HierarchyShape::Sunburst)
                .unwrap();
        let treemap =
            build_hierarchy(&view, Field::Artist, Field::Song, Field::Popularity, HierarchyShape::Treemap)
                .unwrap();
        assert_eq!(sunburst.groups, treemap.groups);
    }

    #[test]
    fn test_empty_view_builds_empty_charts() {
        let dataset = dataset();
        let view = filter(&dataset, &Selection::default().with_genres(["jazz"]));
        let scatter = build_scatter(&view, Field::Year, Field::Energy).unwrap();
        let bar = build_ranked_bar(&view, Field::Genre, Field::Popularity, 50).unwrap();
        let tree =
            build_hierarchy(&view, Field::Artist, Field::Song, Field::Popularity, HierarchyShape::Sunburst)
                .unwrap();
        assert!(Chart::Scatter(scatter).is_empty());
        assert!(Chart::RankedBar(bar).is_empty());
        assert!(Chart::Hierarchy(tree).is_empty());
    }

    #[test]
    fn test_parse_shape() {
        assert_eq!("Treemap".parse::<HierarchyShape>().unwrap(), HierarchyShape::Treemap);
        assert_eq!("sunburst".parse::<HierarchyShape>().unwrap(), HierarchyShape::Sunburst);
        assert!("pie".parse::<HierarchyShape>().is_err());
    }
}
