// Dashboard assembly: run every section of the page for one selection

use serde::Serialize;
use std::ops::RangeInclusive;

use crate::aggregate::{aggregate_by_group, top_k, TopKSet, BAR_CAP, TOP_ARTISTS};
use crate::chart::{
    build_hierarchy, build_ranked_bar, build_scatter, HierarchyChart, HierarchyShape,
    RankedBarChart, ScatterChart,
};
use crate::data::Dataset;
use crate::error::DashboardError;
use crate::field::Field;
use crate::filter::{filter, restrict_to_groups, FilteredView};
use crate::labels::{self, BAR_PARAMETERS, PROFILE_X_AXES, PROFILE_Y_AXES, YEARS_PARAMETERS};
use crate::selection::Selection;

/// Picker values of the chart controls, as display labels.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardChoices {
    pub hierarchy_shape: HierarchyShape,
    pub years_parameter: String,
    pub profile_x: String,
    pub profile_y: String,
    pub bar_parameter: String,
}

impl Default for DashboardChoices {
    /// First option of every picker
    fn default() -> Self {
        Self {
            hierarchy_shape: HierarchyShape::Sunburst,
            years_parameter: YEARS_PARAMETERS[0].to_string(),
            profile_x: PROFILE_X_AXES[0].to_string(),
            profile_y: PROFILE_Y_AXES[0].to_string(),
            bar_parameter: BAR_PARAMETERS[0].to_string(),
        }
    }
}

/// Sizes that shape the aggregate charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardSettings {
    pub top_artists: usize,
    pub bar_cap: usize,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            top_artists: TOP_ARTISTS,
            bar_cap: BAR_CAP,
        }
    }
}

/// Every chart on the page plus the filtered table.
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard<'a> {
    pub row_count: usize,
    pub top_artists: TopKSet,
    /// Top artists and their songs
    pub popular_artists: HierarchyChart,
    /// Song profile over the years
    pub profile_over_years: ScatterChart,
    /// Correlation between profile metrics
    pub profile_correlation: ScatterChart,
    /// Popularity analysis
    pub popularity: RankedBarChart,
    pub table: FilteredView<'a>,
}

/// Build the artist → song popularity hierarchy for the top artists.
pub fn popular_artists<'a>(
    view: &FilteredView<'a>,
    top: usize,
    shape: HierarchyShape,
) -> Result<(TopKSet, HierarchyChart), DashboardError> {
    let totals = aggregate_by_group(view, Field::Artist, Field::Popularity)?;
    let top_artists = top_k(&totals, top);
    let scoped = restrict_to_groups(view, Field::Artist, &top_artists.keys());
    let chart = build_hierarchy(&scoped, Field::Artist, Field::Song, Field::Popularity, shape)?;
    Ok((top_artists, chart))
}

/// Run the whole pipeline once.
pub fn build_dashboard<'a>(
    dataset: &'a Dataset,
    selection: &Selection,
    choices: &DashboardChoices,
    settings: DashboardSettings,
) -> Result<Dashboard<'a>, DashboardError> {
    // Resolve the pickers first so a bad label fails before any work
    let years_field = labels::translate(&choices.years_parameter)?;
    let profile_x = labels::translate(&choices.profile_x)?;
    let profile_y = labels::translate(&choices.profile_y)?;
    let bar_field = labels::translate(&choices.bar_parameter)?;

    let view = filter(dataset, selection);

    let (top_artists, popular_artists) =
        popular_artists(&view, settings.top_artists, choices.hierarchy_shape)?;
    let profile_over_years = build_scatter(&view, Field::Year, years_field)?;
    let profile_correlation = build_scatter(&view, profile_x, profile_y)?;
    let popularity = build_ranked_bar(&view, bar_field, Field::Popularity, settings.bar_cap)?;

    log::info!(
        "Dashboard built over {} rows ({} top artists)",
        view.len(),
        top_artists.len()
    );

    Ok(Dashboard {
        row_count: view.len(),
        top_artists,
        popular_artists,
        profile_over_years,
        profile_correlation,
        popularity,
        table: view,
    })
}

/// Contents of every dashboard control.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardOptions {
    pub artists: Vec<String>,
    pub genres: Vec<String>,
    pub songs: Vec<String>,
    pub years: RangeInclusive<i32>,
    pub tempo: RangeInclusive<f64>,
    pub hierarchy_shapes: Vec<HierarchyShape>,
    pub years_parameters: Vec<&'static str>,
    pub profile_x_axes: Vec<&'static str>,
    pub profile_y_axes: Vec<&'static str>,
    pub bar_parameters: Vec<&'static str>,
}

pub fn dashboard_options(dataset: &Dataset) -> DashboardOptions {
    // Genres are listed shortest first
    let mut genres = dataset.distinct(Field::Genre);
    genres.sort_by(|a, b| a.chars().count().cmp(&b.chars().count()).then_with(|| a.cmp(b)));

    DashboardOptions {
        artists: dataset.distinct(Field::Artist),
        genres,
        songs: dataset.distinct(Field::Song),
        years: dataset.year_bounds(),
        tempo: dataset.tempo_bounds(),
        hierarchy_shapes: vec![HierarchyShape::Sunburst, HierarchyShape::Treemap],
        years_parameters: YEARS_PARAMETERS.to_vec(),
        profile_x_axes: PROFILE_X_AXES.to_vec(),
        profile_y_axes: PROFILE_Y_AXES.to_vec(),
        bar_parameters: BAR_PARAMETERS.to_vec(),
    }
}
