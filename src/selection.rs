use serde::Serialize;
use std::collections::BTreeSet;
use std::ops::RangeInclusive;

use crate::data::Dataset;

/// A set-membership filter on one text column.
///
/// `Unrestricted` admits every row. There is no "match nothing" state:
/// building a filter from an empty collection yields `Unrestricted`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Filter {
    #[default]
    Unrestricted,
    RestrictedTo(BTreeSet<String>),
}

impl Filter {
    pub fn from_values<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let set: BTreeSet<String> = values.into_iter().map(Into::into).collect();
        if set.is_empty() {
            Filter::Unrestricted
        } else {
            Filter::RestrictedTo(set)
        }
    }

    pub fn admits(&self, value: &str) -> bool {
        match self {
            Filter::Unrestricted => true,
            Filter::RestrictedTo(set) => set.contains(value),
        }
    }

    pub fn is_unrestricted(&self) -> bool {
        matches!(self, Filter::Unrestricted)
    }
}

/// The filter values chosen by the user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Selection {
    pub artists: Filter,
    pub genres: Filter,
    pub songs: Filter,
    pub years: RangeInclusive<i32>,
    pub tempo: RangeInclusive<f64>,
}

impl Default for Selection {
    /// Admits every row of any dataset.
    fn default() -> Self {
        Self {
            artists: Filter::Unrestricted,
            genres: Filter::Unrestricted,
            songs: Filter::Unrestricted,
            years: i32::MIN..=i32::MAX,
            tempo: f64::NEG_INFINITY..=f64::INFINITY,
        }
    }
}

impl Selection {
    /// The selection a fresh dashboard starts with: no set filters and the
    /// sliders spanning the dataset's full year and tempo range.
    pub fn for_dataset(dataset: &Dataset) -> Self {
        Self {
            years: dataset.year_bounds(),
            tempo: dataset.tempo_bounds(),
            ..Self::default()
        }
    }

    pub fn with_artists<I, S>(mut self, artists: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.artists = Filter::from_values(artists);
        self
    }

    pub fn with_genres<I, S>(mut self, genres: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.genres = Filter::from_values(genres);
        self
    }

    pub fn with_songs<I, S>(mut self, songs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.songs = Filter::from_values(songs);
        self
    }

    pub fn with_years(mut self, years: RangeInclusive<i32>) -> Self {
        self.years = years;
        self
    }

    pub fn with_tempo(mut self, tempo: RangeInclusive<f64>) -> Self {
        self.tempo = tempo;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_values_mean_unrestricted() {
        let filter = Filter::from_values(Vec::<String>::new());
        assert!(filter.is_unrestricted());
        assert!(filter.admits("anything"));
    }

    #[test]
    fn test_restricted_filter_admits_members_only() {
        let filter = Filter::from_values(["pop", "rock"]);
        assert!(filter.admits("pop"));
        assert!(!filter.admits("jazz"));
        assert!(!filter.admits("Pop"));
    }

    #[test]
    fn test_builder_methods() {
        let selection = Selection::default()
            .with_artists(["Eminem"])
            .with_genres(Vec::<&str>::new())
            .with_years(2005..=2015);
        assert_eq!(selection.artists, Filter::from_values(["Eminem"]));
        assert!(selection.genres.is_unrestricted());
        assert_eq!(selection.years, 2005..=2015);
        assert!(selection.tempo.contains(&-1.0e9));
    }
}
