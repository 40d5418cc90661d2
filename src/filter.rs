use serde::Serialize;
use std::collections::HashSet;

use crate::data::{Dataset, Record};
use crate::field::Field;
use crate::selection::Selection;

/// Rows of a dataset that passed a selection, in dataset order.
///
/// The view borrows its rows; nothing derived from it can write back into
/// the dataset.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct FilteredView<'a> {
    rows: Vec<&'a Record>,
}

impl<'a> FilteredView<'a> {
    pub fn new(rows: Vec<&'a Record>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[&'a Record] {
        &self.rows
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a Record> + '_ {
        self.rows.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Does a single record satisfy every clause of the selection?
pub fn matches(record: &Record, selection: &Selection) -> bool {
    selection.artists.admits(&record.artist)
        && selection.songs.admits(&record.song)
        && selection.years.contains(&record.year)
        && selection.genres.admits(&record.genre)
        && selection.tempo.contains(&record.tempo)
}

/// Apply a selection to the dataset.
pub fn filter<'a>(dataset: &'a Dataset, selection: &Selection) -> FilteredView<'a> {
    let rows: Vec<&Record> = dataset
        .records()
        .iter()
        .filter(|r| matches(r, selection))
        .collect();
    log::debug!("Selection kept {} of {} rows", rows.len(), dataset.len());
    FilteredView::new(rows)
}

/// Keep only rows whose `field` value is one of `keys`.
pub fn restrict_to_groups<'a>(
    view: &FilteredView<'a>,
    field: Field,
    keys: &HashSet<&str>,
) -> FilteredView<'a> {
    let rows = view
        .iter()
        .filter(|r| keys.contains(r.value(field).group_key().as_str()))
        .collect();
    FilteredView::new(rows)
}
