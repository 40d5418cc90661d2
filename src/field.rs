use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::error::DashboardError;

/// A column of the songs dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    Artist,
    Song,
    DurationMs,
    Explicit,
    Year,
    Popularity,
    Danceability,
    Energy,
    Key,
    Loudness,
    Mode,
    Speechiness,
    Acousticness,
    Instrumentalness,
    Liveness,
    Tempo,
    Genre,
}

impl Field {
    /// All fields, in dataset column order.
    pub const ALL: [Field; 17] = [
        Field::Artist,
        Field::Song,
        Field::DurationMs,
        Field::Explicit,
        Field::Year,
        Field::Popularity,
        Field::Danceability,
        Field::Energy,
        Field::Key,
        Field::Loudness,
        Field::Mode,
        Field::Speechiness,
        Field::Acousticness,
        Field::Instrumentalness,
        Field::Liveness,
        Field::Tempo,
        Field::Genre,
    ];

    /// Column name as it appears in the CSV header
    pub fn name(self) -> &'static str {
        match self {
            Field::Artist => "artist",
            Field::Song => "song",
            Field::DurationMs => "duration_ms",
            Field::Explicit => "explicit",
            Field::Year => "year",
            Field::Popularity => "popularity",
            Field::Danceability => "danceability",
            Field::Energy => "energy",
            Field::Key => "key",
            Field::Loudness => "loudness",
            Field::Mode => "mode",
            Field::Speechiness => "speechiness",
            Field::Acousticness => "acousticness",
            Field::Instrumentalness => "instrumentalness",
            Field::Liveness => "liveness",
            Field::Tempo => "tempo",
            Field::Genre => "genre",
        }
    }

    pub fn is_numeric(self) -> bool {
        !matches!(self, Field::Artist | Field::Song | Field::Genre)
    }

    /// Fields whose values name a bar: the text columns and the release year.
    pub fn is_categorical(self) -> bool {
        matches!(self, Field::Artist | Field::Song | Field::Genre | Field::Year)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Field {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Field::ALL
            .iter()
            .copied()
            .find(|f| f.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| DashboardError::UnknownField(s.to_string()))
    }
}

impl Serialize for Field {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

/// A single cell read out of a record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
    Text(&'a str),
    Number(f64),
}

impl FieldValue<'_> {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            FieldValue::Text(_) => None,
        }
    }

    /// Key used when grouping rows by this value.
    ///
    /// Whole numbers drop their fractional part so that a year groups as
    /// `2001` rather than `2001.0`.
    pub fn group_key(&self) -> String {
        match self {
            FieldValue::Text(s) => (*s).to_string(),
            FieldValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => format!("{:.0}", n),
            FieldValue::Number(n) => n.to_string(),
        }
    }
}
