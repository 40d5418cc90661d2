use anyhow::{bail, Context, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;
use std::fs::File;
use std::io::Read;
use std::ops::RangeInclusive;
use std::path::Path;

use crate::field::{Field, FieldValue};

/// One song of the top-hits dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub artist: String,
    pub song: String,
    pub duration_ms: u64,
    #[serde(deserialize_with = "deserialize_flag")]
    pub explicit: bool,
    pub year: i32,
    pub popularity: u32,
    pub danceability: f64,
    pub energy: f64,
    pub key: i32,
    pub loudness: f64,
    pub mode: i32,
    pub speechiness: f64,
    pub acousticness: f64,
    pub instrumentalness: f64,
    pub liveness: f64,
    pub tempo: f64,
    pub genre: String,
}

impl Record {
    pub fn value(&self, field: Field) -> FieldValue<'_> {
        match field {
            Field::Artist => FieldValue::Text(&self.artist),
            Field::Song => FieldValue::Text(&self.song),
            Field::Genre => FieldValue::Text(&self.genre),
            Field::DurationMs => FieldValue::Number(self.duration_ms as f64),
            Field::Explicit => FieldValue::Number(if self.explicit { 1.0 } else { 0.0 }),
            Field::Year => FieldValue::Number(self.year as f64),
            Field::Popularity => FieldValue::Number(self.popularity as f64),
            Field::Danceability => FieldValue::Number(self.danceability),
            Field::Energy => FieldValue::Number(self.energy),
            Field::Key => FieldValue::Number(self.key as f64),
            Field::Loudness => FieldValue::Number(self.loudness),
            Field::Mode => FieldValue::Number(self.mode as f64),
            Field::Speechiness => FieldValue::Number(self.speechiness),
            Field::Acousticness => FieldValue::Number(self.acousticness),
            Field::Instrumentalness => FieldValue::Number(self.instrumentalness),
            Field::Liveness => FieldValue::Number(self.liveness),
            Field::Tempo => FieldValue::Number(self.tempo),
        }
    }
}

/// The dataset writes its flag as `True`/`False`.
fn deserialize_flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    let raw = String::deserialize(deserializer)?;
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        other => Err(serde::de::Error::custom(format!(
            "invalid explicit flag '{}'",
            other
        ))),
    }
}

/// The full, immutable table of songs.
#[derive(Debug, Clone)]
pub struct Dataset {
    records: Vec<Record>,
}

impl Dataset {
    /// Build a dataset from already-parsed records.
    pub fn new(records: Vec<Record>) -> Result<Self> {
        if records.is_empty() {
            bail!("Dataset must contain at least one data row");
        }
        Ok(Self { records })
    }

    /// Load the dataset from a CSV file.
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open dataset '{}'", path.display()))?;
        let dataset = Self::from_reader(file)
            .with_context(|| format!("Failed to load dataset '{}'", path.display()))?;
        log::info!("Loaded {} songs from {}", dataset.len(), path.display());
        Ok(dataset)
    }

    /// Parse CSV from any reader. Missing columns and bad cells are fatal.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = csv_reader
            .headers()
            .context("Failed to read CSV headers")?
            .clone();
        let missing: Vec<&str> = Field::ALL
            .iter()
            .map(|f| f.name())
            .filter(|name| !headers.iter().any(|h| h == *name))
            .collect();
        if !missing.is_empty() {
            bail!("Dataset is missing required columns: {}", missing.join(", "));
        }

        let mut records = Vec::new();
        for (idx, row) in csv_reader.deserialize::<Record>().enumerate() {
            // Header is line 1
            let record = row.with_context(|| format!("Malformed row at line {}", idx + 2))?;
            records.push(record);
        }

        Self::new(records)
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Earliest and latest release year.
    pub fn year_bounds(&self) -> RangeInclusive<i32> {
        let min = self.records.iter().map(|r| r.year).min().unwrap_or_default();
        let max = self.records.iter().map(|r| r.year).max().unwrap_or_default();
        min..=max
    }

    /// Slowest and fastest tempo.
    pub fn tempo_bounds(&self) -> RangeInclusive<f64> {
        let min = self
            .records
            .iter()
            .map(|r| r.tempo)
            .fold(f64::INFINITY, f64::min);
        let max = self
            .records
            .iter()
            .map(|r| r.tempo)
            .fold(f64::NEG_INFINITY, f64::max);
        min..=max
    }

    /// Distinct values of a text field, sorted.
    pub fn distinct(&self, field: Field) -> Vec<String> {
        let set: BTreeSet<String> = self
            .records
            .iter()
            .map(|r| r.value(field).group_key())
            .collect();
        set.into_iter().collect()
    }
}
