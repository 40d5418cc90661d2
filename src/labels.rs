// Portuguese display labels used by the dashboard controls

use crate::error::DashboardError;
use crate::field::Field;

/// Label → field, for every option the dashboard offers.
pub const LABELS: [(&str, Field); 9] = [
    ("Gênero", Field::Genre),
    ("Duração", Field::DurationMs),
    ("Artista", Field::Artist),
    ("Dançabilidade", Field::Danceability),
    ("Energia", Field::Energy),
    ("Volume", Field::Loudness),
    ("Falação", Field::Speechiness),
    ("Acústica", Field::Acousticness),
    ("Instrumentalidade", Field::Instrumentalness),
];

/// Options of the "song profile over the years" parameter picker.
pub const YEARS_PARAMETERS: [&str; 6] = [
    "Duração",
    "Dançabilidade",
    "Energia",
    "Volume",
    "Falação",
    "Acústica",
];

/// Options of the profile-correlation X axis picker.
pub const PROFILE_X_AXES: [&str; 3] = ["Energia", "Dançabilidade", "Acústica"];

/// Options of the profile-correlation Y axis picker.
pub const PROFILE_Y_AXES: [&str; 3] = ["Volume", "Falação", "Instrumentalidade"];

/// Options of the popularity bar parameter picker.
pub const BAR_PARAMETERS: [&str; 2] = ["Gênero", "Artista"];

/// Translate a display label into the field it stands for.
pub fn translate(label: &str) -> Result<Field, DashboardError> {
    LABELS
        .iter()
        .find(|(l, _)| *l == label.trim())
        .map(|(_, f)| *f)
        .ok_or_else(|| DashboardError::Unmapped(label.to_string()))
}

/// Accept either a display label or a raw column name.
pub fn resolve_axis(input: &str) -> Result<Field, DashboardError> {
    match translate(input) {
        Ok(field) => Ok(field),
        Err(unmapped) => input.parse::<Field>().map_err(|_| unmapped),
    }
}

/// Axis title for a field. Durations are shown in seconds.
pub fn display_label(field: Field) -> String {
    match field {
        Field::DurationMs => "Duração (segundos)".to_string(),
        _ => LABELS
            .iter()
            .find(|(_, f)| *f == field)
            .map(|(l, _)| l.to_string())
            .unwrap_or_else(|| field.name().to_string()),
    }
}
