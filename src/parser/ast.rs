// Syntax tree for selection expressions

/// One `name(...)` clause of a selection expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Clause {
    Artists(Vec<String>),
    Genres(Vec<String>),
    Songs(Vec<String>),
    Years(Bounds),
    Tempo(Bounds),
}

/// An inclusive range where either side may be left open.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Bounds {
    pub min: Option<f64>,
    pub max: Option<f64>,
}
