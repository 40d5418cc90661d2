// Selection expression parser: clause | clause | ...

use super::ast::{Bounds, Clause};
use super::lexer::ws;
use super::selection::parse_clause;
use crate::error::DashboardError;
use crate::selection::{Filter, Selection};
use nom::{
    bytes::complete::tag,
    combinator::eof,
    multi::separated_list0,
    IResult,
};

/// Parse the clause list of a complete expression
pub fn parse_clauses(input: &str) -> IResult<&str, Vec<Clause>> {
    let (input, clauses) = separated_list0(ws(tag("|")), parse_clause)(input)?;
    let (input, _) = ws(eof)(input)?;
    Ok((input, clauses))
}

/// Parse an expression into a selection that starts unrestricted.
pub fn parse_selection(input: &str) -> Result<Selection, DashboardError> {
    apply_selection(Selection::default(), input)
}

/// Parse an expression and apply its clauses on top of `base`.
///
/// Later clauses override earlier ones; omitted clauses keep `base`'s value.
pub fn apply_selection(base: Selection, input: &str) -> Result<Selection, DashboardError> {
    let clauses = match parse_clauses(input) {
        Ok((_, clauses)) => clauses,
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => {
            return Err(DashboardError::InvalidSelection(format!(
                "unexpected input at '{}'",
                snippet(e.input)
            )));
        }
        Err(nom::Err::Incomplete(_)) => {
            return Err(DashboardError::InvalidSelection(
                "incomplete expression".to_string(),
            ));
        }
    };

    let mut selection = base;
    for clause in clauses {
        match clause {
            Clause::Artists(values) => selection.artists = Filter::from_values(values),
            Clause::Genres(values) => selection.genres = Filter::from_values(values),
            Clause::Songs(values) => selection.songs = Filter::from_values(values),
            Clause::Years(bounds) => {
                let min = year_bound(bounds.min)?.unwrap_or(i32::MIN);
                let max = year_bound(bounds.max)?.unwrap_or(i32::MAX);
                selection.years = min..=max;
            }
            Clause::Tempo(Bounds { min, max }) => {
                selection.tempo =
                    min.unwrap_or(f64::NEG_INFINITY)..=max.unwrap_or(f64::INFINITY);
            }
        }
    }
    Ok(selection)
}

fn year_bound(value: Option<f64>) -> Result<Option<i32>, DashboardError> {
    match value {
        None => Ok(None),
        Some(v) if v.fract() == 0.0 && v >= i32::MIN as f64 && v <= i32::MAX as f64 => {
            Ok(Some(v as i32))
        }
        Some(v) => Err(DashboardError::InvalidSelection(format!(
            "year bound {} is not a whole year",
            v
        ))),
    }
}

fn snippet(input: &str) -> String {
    let trimmed = input.trim_start();
    if trimmed.is_empty() {
        return "end of input".to_string();
    }
    trimmed.chars().take(24).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_expression_is_unrestricted() {
        assert_eq!(parse_selection("").unwrap(), Selection::default());
        assert_eq!(parse_selection("   ").unwrap(), Selection::default());
    }

    #[test]
    fn test_full_expression() {
        let selection = parse_selection(
            r#"artist("Eminem", "Drake") | genre("pop") | song("Lose Yourself") | year(2005..2015) | tempo(90..140.5)"#,
        )
        .unwrap();
        assert_eq!(selection.artists, Filter::from_values(["Eminem", "Drake"]));
        assert_eq!(selection.genres, Filter::from_values(["pop"]));
        assert_eq!(selection.songs, Filter::from_values(["Lose Yourself"]));
        assert_eq!(selection.years, 2005..=2015);
        assert_eq!(selection.tempo, 90.0..=140.5);
    }

    #[test]
    fn test_open_bounds() {
        let selection = parse_selection("year(..2010) | tempo(120..)").unwrap();
        assert_eq!(selection.years, i32::MIN..=2010);
        assert_eq!(selection.tempo, 120.0..=f64::INFINITY);
    }

    #[test]
    fn test_empty_clause_means_all() {
        let selection = parse_selection("artist()").unwrap();
        assert!(selection.artists.is_unrestricted());
    }

    #[test]
    fn test_later_clause_wins() {
        let selection = parse_selection(r#"genre("pop") | genre("rock")"#).unwrap();
        assert_eq!(selection.genres, Filter::from_values(["rock"]));
    }

    #[test]
    fn test_apply_keeps_base_values() {
        let base = Selection::default().with_years(1998..=2020);
        let selection = apply_selection(base, r#"artist("Eminem")"#).unwrap();
        assert_eq!(selection.years, 1998..=2020);
    }

    #[test]
    fn test_trailing_garbage_is_rejected() {
        let err = parse_selection(r#"artist("Eminem") | nonsense"#).unwrap_err();
        match err {
            DashboardError::InvalidSelection(msg) => assert!(msg.contains("|"), "{}", msg),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_fractional_year_is_rejected() {
        assert!(matches!(
            parse_selection("year(2000.5..2010)"),
            Err(DashboardError::InvalidSelection(_))
        ));
    }
}
