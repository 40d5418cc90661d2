// Clause parsers for selection expressions
//
// Format: artist("A", "B") | genre("pop") | song("S") | year(2005..2015) | tempo(90..140.5)

use super::ast::{Bounds, Clause};
use super::lexer::{number_literal, string_literal, ws};
use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::char,
    combinator::{map, opt},
    multi::separated_list0,
    sequence::{delimited, preceded, tuple},
    IResult,
};

/// `("a", "b", ...)`, possibly empty
fn value_list(input: &str) -> IResult<&str, Vec<String>> {
    delimited(
        ws(char('(')),
        separated_list0(ws(char(',')), ws(string_literal)),
        ws(char(')')),
    )(input)
}

/// `(min..max)`, `(min..=max)`, `(..max)`, `(min..)` or `(..)`
fn bounds(input: &str) -> IResult<&str, Bounds> {
    map(
        delimited(
            ws(char('(')),
            tuple((
                opt(ws(number_literal)),
                ws(tag("..")),
                opt(char('=')),
                opt(ws(number_literal)),
            )),
            ws(char(')')),
        ),
        |(min, _, _, max)| Bounds { min, max },
    )(input)
}

pub fn parse_artist(input: &str) -> IResult<&str, Clause> {
    map(
        preceded(ws(alt((tag("artists"), tag("artist")))), value_list),
        Clause::Artists,
    )(input)
}

pub fn parse_genre(input: &str) -> IResult<&str, Clause> {
    map(
        preceded(ws(alt((tag("genres"), tag("genre")))), value_list),
        Clause::Genres,
    )(input)
}

pub fn parse_song(input: &str) -> IResult<&str, Clause> {
    map(
        preceded(ws(alt((tag("songs"), tag("song")))), value_list),
        Clause::Songs,
    )(input)
}

pub fn parse_year(input: &str) -> IResult<&str, Clause> {
    map(
        preceded(ws(alt((tag("years"), tag("year")))), bounds),
        Clause::Years,
    )(input)
}

pub fn parse_tempo(input: &str) -> IResult<&str, Clause> {
    map(preceded(ws(tag("tempo")), bounds), Clause::Tempo)(input)
}

pub fn parse_clause(input: &str) -> IResult<&str, Clause> {
    alt((parse_artist, parse_genre, parse_song, parse_year, parse_tempo))(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_artist_list() {
        let (rest, clause) = parse_artist(r#"artist("Eminem", "Drake")"#).unwrap();
        assert_eq!(rest, "");
        assert_eq!(
            clause,
            Clause::Artists(vec!["Eminem".to_string(), "Drake".to_string()])
        );
    }

    #[test]
    fn test_parse_empty_list() {
        let (_, clause) = parse_genre("genres()").unwrap();
        assert_eq!(clause, Clause::Genres(vec![]));
    }

    #[test]
    fn test_parse_bounds() {
        let (_, clause) = parse_year("year(2005..2015)").unwrap();
        assert_eq!(
            clause,
            Clause::Years(Bounds { min: Some(2005.0), max: Some(2015.0) })
        );

        let (_, clause) = parse_tempo("tempo( 90.5 ..= 140 )").unwrap();
        assert_eq!(
            clause,
            Clause::Tempo(Bounds { min: Some(90.5), max: Some(140.0) })
        );

        let (_, clause) = parse_year("year(..2010)").unwrap();
        assert_eq!(clause, Clause::Years(Bounds { min: None, max: Some(2010.0) }));

        let (_, clause) = parse_tempo("tempo(120..)").unwrap();
        assert_eq!(clause, Clause::Tempo(Bounds { min: Some(120.0), max: None }));
    }

    #[test]
    fn test_parse_clause_rejects_unknown() {
        assert!(parse_clause("album(\"x\")").is_err());
    }
}
