// Shared token parsers

use nom::{
    branch::alt,
    bytes::complete::take_while,
    character::complete::{char, digit1, multispace0},
    combinator::{map, map_res, opt, recognize},
    sequence::{delimited, pair, tuple},
    IResult,
};

/// Surround a parser with optional whitespace
pub fn ws<'a, F, O>(inner: F) -> impl FnMut(&'a str) -> IResult<&'a str, O>
where
    F: FnMut(&'a str) -> IResult<&'a str, O>,
{
    delimited(multispace0, inner, multispace0)
}

/// A double- or single-quoted string. No escapes: song titles carry
/// apostrophes, so double quotes are the usual choice.
pub fn string_literal(input: &str) -> IResult<&str, String> {
    map(
        alt((
            delimited(char('"'), take_while(|c: char| c != '"'), char('"')),
            delimited(char('\''), take_while(|c: char| c != '\''), char('\'')),
        )),
        |s: &str| s.to_string(),
    )(input)
}

/// A decimal number. A trailing `.` is left alone so that `2005..2015`
/// reads as two numbers around a range operator.
pub fn number_literal(input: &str) -> IResult<&str, f64> {
    map_res(
        recognize(tuple((
            opt(char('-')),
            digit1,
            opt(pair(char('.'), digit1)),
        ))),
        |s: &str| s.parse::<f64>(),
    )(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_literal() {
        assert_eq!(
            string_literal("\"Don't Stop\" rest"),
            Ok((" rest", "Don't Stop".to_string()))
        );
        assert_eq!(string_literal("'pop'"), Ok(("", "pop".to_string())));
        assert!(string_literal("pop").is_err());
    }

    #[test]
    fn test_number_literal_stops_before_range() {
        assert_eq!(number_literal("2005..2015"), Ok(("..2015", 2005.0)));
        assert_eq!(number_literal("140.5)"), Ok((")", 140.5)));
        assert_eq!(number_literal("-3"), Ok(("", -3.0)));
    }
}
