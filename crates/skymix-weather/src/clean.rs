//! Turns decorated provider values ("11.0 ", "87%", "12°") into numbers.

use crate::error::ParseError;
use crate::types::RawValue;

/// Decoration allowed around a number, besides whitespace.
const DECORATION: [char; 2] = ['°', '%'];

/// Strip decoration from both ends of `raw` and parse the remainder.
pub fn clean(raw: &RawValue) -> Result<f64, ParseError> {
    let value = match raw {
        RawValue::Number(n) => *n,
        RawValue::Text(s) => parse_decorated(s)?,
    };

    if value.is_finite() {
        Ok(value)
    } else {
        Err(ParseError::OutOfRange(value))
    }
}

fn parse_decorated(text: &str) -> Result<f64, ParseError> {
    let stripped = text.trim_matches(|c: char| c.is_whitespace() || DECORATION.contains(&c));

    if stripped.is_empty() {
        return Err(ParseError::Empty);
    }

    // f64::from_str also accepts "inf" and "NaN"; only plain decimals count here
    let plain = stripped
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E'));
    if !plain {
        return Err(ParseError::NotANumber(text.to_string()));
    }

    stripped
        .parse::<f64>()
        .map_err(|_| ParseError::NotANumber(text.to_string()))
}
