//! Raw coordinate text to numeric tuples.
//!
//! GML 2 writes `x,y x,y` (`gml:coordinates`), GML 3 writes a flat
//! `x y x y` list (`gml:pos`, `gml:posList`) whose grouping comes from the
//! declared `srsDimension`. Both end up as a list of [`Position`]s.

use crate::error::{GmlError, Result};
use crate::model::Position;
use crate::version::{CoordinateEncoding, GmlVersion};
use crate::xml::XmlElement;

pub const DEFAULT_SRS_DIMENSION: usize = 2;

/// Splits `text` using the native encoding of `version`.
///
/// Under 2.1.2 the tuple arity is whatever the commas give and
/// `srs_dimension` is ignored. Under 3.x the flat list is regrouped into
/// tuples of `srs_dimension` ordinates; a dimension of 2 yields pairs and a
/// dimension of 3 yields triples, with no further reshaping either way.
pub fn parse_coordinates(
    text: &str,
    version: GmlVersion,
    srs_dimension: usize,
) -> Result<Vec<Position>> {
    match version.coordinate_encoding() {
        CoordinateEncoding::Tuples => parse_tuples(text, &TupleSeparators::default()),
        CoordinateEncoding::Flat => parse_flat(text, srs_dimension),
    }
}

/// Separators of a `gml:coordinates` element (`decimal`, `cs`, `ts`
/// attributes). `ts` defaults to any whitespace.
#[derive(Debug, Clone, PartialEq)]
pub struct TupleSeparators {
    pub decimal: String,
    pub cs: String,
    pub ts: String,
}

impl Default for TupleSeparators {
    fn default() -> Self {
        Self {
            decimal: ".".to_string(),
            cs: ",".to_string(),
            ts: " ".to_string(),
        }
    }
}

impl TupleSeparators {
    pub fn from_element(element: &XmlElement) -> Self {
        let defaults = Self::default();
        let pick = |name: &str, fallback: String| {
            element
                .attr(name)
                .filter(|value| !value.is_empty())
                .map_or(fallback, str::to_string)
        };
        Self {
            decimal: pick("decimal", defaults.decimal),
            cs: pick("cs", defaults.cs),
            ts: pick("ts", defaults.ts),
        }
    }
}

/// `gml:coordinates` style text. Every tuple must have the same arity.
pub fn parse_tuples(text: &str, separators: &TupleSeparators) -> Result<Vec<Position>> {
    let tuples: Vec<&str> = if separators.ts.trim().is_empty() {
        text.split_whitespace().collect()
    } else {
        text.split(separators.ts.as_str())
            .map(str::trim)
            .filter(|tuple| !tuple.is_empty())
            .collect()
    };

    let mut positions: Vec<Position> = Vec::with_capacity(tuples.len());
    for tuple in tuples {
        let position = tuple
            .split(separators.cs.as_str())
            .map(|ordinate| parse_ordinate(ordinate.trim(), &separators.decimal))
            .collect::<Result<Position>>()?;

        if let Some(first) = positions.first() {
            if first.len() != position.len() {
                return Err(GmlError::MalformedCoordinates(format!(
                    "tuple '{}' has {} ordinates, expected {}",
                    tuple,
                    position.len(),
                    first.len()
                )));
            }
        }
        positions.push(position);
    }
    Ok(positions)
}

/// `gml:posList` style text grouped into tuples of `srs_dimension`.
pub fn parse_flat(text: &str, srs_dimension: usize) -> Result<Vec<Position>> {
    if srs_dimension == 0 {
        return Err(GmlError::MalformedCoordinates(
            "srsDimension must be at least 1".to_string(),
        ));
    }

    let values = parse_numbers(text)?;
    if values.len() % srs_dimension != 0 {
        return Err(GmlError::MalformedCoordinates(format!(
            "{} ordinates cannot be grouped by srsDimension {}",
            values.len(),
            srs_dimension
        )));
    }
    Ok(values
        .chunks(srs_dimension)
        .map(|chunk| chunk.to_vec())
        .collect())
}

/// A single `gml:pos`-like tuple. Its arity is the number of values unless a
/// dimension was declared, in which case it must match.
pub fn parse_position(text: &str, srs_dimension: Option<usize>) -> Result<Position> {
    let position = parse_numbers(text)?;
    if position.is_empty() {
        return Err(GmlError::MalformedCoordinates("empty position".to_string()));
    }
    match srs_dimension {
        Some(dimension) if dimension != position.len() => {
            Err(GmlError::MalformedCoordinates(format!(
                "position '{}' has {} ordinates but srsDimension is {}",
                text.trim(),
                position.len(),
                dimension
            )))
        }
        _ => Ok(position),
    }
}

/// Whitespace separated numbers.
pub fn parse_numbers(text: &str) -> Result<Vec<f64>> {
    text.split_whitespace()
        .map(|token| parse_ordinate(token, "."))
        .collect()
}

fn parse_ordinate(token: &str, decimal: &str) -> Result<f64> {
    let parsed = if decimal == "." {
        token.parse::<f64>()
    } else {
        token.replace(decimal, ".").parse::<f64>()
    };
    parsed.map_err(|_| GmlError::MalformedCoordinates(format!("'{}' is not a number", token)))
}
