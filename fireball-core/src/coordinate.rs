use serde::Serialize;

use crate::constants::DIRECTION_LETTERS;
use crate::error::{FireballError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    fn from_letter(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'N' => Some(Direction::North),
            'S' => Some(Direction::South),
            'E' => Some(Direction::East),
            'W' => Some(Direction::West),
            _ => None,
        }
    }
}

/// A parsed user coordinate.
///
/// `degrees` keeps the sign as typed: a trailing `S` or `W` is recorded in
/// `direction` but never negates the value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Coordinate {
    pub degrees: f64,
    pub direction: Option<Direction>,
}

/// Removes every space, then at most one trailing direction letter.
///
/// Only `' '` is removed. Tabs and other whitespace stay and make the value
/// unparseable.
pub fn strip_direction(raw: &str) -> (String, Option<Direction>) {
    let mut s: String = raw.chars().filter(|c| *c != ' ').collect();
    let direction = match s.chars().last() {
        Some(c) if DIRECTION_LETTERS.contains(&c) => {
            s.pop();
            Direction::from_letter(c)
        }
        _ => None,
    };
    (s, direction)
}

pub fn parse_degree(raw: &str) -> Result<Coordinate> {
    let (stripped, direction) = strip_direction(raw);
    if stripped.is_empty() {
        return Err(invalid(raw, "no numeric value"));
    }
    let degrees = stripped
        .parse::<f64>()
        .map_err(|_| invalid(raw, &format!("{:?} is not a number", stripped)))?;
    if !degrees.is_finite() {
        return Err(invalid(raw, "value is not finite"));
    }
    Ok(Coordinate { degrees, direction })
}

fn invalid(raw: &str, reason: &str) -> FireballError {
    FireballError::InvalidCoordinate {
        input: raw.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SF_LAT: &str = "37.7937007 N";
    const SF_LON: &str = "122.4039064 W";

    #[test]
    fn strips_spaces_and_direction() {
        let (s, dir) = strip_direction(SF_LAT);
        assert_eq!(s, "37.7937007");
        assert_eq!(dir, Some(Direction::North));

        let (s, dir) = strip_direction(" 122. 4039064w ");
        assert_eq!(s, "122.4039064");
        assert_eq!(dir, Some(Direction::West));
    }

    #[test]
    fn strips_only_one_letter() {
        let (s, dir) = strip_direction("12NN");
        assert_eq!(s, "12N");
        assert_eq!(dir, Some(Direction::North));
        assert!(parse_degree("12NN").is_err());
    }

    #[test]
    fn stripping_is_idempotent_on_plain_numbers() {
        for raw in ["37.7937007", "-12.5", "0", "180.0"] {
            let (once, _) = strip_direction(raw);
            assert_eq!(once, raw);
            let (twice, dir) = strip_direction(&once);
            assert_eq!(twice, once);
            assert_eq!(dir, None);
        }
    }

    #[test]
    fn south_and_west_keep_their_sign() {
        let c = parse_degree("33.9 S").unwrap();
        assert_eq!(c.degrees, 33.9);
        assert_eq!(c.direction, Some(Direction::South));

        let c = parse_degree(SF_LON).unwrap();
        assert_eq!(c.degrees, 122.4039064);
        assert_eq!(c.direction, Some(Direction::West));
    }

    #[test]
    fn rejects_non_numeric_and_non_finite() {
        assert!(parse_degree("").is_err());
        assert!(parse_degree("  N ").is_err());
        assert!(parse_degree("north").is_err());
        assert!(parse_degree("inf").is_err());
        assert!(parse_degree("NaN").is_err());
    }

    #[test]
    fn only_spaces_are_removed() {
        assert!(parse_degree("37\t.5").is_err());
        assert!(parse_degree("37.5\n").is_err());
        assert!(parse_degree("37.5\u{a0}N").is_err());
        assert_eq!(parse_degree(" 37 .5 N ").unwrap().degrees, 37.5);
    }
}
