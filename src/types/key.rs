//! Key shapes accepted by configuration scopes
//!
//! Every key is decoded once into [`Key`] at the boundary and then matched
//! exhaustively by the scope that receives it.

use crate::types::ConfigError;
use std::fmt;
use std::ops::{Bound, RangeBounds};
use std::str::FromStr;

/// A single segment of a key path
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Key {
    /// A name in dict scopes, a `"begin-end"` label in interval scopes
    Name(String),
    Point(i64),
    /// Half-open `[begin, end)`
    Range(i64, i64),
    Stepped { begin: i64, end: i64, step: i64 },
    Span(Span),
    Points(Vec<i64>),
}

/// A range descriptor whose bounds default to the scope's current extent
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Span {
    pub start: Option<i64>,
    pub stop: Option<i64>,
    pub step: Option<i64>,
}

impl Span {
    pub fn new(start: Option<i64>, stop: Option<i64>, step: Option<i64>) -> Self {
        Self { start, stop, step }
    }

    /// Build a step-less span from Rust range syntax (`..`, `3..`, `..10`, `3..=9`)
    pub fn from_bounds<R: RangeBounds<i64>>(range: R) -> Self {
        let start = match range.start_bound() {
            Bound::Included(&s) => Some(s),
            Bound::Excluded(&s) => Some(s.saturating_add(1)),
            Bound::Unbounded => None,
        };
        let stop = match range.end_bound() {
            Bound::Included(&e) => Some(e.saturating_add(1)),
            Bound::Excluded(&e) => Some(e),
            Bound::Unbounded => None,
        };
        Self {
            start,
            stop,
            step: None,
        }
    }

    pub fn with_step(mut self, step: i64) -> Self {
        self.step = Some(step);
        self
    }
}

impl Key {
    pub fn name(name: impl Into<String>) -> Self {
        Key::Name(name.into())
    }

    pub fn span<R: RangeBounds<i64>>(range: R) -> Self {
        Key::Span(Span::from_bounds(range))
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(start) = self.start {
            write!(f, "{}", start)?;
        }
        f.write_str(":")?;
        if let Some(stop) = self.stop {
            write!(f, "{}", stop)?;
        }
        if let Some(step) = self.step {
            write!(f, ":{}", step)?;
        }
        Ok(())
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Name(name) => f.write_str(name),
            Key::Point(i) => write!(f, "{}", i),
            Key::Range(begin, end) => write!(f, "({}, {})", begin, end),
            Key::Stepped { begin, end, step } => write!(f, "({}, {}, {})", begin, end, step),
            Key::Span(span) => write!(f, "{}", span),
            Key::Points(points) => {
                let joined: Vec<String> = points.iter().map(|p| p.to_string()).collect();
                write!(f, "[{}]", joined.join(", "))
            }
        }
    }
}

/// Render a key path for diagnostics, e.g. `(ranges, 5)`
pub fn display_path(path: &[Key]) -> String {
    let parts: Vec<String> = path.iter().map(|k| k.to_string()).collect();
    format!("({})", parts.join(", "))
}

fn parse_bound(token: &str, part: &str) -> Result<Option<i64>, ConfigError> {
    if part.is_empty() {
        return Ok(None);
    }
    part.parse::<i64>()
        .map(Some)
        .map_err(|e| ConfigError::invalid_key(token, format!("bad span bound '{}': {}", part, e)))
}

/// Parses command-line key tokens.
///
/// `5` is a point, `a:b` or `a:b:c` a span (bounds optional), `1,2,3` a list of
/// points. Anything else is a name, which interval scopes decode as a label.
impl FromStr for Key {
    type Err = ConfigError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        if let Ok(point) = token.parse::<i64>() {
            return Ok(Key::Point(point));
        }

        if token.contains(':') {
            let parts: Vec<&str> = token.split(':').collect();
            if parts.len() > 3 {
                return Err(ConfigError::invalid_key(
                    token,
                    "a span has at most start:stop:step",
                ));
            }
            let start = parse_bound(token, parts[0])?;
            let stop = parse_bound(token, parts[1])?;
            let step = match parts.get(2) {
                Some(part) => parse_bound(token, part)?,
                None => None,
            };
            return Ok(Key::Span(Span::new(start, stop, step)));
        }

        if token.contains(',') {
            let points = token
                .split(',')
                .map(|p| p.trim().parse::<i64>())
                .collect::<Result<Vec<_>, _>>();
            if let Ok(points) = points {
                return Ok(Key::Points(points));
            }
        }

        Ok(Key::Name(token.to_string()))
    }
}

impl From<&str> for Key {
    fn from(name: &str) -> Self {
        Key::Name(name.to_string())
    }
}

impl From<String> for Key {
    fn from(name: String) -> Self {
        Key::Name(name)
    }
}

impl From<i64> for Key {
    fn from(point: i64) -> Self {
        Key::Point(point)
    }
}

impl From<(i64, i64)> for Key {
    fn from((begin, end): (i64, i64)) -> Self {
        Key::Range(begin, end)
    }
}

impl From<(i64, i64, i64)> for Key {
    fn from((begin, end, step): (i64, i64, i64)) -> Self {
        Key::Stepped { begin, end, step }
    }
}

impl From<Vec<i64>> for Key {
    fn from(points: Vec<i64>) -> Self {
        Key::Points(points)
    }
}

impl From<Span> for Key {
    fn from(span: Span) -> Self {
        Key::Span(span)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_from_bounds() {
        assert_eq!(Span::from_bounds(..), Span::new(None, None, None));
        assert_eq!(Span::from_bounds(3..), Span::new(Some(3), None, None));
        assert_eq!(Span::from_bounds(..10), Span::new(None, Some(10), None));
        assert_eq!(Span::from_bounds(3..=9), Span::new(Some(3), Some(10), None));
    }

    #[test]
    fn test_parse_cli_tokens() {
        assert_eq!("5".parse::<Key>().unwrap(), Key::Point(5));
        assert_eq!("-5".parse::<Key>().unwrap(), Key::Point(-5));
        assert_eq!(
            "0:9:3".parse::<Key>().unwrap(),
            Key::Span(Span::new(Some(0), Some(9), Some(3)))
        );
        assert_eq!(
            ":10".parse::<Key>().unwrap(),
            Key::Span(Span::new(None, Some(10), None))
        );
        assert_eq!("1,2,3".parse::<Key>().unwrap(), Key::Points(vec![1, 2, 3]));
        assert_eq!("0-10".parse::<Key>().unwrap(), Key::name("0-10"));
        assert_eq!("ranges".parse::<Key>().unwrap(), Key::name("ranges"));
    }

    #[test]
    fn test_parse_rejects_bad_span() {
        assert!("1:x".parse::<Key>().is_err());
        assert!("1:2:3:4".parse::<Key>().is_err());
    }

    #[test]
    fn test_display_path() {
        let path = vec![Key::name("ranges"), Key::Range(0, 10)];
        assert_eq!(display_path(&path), "(ranges, (0, 10))");
        assert_eq!(Key::Span(Span::new(Some(0), None, Some(2))).to_string(), "0::2");
    }
}
