//! `"<begin>-<end>"` labels for range keys

use crate::types::ConfigError;
use std::fmt;
use std::str::FromStr;

/// Textual form of a half-open range key
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Label {
    pub begin: i64,
    pub end: i64,
}

impl Label {
    pub fn new(begin: i64, end: i64) -> Result<Self, ConfigError> {
        if begin >= end {
            return Err(ConfigError::invalid_key(
                format!("{}-{}", begin, end),
                "label begin must be below its end",
            ));
        }
        Ok(Self { begin, end })
    }

    pub fn bounds(&self) -> (i64, i64) {
        (self.begin, self.end)
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.begin, self.end)
    }
}

impl FromStr for Label {
    type Err = ConfigError;

    fn from_str(label: &str) -> Result<Self, Self::Err> {
        // The separator is the first '-' that isn't the sign of `begin`.
        let sep = label
            .char_indices()
            .skip(1)
            .find(|&(_, c)| c == '-')
            .map(|(i, _)| i)
            .ok_or_else(|| ConfigError::invalid_key(label, "expected '<begin>-<end>'"))?;

        let (begin, end) = (&label[..sep], &label[sep + 1..]);
        let parse = |part: &str| {
            part.parse::<i64>().map_err(|e| {
                ConfigError::invalid_key(label, format!("bad bound '{}': {}", part, e))
            })
        };
        Label::new(parse(begin)?, parse(end)?)
    }
}

pub fn encode(begin: i64, end: i64) -> String {
    format!("{}-{}", begin, end)
}

pub fn decode(label: &str) -> Result<(i64, i64), ConfigError> {
    label.parse::<Label>().map(|l| l.bounds())
}

/// Cheap check used by the loader to spot label-keyed tables
pub fn is_label(text: &str) -> bool {
    text.parse::<Label>().is_ok()
}
