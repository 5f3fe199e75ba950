//! Range-keyed scope
//!
//! An [`IntervalConfig`] maps half-open integer ranges to values and behaves
//! as a piecewise-constant function: assignments "paint" a window, replacing
//! whatever covered it and splitting intervals that straddle its edges.
//!
//! Lookup dispatch by key shape:
//!
//! | key                      | result                                         |
//! |--------------------------|------------------------------------------------|
//! | `Name("b-e")`            | decoded as a label, then as `Range(b, e)`      |
//! | `Point(i)`               | value of the first interval covering `i`       |
//! | `Range(b, e)`            | the single overlapping value, else a list      |
//! | `Points([..])`           | list of point lookups                          |
//! | `Span` without step      | clipped segments within the window             |
//! | `Span` with step, `Stepped` | list of point lookups along the steps       |

use crate::context::label::{self, Label};
use crate::context::{resolves, Context, Scope, Scoped};
use crate::index::{EntryId, Interval, IntervalIndex};
use crate::types::{ConfigError, ConfigValue, Key, Result, Segment, Span};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use tracing::{debug, trace};

/// Sorted `(begin, end, value)` triples; the persistence format of an
/// interval config
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot(pub Vec<(i64, i64, ConfigValue)>);

impl Snapshot {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct IntervalConfig {
    index: IntervalIndex<ConfigValue>,
    scope: Scope,
}

impl IntervalConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from explicit triples, stored verbatim (overlaps are kept)
    pub fn from_intervals<V, I>(intervals: I) -> Result<Self>
    where
        V: Into<ConfigValue>,
        I: IntoIterator<Item = (i64, i64, V)>,
    {
        let mut index = IntervalIndex::new();
        for (begin, end, value) in intervals {
            check_window(begin, end)?;
            index.insert(begin, end, value.into());
        }
        Ok(Self {
            index,
            scope: Scope::root(),
        })
    }

    pub fn from_snapshot(snapshot: Snapshot) -> Result<Self> {
        Self::from_intervals(snapshot.0)
    }

    /// Paint each labelled range in iteration order; later entries win where
    /// ranges overlap.
    pub fn from_label_map<S, V, I>(entries: I) -> Result<Self>
    where
        S: AsRef<str>,
        V: Into<ConfigValue>,
        I: IntoIterator<Item = (S, V)>,
    {
        let mut config = Self::new();
        for (text, value) in entries {
            let (begin, end) = label::decode(text.as_ref())?;
            config.paint(begin, end, value.into())?;
        }
        Ok(config)
    }

    /// Label tables carry no meaningful order, so entries are painted by
    /// ascending `(begin, end)`.
    pub(crate) fn from_json_table(table: Map<String, Value>) -> Result<Self> {
        let mut entries = table
            .into_iter()
            .map(|(text, value)| -> Result<(Label, ConfigValue)> {
                Ok((text.parse::<Label>()?, ConfigValue::from_json(value)?))
            })
            .collect::<Result<Vec<_>>>()?;
        entries.sort_by_key(|(label, _)| *label);

        let mut config = Self::new();
        for (label, value) in entries {
            config.paint(label.begin, label.end, value)?;
        }
        Ok(config)
    }

    /// Lowest begin currently stored
    pub fn start(&self) -> Option<i64> {
        self.index.begin()
    }

    /// Highest end currently stored
    pub fn end(&self) -> Option<i64> {
        self.index.end()
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Value of the first interval covering `point`
    pub fn value_at(&self, point: i64) -> Result<ConfigValue> {
        let id = self
            .index
            .covering(point)
            .first()
            .copied()
            .ok_or_else(|| ConfigError::NotFound(point.to_string()))?;
        trace!("Point {} resolved to [{}, {})", point, id.begin, id.end);
        self.index
            .get(&id)
            .cloned()
            .ok_or_else(|| ConfigError::NotFound(point.to_string()))
    }

    pub fn values_at<I: IntoIterator<Item = i64>>(&self, points: I) -> Result<Vec<ConfigValue>> {
        points.into_iter().map(|p| self.value_at(p)).collect()
    }

    /// Every interval overlapping `[begin, end)`, clipped to the window
    pub fn overlap(&self, begin: i64, end: i64) -> Vec<Segment> {
        self.index
            .overlapping(begin, end)
            .into_iter()
            .filter_map(|id| {
                self.index.get(&id).map(|value| Segment {
                    begin: id.begin.max(begin),
                    end: id.end.min(end),
                    value: value.clone(),
                })
            })
            .collect()
    }

    /// The value overlapping `[begin, end)` when there is exactly one,
    /// otherwise the list of overlapping values ordered by start
    pub fn overlap_content(&self, begin: i64, end: i64) -> ConfigValue {
        let mut values: Vec<ConfigValue> = self
            .index
            .overlapping(begin, end)
            .iter()
            .filter_map(|id| self.index.get(id).cloned())
            .collect();
        if values.len() == 1 {
            values.remove(0)
        } else {
            ConfigValue::List(values)
        }
    }

    /// Replace all coverage of `[begin, end)` with `value`
    pub fn paint(&mut self, begin: i64, end: i64, value: ConfigValue) -> Result<()> {
        check_window(begin, end)?;
        let replaced = self.index.chop(begin, end);
        self.index.insert(begin, end, value);
        debug!("Painted [{}, {}), replacing {} interval(s)", begin, end, replaced);
        Ok(())
    }

    /// Paint consecutive `step`-wide windows of `[begin, end)` with successive
    /// values. The last window is clipped to `end`.
    ///
    /// The value count is checked before anything is painted, so a short list
    /// leaves the config untouched.
    pub fn paint_stepped(
        &mut self,
        begin: i64,
        end: i64,
        step: i64,
        values: Vec<ConfigValue>,
    ) -> Result<()> {
        let key = Key::Stepped { begin, end, step };
        check_window(begin, end)?;
        let starts = step_starts(begin, end, step, &key)?;
        let windows = window_count(begin, end, step);
        if (values.len() as i128) < windows {
            return Err(ConfigError::LengthMismatch {
                key: key.to_string(),
                expected: usize::try_from(windows).unwrap_or(usize::MAX),
                actual: values.len(),
            });
        }

        for (lo, value) in starts.zip(values) {
            self.paint(lo, lo.saturating_add(step).min(end), value)?;
        }
        Ok(())
    }

    /// Remove all coverage of `[begin, end)`, leaving a gap
    pub fn chop(&mut self, begin: i64, end: i64) -> Result<usize> {
        check_window(begin, end)?;
        let touched = self.index.chop(begin, end);
        debug!("Chopped [{}, {}), touching {} interval(s)", begin, end, touched);
        Ok(touched)
    }

    /// Assign a value to the range named by `label`
    pub fn add_group(&mut self, label: &str, value: impl Into<ConfigValue>) -> Result<()> {
        self.configure(&Key::name(label), value.into())
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot(
            self.index
                .intervals()
                .into_iter()
                .map(|iv| (iv.begin, iv.end, iv.value))
                .collect(),
        )
    }

    /// Replace the stored intervals with `snapshot`, verbatim
    pub fn restore(&mut self, snapshot: Snapshot) -> Result<()> {
        let restored = Self::from_snapshot(snapshot)?;
        self.index = restored.index;
        Ok(())
    }

    pub fn intervals(&self) -> Vec<Interval<ConfigValue>> {
        self.index.intervals()
    }

    pub fn values(&self) -> Vec<ConfigValue> {
        self.index.iter().map(|(_, value)| value.clone()).collect()
    }

    pub fn labels(&self) -> Vec<String> {
        self.index
            .iter()
            .map(|(id, _)| label::encode(id.begin, id.end))
            .collect()
    }

    pub fn to_label_map(&self) -> Vec<(String, ConfigValue)> {
        self.index
            .iter()
            .map(|(id, value)| (label::encode(id.begin, id.end), value.clone()))
            .collect()
    }

    /// Fill in missing span bounds from the current extent (0 when empty)
    fn window(&self, span: &Span) -> (i64, i64) {
        let begin = span.start.unwrap_or_else(|| self.start().unwrap_or(0));
        let end = span.stop.unwrap_or_else(|| self.end().unwrap_or(0));
        (begin, end)
    }

    fn stepped_values(&self, begin: i64, end: i64, step: i64, key: &Key) -> Result<ConfigValue> {
        let points = step_starts(begin, end, step, key)?;
        Ok(ConfigValue::List(self.values_at(points)?))
    }

    /// The single stored interval a key refers to, for nested writes
    fn entry_for(&self, key: &Key) -> Result<EntryId> {
        let (begin, end) = match key {
            Key::Point(point) => {
                return self
                    .index
                    .covering(*point)
                    .first()
                    .copied()
                    .ok_or_else(|| ConfigError::NotFound(point.to_string()));
            }
            Key::Name(text) => label::decode(text)?,
            Key::Range(begin, end) => (*begin, *end),
            other => {
                return Err(ConfigError::invalid_key(
                    other,
                    "nested access needs a point, a label or a (begin, end) range",
                ))
            }
        };

        match self.index.overlapping(begin, end).as_slice() {
            [id] => Ok(*id),
            [] => Err(ConfigError::NotFound(key.to_string())),
            hits => Err(ConfigError::invalid_key(
                key,
                format!("range overlaps {} intervals, expected exactly one", hits.len()),
            )),
        }
    }
}

fn check_window(begin: i64, end: i64) -> Result<()> {
    if begin >= end {
        return Err(ConfigError::invalid_key(
            Key::Range(begin, end),
            "begin must be below end",
        ));
    }
    Ok(())
}

/// `begin, begin + step, ... < end`, yielded lazily
fn step_starts(begin: i64, end: i64, step: i64, key: &Key) -> Result<impl Iterator<Item = i64>> {
    if step <= 0 {
        return Err(ConfigError::invalid_key(key, "step must be positive"));
    }
    let stride = usize::try_from(step)
        .map_err(|_| ConfigError::invalid_key(key, "step is too large for this platform"))?;
    Ok((begin..end).step_by(stride))
}

/// Number of `step`-wide windows in `[begin, end)`, the last one clipped
fn window_count(begin: i64, end: i64, step: i64) -> i128 {
    let width = end as i128 - begin as i128;
    if width <= 0 {
        return 0;
    }
    (width + step as i128 - 1) / step as i128
}

impl PartialEq for IntervalConfig {
    fn eq(&self, other: &Self) -> bool {
        self.snapshot() == other.snapshot()
    }
}

impl Serialize for IntervalConfig {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.snapshot().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for IntervalConfig {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let snapshot = Snapshot::deserialize(deserializer)?;
        IntervalConfig::from_snapshot(snapshot).map_err(serde::de::Error::custom)
    }
}

impl Scoped for IntervalConfig {
    fn with_parent(scope: Scope) -> Self {
        Self {
            index: IntervalIndex::new(),
            scope,
        }
    }
}

impl Context for IntervalConfig {
    fn lookup(&self, key: &Key) -> Result<ConfigValue> {
        match key {
            Key::Name(text) => {
                let (begin, end) = label::decode(text)?;
                Ok(self.overlap_content(begin, end))
            }
            Key::Point(point) => self.value_at(*point),
            Key::Range(begin, end) => Ok(self.overlap_content(*begin, *end)),
            Key::Points(points) => Ok(ConfigValue::List(self.values_at(points.iter().copied())?)),
            Key::Span(span) => {
                let (begin, end) = self.window(span);
                match span.step {
                    None => Ok(ConfigValue::Segments(self.overlap(begin, end))),
                    Some(step) => self.stepped_values(begin, end, step, key),
                }
            }
            Key::Stepped { begin, end, step } => self.stepped_values(*begin, *end, *step, key),
        }
    }

    fn configure(&mut self, key: &Key, value: ConfigValue) -> Result<()> {
        let (begin, end, step) = match key {
            Key::Name(text) => {
                let (begin, end) = label::decode(text)?;
                (begin, end, None)
            }
            Key::Range(begin, end) => (*begin, *end, None),
            Key::Stepped { begin, end, step } => (*begin, *end, Some(*step)),
            Key::Span(span) => {
                let (begin, end) = self.window(span);
                (begin, end, span.step)
            }
            Key::Point(_) | Key::Points(_) => {
                return Err(ConfigError::invalid_key(
                    key,
                    "intervals are assigned with a span, (begin, end) or (begin, end, step)",
                ))
            }
        };

        match step {
            None => self.paint(begin, end, value),
            Some(step) => {
                let values = value.into_list(&key.to_string())?;
                self.paint_stepped(begin, end, step, values)
            }
        }
    }

    fn remove(&mut self, key: &Key) -> Result<()> {
        let (begin, end) = match key {
            Key::Name(text) => label::decode(text)?,
            Key::Range(begin, end) => (*begin, *end),
            Key::Span(span) if span.step.is_none() => self.window(span),
            other => {
                return Err(ConfigError::invalid_key(
                    other,
                    "intervals are deleted with a label, (begin, end) or a step-less span",
                ))
            }
        };
        self.chop(begin, end).map(|_| ())
    }

    fn lookup_mut(&mut self, key: &Key) -> Result<&mut ConfigValue> {
        let id = self.entry_for(key)?;
        self.index
            .get_mut(&id)
            .ok_or_else(|| ConfigError::NotFound(key.to_string()))
    }

    fn local_keys(&self) -> Vec<Key> {
        self.index
            .iter()
            .map(|(id, _)| Key::Range(id.begin, id.end))
            .collect()
    }

    fn has_local(&self, key: &Key) -> bool {
        self.entry_for(key).is_ok()
    }

    /// Range-shaped keys count only when something overlaps the window
    fn contains_key(&self, key: &Key) -> Result<bool> {
        let window = match key {
            Key::Name(text) => Some(label::decode(text)?),
            Key::Range(begin, end) => Some((*begin, *end)),
            Key::Span(span) if span.step.is_none() => Some(self.window(span)),
            _ => None,
        };
        match window {
            Some((begin, end)) => Ok(!self.index.overlapping(begin, end).is_empty()),
            None => resolves(self.lookup(key)),
        }
    }

    fn items(&self) -> Result<Vec<(Key, ConfigValue)>> {
        Ok(self
            .index
            .iter()
            .map(|(id, value)| (Key::Range(id.begin, id.end), value.clone()))
            .collect())
    }

    fn scope(&self) -> &Scope {
        &self.scope
    }

    fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}
