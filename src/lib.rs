//! ctxconf - hierarchical, overridable configuration scopes
//!
//! Scopes come in two variants that share the [`Context`] protocol: a
//! name-keyed [`DictConfig`] that falls back through its parents, and a
//! range-keyed [`IntervalConfig`] that behaves as a piecewise-constant
//! function over the integers. Key paths descend from one scope into the
//! configs nested inside it.

pub mod config;
pub mod context;
pub mod index;
pub mod types;

pub use config::{load_document, save_document, Layers, Settings};
pub use context::{shared, subcontext, Context, DictConfig, IntervalConfig, Label, Snapshot};
pub use index::{Interval, IntervalIndex};
pub use types::{ConfigError, ConfigValue, Key, Result, Segment, Span};
