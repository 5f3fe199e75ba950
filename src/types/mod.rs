//! Shared key, value and error types

mod errors;
mod key;
mod value;

pub use errors::{ConfigError, Result};
pub use key::{display_path, Key, Span};
pub use value::{ConfigValue, Segment};
