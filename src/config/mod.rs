//! Loading and saving configuration
//!
//! Documents are stacked into layers, lowest priority first:
//! 1. Base layers listed in the tool's settings file
//! 2. Documents given with `--layer`, in order
//!
//! Each layer is a child scope of the one before it.

mod loader;
mod settings;

pub use loader::{load_document, save_document, Layers};
pub use settings::Settings;
