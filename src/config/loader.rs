//! Configuration documents on disk
//!
//! A document is a TOML or JSON table. Tables whose keys are all
//! `"<begin>-<end>"` labels load as interval configs, every other table as a
//! dict config. Several documents can be stacked into [`Layers`], each one a
//! child scope of the document before it.

use crate::context::{shared, DictConfig, SharedContext};
use crate::types::{ConfigError, ConfigValue, Result};
use serde_json::Value;
use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Toml,
    Json,
}

impl Format {
    fn of(path: &Path) -> Result<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Ok(Format::Toml),
            Some("json") => Ok(Format::Json),
            _ => Err(ConfigError::Load(format!(
                "Unsupported document type for {} (expected .toml or .json)",
                path.display()
            ))),
        }
    }
}

fn parse_document(content: &str, format: Format) -> Result<Value> {
    Ok(match format {
        Format::Toml => {
            let table: toml::Value = toml::from_str(content)?;
            serde_json::to_value(table)?
        }
        Format::Json => serde_json::from_str(content)?,
    })
}

/// Load a document into a root dict config
pub fn load_document(path: &Path) -> Result<DictConfig> {
    let format = Format::of(path)?;
    debug!("Loading {:?} document from: {}", format, path.display());

    let content = fs::read_to_string(path)
        .map_err(|e| ConfigError::Load(format!("Failed to read {}: {}", path.display(), e)))?;
    let value = parse_document(&content, format)?;

    match ConfigValue::from_json(value)? {
        ConfigValue::Dict(dict) => Ok(dict),
        // A root made only of labels is still a named scope; keep its entries
        // as names so the file round-trips.
        ConfigValue::Ranges(ranges) => Ok(DictConfig::from_entries(ranges.to_label_map())),
        other => Err(ConfigError::type_mismatch(
            format!("table at the root of {}", path.display()),
            other.type_name(),
        )),
    }
}

/// Write the local bindings of `config` to `path`
pub fn save_document(config: &DictConfig, path: &Path) -> Result<()> {
    let format = Format::of(path)?;
    let value = config.to_json();
    let content = match format {
        Format::Toml => toml::to_string_pretty(&value)?,
        Format::Json => serde_json::to_string_pretty(&value)? + "\n",
    };
    fs::write(path, content)?;
    debug!("Saved document to: {}", path.display());
    Ok(())
}

struct Layer {
    path: PathBuf,
    scope: Rc<RefCell<DictConfig>>,
    saved: Value,
}

/// A stack of documents; later documents override earlier ones
pub struct Layers {
    layers: Vec<Layer>,
}

impl Layers {
    pub fn open<P: AsRef<Path>>(paths: &[P]) -> Result<Self> {
        if paths.is_empty() {
            return Err(ConfigError::Load("No configuration layers given".to_string()));
        }

        let mut layers: Vec<Layer> = Vec::with_capacity(paths.len());
        for path in paths {
            let path = path.as_ref();
            let mut config = load_document(path)?;
            if let Some(below) = layers.last() {
                let parent: SharedContext = below.scope.clone();
                config.attach_to(&parent);
            }
            let saved = config.to_json();
            layers.push(Layer {
                path: path.to_path_buf(),
                scope: shared(config),
                saved,
            });
        }

        info!("Loaded {} configuration layer(s)", layers.len());
        Ok(Self { layers })
    }

    /// The innermost scope; reads fall back through every layer below it
    pub fn top(&self) -> Rc<RefCell<DictConfig>> {
        // `open` rejects an empty stack
        Rc::clone(&self.layers[self.layers.len() - 1].scope)
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.layers.iter().map(|l| l.path.as_path())
    }

    /// Write back every layer whose content changed since it was loaded or
    /// last saved. Returns the paths written.
    pub fn save_changed(&mut self) -> Result<Vec<PathBuf>> {
        let mut written = Vec::new();
        for layer in &mut self.layers {
            let current = layer.scope.borrow().to_json();
            if current == layer.saved {
                continue;
            }
            save_document(&layer.scope.borrow(), &layer.path)?;
            info!("Updated layer {}", layer.path.display());
            layer.saved = current;
            written.push(layer.path.clone());
        }
        Ok(written)
    }
}

impl std::fmt::Debug for Layers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.paths()).finish()
    }
}
