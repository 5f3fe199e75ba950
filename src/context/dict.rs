//! Name-keyed scope with parent fallback

use crate::context::{read_parent, Context, Scope, Scoped, SharedContext};
use crate::types::{ConfigError, ConfigValue, Key, Result};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::trace;

#[derive(Debug, Clone, Default)]
pub struct DictConfig {
    attrs: BTreeMap<String, ConfigValue>,
    scope: Scope,
}

impl DictConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries<K, V, I>(entries: I) -> Self
    where
        K: Into<String>,
        V: Into<ConfigValue>,
        I: IntoIterator<Item = (K, V)>,
    {
        Self {
            attrs: entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            scope: Scope::root(),
        }
    }

    pub(crate) fn from_json_table(table: Map<String, Value>) -> Result<Self> {
        let mut attrs = BTreeMap::new();
        for (name, value) in table {
            attrs.insert(name, ConfigValue::from_json(value)?);
        }
        Ok(Self {
            attrs,
            scope: Scope::root(),
        })
    }

    /// Make `parent` this scope's parent, replacing any previous one
    pub fn attach_to(&mut self, parent: &SharedContext) {
        self.scope = Scope::child_of(parent);
    }

    /// Local bindings only, as a JSON object
    pub fn to_json(&self) -> Value {
        Value::Object(
            self.attrs
                .iter()
                .map(|(k, v)| (k.clone(), v.to_json()))
                .collect(),
        )
    }

    /// Bind `name` locally, returning the previous local binding
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        value: impl Into<ConfigValue>,
    ) -> Option<ConfigValue> {
        self.attrs.insert(name.into(), value.into())
    }

    pub fn get_local(&self, name: &str) -> Option<&ConfigValue> {
        self.attrs.get(name)
    }

    pub fn len(&self) -> usize {
        self.attrs.len()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.attrs.keys().map(String::as_str)
    }

    fn name_of<'k>(key: &'k Key) -> Result<&'k str> {
        match key {
            Key::Name(name) => Ok(name.as_str()),
            other => Err(ConfigError::invalid_key(
                other,
                "dict configs are keyed by name",
            )),
        }
    }
}

impl PartialEq for DictConfig {
    fn eq(&self, other: &Self) -> bool {
        self.attrs == other.attrs
    }
}

impl Scoped for DictConfig {
    fn with_parent(scope: Scope) -> Self {
        Self {
            attrs: BTreeMap::new(),
            scope,
        }
    }
}

impl Context for DictConfig {
    fn lookup(&self, key: &Key) -> Result<ConfigValue> {
        let name = Self::name_of(key)?;
        if let Some(value) = self.attrs.get(name) {
            trace!("Resolved '{}' locally", name);
            return Ok(value.clone());
        }
        match self.parent() {
            Some(parent) => read_parent(&parent, |p| p.lookup(key)),
            None => Err(ConfigError::NotFound(name.to_string())),
        }
    }

    fn configure(&mut self, key: &Key, value: ConfigValue) -> Result<()> {
        let name = Self::name_of(key)?;
        self.attrs.insert(name.to_string(), value);
        Ok(())
    }

    fn remove(&mut self, key: &Key) -> Result<()> {
        let name = Self::name_of(key)?;
        self.attrs
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| ConfigError::NotFound(name.to_string()))
    }

    fn lookup_mut(&mut self, key: &Key) -> Result<&mut ConfigValue> {
        let name = Self::name_of(key)?;
        self.attrs
            .get_mut(name)
            .ok_or_else(|| ConfigError::NotFound(name.to_string()))
    }

    fn local_keys(&self) -> Vec<Key> {
        self.attrs.keys().cloned().map(Key::Name).collect()
    }

    fn has_local(&self, key: &Key) -> bool {
        matches!(key, Key::Name(name) if self.attrs.contains_key(name))
    }

    fn scope(&self) -> &Scope {
        &self.scope
    }

    fn is_empty(&self) -> bool {
        self.attrs.is_empty()
    }
}
