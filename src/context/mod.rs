//! Hierarchical configuration scopes
//!
//! Every scope implements [`Context`]: single-key `lookup`/`configure`/`remove`
//! plus composite key paths that descend into nested scopes. A scope may hold
//! a weak reference to a parent scope; the parent is consulted for read
//! fallback, for `keys()`, and when a composite write names a key the scope
//! does not own.

pub mod dict;
pub mod interval;
pub mod label;

pub use dict::DictConfig;
pub use interval::{IntervalConfig, Snapshot};
pub use label::Label;

use crate::types::{display_path, ConfigError, ConfigValue, Key, Result};
use std::cell::RefCell;
use std::collections::BTreeSet;
use std::fmt;
use std::rc::{Rc, Weak};
use tracing::{debug, warn};

/// A scope that can serve as a parent
pub type SharedContext = Rc<RefCell<dyn Context>>;

/// Wrap a scope so children can refer back to it
pub fn shared<C: Context + 'static>(context: C) -> Rc<RefCell<C>> {
    Rc::new(RefCell::new(context))
}

/// Create an empty scope of the same variant whose parent is `base`
pub fn subcontext<C: Scoped>(base: &Rc<RefCell<C>>) -> C {
    let parent: SharedContext = base.clone();
    C::with_parent(Scope::child_of(&parent))
}

/// Non-owning link to a parent scope
#[derive(Clone, Default)]
pub struct Scope {
    parent: Option<Weak<RefCell<dyn Context>>>,
}

impl Scope {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn child_of(parent: &SharedContext) -> Self {
        Self {
            parent: Some(Rc::downgrade(parent)),
        }
    }

    /// The parent, if one was set and is still alive
    pub fn parent(&self) -> Option<SharedContext> {
        let weak = self.parent.as_ref()?;
        let parent = weak.upgrade();
        if parent.is_none() {
            warn!("Parent scope was dropped; treating context as detached");
        }
        parent
    }

    pub fn has_parent(&self) -> bool {
        self.parent().is_some()
    }
}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match &self.parent {
            None => "root",
            Some(weak) if weak.strong_count() > 0 => "child",
            Some(_) => "detached",
        };
        f.write_str(state)
    }
}

/// Scopes that can be created as children of another scope
pub trait Scoped: Context + Sized + 'static {
    fn with_parent(scope: Scope) -> Self;
}

/// A single mutation applied through a key path
#[derive(Debug, Clone)]
pub enum Write {
    Assign(ConfigValue),
    Delete,
}

/// `Ok(true)` when a lookup succeeded, `Ok(false)` when it found nothing
pub(crate) fn resolves(result: Result<ConfigValue>) -> Result<bool> {
    match result {
        Ok(_) => Ok(true),
        Err(ConfigError::NotFound(_)) => Ok(false),
        Err(e) => Err(e),
    }
}

/// Borrow the parent immutably, reporting a busy parent as an error
pub(crate) fn read_parent<T>(
    parent: &SharedContext,
    f: impl FnOnce(&dyn Context) -> Result<T>,
) -> Result<T> {
    let guard = parent
        .try_borrow()
        .map_err(|e| ConfigError::ScopeUnavailable(e.to_string()))?;
    f(&*guard)
}

fn write_parent<T>(
    parent: &SharedContext,
    f: impl FnOnce(&mut dyn Context) -> Result<T>,
) -> Result<T> {
    let mut guard = parent
        .try_borrow_mut()
        .map_err(|e| ConfigError::ScopeUnavailable(e.to_string()))?;
    f(&mut *guard)
}

pub trait Context: fmt::Debug {
    /// Resolve one key in this scope (and, where the variant supports it,
    /// its ancestors).
    fn lookup(&self, key: &Key) -> Result<ConfigValue>;

    /// Bind one key in this scope only
    fn configure(&mut self, key: &Key, value: ConfigValue) -> Result<()>;

    /// Unbind one key in this scope only
    fn remove(&mut self, key: &Key) -> Result<()>;

    /// Mutable access to the value one local key resolves to
    fn lookup_mut(&mut self, key: &Key) -> Result<&mut ConfigValue>;

    /// Keys owned by this scope, excluding ancestors
    fn local_keys(&self) -> Vec<Key>;

    fn scope(&self) -> &Scope;

    fn is_empty(&self) -> bool;

    fn parent(&self) -> Option<SharedContext> {
        self.scope().parent()
    }

    /// Whether `key` is owned by this scope
    fn has_local(&self, key: &Key) -> bool {
        self.local_keys().contains(key)
    }

    /// Whether a single key resolves to something
    fn contains_key(&self, key: &Key) -> Result<bool> {
        resolves(self.lookup(key))
    }

    /// Local keys unioned with every ancestor's keys
    fn keys(&self) -> BTreeSet<Key> {
        let mut keys: BTreeSet<Key> = self.local_keys().into_iter().collect();
        if let Some(parent) = self.parent() {
            match read_parent(&parent, |p| Ok(p.keys())) {
                Ok(inherited) => keys.extend(inherited),
                Err(e) => warn!("Skipping inherited keys: {}", e),
            }
        }
        keys
    }

    fn items(&self) -> Result<Vec<(Key, ConfigValue)>> {
        self.keys()
            .into_iter()
            .map(|key| {
                let value = self.lookup(&key)?;
                Ok((key, value))
            })
            .collect()
    }

    /// Resolve a key path, descending into nested scopes
    fn get(&self, path: &[Key]) -> Result<ConfigValue> {
        let (head, rest) = path
            .split_first()
            .ok_or_else(|| ConfigError::invalid_key("()", "empty key path"))?;

        let mut value = self.lookup(head)?;
        if rest.is_empty() {
            return Ok(value);
        }

        value.settle_for(&rest[0]);
        let nested = value.as_context().ok_or_else(|| {
            ConfigError::type_mismatch(
                format!("indexable config at {}", head),
                value.type_name(),
            )
        })?;
        nested.get(rest)
    }

    /// Whether the path resolves. Only a missing key counts as absent; other
    /// failures are reported. Range-shaped keys into an interval config also
    /// need at least one overlapping interval.
    fn contains(&self, path: &[Key]) -> Result<bool> {
        let (head, rest) = path
            .split_first()
            .ok_or_else(|| ConfigError::invalid_key("()", "empty key path"))?;

        if rest.is_empty() {
            return self.contains_key(head);
        }

        let mut value = match self.lookup(head) {
            Err(ConfigError::NotFound(_)) => return Ok(false),
            other => other?,
        };
        value.settle_for(&rest[0]);
        let nested = value.as_context().ok_or_else(|| {
            ConfigError::type_mismatch(
                format!("indexable config at {}", head),
                value.type_name(),
            )
        })?;
        nested.contains(rest)
    }

    fn set(&mut self, path: &[Key], value: ConfigValue) -> Result<()> {
        self.apply(path, Write::Assign(value))
    }

    fn delete(&mut self, path: &[Key]) -> Result<()> {
        self.apply(path, Write::Delete)
    }

    /// Apply a write through a key path.
    ///
    /// A single key is written here. Longer paths write through the local
    /// value named by the head, or are handed to the parent wholesale when
    /// the head isn't local.
    fn apply(&mut self, path: &[Key], write: Write) -> Result<()> {
        let (head, rest) = path
            .split_first()
            .ok_or_else(|| ConfigError::invalid_key("()", "empty key path"))?;

        if rest.is_empty() {
            return match write {
                Write::Assign(value) => self.configure(head, value),
                Write::Delete => self.remove(head),
            };
        }

        if self.has_local(head) {
            let target = self.lookup_mut(head)?;
            target.settle_for(&rest[0]);
            let type_name = target.type_name();
            let nested = target.as_context_mut().ok_or_else(|| {
                ConfigError::type_mismatch(format!("indexable config at {}", head), type_name)
            })?;
            return nested.apply(rest, write);
        }

        match self.parent() {
            Some(parent) => {
                debug!("Delegating write to {} to parent scope", display_path(path));
                write_parent(&parent, |p| p.apply(path, write))
            }
            None => Err(ConfigError::KeyNotDefined(display_path(path))),
        }
    }
}
