//! Module registry: one [`HostAdapter`] per live extension module.
//!
//! Modules are keyed by their resolved path; `ensure` is insert-if-absent, so
//! a module referenced by several links is loaded exactly once per process.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use slotmap::{new_key_type, SlotMap};

use super::{HostAdapter, ModuleLoader};
use crate::error::{Error, Result};

new_key_type! {
    /// Identity of a registered extension module. Copy, lightweight.
    pub struct ModuleId;
}

/// An event handler bound in a declarative document: the handler name
/// qualified by the module that owns it, kept as a structured pair rather
/// than a concatenated path string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Handler {
    pub module: ModuleId,
    pub name: String,
}

/// All live extension modules, plus the loader used to admit new ones.
pub struct HostRegistry {
    loader: Box<dyn ModuleLoader>,
    hosts: SlotMap<ModuleId, HostAdapter>,
    by_path: HashMap<PathBuf, ModuleId>,
}

impl HostRegistry {
    /// Create a registry around a loader.
    pub fn new(loader: Box<dyn ModuleLoader>) -> Self {
        Self {
            loader,
            hosts: SlotMap::with_key(),
            by_path: HashMap::new(),
        }
    }

    /// Register the module at `path`, loading it on first reference.
    pub fn ensure(&mut self, path: &Path) -> Result<ModuleId> {
        if let Some(&id) = self.by_path.get(path) {
            return Ok(id);
        }

        log::debug!("loading extension module {}", path.display());
        let module = self.loader.load(path)?;
        let id = self.hosts.insert(HostAdapter::new(path, module));
        self.by_path.insert(path.to_owned(), id);
        Ok(id)
    }

    /// The adapter for a registered module.
    pub fn get(&self, id: ModuleId) -> Result<&HostAdapter> {
        self.hosts.get(id).ok_or(Error::UnknownModule)
    }

    /// Identity of an already-registered module path, if any.
    pub fn id_for(&self, path: &Path) -> Option<ModuleId> {
        self.by_path.get(path).copied()
    }

    /// Dispatch a bound handler to its owning module.
    pub fn invoke(&self, handler: &Handler) -> Result<()> {
        self.get(handler.module)?.call_function(&handler.name)?;
        Ok(())
    }
}
