use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use log::{debug, error, warn};
use thiserror::Error;

use crate::core::module::Module;
use crate::core::result::catch_fault;

/// Builds one fresh module instance.
pub type ModuleFactory = Arc<dyn Fn() -> anyhow::Result<Box<dyn Module>> + Send + Sync>;

/// Lists the units a namespace provides.
pub type Enumerator = Arc<dyn Fn() -> anyhow::Result<Vec<UnitEntry>> + Send + Sync>;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Module not found: {0}")]
    UnknownModule(String),

    #[error("Error loading module {key}: {source}")]
    LoadFailed { key: String, source: anyhow::Error },
}

/// Opaque reference the registry uses to instantiate a module.
#[derive(Clone)]
pub struct LoadLocation {
    origin: String,
    factory: ModuleFactory,
}

impl LoadLocation {
    pub fn new<F>(origin: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> anyhow::Result<Box<dyn Module>> + Send + Sync + 'static,
    {
        Self {
            origin: origin.into(),
            factory: Arc::new(factory),
        }
    }

    /// Wraps a plain constructor.
    pub fn of<M, F>(origin: impl Into<String>, constructor: F) -> Self
    where
        M: Module + 'static,
        F: Fn() -> M + Send + Sync + 'static,
    {
        Self::new(origin, move || Ok(Box::new(constructor()) as Box<dyn Module>))
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    fn instantiate(&self) -> anyhow::Result<Box<dyn Module>> {
        catch_fault(|| (self.factory)()).map_err(|msg| anyhow::anyhow!(msg))
    }
}

impl fmt::Debug for LoadLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadLocation").field("origin", &self.origin).finish()
    }
}

/// A unit discovered inside one namespace.
#[derive(Debug, Clone)]
pub struct UnitEntry {
    pub name: String,
    pub location: LoadLocation,
}

impl UnitEntry {
    pub fn new(name: impl Into<String>, location: LoadLocation) -> Self {
        Self { name: name.into(), location }
    }
}

/// A namespace and the means to enumerate its units.
#[derive(Clone)]
pub struct NamespaceSource {
    pub namespace: String,
    enumerate: Enumerator,
}

impl NamespaceSource {
    pub fn new<F>(namespace: impl Into<String>, enumerate: F) -> Self
    where
        F: Fn() -> anyhow::Result<Vec<UnitEntry>> + Send + Sync + 'static,
    {
        Self {
            namespace: namespace.into(),
            enumerate: Arc::new(enumerate),
        }
    }

    /// Namespace backed by a fixed unit list.
    pub fn fixed(namespace: impl Into<String>, units: Vec<UnitEntry>) -> Self {
        Self::new(namespace, move || Ok(units.clone()))
    }
}

impl fmt::Debug for NamespaceSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NamespaceSource").field("namespace", &self.namespace).finish()
    }
}

/// Registry record of a discoverable module. Immutable once built.
#[derive(Debug, Clone)]
pub struct ModuleDescriptor {
    pub key: String,
    pub location: LoadLocation,
}

/// Maps `<namespace>/<unit>` keys to load locations and hands out fresh
/// module instances on request.
pub struct ModuleRegistry {
    sources: Vec<NamespaceSource>,
    modules: BTreeMap<String, ModuleDescriptor>,
}

impl ModuleRegistry {
    /// Registry over the bundled `exploit` and `auxiliary` namespaces.
    pub fn new() -> Self {
        Self::with_sources(crate::modules::default_sources())
    }

    pub fn with_sources(sources: Vec<NamespaceSource>) -> Self {
        let mut registry = Self {
            sources,
            modules: BTreeMap::new(),
        };
        registry.build();
        registry
    }

    /// Re-enumerates every namespace, replacing the previous mapping. A
    /// namespace that fails to enumerate contributes nothing.
    pub fn build(&mut self) {
        let mut modules = BTreeMap::new();

        for source in &self.sources {
            let units = match catch_fault(|| (source.enumerate)()) {
                Ok(units) => units,
                Err(e) => {
                    warn!("Skipping namespace '{}': {}", source.namespace, e);
                    continue;
                }
            };

            for unit in units {
                if unit.name.is_empty() || unit.name.contains('/') {
                    warn!("Skipping invalid unit name '{}' in namespace '{}'", unit.name, source.namespace);
                    continue;
                }

                let key = format!("{}/{}", source.namespace, unit.name);
                if modules.contains_key(&key) {
                    warn!("Duplicate module key '{}' from {}, keeping first", key, unit.location.origin());
                    continue;
                }

                modules.insert(
                    key.clone(),
                    ModuleDescriptor { key, location: unit.location },
                );
            }
        }

        debug!("Registry built with {} module(s)", modules.len());
        self.modules = modules;
    }

    pub fn reload(&mut self) {
        self.build();
    }

    /// Instantiates the module registered under `path`.
    pub fn load_module(&self, path: &str) -> Result<Box<dyn Module>, RegistryError> {
        let descriptor = self
            .modules
            .get(path)
            .ok_or_else(|| RegistryError::UnknownModule(path.to_string()))?;

        descriptor
            .location
            .instantiate()
            .map_err(|source| RegistryError::LoadFailed {
                key: path.to_string(),
                source,
            })
    }

    /// Like [`load_module`](Self::load_module), logging load failures and
    /// returning `None` for any miss.
    pub fn get_module(&self, path: &str) -> Option<Box<dyn Module>> {
        match self.load_module(path) {
            Ok(module) => Some(module),
            Err(e @ RegistryError::LoadFailed { .. }) => {
                error!("{:#}", e);
                None
            }
            Err(RegistryError::UnknownModule(_)) => None,
        }
    }

    /// Snapshot of the key to load location mapping.
    pub fn list_modules(&self) -> BTreeMap<String, LoadLocation> {
        self.modules
            .iter()
            .map(|(key, descriptor)| (key.clone(), descriptor.location.clone()))
            .collect()
    }

    pub fn descriptor(&self, path: &str) -> Option<&ModuleDescriptor> {
        self.modules.get(path)
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

impl Default for ModuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}
