use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};
use parking_lot::{Mutex, RwLock};
use viewbridge_core::collections::map::HashMap;
use viewbridge_core::{ViewError, ViewResult};

use crate::ViewManager;

/// Looks view managers up by view type name.
pub trait ViewManagerResolver: Send + Sync {
    fn view_manager(&self, name: &str) -> Option<Arc<dyn ViewManager>>;

    /// Every name this resolver can produce a manager for, in registration
    /// order.
    fn view_manager_names(&self) -> IndexSet<String>;
}

/// Lets the description layer check which component names exist.
pub trait ComponentNameResolver {
    fn component_names(&self) -> IndexSet<String>;

    fn has_component(&self, name: &str) -> bool {
        self.component_names().contains(name)
    }
}

enum Source {
    Eager(IndexMap<String, Arc<dyn ViewManager>>),
    Lazy {
        resolver: Box<dyn ViewManagerResolver>,
        cache: RwLock<HashMap<String, Arc<dyn ViewManager>>>,
    },
}

/// Name → view manager table used by the native hierarchy.
///
/// Either every manager is handed over up front, or a resolver is asked on
/// first use and its answer kept for the lifetime of the registry.
pub struct ViewManagerRegistry {
    source: Source,
}

impl ViewManagerRegistry {
    /// Registry over managers known up front. Two managers with the same
    /// name are rejected.
    pub fn new(
        managers: impl IntoIterator<Item = Arc<dyn ViewManager>>,
    ) -> ViewResult<Self> {
        let mut table = IndexMap::new();
        for manager in managers {
            let name = manager.name().to_owned();
            if table.contains_key(&name) {
                return Err(ViewError::DuplicateViewManager { name });
            }
            table.insert(name, manager);
        }
        Ok(Self {
            source: Source::Eager(table),
        })
    }

    /// Registry that defers to `resolver` the first time a name is asked for.
    pub fn lazy(resolver: impl ViewManagerResolver + 'static) -> Self {
        Self {
            source: Source::Lazy {
                resolver: Box::new(resolver),
                cache: RwLock::new(HashMap::default()),
            },
        }
    }

    /// Manager for `name`, or [`ViewError::UnknownViewType`].
    pub fn get(&self, name: &str) -> ViewResult<Arc<dyn ViewManager>> {
        self.view_manager(name)
            .ok_or_else(|| ViewError::UnknownViewType {
                name: name.to_owned(),
            })
    }
}

impl ViewManagerResolver for ViewManagerRegistry {
    fn view_manager(&self, name: &str) -> Option<Arc<dyn ViewManager>> {
        match &self.source {
            Source::Eager(table) => table.get(name).cloned(),
            Source::Lazy { resolver, cache } => {
                if let Some(manager) = cache.read().get(name) {
                    return Some(Arc::clone(manager));
                }
                let mut cache = cache.write();
                if let Some(manager) = cache.get(name) {
                    return Some(Arc::clone(manager));
                }
                let manager = resolver.view_manager(name)?;
                if manager.name() != name {
                    log::warn!(
                        "resolver returned view manager `{}` for `{name}`",
                        manager.name()
                    );
                }
                cache.insert(name.to_owned(), Arc::clone(&manager));
                Some(manager)
            }
        }
    }

    fn view_manager_names(&self) -> IndexSet<String> {
        match &self.source {
            Source::Eager(table) => table.keys().cloned().collect(),
            Source::Lazy { resolver, .. } => resolver.view_manager_names(),
        }
    }
}

impl ComponentNameResolver for ViewManagerRegistry {
    fn component_names(&self) -> IndexSet<String> {
        self.view_manager_names()
    }
}

type Factory = Box<dyn Fn() -> Arc<dyn ViewManager> + Send + Sync>;

/// Resolver built from name → factory pairs. Each factory runs at most
/// once; later lookups reuse the manager it produced.
#[derive(Default)]
pub struct LazyViewManagers {
    factories: IndexMap<String, Factory>,
    created: Mutex<HashMap<String, Arc<dyn ViewManager>>>,
}

impl LazyViewManagers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&mut self, name: impl Into<String>, factory: F) -> ViewResult<()>
    where
        F: Fn() -> Arc<dyn ViewManager> + Send + Sync + 'static,
    {
        let name = name.into();
        if self.factories.contains_key(&name) {
            return Err(ViewError::DuplicateViewManager { name });
        }
        self.factories.insert(name, Box::new(factory));
        Ok(())
    }

    /// Builder form of [`register`](Self::register).
    pub fn with<F>(mut self, name: impl Into<String>, factory: F) -> ViewResult<Self>
    where
        F: Fn() -> Arc<dyn ViewManager> + Send + Sync + 'static,
    {
        self.register(name, factory)?;
        Ok(self)
    }
}

impl ViewManagerResolver for LazyViewManagers {
    fn view_manager(&self, name: &str) -> Option<Arc<dyn ViewManager>> {
        let factory = self.factories.get(name)?;
        // Held across the factory call so concurrent lookups cannot build twice.
        let mut created = self.created.lock();
        let manager = created
            .entry(name.to_owned())
            .or_insert_with(|| factory());
        Some(Arc::clone(manager))
    }

    fn view_manager_names(&self) -> IndexSet<String> {
        self.factories.keys().cloned().collect()
    }
}

#[cfg(test)]
#[path = "tests/registry_tests.rs"]
mod tests;
