use crate::config::{Config, ModuleConfig};
use crate::entry::RegistryEntry;
use crate::error::{BoxError, RegistryError};
use fxhash::FxHashMap;
use parking_lot::RwLock;
use std::sync::{Arc, LazyLock};
use tracing::{debug, warn};

static GLOBAL: LazyLock<ConfigRegistry> = LazyLock::new(ConfigRegistry::new);

/// A thread-safe, string-keyed registry of lazily materialized configuration objects.
///
/// Each module id maps to one factory. The first [`get`](Self::get) for an id runs the
/// factory and caches its value; every later call returns the same [`Arc`].
#[derive(Debug, Default)]
pub struct ConfigRegistry {
    entries: RwLock<FxHashMap<String, Arc<RegistryEntry>>>,
}

impl ConfigRegistry {
    /// Creates a new, empty registry.
    ///
    /// Most callers want the shared [`ConfigRegistry::global`] instance instead; separate
    /// registries are useful for scoped setups and tests.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry.
    ///
    /// Constructed on first access and alive until the process exits. Use
    /// [`reset`](Self::reset) to drop its entries, e.g. between tests.
    pub fn global() -> &'static Self {
        &GLOBAL
    }

    /// Declares `factory` as the source of `module_id`'s config.
    ///
    /// The factory is not called here. Registering again for the same id replaces the
    /// previous factory as long as nothing has been materialized yet.
    ///
    /// # Errors
    /// Returns [`RegistryError::InvalidModuleId`] for a blank id and
    /// [`RegistryError::AlreadyMaterialized`] when the id already has a live instance or
    /// a concurrent [`get`](Self::get) for it is in flight.
    ///
    /// # Examples
    /// ```rust
    /// use tlib_registry::ConfigRegistry;
    ///
    /// #[derive(Debug)]
    /// struct Limits { max_players: u32 }
    ///
    /// # fn main() -> Result<(), tlib_registry::RegistryError> {
    /// let registry = ConfigRegistry::new();
    /// registry.register("limits", || Limits { max_players: 42 })?;
    ///
    /// let first = registry.get::<Limits>("limits")?;
    /// let second = registry.get::<Limits>("limits")?;
    /// assert_eq!(first.max_players, 42);
    /// assert!(std::sync::Arc::ptr_eq(&first, &second));
    /// # Ok(())
    /// # }
    /// ```
    pub fn register<T, F>(&self, module_id: impl Into<String>, factory: F) -> Result<(), RegistryError>
    where
        T: Config,
        F: Fn() -> T + Send + Sync + 'static,
    {
        self.insert(module_id.into(), RegistryEntry::new(move || Ok(factory())))
    }

    /// Like [`register`](Self::register), for factories that can fail.
    ///
    /// A failing factory surfaces as [`RegistryError::Factory`] from [`get`](Self::get);
    /// nothing is cached and the next `get` calls the factory again.
    ///
    /// # Errors
    /// Same as [`register`](Self::register).
    pub fn register_fallible<T, E, F>(
        &self,
        module_id: impl Into<String>,
        factory: F,
    ) -> Result<(), RegistryError>
    where
        T: Config,
        E: Into<BoxError>,
        F: Fn() -> Result<T, E> + Send + Sync + 'static,
    {
        self.insert(module_id.into(), RegistryEntry::new(move || factory().map_err(Into::into)))
    }

    /// Registers a [`ModuleConfig`] under its own [`ModuleConfig::MODULE_ID`].
    ///
    /// # Errors
    /// Same as [`register`](Self::register).
    pub fn register_module<T, F>(&self, factory: F) -> Result<(), RegistryError>
    where
        T: ModuleConfig,
        F: Fn() -> T + Send + Sync + 'static,
    {
        self.register(T::MODULE_ID, factory)
    }

    /// Fallible counterpart of [`register_module`](Self::register_module).
    ///
    /// # Errors
    /// Same as [`register`](Self::register).
    pub fn register_module_fallible<T, E, F>(&self, factory: F) -> Result<(), RegistryError>
    where
        T: ModuleConfig,
        E: Into<BoxError>,
        F: Fn() -> Result<T, E> + Send + Sync + 'static,
    {
        self.register_fallible(T::MODULE_ID, factory)
    }

    /// Returns the config for `module_id`, materializing it on first use.
    ///
    /// # Errors
    /// * [`RegistryError::NotRegistered`] if no factory exists for `module_id`.
    /// * [`RegistryError::TypeMismatch`] if `T` is not the type the factory produces.
    /// * [`RegistryError::Factory`] if a fallible factory failed.
    /// * [`RegistryError::CyclicDependency`] if called from the module's own factory.
    ///   Only cycles on the calling thread are detected: a factory for `a` that waits on a
    ///   thread materializing `b`, whose factory in turn requests `a`, deadlocks.
    pub fn get<T: Config>(&self, module_id: &str) -> Result<Arc<T>, RegistryError> {
        let entry = self.entry(module_id)?;
        entry.check_type::<T>(module_id)?;

        entry.materialize(module_id)?.downcast::<T>().map_err(|_| RegistryError::TypeMismatch {
            module_id: module_id.to_owned().into(),
            expected: std::any::type_name::<T>(),
            found: entry.type_name(),
            context: Some("Cached instance has an unexpected type".into()),
        })
    }

    /// Returns the config registered under `T`'s own module id.
    ///
    /// # Errors
    /// Same as [`get`](Self::get).
    pub fn get_module<T: ModuleConfig>(&self) -> Result<Arc<T>, RegistryError> {
        self.get::<T>(T::MODULE_ID)
    }

    /// Whether a factory is registered for `module_id`.
    #[must_use]
    pub fn contains(&self, module_id: &str) -> bool {
        self.entries.read().contains_key(module_id)
    }

    /// Whether `module_id` has a cached instance.
    #[must_use]
    pub fn is_materialized(&self, module_id: &str) -> bool {
        self.entries.read().get(module_id).is_some_and(|entry| entry.is_materialized())
    }

    /// Registered module ids in lexicographic order.
    #[must_use]
    pub fn module_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.entries.read().keys().cloned().collect();
        ids.sort_unstable();
        ids
    }

    /// Number of registered modules, materialized or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether no module is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Drops the entry for `module_id`, cached instance included.
    ///
    /// Callers that already hold the instance keep it alive. Returns `false` if nothing
    /// was registered.
    pub fn unregister(&self, module_id: &str) -> bool {
        let removed = self.entries.write().remove(module_id).is_some();
        if removed {
            debug!(module_id, "Config entry removed");
        }
        removed
    }

    /// Drops every entry and returns how many there were.
    pub fn reset(&self) -> usize {
        let count = {
            let mut entries = self.entries.write();
            let count = entries.len();
            entries.clear();
            count
        };
        debug!(count, "Config registry reset");
        count
    }

    fn insert(&self, module_id: String, entry: RegistryEntry) -> Result<(), RegistryError> {
        validate_module_id(&module_id)?;
        let config = entry.type_name();

        let replaced = {
            let mut entries = self.entries.write();
            // Under the write lock no new handle can leave the map, so any extra strong
            // reference belongs to a `get` that has not reached the init lock yet.
            if let Some(existing) = entries.get(&module_id)
                && (existing.is_claimed() || Arc::strong_count(existing) > 1)
            {
                drop(entries);
                warn!(module_id = module_id.as_str(), config, "Rejected registration for a materialized config");
                return Err(RegistryError::AlreadyMaterialized {
                    module_id: module_id.into(),
                    context: Some("Unregister the module before replacing its factory".into()),
                });
            }
            entries.insert(module_id.clone(), Arc::new(entry)).is_some()
        };

        debug!(module_id = module_id.as_str(), config, replaced, "Config factory registered");
        Ok(())
    }

    fn entry(&self, module_id: &str) -> Result<Arc<RegistryEntry>, RegistryError> {
        self.entries.read().get(module_id).cloned().ok_or_else(|| RegistryError::NotRegistered {
            module_id: module_id.to_owned().into(),
            context: None,
        })
    }
}

fn validate_module_id(module_id: &str) -> Result<(), RegistryError> {
    if module_id.trim().is_empty() {
        return Err(RegistryError::InvalidModuleId {
            message: "module id cannot be empty".into(),
            context: None,
        });
    }
    Ok(())
}
