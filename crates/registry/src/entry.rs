use crate::config::Config;
use crate::error::{BoxError, RegistryError};
use parking_lot::Mutex;
use std::any::{Any, TypeId, type_name};
use std::cell::RefCell;
use std::fmt;
use std::sync::{Arc, OnceLock};
use tracing::{debug, trace, warn};

pub(crate) type Instance = Arc<dyn Any + Send + Sync>;
type Factory = Box<dyn Fn() -> Result<Instance, BoxError> + Send + Sync>;

thread_local! {
    /// Entries currently being materialized on this thread, innermost last.
    static IN_PROGRESS: RefCell<Vec<usize>> = const { RefCell::new(Vec::new()) };
}

/// A registered factory plus its lazily materialized instance.
///
/// The entry is *Declared* while `instance` is empty and *Materialized* once it is set.
/// The transition happens at most once, under `init_lock`.
pub(crate) struct RegistryEntry {
    type_id: TypeId,
    type_name: &'static str,
    factory: Factory,
    init_lock: Mutex<()>,
    instance: OnceLock<Instance>,
}

impl RegistryEntry {
    pub(crate) fn new<T, F>(factory: F) -> Self
    where
        T: Config,
        F: Fn() -> Result<T, BoxError> + Send + Sync + 'static,
    {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
            factory: Box::new(move || factory().map(|value| Arc::new(value) as Instance)),
            init_lock: Mutex::new(()),
            instance: OnceLock::new(),
        }
    }

    pub(crate) const fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub(crate) fn is_materialized(&self) -> bool {
        self.instance.get().is_some()
    }

    /// Materialized, or another thread is running the factory right now.
    pub(crate) fn is_claimed(&self) -> bool {
        self.is_materialized() || self.init_lock.try_lock().is_none()
    }

    pub(crate) fn check_type<T: Config>(&self, module_id: &str) -> Result<(), RegistryError> {
        if self.type_id == TypeId::of::<T>() {
            return Ok(());
        }
        Err(RegistryError::TypeMismatch {
            module_id: module_id.to_owned().into(),
            expected: type_name::<T>(),
            found: self.type_name,
            context: None,
        })
    }

    /// Returns the cached instance, running the factory first if nothing is cached yet.
    ///
    /// Concurrent first callers serialize on `init_lock`; only the winner invokes the
    /// factory, the rest observe its result. A failed factory leaves the entry Declared.
    pub(crate) fn materialize(&self, module_id: &str) -> Result<Instance, RegistryError> {
        if let Some(instance) = self.instance.get() {
            trace!(module_id, "Config cache hit");
            return Ok(Arc::clone(instance));
        }

        let _cycle = CycleGuard::enter(self, module_id)?;
        let _init = self.init_lock.lock();

        if let Some(instance) = self.instance.get() {
            trace!(module_id, "Config materialized by a concurrent caller");
            return Ok(Arc::clone(instance));
        }

        let value = (self.factory)().map_err(|source| {
            warn!(module_id, config = self.type_name, error = %source, "Config factory failed");
            RegistryError::Factory {
                source,
                context: Some(format!("Materializing module '{module_id}'").into()),
            }
        })?;

        let instance = self.instance.get_or_init(|| value);
        debug!(module_id, config = self.type_name, "Config materialized");
        Ok(Arc::clone(instance))
    }
}

impl fmt::Debug for RegistryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryEntry")
            .field("type_name", &self.type_name)
            .field("materialized", &self.is_materialized())
            .finish_non_exhaustive()
    }
}

/// Marks an entry as in progress on the current thread for the guard's lifetime.
struct CycleGuard {
    key: usize,
}

impl CycleGuard {
    fn enter(entry: &RegistryEntry, module_id: &str) -> Result<Self, RegistryError> {
        let key = std::ptr::from_ref(entry).addr();
        IN_PROGRESS.with_borrow_mut(|stack| {
            if stack.contains(&key) {
                warn!(module_id, "Config factory requested its own module");
                return Err(RegistryError::CyclicDependency {
                    module_id: module_id.to_owned().into(),
                    context: Some(format!("{} levels deep", stack.len()).into()),
                });
            }
            stack.push(key);
            Ok(Self { key })
        })
    }
}

impl Drop for CycleGuard {
    fn drop(&mut self) {
        IN_PROGRESS.with_borrow_mut(|stack| {
            if let Some(pos) = stack.iter().rposition(|k| *k == self.key) {
                stack.remove(pos);
            }
        });
    }
}
