use crate::discover::discover;
use crate::error::LoaderError;
use crate::load::load_module_config;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tlib_registry::{Config, ConfigRegistry};
use tracing::info;

/// Builds a registry factory that loads `path` with `module_id`'s env overrides.
///
/// The file is read on every invocation, i.e. only when the registry materializes the
/// module (and again after a failed attempt).
pub fn file_factory<T>(
    module_id: impl Into<String>,
    path: impl Into<PathBuf>,
) -> impl Fn() -> Result<T, LoaderError> + Send + Sync + 'static
where
    T: Config + DeserializeOwned,
{
    let module_id = module_id.into();
    let path = path.into();
    move || load_module_config::<T>(&module_id, &path)
}

/// Registers `path` as the lazily loaded source of `module_id`.
///
/// # Errors
/// Returns [`LoaderError::Registry`] if the registry rejects the registration.
pub fn register_file<T>(
    registry: &ConfigRegistry,
    module_id: impl Into<String>,
    path: impl Into<PathBuf>,
) -> Result<(), LoaderError>
where
    T: Config + DeserializeOwned,
{
    let module_id = module_id.into();
    let factory = file_factory::<T>(module_id.clone(), path);
    registry.register_fallible(module_id, factory)?;
    Ok(())
}

/// Registers every config file in `dir` as type `T`, keyed by file stem.
///
/// Nothing is parsed yet; each file is loaded on its module's first retrieval.
/// Returns the registered module ids in order.
///
/// # Errors
/// Propagates [`discover`] errors and registry rejections. Modules registered before a
/// rejection stay registered.
pub fn register_dir<T>(registry: &ConfigRegistry, dir: impl AsRef<Path>) -> Result<Vec<String>, LoaderError>
where
    T: Config + DeserializeOwned,
{
    let dir = dir.as_ref();
    let sources = discover(dir)?;
    let mut registered = Vec::with_capacity(sources.len());

    for source in sources {
        register_file::<T>(registry, source.module_id.clone(), source.path)?;
        registered.push(source.module_id);
    }

    info!(dir = %dir.display(), count = registered.len(), "Registered module configs");
    Ok(registered)
}
