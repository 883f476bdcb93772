use crate::error::{LoaderError, LoaderErrorExt};
use config::{Config, Environment, File, Map};
use serde::de::DeserializeOwned;
use std::path::Path;
use tracing::info;

/// Prefix shared by every environment override.
pub const ENV_PREFIX: &str = "TLIB";
/// Separator between the prefix, the module segment and nested keys.
pub const ENV_SEPARATOR: &str = "__";

/// Loads a config file and overlays `TLIB__*` environment variables on top of it.
///
/// Layers, lowest priority first:
/// 1. **Base File**: `path`, required. The format follows the extension
///    (`toml`, `json`, `yaml`, ...).
/// 2. **Environment Overrides**: variables prefixed with `TLIB__`; nested keys are
///    joined with `__` (`TLIB__DATABASE__URL` maps to `database.url`).
///
/// # Errors
/// Returns [`LoaderError::Config`] if the file is missing or unreadable, or if the
/// merged values do not deserialize into `T`.
///
/// # Example
/// ```rust,no_run
/// use tlib_loader::load_config;
///
/// #[derive(serde::Deserialize)]
/// struct AppConfig {
///     port: u16,
/// }
///
/// let cfg: AppConfig = load_config("config/app.toml").unwrap();
/// ```
pub fn load_config<T>(path: impl AsRef<Path>) -> Result<T, LoaderError>
where
    T: DeserializeOwned,
{
    load_layered(path.as_ref(), ENV_PREFIX, None)
}

/// Like [`load_config`], but environment overrides are scoped to one module:
/// `TLIB__<MODULE>__<KEY>`, where `<MODULE>` is the id upper-cased with `-` and `.`
/// replaced by `_`.
///
/// # Errors
/// Same as [`load_config`].
pub fn load_module_config<T>(module_id: &str, path: impl AsRef<Path>) -> Result<T, LoaderError>
where
    T: DeserializeOwned,
{
    load_layered(path.as_ref(), &env_prefix(module_id), None)
}

/// Like [`load_module_config`], reading overrides from `env` instead of the process
/// environment. Keys use the same `TLIB__<MODULE>__<KEY>` form.
///
/// # Errors
/// Same as [`load_config`].
pub fn load_module_config_with_env<T, I>(
    module_id: &str,
    path: impl AsRef<Path>,
    env: I,
) -> Result<T, LoaderError>
where
    T: DeserializeOwned,
    I: IntoIterator<Item = (String, String)>,
{
    load_layered(path.as_ref(), &env_prefix(module_id), Some(env.into_iter().collect()))
}

/// The environment prefix that scopes overrides to `module_id`.
#[must_use]
pub fn env_prefix(module_id: &str) -> String {
    let module: String = module_id
        .chars()
        .map(|c| if c == '-' || c == '.' { '_' } else { c.to_ascii_uppercase() })
        .collect();
    format!("{ENV_PREFIX}{ENV_SEPARATOR}{module}")
}

fn load_layered<T>(
    path: &Path,
    prefix: &str,
    env: Option<Map<String, String>>,
) -> Result<T, LoaderError>
where
    T: DeserializeOwned,
{
    info!(path = %path.display(), env_prefix = %prefix, "Loading config");

    let config = Config::builder()
        .add_source(File::from(path).required(true))
        .add_source(
            Environment::with_prefix(prefix)
                .separator(ENV_SEPARATOR)
                .try_parsing(true)
                .source(env),
        )
        .build()
        .with_context(|| format!("Failed to build config from {}", path.display()))?
        .try_deserialize::<T>()
        .with_context(|| format!("Failed to deserialize {}", path.display()))?;

    Ok(config)
}
