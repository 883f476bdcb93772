//! # Loader
//!
//! Reads module configs from disk for the `tlib` registry.
//! The registry itself never touches the filesystem; this crate turns files into the
//! factories it expects.
//!
//! * [`load_config`] / [`load_module_config`]: base file plus `TLIB__` environment overrides.
//! * [`discover`]: finds `*.toml`, `*.json`, `*.yaml` and `*.yml` files in a directory.
//! * [`register_file`] / [`register_dir`]: declare those files as lazy registry entries.
//!
//! ## Example
//!
//! ```rust,no_run
//! use tlib_loader::register_dir;
//! use tlib_registry::ConfigRegistry;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = ConfigRegistry::global();
//! register_dir::<serde_json::Value>(registry, "config")?;
//!
//! let network = registry.get::<serde_json::Value>("network")?;
//! println!("{network}");
//! # Ok(())
//! # }
//! ```

mod discover;
mod error;
mod factory;
mod load;

pub use discover::{ConfigSource, SUPPORTED_EXTENSIONS, discover};
pub use error::{LoaderError, LoaderErrorExt};
pub use factory::{file_factory, register_dir, register_file};
pub use load::{
    ENV_PREFIX, ENV_SEPARATOR, env_prefix, load_config, load_module_config,
    load_module_config_with_env,
};
