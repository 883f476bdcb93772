//! # Config Registry
//!
//! A process-wide, string-keyed, type-safe registry of lazily constructed module
//! configurations.
//!
//! ## Overview
//!
//! Every module registers a zero-argument factory under its module id. The first
//! retrieval runs the factory and caches the value; all later retrievals hand out the
//! same [`Arc`](std::sync::Arc). The registry performs no I/O: loading, validating or
//! merging configuration data is up to whoever supplies the factory.
//!
//! ## Guarantees
//!
//! * **Type-Safe**: the produced type is fixed at registration and checked on every
//!   retrieval ([`RegistryError::TypeMismatch`]).
//! * **Exactly once**: concurrent first retrievals invoke the factory a single time.
//! * **No cached failures**: a failing factory leaves the entry untouched for a retry.
//! * **Stable identity**: an entry stays materialized until it is unregistered or the
//!   registry is [`reset`](ConfigRegistry::reset).
//!
//! # Example
//!
//! ```rust
//! use tlib_registry::{ConfigRegistry, RegistryError};
//!
//! #[derive(Debug)]
//! struct Config { answer: u32 }
//!
//! # fn main() -> Result<(), RegistryError> {
//! let registry = ConfigRegistry::global();
//! registry.register("mymod", || Config { answer: 42 })?;
//!
//! let cfg = registry.get::<Config>("mymod")?;
//! assert_eq!(cfg.answer, 42);
//! # Ok(())
//! # }
//! ```

mod config;
mod entry;
mod error;
mod registry;

pub use config::{Config, ModuleConfig};
pub use error::{BoxError, RegistryError, RegistryErrorExt};
pub use registry::ConfigRegistry;
pub use tlib_derive::module_config;
