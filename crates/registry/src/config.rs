use std::any::Any;
use std::fmt::Debug;

/// Marker trait for values that can be stored in a [`ConfigRegistry`](crate::ConfigRegistry).
///
/// Any `Debug + Send + Sync + 'static` type implements it automatically, so plain structs,
/// enums and even `serde_json::Value` can act as module configs.
pub trait Config: Any + Debug + Send + Sync {}
impl<T: Any + Debug + Send + Sync> Config for T {}

/// A config type that knows which module it belongs to.
///
/// Usually implemented with the [`module_config`](crate::module_config) attribute rather
/// than by hand.
pub trait ModuleConfig: Config {
    /// Identifier the type is registered under.
    const MODULE_ID: &'static str;
}
