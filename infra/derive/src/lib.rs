#![allow(unreachable_pub)]
#![allow(clippy::needless_pass_by_value)]

//! # Macros
//!
//! Procedural macros for the `tlib` workspace.
//! The crate wires two kinds of boilerplate: per-crate error enums and typed module
//! configuration structs that plug into `tlib_registry::ConfigRegistry`.
//!
//! ## Usage
//! Library crates depend on it directly and call the macros by path:
//! ```toml
//! [dependencies]
//! tlib-derive = { path = "../../infra/derive" }
//! ```
//!
//! The examples below are `ignore`d because they need the consuming crates in scope.

mod macros;

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

/// Turns an enum into a crate error type with contextual messages.
///
/// Every variant carries `context: Option<Cow<'static, str>>`. Variants that wrap an
/// upstream error hold exactly two fields, `source` and `context`.
///
/// Generated items:
/// * `#[derive(Debug, thiserror::Error)]`, skipping derives already present.
/// * `From<Source>` for each wrapping variant, so `?` converts upstream errors.
/// * A `<Name>Ext` trait on `Result<T, Name>` and on every `Result<T, Source>`, with
///   `context(..)` and the lazy `with_context(|| ..)`.
/// * A private `format_context` helper for `#[error(...)]` strings.
///
/// Missing or mistyped `context`, extra fields next to `source`, and two variants wrapping
/// the same source type are compile errors.
///
/// # Example
///
/// ```rust,ignore
/// use std::borrow::Cow;
///
/// #[tlib_derive::tlib_error]
/// pub enum LoaderError {
///     #[error("Config error{}: {source}", format_context(.context))]
///     Config { source: config::ConfigError, context: Option<Cow<'static, str>> },
///
///     #[error("Duplicate module config{}: {module_id}", format_context(.context))]
///     DuplicateModule { module_id: Cow<'static, str>, context: Option<Cow<'static, str>> },
/// }
///
/// fn load(path: &Path) -> Result<serde_json::Value, LoaderError> {
///     builder.build().with_context(|| format!("Failed to build {}", path.display()))?
///         .try_deserialize()
///         .map_err(Into::into)
/// }
/// ```
#[proc_macro_attribute]
pub fn tlib_error(_args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    macros::error::expand_error(input).into()
}

/// Attribute macro that binds a configuration type to its module identifier.
///
/// Implements `tlib_registry::ModuleConfig` for the annotated struct or enum and adds
/// `#[derive(Debug)]` if it is missing. The identifier comes from `id = "..."` or, when
/// omitted, from the type name in `snake_case`.
///
/// # Example
/// ```rust,ignore
/// use tlib_registry::{ConfigRegistry, module_config};
///
/// #[module_config(id = "network")]
/// pub struct NetworkConfig {
///     pub port: u16,
/// }
///
/// let registry = ConfigRegistry::new();
/// registry.register_module(|| NetworkConfig { port: 25565 })?;
/// let cfg = registry.get_module::<NetworkConfig>()?;
/// ```
#[proc_macro_attribute]
pub fn module_config(args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    macros::config::expand_module_config(args.into(), input).into()
}
