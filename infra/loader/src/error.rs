use std::borrow::Cow;

/// Errors raised while locating or loading config files.
#[tlib_derive::tlib_error]
pub enum LoaderError {
    #[error("Config error{}: {source}", format_context(.context))]
    Config { source: config::ConfigError, context: Option<Cow<'static, str>> },

    #[error("Registry error{}: {source}", format_context(.context))]
    Registry { source: tlib_registry::RegistryError, context: Option<Cow<'static, str>> },

    #[error("Directory scan failed{}: {source}", format_context(.context))]
    Walk { source: walkdir::Error, context: Option<Cow<'static, str>> },

    /// Two files in one directory map to the same module id (e.g. `hud.toml` and `hud.json`).
    #[error("Duplicate module config{}: {module_id}", format_context(.context))]
    DuplicateModule { module_id: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
