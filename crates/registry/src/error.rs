use std::borrow::Cow;

/// Boxed error produced by a fallible config factory.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur while registering or retrieving module configs.
#[tlib_derive::tlib_error]
pub enum RegistryError {
    /// No factory was ever registered under the requested module id.
    #[error("Module not registered{}: {module_id}", format_context(.context))]
    NotRegistered { module_id: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The caller asked for a different type than the one the factory produces.
    /// This is a programming error; retrying cannot succeed.
    #[error(
        "Config type mismatch for '{module_id}'{}: expected {expected}, registered {found}",
        format_context(.context)
    )]
    TypeMismatch {
        module_id: Cow<'static, str>,
        expected: &'static str,
        found: &'static str,
        context: Option<Cow<'static, str>>,
    },

    /// Module ids must contain at least one non-whitespace character.
    #[error("Invalid module id{}: {message}", format_context(.context))]
    InvalidModuleId { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The module's config is materialized (or being materialized) and cannot be replaced.
    #[error("Config already materialized{}: {module_id}", format_context(.context))]
    AlreadyMaterialized { module_id: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// A factory requested its own module while materializing it.
    #[error("Cyclic config dependency{}: {module_id}", format_context(.context))]
    CyclicDependency { module_id: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The factory failed; nothing was cached and the next retrieval retries.
    #[error("Config factory failed{}: {source}", format_context(.context))]
    Factory { source: BoxError, context: Option<Cow<'static, str>> },
}
