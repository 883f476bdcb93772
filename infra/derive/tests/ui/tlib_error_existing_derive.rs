use std::borrow::Cow;
use tlib_derive::tlib_error;

#[tlib_error]
#[derive(Debug)]
pub enum DemoError {
    #[error("Missing{}: {module_id}", format_context(.context))]
    Missing { module_id: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Factory failed{}: {source}", format_context(.context))]
    Factory {
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
        context: Option<Cow<'static, str>>,
    },
}

fn main() {
    let err = DemoError::Missing { module_id: "x".into(), context: None };
    let _ = format!("{err:?}");

    let boxed: Box<dyn std::error::Error + Send + Sync> = "disk not ready".into();
    let _ = DemoError::from(boxed);
}
