use std::borrow::Cow;
use tlib_derive::tlib_error;

#[tlib_error]
pub(crate) enum DemoError {
    #[error("IO error{}: {source}", format_context(.context))]
    Io { source: std::io::Error, context: Option<Cow<'static, str>> },

    #[cfg(unix)]
    #[error("Unix only{}: {code}", format_context(.context))]
    UnixOnly { code: i32, context: Option<Cow<'static, str>> },

    #[error("Rejected{}: {reason}", format_context(.context))]
    Rejected { reason: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

fn read() -> Result<Vec<u8>, DemoError> {
    std::fs::read("/nonexistent").with_context(|| format!("Reading {}", "/nonexistent"))
}

fn main() {
    let _ = read();
    let rejected: Result<(), DemoError> =
        Err(DemoError::Rejected { reason: "no".into(), context: None });
    let _ = rejected.context("Checking");
}
