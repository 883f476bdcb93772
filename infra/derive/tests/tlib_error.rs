use std::borrow::Cow;
use std::cell::Cell;
use std::io;
use tlib_derive::tlib_error;

#[tlib_error]
pub enum DemoError {
    #[error("IO error{}: {source}", format_context(.context))]
    Io { source: io::Error, context: Option<Cow<'static, str>> },

    #[error("Parse error{}: {source}", format_context(.context))]
    Parse { source: std::num::ParseIntError, context: Option<Cow<'static, str>> },

    #[error("Lookup failed{}: {module_id}", format_context(.context))]
    Lookup { module_id: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

fn read_missing() -> Result<(), DemoError> {
    Err::<(), _>(io::Error::new(io::ErrorKind::NotFound, "gone")).context("Reading module file")?;
    Ok(())
}

#[test]
fn tlib_error_ui() {
    let t = trybuild::TestCases::new();
    t.pass("tests/ui/tlib_error_pass.rs");
    t.pass("tests/ui/tlib_error_existing_derive.rs");
}

#[test]
fn source_context_is_rendered() {
    let err = read_missing().unwrap_err();
    assert!(matches!(err, DemoError::Io { ref context, .. } if context.is_some()));
    assert_eq!(err.to_string(), "IO error (Reading module file): gone");
}

#[test]
fn question_mark_converts_each_source() {
    fn open() -> Result<(), DemoError> {
        Err::<(), _>(io::Error::other("boom"))?;
        Ok(())
    }
    fn port() -> Result<u16, DemoError> {
        Ok("not-a-port".parse::<u16>()?)
    }

    assert_eq!(open().unwrap_err().to_string(), "IO error: boom");
    assert!(matches!(port().unwrap_err(), DemoError::Parse { context: None, .. }));
}

#[test]
fn context_replaces_previous_context() {
    let result: Result<(), DemoError> =
        Err(DemoError::Lookup { module_id: "hud".into(), context: Some("first".into()) });

    let err = result.context("Resolving module").unwrap_err();
    assert_eq!(err.to_string(), "Lookup failed (Resolving module): hud");
}

#[test]
fn with_context_is_lazy() {
    let built = Cell::new(0);
    let describe = || {
        built.set(built.get() + 1);
        format!("Parsing port for '{}'", "network")
    };

    let ok = "25565".parse::<u16>().with_context(describe);
    assert_eq!(ok.unwrap(), 25565);
    assert_eq!(built.get(), 0);

    let err = "x".parse::<u16>().with_context(describe).unwrap_err();
    assert_eq!(built.get(), 1);
    assert!(err.to_string().starts_with("Parse error (Parsing port for 'network'): "));
}
