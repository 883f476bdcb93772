use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tlib_registry::{ConfigRegistry, RegistryError, RegistryErrorExt};

#[derive(Debug, PartialEq, Eq)]
struct Config {
    value: u32,
}

#[derive(Debug)]
struct Other;

#[test]
fn repeated_get_returns_identical_instance() {
    let registry = ConfigRegistry::new();
    registry.register("mymod", || Config { value: 42 }).unwrap();

    let first = registry.get::<Config>("mymod").unwrap();
    let second = registry.get::<Config>("mymod").unwrap();

    assert_eq!(first.value, 42);
    assert!(Arc::ptr_eq(&first, &second));
    assert!(registry.is_materialized("mymod"));
}

#[test]
fn factory_runs_once_across_gets() {
    let calls = Arc::new(AtomicUsize::new(0));
    let registry = ConfigRegistry::new();

    let seen = Arc::clone(&calls);
    registry
        .register("counted", move || {
            seen.fetch_add(1, Ordering::SeqCst);
            Config { value: 1 }
        })
        .unwrap();

    for _ in 0..5 {
        registry.get::<Config>("counted").unwrap();
    }
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn unknown_module_is_not_registered() {
    let registry = ConfigRegistry::new();
    let err = registry.get::<Config>("missing").unwrap_err();

    assert!(matches!(err, RegistryError::NotRegistered { ref module_id, .. } if module_id == "missing"));
    assert_eq!(err.to_string(), "Module not registered: missing");
}

#[test]
fn second_registration_replaces_declared_factory() {
    let first_calls = Arc::new(AtomicUsize::new(0));
    let registry = ConfigRegistry::new();

    let seen = Arc::clone(&first_calls);
    registry
        .register("mymod", move || {
            seen.fetch_add(1, Ordering::SeqCst);
            Config { value: 1 }
        })
        .unwrap();
    registry.register("mymod", || Config { value: 2 }).unwrap();

    assert_eq!(registry.len(), 1);
    assert_eq!(registry.get::<Config>("mymod").unwrap().value, 2);
    assert_eq!(registry.get::<Config>("mymod").unwrap().value, 2);
    assert_eq!(first_calls.load(Ordering::SeqCst), 0);
}

#[test]
fn replacement_may_change_the_config_type() {
    let registry = ConfigRegistry::new();
    registry.register("mymod", || Config { value: 1 }).unwrap();
    registry.register("mymod", || Other).unwrap();

    assert!(registry.get::<Other>("mymod").is_ok());
    assert!(matches!(
        registry.get::<Config>("mymod").unwrap_err(),
        RegistryError::TypeMismatch { .. }
    ));
}

#[test]
fn registration_after_materialization_is_rejected() {
    let registry = ConfigRegistry::new();
    registry.register("mymod", || Config { value: 1 }).unwrap();
    let original = registry.get::<Config>("mymod").unwrap();

    let err = registry.register("mymod", || Config { value: 2 }).unwrap_err();
    assert!(matches!(err, RegistryError::AlreadyMaterialized { .. }));

    let again = registry.get::<Config>("mymod").unwrap();
    assert!(Arc::ptr_eq(&original, &again));
}

#[test]
fn unregister_allows_a_fresh_factory() {
    let registry = ConfigRegistry::new();
    registry.register("mymod", || Config { value: 1 }).unwrap();
    let old = registry.get::<Config>("mymod").unwrap();

    assert!(registry.unregister("mymod"));
    assert!(!registry.unregister("mymod"));
    assert!(!registry.contains("mymod"));

    registry.register("mymod", || Config { value: 2 }).unwrap();
    let new = registry.get::<Config>("mymod").unwrap();

    assert_eq!(old.value, 1);
    assert_eq!(new.value, 2);
    assert!(!Arc::ptr_eq(&old, &new));
}

#[test]
fn type_mismatch_names_both_types() {
    let registry = ConfigRegistry::new();
    registry.register("mymod", || Config { value: 1 }).unwrap();

    let err = registry.get::<Other>("mymod").unwrap_err();
    let RegistryError::TypeMismatch { expected, found, .. } = &err else {
        panic!("expected a type mismatch, got {err:?}");
    };
    assert!(expected.ends_with("Other"));
    assert!(found.ends_with("Config"));
    assert!(!registry.is_materialized("mymod"), "a mismatch must not materialize the entry");
}

#[test]
fn failed_factory_is_retried() {
    let attempts = Arc::new(AtomicUsize::new(0));
    let registry = ConfigRegistry::new();

    let seen = Arc::clone(&attempts);
    registry
        .register_fallible("flaky", move || {
            if seen.fetch_add(1, Ordering::SeqCst) == 0 {
                Err("disk not ready")
            } else {
                Ok(Config { value: 7 })
            }
        })
        .unwrap();

    let err = registry.get::<Config>("flaky").unwrap_err();
    assert!(matches!(err, RegistryError::Factory { .. }));
    assert_eq!(err.to_string(), "Config factory failed (Materializing module 'flaky'): disk not ready");
    assert!(!registry.is_materialized("flaky"));

    let cfg = registry.get::<Config>("flaky").unwrap();
    assert_eq!(cfg.value, 7);
    assert_eq!(attempts.load(Ordering::SeqCst), 2);
}

#[test]
fn failed_factory_keeps_entry_replaceable() {
    let registry = ConfigRegistry::new();
    registry.register_fallible("broken", || Err::<Config, _>("nope")).unwrap();
    assert!(registry.get::<Config>("broken").is_err());

    registry.register("broken", || Config { value: 3 }).unwrap();
    assert_eq!(registry.get::<Config>("broken").unwrap().value, 3);
}

#[test]
fn panicking_factory_leaves_entry_declared() {
    let attempts = Arc::new(AtomicUsize::new(0));
    let registry = ConfigRegistry::new();

    let seen = Arc::clone(&attempts);
    registry
        .register("panicky", move || {
            assert!(seen.fetch_add(1, Ordering::SeqCst) > 0, "first attempt blows up");
            Config { value: 9 }
        })
        .unwrap();

    let outcome = catch_unwind(AssertUnwindSafe(|| registry.get::<Config>("panicky")));
    assert!(outcome.is_err());
    assert!(!registry.is_materialized("panicky"));

    assert_eq!(registry.get::<Config>("panicky").unwrap().value, 9);
}

#[test]
fn factories_can_depend_on_other_modules() {
    let registry = Arc::new(ConfigRegistry::new());
    registry.register("base", || Config { value: 10 }).unwrap();

    let inner = Arc::clone(&registry);
    registry
        .register_fallible("derived", move || {
            let base = inner.get::<Config>("base")?;
            Ok::<_, RegistryError>(Config { value: base.value * 2 })
        })
        .unwrap();

    assert_eq!(registry.get::<Config>("derived").unwrap().value, 20);
    assert!(registry.is_materialized("base"));
}

#[test]
fn self_referencing_factory_reports_a_cycle() {
    let registry = Arc::new(ConfigRegistry::new());

    let inner = Arc::clone(&registry);
    registry
        .register_fallible("loop", move || {
            inner
                .get::<Config>("loop")
                .map(|cfg| Config { value: cfg.value })
                .context("Resolving loop from its own factory")
        })
        .unwrap();

    let err = registry.get::<Config>("loop").unwrap_err();
    let RegistryError::Factory { source, .. } = &err else {
        panic!("expected the factory to fail, got {err:?}");
    };
    let cause = source.downcast_ref::<RegistryError>().expect("registry error as cause");
    assert!(matches!(cause, RegistryError::CyclicDependency { .. }));
    assert!(!registry.is_materialized("loop"));
}

#[test]
fn error_context_is_appended() {
    let registry = ConfigRegistry::new();
    let err = registry.get::<Config>("absent").context("Loading HUD settings").unwrap_err();
    assert_eq!(err.to_string(), "Module not registered (Loading HUD settings): absent");
}
