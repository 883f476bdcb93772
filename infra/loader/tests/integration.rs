use serde::Deserialize;
use serde_json::{Value, json};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::tempdir;
use tlib_loader::{
    LoaderError, discover, load_config, load_module_config, load_module_config_with_env,
    register_dir, register_file,
};
use tlib_registry::{ConfigRegistry, RegistryError};

#[derive(Debug, Deserialize, PartialEq, Eq)]
struct Network {
    host: String,
    port: u16,
}

fn write(path: &Path, contents: &str) {
    fs::write(path, contents).expect("write fixture");
}

#[test]
fn loads_toml_into_typed_config() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("network.toml");
    write(&file, "host = \"localhost\"\nport = 25565\n");

    let cfg: Network = load_config(&file).unwrap();
    assert_eq!(cfg, Network { host: "localhost".to_owned(), port: 25565 });
}

#[test]
fn missing_file_is_a_config_error() {
    let dir = tempdir().unwrap();
    let err = load_module_config::<Network>("network", dir.path().join("absent.toml")).unwrap_err();

    assert!(matches!(err, LoaderError::Config { ref context, .. } if context.is_some()));
}

#[test]
fn module_env_overrides_file_values() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("network.toml");
    write(&file, "host = \"localhost\"\nport = 25565\n");

    let env = [
        ("TLIB__NETWORK__PORT".to_owned(), "9000".to_owned()),
        ("TLIB__AUDIO__PORT".to_owned(), "1".to_owned()),
    ];
    let cfg: Network = load_module_config_with_env("network", &file, env).unwrap();

    assert_eq!(cfg.port, 9000);
    assert_eq!(cfg.host, "localhost");
}

#[test]
fn discover_lists_supported_files_sorted() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("zeta.yaml"), "a: 1\n");
    write(&dir.path().join("alpha.json"), "{\"a\": 1}");
    write(&dir.path().join("mid.toml"), "a = 1\n");
    write(&dir.path().join("notes.txt"), "ignored");
    fs::create_dir(dir.path().join("nested.toml")).unwrap();

    let ids: Vec<String> = discover(dir.path()).unwrap().into_iter().map(|s| s.module_id).collect();
    assert_eq!(ids, vec!["alpha", "mid", "zeta"]);
}

#[test]
fn discover_rejects_duplicate_stems() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("hud.toml"), "a = 1\n");
    write(&dir.path().join("hud.json"), "{\"a\": 1}");

    let err = discover(dir.path()).unwrap_err();
    assert!(matches!(err, LoaderError::DuplicateModule { ref module_id, .. } if module_id == "hud"));
}

#[test]
fn discover_on_missing_dir_fails() {
    let dir = tempdir().unwrap();
    let err = discover(dir.path().join("nope")).unwrap_err();
    assert!(matches!(err, LoaderError::Walk { .. }));
}

#[test]
fn register_dir_defers_loading_until_get() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("hud.json");
    write(&file, "{\"scale\": 1}");

    let registry = ConfigRegistry::new();
    let ids = register_dir::<Value>(&registry, dir.path()).unwrap();
    assert_eq!(ids, vec!["hud"]);
    assert!(!registry.is_materialized("hud"));

    write(&file, "{\"scale\": 2}");

    let first = registry.get::<Value>("hud").unwrap();
    let second = registry.get::<Value>("hud").unwrap();
    assert_eq!(*first, json!({ "scale": 2 }));
    assert!(Arc::ptr_eq(&first, &second));
}

#[test]
fn broken_file_is_retried_after_fix() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("network.toml");
    write(&file, "host = \"localhost\"\n");

    let registry = ConfigRegistry::new();
    register_file::<Network>(&registry, "network", &file).unwrap();

    let err = registry.get::<Network>("network").unwrap_err();
    let RegistryError::Factory { source, .. } = &err else {
        panic!("expected a factory failure, got {err:?}");
    };
    assert!(source.downcast_ref::<LoaderError>().is_some());

    write(&file, "host = \"localhost\"\nport = 7777\n");
    assert_eq!(registry.get::<Network>("network").unwrap().port, 7777);
}

#[test]
fn register_file_after_materialization_is_a_registry_error() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("network.toml");
    write(&file, "host = \"a\"\nport = 1\n");

    let registry = ConfigRegistry::new();
    register_file::<Network>(&registry, "network", &file).unwrap();
    registry.get::<Network>("network").unwrap();

    let err = register_file::<Network>(&registry, "network", &file).unwrap_err();
    assert!(matches!(
        err,
        LoaderError::Registry { source: RegistryError::AlreadyMaterialized { .. }, .. }
    ));
}
