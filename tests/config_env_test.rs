//! Environment layer of Settings loading.
//!
//! Kept as a single test in its own binary: it mutates the process
//! environment, which the other config tests read.

use std::env;
use std::fs;

use tempfile::TempDir;

use hirepass::config::Settings;

const VARS: [(&str, &str); 4] = [
    ("HIREPASS_DEFAULT_SERVICE__SEED", "123"),
    ("HIREPASS_DEFAULT_SERVICE__NAME", "Van"),
    ("HIREPASS_SUBMIT_TIMEOUT_MS", "77"),
    ("HIREPASS_DATA_DIR", "/tmp/hirepass-env"),
];

#[test]
fn given_env_vars_when_load_then_override_file_and_defaults() {
    // Arrange: file sets seed and timeout, env overrides both
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("hirepass.toml");
    fs::write(
        &path,
        r#"
submit_timeout_ms = 500

[default_service]
seed = 5
modulus = 9973
"#,
    )
    .unwrap();
    for (key, value) in VARS {
        env::set_var(key, value);
    }

    // Act
    let result = Settings::load_from(Some(&path));
    for (key, _) in VARS {
        env::remove_var(key);
    }
    let settings = result.unwrap();

    // Assert: env beats file, file beats defaults
    assert_eq!(settings.default_service.seed, 123);
    assert_eq!(settings.default_service.name, "Van");
    assert_eq!(settings.submit_timeout_ms, 77);
    assert_eq!(settings.data_dir.to_string_lossy(), "/tmp/hirepass-env");
    assert_eq!(settings.default_service.modulus, 9973);
    assert_eq!(settings.default_service.multiplier, 7);
}
