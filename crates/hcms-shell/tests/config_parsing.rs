use std::{env, fs};

use hcms_shell::config::loader::load_config;

#[test]
fn config_parsing_and_env_overrides_and_validation() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let path = dir.path().join("hcms.toml");

    let toml_content = r#"
[server]
host = "127.0.0.1"
port = 8081
body_limit_bytes = 2048

[logging]
level = "debug"

[registry]
overlay = false
fetch_timeout_ms = 2500

[[registry.remotes]]
name = "patient-records"
base_url = "http://records.internal:4201"

[[registry.remotes]]
name = "lab-results"
base_url = "https://labs.internal/"

[loader]
timeout_ms = 5000

[[dashboard.slots]]
slot = "labsContainer"
remote = "lab-results"
"#;
    fs::write(&path, toml_content).expect("write toml");

    // 1) Valid config parses
    let cfg = load_config(path.to_str()).expect("should parse config");
    assert_eq!(cfg.server.port, 8081);
    assert_eq!(cfg.server.body_limit_bytes, 2048);
    assert_eq!(cfg.logging.level, "debug");
    assert!(!cfg.registry.overlay);
    assert_eq!(cfg.registry.fetch_timeout_ms, 2500);
    let names: Vec<_> = cfg.registry.remotes.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, ["patient-records", "lab-results"]);
    assert_eq!(cfg.loader.timeout_ms, 5000);
    assert_eq!(cfg.dashboard.slots.len(), 1);
    assert_eq!(cfg.dashboard.slots[0].exposed_module, "./Module");
    assert!(cfg.dashboard.slots[0].base_url.is_none());

    // 2) Env override should win over file
    unsafe {
        env::set_var("HCMS__REGISTRY__FETCH_TIMEOUT_MS", "750");
    }
    let cfg_env = load_config(path.to_str()).expect("should parse config with env overrides");
    assert_eq!(cfg_env.registry.fetch_timeout_ms, 750);
    unsafe {
        env::remove_var("HCMS__REGISTRY__FETCH_TIMEOUT_MS");
    }

    // 3) Validation failure on duplicate remotes
    let dup_path = dir.path().join("dup.toml");
    fs::write(
        &dup_path,
        r#"
[[registry.remotes]]
name = "demographics"
base_url = "http://localhost:4203"

[[registry.remotes]]
name = "demographics"
base_url = "http://localhost:5203"
"#,
    )
    .expect("write dup toml");
    let err = load_config(dup_path.to_str()).expect_err("duplicate remotes must be rejected");
    assert!(err.contains("duplicate remote name"), "{err}");

    // 4) Validation failure on a non-http base URL
    let bad_path = dir.path().join("bad.toml");
    fs::write(
        &bad_path,
        r#"
[[registry.remotes]]
name = "demographics"
base_url = "file:///srv/demographics"
"#,
    )
    .expect("write bad toml");
    assert!(load_config(bad_path.to_str()).is_err());
}

#[test]
fn missing_file_uses_portal_defaults() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let path = dir.path().join("absent.toml");

    let cfg = load_config(path.to_str()).expect("defaults should validate");
    assert_eq!(cfg.server.port, 4200);
    assert!(cfg.registry.overlay);
    let remotes: Vec<_> = cfg
        .registry
        .remotes
        .iter()
        .map(|r| (r.name.as_str(), r.base_url.as_str()))
        .collect();
    assert_eq!(
        remotes,
        [
            ("patient-records", "http://localhost:4201"),
            ("demographics", "http://localhost:4203"),
            ("appointment-scheduling", "http://localhost:4202"),
        ]
    );
    let slots: Vec<_> = cfg.dashboard.slots.iter().map(|s| s.slot.as_str()).collect();
    assert_eq!(slots, ["patientRecordsContainer", "appointmentSchedulingContainer"]);
}
