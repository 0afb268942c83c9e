use insta::assert_debug_snapshot;
use loom_actions::core::config::loader::CONFIG_FILE_NAME;
use loom_actions::core::{ConfigLoader, ConfigValidator, ErrorCategory};
use loom_actions::logging::{ConsoleOutput, LoggingConfig};
use serial_test::serial;
use std::env;
use std::fs;
use tempfile::TempDir;

fn clear_actions_env() {
    for v in &[
        "LOOM_ACTIONS_DEFAULT_RUNNER",
        "LOOM_ACTIONS_TRIGGER_BRANCHES",
        "LOOM_ACTIONS_SORT_KEYS",
        "LOOM_ACTIONS_FETCH_TIMEOUT",
        "LOG_LEVEL",
    ] {
        env::remove_var(v);
    }
}

const FULL_CONFIG: &str = r#"
[generator]
default_runner = "self-hosted"
trigger_branches = ["main", "release"]

[generator.emit]
sort_keys = true

[fetch]
timeout_seconds = 5

[logging]
default_level = "debug"
console_output = "none"
"#;

/// Generator and logging settings come from the same file
#[test]
#[serial]
fn test_config_file_feeds_generator_and_logging() {
    clear_actions_env();
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join(CONFIG_FILE_NAME);
    fs::write(&config_path, FULL_CONFIG).unwrap();

    let config = ConfigLoader::load_from_dir(temp_dir.path()).unwrap();
    assert_debug_snapshot!(config, @r###"
    ActionsConfig {
        generator: GeneratorConfig {
            default_runner: "self-hosted",
            trigger_branches: [
                "main",
                "release",
            ],
            emit: EmitStyle {
                default_flow_style: false,
                sort_keys: true,
            },
        },
        fetch: FetchSettings {
            timeout_seconds: 5,
        },
    }
    "###);
    assert!(ConfigValidator::validate(&config).is_ok());

    let logging = LoggingConfig::load(Some(&config_path)).unwrap();
    assert_eq!(logging.default_level, "debug");
    assert_eq!(logging.console_output, ConsoleOutput::None);
}

#[test]
#[serial]
fn test_env_overrides_beat_file_values() {
    clear_actions_env();
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join(CONFIG_FILE_NAME), FULL_CONFIG).unwrap();

    env::set_var("LOOM_ACTIONS_DEFAULT_RUNNER", "windows-latest");
    env::set_var("LOOM_ACTIONS_TRIGGER_BRANCHES", "develop, , hotfix");
    env::set_var("LOOM_ACTIONS_FETCH_TIMEOUT", "not-a-number");

    let config = ConfigLoader::load_from_dir(temp_dir.path()).unwrap();
    assert_eq!(config.generator.default_runner, "windows-latest");
    assert_eq!(config.generator.trigger_branches, vec!["develop", "hotfix"]);
    assert_eq!(config.fetch.timeout_seconds, 5);

    clear_actions_env();
}

#[test]
#[serial]
fn test_missing_file_uses_defaults_unless_explicit() {
    clear_actions_env();
    let temp_dir = TempDir::new().unwrap();

    let config = ConfigLoader::load_from_dir(temp_dir.path()).unwrap();
    assert_eq!(config.generator.default_runner, "ubuntu-latest");
    assert_eq!(config.generator.trigger_branches, vec!["main"]);

    let missing = temp_dir.path().join("custom.toml");
    let err = ConfigLoader::load_explicit(&missing).unwrap_err();
    assert_eq!(err.category, ErrorCategory::IoError);
    assert!(err.message.contains("does not exist"));
}

#[test]
#[serial]
fn test_invalid_values_are_rejected() {
    clear_actions_env();
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("loom.toml");

    fs::write(&config_path, "[generator]\ntrigger_branches = []\n").unwrap();
    let config = ConfigLoader::load_explicit(&config_path).unwrap();
    let err = ConfigValidator::validate(&config).unwrap_err();
    assert_eq!(err.category, ErrorCategory::ValidationError);

    fs::write(&config_path, "[fetch]\ntimeout_seconds = \"soon\"\n").unwrap();
    let err = ConfigLoader::load_explicit(&config_path).unwrap_err();
    assert_eq!(err.category, ErrorCategory::ValidationError);
    assert!(err.message.contains("Failed to parse config file"));
}

#[test]
#[serial]
fn test_log_level_env_overrides_file() {
    clear_actions_env();
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join(CONFIG_FILE_NAME);
    fs::write(&config_path, FULL_CONFIG).unwrap();

    env::set_var("LOG_LEVEL", "WARN");
    let logging = LoggingConfig::load(Some(&config_path)).unwrap();
    assert_eq!(logging.default_level, "warn");

    clear_actions_env();
}
