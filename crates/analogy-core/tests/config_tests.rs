use analogy_core::{ConfigError, EngineConfig, PipelineConfig, PipelineOptions};
use std::io::Write;
use std::time::Duration;

#[test]
fn test_load_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
[pipeline]
max_refinements = 2
acceptance_threshold = 0.75
stage_timeout_secs = 30

[backend]
endpoint = "https://lab.openai.azure.com/"
api_key = "secret"
deployment = "gpt-4o-mini"
"#
    )
    .unwrap();

    let config = EngineConfig::from_file(file.path()).unwrap();
    assert_eq!(config.pipeline.max_refinements, 2);
    assert_eq!(config.pipeline.stage_timeout_secs, 30);
    assert_eq!(config.backend.deployment, "gpt-4o-mini");
    assert!(config.validate(true).is_ok());
    assert!(!format!("{:?}", config.backend).contains("secret"));

    let options = PipelineOptions::try_from(&config.pipeline).unwrap();
    assert_eq!(options.acceptance.threshold(), 0.75);
    assert_eq!(options.stage_timeout, Duration::from_secs(30));
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = EngineConfig::load(Some(&dir.path().join("absent.toml"))).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
}

#[test]
fn test_mistyped_value_is_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("analogy.toml");
    std::fs::write(&path, "[pipeline]\nmax_refinements = \"two\"\n").unwrap();
    assert!(matches!(EngineConfig::from_file(&path), Err(ConfigError::Parse(_))));
}

#[test]
fn test_options_reject_bad_values() {
    let config = PipelineConfig {
        acceptance_threshold: -0.1,
        ..PipelineConfig::default()
    };
    assert!(PipelineOptions::try_from(&config).is_err());

    let config = PipelineConfig {
        stage_timeout_secs: 0,
        ..PipelineConfig::default()
    };
    assert!(matches!(PipelineOptions::try_from(&config), Err(ConfigError::Invalid(_))));
}
