use hatch_domain::config::LoggingConfig;
use hatch_logger::{Logger, LoggerError};
use std::fs;
use std::time::Duration;
use tempfile::tempdir;

#[test]
fn unknown_level_is_rejected_before_install() {
    let config = LoggingConfig { level: "chatty".to_owned(), ..LoggingConfig::default() };

    let err = Logger::from_config("hatch-bad-level", &config).expect_err("level is invalid");

    assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));
}

#[test]
fn config_with_path_writes_json_file() -> Result<(), Box<dyn std::error::Error>> {
    let tmp_dir = tempdir()?;
    let log_dir = tmp_dir.path().join("logs");
    let config = LoggingConfig {
        level: "debug".to_owned(),
        console: false,
        path: Some(log_dir.clone()),
        json: true,
        max_files: 3,
        env_filter: None,
    };

    let logger = Logger::from_config("hatch-from-config", &config)?;
    assert!(logger.guard().is_some());

    tracing::info!(tag = "hello-widget", "Element type registered");
    std::thread::sleep(Duration::from_millis(30));
    drop(logger);

    let log_file = fs::read_dir(&log_dir)?
        .flatten()
        .map(|entry| entry.path())
        .find(|path| path.extension().and_then(|ext| ext.to_str()) == Some("log"))
        .expect("log file should be created");
    let contents = fs::read_to_string(log_file)?;

    assert!(contents.contains("\"tag\":\"hello-widget\""), "json fields expected: {contents}");
    Ok(())
}
