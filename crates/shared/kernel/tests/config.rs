use hatch_kernel::config::load_config;
use hatch_kernel::domain::config::HatchConfig;
use std::fs;
use std::time::Duration;
use tempfile::tempdir;

#[test]
fn loads_toml_file_into_hatch_config() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let path = dir.path().join("page.toml");
    fs::write(
        &path,
        r#"
[loader]
script_timeout_ms = 1500

[public]
base_url = "https://cdn.example"

[[widgets]]
name = "hello"
tag = "hello-widget"
"#,
    )?;

    let cfg: HatchConfig = load_config(Some(&path))?;
    assert_eq!(cfg.loader.script_timeout(), Duration::from_millis(1500));
    assert_eq!(cfg.public.base_url, "https://cdn.example");
    assert_eq!(cfg.widgets.len(), 1);
    assert_eq!(cfg.widgets[0].tag, "hello-widget");
    assert_eq!(cfg.elements.location_attribute, "location");
    Ok(())
}

#[test]
fn missing_file_is_an_error() {
    let dir = tempdir().expect("temp dir");
    let result = load_config::<HatchConfig>(Some(dir.path().join("absent.toml")));
    assert!(result.is_err());
}
