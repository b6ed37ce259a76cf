use config::{Config, Environment, File};
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use tracing::info;

/// Prefix of the environment overrides (`HATCH__LOADER__SCRIPT_TIMEOUT_MS`).
pub const ENV_PREFIX: &str = "HATCH";

/// Custom error type for config loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config error{}: {source}", format_context(.context))]
    Config { source: config::ConfigError, context: Option<Cow<'static, str>> },
}

fn format_context(context: &Option<Cow<'static, str>>) -> Cow<'static, str> {
    context.as_ref().map_or(Cow::Borrowed(""), |c| Cow::Owned(format!(" ({c})")))
}

trait ConfigErrorExt<T> {
    fn context(self, context: &'static str) -> Result<T, ConfigError>;
}

impl<T> ConfigErrorExt<T> for Result<T, config::ConfigError> {
    fn context(self, context: &'static str) -> Result<T, ConfigError> {
        self.map_err(|source| ConfigError::Config { source, context: Some(context.into()) })
    }
}

/// Layered configuration loader: a base file plus environment overrides.
///
/// 1. **Base File**: settings from `path` (format picked from the extension). Defaults to
///    `hatch` in the current working directory. Unlike the environment layer, the file is
///    required.
/// 2. **Environment Overrides**: variables prefixed with `HATCH__`; nested keys use double
///    underscores (`HATCH__PUBLIC__BASE_URL` maps to `public.base_url`).
///
/// # Errors
/// * The configuration file cannot be found or parsed.
/// * The merged content does not match the structure of `T`.
///
/// # Example
/// ```rust
/// use hatch_kernel::config::load_config;
///
/// #[derive(Default, serde::Deserialize)]
/// struct PageConfig {
///     base_url: String,
/// }
///
/// let cfg: PageConfig = load_config(Some("config/page")).unwrap_or_default();
/// ```
pub fn load_config<T>(path: Option<impl AsRef<Path>>) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    let effective_path = path.map_or_else(|| PathBuf::from("hatch"), |p| p.as_ref().to_path_buf());

    let builder = Config::builder()
        .add_source(File::from(effective_path.as_path()).required(true))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true)
                .convert_case(config::Case::Snake),
        );

    info!("Loading config from {}", effective_path.display());

    let config = builder
        .build()
        .context("Failed to build config")?
        .try_deserialize::<T>()
        .context("Failed to deserialize config")?;

    Ok(config)
}
