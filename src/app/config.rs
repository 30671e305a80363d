//! File configuration loading for CLI defaults.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use harvester_core::batch::{DEFAULT_COLLECTION_DELAY, DEFAULT_OUTPUT_ROOT};
use harvester_core::fetch::constants::TIMEOUT_SECS;
use harvester_core::{
    AcceptancePolicy, AcceptancePreset, DriverSettings, PolitenessDelays, ResolveStrategy,
    SplitPolicy, resolve_user_agent,
};

use crate::cli::RunOptions;

/// Key = value file configuration for harvester defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileConfig {
    /// Root directory for collection output.
    pub output_root: Option<PathBuf>,
    /// User-Agent header sent with every request.
    pub user_agent: Option<String>,
    /// Request timeout in seconds.
    pub timeout_secs: Option<u64>,
    /// Pause after each image in milliseconds.
    pub image_delay_ms: Option<u64>,
    /// Pause after each detail page in milliseconds.
    pub detail_delay_ms: Option<u64>,
    /// Pause between search-result pages in milliseconds.
    pub page_delay_ms: Option<u64>,
    /// Pause between collections in milliseconds.
    pub collection_delay_ms: Option<u64>,
    /// Acceptance thresholds preset.
    pub acceptance: Option<AcceptancePreset>,
    /// Split stacked composite images into tiles.
    pub split_composites: Option<bool>,
    /// Image resolution strategy.
    pub strategy: Option<ResolveStrategy>,
    /// Page cap per collection.
    pub max_pages: Option<u32>,
}

impl FileConfig {
    /// Validates config values against runtime constraints.
    pub fn validate(&self) -> Result<()> {
        if let Some(timeout) = self.timeout_secs
            && !(1..=3600).contains(&timeout)
        {
            bail!("Invalid config value for `timeout_secs`: {timeout}. Expected range: 1..=3600");
        }
        validate_delay_ms("image_delay_ms", self.image_delay_ms)?;
        validate_delay_ms("detail_delay_ms", self.detail_delay_ms)?;
        validate_delay_ms("page_delay_ms", self.page_delay_ms)?;
        validate_delay_ms("collection_delay_ms", self.collection_delay_ms)?;
        if self.max_pages == Some(0) {
            bail!("Invalid config value for `max_pages`: 0. Expected at least 1");
        }
        if let Some(user_agent) = &self.user_agent
            && user_agent.trim().is_empty()
        {
            bail!("Invalid config value for `user_agent`: must not be blank");
        }
        Ok(())
    }
}

fn validate_delay_ms(field: &str, value: Option<u64>) -> Result<()> {
    let Some(value) = value else {
        return Ok(());
    };
    if value > 600_000 {
        bail!("Invalid config value for `{field}`: {value}. Expected range: 0..=600000");
    }
    Ok(())
}

/// Effective settings for one scraping command.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Root directory for collection output.
    pub output_root: PathBuf,
    /// User-Agent header.
    pub user_agent: String,
    /// Request timeout.
    pub timeout: Duration,
    /// Pause between collections.
    pub collection_delay: Duration,
    /// Pagination driver settings.
    pub driver: DriverSettings,
}

impl RunConfig {
    /// Merges CLI options over file config over built-in defaults.
    #[must_use]
    pub fn resolve(options: &RunOptions, file: &FileConfig) -> Self {
        let preset = options.acceptance.or(file.acceptance).unwrap_or_default();
        let split = !options.no_split && file.split_composites.unwrap_or(true);
        let policy = if split {
            AcceptancePolicy::from_preset(preset).with_split(SplitPolicy::default())
        } else {
            AcceptancePolicy::from_preset(preset).without_split()
        };

        let defaults = PolitenessDelays::default();
        let delays = PolitenessDelays {
            image: file
                .image_delay_ms
                .map_or(defaults.image, Duration::from_millis),
            detail: file
                .detail_delay_ms
                .map_or(defaults.detail, Duration::from_millis),
            page: file.page_delay_ms.map_or(defaults.page, Duration::from_millis),
        };

        Self {
            output_root: options
                .output_root
                .clone()
                .or_else(|| file.output_root.clone())
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_ROOT)),
            user_agent: resolve_user_agent(file.user_agent.as_deref()),
            timeout: Duration::from_secs(file.timeout_secs.unwrap_or(TIMEOUT_SECS)),
            collection_delay: file
                .collection_delay_ms
                .map_or(DEFAULT_COLLECTION_DELAY, Duration::from_millis),
            driver: DriverSettings {
                strategy: options.strategy.or(file.strategy).unwrap_or_default(),
                policy,
                delays,
                max_pages: options.page_cap().or(file.max_pages),
                ..DriverSettings::default()
            },
        }
    }
}

/// Resolves default config path.
///
/// Priority:
/// 1. `$XDG_CONFIG_HOME/harvester/config.toml`
/// 2. `$HOME/.config/harvester/config.toml`
#[must_use]
pub fn resolve_default_config_path() -> Option<PathBuf> {
    if let Some(xdg_config_home) = env_var_non_empty_os("XDG_CONFIG_HOME") {
        return Some(
            PathBuf::from(xdg_config_home)
                .join("harvester")
                .join("config.toml"),
        );
    }

    let home = env_var_non_empty_os("HOME")?;
    Some(
        PathBuf::from(home)
            .join(".config")
            .join("harvester")
            .join("config.toml"),
    )
}

fn env_var_non_empty_os(name: &str) -> Option<std::ffi::OsString> {
    let value = env::var_os(name)?;
    if value.is_empty() { None } else { Some(value) }
}

/// Loads the file config.
///
/// An explicit path must exist. The default path is optional: a missing file
/// yields an empty config.
pub fn load_file_config(explicit: Option<&Path>) -> Result<FileConfig> {
    if let Some(path) = explicit {
        return read_file_config(path);
    }
    match resolve_default_config_path() {
        Some(path) if path.exists() => read_file_config(&path),
        _ => Ok(FileConfig::default()),
    }
}

fn read_file_config(path: &Path) -> Result<FileConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
    parse_config_str(&raw)
        .with_context(|| format!("Failed to parse config file '{}'", path.display()))
}

fn parse_config_str(raw: &str) -> Result<FileConfig> {
    let mut cfg = FileConfig::default();
    for (line_index, raw_line) in raw.lines().enumerate() {
        let line_number = line_index + 1;
        let line = strip_inline_comment(raw_line).trim();
        if line.is_empty() {
            continue;
        }

        let Some((raw_key, raw_value)) = line.split_once('=') else {
            bail!("Invalid config syntax on line {line_number}: expected key = value");
        };

        let key = raw_key.trim();
        let value = raw_value.trim();
        let context = || format!("Invalid `{key}` value on line {line_number}");

        match key {
            "output_root" => {
                cfg.output_root = Some(PathBuf::from(
                    parse_string_literal(value).with_context(context)?,
                ));
            }
            "user_agent" => {
                cfg.user_agent = Some(parse_string_literal(value).with_context(context)?);
            }
            "timeout_secs" => cfg.timeout_secs = Some(parse_integer_u64(value).with_context(context)?),
            "image_delay_ms" => {
                cfg.image_delay_ms = Some(parse_integer_u64(value).with_context(context)?);
            }
            "detail_delay_ms" => {
                cfg.detail_delay_ms = Some(parse_integer_u64(value).with_context(context)?);
            }
            "page_delay_ms" => {
                cfg.page_delay_ms = Some(parse_integer_u64(value).with_context(context)?);
            }
            "collection_delay_ms" => {
                cfg.collection_delay_ms = Some(parse_integer_u64(value).with_context(context)?);
            }
            "acceptance" => {
                let parsed = parse_string_literal(value).with_context(context)?;
                cfg.acceptance = Some(
                    parsed
                        .parse::<AcceptancePreset>()
                        .map_err(anyhow::Error::msg)
                        .with_context(context)?,
                );
            }
            "split_composites" => {
                cfg.split_composites = Some(parse_boolean(value).with_context(context)?);
            }
            "strategy" => {
                let parsed = parse_string_literal(value).with_context(context)?;
                cfg.strategy = Some(
                    parsed
                        .parse::<ResolveStrategy>()
                        .map_err(anyhow::Error::msg)
                        .with_context(context)?,
                );
            }
            "max_pages" => {
                let parsed = parse_integer_u64(value).with_context(context)?;
                let pages = u32::try_from(parsed)
                    .map_err(|_| anyhow::anyhow!("max_pages out of range for u32"))?;
                cfg.max_pages = Some(pages);
            }
            unknown => {
                bail!("Unknown configuration key: '{unknown}' on line {line_number}");
            }
        }
    }
    cfg.validate()?;
    Ok(cfg)
}

fn strip_inline_comment(line: &str) -> &str {
    let mut in_string = false;
    for (index, ch) in line.char_indices() {
        match ch {
            '"' => in_string = !in_string,
            '#' if !in_string => return &line[..index],
            _ => {}
        }
    }
    line
}

fn parse_string_literal(raw_value: &str) -> Result<String> {
    if raw_value.len() < 2 || !raw_value.starts_with('"') || !raw_value.ends_with('"') {
        bail!("Expected double-quoted string");
    }
    Ok(raw_value[1..raw_value.len() - 1].to_string())
}

fn parse_integer_u64(raw_value: &str) -> Result<u64> {
    let token = raw_value.trim();
    if token.is_empty() {
        bail!("Expected integer value");
    }
    let value = token.parse::<i128>()?;
    if value < 0 {
        bail!("Expected non-negative integer");
    }
    u64::try_from(value).map_err(|_| anyhow::anyhow!("Integer value out of range for u64"))
}

fn parse_boolean(raw_value: &str) -> Result<bool> {
    match raw_value.trim() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => bail!("Expected 'true' or 'false'"),
    }
}
