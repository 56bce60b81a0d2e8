use crate::app::cli::TidyArgs;
use crate::app::models::{RuntimeConfig, TidyMode};
use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

/// File tidy reads its settings from, looked up inside the config directory.
pub const TIDY_CONFIG_NAME: &str = "tidy_config.txt";

const DEFAULT_TIDY_BIN: &str = "tidy";

#[derive(Deserialize, Debug)]
struct PresetsFile {
    #[serde(flatten)]
    presets: HashMap<String, PresetConfig>,
}

#[derive(Deserialize, Debug, Clone, Default)]
struct PresetConfig {
    config_dir: Option<PathBuf>,
    tidy_bin: Option<String>,
}

fn load_presets_file() -> Result<HashMap<String, PresetConfig>> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    let config_path = home.join(".config").join("site_tidy").join("presets.toml");

    if !config_path.exists() {
        return Ok(HashMap::new());
    }

    let content = fs::read_to_string(&config_path)
        .context(format!("Failed to read config at {:?}", config_path))?;

    let parsed: PresetsFile = toml::from_str(&content).context("Failed to parse presets.toml")?;

    Ok(parsed.presets)
}

pub fn resolve_config(cli: TidyArgs, project_name: Option<&str>) -> Result<RuntimeConfig> {
    let presets = load_presets_file()?;

    // Determine preset to use: CLI flag > Auto-detect > None
    let preset_key = cli.preset.as_deref().or(project_name);
    let preset = preset_key
        .and_then(|k| presets.get(k))
        .cloned()
        .unwrap_or_default();

    merge(cli, preset)
}

fn merge(cli: TidyArgs, preset: PresetConfig) -> Result<RuntimeConfig> {
    let tidy_bin = cli
        .tidy_bin
        .or(preset.tidy_bin)
        .unwrap_or_else(|| DEFAULT_TIDY_BIN.to_string());

    let mode = if cli.inline {
        TidyMode::Inline
    } else {
        let config_dir = cli.config_dir.or(preset.config_dir).context(
            "No tidy config directory set; pass --config-dir, add one to presets.toml, or use --inline",
        )?;
        let config_file = config_dir.join(TIDY_CONFIG_NAME);
        if !config_file.is_file() {
            bail!("Tidy config not found at {:?}", config_file);
        }
        TidyMode::Config { config_file }
    };

    Ok(RuntimeConfig { tidy_bin, mode })
}
