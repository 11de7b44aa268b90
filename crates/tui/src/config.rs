use std::{fs, path::PathBuf};

use anyhow::{Context, Result};
use arrow_state::{HistoryOptions, UpdateOn};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Behaviors attached to one demo field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    pub history: HistoryOptions,
    pub submit_on_ctrl_enter: bool,
    pub update_on: UpdateOn,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            history: HistoryOptions::default(),
            submit_on_ctrl_enter: true,
            update_on: UpdateOn::Change,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    pub name: FieldConfig,
    pub description: FieldConfig,
}

pub fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "arrow-state")
}

pub fn config_path() -> Option<PathBuf> {
    Some(project_dirs()?.config_dir().join("demo.json"))
}

pub fn load() -> Result<DemoConfig> {
    let Some(path) = config_path() else {
        warn!(target: "config", "no config directory on this platform; using defaults");
        return Ok(DemoConfig::default());
    };
    if !path.exists() {
        return Ok(DemoConfig::default());
    }
    let data =
        fs::read(&path).with_context(|| format!("read config file: {}", path.display()))?;
    let cfg = parse(&data).with_context(|| format!("parse config: {}", path.display()))?;
    info!(target: "config", path = %path.display(), ?cfg, "loaded");
    Ok(cfg)
}

fn parse(data: &[u8]) -> Result<DemoConfig> {
    let cfg: DemoConfig = serde_json::from_slice(data)?;
    for (field, fc) in [("name", &cfg.name), ("description", &cfg.description)] {
        if !fc.history.save_unsubmitted_values {
            warn!(target: "config", field, "save_unsubmitted_values is not used by history cycling");
        }
    }
    Ok(cfg)
}
