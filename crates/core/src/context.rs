use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::names::{OptionKey, OptionSet};

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("invalid scale value: {0:?}")]
    InvalidScale(String),
    #[error("invalid output folder")]
    MissingOutputFolder,
}

/// Behavior toggles, as chosen in the export dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExportOptions {
    /// Only export artboards and sub-prefabs marked for export.
    pub check_marked_for_export: bool,
    /// Enables `Input`, `Scroller` and the rich-text widget.
    pub enable_extended: bool,
    /// Run the resize probe and emit pivot/stretch fields.
    pub responsive_parameters: bool,
    /// Treat names ending in `/` as independent export roots.
    pub enable_sub_prefab: bool,
    #[serde(rename = "textToTextMeshPro")]
    pub text_to_rich_text: bool,
    pub force_text_to_image: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            check_marked_for_export: true,
            enable_extended: true,
            responsive_parameters: true,
            enable_sub_prefab: true,
            text_to_rich_text: true,
            force_text_to_image: false,
        }
    }
}

impl ExportOptions {
    /// Whether `key` is set and allowed by the current toggles.
    pub fn is_active(&self, options: &OptionSet, key: OptionKey) -> bool {
        let allowed = match key {
            OptionKey::Input | OptionKey::Scroller => self.enable_extended,
            OptionKey::SubPrefab => self.enable_sub_prefab,
            _ => true,
        };
        allowed && options.is_set(key)
    }
}

/// Tunables of the resize probe.
///
/// The host's layout engine reports slightly noisy geometry after a resize,
/// so anchors are classified with a ratio above the true midpoint and
/// stretch detection carries a relative slack.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProbeThresholds {
    pub delta_width: f64,
    pub delta_height: f64,
    pub anchor_ratio: f64,
    pub stretch_slack: f64,
}

impl Default for ProbeThresholds {
    fn default() -> Self {
        Self {
            delta_width: 100.0,
            delta_height: 100.0,
            anchor_ratio: 0.6,
            stretch_slack: 1.0001,
        }
    }
}

/// Scale as typed by the user: a number, or text that should parse as one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScaleInput {
    Number(f64),
    Text(String),
}

impl Default for ScaleInput {
    fn default() -> Self {
        Self::Number(1.0)
    }
}

impl ScaleInput {
    pub fn resolve(&self) -> Result<f64, ConfigError> {
        let value = match self {
            Self::Number(n) => *n,
            Self::Text(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| ConfigError::InvalidScale(s.clone()))?,
        };
        if !value.is_finite() || value <= 0.0 {
            return Err(ConfigError::InvalidScale(value.to_string()));
        }
        Ok(value)
    }
}

/// Unvalidated configuration surface, as loaded from a settings file or
/// assembled from command-line flags.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExportSettings {
    pub scale: ScaleInput,
    pub output_folder: Option<PathBuf>,
    #[serde(flatten)]
    pub options: ExportOptions,
    pub thresholds: ProbeThresholds,
}

/// Everything one export invocation reads. Built once, then passed by
/// reference through the whole walk.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportContext {
    pub scale: f64,
    pub output_folder: PathBuf,
    pub options: ExportOptions,
    pub thresholds: ProbeThresholds,
}

impl ExportContext {
    pub fn new(scale: f64, output_folder: impl Into<PathBuf>) -> Self {
        Self {
            scale,
            output_folder: output_folder.into(),
            options: ExportOptions::default(),
            thresholds: ProbeThresholds::default(),
        }
    }

    pub fn from_settings(settings: &ExportSettings) -> Result<Self, ConfigError> {
        let scale = settings.scale.resolve()?;
        let output_folder = settings
            .output_folder
            .clone()
            .filter(|p| !p.as_os_str().is_empty())
            .ok_or(ConfigError::MissingOutputFolder)?;
        Ok(Self {
            scale,
            output_folder,
            options: settings.options,
            thresholds: settings.thresholds,
        })
    }

    pub fn with_options(mut self, options: ExportOptions) -> Self {
        self.options = options;
        self
    }
}
