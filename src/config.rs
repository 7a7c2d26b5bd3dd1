use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{Result, VisError};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub ui: UiConfig,
    pub pilot: PilotConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Integer upscale applied to the camera image
    pub scale: u32,
    pub font_family: String, // e.g. "DejaVuSansMono"; bitmap fallback if not found
    pub font_size_pt: u32,
    pub bitmap_scale: usize,
    pub human_color_hex: String,
    pub pilot_color_hex: String,
    pub arrow_alpha: f32,
    pub save_dir: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PilotConfig {
    pub input_width: u32,
    pub input_height: u32,
    /// Divide pixel values by 255 before inference
    pub normalize: bool,
    pub intra_threads: usize,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            scale: 4,
            font_family: "DejaVuSansMono".to_string(),
            font_size_pt: 14,
            bitmap_scale: 2,
            human_color_hex: "#00FF00".to_string(),
            pilot_color_hex: "#FFFF00".to_string(),
            arrow_alpha: 0.7,
            save_dir: ".".to_string(),
        }
    }
}

impl Default for PilotConfig {
    fn default() -> Self {
        Self {
            input_width: 160,
            input_height: 120,
            normalize: true,
            intra_threads: 1,
        }
    }
}

impl AppConfig {
    pub const DEFAULT_PATH: &'static str = "donkeyvis.json";

    /// Reads the config at `path`. A missing file gives defaults; so does a
    /// malformed one, with a warning. The file is never written.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let config = match serde_json::from_str::<AppConfig>(&content) {
            Ok(c) => {
                tracing::info!(path = %path.display(), "loaded configuration");
                c
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "error parsing config, using defaults");
                Self::default()
            }
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_SCALE).contains(&self.ui.scale) {
            return Err(VisError::Config(format!(
                "ui.scale must be between 1 and {}, got {}",
                MAX_SCALE, self.ui.scale
            )));
        }
        if self.pilot.input_width == 0 || self.pilot.input_height == 0 {
            return Err(VisError::Config("pilot input size must be non-zero".to_string()));
        }
        parse_hex(&self.ui.human_color_hex)?;
        parse_hex(&self.ui.pilot_color_hex)?;
        Ok(())
    }
}

/// Largest accepted `ui.scale`; a 160x120 frame becomes 2560x1920.
pub const MAX_SCALE: u32 = 16;

/// Parses `#RRGGBB`.
pub fn parse_hex(hex: &str) -> Result<(u8, u8, u8)> {
    let digits = hex
        .strip_prefix('#')
        .filter(|d| d.len() == 6 && d.is_ascii())
        .ok_or_else(|| VisError::Config(format!("invalid colour '{}'", hex)))?;
    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&digits[range], 16)
            .map_err(|_| VisError::Config(format!("invalid colour '{}'", hex)))
    };
    Ok((channel(0..2)?, channel(2..4)?, channel(4..6)?))
}
