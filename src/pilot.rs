use image::RgbImage;
use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use crate::config::PilotConfig;
use crate::error::{Result, VisError};
use crate::inference::{CategoricalPilot, LinearPilot};
use crate::types::Controls;

/// Something that turns a camera frame into steering and throttle.
pub trait Pilot {
    fn name(&self) -> String;
    fn run(&mut self, image: &RgbImage) -> Result<Controls>;
}

/// The pilots `--model` can name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PilotKind {
    Linear,
    Categorical,
    Constant,
}

impl PilotKind {
    pub const ALL: [PilotKind; 3] = [PilotKind::Linear, PilotKind::Categorical, PilotKind::Constant];

    pub fn key(&self) -> &'static str {
        match self {
            PilotKind::Linear => "linear",
            PilotKind::Categorical => "categorical",
            PilotKind::Constant => "constant",
        }
    }

    /// Model class paths used by donkeycar's own tooling.
    fn aliases(&self) -> &'static [&'static str] {
        match self {
            PilotKind::Linear => &["donkeycar.parts.keras.KerasLinear"],
            PilotKind::Categorical => &["donkeycar.parts.keras.KerasCategorical"],
            PilotKind::Constant => &[],
        }
    }
}

impl fmt::Display for PilotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for PilotKind {
    type Err = VisError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        PilotKind::ALL
            .into_iter()
            .find(|kind| kind.key().eq_ignore_ascii_case(s) || kind.aliases().contains(&s))
            .ok_or_else(|| {
                let known: Vec<_> = PilotKind::ALL.iter().map(PilotKind::key).collect();
                VisError::Config(format!("unknown model '{}', expected one of: {}", s, known.join(", ")))
            })
    }
}

/// Loads the pilot named by `kind` from `snapshot`. Called once at startup.
pub fn load_pilot(kind: PilotKind, snapshot: &Path, config: &PilotConfig) -> Result<Box<dyn Pilot>> {
    if !snapshot.exists() {
        return Err(VisError::load(snapshot, "snapshot not found"));
    }

    let pilot: Box<dyn Pilot> = match kind {
        PilotKind::Linear => Box::new(LinearPilot::new(snapshot, config)?),
        PilotKind::Categorical => Box::new(CategoricalPilot::new(snapshot, config)?),
        PilotKind::Constant => Box::new(ConstantPilot::from_snapshot(snapshot)?),
    };
    tracing::info!(pilot = %pilot.name(), snapshot = %snapshot.display(), "loaded pilot");
    Ok(pilot)
}

/// Always answers with the same controls. Its snapshot is a JSON file
/// such as `{"angle": 0.0, "throttle": 0.0}`.
pub struct ConstantPilot {
    controls: Controls,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ConstantSnapshot {
    angle: f32,
    throttle: f32,
}

impl ConstantPilot {
    pub fn new(controls: Controls) -> Self {
        Self { controls }
    }

    pub fn from_snapshot(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| VisError::load(path, e))?;
        // serde would also accept `[angle, throttle]` for the struct
        let value: serde_json::Value = serde_json::from_str(&content).map_err(|e| VisError::load(path, e))?;
        if !value.is_object() {
            return Err(VisError::load(path, "expected an object with angle and throttle"));
        }
        let snapshot: ConstantSnapshot = serde_json::from_value(value).map_err(|e| VisError::load(path, e))?;
        Ok(Self::new(Controls::new(snapshot.angle, snapshot.throttle)))
    }
}

impl Pilot for ConstantPilot {
    fn name(&self) -> String {
        format!("Constant ({:.3}, {:.2})", self.controls.angle, self.controls.throttle)
    }

    fn run(&mut self, _image: &RgbImage) -> Result<Controls> {
        Ok(self.controls)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_key_and_alias() {
        assert_eq!("linear".parse::<PilotKind>().unwrap(), PilotKind::Linear);
        assert_eq!("Categorical".parse::<PilotKind>().unwrap(), PilotKind::Categorical);
        assert_eq!(
            "donkeycar.parts.keras.KerasLinear".parse::<PilotKind>().unwrap(),
            PilotKind::Linear
        );
        assert_eq!(
            "donkeycar.parts.keras.KerasCategorical".parse::<PilotKind>().unwrap(),
            PilotKind::Categorical
        );
        assert!(matches!(
            "donkeycar.parts.keras.KerasRNN".parse::<PilotKind>(),
            Err(VisError::Config(_))
        ));
    }

    #[test]
    fn test_constant_pilot_from_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("zero.json");
        fs::write(&path, r#"{"angle": -0.25, "throttle": 0.5}"#).unwrap();

        let mut pilot = load_pilot(PilotKind::Constant, &path, &PilotConfig::default()).unwrap();
        let controls = pilot.run(&RgbImage::new(4, 4)).unwrap();
        assert_eq!(controls, Controls::new(-0.25, 0.5));
    }

    #[test]
    fn test_missing_snapshot_is_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_pilot(PilotKind::Linear, &dir.path().join("pilot.onnx"), &PilotConfig::default());
        assert!(matches!(result, Err(VisError::Load { .. })));
    }

    #[test]
    fn test_bad_constant_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("zero.json");
        fs::write(&path, "[1, 2]").unwrap();
        assert!(matches!(ConstantPilot::from_snapshot(&path), Err(VisError::Load { .. })));
    }

    #[test]
    fn test_constant_snapshot_needs_both_controls() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("half.json");
        fs::write(&path, r#"{"angle": 0.5}"#).unwrap();
        assert!(matches!(ConstantPilot::from_snapshot(&path), Err(VisError::Load { .. })));

        fs::write(&path, r#"{"angle": 0.5, "throttle": 0.1, "steering": 1.0}"#).unwrap();
        assert!(matches!(ConstantPilot::from_snapshot(&path), Err(VisError::Load { .. })));
    }
}
