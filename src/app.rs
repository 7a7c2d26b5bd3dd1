use std::path::PathBuf;

use crate::config::AppConfig;
use crate::error::Result;
use crate::overlay::OverlayStyle;
use crate::pilot::{load_pilot, PilotKind};
use crate::tub::TubReader;
use crate::view::RecordView;

/// Everything loaded at startup. The window borrows it for its lifetime.
pub struct AppContext {
    pub view: RecordView,
    pub style: OverlayStyle,
    pub save_dir: PathBuf,
}

impl AppContext {
    /// Resolves the pilot, loads its snapshot, then opens the tub.
    /// Any failure here is fatal to the application.
    pub fn open(model: &str, snapshot: &str, tub: &str, config: &AppConfig) -> Result<Self> {
        let kind: PilotKind = model.parse()?;
        let snapshot = expand_home(snapshot);
        let pilot = load_pilot(kind, &snapshot, &config.pilot)?;
        let reader = TubReader::open(tub)?;

        Ok(Self {
            view: RecordView::new(reader, pilot),
            style: OverlayStyle::from_config(&config.ui)?,
            save_dir: PathBuf::from(&config.ui.save_dir),
        })
    }
}

/// `~/models/pilot.onnx` -> `$HOME/models/pilot.onnx`
pub fn expand_home(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::VisError;
    use crate::tub::tests::write_tub;
    use std::fs;

    #[test]
    fn test_expand_home() {
        assert_eq!(expand_home("/models/pilot.onnx"), PathBuf::from("/models/pilot.onnx"));
        assert_eq!(expand_home("pilot.onnx"), PathBuf::from("pilot.onnx"));
        if std::env::var_os("HOME").is_some() {
            assert!(!expand_home("~/pilot.onnx").starts_with("~"));
        }
    }

    #[test]
    fn test_open_with_constant_pilot() {
        let dir = tempfile::tempdir().unwrap();
        let tub = dir.path().join("tub");
        fs::create_dir(&tub).unwrap();
        write_tub(&tub, 3, 0);
        let snapshot = dir.path().join("zero.json");
        fs::write(&snapshot, r#"{"angle": 0.0, "throttle": 0.0}"#).unwrap();

        let ctx = AppContext::open(
            "constant",
            snapshot.to_str().unwrap(),
            tub.to_str().unwrap(),
            &AppConfig::default(),
        )
        .unwrap();
        assert_eq!(ctx.view.count(), 3);
        assert_eq!(ctx.save_dir, PathBuf::from("."));
    }

    #[test]
    fn test_unknown_model_fails_before_loading() {
        let result = AppContext::open("keras.Nope", "/missing", "/missing", &AppConfig::default());
        assert!(matches!(result, Err(VisError::Config(_))));
    }

    #[test]
    fn test_missing_tub_fails() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot = dir.path().join("zero.json");
        fs::write(&snapshot, r#"{"angle": 0.0, "throttle": 0.0}"#).unwrap();

        let result = AppContext::open(
            "constant",
            snapshot.to_str().unwrap(),
            dir.path().join("no_tub").to_str().unwrap(),
            &AppConfig::default(),
        );
        assert!(matches!(result, Err(VisError::Load { .. })));
    }
}
