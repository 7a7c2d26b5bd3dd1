use image::{imageops::FilterType, RgbImage};
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Tensor;
use std::path::Path;

use crate::config::PilotConfig;
use crate::error::{Result, VisError};
use crate::pilot::Pilot;
use crate::types::Controls;

fn build_session(model_path: &Path, config: &PilotConfig) -> Result<Session> {
    let session = Session::builder()
        .map_err(|e| VisError::load(model_path, e))?
        .with_optimization_level(GraphOptimizationLevel::Level3)
        .map_err(|e| VisError::load(model_path, e))?
        .with_intra_threads(config.intra_threads)
        .map_err(|e| VisError::load(model_path, e))?
        .with_execution_providers([
            ort::execution_providers::CPUExecutionProvider::default().build(),
        ])
        .map_err(|e| VisError::load(model_path, e))?
        .commit_from_file(model_path)
        .map_err(|e| VisError::load(model_path, e))?;
    Ok(session)
}

/// RGB frame -> `[1, h, w, 3]` f32 in the layout the keras pilots were trained on.
fn image_to_input(image: &RgbImage, config: &PilotConfig) -> Vec<f32> {
    let (w, h) = (config.input_width, config.input_height);
    let resized;
    let frame = if image.dimensions() == (w, h) {
        image
    } else {
        resized = image::imageops::resize(image, w, h, FilterType::Triangle);
        &resized
    };

    let scale = if config.normalize { 1.0 / 255.0 } else { 1.0 };
    frame.as_raw().iter().map(|&p| p as f32 * scale).collect()
}

/// Runs `session` on one frame and copies every output out as a flat vector.
fn run_session(session: &mut Session, image: &RgbImage, config: &PilotConfig) -> Result<Vec<Vec<f32>>> {
    let shape = vec![1, config.input_height as i64, config.input_width as i64, 3];
    let input = Tensor::from_array((shape, image_to_input(image, config)))?;
    let outputs = session.run(ort::inputs![input])?;

    let mut values = Vec::with_capacity(outputs.len());
    for i in 0..outputs.len() {
        let (_shape, data) = outputs[i].try_extract_tensor::<f32>()?;
        values.push(data.to_vec());
    }
    Ok(values)
}

/// Angle and throttle as two scalar outputs, or packed into the first one.
fn linear_controls(outputs: &[Vec<f32>]) -> Result<Controls> {
    match outputs {
        [angle, throttle, ..] if !angle.is_empty() && !throttle.is_empty() => {
            Ok(Controls::new(angle[0], throttle[0]))
        }
        [packed, ..] if packed.len() >= 2 => Ok(Controls::new(packed[0], packed[1])),
        _ => Err(VisError::Inference(format!(
            "linear pilot expects angle and throttle outputs, got {} output(s)",
            outputs.len()
        ))),
    }
}

/// Maps the most likely of `bins` evenly spaced buckets back onto [-1, 1].
pub fn linear_unbin(bins: &[f32]) -> Option<f32> {
    if bins.len() < 2 {
        return None;
    }
    let (best, _) = bins
        .iter()
        .enumerate()
        .fold((0, f32::NEG_INFINITY), |(bi, bv), (i, &v)| if v > bv { (i, v) } else { (bi, bv) });
    Some(best as f32 * (2.0 / (bins.len() - 1) as f32) - 1.0)
}

fn categorical_controls(outputs: &[Vec<f32>]) -> Result<Controls> {
    match outputs {
        [angle_bins, throttle, ..] if !throttle.is_empty() => {
            let angle = linear_unbin(angle_bins).ok_or_else(|| {
                VisError::Inference(format!("expected angle bins, got {} value(s)", angle_bins.len()))
            })?;
            Ok(Controls::new(angle, throttle[0]))
        }
        _ => Err(VisError::Inference(format!(
            "categorical pilot expects angle bins and throttle outputs, got {} output(s)",
            outputs.len()
        ))),
    }
}

/// Exported `KerasLinear` model.
pub struct LinearPilot {
    session: Session,
    config: PilotConfig,
}

impl LinearPilot {
    pub fn new(model_path: &Path, config: &PilotConfig) -> Result<Self> {
        tracing::info!(path = %model_path.display(), "loading linear pilot");
        Ok(Self {
            session: build_session(model_path, config)?,
            config: config.clone(),
        })
    }
}

impl Pilot for LinearPilot {
    fn name(&self) -> String {
        "Linear (ONNX)".to_string()
    }

    fn run(&mut self, image: &RgbImage) -> Result<Controls> {
        let outputs = run_session(&mut self.session, image, &self.config)?;
        linear_controls(&outputs)
    }
}

/// Exported `KerasCategorical` model: 15 angle bins plus a throttle scalar.
pub struct CategoricalPilot {
    session: Session,
    config: PilotConfig,
}

impl CategoricalPilot {
    pub fn new(model_path: &Path, config: &PilotConfig) -> Result<Self> {
        tracing::info!(path = %model_path.display(), "loading categorical pilot");
        Ok(Self {
            session: build_session(model_path, config)?,
            config: config.clone(),
        })
    }
}

impl Pilot for CategoricalPilot {
    fn name(&self) -> String {
        "Categorical (ONNX)".to_string()
    }

    fn run(&mut self, image: &RgbImage) -> Result<Controls> {
        let outputs = run_session(&mut self.session, image, &self.config)?;
        categorical_controls(&outputs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_linear_unbin() {
        let mut bins = vec![0.0; 15];
        bins[7] = 0.9;
        assert_eq!(linear_unbin(&bins), Some(0.0));

        bins[0] = 1.0;
        assert_eq!(linear_unbin(&bins), Some(-1.0));

        let mut right = vec![0.01; 15];
        right[14] = 0.8;
        assert_eq!(linear_unbin(&right), Some(1.0));

        assert_eq!(linear_unbin(&[1.0]), None);
    }

    #[test]
    fn test_linear_controls_layouts() {
        let split = vec![vec![0.25], vec![0.5]];
        assert_eq!(linear_controls(&split).unwrap(), Controls::new(0.25, 0.5));

        let packed = vec![vec![-0.1, 0.3]];
        assert_eq!(linear_controls(&packed).unwrap(), Controls::new(-0.1, 0.3));

        assert!(matches!(linear_controls(&[vec![0.1]]), Err(VisError::Inference(_))));
        assert!(matches!(linear_controls(&[]), Err(VisError::Inference(_))));
    }

    #[test]
    fn test_categorical_controls() {
        let mut bins = vec![0.0; 15];
        bins[3] = 1.0;
        let controls = categorical_controls(&[bins, vec![0.4]]).unwrap();
        assert!((controls.angle - (3.0 * 2.0 / 14.0 - 1.0)).abs() < 1e-6);
        assert_eq!(controls.throttle, 0.4);

        assert!(matches!(categorical_controls(&[vec![0.4]]), Err(VisError::Inference(_))));
    }

    #[test]
    fn test_image_to_input_normalizes_and_resizes() {
        let config = PilotConfig {
            input_width: 4,
            input_height: 2,
            ..PilotConfig::default()
        };

        let exact = RgbImage::from_pixel(4, 2, Rgb([255, 0, 51]));
        let input = image_to_input(&exact, &config);
        assert_eq!(input.len(), 4 * 2 * 3);
        assert!((input[0] - 1.0).abs() < 1e-6);
        assert_eq!(input[1], 0.0);
        assert!((input[2] - 0.2).abs() < 1e-6);

        let large = RgbImage::from_pixel(8, 4, Rgb([255, 255, 255]));
        let input = image_to_input(&large, &PilotConfig { normalize: false, ..config });
        assert_eq!(input.len(), 4 * 2 * 3);
        assert!(input.iter().all(|&v| v == 255.0));
    }
}
