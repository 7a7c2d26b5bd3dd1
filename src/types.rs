use image::RgbImage;
use std::collections::BTreeMap;

use crate::error::{Result, VisError};

/// Numeric id parsed from `record_<N>.json`
pub type RecordId = u64;

pub const CAM_IMAGE: &str = "cam/image_array";
pub const USER_ANGLE: &str = "user/angle";
pub const USER_THROTTLE: &str = "user/throttle";

/// Steering angle and throttle, both nominally in [-1, 1]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Controls {
    pub angle: f32,
    pub throttle: f32,
}

impl Controls {
    pub fn new(angle: f32, throttle: f32) -> Self {
        Self { angle, throttle }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Image(RgbImage),
    Float(f32),
    Int(i64),
    Text(String),
    Bool(bool),
    Json(serde_json::Value),
}

impl FieldValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldValue::Image(_) => "image",
            FieldValue::Float(_) => "float",
            FieldValue::Int(_) => "int",
            FieldValue::Text(_) => "str",
            FieldValue::Bool(_) => "boolean",
            FieldValue::Json(_) => "json",
        }
    }

    pub fn as_image(&self) -> Option<&RgbImage> {
        match self {
            FieldValue::Image(img) => Some(img),
            _ => None,
        }
    }
}

/// One tub entry: field name to value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    pub id: RecordId,
    pub fields: BTreeMap<String, FieldValue>,
}

impl Record {
    pub fn new(id: RecordId) -> Self {
        Self { id, fields: BTreeMap::new() }
    }

    pub fn insert(&mut self, key: impl Into<String>, value: FieldValue) {
        self.fields.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Result<&FieldValue> {
        self.fields.get(key).ok_or_else(|| VisError::MissingField {
            record_id: self.id,
            field: key.to_string(),
        })
    }

    pub fn image(&self, key: &str) -> Result<&RgbImage> {
        self.get(key)?
            .as_image()
            .ok_or_else(|| VisError::FieldType { field: key.to_string(), expected: "image" })
    }

    /// Numeric fields are accepted whether the tub stored them as float or int.
    pub fn float(&self, key: &str) -> Result<f32> {
        match self.get(key)? {
            FieldValue::Float(v) => Ok(*v),
            FieldValue::Int(v) => Ok(*v as f32),
            FieldValue::Json(v) if v.is_number() => Ok(v.as_f64().unwrap_or_default() as f32),
            _ => Err(VisError::FieldType { field: key.to_string(), expected: "float" }),
        }
    }

    pub fn camera_image(&self) -> Result<&RgbImage> {
        self.image(CAM_IMAGE)
    }

    pub fn user_controls(&self) -> Result<Controls> {
        Ok(Controls::new(self.float(USER_ANGLE)?, self.float(USER_THROTTLE)?))
    }
}

/// A record together with where it sits in the traversal order and what
/// the pilot made of its camera image.
#[derive(Debug, Clone)]
pub struct AugmentedRecord {
    pub record: Record,
    pub record_id: RecordId,
    pub position: usize,
    pub pilot: Controls,
}

impl AugmentedRecord {
    pub fn camera_image(&self) -> Result<&RgbImage> {
        self.record.camera_image()
    }

    pub fn user(&self) -> Result<Controls> {
        self.record.user_controls()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_float_accepts_int_and_json_numbers() {
        let mut record = Record::new(3);
        record.insert(USER_ANGLE, FieldValue::Int(1));
        record.insert(USER_THROTTLE, FieldValue::Json(serde_json::json!(0.25)));
        assert_eq!(record.user_controls().unwrap(), Controls::new(1.0, 0.25));
    }

    #[test]
    fn test_missing_and_mistyped_fields() {
        let mut record = Record::new(7);
        record.insert(CAM_IMAGE, FieldValue::Text("7_cam.jpg".to_string()));

        assert!(matches!(
            record.float(USER_ANGLE),
            Err(VisError::MissingField { record_id: 7, .. })
        ));
        assert!(matches!(record.camera_image(), Err(VisError::FieldType { expected: "image", .. })));
    }
}
