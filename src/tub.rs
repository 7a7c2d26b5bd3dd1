//! Reader for the tub directory format: a `meta.json` describing the
//! recorded fields plus one `record_<N>.json` per captured frame, with image
//! fields stored as sibling files.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, VisError};
use crate::types::{FieldValue, Record, RecordId};

const META_FILE: &str = "meta.json";
const RECORD_PREFIX: &str = "record_";
const RECORD_SUFFIX: &str = ".json";

#[derive(Debug, Deserialize)]
struct TubMeta {
    inputs: Vec<String>,
    types: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    Image,
    Float,
    Int,
    Str,
    Boolean,
    /// vector, list and anything newer; kept as raw JSON
    Other(String),
}

impl FieldKind {
    fn parse(name: &str) -> Self {
        match name {
            "image_array" | "image" => FieldKind::Image,
            "float" => FieldKind::Float,
            "int" => FieldKind::Int,
            "str" => FieldKind::Str,
            "boolean" => FieldKind::Boolean,
            other => FieldKind::Other(other.to_string()),
        }
    }
}

pub struct Tub {
    path: PathBuf,
    fields: Vec<(String, FieldKind)>,
}

impl Tub {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if !path.is_dir() {
            return Err(VisError::load(&path, "not a directory"));
        }

        let meta_path = path.join(META_FILE);
        let content = fs::read_to_string(&meta_path).map_err(|e| VisError::load(&meta_path, e))?;
        let meta: TubMeta = serde_json::from_str(&content).map_err(|e| VisError::load(&meta_path, e))?;
        if meta.inputs.len() != meta.types.len() {
            return Err(VisError::load(
                &meta_path,
                format!("{} inputs but {} types", meta.inputs.len(), meta.types.len()),
            ));
        }

        let fields = meta
            .inputs
            .into_iter()
            .zip(meta.types.iter().map(|t| FieldKind::parse(t)))
            .collect();

        Ok(Self { path, fields })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn fields(&self) -> &[(String, FieldKind)] {
        &self.fields
    }

    fn kind_of(&self, key: &str) -> Option<&FieldKind> {
        self.fields.iter().find(|(name, _)| name == key).map(|(_, kind)| kind)
    }

    /// All record ids in ascending numeric order.
    pub fn record_ids(&self) -> Result<Vec<RecordId>> {
        let mut ids = Vec::new();
        for entry in fs::read_dir(&self.path)? {
            let name = entry?.file_name();
            if let Some(id) = name.to_str().and_then(parse_record_name) {
                ids.push(id);
            }
        }
        ids.sort_unstable();
        Ok(ids)
    }

    pub fn record_path(&self, id: RecordId) -> PathBuf {
        self.path.join(format!("{}{}{}", RECORD_PREFIX, id, RECORD_SUFFIX))
    }

    pub fn get_record(&self, id: RecordId) -> Result<Record> {
        let record_path = self.record_path(id);
        let content = fs::read_to_string(&record_path).map_err(|e| VisError::load(&record_path, e))?;
        let raw: serde_json::Map<String, serde_json::Value> =
            serde_json::from_str(&content).map_err(|e| VisError::load(&record_path, e))?;

        let mut record = Record::new(id);
        for (key, value) in raw {
            let field = self.decode_field(&key, value)?;
            record.insert(key, field);
        }
        Ok(record)
    }

    fn decode_field(&self, key: &str, value: serde_json::Value) -> Result<FieldValue> {
        use serde_json::Value;

        let kind = match self.kind_of(key) {
            Some(kind) if !value.is_null() => kind,
            _ => return Ok(FieldValue::Json(value)),
        };
        match (kind, value) {
            (FieldKind::Image, Value::String(file)) => {
                let image_path = self.path.join(&file);
                let img = image::open(&image_path).map_err(|e| VisError::load(&image_path, e))?;
                Ok(FieldValue::Image(img.to_rgb8()))
            }
            (FieldKind::Image, _) => Err(VisError::FieldType {
                field: key.to_string(),
                expected: "image file name",
            }),
            (FieldKind::Float, Value::Number(n)) => Ok(FieldValue::Float(n.as_f64().unwrap_or_default() as f32)),
            (FieldKind::Int, Value::Number(n)) => Ok(match whole_number(&n) {
                Some(v) => FieldValue::Int(v),
                None => FieldValue::Json(Value::Number(n)),
            }),
            (FieldKind::Str, Value::String(s)) => Ok(FieldValue::Text(s)),
            (FieldKind::Boolean, Value::Bool(b)) => Ok(FieldValue::Bool(b)),
            (FieldKind::Other(_), value) => Ok(FieldValue::Json(value)),
            // Only the fields the plot reads are checked, by `Record::float` and `Record::image`.
            (kind, value) => {
                tracing::debug!(field = key, ?kind, "value does not match declared type, kept as json");
                Ok(FieldValue::Json(value))
            }
        }
    }
}

/// `1500` and `1500.0` both count as an int.
fn whole_number(n: &serde_json::Number) -> Option<i64> {
    n.as_i64()
        .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64).map(|f| f as i64))
}

fn parse_record_name(name: &str) -> Option<RecordId> {
    name.strip_prefix(RECORD_PREFIX)?
        .strip_suffix(RECORD_SUFFIX)?
        .parse()
        .ok()
}

/// Position-addressed access to a tub in ascending record order.
pub struct TubReader {
    tub: Tub,
    index: Vec<RecordId>,
}

impl TubReader {
    /// Opens the first tub of a comma-separated list of tub directories.
    pub fn open(tub_paths: &str) -> Result<Self> {
        let mut paths = tub_paths.split(',').map(str::trim).filter(|p| !p.is_empty());
        let first = paths
            .next()
            .ok_or_else(|| VisError::Config("no tub path given".to_string()))?;
        for ignored in paths {
            tracing::warn!(tub = ignored, "only the first tub is shown, ignoring");
        }

        let reader = Self::from_tub(Tub::open(first)?)?;
        tracing::info!(tub = first, records = reader.count(), "opened tub");
        Ok(reader)
    }

    pub fn from_tub(tub: Tub) -> Result<Self> {
        let index = tub.record_ids()?;
        if index.is_empty() {
            return Err(VisError::load(tub.path(), "tub contains no records"));
        }
        Ok(Self { tub, index })
    }

    pub fn count(&self) -> usize {
        self.index.len()
    }

    pub fn index(&self) -> &[RecordId] {
        &self.index
    }

    pub fn tub(&self) -> &Tub {
        &self.tub
    }

    pub fn id_at(&self, position: usize) -> Result<RecordId> {
        self.index.get(position).copied().ok_or(VisError::IndexOutOfRange {
            position,
            count: self.index.len(),
        })
    }

    pub fn get(&self, position: usize) -> Result<Record> {
        let id = self.id_at(position)?;
        self.tub.get_record(id)
    }
}
