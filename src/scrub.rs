use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, VisError};
use crate::overlay::{render_record, OverlayStyle, Plot};
use crate::types::RecordId;
use crate::view::RecordView;

/// What the window shows for one position.
pub struct Frame {
    pub position: usize,
    pub record_id: RecordId,
    pub status: String,
    pub plot: Plot,
}

impl Frame {
    /// Writes the rendered plot as PNG into `dir` and returns the file path.
    pub fn save(&self, dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(dir)?;
        let path = dir.join(format!("donkeyvis_{:05}_{}.png", self.position, self.record_id));
        self.plot.image.save(&path)?;
        Ok(path)
    }
}

pub fn status_text(position: usize, record_id: RecordId) -> String {
    format!("{} {}", position, record_id)
}

/// Window state without the window: the current position and its frame.
/// The frame for position 0 exists as soon as the scrubber does.
pub struct Scrubber<'a> {
    view: &'a mut RecordView,
    style: &'a OverlayStyle,
    frame: Frame,
}

impl<'a> Scrubber<'a> {
    pub fn new(view: &'a mut RecordView, style: &'a OverlayStyle) -> Result<Self> {
        let frame = render(view, style, 0)?;
        Ok(Self { view, style, frame })
    }

    pub fn count(&self) -> usize {
        self.view.count()
    }

    pub fn position(&self) -> usize {
        self.frame.position
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    pub fn last_position(&self) -> usize {
        self.count().saturating_sub(1)
    }

    /// Re-renders if `position` differs from the current one.
    /// Returns whether anything changed.
    pub fn set_position(&mut self, position: usize) -> Result<bool> {
        if position >= self.count() {
            return Err(VisError::IndexOutOfRange {
                position,
                count: self.count(),
            });
        }
        if position == self.frame.position {
            return Ok(false);
        }
        self.frame = render(self.view, self.style, position)?;
        Ok(true)
    }

    /// Moves by `delta`, stopping at either end.
    pub fn step(&mut self, delta: isize) -> Result<bool> {
        let target = self
            .position()
            .saturating_add_signed(delta)
            .min(self.last_position());
        self.set_position(target)
    }

    pub fn first(&mut self) -> Result<bool> {
        self.set_position(0)
    }

    pub fn last(&mut self) -> Result<bool> {
        self.set_position(self.last_position())
    }
}

fn render(view: &mut RecordView, style: &OverlayStyle, position: usize) -> Result<Frame> {
    let record = view.get(position)?;
    let plot = render_record(&record, style)?;
    tracing::debug!(position, record_id = record.record_id, "rendered frame");
    Ok(Frame {
        position,
        record_id: record.record_id,
        status: status_text(position, record.record_id),
        plot,
    })
}
