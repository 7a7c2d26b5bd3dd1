//! Which part of the rendered plot the window shows: zoom, pan and the
//! back/forward view history of a plot toolbar.

use image::RgbImage;

/// Smallest zoom rectangle side, in plot pixels. Smaller drags are clicks.
const MIN_ZOOM: f32 = 4.0;

/// A rectangle in plot pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewRect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl ViewRect {
    pub fn full(width: u32, height: u32) -> Self {
        Self { x: 0.0, y: 0.0, w: width as f32, h: height as f32 }
    }

    fn from_corners(a: (f32, f32), b: (f32, f32)) -> Self {
        Self {
            x: a.0.min(b.0),
            y: a.1.min(b.1),
            w: (a.0 - b.0).abs(),
            h: (a.1 - b.1).abs(),
        }
    }
}

/// The visible part of the plot plus its history. The view survives record
/// changes, so one region can be compared across frames.
#[derive(Debug, Clone)]
pub struct Viewport {
    full: ViewRect,
    current: ViewRect,
    back: Vec<ViewRect>,
    forward: Vec<ViewRect>,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        let full = ViewRect::full(width, height);
        Self { full, current: full, back: Vec::new(), forward: Vec::new() }
    }

    pub fn current(&self) -> ViewRect {
        self.current
    }

    pub fn is_home(&self) -> bool {
        self.current == self.full
    }

    /// Maps a point inside a `display_w` x `display_h` area showing the
    /// current view to plot coordinates.
    pub fn to_plot(&self, px: f32, py: f32, display_w: usize, display_h: usize) -> (f32, f32) {
        let c = self.current;
        (
            c.x + px / display_w.max(1) as f32 * c.w,
            c.y + py / display_h.max(1) as f32 * c.h,
        )
    }

    /// Plot pixels per display pixel along x and y.
    pub fn units_per_pixel(&self, display_w: usize, display_h: usize) -> (f32, f32) {
        (
            self.current.w / display_w.max(1) as f32,
            self.current.h / display_h.max(1) as f32,
        )
    }

    /// Zooms to the rectangle spanned by two plot points, widened to keep
    /// the plot's aspect ratio. Returns false for a rectangle too small to
    /// be a deliberate drag.
    pub fn zoom_to(&mut self, a: (f32, f32), b: (f32, f32)) -> bool {
        let r = ViewRect::from_corners(a, b);
        if r.w < MIN_ZOOM || r.h < MIN_ZOOM {
            return false;
        }

        let aspect = self.full.w / self.full.h;
        let (mut w, mut h) = (r.w, r.h);
        if w / h < aspect {
            w = h * aspect;
        } else {
            h = w / aspect;
        }
        let (w, h) = (w.min(self.full.w), h.min(self.full.h));
        let (cx, cy) = (r.x + r.w / 2.0, r.y + r.h / 2.0);
        let target = self.clamped(ViewRect { x: cx - w / 2.0, y: cy - h / 2.0, w, h });
        self.push(target)
    }

    /// Moves the view by a plot-space offset, staying inside the plot.
    /// History is left alone; call `end_pan` when the drag finishes.
    pub fn pan_by(&mut self, dx: f32, dy: f32) -> bool {
        let moved = self.clamped(ViewRect { x: self.current.x + dx, y: self.current.y + dy, ..self.current });
        let changed = moved != self.current;
        self.current = moved;
        changed
    }

    /// Records the view a pan started from, if the pan moved anything.
    pub fn end_pan(&mut self, started_at: ViewRect) {
        if started_at != self.current {
            self.back.push(started_at);
            self.forward.clear();
        }
    }

    pub fn home(&mut self) -> bool {
        self.push(self.full)
    }

    pub fn back(&mut self) -> bool {
        match self.back.pop() {
            Some(previous) => {
                self.forward.push(self.current);
                self.current = previous;
                true
            }
            None => false,
        }
    }

    pub fn forward(&mut self) -> bool {
        match self.forward.pop() {
            Some(next) => {
                self.back.push(self.current);
                self.current = next;
                true
            }
            None => false,
        }
    }

    /// Samples the current view of `plot` into a `width` x `height` image.
    pub fn render(&self, plot: &RgbImage, width: u32, height: u32) -> RgbImage {
        if self.is_home() && plot.dimensions() == (width, height) {
            return plot.clone();
        }
        let (pw, ph) = plot.dimensions();
        let c = self.current;
        let (sx, sy) = (c.w / width.max(1) as f32, c.h / height.max(1) as f32);
        RgbImage::from_fn(width, height, |x, y| {
            let px = ((c.x + (x as f32 + 0.5) * sx) as u32).min(pw.saturating_sub(1));
            let py = ((c.y + (y as f32 + 0.5) * sy) as u32).min(ph.saturating_sub(1));
            *plot.get_pixel(px, py)
        })
    }

    fn push(&mut self, target: ViewRect) -> bool {
        if target == self.current {
            return false;
        }
        self.back.push(self.current);
        self.forward.clear();
        self.current = target;
        true
    }

    fn clamped(&self, r: ViewRect) -> ViewRect {
        let w = r.w.min(self.full.w);
        let h = r.h.min(self.full.h);
        ViewRect {
            x: r.x.clamp(0.0, self.full.w - w),
            y: r.y.clamp(0.0, self.full.h - h),
            w,
            h,
        }
    }
}
