//! The scrub window: toolbar on top, plot, position slider, status label.

use image::{Rgb, RgbImage};
use minifb::Key;
use std::path::PathBuf;

use crate::app::AppContext;
use crate::error::Result;
use crate::font::TextRenderer;
use crate::output::WindowOutput;
use crate::overlay::OverlayStyle;
use crate::scrub::{Frame, Scrubber};
use crate::viewport::{ViewRect, Viewport};

const TOOLBAR_H: usize = 28;
const SLIDER_H: usize = 28;
const STATUS_H: usize = 24;
const MIN_WIDTH: usize = 480;
const MARGIN: usize = 4;
const BUTTON_H: usize = 20;
const KNOB_W: usize = 10;
const PAGE: isize = 10;

const BACKGROUND: Rgb<u8> = Rgb([236, 236, 236]);
const BUTTON: Rgb<u8> = Rgb([250, 250, 250]);
const BORDER: Rgb<u8> = Rgb([150, 150, 150]);
const INK: Rgb<u8> = Rgb([20, 20, 20]);
const KNOB: Rgb<u8> = Rgb([40, 110, 200]);
const ACTIVE: Rgb<u8> = Rgb([190, 210, 240]);
const BAND: Rgb<u8> = Rgb([0, 0, 0]);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolAction {
    First,
    Previous,
    Next,
    Last,
    Home,
    ViewBack,
    ViewForward,
    Pan,
    Zoom,
    Save,
}

impl ToolAction {
    const ALL: [ToolAction; 10] = [
        ToolAction::First,
        ToolAction::Previous,
        ToolAction::Next,
        ToolAction::Last,
        ToolAction::Home,
        ToolAction::ViewBack,
        ToolAction::ViewForward,
        ToolAction::Pan,
        ToolAction::Zoom,
        ToolAction::Save,
    ];

    fn label(&self) -> &'static str {
        match self {
            ToolAction::First => "|<",
            ToolAction::Previous => "<",
            ToolAction::Next => ">",
            ToolAction::Last => ">|",
            ToolAction::Home => "HOME",
            ToolAction::ViewBack => "BACK",
            ToolAction::ViewForward => "FWD",
            ToolAction::Pan => "PAN",
            ToolAction::Zoom => "ZOOM",
            ToolAction::Save => "SAVE",
        }
    }

    fn mode(&self) -> Option<PlotMode> {
        match self {
            ToolAction::Pan => Some(PlotMode::Pan),
            ToolAction::Zoom => Some(PlotMode::Zoom),
            _ => None,
        }
    }
}

/// What a drag over the plot does. Toggled from the toolbar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlotMode {
    Pan,
    Zoom,
}

/// Toggles `mode` the way a plot toolbar does: pressing the active tool
/// turns it off, pressing the other one switches.
pub fn toggle_mode(current: Option<PlotMode>, pressed: PlotMode) -> Option<PlotMode> {
    if current == Some(pressed) {
        None
    } else {
        Some(pressed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Drag {
    Idle,
    Slider,
    Pan { last: (f32, f32), started_at: ViewRect },
    /// Window coordinates of the press and of the cursor now
    Zoom { anchor: (f32, f32), cursor: (f32, f32) },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: usize,
    pub y: usize,
    pub w: usize,
    pub h: usize,
}

impl Rect {
    /// Smallest rect covering two window points, clipped to `self`.
    pub fn span(&self, a: (f32, f32), b: (f32, f32)) -> Rect {
        let (ax, ay) = self.clamp_point(a);
        let (bx, by) = self.clamp_point(b);
        let (x0, x1) = (ax.min(bx) as usize, ax.max(bx) as usize);
        let (y0, y1) = (ay.min(by) as usize, ay.max(by) as usize);
        Rect { x: x0, y: y0, w: x1 - x0 + 1, h: y1 - y0 + 1 }
    }

    /// `p` moved inside the rect.
    pub fn clamp_point(&self, p: (f32, f32)) -> (f32, f32) {
        let max_x = (self.x + self.w.saturating_sub(1)) as f32;
        let max_y = (self.y + self.h.saturating_sub(1)) as f32;
        (p.0.clamp(self.x as f32, max_x), p.1.clamp(self.y as f32, max_y))
    }

    pub fn contains(&self, px: f32, py: f32) -> bool {
        px >= self.x as f32 && py >= self.y as f32 && px < (self.x + self.w) as f32 && py < (self.y + self.h) as f32
    }
}

/// Horizontal slider over `0..=max`.
#[derive(Debug, Clone, Copy)]
pub struct Slider {
    pub area: Rect,
    pub max: usize,
}

impl Slider {
    fn travel(&self) -> f32 {
        self.area.w.saturating_sub(KNOB_W) as f32
    }

    /// Value under window x coordinate `px`, clamped to the slider's range.
    pub fn value_at(&self, px: f32) -> usize {
        let travel = self.travel();
        if self.max == 0 || travel <= 0.0 {
            return 0;
        }
        let t = ((px - self.area.x as f32 - KNOB_W as f32 / 2.0) / travel).clamp(0.0, 1.0);
        (t * self.max as f32).round() as usize
    }

    /// Left edge of the knob for `value`.
    pub fn knob_x(&self, value: usize) -> usize {
        if self.max == 0 {
            return self.area.x;
        }
        let t = value.min(self.max) as f32 / self.max as f32;
        self.area.x + (t * self.travel()).round() as usize
    }
}

/// Where everything sits, derived from the plot size and record count.
#[derive(Debug, Clone)]
pub struct Layout {
    pub width: usize,
    pub height: usize,
    pub plot: Rect,
    pub slider: Slider,
    pub status: Rect,
    pub buttons: Vec<(ToolAction, Rect)>,
}

impl Layout {
    pub fn new(plot_w: usize, plot_h: usize, count: usize, text: &TextRenderer) -> Self {
        let width = plot_w.max(MIN_WIDTH);
        let height = TOOLBAR_H + plot_h + SLIDER_H + STATUS_H;

        let mut buttons = Vec::with_capacity(ToolAction::ALL.len());
        let mut x = MARGIN;
        for action in ToolAction::ALL {
            let w = text.width(action.label()) + 2 * MARGIN + 4;
            buttons.push((action, Rect { x, y: (TOOLBAR_H - BUTTON_H) / 2, w, h: BUTTON_H }));
            x += w + MARGIN;
        }

        let slider_y = TOOLBAR_H + plot_h;
        Self {
            width,
            height,
            plot: Rect { x: (width - plot_w) / 2, y: TOOLBAR_H, w: plot_w, h: plot_h },
            slider: Slider {
                area: Rect { x: MARGIN, y: slider_y + 4, w: width - 2 * MARGIN, h: SLIDER_H - 8 },
                max: count.saturating_sub(1),
            },
            status: Rect { x: MARGIN, y: slider_y + SLIDER_H, w: width - 2 * MARGIN, h: STATUS_H },
            buttons,
        }
    }

    pub fn button_at(&self, px: f32, py: f32) -> Option<ToolAction> {
        self.buttons.iter().find(|(_, r)| r.contains(px, py)).map(|(a, _)| *a)
    }
}

fn fill(img: &mut RgbImage, r: Rect, color: Rgb<u8>) {
    for y in r.y..(r.y + r.h).min(img.height() as usize) {
        for x in r.x..(r.x + r.w).min(img.width() as usize) {
            img.put_pixel(x as u32, y as u32, color);
        }
    }
}

fn outline(img: &mut RgbImage, r: Rect, color: Rgb<u8>) {
    fill(img, Rect { h: 1, ..r }, color);
    fill(img, Rect { y: r.y + r.h.saturating_sub(1), h: 1, ..r }, color);
    fill(img, Rect { w: 1, ..r }, color);
    fill(img, Rect { x: r.x + r.w.saturating_sub(1), w: 1, ..r }, color);
}

/// Paints the whole window for `frame`, showing the plot through `viewport`.
/// `band` is the zoom rectangle being dragged, in window coordinates.
pub fn compose(
    layout: &Layout,
    frame: &Frame,
    text: &TextRenderer,
    viewport: &Viewport,
    mode: Option<PlotMode>,
    band: Option<Rect>,
) -> RgbImage {
    let mut img = RgbImage::from_pixel(layout.width as u32, layout.height as u32, BACKGROUND);

    for (action, r) in &layout.buttons {
        let active = mode.is_some() && action.mode() == mode;
        fill(&mut img, *r, if active { ACTIVE } else { BUTTON });
        outline(&mut img, *r, BORDER);
        let ty = r.y + r.h.saturating_sub(text.line_height()) / 2;
        text.draw(&mut img, r.x + MARGIN + 2, ty, action.label(), INK);
    }

    let plot = viewport.render(&frame.plot.image, layout.plot.w as u32, layout.plot.h as u32);
    image::imageops::replace(&mut img, &plot, layout.plot.x as i64, layout.plot.y as i64);
    if let Some(band) = band {
        outline(&mut img, band, BAND);
    }

    let track = layout.slider.area;
    fill(&mut img, Rect { y: track.y + track.h / 2 - 1, h: 3, ..track }, BORDER);
    let knob = Rect { x: layout.slider.knob_x(frame.position), w: KNOB_W, ..track };
    fill(&mut img, knob, KNOB);

    let ty = layout.status.y + layout.status.h.saturating_sub(text.line_height()) / 2;
    text.draw(&mut img, layout.status.x, ty, &frame.status, INK);
    img
}

pub struct ScrubWindow<'a> {
    scrubber: Scrubber<'a>,
    text: &'a TextRenderer,
    save_dir: PathBuf,
    output: WindowOutput,
    layout: Layout,
    viewport: Viewport,
    mode: Option<PlotMode>,
    drag: Drag,
    mouse_was_down: bool,
}

impl<'a> ScrubWindow<'a> {
    pub fn new(ctx: &'a mut AppContext, title: &str) -> Result<Self> {
        let AppContext { view, style, save_dir, .. } = ctx;
        let style: &'a OverlayStyle = style;
        let scrubber = Scrubber::new(view, style)?;
        let text = &style.text;

        let (pw, ph) = scrubber.frame().plot.image.dimensions();
        let layout = Layout::new(pw as usize, ph as usize, scrubber.count(), text);
        let output = WindowOutput::new(title, layout.width, layout.height)?;
        tracing::info!(width = layout.width, height = layout.height, records = scrubber.count(), "window created");

        Ok(Self {
            scrubber,
            text,
            save_dir: save_dir.clone(),
            output,
            layout,
            viewport: Viewport::new(pw, ph),
            mode: None,
            drag: Drag::Idle,
            mouse_was_down: false,
        })
    }

    /// Blocks until the window is closed.
    pub fn run(mut self) -> Result<()> {
        self.redraw()?;

        while self.output.is_open() && !self.output.is_key_down(Key::Escape) {
            let mut changed = self.handle_keys()?;
            changed |= self.handle_mouse()?;

            if changed {
                self.redraw()?;
            } else {
                self.output.refresh()?;
            }
        }
        tracing::info!(position = self.scrubber.position(), "window closed");
        Ok(())
    }

    fn redraw(&mut self) -> Result<()> {
        let (pw, ph) = self.scrubber.frame().plot.image.dimensions();
        if (pw as usize, ph as usize) != (self.layout.plot.w, self.layout.plot.h) {
            tracing::warn!(width = pw, height = ph, "frame size changed, plot will be stretched");
        }
        let img = compose(
            &self.layout,
            self.scrubber.frame(),
            self.text,
            &self.viewport,
            self.mode,
            self.zoom_band(),
        );
        self.output.present(&img)
    }

    fn handle_keys(&mut self) -> Result<bool> {
        let mut changed = false;
        for key in self.output.keys_pressed() {
            changed |= match key {
                Key::Left => self.scrubber.step(-1)?,
                Key::Right => self.scrubber.step(1)?,
                Key::PageUp => self.scrubber.step(-PAGE)?,
                Key::PageDown => self.scrubber.step(PAGE)?,
                Key::Home => self.scrubber.first()?,
                Key::End => self.scrubber.last()?,
                Key::H | Key::R => self.apply(ToolAction::Home)?,
                Key::C | Key::Backspace => self.apply(ToolAction::ViewBack)?,
                Key::V => self.apply(ToolAction::ViewForward)?,
                Key::P => self.apply(ToolAction::Pan)?,
                Key::O => self.apply(ToolAction::Zoom)?,
                Key::S => self.apply(ToolAction::Save)?,
                _ => false,
            };
        }
        Ok(changed)
    }

    fn handle_mouse(&mut self) -> Result<bool> {
        let down = self.output.mouse_down();
        let pressed = down && !self.mouse_was_down;
        let released = !down && self.mouse_was_down;
        self.mouse_was_down = down;
        let cursor = self.output.mouse_pos();

        if released {
            return Ok(self.finish_drag(cursor));
        }
        let Some((mx, my)) = cursor else {
            return Ok(false);
        };

        if pressed {
            if let Some(action) = self.layout.button_at(mx, my) {
                return self.apply(action);
            }
            self.drag = self.start_drag(mx, my);
        }

        match self.drag {
            Drag::Idle => Ok(false),
            Drag::Slider => {
                let value = self.layout.slider.value_at(mx);
                self.scrubber.set_position(value)
            }
            Drag::Pan { last, started_at } => {
                let (ux, uy) = self.viewport.units_per_pixel(self.layout.plot.w, self.layout.plot.h);
                let moved = self.viewport.pan_by((last.0 - mx) * ux, (last.1 - my) * uy);
                self.drag = Drag::Pan { last: (mx, my), started_at };
                Ok(moved)
            }
            Drag::Zoom { anchor, cursor } => {
                self.drag = Drag::Zoom { anchor, cursor: (mx, my) };
                Ok(cursor != (mx, my))
            }
        }
    }

    fn start_drag(&self, mx: f32, my: f32) -> Drag {
        if self.layout.slider.area.contains(mx, my) {
            return Drag::Slider;
        }
        if !self.layout.plot.contains(mx, my) {
            return Drag::Idle;
        }
        match self.mode {
            Some(PlotMode::Pan) => Drag::Pan { last: (mx, my), started_at: self.viewport.current() },
            Some(PlotMode::Zoom) => Drag::Zoom { anchor: (mx, my), cursor: (mx, my) },
            None => Drag::Idle,
        }
    }

    /// Ends the current drag. Returns whether the window needs a redraw.
    fn finish_drag(&mut self, cursor: Option<(f32, f32)>) -> bool {
        match std::mem::replace(&mut self.drag, Drag::Idle) {
            Drag::Pan { started_at, .. } => {
                self.viewport.end_pan(started_at);
                false
            }
            Drag::Zoom { anchor, cursor: last } => {
                let a = self.plot_point(anchor);
                let b = self.plot_point(cursor.unwrap_or(last));
                self.viewport.zoom_to(a, b);
                true // the band has to go either way
            }
            Drag::Idle | Drag::Slider => false,
        }
    }

    /// Window point to plot coordinates through the current view.
    fn plot_point(&self, p: (f32, f32)) -> (f32, f32) {
        let area = self.layout.plot;
        let (x, y) = area.clamp_point(p);
        self.viewport.to_plot(x - area.x as f32, y - area.y as f32, area.w, area.h)
    }

    fn zoom_band(&self) -> Option<Rect> {
        match self.drag {
            Drag::Zoom { anchor, cursor } => Some(self.layout.plot.span(anchor, cursor)),
            _ => None,
        }
    }

    fn apply(&mut self, action: ToolAction) -> Result<bool> {
        match action {
            ToolAction::First => self.scrubber.first(),
            ToolAction::Previous => self.scrubber.step(-1),
            ToolAction::Next => self.scrubber.step(1),
            ToolAction::Last => self.scrubber.last(),
            ToolAction::Home => Ok(self.viewport.home()),
            ToolAction::ViewBack => Ok(self.viewport.back()),
            ToolAction::ViewForward => Ok(self.viewport.forward()),
            ToolAction::Pan | ToolAction::Zoom => {
                if let Some(pressed) = action.mode() {
                    self.mode = toggle_mode(self.mode, pressed);
                    tracing::debug!(mode = ?self.mode, "plot mode");
                }
                Ok(true)
            }
            ToolAction::Save => {
                let path = self.scrubber.frame().save(&self.save_dir)?;
                tracing::info!(path = %path.display(), "saved frame");
                Ok(false)
            }
        }
    }
}
