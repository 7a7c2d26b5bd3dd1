//! Draws the human and pilot controls as arrows over a camera frame.
//!
//! Everything here is a pure function of its inputs: the same record and
//! style always give the same pixels and the same arrow endpoints.

use image::{imageops::FilterType, Rgb, RgbImage};
use std::f32::consts::FRAC_PI_2;

use crate::config::{parse_hex, UiConfig, MAX_SCALE};
use crate::error::Result;
use crate::font::TextRenderer;
use crate::types::{AugmentedRecord, Controls};

/// Arrow length at full throttle, as a fraction of image height.
const LENGTH_SCALE: f32 = 0.45;
const LEGEND_MARGIN: usize = 6;
const SWATCH_WIDTH: usize = 20;

pub struct OverlayStyle {
    /// Integer upscale of the camera image
    pub scale: u32,
    pub alpha: f32,
    /// Shaft width in plot pixels
    pub line_width: f32,
    /// Head size in image pixels
    pub head_width: f32,
    pub head_length: f32,
    pub human: Rgb<u8>,
    pub pilot: Rgb<u8>,
    pub text: TextRenderer,
}

impl OverlayStyle {
    pub fn from_config(ui: &UiConfig) -> Result<Self> {
        Self::with_text(ui, TextRenderer::from_config(ui))
    }

    pub fn with_text(ui: &UiConfig, text: TextRenderer) -> Result<Self> {
        let (hr, hg, hb) = parse_hex(&ui.human_color_hex)?;
        let (pr, pg, pb) = parse_hex(&ui.pilot_color_hex)?;
        Ok(Self {
            scale: ui.scale.clamp(1, MAX_SCALE),
            alpha: ui.arrow_alpha.clamp(0.0, 1.0),
            line_width: 3.0,
            head_width: 2.0,
            head_length: 5.0,
            human: Rgb([hr, hg, hb]),
            pilot: Rgb([pr, pg, pb]),
            text,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArrowGeometry {
    pub start: (f32, f32),
    pub end: (f32, f32),
}

impl ArrowGeometry {
    pub fn delta(&self) -> (f32, f32) {
        (self.end.0 - self.start.0, self.end.1 - self.start.1)
    }

    pub fn length(&self) -> f32 {
        let (dx, dy) = self.delta();
        dx.hypot(dy)
    }

    fn scaled(&self, s: f32) -> Self {
        Self {
            start: (self.start.0 * s, self.start.1 * s),
            end: (self.end.0 * s, self.end.1 * s),
        }
    }
}

/// Arrow from the image centre. `angle` in [-1, 1] sweeps a half turn
/// (-1 points left, 0 up, 1 right); length is `throttle * 0.45 * height`.
pub fn arrow_geometry(width: u32, height: u32, controls: Controls) -> ArrowGeometry {
    let theta = FRAC_PI_2 * controls.angle;
    let (w, h) = (width as f32, height as f32);
    let scaling = h * LENGTH_SCALE;
    let dx = scaling * controls.throttle * theta.sin();
    let dy = scaling * controls.throttle * theta.cos();
    ArrowGeometry {
        start: (w / 2.0, h / 2.0),
        end: (w / 2.0 + dx, h / 2.0 - dy),
    }
}

pub fn legend_entry(label: &str, controls: Controls) -> String {
    format!("{:>10} {:>6.2} {:>6.3}", label, controls.throttle, controls.angle)
}

#[derive(Debug, Clone, Copy)]
pub struct ArrowSpec {
    pub label: &'static str,
    pub controls: Controls,
    pub color: Rgb<u8>,
}

#[derive(Debug, Clone)]
pub struct PlacedArrow {
    pub spec: ArrowSpec,
    /// In camera image coordinates
    pub geometry: ArrowGeometry,
}

pub struct Plot {
    pub image: RgbImage,
    pub arrows: Vec<PlacedArrow>,
    pub legend: Vec<String>,
}

/// Pilot arrow first, human arrow drawn on top of it.
pub fn render_record(record: &AugmentedRecord, style: &OverlayStyle) -> Result<Plot> {
    let img = record.camera_image()?;
    let arrows = [
        ArrowSpec { label: "robot", controls: record.pilot, color: style.pilot },
        ArrowSpec { label: "human", controls: record.user()?, color: style.human },
    ];
    Ok(plot_sample(img, &arrows, style))
}

pub fn plot_sample(img: &RgbImage, arrows: &[ArrowSpec], style: &OverlayStyle) -> Plot {
    let (w, h) = img.dimensions();
    let s = style.scale;
    let mut canvas = image::imageops::resize(img, w * s, h * s, FilterType::Nearest);

    let mut placed = Vec::with_capacity(arrows.len());
    for spec in arrows {
        let geometry = arrow_geometry(w, h, spec.controls);
        let mask = arrow_mask(&canvas, &geometry.scaled(s as f32), style);
        blend_mask(&mut canvas, &mask, spec.color, style.alpha);
        placed.push(PlacedArrow { spec: *spec, geometry });
    }

    let legend: Vec<String> = arrows.iter().map(|a| legend_entry(a.label, a.controls)).collect();
    draw_legend(&mut canvas, arrows, &legend, style);

    Plot { image: canvas, arrows: placed, legend }
}

/// Pixels covered by the shaft and head of one arrow, in plot coordinates.
/// The head sits past the end point, so the shaft keeps its full length.
fn arrow_mask(canvas: &RgbImage, arrow: &ArrowGeometry, style: &OverlayStyle) -> Vec<bool> {
    let (width, height) = canvas.dimensions();
    let mut mask = vec![false; (width * height) as usize];

    // NaN controls fail every comparison, so test for a usable length
    let length = arrow.length();
    if !length.is_finite() || length < f32::EPSILON {
        return mask;
    }

    let (dx, dy) = arrow.delta();
    let (ux, uy) = (dx / length, dy / length);
    let s = style.scale as f32;
    let half_head = style.head_width * s / 2.0;
    let head_len = style.head_length * s;
    let tip = (arrow.end.0 + ux * head_len, arrow.end.1 + uy * head_len);
    let left = (arrow.end.0 - uy * half_head, arrow.end.1 + ux * half_head);
    let right = (arrow.end.0 + uy * half_head, arrow.end.1 - ux * half_head);
    let half_line = style.line_width / 2.0;

    let xs = [arrow.start.0, tip.0, left.0, right.0];
    let ys = [arrow.start.1, tip.1, left.1, right.1];
    let pad = half_line.max(1.0);
    let x0 = (xs.iter().cloned().fold(f32::INFINITY, f32::min) - pad).floor().max(0.0) as u32;
    let y0 = (ys.iter().cloned().fold(f32::INFINITY, f32::min) - pad).floor().max(0.0) as u32;
    let x1 = ((xs.iter().cloned().fold(f32::NEG_INFINITY, f32::max) + pad).ceil().max(0.0) as u32).min(width);
    let y1 = ((ys.iter().cloned().fold(f32::NEG_INFINITY, f32::max) + pad).ceil().max(0.0) as u32).min(height);

    for y in y0..y1 {
        for x in x0..x1 {
            let p = (x as f32 + 0.5, y as f32 + 0.5);
            if distance_to_segment(p, arrow.start, arrow.end) <= half_line
                || in_triangle(p, tip, left, right)
            {
                mask[(y * width + x) as usize] = true;
            }
        }
    }
    mask
}

fn distance_to_segment(p: (f32, f32), a: (f32, f32), b: (f32, f32)) -> f32 {
    let (abx, aby) = (b.0 - a.0, b.1 - a.1);
    let len_sq = abx * abx + aby * aby;
    let t = if len_sq > 0.0 {
        (((p.0 - a.0) * abx + (p.1 - a.1) * aby) / len_sq).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let (cx, cy) = (a.0 + t * abx, a.1 + t * aby);
    (p.0 - cx).hypot(p.1 - cy)
}

fn in_triangle(p: (f32, f32), a: (f32, f32), b: (f32, f32), c: (f32, f32)) -> bool {
    let cross = |o: (f32, f32), u: (f32, f32), v: (f32, f32)| (u.0 - o.0) * (v.1 - o.1) - (u.1 - o.1) * (v.0 - o.0);
    let d1 = cross(p, a, b);
    let d2 = cross(p, b, c);
    let d3 = cross(p, c, a);
    let has_neg = d1 < 0.0 || d2 < 0.0 || d3 < 0.0;
    let has_pos = d1 > 0.0 || d2 > 0.0 || d3 > 0.0;
    !(has_neg && has_pos)
}

fn blend(under: Rgb<u8>, over: Rgb<u8>, alpha: f32) -> Rgb<u8> {
    Rgb([0, 1, 2].map(|i| (under[i] as f32 * (1.0 - alpha) + over[i] as f32 * alpha).round() as u8))
}

fn blend_mask(canvas: &mut RgbImage, mask: &[bool], color: Rgb<u8>, alpha: f32) {
    for (covered, pixel) in mask.iter().zip(canvas.pixels_mut()) {
        if *covered {
            *pixel = blend(*pixel, color, alpha);
        }
    }
}

fn fill_rect(canvas: &mut RgbImage, x: usize, y: usize, w: usize, h: usize, color: Rgb<u8>, alpha: f32) {
    let (cw, ch) = (canvas.width() as usize, canvas.height() as usize);
    for py in y..(y + h).min(ch) {
        for px in x..(x + w).min(cw) {
            let under = *canvas.get_pixel(px as u32, py as u32);
            canvas.put_pixel(px as u32, py as u32, blend(under, color, alpha));
        }
    }
}

/// Top-right box: colour swatch then the formatted entry, one line per arrow.
fn draw_legend(canvas: &mut RgbImage, arrows: &[ArrowSpec], lines: &[String], style: &OverlayStyle) {
    let text = &style.text;
    let line_h = text.line_height() + 2;
    let text_w = lines.iter().map(|l| text.width(l)).max().unwrap_or(0);
    let box_w = LEGEND_MARGIN * 3 + SWATCH_WIDTH + text_w;
    let box_h = LEGEND_MARGIN * 2 + line_h * lines.len();
    let box_x = (canvas.width() as usize).saturating_sub(box_w + LEGEND_MARGIN);
    let box_y = LEGEND_MARGIN;

    fill_rect(canvas, box_x, box_y, box_w, box_h, Rgb([0, 0, 0]), 0.6);

    for (i, (arrow, line)) in arrows.iter().zip(lines).enumerate() {
        let y = box_y + LEGEND_MARGIN + i * line_h;
        let swatch_y = y + line_h / 2 - 1;
        fill_rect(canvas, box_x + LEGEND_MARGIN, swatch_y, SWATCH_WIDTH, 3, arrow.color, style.alpha);
        text.draw(canvas, box_x + LEGEND_MARGIN * 2 + SWATCH_WIDTH, y, line, Rgb([255, 255, 255]));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FieldValue, Record, CAM_IMAGE, USER_ANGLE, USER_THROTTLE};

    fn style() -> OverlayStyle {
        OverlayStyle::with_text(&UiConfig::default(), TextRenderer::bitmap(1)).unwrap()
    }

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn test_straight_ahead_full_throttle() {
        let g = arrow_geometry(160, 120, Controls::new(0.0, 1.0));
        assert_eq!(g.start, (80.0, 60.0));
        assert!(close(g.end.0, 80.0));
        assert!(close(g.end.1, 60.0 - 54.0));
    }

    #[test]
    fn test_full_lock_is_horizontal() {
        let right = arrow_geometry(160, 120, Controls::new(1.0, 1.0));
        assert!(close(right.end.0, 80.0 + 54.0));
        assert!(close(right.end.1, 60.0));

        let left = arrow_geometry(160, 120, Controls::new(-1.0, 1.0));
        assert!(close(left.end.0, 80.0 - 54.0));
    }

    #[test]
    fn test_length_grows_with_abs_throttle() {
        let mut last = -1.0;
        for step in 0..=10 {
            let throttle = step as f32 / 10.0;
            let forward = arrow_geometry(160, 120, Controls::new(0.3, throttle)).length();
            let reverse = arrow_geometry(160, 120, Controls::new(0.3, -throttle)).length();
            assert!(forward > last);
            assert!(close(forward, reverse));
            last = forward;
        }
    }

    #[test]
    fn test_opposite_angles_mirror_across_midline() {
        for &a in &[0.1_f32, 0.5, 0.77, 1.0] {
            let pos = arrow_geometry(160, 120, Controls::new(a, 0.8));
            let neg = arrow_geometry(160, 120, Controls::new(-a, 0.8));
            assert!(close(pos.end.0 - 80.0, 80.0 - neg.end.0));
            assert!(close(pos.end.1, neg.end.1));
        }
    }

    #[test]
    fn test_legend_entry_format() {
        assert_eq!(legend_entry("robot", Controls::new(0.25, 0.5)), "     robot   0.50  0.250");
        assert_eq!(legend_entry("human", Controls::new(-1.0, -0.1)), "     human  -0.10 -1.000");
    }

    #[test]
    fn test_zero_length_arrow_covers_nothing() {
        let canvas = RgbImage::new(64, 48);
        let g = arrow_geometry(64, 48, Controls::new(0.4, 0.0));
        assert!(arrow_mask(&canvas, &g, &style()).iter().all(|c| !c));

        let g = arrow_geometry(64, 48, Controls::new(0.4, 1.0));
        assert!(arrow_mask(&canvas, &g, &style()).iter().any(|c| *c));
    }

    #[test]
    fn test_non_finite_controls_draw_nothing() {
        let canvas = RgbImage::new(64, 48);
        for controls in [
            Controls::new(f32::NAN, 0.5),
            Controls::new(0.2, f32::NAN),
            Controls::new(0.0, f32::INFINITY),
        ] {
            let g = arrow_geometry(64, 48, controls);
            assert!(arrow_mask(&canvas, &g, &style()).iter().all(|c| !c));
        }
    }

    #[test]
    fn test_scale_is_capped() {
        let ui = UiConfig { scale: 1000, ..UiConfig::default() };
        let style = OverlayStyle::with_text(&ui, TextRenderer::bitmap(1)).unwrap();
        assert_eq!(style.scale, MAX_SCALE);
    }

    #[test]
    fn test_plot_size_and_arrow_colour() {
        let img = RgbImage::new(40, 30);
        let style = style();
        let spec = ArrowSpec {
            label: "human",
            controls: Controls::new(0.0, 1.0),
            color: style.human,
        };
        let plot = plot_sample(&img, &[spec], &style);

        assert_eq!(plot.image.dimensions(), (160, 120));
        // a point on the shaft, halfway up from the centre
        let shaft = plot.image.get_pixel(80, 60 - 20);
        assert_eq!(shaft, &blend(Rgb([0, 0, 0]), style.human, style.alpha));
        assert_eq!(plot.legend, vec![legend_entry("human", spec.controls)]);
    }

    #[test]
    fn test_rendering_twice_is_identical() {
        let mut record = Record::new(42);
        record.insert(CAM_IMAGE, FieldValue::Image(RgbImage::from_pixel(32, 24, Rgb([40, 80, 120]))));
        record.insert(USER_ANGLE, FieldValue::Float(-0.3));
        record.insert(USER_THROTTLE, FieldValue::Float(0.6));
        let augmented = AugmentedRecord {
            record,
            record_id: 42,
            position: 0,
            pilot: Controls::new(0.2, 0.4),
        };

        let style = style();
        let first = render_record(&augmented, &style).unwrap();
        let second = render_record(&augmented, &style).unwrap();

        let ends = |p: &Plot| p.arrows.iter().map(|a| a.geometry).collect::<Vec<_>>();
        assert_eq!(ends(&first), ends(&second));
        assert_eq!(first.image, second.image);
        assert_eq!(first.arrows[0].spec.label, "robot");
        assert_eq!(first.arrows[1].spec.controls, Controls::new(-0.3, 0.6));
    }
}
