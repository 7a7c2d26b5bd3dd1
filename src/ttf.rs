use image::{Rgb, RgbImage};
use rusttype::{point, Font, Scale};
use std::fs;
use std::path::Path;

pub struct FontRenderer {
    font: Font<'static>,
}

impl FontRenderer {
    pub fn try_load(family: &str) -> Option<Self> {
        if family.is_empty() {
            return None;
        }

        let paths = [
            format!("/usr/share/fonts/truetype/dejavu/{}.ttf", family),
            format!("/usr/share/fonts/truetype/{}.ttf", family),
            format!("/usr/share/fonts/TTF/{}.ttf", family),
            format!("/Library/Fonts/{}.ttf", family),
            format!("/System/Library/Fonts/{}.ttf", family),
            format!("/System/Library/Fonts/Supplemental/{}.ttf", family),
            format!("{}.ttf", family),
        ];

        for p in paths.iter() {
            if Path::new(p).exists() {
                if let Ok(data) = fs::read(p) {
                    if let Some(font) = Font::try_from_vec(data) {
                        tracing::info!(path = %p, "loaded font");
                        return Some(Self { font });
                    }
                }
            }
        }

        tracing::info!(family, "font family not found, falling back to bitmap");
        None
    }

    pub fn draw_text(&self, img: &mut RgbImage, x: usize, y: usize, text: &str, color: Rgb<u8>, size_pt: f32) {
        let scale = Scale::uniform(size_pt);
        let v_metrics = self.font.v_metrics(scale);
        let start_point = point(x as f32, y as f32 + v_metrics.ascent);
        let (width, height) = img.dimensions();

        for glyph in self.font.layout(text, scale, start_point) {
            if let Some(bb) = glyph.pixel_bounding_box() {
                glyph.draw(|gx, gy, v| {
                    if v <= 0.2 {
                        return;
                    }
                    let px = bb.min.x + gx as i32;
                    let py = bb.min.y + gy as i32;
                    if px >= 0 && py >= 0 && (px as u32) < width && (py as u32) < height {
                        let under = *img.get_pixel(px as u32, py as u32);
                        img.put_pixel(px as u32, py as u32, mix(under, color, v));
                    }
                });
            }
        }
    }

    pub fn measure_height(&self, size_pt: f32) -> usize {
        let scale = Scale::uniform(size_pt);
        let v_metrics = self.font.v_metrics(scale);
        (v_metrics.ascent - v_metrics.descent + v_metrics.line_gap).ceil() as usize
    }

    pub fn measure_width(&self, text: &str, size_pt: f32) -> usize {
        let scale = Scale::uniform(size_pt);
        self.font
            .layout(text, scale, point(0.0, 0.0))
            .last()
            .map(|g| g.position().x + g.unpositioned().h_metrics().advance_width)
            .unwrap_or(0.0)
            .ceil() as usize
    }
}

fn mix(under: Rgb<u8>, over: Rgb<u8>, coverage: f32) -> Rgb<u8> {
    let c = coverage.clamp(0.0, 1.0);
    Rgb([0, 1, 2].map(|i| (under[i] as f32 * (1.0 - c) + over[i] as f32 * c).round() as u8))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_family_is_none() {
        assert!(FontRenderer::try_load("").is_none());
        assert!(FontRenderer::try_load("NoSuchFontFamily_donkeyvis").is_none());
    }

    #[test]
    fn test_mix_endpoints() {
        let black = Rgb([0, 0, 0]);
        let yellow = Rgb([255, 255, 0]);
        assert_eq!(mix(black, yellow, 1.0), yellow);
        assert_eq!(mix(black, yellow, 0.0), black);
        assert_eq!(mix(black, yellow, 0.5), Rgb([128, 128, 0]));
    }
}
