//! A tiny 3x5 bitmap font, used when no TTF font can be found, and the
//! `TextRenderer` that picks between the two.

use image::{Rgb, RgbImage};

use crate::config::UiConfig;
use crate::ttf::FontRenderer;

pub fn draw_text_line(img: &mut RgbImage, x: usize, y: usize, text: &str, color: Rgb<u8>, scale: usize) {
    let mut cx = x;
    for c in text.chars() {
        draw_char(img, cx, y, c, color, scale);
        cx += (3 * scale) + scale; // 3 width + 1 spacing, scaled
    }
}

pub fn measure_text_width(text: &str, scale: usize) -> usize {
    text.chars().count() * ((3 * scale) + scale)
}

// Five rows of three bits, bit 2 is the leftmost column.
fn glyph(c: char) -> [u8; 5] {
    match c.to_ascii_uppercase() {
        '0' => [0x7, 0x5, 0x5, 0x5, 0x7],
        '1' => [0x2, 0x6, 0x2, 0x2, 0x7],
        '2' => [0x7, 0x1, 0x7, 0x4, 0x7],
        '3' => [0x7, 0x1, 0x7, 0x1, 0x7],
        '4' => [0x5, 0x5, 0x7, 0x1, 0x1],
        '5' => [0x7, 0x4, 0x7, 0x1, 0x7],
        '6' => [0x7, 0x4, 0x7, 0x5, 0x7],
        '7' => [0x7, 0x1, 0x2, 0x4, 0x4],
        '8' => [0x7, 0x5, 0x7, 0x5, 0x7],
        '9' => [0x7, 0x5, 0x7, 0x1, 0x7],
        'A' => [0x2, 0x5, 0x7, 0x5, 0x5],
        'B' => [0x6, 0x5, 0x6, 0x5, 0x6],
        'C' => [0x7, 0x4, 0x4, 0x4, 0x7],
        'D' => [0x6, 0x5, 0x5, 0x5, 0x6],
        'E' => [0x7, 0x4, 0x6, 0x4, 0x7],
        'F' => [0x7, 0x4, 0x6, 0x4, 0x4],
        'G' => [0x7, 0x4, 0x5, 0x5, 0x7],
        'H' => [0x5, 0x5, 0x7, 0x5, 0x5],
        'I' => [0x7, 0x2, 0x2, 0x2, 0x7],
        'J' => [0x1, 0x1, 0x1, 0x5, 0x7],
        'K' => [0x5, 0x5, 0x6, 0x5, 0x5],
        'L' => [0x4, 0x4, 0x4, 0x4, 0x7],
        'M' => [0x5, 0x7, 0x5, 0x5, 0x5],
        'N' => [0x6, 0x5, 0x5, 0x5, 0x5],
        'O' => [0x7, 0x5, 0x5, 0x5, 0x7],
        'P' => [0x7, 0x5, 0x7, 0x4, 0x4],
        'Q' => [0x7, 0x5, 0x5, 0x7, 0x1],
        'R' => [0x6, 0x5, 0x6, 0x5, 0x5],
        'S' => [0x3, 0x4, 0x2, 0x1, 0x6],
        'T' => [0x7, 0x2, 0x2, 0x2, 0x2],
        'U' => [0x5, 0x5, 0x5, 0x5, 0x7],
        'V' => [0x5, 0x5, 0x5, 0x5, 0x2],
        'W' => [0x5, 0x5, 0x7, 0x7, 0x5],
        'X' => [0x5, 0x5, 0x2, 0x5, 0x5],
        'Y' => [0x5, 0x5, 0x2, 0x2, 0x2],
        'Z' => [0x7, 0x1, 0x2, 0x4, 0x7],
        ' ' => [0x0, 0x0, 0x0, 0x0, 0x0],
        '.' => [0x0, 0x0, 0x0, 0x0, 0x2],
        ',' => [0x0, 0x0, 0x0, 0x2, 0x4],
        ':' => [0x0, 0x2, 0x0, 0x2, 0x0],
        '-' => [0x0, 0x0, 0x7, 0x0, 0x0],
        '_' => [0x0, 0x0, 0x0, 0x0, 0x7],
        '+' => [0x0, 0x2, 0x7, 0x2, 0x0],
        '=' => [0x0, 0x7, 0x0, 0x7, 0x0],
        '/' => [0x1, 0x1, 0x2, 0x4, 0x4],
        '<' => [0x1, 0x2, 0x4, 0x2, 0x1],
        '>' => [0x4, 0x2, 0x1, 0x2, 0x4],
        '|' => [0x2, 0x2, 0x2, 0x2, 0x2],
        '#' => [0x5, 0x7, 0x5, 0x7, 0x5],
        '%' => [0x5, 0x1, 0x2, 0x4, 0x5],
        '!' => [0x2, 0x2, 0x2, 0x0, 0x2],
        '?' => [0x7, 0x1, 0x2, 0x0, 0x2],
        '(' => [0x2, 0x4, 0x4, 0x4, 0x2],
        ')' => [0x2, 0x1, 0x1, 0x1, 0x2],
        '[' => [0x7, 0x4, 0x4, 0x4, 0x7],
        ']' => [0x7, 0x1, 0x1, 0x1, 0x7],
        _ => [0x7, 0x7, 0x7, 0x7, 0x7], // block
    }
}

fn draw_char(img: &mut RgbImage, x: usize, y: usize, c: char, color: Rgb<u8>, scale: usize) {
    let (width, height) = (img.width() as usize, img.height() as usize);

    for (row, bits) in glyph(c).iter().enumerate() {
        for col in 0..3 {
            if (bits >> (2 - col)) & 1 == 1 {
                for dy in 0..scale {
                    for dx in 0..scale {
                        let px = x + (col * scale) + dx;
                        let py = y + (row * scale) + dy;
                        if px < width && py < height {
                            img.put_pixel(px as u32, py as u32, color);
                        }
                    }
                }
            }
        }
    }
}

/// TTF text when the configured family is installed, bitmap otherwise.
pub enum TextRenderer {
    Ttf { font: FontRenderer, size_pt: f32 },
    Bitmap { scale: usize },
}

impl TextRenderer {
    pub fn from_config(ui: &UiConfig) -> Self {
        match FontRenderer::try_load(&ui.font_family) {
            Some(font) => TextRenderer::Ttf {
                font,
                size_pt: ui.font_size_pt as f32,
            },
            None => TextRenderer::bitmap(ui.bitmap_scale),
        }
    }

    pub fn bitmap(scale: usize) -> Self {
        TextRenderer::Bitmap { scale: scale.max(1) }
    }

    pub fn draw(&self, img: &mut RgbImage, x: usize, y: usize, text: &str, color: Rgb<u8>) {
        match self {
            TextRenderer::Ttf { font, size_pt } => font.draw_text(img, x, y, text, color, *size_pt),
            TextRenderer::Bitmap { scale } => draw_text_line(img, x, y, text, color, *scale),
        }
    }

    pub fn line_height(&self) -> usize {
        match self {
            TextRenderer::Ttf { font, size_pt } => font.measure_height(*size_pt),
            TextRenderer::Bitmap { scale } => 5 * scale,
        }
    }

    pub fn width(&self, text: &str) -> usize {
        match self {
            TextRenderer::Ttf { font, size_pt } => font.measure_width(text, *size_pt),
            TextRenderer::Bitmap { scale } => measure_text_width(text, *scale),
        }
    }
}
