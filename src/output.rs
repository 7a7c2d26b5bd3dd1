use image::RgbImage;
use minifb::{Key, KeyRepeat, MouseButton, MouseMode};

use crate::error::{Result, VisError};

/// A fixed-size `minifb` window fed with RGB frames.
pub struct WindowOutput {
    window: minifb::Window,
    buffer: Vec<u32>,
    width: usize,
    height: usize,
}

impl WindowOutput {
    pub fn new(title: &str, width: usize, height: usize) -> Result<Self> {
        let mut window = minifb::Window::new(
            title,
            width,
            height,
            minifb::WindowOptions {
                resize: false, // mouse hit-testing works in buffer pixels
                ..minifb::WindowOptions::default()
            },
        )
        .map_err(|e| VisError::Window(format!("failed to create window: {}", e)))?;

        window.set_target_fps(60);

        Ok(Self {
            window,
            buffer: vec![0; width * height],
            width,
            height,
        })
    }

    pub fn is_open(&self) -> bool {
        self.window.is_open()
    }

    pub fn is_key_down(&self, key: Key) -> bool {
        self.window.is_key_down(key)
    }

    pub fn keys_pressed(&self) -> Vec<Key> {
        self.window.get_keys_pressed(KeyRepeat::Yes)
    }

    pub fn mouse_pos(&self) -> Option<(f32, f32)> {
        self.window.get_mouse_pos(MouseMode::Discard)
    }

    pub fn mouse_down(&self) -> bool {
        self.window.get_mouse_down(MouseButton::Left)
    }

    /// Converts `frame` into the window buffer and shows it.
    pub fn present(&mut self, frame: &RgbImage) -> Result<()> {
        if frame.dimensions() != (self.width as u32, self.height as u32) {
            return Err(VisError::Window(format!(
                "frame is {}x{}, window is {}x{}",
                frame.width(),
                frame.height(),
                self.width,
                self.height
            )));
        }

        for (dst, pixel) in self.buffer.iter_mut().zip(frame.pixels()) {
            let [r, g, b] = pixel.0;
            *dst = (r as u32) << 16 | (g as u32) << 8 | b as u32;
        }
        self.refresh()
    }

    /// Shows the last frame again; this is also what pumps window events.
    pub fn refresh(&mut self) -> Result<()> {
        self.window
            .update_with_buffer(&self.buffer, self.width, self.height)
            .map_err(|e| VisError::Window(format!("window update failed: {}", e)))
    }
}
