pub mod app;
pub mod config;
pub mod error;
pub mod font;
pub mod inference;
pub mod output;
pub mod overlay;
pub mod pilot;
pub mod scrub;
pub mod ttf;
pub mod tub;
pub mod types;
pub mod view;
pub mod viewport;
pub mod window;

pub use error::{Result, VisError};
