use clap::Parser;
use std::path::PathBuf;

use donkeyvis::config::AppConfig;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Pilot to load: linear, categorical, constant, or a donkeycar model
    /// class such as donkeycar.parts.keras.KerasLinear
    #[arg(long)]
    pub model: String,

    /// Snapshot of the trained model (~ is expanded)
    #[arg(long)]
    pub snapshot: String,

    /// Path to the tub to view
    #[arg(long)]
    pub tub: String,

    /// UI and pilot settings
    #[arg(long, default_value = AppConfig::DEFAULT_PATH)]
    pub config: PathBuf,

    /// Upscale factor for the camera image, overrides the config
    #[arg(long)]
    pub scale: Option<u32>,
}
