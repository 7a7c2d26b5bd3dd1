use clap::Parser;
use colored::*;

mod args;

use args::Args;
use donkeyvis::app::AppContext;
use donkeyvis::config::AppConfig;
use donkeyvis::window::ScrubWindow;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let mut config = AppConfig::load(&args.config)?;
    if let Some(scale) = args.scale {
        config.ui.scale = scale;
        config.validate()?;
    }

    let mut ctx = AppContext::open(&args.model, &args.snapshot, &args.tub, &config)?;
    println!(
        "{}",
        format!("Pilot: {}  Records: {}", ctx.view.pilot_name(), ctx.view.count()).green()
    );
    println!("Controls: [<-/->] step  [PgUp/PgDn] jump 10  [Home/End]  [S] save  [Esc] quit");

    let title = format!("donkeyvis - {}", args.tub);
    ScrubWindow::new(&mut ctx, &title)?.run()?;

    println!("{}", "exited".green());
    Ok(())
}
