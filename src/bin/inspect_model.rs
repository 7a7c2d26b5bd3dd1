use anyhow::Result;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use std::env;

use donkeyvis::app::expand_home;

// Prints the inputs and outputs of an exported pilot, to check which
// `--model` kind it matches.
fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        println!("Usage: inspect_model <path_to_pilot.onnx>");
        return Ok(());
    }

    let model_path = expand_home(&args[1]);
    println!("Inspecting model: {}", model_path.display());

    let session = Session::builder()?
        .with_optimization_level(GraphOptimizationLevel::Level1)?
        .with_intra_threads(1)?
        .commit_from_file(&model_path)?;

    println!("\n--- Inputs ---");
    for (i, input) in session.inputs.iter().enumerate() {
        println!("#{}: {} ({:?})", i, input.name, input.input_type);
    }

    println!("\n--- Outputs ---");
    for (i, output) in session.outputs.iter().enumerate() {
        println!("#{}: {} ({:?})", i, output.name, output.output_type);
    }

    match session.outputs.len() {
        1 => println!("\nOne output: use --model linear if it holds [angle, throttle]."),
        2 => println!("\nTwo outputs: --model linear (scalar angle) or categorical (15 angle bins)."),
        n => println!("\n{} outputs: not a layout donkeyvis knows.", n),
    }

    Ok(())
}
