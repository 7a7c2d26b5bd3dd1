use anyhow::Result;
use std::env;

use donkeyvis::tub::TubReader;

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        println!("Usage: inspect_tub <path_to_tub>");
        return Ok(());
    }

    let reader = TubReader::open(&args[1])?;
    let tub = reader.tub();
    println!("Tub: {}", tub.path().display());

    println!("\n--- Fields ---");
    for (name, kind) in tub.fields() {
        println!("{:<24} {:?}", name, kind);
    }

    let index = reader.index();
    println!("\n--- Records ---");
    println!("Count: {}", reader.count());
    if let (Some(first), Some(last)) = (index.first(), index.last()) {
        println!("Ids:   {} .. {}", first, last);
    }

    let record = reader.get(0)?;
    println!("\n--- Record {} ---", record.id);
    for (key, value) in &record.fields {
        match value.as_image() {
            Some(img) => println!("{:<24} image {}x{}", key, img.width(), img.height()),
            None => println!("{:<24} {:<8} {:?}", key, value.type_name(), value),
        }
    }

    Ok(())
}
