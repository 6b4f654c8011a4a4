use std::error::Error;
use std::env::args;
use std::process;

use lpd_rust::PlateLocator;

fn main() -> Result<(), Box<dyn Error>> {
    let mut args = args();
    args.next();
    let path = match args.next() {
        Some(path) => path,
        None => {
            eprintln!("didn't get a image from args");
            process::exit(1);
        }
    };

    let img = image::open(path)?;
    let located = PlateLocator::default().locate(&img)?;
    let detection = located.detection;

    println!("letter candidates: {}", detection.candidates.len());
    for candidate in &detection.candidates {
        println!("  {:?}", candidate);
    }
    match detection.strategy {
        Some(strategy) => {
            println!("plate ({}): {:?}", strategy, detection.plate);
            for letter in &detection.members {
                println!("  letter {:?}", letter);
            }
        }
        None => println!("no plate"),
    }
    Ok(())
}
