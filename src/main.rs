use anyhow::Result;
use clap::{ Arg, ArgAction, Command };
use tracing::info;
use tracing_subscriber::EnvFilter;

use lpd_rust::{ load_config, utils, LocatorConfig, PlateLocator };


fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let matches = Command::new("LPD")
                    .version("0.1.0")
                    .author("kingrong")
                    .about("Locate a license plate with classical edge and contour heuristics")
                    .arg(Arg::new("INPUT")
                        .help("image file with license plate")
                        .required(true)
                        .index(1))
                    .arg(Arg::new("config")
                        .long("config")
                        .value_name("FILE")
                        .help("JSON file overriding the default thresholds"))
                    .arg(Arg::new("output")
                        .long("output")
                        .short('o')
                        .value_name("FILE")
                        .help("where to write the annotated image"))
                    .arg(Arg::new("dump-dir")
                        .long("dump-dir")
                        .value_name("DIR")
                        .help("write every intermediate raster into DIR"))
                    .arg(Arg::new("display")
                        .long("display")
                        .action(ArgAction::SetTrue)
                        .help("show the result in a window (needs the display-window feature)"))
                    .get_matches();

    let file_name = matches.get_one::<String>("INPUT").ok_or_else(|| anyhow::anyhow!("image is required"))?;
    let config = match matches.get_one::<String>("config") {
        Some(path) => {
            info!("loading config from {}", path);
            load_config(path)?
        }
        None => LocatorConfig::default(),
    };

    let img = image::open(file_name)?;
    info!("loaded {} ({}x{})", file_name, img.width(), img.height());

    let locator = PlateLocator::new(config);
    let now = std::time::Instant::now();
    let located = locator.locate(&img)?;
    info!("pipeline took {:.2?}", now.elapsed());

    let detection = &located.detection;
    match detection.strategy {
        Some(strategy) => {
            let plate = detection.plate;
            println!("plate found by {}: x={} y={} width={} height={}",
                strategy, plate.x, plate.y, plate.width, plate.height);
        }
        None => println!("no plate found"),
    }

    if let Some(dir) = matches.get_one::<String>("dump-dir") {
        located.stages.save(dir)?;
        info!("stages written to {}", dir);
    }

    let rendered = utils::render_detection(&img, detection);
    if let Some(output) = matches.get_one::<String>("output") {
        rendered.save(output)?;
        info!("annotated image written to {}", output);
    }

    if matches.get_flag("display") {
        show(&rendered);
    }

    Ok(())
}

#[cfg(feature = "display-window")]
fn show(img: &image::RgbImage) {
    utils::display_image("detected plate", img);
}

#[cfg(not(feature = "display-window"))]
fn show(_img: &image::RgbImage) {
    tracing::warn!("built without the display-window feature, nothing to show");
}
