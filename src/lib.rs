use image::{ DynamicImage, GrayImage };
use tracing::debug;

use std::fs;
use std::path::Path;

use detect::{ ContourStrategy, LetterGroupingStrategy, PlateStrategy };
use error::LprError;

pub mod config;
pub mod contour;
pub mod detect;
pub mod error;
pub mod image_process;
pub mod utils;

pub use config::{ load_config, LocatorConfig };
pub use contour::BoundingBox;
pub use detect::{ Detection, Strategy };


/// Every intermediate raster of one run, kept around for the detectors and
/// for debugging dumps.
#[derive(Debug, Clone)]
pub struct Stages {
    pub gray: GrayImage,
    pub blurred: GrayImage,
    pub binary: GrayImage,
    pub edges: GrayImage,
    pub dilated: GrayImage,
}

impl Stages {

    pub fn named(&self) -> [(&'static str, &GrayImage); 5] {
        [
            ("gray", &self.gray),
            ("blurred", &self.blurred),
            ("binary", &self.binary),
            ("edges", &self.edges),
            ("dilated", &self.dilated),
        ]
    }

    /// Write every stage as `<dir>/<stage>.png`.
    pub fn save(&self, dir: impl AsRef<Path>) -> Result<(), LprError> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        for (name, img) in self.named().iter() {
            img.save(dir.join(format!("{}.png", name)))?;
        }
        Ok(())
    }
}

pub struct Located {
    pub stages: Stages,
    pub detection: Detection,
}

pub struct PlateLocator {
    config: LocatorConfig,
    strategies: Vec<Box<dyn PlateStrategy>>,
}

impl PlateLocator {

    /// Contour strategy first, letter grouping as fallback.
    pub fn new(config: LocatorConfig) -> Self {
        let strategies: Vec<Box<dyn PlateStrategy>> = vec![
            Box::new(ContourStrategy { params: config.plate.clone() }),
            Box::new(LetterGroupingStrategy {
                letters: config.letters.clone(),
                grouping: config.grouping.clone(),
            }),
        ];
        Self::with_strategies(config, strategies)
    }

    /// Strategies are tried in order, the first one to find a plate wins.
    pub fn with_strategies(config: LocatorConfig, strategies: Vec<Box<dyn PlateStrategy>>) -> Self {
        Self { config, strategies }
    }

    pub fn config(&self) -> &LocatorConfig {
        &self.config
    }

    /// Locate the plate in a decoded image of any color type.
    pub fn locate(&self, img: &DynamicImage) -> Result<Located, LprError> {
        self.locate_gray(image_process::to_gray(img))
    }

    pub fn locate_gray(&self, gray: GrayImage) -> Result<Located, LprError> {
        let stages = self.preprocess(gray)?;
        let detection = self.detect(&stages);
        Ok(Located { stages, detection })
    }

    /// blur -> threshold -> canny -> dilate
    pub fn preprocess(&self, gray: GrayImage) -> Result<Stages, LprError> {
        let config = &self.config;
        let blurred = image_process::gaussian_blur(&gray, config.blur.kernel_size, config.blur.sigma)?;
        let binary = image_process::threshold(&blurred, config.threshold);
        let edges = image_process::canny(&binary, config.canny.low, config.canny.high)?;
        let dilated = image_process::dilate(&edges, config.dilation.kernel_size, config.dilation.iterations)?;
        Ok(Stages { gray, blurred, binary, edges, dilated })
    }

    pub fn detect(&self, stages: &Stages) -> Detection {
        let mut last = Detection::none();
        for strategy in &self.strategies {
            let detection = strategy.detect(stages);
            if detection.is_found() {
                debug!(strategy = %strategy.kind(), plate = ?detection.plate, "plate found");
                return detection;
            }
            debug!(strategy = %strategy.kind(), candidates = detection.candidates.len(), "no plate");
            last = detection;
        }
        last
    }
}

impl Default for PlateLocator {
    fn default() -> Self {
        Self::new(LocatorConfig::default())
    }
}
