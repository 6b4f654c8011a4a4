use serde::Deserialize;

use std::fs;
use std::path::Path;

use crate::detect::{ GroupingParams, LetterParams, PlateParams };
use crate::error::LprError;

/// Every tunable of the locator. `LocatorConfig::default()` is the stock
/// pipeline; a JSON file only needs the keys it wants to change.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LocatorConfig {
    pub blur: BlurConfig,
    /// binarization level, pixels above it become 255
    pub threshold: u8,
    pub canny: CannyConfig,
    pub dilation: DilationConfig,
    pub plate: PlateParams,
    pub letters: LetterParams,
    pub grouping: GroupingParams,
}

impl Default for LocatorConfig {
    fn default() -> Self {
        Self {
            blur: BlurConfig::default(),
            threshold: 100,
            canny: CannyConfig::default(),
            dilation: DilationConfig::default(),
            plate: PlateParams::default(),
            letters: LetterParams::default(),
            grouping: GroupingParams::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct BlurConfig {
    pub kernel_size: u32,
    pub sigma: f64,
}

impl Default for BlurConfig {
    fn default() -> Self {
        Self { kernel_size: 5, sigma: 1.0 }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CannyConfig {
    pub low: f32,
    pub high: f32,
}

impl Default for CannyConfig {
    fn default() -> Self {
        Self { low: 100.0, high: 200.0 }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DilationConfig {
    pub kernel_size: u32,
    pub iterations: u32,
}

impl Default for DilationConfig {
    fn default() -> Self {
        Self { kernel_size: 3, iterations: 2 }
    }
}

pub fn load_config(path: impl AsRef<Path>) -> Result<LocatorConfig, LprError> {
    let data = fs::read_to_string(path)?;
    let config = serde_json::from_str(&data)?;
    Ok(config)
}
