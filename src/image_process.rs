//! Pixel level filters that feed the plate detectors.
//!
//! All filters take a single channel raster and give back a new raster of the
//! same size. Smoothing and dilation only touch pixels whose whole window fits
//! inside the image, the `size/2` wide border is zeroed (blur) or left as it was
//! (dilation).

use image::{ DynamicImage, GrayImage, Luma };
use imageproc::edges;

use std::f64::consts::PI;

use crate::error::LprError;

/// Largest accepted gaussian kernel side, keeps the weight table bounded.
pub const MAX_KERNEL_SIZE: u32 = 1023;

/// Borrow the single channel raster out of a decoded image, anything else is
/// refused.
pub fn as_gray(img: &DynamicImage) -> Result<&GrayImage, LprError> {
    match img {
        DynamicImage::ImageLuma8(gray) => Ok(gray),
        other => Err(LprError::precondition(format!(
            "expected a single channel 8-bit raster, got {:?}", other.color()
        ))),
    }
}

/// Grayscale with BT.601 weights in 14 bit fixed point, rounded to nearest.
/// Single channel input is passed through untouched.
pub fn to_gray(img: &DynamicImage) -> GrayImage {
    if let DynamicImage::ImageLuma8(gray) = img {
        return gray.clone();
    }
    let rgb = img.to_rgb8();
    GrayImage::from_fn(rgb.width(), rgb.height(), |x, y| {
        let [r, g, b] = rgb.get_pixel(x, y).0;
        let luma = (r as u32 * 4899 + g as u32 * 9617 + b as u32 * 1868 + 8192) >> 14;
        Luma([luma as u8])
    })
}

fn check_kernel(size: u32, sigma: f64) -> Result<(), LprError> {
    check_window(size, "gaussian kernel")?;
    if size > MAX_KERNEL_SIZE {
        return Err(LprError::precondition(format!(
            "gaussian kernel size must be at most {}, got {}", MAX_KERNEL_SIZE, size
        )));
    }
    if !(sigma > 0.0) {
        return Err(LprError::precondition(format!("sigma must be positive, got {}", sigma)));
    }
    Ok(())
}

/// Normalized `size x size` gaussian weights, row major.
pub fn gaussian_kernel(size: u32, sigma: f64) -> Result<Vec<f64>, LprError> {
    check_kernel(size, sigma)?;

    let side = size as usize;
    let len = side.checked_mul(side)
        .ok_or_else(|| LprError::precondition(format!("gaussian kernel size {} is too large", size)))?;
    let k = (size / 2) as i64;
    let mut kernel = Vec::with_capacity(len);
    let mut sum = 0.0;
    for i in -k..=k {
        for j in -k..=k {
            let value = (-((i * i + j * j) as f64) / (2.0 * sigma * sigma)).exp() / (2.0 * PI * sigma * sigma);
            kernel.push(value);
            sum += value;
        }
    }
    kernel.iter_mut().for_each(|v| *v /= sum);
    Ok(kernel)
}

pub fn gaussian_blur(src: &GrayImage, kernel_size: u32, sigma: f64) -> Result<GrayImage, LprError> {
    check_kernel(kernel_size, sigma)?;
    let (width, height) = src.dimensions();
    let k = kernel_size / 2;
    let mut dst = GrayImage::new(width, height);

    // window doesn't fit anywhere, everything is border
    if width <= 2 * k || height <= 2 * k {
        return Ok(dst);
    }
    let kernel = gaussian_kernel(kernel_size, sigma)?;

    for y in k..height - k {
        for x in k..width - k {
            let mut value = 0.0;
            for i in 0..kernel_size {
                for j in 0..kernel_size {
                    let sample = src.get_pixel(x + j - k, y + i - k).0[0] as f64;
                    value += sample * kernel[(i * kernel_size + j) as usize];
                }
            }
            // truncate, no rounding
            dst.put_pixel(x, y, Luma([value as u8]));
        }
    }
    Ok(dst)
}

/// 255 where the pixel is strictly above `thresh`, 0 elsewhere.
pub fn threshold(src: &GrayImage, thresh: u8) -> GrayImage {
    let mut dst = src.clone();
    dst.pixels_mut().for_each(|p| {
        p.0[0] = if p.0[0] > thresh { 255 } else { 0 };
    });
    dst
}

/// Square window max filter applied `iterations` times, each pass reading the
/// previous pass's output.
pub fn dilate(src: &GrayImage, kernel_size: u32, iterations: u32) -> Result<GrayImage, LprError> {
    check_window(kernel_size, "structuring element")?;
    if iterations == 0 {
        return Err(LprError::precondition("dilation needs at least one iteration"));
    }

    let (width, height) = src.dimensions();
    let k = kernel_size / 2;
    let mut result = src.clone();
    if width <= 2 * k || height <= 2 * k {
        return Ok(result);
    }

    for _ in 0..iterations {
        let previous = result.clone();
        for y in k..height - k {
            for x in k..width - k {
                let mut max = 0u8;
                for wy in y - k..=y + k {
                    for wx in x - k..=x + k {
                        max = max.max(previous.get_pixel(wx, wy).0[0]);
                    }
                }
                result.put_pixel(x, y, Luma([max]));
            }
        }
    }
    Ok(result)
}

/// Binary edge map, thin wrapper over imageproc's canny with hysteresis
/// thresholds `low` and `high`.
pub fn canny(src: &GrayImage, low: f32, high: f32) -> Result<GrayImage, LprError> {
    if !(low > 0.0 && high >= low) {
        return Err(LprError::precondition(format!(
            "canny thresholds must satisfy 0 < low <= high, got {} and {}", low, high
        )));
    }
    Ok(edges::canny(src, low, high))
}

fn check_window(size: u32, what: &str) -> Result<(), LprError> {
    if size % 2 == 0 {
        return Err(LprError::precondition(format!("{} size must be odd, got {}", what, size)));
    }
    Ok(())
}
