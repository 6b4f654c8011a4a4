#[cfg(feature = "display-window")]
use imageproc::window;

use image::{ DynamicImage, Rgb, RgbImage };
use imageproc::drawing;

use crate::contour::BoundingBox;
use crate::detect::{ Detection, Strategy };

pub const CANDIDATE_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
pub const CONTOUR_PLATE_COLOR: Rgb<u8> = Rgb([255, 255, 0]);
pub const GROUPED_PLATE_COLOR: Rgb<u8> = Rgb([0, 0, 255]);

/// Outline `b` on the canvas, `thickness` pixels growing inward.
/// Cosmetic only: the stroke is not centered on the box edge.
pub fn draw_box(canvas: &mut RgbImage, b: &BoundingBox, color: Rgb<u8>, thickness: u32) {
    for t in 0..thickness {
        let (width, height) = match (b.width.checked_sub(2 * t), b.height.checked_sub(2 * t)) {
            (Some(w), Some(h)) if w > 0 && h > 0 => (w, h),
            _ => break,
        };
        let inner = BoundingBox::new(b.x + t as i32, b.y + t as i32, width, height);
        if let Some(rect) = inner.to_rect() {
            drawing::draw_hollow_rect_mut(canvas, rect, color);
        }
    }
}

/// Copy of `img` with the letter candidates and the plate drawn on it.
pub fn render_detection(img: &DynamicImage, detection: &Detection) -> RgbImage {
    let mut canvas = img.to_rgb8();
    for candidate in &detection.candidates {
        draw_box(&mut canvas, candidate, CANDIDATE_COLOR, 1);
    }
    let color = match detection.strategy {
        Some(Strategy::Contour) => CONTOUR_PLATE_COLOR,
        Some(Strategy::LetterGrouping) => GROUPED_PLATE_COLOR,
        None => return canvas,
    };
    draw_box(&mut canvas, &detection.plate, color, 2);
    canvas
}

#[cfg(feature = "display-window")]
pub fn display_image(title: &str, img: &RgbImage) {
    let (width, height) = img.dimensions();
    let rgba = DynamicImage::ImageRgb8(img.clone()).to_rgba8();
    window::display_image(title, &rgba, width, height);
}
