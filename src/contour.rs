use image::GrayImage;
use imageproc::contours::{ find_contours, BorderType, Contour };
use imageproc::rect::Rect;

/// Axis aligned box over raster coordinates.
/// A box with zero area means "nothing found".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BoundingBox {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {

    pub const EMPTY: BoundingBox = BoundingBox { x: 0, y: 0, width: 0, height: 0 };

    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    pub fn is_empty(&self) -> bool {
        self.area() == 0
    }

    /// width / height
    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    /// integer center, rounded toward the top left
    pub fn center(&self) -> (i32, i32) {
        (self.x + (self.width / 2) as i32, self.y + (self.height / 2) as i32)
    }

    pub fn right(&self) -> i32 {
        self.x + self.width as i32
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height as i32
    }

    /// Smallest box holding both. An empty side is ignored.
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        BoundingBox::new(x, y, (right - x) as u32, (bottom - y) as u32)
    }

    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a imageproc::point::Point<i32>>) -> BoundingBox {
        let mut iter = points.into_iter();
        let first = match iter.next() {
            Some(p) => p,
            None => return BoundingBox::EMPTY,
        };
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
        for p in iter {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        // inclusive pixel extent
        BoundingBox::new(min_x, min_y, (max_x - min_x + 1) as u32, (max_y - min_y + 1) as u32)
    }

    /// imageproc rect for drawing, `None` for the empty box
    pub fn to_rect(&self) -> Option<Rect> {
        if self.is_empty() {
            return None;
        }
        Some(Rect::at(self.x, self.y).of_size(self.width, self.height))
    }
}

/// Boxes of the outermost borders in `binary`, in the order the border
/// follower meets them (raster scan). Holes and anything nested inside a hole
/// are skipped.
pub fn external_boxes(binary: &GrayImage) -> Vec<BoundingBox> {
    let contours: Vec<Contour<i32>> = find_contours(binary);
    contours.iter()
        .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none())
        .filter(|c| !c.points.is_empty())
        .map(|c| BoundingBox::from_points(&c.points))
        .collect()
}
