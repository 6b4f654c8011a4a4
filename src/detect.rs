//! Geometric plate detectors working on contour boxes.
//!
//! Two ways to find a plate:
//! * the plate border itself shows up as one contour with plate proportions
//!   ([`detect_plate_contour`]);
//! * the border is lost but the characters survive, so letter sized boxes are
//!   picked out ([`filter_letters`]) and clustered ([`group_letters`]).
//!
//! Both run in input order and break ties toward the first box/seed met, so
//! the result depends on contour extraction order and nothing else.

use serde::Deserialize;

use std::fmt;

use crate::contour::{ self, BoundingBox };
use crate::Stages;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PlateParams {
    pub min_width: u32,
    pub min_height: u32,
    /// exclusive
    pub min_ratio: f32,
    /// exclusive
    pub max_ratio: f32,
    /// the ratio a plate should ideally have
    pub target_ratio: f32,
}

impl Default for PlateParams {
    fn default() -> Self {
        Self {
            min_width: 100,
            min_height: 30,
            min_ratio: 2.5,
            max_ratio: 5.5,
            target_ratio: 4.0,
        }
    }
}

/// Open intervals for letter height and width.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct SizeBounds {
    pub height: (u32, u32),
    pub width: (u32, u32),
}

impl SizeBounds {
    pub fn contains(&self, b: &BoundingBox) -> bool {
        b.height > self.height.0 && b.height < self.height.1
            && b.width > self.width.0 && b.width < self.width.1
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LetterParams {
    /// above this mean contour height the image is treated as high resolution
    pub large_mean_height: f64,
    pub large: SizeBounds,
    pub small: SizeBounds,
}

impl Default for LetterParams {
    fn default() -> Self {
        Self {
            large_mean_height: 80.0,
            large: SizeBounds { height: (20, 350), width: (10, 150) },
            small: SizeBounds { height: (15, 120), width: (5, 60) },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GroupingParams {
    /// max distance between letter centers, exclusive
    pub radius: f64,
    pub min_letters: usize,
    pub max_letters: usize,
    pub min_ratio: f32,
    pub max_ratio: f32,
}

impl Default for GroupingParams {
    fn default() -> Self {
        Self {
            radius: 150.0,
            min_letters: 5,
            max_letters: 8,
            min_ratio: 2.5,
            max_ratio: 5.5,
        }
    }
}

/// Pick the box that looks most like a whole plate.
///
/// Boxes smaller than `min_width x min_height` or with a ratio outside
/// `(min_ratio, max_ratio)` are dropped, the remaining box closest to
/// `target_ratio` wins. [`BoundingBox::EMPTY`] if nothing qualifies.
pub fn detect_plate_contour(boxes: &[BoundingBox], params: &PlateParams) -> BoundingBox {
    let mut best = BoundingBox::EMPTY;
    let mut best_diff = f32::MAX;

    for b in boxes {
        if b.width < params.min_width || b.height < params.min_height {
            continue;
        }
        let ratio = b.aspect_ratio();
        if ratio > params.min_ratio && ratio < params.max_ratio {
            let diff = (ratio - params.target_ratio).abs();
            if diff < best_diff {
                best_diff = diff;
                best = *b;
            }
        }
    }
    best
}

/// Size bounds to use for `boxes`, chosen from their mean height.
pub fn letter_bounds(boxes: &[BoundingBox], params: &LetterParams) -> SizeBounds {
    let mean_height = if boxes.is_empty() {
        0.0
    } else {
        boxes.iter().map(|b| b.height as f64).sum::<f64>() / boxes.len() as f64
    };
    if mean_height > params.large_mean_height {
        params.large
    } else {
        params.small
    }
}

/// Keep the boxes sized like a single character, in input order.
pub fn filter_letters(boxes: &[BoundingBox], params: &LetterParams) -> Vec<BoundingBox> {
    let bounds = letter_bounds(boxes, params);
    boxes.iter().filter(|b| bounds.contains(b)).copied().collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct LetterGroup {
    /// union of `members`
    pub plate: BoundingBox,
    pub members: Vec<BoundingBox>,
}

/// Largest plate shaped cluster of letters.
///
/// Every candidate seeds a cluster made of itself and the candidates whose
/// centers lie closer than `radius`. Clusters with a member count outside
/// `[min_letters, max_letters]` or a union ratio outside `(min_ratio, max_ratio)`
/// are dropped. A later cluster only wins with strictly more members.
pub fn best_letter_group(candidates: &[BoundingBox], params: &GroupingParams) -> Option<LetterGroup> {
    let mut best: Option<LetterGroup> = None;

    for (i, seed) in candidates.iter().enumerate() {
        let seed_center = seed.center();
        let members: Vec<BoundingBox> = candidates.iter().enumerate()
            .filter(|(j, other)| *j == i || distance(seed_center, other.center()) < params.radius)
            .map(|(_, b)| *b)
            .collect();

        if members.len() < params.min_letters || members.len() > params.max_letters {
            continue;
        }

        let plate = members.iter().fold(BoundingBox::EMPTY, |acc, b| acc.union(b));
        let ratio = plate.aspect_ratio();
        if !(ratio > params.min_ratio && ratio < params.max_ratio) {
            continue;
        }

        let best_len = best.as_ref().map_or(0, |g| g.members.len());
        if members.len() > best_len {
            best = Some(LetterGroup { plate, members });
        }
    }
    best
}

/// Union box of the best letter cluster, [`BoundingBox::EMPTY`] if there is none.
pub fn group_letters(candidates: &[BoundingBox], params: &GroupingParams) -> BoundingBox {
    best_letter_group(candidates, params)
        .map(|g| g.plate)
        .unwrap_or(BoundingBox::EMPTY)
}

fn distance((ax, ay): (i32, i32), (bx, by): (i32, i32)) -> f64 {
    let dx = (ax - bx) as f64;
    let dy = (ay - by) as f64;
    (dx * dx + dy * dy).sqrt()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Contour,
    LetterGrouping,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Contour => write!(f, "contour"),
            Strategy::LetterGrouping => write!(f, "letter-grouping"),
        }
    }
}

/// Outcome of one detection call.
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    /// [`BoundingBox::EMPTY`] when no plate was found
    pub plate: BoundingBox,
    /// which strategy found the plate
    pub strategy: Option<Strategy>,
    /// letter sized boxes looked at, for drawing
    pub candidates: Vec<BoundingBox>,
    /// the letters making up `plate`
    pub members: Vec<BoundingBox>,
}

impl Detection {

    pub fn none() -> Self {
        Self {
            plate: BoundingBox::EMPTY,
            strategy: None,
            candidates: Vec::new(),
            members: Vec::new(),
        }
    }

    pub fn is_found(&self) -> bool {
        !self.plate.is_empty()
    }
}

/// One way of turning the preprocessed rasters into a plate box.
pub trait PlateStrategy {
    fn kind(&self) -> Strategy;
    fn detect(&self, stages: &Stages) -> Detection;
}

/// Plate border as a single contour of the dilated edge map.
pub struct ContourStrategy {
    pub params: PlateParams,
}

impl PlateStrategy for ContourStrategy {

    fn kind(&self) -> Strategy {
        Strategy::Contour
    }

    fn detect(&self, stages: &Stages) -> Detection {
        let boxes = contour::external_boxes(&stages.dilated);
        let plate = detect_plate_contour(&boxes, &self.params);
        let strategy = if plate.is_empty() { None } else { Some(self.kind()) };
        Detection { plate, strategy, ..Detection::none() }
    }
}

/// Plate as a cluster of character contours of the raw edge map.
pub struct LetterGroupingStrategy {
    pub letters: LetterParams,
    pub grouping: GroupingParams,
}

impl PlateStrategy for LetterGroupingStrategy {

    fn kind(&self) -> Strategy {
        Strategy::LetterGrouping
    }

    fn detect(&self, stages: &Stages) -> Detection {
        let boxes = contour::external_boxes(&stages.edges);
        let candidates = filter_letters(&boxes, &self.letters);
        match best_letter_group(&candidates, &self.grouping) {
            Some(group) => Detection {
                plate: group.plate,
                strategy: Some(self.kind()),
                candidates,
                members: group.members,
            },
            None => Detection { candidates, ..Detection::none() },
        }
    }
}


#[cfg(test)]
mod test {

    use super::*;

    fn row_of_letters(x: i32, y: i32, count: usize, step: i32) -> Vec<BoundingBox> {
        (0..count).map(|i| BoundingBox::new(x + i as i32 * step, y, 20, 40)).collect()
    }

    #[test]
    fn lone_plate_box_is_returned() {
        let plate = BoundingBox::new(40, 60, 200, 50);
        assert_eq!(detect_plate_contour(&[plate], &PlateParams::default()), plate);
    }

    #[test]
    fn narrow_boxes_give_nothing() {
        let boxes = vec![
            BoundingBox::new(0, 0, 99, 30),
            BoundingBox::new(10, 10, 80, 20),
            BoundingBox::new(20, 20, 50, 40),
        ];
        assert!(detect_plate_contour(&boxes, &PlateParams::default()).is_empty());
    }

    #[test]
    fn short_boxes_give_nothing() {
        let boxes = vec![BoundingBox::new(0, 0, 116, 29)];
        assert!(detect_plate_contour(&boxes, &PlateParams::default()).is_empty());
    }

    #[test]
    fn ratio_bounds_are_exclusive() {
        let params = PlateParams::default();
        // exactly 2.5 and 5.5
        assert!(detect_plate_contour(&[BoundingBox::new(0, 0, 100, 40)], &params).is_empty());
        assert!(detect_plate_contour(&[BoundingBox::new(0, 0, 220, 40)], &params).is_empty());
        let inside = BoundingBox::new(0, 0, 104, 40);
        assert_eq!(detect_plate_contour(&[inside], &params), inside);
    }

    #[test]
    fn closest_to_target_ratio_wins() {
        let boxes = vec![
            BoundingBox::new(0, 0, 150, 50),    // 3.0
            BoundingBox::new(0, 100, 210, 50),  // 4.2
            BoundingBox::new(0, 200, 250, 50),  // 5.0
        ];
        assert_eq!(detect_plate_contour(&boxes, &PlateParams::default()), boxes[1]);
    }

    #[test]
    fn first_box_wins_a_tie() {
        let boxes = vec![
            BoundingBox::new(0, 0, 180, 50),    // 3.6
            BoundingBox::new(0, 100, 230, 50),  // 4.6
            BoundingBox::new(5, 5, 180, 50),    // 3.6 again
        ];
        assert_eq!(detect_plate_contour(&boxes, &PlateParams::default()), boxes[0]);
    }

    #[test]
    fn tall_images_use_large_letter_bounds() {
        let params = LetterParams::default();
        let boxes = vec![
            BoundingBox::new(0, 0, 20, 30),
            BoundingBox::new(50, 0, 20, 10),
            BoundingBox::new(100, 0, 100, 260),
        ];
        // mean height (30 + 10 + 260) / 3 = 100
        assert_eq!(letter_bounds(&boxes, &params), params.large);
        assert_eq!(filter_letters(&boxes, &params), vec![boxes[0], boxes[2]]);
    }

    #[test]
    fn small_images_use_small_letter_bounds() {
        let params = LetterParams::default();
        let boxes = vec![
            BoundingBox::new(0, 0, 10, 30),
            BoundingBox::new(20, 0, 70, 30),  // too wide
            BoundingBox::new(40, 0, 10, 15),  // on the bound
            BoundingBox::new(60, 0, 6, 16),
        ];
        assert_eq!(letter_bounds(&boxes, &params), params.small);
        assert_eq!(filter_letters(&boxes, &params), vec![boxes[0], boxes[3]]);
    }

    #[test]
    fn mean_height_of_exactly_80_stays_small() {
        let params = LetterParams::default();
        let boxes = vec![BoundingBox::new(0, 0, 10, 60), BoundingBox::new(0, 0, 10, 100)];
        assert_eq!(letter_bounds(&boxes, &params), params.small);
    }

    #[test]
    fn no_boxes_no_letters() {
        let params = LetterParams::default();
        assert_eq!(letter_bounds(&[], &params), params.small);
        assert!(filter_letters(&[], &params).is_empty());
    }

    #[test]
    fn six_close_letters_make_a_plate() {
        let letters = row_of_letters(100, 200, 6, 25);
        let plate = group_letters(&letters, &GroupingParams::default());
        // 5 * 25 + 20 = 145 wide, ratio 3.625
        assert_eq!(plate, BoundingBox::new(100, 200, 145, 40));

        let group = best_letter_group(&letters, &GroupingParams::default()).unwrap();
        assert_eq!(group.members, letters);
    }

    #[test]
    fn three_letters_are_too_few() {
        let letters = row_of_letters(100, 200, 3, 25);
        assert!(group_letters(&letters, &GroupingParams::default()).is_empty());
    }

    #[test]
    fn nine_letters_are_too_many() {
        let letters = row_of_letters(0, 0, 9, 12);
        assert!(group_letters(&letters, &GroupingParams::default()).is_empty());
    }

    #[test]
    fn no_letters_no_plate() {
        assert!(best_letter_group(&[], &GroupingParams::default()).is_none());
        assert!(group_letters(&[], &GroupingParams::default()).is_empty());
    }

    #[test]
    fn square_cluster_is_rejected() {
        // 2 x 3 block of letters, union is 68 x 120
        let mut letters = row_of_letters(0, 0, 2, 48);
        letters.extend(row_of_letters(0, 40, 2, 48));
        letters.extend(row_of_letters(0, 80, 2, 48));
        assert!(group_letters(&letters, &GroupingParams::default()).is_empty());
    }

    #[test]
    fn bigger_cluster_wins() {
        let mut letters = row_of_letters(0, 0, 5, 25);
        let seven = row_of_letters(1000, 500, 7, 22);
        letters.extend(seven.iter().copied());
        let group = best_letter_group(&letters, &GroupingParams::default()).unwrap();
        assert_eq!(group.members, seven);
        assert_eq!(group.plate, BoundingBox::new(1000, 500, 152, 40));
    }

    #[test]
    fn first_cluster_wins_a_tie() {
        let mut letters = row_of_letters(0, 0, 6, 25);
        letters.extend(row_of_letters(1000, 500, 6, 25));
        let plate = group_letters(&letters, &GroupingParams::default());
        assert_eq!(plate, BoundingBox::new(0, 0, 145, 40));
    }

    #[test]
    fn radius_is_exclusive() {
        let params = GroupingParams {
            radius: 25.0,
            min_letters: 2,
            min_ratio: 0.5,
            ..GroupingParams::default()
        };
        // centers exactly 25 apart
        let letters = row_of_letters(0, 0, 2, 25);
        assert!(group_letters(&letters, &params).is_empty());
        let letters = row_of_letters(0, 0, 2, 24);
        assert_eq!(group_letters(&letters, &params), BoundingBox::new(0, 0, 44, 40));
    }

    #[test]
    fn detectors_are_deterministic() {
        let mut letters = row_of_letters(0, 0, 6, 25);
        letters.extend(row_of_letters(30, 10, 4, 30));
        let params = GroupingParams::default();
        assert_eq!(best_letter_group(&letters, &params), best_letter_group(&letters, &params));
        let plate_params = PlateParams::default();
        assert_eq!(detect_plate_contour(&letters, &plate_params), detect_plate_contour(&letters, &plate_params));
    }
}
