//! Axis-aligned bounding boxes in 2D or 3D.
//!
//! A [`BBox`] is used for two different things: the stable, user-facing `bbox` of a geometry
//! (usually lon-lat) and the transient `vecBBox` that follows geometry through each
//! projection and clip step. Both serialize as flat arrays, `[left, bottom, right, top]` or
//! `[left, bottom, right, top, min_z, max_z]`.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::geometry::VectorPoint;

/// Planar axis selector used by clipping and box operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

/// Bounding box with an optional elevation range
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BBox {
    pub left: f64,
    pub bottom: f64,
    pub right: f64,
    pub top: f64,
    /// `(min_z, max_z)` for 3D boxes
    pub z: Option<(f64, f64)>,
}

impl BBox {
    /// Create a 2D bounding box
    pub fn new(left: f64, bottom: f64, right: f64, top: f64) -> Self {
        Self {
            left,
            bottom,
            right,
            top,
            z: None,
        }
    }

    /// Create a 3D bounding box
    pub fn new_3d(left: f64, bottom: f64, right: f64, top: f64, min_z: f64, max_z: f64) -> Self {
        Self {
            left,
            bottom,
            right,
            top,
            z: Some((min_z, max_z)),
        }
    }

    /// Degenerate box around a single point. 3D when the point carries `z`.
    pub fn from_point(point: &VectorPoint) -> Self {
        Self {
            left: point.x,
            bottom: point.y,
            right: point.x,
            top: point.y,
            z: point.z.map(|z| (z, z)),
        }
    }

    /// Tight box around a run of points, `None` when the run is empty
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a VectorPoint>) -> Option<Self> {
        points
            .into_iter()
            .fold(None, |bbox, point| Some(extend_bbox(bbox, point)))
    }

    pub fn is_3d(&self) -> bool {
        self.z.is_some()
    }

    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn height(&self) -> f64 {
        self.top - self.bottom
    }

    /// Lower bound along `axis`
    pub fn min(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.left,
            Axis::Y => self.bottom,
        }
    }

    /// Upper bound along `axis`
    pub fn max(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.right,
            Axis::Y => self.top,
        }
    }

    /// Check if a point lies within the box (edges inclusive, z ignored)
    pub fn point_overlap(&self, point: &VectorPoint) -> bool {
        point.x >= self.left && point.x <= self.right && point.y >= self.bottom && point.y <= self.top
    }

    /// The 2D overlap of two boxes, or `None` when they are disjoint
    pub fn overlap(&self, other: &Self) -> Option<Self> {
        if other.right < self.left
            || self.right < other.left
            || other.top < self.bottom
            || self.top < other.bottom
        {
            return None;
        }

        Some(Self::new(
            self.left.max(other.left),
            self.bottom.max(other.bottom),
            self.right.min(other.right),
            self.top.min(other.top),
        ))
    }

    /// Grow this box to include `other`.
    ///
    /// The elevation range is merged when either side is 3D; a missing range on one side
    /// does not contribute.
    pub fn merge(&mut self, other: &Self) {
        self.left = self.left.min(other.left);
        self.bottom = self.bottom.min(other.bottom);
        self.right = self.right.max(other.right);
        self.top = self.top.max(other.top);
        self.z = match (self.z, other.z) {
            (Some((a_min, a_max)), Some((b_min, b_max))) => Some((a_min.min(b_min), a_max.max(b_max))),
            (a, b) => a.or(b),
        };
    }

    /// Grow this box to include a point
    pub fn extend(&mut self, point: &VectorPoint) {
        self.merge(&Self::from_point(point));
    }

    /// A copy of this box with one axis narrowed to `[k1, k2]`
    pub fn clip(&self, axis: Axis, k1: f64, k2: f64) -> Self {
        let mut clipped = *self;
        match axis {
            Axis::X => {
                clipped.left = clipped.left.max(k1);
                clipped.right = clipped.right.min(k2);
            }
            Axis::Y => {
                clipped.bottom = clipped.bottom.max(k1);
                clipped.top = clipped.top.min(k2);
            }
        }
        clipped
    }
}

/// Extend an optional box by a point, creating it if needed
pub fn extend_bbox(bbox: Option<BBox>, point: &VectorPoint) -> BBox {
    match bbox {
        Some(mut bbox) => {
            bbox.extend(point);
            bbox
        }
        None => BBox::from_point(point),
    }
}

/// Merge `b2` into `b1` and return the result
pub fn merge_bboxes(mut b1: BBox, b2: &BBox) -> BBox {
    b1.merge(b2);
    b1
}

/// The 2D overlap of two boxes, or `None` when they are disjoint
pub fn bbox_overlap(b1: &BBox, b2: &BBox) -> Option<BBox> {
    b1.overlap(b2)
}

/// Clip an optional box along one axis. A missing box clips from the zero box.
pub fn clip_bbox(bbox: Option<&BBox>, axis: Axis, k1: f64, k2: f64) -> BBox {
    bbox.copied()
        .unwrap_or_else(|| BBox::new(0.0, 0.0, 0.0, 0.0))
        .clip(axis, k1, k2)
}

impl Serialize for BBox {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut values = vec![self.left, self.bottom, self.right, self.top];
        if let Some((min_z, max_z)) = self.z {
            values.push(min_z);
            values.push(max_z);
        }
        values.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for BBox {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let values = Vec::<f64>::deserialize(deserializer)?;
        match values.as_slice() {
            [left, bottom, right, top] => Ok(BBox::new(*left, *bottom, *right, *top)),
            [left, bottom, right, top, min_z, max_z] => {
                Ok(BBox::new_3d(*left, *bottom, *right, *top, *min_z, *max_z))
            }
            other => Err(D::Error::custom(format!(
                "bbox must have 4 or 6 values, found {}",
                other.len()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_overlap() {
        let bbox = BBox::new(0.0, 0.0, 1.0, 1.0);
        assert!(bbox.point_overlap(&VectorPoint::new(0.5, 0.5)));
        assert!(bbox.point_overlap(&VectorPoint::new(1.0, 0.0)));
        assert!(!bbox.point_overlap(&VectorPoint::new(2.0, 2.0)));
    }

    #[test]
    fn test_overlap() {
        let a = BBox::new(0.0, 0.0, 1.0, 1.0);
        assert_eq!(a.overlap(&BBox::new(2.0, 2.0, 3.0, 3.0)), None);
        assert_eq!(
            a.overlap(&BBox::new(0.5, 0.5, 1.5, 1.5)),
            Some(BBox::new(0.5, 0.5, 1.0, 1.0))
        );
    }

    #[test]
    fn test_merge_2d_with_3d() {
        let merged = merge_bboxes(
            BBox::new(0.0, 0.0, 1.0, 1.0),
            &BBox::new_3d(0.4, 0.4, 1.2, 1.2, 0.0, 1.0),
        );
        assert_eq!(merged, BBox::new_3d(0.0, 0.0, 1.2, 1.2, 0.0, 1.0));
    }

    #[test]
    fn test_extend_tracks_elevation() {
        let mut bbox = extend_bbox(None, &VectorPoint::new_3d(1.0, 2.0, 4.0));
        bbox.extend(&VectorPoint::new_3d(-1.0, 3.0, -2.0));
        bbox.extend(&VectorPoint::new(0.0, 0.0));
        assert_eq!(bbox, BBox::new_3d(-1.0, 0.0, 1.0, 3.0, -2.0, 4.0));
    }

    #[test]
    fn test_clip_bbox() {
        let bbox = BBox::new(0.0, 0.0, 10.0, 10.0);
        let res = clip_bbox(Some(&bbox), Axis::X, 2.0, 8.0);
        assert_eq!(res, BBox::new(2.0, 0.0, 8.0, 10.0));
        let res = clip_bbox(Some(&res), Axis::Y, 2.0, 8.0);
        assert_eq!(res, BBox::new(2.0, 2.0, 8.0, 8.0));
    }

    #[test]
    fn test_serde_array_form() {
        let bbox = BBox::new_3d(0.0, 1.0, 2.0, 3.0, -1.0, 5.0);
        let json = serde_json::to_string(&bbox).unwrap();
        assert_eq!(json, "[0.0,1.0,2.0,3.0,-1.0,5.0]");
        let back: BBox = serde_json::from_str(&json).unwrap();
        assert_eq!(back, bbox);

        assert!(serde_json::from_str::<BBox>("[0,1,2]").is_err());
    }
}
