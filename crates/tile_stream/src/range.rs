//! Axis-aligned range boxes with double precision for huge datasets.

use glam::{DAffine3, DVec3};

/// Double-precision axis-aligned range box in tree-local space.
///
/// Every tile carries one; a parent's range must contain the ranges of all
/// of its children (hierarchical containment).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Range3 {
  /// Minimum corner (inclusive).
  pub min: DVec3,
  /// Maximum corner (inclusive).
  pub max: DVec3,
}

impl Range3 {
  /// Create a new range from min and max corners.
  ///
  /// # Panics
  /// Debug-asserts that min <= max on all axes.
  pub fn new(min: DVec3, max: DVec3) -> Self {
    debug_assert!(
      min.x <= max.x && min.y <= max.y && min.z <= max.z,
      "range min must be <= max on all axes"
    );
    Self { min, max }
  }

  /// Create a new range from center and half-extents.
  pub fn from_center_half_extents(center: DVec3, half_extents: DVec3) -> Self {
    Self {
      min: center - half_extents,
      max: center + half_extents,
    }
  }

  /// Check if this range contains a point.
  #[inline]
  pub fn contains_point(&self, point: DVec3) -> bool {
    point.x >= self.min.x
      && point.x <= self.max.x
      && point.y >= self.min.y
      && point.y <= self.max.y
      && point.z >= self.min.z
      && point.z <= self.max.z
  }

  /// Check if this range fully contains another (boundary contact counts).
  #[inline]
  pub fn contains_range(&self, other: &Range3) -> bool {
    self.contains_point(other.min) && self.contains_point(other.max)
  }

  /// Get the center of the range.
  #[inline]
  pub fn center(&self) -> DVec3 {
    (self.min + self.max) * 0.5
  }

  /// Get the half-extents of the range.
  #[inline]
  pub fn half_extents(&self) -> DVec3 {
    (self.max - self.min) * 0.5
  }

  /// Radius of the circumscribing sphere, used for screen-space projection.
  #[inline]
  pub fn bounding_radius(&self) -> f64 {
    self.half_extents().length()
  }

  /// Image of this range under an affine transform, as the axis-aligned
  /// box around the 8 transformed corners.
  pub fn transformed(&self, transform: &DAffine3) -> Range3 {
    let mut min = DVec3::INFINITY;
    let mut max = DVec3::NEG_INFINITY;
    for i in 0..8u8 {
      let corner = DVec3::new(
        if i & 1 == 0 { self.min.x } else { self.max.x },
        if i & 2 == 0 { self.min.y } else { self.max.y },
        if i & 4 == 0 { self.min.z } else { self.max.z },
      );
      let p = transform.transform_point3(corner);
      min = min.min(p);
      max = max.max(p);
    }
    Range3 { min, max }
  }
}
