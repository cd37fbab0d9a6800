//! View-frustum culling for tile ranges.
//!
//! Uses the Gribb/Hartmann method to extract six inward-pointing planes from
//! a view-projection matrix, then classifies range boxes with the
//! effective-radius test.

use glam::{DMat4, DVec3, DVec4};

use crate::range::Range3;

/// Three-way result of a frustum/range test.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Intersection {
  /// Entirely outside at least one plane.
  Outside,
  /// Straddles one or more planes.
  Intersecting,
  /// Entirely inside all six planes.
  Inside,
}

/// World-space view frustum as six inward-pointing planes.
#[derive(Clone, Debug)]
pub struct Frustum {
  /// Plane normals and distances as `DVec4(nx, ny, nz, d)`.
  planes: [DVec4; 6],
}

impl Frustum {
  /// Extract frustum planes from a view-projection matrix.
  pub fn from_view_proj(vp: &DMat4) -> Self {
    let row0 = vp.row(0);
    let row1 = vp.row(1);
    let row2 = vp.row(2);
    let row3 = vp.row(3);

    let mut planes = [
      row3 + row0, // left
      row3 - row0, // right
      row3 + row1, // bottom
      row3 - row1, // top
      row3 + row2, // near
      row3 - row2, // far
    ];

    // Normalize each plane.
    for plane in &mut planes {
      let len = plane.truncate().length();
      if len > 1e-12 {
        *plane /= len;
      }
    }

    Self { planes }
  }

  /// Test a world-space range box against the frustum.
  pub fn test_range(&self, range: &Range3) -> Intersection {
    let center = range.center();
    let half_extents = range.half_extents();
    let mut all_inside = true;

    for plane in &self.planes {
      let normal = plane.truncate();
      let distance = plane.w;

      // Effective radius: projection of half_extents onto the plane normal.
      let effective_radius = half_extents.x * normal.x.abs()
        + half_extents.y * normal.y.abs()
        + half_extents.z * normal.z.abs();

      let signed_dist = normal.dot(center) + distance;

      if signed_dist < -effective_radius {
        return Intersection::Outside;
      }
      if signed_dist < effective_radius {
        all_inside = false;
      }
    }

    if all_inside {
      Intersection::Inside
    } else {
      Intersection::Intersecting
    }
  }

  /// True when the frustum excludes the range entirely.
  #[inline]
  pub fn excludes(&self, range: &Range3) -> bool {
    self.test_range(range) == Intersection::Outside
  }
}

/// A frustum looking down -Z from `eye`, for tests and headless tools.
pub fn look_down_neg_z(eye: DVec3, fov_y: f64, aspect: f64, near: f64, far: f64) -> Frustum {
  let proj = DMat4::perspective_rh(fov_y, aspect, near, far);
  let view = DMat4::look_at_rh(eye, eye + DVec3::NEG_Z, DVec3::Y);
  Frustum::from_view_proj(&(proj * view))
}

#[cfg(test)]
mod tests {
  use super::*;

  fn test_frustum() -> Frustum {
    look_down_neg_z(DVec3::ZERO, 1.0, 1.0, 0.1, 10_000.0)
  }

  #[test]
  fn test_range_ahead_is_inside() {
    let frustum = test_frustum();
    let range = Range3::from_center_half_extents(DVec3::new(0.0, 0.0, -500.0), DVec3::splat(16.0));
    assert_eq!(frustum.test_range(&range), Intersection::Inside);
  }

  #[test]
  fn test_range_far_right_is_outside() {
    let frustum = test_frustum();
    let range =
      Range3::from_center_half_extents(DVec3::new(50_000.0, 0.0, -100.0), DVec3::splat(16.0));
    assert_eq!(frustum.test_range(&range), Intersection::Outside);
    assert!(frustum.excludes(&range));
  }

  #[test]
  fn test_range_behind_camera_is_outside() {
    let frustum = test_frustum();
    let range = Range3::from_center_half_extents(DVec3::new(0.0, 0.0, 100.0), DVec3::splat(5.0));
    assert_eq!(frustum.test_range(&range), Intersection::Outside);
  }

  #[test]
  fn test_range_straddling_edge_intersects() {
    let frustum = test_frustum();
    // Centered on the near plane boundary.
    let range = Range3::from_center_half_extents(DVec3::new(0.0, 0.0, -0.1), DVec3::splat(1.0));
    assert_eq!(frustum.test_range(&range), Intersection::Intersecting);
  }
}
