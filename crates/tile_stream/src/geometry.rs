//! Opaque drawable payloads and the renderer seam.
//!
//! The cache never interprets primitive contents; it only decides which
//! tiles' primitives to hand to the renderer each frame.

use glam::DAffine3;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// One opaque encoded draw packet (vertex/index blobs, texture refs - the
/// renderer knows, the cache does not).
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Primitive(pub Vec<u8>);

impl std::fmt::Debug for Primitive {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "Primitive({} bytes)", self.0.len())
  }
}

/// A displayable tile's own geometry: the primitives drawn when the tile is
/// selected at its level of detail (or as a coarse placeholder).
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TileGeometry {
  /// Drawable primitives, in submission order.
  pub primitives: SmallVec<[Primitive; 4]>,
}

impl TileGeometry {
  /// Geometry holding the given primitives.
  pub fn new(primitives: impl IntoIterator<Item = Primitive>) -> Self {
    Self {
      primitives: primitives.into_iter().collect(),
    }
  }

  /// True when there is nothing to draw.
  pub fn is_empty(&self) -> bool {
    self.primitives.is_empty()
  }
}

/// Renderer collaborator.
///
/// Receives draw submissions during traversal; the transform maps the
/// tile's tree-local coordinates into world space.
pub trait Renderer {
  /// Submit primitives for rendering.
  fn draw(&mut self, primitives: &[Primitive], transform: &DAffine3);
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_debug_elides_bytes() {
    let primitive = Primitive(vec![0u8; 4096]);
    assert_eq!(format!("{:?}", primitive), "Primitive(4096 bytes)");
  }

  #[test]
  fn test_geometry_is_empty() {
    assert!(TileGeometry::default().is_empty());
    assert!(!TileGeometry::new([Primitive(vec![1, 2, 3])]).is_empty());
  }
}
