//! Test utilities for traversal and tree tests.
//!
//! Provides a recording renderer, a standard test camera, and descriptor
//! fixtures sized so coarseness flips on the `max_screen_error` value alone.

use std::sync::Arc;

use glam::{DAffine3, DMat4, DVec3};

use crate::args::ViewParams;
use crate::geometry::{Primitive, Renderer, TileGeometry};
use crate::loader::TileLoader;
use crate::store::{encode_children, MemoryStore, TileStore};
use crate::tile::{TileDescriptor, TileId};
use crate::visit::TraversalContext;

/// Records one entry per draw submission.
pub struct RecordingRenderer {
  pub draws: Vec<usize>,
}

impl RecordingRenderer {
  pub fn new() -> Self {
    Self { draws: Vec::new() }
  }
}

impl Renderer for RecordingRenderer {
  fn draw(&mut self, primitives: &[Primitive], _transform: &DAffine3) {
    self.draws.push(primitives.len());
  }
}

/// Camera at the origin looking down -Z; pixel scale ~988.
pub fn test_view() -> ViewParams {
  ViewParams {
    view_proj: DMat4::perspective_rh(1.0, 1.0, 0.1, 10_000.0)
      * DMat4::look_at_rh(DVec3::ZERO, DVec3::NEG_Z, DVec3::Y),
    camera_pos: DVec3::ZERO,
    viewport_height_px: 1080.0,
    fov_y: 1.0,
  }
}

/// Loader plus an empty store.
pub fn empty_context() -> TraversalContext {
  TraversalContext::new(Arc::new(TileLoader::new()), Arc::new(MemoryStore::new()))
}

/// Loader plus a store seeded with one child-set payload.
pub fn seeded_context(id: &TileId, children: &[TileDescriptor]) -> TraversalContext {
  let store = MemoryStore::new();
  store
    .put(id, &encode_children(children))
    .expect("memory store put");
  TraversalContext::new(Arc::new(TileLoader::new()), Arc::new(store))
}

/// A 20-unit cube centered 100 units down -Z projects to ~171 px of error:
/// `max_screen_error` 300 reads as fine enough, 50 as too coarse.
pub fn in_view_descriptor(id: &str, max_screen_error: f64) -> TileDescriptor {
  TileDescriptor {
    id: TileId::new(id),
    range_min: [-10.0, -10.0, -110.0],
    range_max: [10.0, 10.0, -90.0],
    max_screen_error,
    is_leaf: false,
    geometry: Some(TileGeometry::new([Primitive(vec![0xCD; 16])])),
  }
}

/// Same cube placed behind the camera.
pub fn behind_camera_descriptor(id: &str) -> TileDescriptor {
  TileDescriptor {
    range_min: [-10.0, -10.0, 90.0],
    range_max: [10.0, 10.0, 110.0],
    ..in_view_descriptor(id, 50.0)
  }
}

/// The parent's two halves, split on x.
pub fn halves_of(
  parent: &TileDescriptor,
  max_screen_error: f64,
  is_leaf: bool,
) -> [TileDescriptor; 2] {
  let mid = (parent.range_min[0] + parent.range_max[0]) * 0.5;
  let base = TileDescriptor {
    max_screen_error,
    is_leaf,
    ..parent.clone()
  };
  [
    TileDescriptor {
      id: TileId::new(format!("{}/0", parent.id)),
      range_max: [mid, parent.range_max[1], parent.range_max[2]],
      ..base.clone()
    },
    TileDescriptor {
      id: TileId::new(format!("{}/1", parent.id)),
      range_min: [mid, parent.range_min[1], parent.range_min[2]],
      ..base
    },
  ]
}
