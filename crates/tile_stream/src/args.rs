//! DrawArgs - per-frame traversal context.
//!
//! Constructed fresh for every render pass and discarded afterwards. Carries
//! the view state needed for culling and screen-space-error estimates, the
//! clock snapshot driving purge decisions, and the pass outputs: draw
//! submissions, the missing-tile list, and counters.

use std::collections::BTreeMap;

use glam::{DAffine3, DMat4, DVec3};

use crate::config::TreeConfig;
use crate::frustum::Frustum;
use crate::geometry::{Primitive, Renderer};
use crate::range::Range3;
use crate::tile::TileId;

/// Camera state for one render pass.
#[derive(Clone, Debug)]
pub struct ViewParams {
  /// World-space view-projection matrix.
  pub view_proj: DMat4,
  /// Camera position in world space.
  pub camera_pos: DVec3,
  /// Viewport height in pixels.
  pub viewport_height_px: f64,
  /// Vertical field of view in radians.
  pub fov_y: f64,
}

impl ViewParams {
  /// Screen-space scale: multiplied by (radius / distance) to get the
  /// pixel size of a bounding sphere.
  pub fn pixel_scale(&self) -> f64 {
    self.viewport_height_px / (2.0 * (self.fov_y * 0.5).tan())
  }

  /// World-space frustum for this view.
  pub fn frustum(&self) -> Frustum {
    Frustum::from_view_proj(&self.view_proj)
  }
}

/// Tiles whose children are needed but not resident, keyed by tree depth.
///
/// Depth keying lets callers prioritize shallow (coarse) fetches; iteration
/// is shallowest-first.
#[derive(Debug, Default)]
pub struct MissingTiles {
  by_depth: BTreeMap<u16, Vec<TileId>>,
}

impl MissingTiles {
  /// Register a tile with unresolved children at the given depth.
  pub fn insert(&mut self, depth: u16, id: TileId) {
    self.by_depth.entry(depth).or_default().push(id);
  }

  /// Total number of registered tiles.
  pub fn total(&self) -> usize {
    self.by_depth.values().map(Vec::len).sum()
  }

  /// True when nothing is missing.
  pub fn is_empty(&self) -> bool {
    self.by_depth.is_empty()
  }

  /// Registered tiles at one depth.
  pub fn ids_at(&self, depth: u16) -> &[TileId] {
    self.by_depth.get(&depth).map(Vec::as_slice).unwrap_or(&[])
  }

  /// Iterate depths shallowest-first.
  pub fn iter(&self) -> impl Iterator<Item = (u16, &[TileId])> {
    self.by_depth.iter().map(|(depth, ids)| (*depth, ids.as_slice()))
  }
}

/// Counters accumulated over one traversal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct VisitStats {
  /// Tiles examined (including culled ones).
  pub tiles_visited: u32,
  /// Draw submissions made.
  pub tiles_drawn: u32,
  /// Displayable tiles excluded by the frustum.
  pub tiles_culled: u32,
  /// Child fetches issued this pass.
  pub requests_issued: u32,
  /// Children subtrees discarded this pass.
  pub subtrees_unloaded: u32,
}

/// Per-pass traversal context: view state in, draw calls and missing tiles
/// out.
pub struct DrawArgs<'a> {
  /// Tree-local to world transform for the tree being visited.
  pub transform: DAffine3,
  /// World-space frustum.
  pub frustum: Frustum,
  /// Camera position in world space.
  pub camera_pos: DVec3,
  /// Screen-space scale from [`ViewParams::pixel_scale`].
  pub pixel_scale: f64,
  /// Tree-wide tolerance scaling each tile's error threshold.
  pub pixel_tolerance: f64,
  /// Clock snapshot for this pass, in seconds.
  pub now: f64,
  /// Children whose owner was last consulted before this are purge-eligible.
  pub purge_older_than: f64,
  /// Tiles needing children that are not resident, by depth.
  pub missing: MissingTiles,
  /// Pass counters.
  pub stats: VisitStats,
  renderer: &'a mut dyn Renderer,
}

impl<'a> DrawArgs<'a> {
  /// Build the context for one pass over one tree.
  pub fn new(
    renderer: &'a mut dyn Renderer,
    view: &ViewParams,
    transform: DAffine3,
    config: &TreeConfig,
    now: f64,
  ) -> Self {
    Self {
      transform,
      frustum: view.frustum(),
      camera_pos: view.camera_pos,
      pixel_scale: view.pixel_scale(),
      pixel_tolerance: config.pixel_tolerance,
      now,
      purge_older_than: config.purge_older_than(now),
      missing: MissingTiles::default(),
      stats: VisitStats::default(),
      renderer,
    }
  }

  /// Pixel-unit screen-space error of a world-space range: the projected
  /// size of its bounding sphere at the current viewing distance. A camera
  /// inside the sphere sees unbounded error.
  pub fn pixel_size_error(&self, world_range: &Range3) -> f64 {
    let radius = world_range.bounding_radius();
    let distance = self.camera_pos.distance(world_range.center());
    if distance <= radius {
      return f64::INFINITY;
    }
    (radius / distance) * self.pixel_scale
  }

  /// Submit primitives for rendering under this tree's transform.
  pub fn draw(&mut self, primitives: &[Primitive]) {
    self.renderer.draw(primitives, &self.transform);
    self.stats.tiles_drawn += 1;
  }
}
