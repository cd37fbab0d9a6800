//! Per-frame visibility-driven traversal.
//!
//! Once per frame, per root, [`visit_tile`] classifies every reached tile as
//! outside the view, fine enough to draw, or too coarse. Too-coarse tiles
//! recurse into loaded children; when children are not resident the tile is
//! drawn as a coarse placeholder, registered in the missing list, and a
//! fetch is issued. Classification is recomputed from scratch each frame -
//! nothing about it is stored on the tile.
//!
//! Traversal never blocks on I/O. A tile with unresolved children is simply
//! rendered at its current level of detail until the fetch lands.

use std::sync::Arc;

use crate::args::DrawArgs;
use crate::loader::TileLoader;
use crate::store::TileStore;
use crate::tile::Tile;

/// Collaborators a traversal needs: the fetch pipeline and the byte store
/// it reads from.
///
/// Passed explicitly to traversal entry points; there is no process-wide
/// registry. One context per tree, since a [`TileLoader`] serves exactly
/// one tree; only the store may be shared between contexts.
pub struct TraversalContext {
  /// Fetch pipeline owned by the tree being traversed.
  pub loader: Arc<TileLoader>,
  /// Byte store the loader fetches child sets from.
  pub store: Arc<dyn TileStore>,
}

impl TraversalContext {
  /// Bundle a loader with the store it fetches from.
  pub fn new(loader: Arc<TileLoader>, store: Arc<dyn TileStore>) -> Self {
    Self { loader, store }
  }
}

/// Classification of one tile for one pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Classification {
  /// Displayable and entirely outside the frustum; the branch terminates.
  Outside,
  /// Detailed enough for the current view (or a leaf, which is as fine as
  /// the data gets). Drawn; children are not needed.
  FineEnough,
  /// Too coarse and children are not resident; drawn as a placeholder and
  /// queued for fetching.
  TooCoarseNoChildren,
  /// Too coarse with a resident child set; recursion replaces drawing.
  TooCoarseWithChildren,
}

/// Classify a tile against the current view.
///
/// Structural tiles are never culled: they carry no geometry, so the
/// frustum test is skipped and their own range serves as the error
/// surrogate for the coarseness decision.
pub fn classify(tile: &Tile, args: &DrawArgs<'_>) -> Classification {
  let world_range = tile.range().transformed(&args.transform);

  if tile.is_displayable() && args.frustum.excludes(&world_range) {
    return Classification::Outside;
  }

  if !tile.has_children() {
    return Classification::FineEnough;
  }

  let error = args.pixel_size_error(&world_range);
  if error <= tile.max_screen_error() * args.pixel_tolerance {
    return Classification::FineEnough;
  }

  match tile.children() {
    Some(_) => Classification::TooCoarseWithChildren,
    None => Classification::TooCoarseNoChildren,
  }
}

/// Visit one tile and its needed descendants.
///
/// Returns `true` when the branch is complete: everything below this tile
/// that the current view needs is resident and was drawn. `false` means at
/// least one fetch is outstanding and the caller should expect another pass.
pub fn visit_tile(
  tile: &mut Tile,
  args: &mut DrawArgs<'_>,
  ctx: &TraversalContext,
  depth: u16,
) -> bool {
  args.stats.tiles_visited += 1;

  match classify(tile, args) {
    Classification::Outside => {
      args.stats.tiles_culled += 1;
      // Not being used this frame: stale children can go now instead of
      // waiting for the next purge sweep.
      if tile.unload_children(args.purge_older_than) {
        args.stats.subtrees_unloaded += 1;
      }
      true
    }

    Classification::FineEnough => {
      tile.draw(args);
      // Children resolved at a finer level than the view needs are kept
      // until they age out.
      if tile.unload_children(args.purge_older_than) {
        args.stats.subtrees_unloaded += 1;
      }
      true
    }

    Classification::TooCoarseWithChildren => {
      tile.touch(args.now);
      let mut completed = true;
      if let Some(children) = tile.children_mut() {
        for child in children {
          completed &= visit_tile(child, args, ctx, depth + 1);
        }
      }
      completed
    }

    Classification::TooCoarseNoChildren => {
      // Coarse placeholder while children stream in; avoids holes. The
      // tile is drawn and listed as missing in the same visit.
      tile.draw(args);
      args.missing.insert(depth, tile.id().clone());
      if tile.needs_children_request() {
        if ctx.loader.request(tile.id(), &ctx.store) {
          args.stats.requests_issued += 1;
        }
        tile.begin_loading();
      }
      false
    }
  }
}

#[cfg(test)]
#[path = "visit_test.rs"]
mod visit_test;
