//! TileTree - root ownership, per-frame entry point, and the purge sweep.
//!
//! A tree exclusively owns one or more root tiles (e.g. primary content
//! plus a classifier) and the tree-wide policy. All structural mutation -
//! installing fetched children, evicting stale subtrees - happens here, on
//! the traversal thread: workers only ever hand completions back through
//! the loader's queue, and `visit` drains that queue before traversal
//! begins.

use glam::DAffine3;

use crate::args::{DrawArgs, MissingTiles, ViewParams, VisitStats};
use crate::config::TreeConfig;
use crate::geometry::Renderer;
use crate::tile::{Tile, TileDescriptor, TileId};
use crate::visit::{visit_tile, TraversalContext};

/// What one pass over a tree produced.
#[derive(Debug)]
pub struct VisitOutcome {
  /// True when everything the view needs is resident and was drawn; false
  /// when at least one fetch is still outstanding.
  pub completed: bool,
  /// Tiles needing children that are not resident, keyed by depth.
  pub missing: MissingTiles,
  /// Pass counters.
  pub stats: VisitStats,
}

/// A spatial hierarchy with streaming children and age-based eviction.
pub struct TileTree {
  roots: Vec<Tile>,
  config: TreeConfig,
  /// Tree-local to world transform.
  transform: DAffine3,
}

impl TileTree {
  /// Tree with a single root.
  pub fn new(root: &TileDescriptor, config: TreeConfig) -> Self {
    Self::with_roots(std::slice::from_ref(root), config)
  }

  /// Tree with multiple roots, visited in order.
  pub fn with_roots(roots: &[TileDescriptor], config: TreeConfig) -> Self {
    Self {
      roots: roots.iter().map(Tile::from_descriptor).collect(),
      config,
      transform: DAffine3::IDENTITY,
    }
  }

  /// Place the tree in world space.
  pub fn set_transform(&mut self, transform: DAffine3) {
    self.transform = transform;
  }

  /// Tree-local to world transform.
  pub fn transform(&self) -> DAffine3 {
    self.transform
  }

  /// Tree-wide policy.
  pub fn config(&self) -> &TreeConfig {
    &self.config
  }

  /// The root tiles.
  pub fn roots(&self) -> &[Tile] {
    &self.roots
  }

  /// Mutable access to the root tiles.
  pub fn roots_mut(&mut self) -> &mut [Tile] {
    &mut self.roots
  }

  /// Run one pass: install drained fetch completions, then traverse every
  /// root with fresh [`DrawArgs`].
  ///
  /// Overall completion is the AND across roots. `now` is a timestamp from
  /// the clock shared by all trees on this purge timeline (see
  /// [`FrameClock`](crate::clock::FrameClock)).
  pub fn visit(
    &mut self,
    renderer: &mut dyn Renderer,
    view: &ViewParams,
    ctx: &TraversalContext,
    now: f64,
  ) -> VisitOutcome {
    self.install_completions(ctx);

    let mut args = DrawArgs::new(renderer, view, self.transform, &self.config, now);
    let mut completed = true;
    for root in &mut self.roots {
      completed &= visit_tile(root, &mut args, ctx, 0);
    }

    VisitOutcome {
      completed,
      missing: args.missing,
      stats: args.stats,
    }
  }

  /// Drain the loader's completion queue and install results into this
  /// tree. Returns the number of child sets installed.
  ///
  /// The context's loader must be this tree's own: draining consumes the
  /// entire queue, so every completion in it targets a tile that is - or
  /// was - in this tree. A completion whose target is gone (its subtree
  /// was evicted while the fetch was in flight) is dropped; failures put
  /// the target back in a re-requestable state.
  pub fn install_completions(&mut self, ctx: &TraversalContext) -> usize {
    let mut installed = 0;
    for completion in ctx.loader.drain_completions() {
      let Some(tile) = find_in_roots(&mut self.roots, &completion.tile_id) else {
        tracing::debug!(tile = %completion.tile_id, "dropping completion for evicted tile");
        continue;
      };
      if !tile.is_loading() {
        tracing::debug!(tile = %completion.tile_id, "dropping completion for tile no longer loading");
        continue;
      }
      match completion.result {
        Ok(descriptors) => {
          tile.install_children(&descriptors);
          installed += 1;
        }
        Err(_) => tile.mark_load_failed(),
      }
    }
    installed
  }

  /// Age-based eviction sweep, independent of traversal.
  ///
  /// Post-order walk unloading every child subtree whose owner has not been
  /// consulted within the configured purge age. Root tiles themselves are
  /// never removed; tiles with an in-flight fetch have no resident children
  /// and are skipped naturally. Returns the number of subtrees discarded.
  pub fn purge(&mut self, now: f64) -> u32 {
    let older_than = self.config.purge_older_than(now);
    let mut unloaded = 0;
    for root in &mut self.roots {
      purge_subtree(root, older_than, &mut unloaded);
    }
    unloaded
  }

  /// Look up a resident tile by id.
  pub fn find_tile(&self, id: &TileId) -> Option<&Tile> {
    self.roots.iter().find_map(|root| find_in_subtree(root, id))
  }
}

fn purge_subtree(tile: &mut Tile, older_than: f64, unloaded: &mut u32) {
  if let Some(children) = tile.children_mut() {
    for child in children {
      purge_subtree(child, older_than, unloaded);
    }
  }
  if tile.unload_children(older_than) {
    *unloaded += 1;
  }
}

fn find_in_roots<'a>(roots: &'a mut [Tile], id: &TileId) -> Option<&'a mut Tile> {
  roots
    .iter_mut()
    .find_map(|root| find_in_subtree_mut(root, id))
}

fn find_in_subtree<'a>(tile: &'a Tile, id: &TileId) -> Option<&'a Tile> {
  if tile.id() == id {
    return Some(tile);
  }
  tile
    .children()?
    .iter()
    .find_map(|child| find_in_subtree(child, id))
}

fn find_in_subtree_mut<'a>(tile: &'a mut Tile, id: &TileId) -> Option<&'a mut Tile> {
  if tile.id() == id {
    return Some(tile);
  }
  if let Some(children) = tile.children_mut() {
    for child in children {
      if let Some(found) = find_in_subtree_mut(child, id) {
        return Some(found);
      }
    }
  }
  None
}

#[cfg(test)]
#[path = "tree_test.rs"]
mod tree_test;
