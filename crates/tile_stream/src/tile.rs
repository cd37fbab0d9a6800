//! Tile - one node of the spatial hierarchy.
//!
//! A tile owns a range box, a maximum screen-space error threshold, optional
//! geometry, and the loading state of its children. Children are exclusively
//! owned: purging a tile's children drops the whole subtree.
//!
//! Tiles are created from [`TileDescriptor`]s - either the root descriptor a
//! tree is built from, or the child set decoded from a fetched payload.

use serde::{Deserialize, Serialize};

use crate::args::DrawArgs;
use crate::geometry::TileGeometry;
use crate::range::Range3;

/// Identity of a tile, also its key in the byte store.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize, Deserialize)]
pub struct TileId(String);

impl TileId {
  /// Create an id from its string form.
  pub fn new(id: impl Into<String>) -> Self {
    Self(id.into())
  }

  /// The string form, as used for store lookups.
  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl std::fmt::Display for TileId {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(&self.0)
  }
}

/// Serialized form of a tile, as decoded from a child-set payload.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TileDescriptor {
  /// Tile identity (store key for its own child set).
  pub id: TileId,
  /// Range box minimum corner, tree-local.
  pub range_min: [f64; 3],
  /// Range box maximum corner, tree-local.
  pub range_max: [f64; 3],
  /// Maximum tolerated screen-space error in pixels.
  pub max_screen_error: f64,
  /// Leaves have no child set to fetch.
  pub is_leaf: bool,
  /// Own geometry; `None` marks a structural tile that exists purely to
  /// hold children.
  #[serde(default)]
  pub geometry: Option<TileGeometry>,
}

impl TileDescriptor {
  /// The descriptor's range as a [`Range3`].
  pub fn range(&self) -> Range3 {
    Range3::new(self.range_min.into(), self.range_max.into())
  }
}

/// What a tile contributes visually.
#[derive(Clone, Debug)]
pub enum TileContent {
  /// No geometry of its own; exists to hold children. Never culled and
  /// never drawn.
  Structural,
  /// Carries drawable geometry for its level of detail.
  Displayable(TileGeometry),
}

/// Loading state of a tile's children.
#[derive(Debug, Default)]
pub enum ChildrenState {
  /// No fetch issued (or a previous subtree was purged).
  #[default]
  NotLoaded,
  /// A fetch is in flight.
  Loading,
  /// Child set resident. May be empty.
  Loaded(Vec<Tile>),
  /// Last fetch failed; re-requested on a later frame.
  Failed,
}

/// One node of the spatial hierarchy.
#[derive(Debug)]
pub struct Tile {
  id: TileId,
  range: Range3,
  max_screen_error: f64,
  is_leaf: bool,
  content: TileContent,
  children: ChildrenState,
  /// When this tile's children were last needed, in clock seconds.
  last_used: f64,
}

impl Tile {
  /// Build a tile from its serialized form.
  pub fn from_descriptor(desc: &TileDescriptor) -> Self {
    let content = match &desc.geometry {
      Some(geometry) => TileContent::Displayable(geometry.clone()),
      None => TileContent::Structural,
    };
    Self {
      id: desc.id.clone(),
      range: desc.range(),
      max_screen_error: desc.max_screen_error,
      is_leaf: desc.is_leaf,
      content,
      children: ChildrenState::NotLoaded,
      last_used: 0.0,
    }
  }

  /// Tile identity.
  pub fn id(&self) -> &TileId {
    &self.id
  }

  /// Static spatial extent in tree-local space.
  pub fn range(&self) -> &Range3 {
    &self.range
  }

  /// Maximum tolerated screen-space error in pixels.
  pub fn max_screen_error(&self) -> f64 {
    self.max_screen_error
  }

  /// True if the tile carries its own geometry. Structural tiles exist
  /// purely to hold children.
  pub fn is_displayable(&self) -> bool {
    matches!(self.content, TileContent::Displayable(_))
  }

  /// True unless this tile is a leaf of the full dataset.
  pub fn has_children(&self) -> bool {
    !self.is_leaf
  }

  /// Own geometry, if displayable.
  pub fn geometry(&self) -> Option<&TileGeometry> {
    match &self.content {
      TileContent::Displayable(geometry) => Some(geometry),
      TileContent::Structural => None,
    }
  }

  /// The loaded child set. `None` until a fetch has completed; never
  /// blocks.
  pub fn children(&self) -> Option<&[Tile]> {
    match &self.children {
      ChildrenState::Loaded(children) => Some(children),
      _ => None,
    }
  }

  /// Mutable access to the loaded child set.
  pub fn children_mut(&mut self) -> Option<&mut [Tile]> {
    match &mut self.children {
      ChildrenState::Loaded(children) => Some(children.as_mut_slice()),
      _ => None,
    }
  }

  /// True while a child fetch is in flight.
  pub fn is_loading(&self) -> bool {
    matches!(self.children, ChildrenState::Loading)
  }

  /// True if the last child fetch failed and has not been retried.
  pub fn load_failed(&self) -> bool {
    matches!(self.children, ChildrenState::Failed)
  }

  /// True when a child fetch should be issued: the tile has children in
  /// the dataset, and none are resident or in flight.
  pub fn needs_children_request(&self) -> bool {
    self.has_children()
      && matches!(
        self.children,
        ChildrenState::NotLoaded | ChildrenState::Failed
      )
  }

  /// Transition to `Loading` once a fetch has been issued.
  pub fn begin_loading(&mut self) {
    debug_assert!(
      self.needs_children_request(),
      "begin_loading on a tile that is not requestable"
    );
    self.children = ChildrenState::Loading;
  }

  /// Install a fetched child set.
  ///
  /// Callers must guarantee hierarchical containment; a child range outside
  /// the parent range is a data-integrity bug caught in development builds.
  pub fn install_children(&mut self, descriptors: &[TileDescriptor]) {
    debug_assert!(
      !matches!(self.children, ChildrenState::Loaded(_)),
      "install over an already-loaded child set"
    );
    let children: Vec<Tile> = descriptors.iter().map(Tile::from_descriptor).collect();
    for child in &children {
      debug_assert!(
        self.range.contains_range(child.range()),
        "child {} range escapes parent {}",
        child.id(),
        self.id
      );
    }
    self.children = ChildrenState::Loaded(children);
  }

  /// Record a failed fetch; the child slot returns to a re-requestable
  /// state.
  pub fn mark_load_failed(&mut self) {
    self.children = ChildrenState::Failed;
  }

  /// When this tile's children were last needed.
  pub fn last_used(&self) -> f64 {
    self.last_used
  }

  /// Stamp `last_used`. Monotonically non-decreasing.
  pub fn touch(&mut self, now: f64) {
    if now > self.last_used {
      self.last_used = now;
    }
  }

  /// Discard the children subtree if it has not been needed since
  /// `older_than`: grandchildren are unloaded first, then the child set is
  /// dropped and the state returns to `NotLoaded`.
  ///
  /// Returns `true` if a subtree was discarded. A no-op when children are
  /// not resident (in-flight fetches are left alone) or when `last_used` is
  /// within the age window. Calling twice with the same cutoff is
  /// equivalent to calling once.
  pub fn unload_children(&mut self, older_than: f64) -> bool {
    if !matches!(self.children, ChildrenState::Loaded(_)) {
      return false;
    }
    if self.last_used >= older_than {
      return false;
    }
    self.discard_subtree();
    true
  }

  /// Unconditionally drop everything below this tile, deepest first.
  fn discard_subtree(&mut self) {
    if let ChildrenState::Loaded(children) = &mut self.children {
      for child in children.iter_mut() {
        child.discard_subtree();
      }
    }
    self.children = ChildrenState::NotLoaded;
  }

  /// Submit this tile's own geometry to the renderer. Structural tiles and
  /// empty geometry submit nothing.
  pub fn draw(&self, args: &mut DrawArgs<'_>) {
    if let TileContent::Displayable(geometry) = &self.content {
      if !geometry.is_empty() {
        args.draw(&geometry.primitives);
      }
    }
  }
}

#[cfg(test)]
#[path = "tile_test.rs"]
mod tile_test;
