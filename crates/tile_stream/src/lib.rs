//! tile_stream - Framework/engine independent tile-tree streaming and LOD cache
//!
//! This crate decides, for a given camera view, which nodes of a spatial
//! hierarchy are detailed enough to draw, requests missing child data
//! asynchronously, and evicts subtrees that have gone unused. It renders
//! nothing itself: geometry payloads are opaque, and the renderer, byte
//! store, and clock are collaborator traits supplied by the embedder.
//!
//! # Features
//!
//! - **Screen-space-error LOD selection**: each tile carries a pixel-error
//!   threshold; traversal recurses only where the view demands more detail
//! - **Hole-free streaming**: too-coarse tiles are drawn as placeholders
//!   while their children are fetched in the background
//! - **Single-writer tree mutation**: workers fetch and decode off-thread,
//!   results are installed on the traversal thread from a completion queue
//! - **Age-based eviction**: subtrees not consulted within a configurable
//!   window are discarded by an independent purge sweep
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use tile_stream::{
//!   FrameClock, MemoryStore, TileLoader, TileStore, TileTree, TraversalContext, TreeConfig,
//! };
//!
//! let store: Arc<dyn TileStore> = Arc::new(MemoryStore::new());
//! let ctx = TraversalContext::new(Arc::new(TileLoader::new()), store);
//! let mut tree = TileTree::new(&root_descriptor, TreeConfig::default());
//! let clock = FrameClock::new();
//!
//! // Each frame:
//! let outcome = tree.visit(&mut renderer, &view, &ctx, clock.now_seconds());
//! if !outcome.completed {
//!   // More detail is streaming in; another pass will refine.
//! }
//! ```

pub mod range;
pub use range::Range3;

pub mod frustum;
pub use frustum::{Frustum, Intersection};

pub mod config;
pub use config::TreeConfig;

pub mod clock;
pub use clock::FrameClock;

pub mod geometry;
pub use geometry::{Primitive, Renderer, TileGeometry};

pub mod store;
pub use store::{decode_children, encode_children, MemoryStore, StoreError, TileStore};

pub mod tile;
pub use tile::{ChildrenState, Tile, TileContent, TileDescriptor, TileId};

pub mod loader;
pub use loader::{LoadCompletion, LoadError, TileLoader};

pub mod args;
pub use args::{DrawArgs, MissingTiles, ViewParams, VisitStats};

pub mod visit;
pub use visit::{classify, visit_tile, Classification, TraversalContext};

pub mod tree;
pub use tree::{TileTree, VisitOutcome};

// Test utilities
#[cfg(test)]
pub mod test_utils;
