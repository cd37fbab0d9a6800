//! Asynchronous child-fetch pipeline.
//!
//! Fetches run on rayon's thread pool; completed results come back to the
//! traversal thread through a crossbeam channel drained at a well-defined
//! point each frame (before traversal begins). Workers never touch tree
//! state.
//!
//! The pending set guarantees at most one outstanding fetch per tile:
//! requests check-and-insert under one lock, and the entry is cleared only
//! when the completion is drained.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use crossbeam_channel::{unbounded, Receiver, Sender, TryRecvError};

use crate::store::{decode_children, StoreError, TileStore};
use crate::tile::{TileDescriptor, TileId};

/// Why a child fetch produced no child set.
///
/// All variants are recovered locally: the tile returns to a
/// re-requestable state and a later frame retries.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
  /// The store has no payload under this tile's id.
  #[error("tile payload missing from store")]
  NotFound,
  /// The store backend failed.
  #[error(transparent)]
  Store(#[from] StoreError),
  /// The payload was fetched but did not decode.
  #[error("undeserializable payload: {0}")]
  Decode(#[from] serde_json::Error),
}

/// A finished fetch, successful or not, handed back to the traversal
/// thread.
#[derive(Debug)]
pub struct LoadCompletion {
  /// The tile whose children were fetched.
  pub tile_id: TileId,
  /// Decoded child set, or the failure to record.
  pub result: Result<Vec<TileDescriptor>, LoadError>,
}

/// Fetch pipeline for one tree, reached through a
/// [`TraversalContext`](crate::visit::TraversalContext).
///
/// Each [`TileTree`](crate::tree::TileTree) owns exactly one loader:
/// draining consumes the whole completion queue, so results are only
/// routable when a single tree installs them. The backing [`TileStore`]
/// may be shared across loaders.
pub struct TileLoader {
  pending: Mutex<HashSet<TileId>>,
  sender: Sender<LoadCompletion>,
  receiver: Receiver<LoadCompletion>,
}

impl TileLoader {
  /// Create a loader with an empty pending set.
  pub fn new() -> Self {
    let (sender, receiver) = unbounded();
    Self {
      pending: Mutex::new(HashSet::new()),
      sender,
      receiver,
    }
  }

  /// Issue a child fetch for `id` unless one is already outstanding.
  ///
  /// Returns `true` if a fetch was spawned. Idempotent while a fetch is in
  /// flight; once its completion has been drained, the id becomes
  /// requestable again.
  pub fn request(&self, id: &TileId, store: &Arc<dyn TileStore>) -> bool {
    {
      let mut pending = self.pending.lock().unwrap();
      if !pending.insert(id.clone()) {
        return false;
      }
    }

    let sender = self.sender.clone();
    let store = Arc::clone(store);
    let tile_id = id.clone();

    rayon::spawn(move || {
      let result = fetch_children(&*store, &tile_id);
      if let Err(error) = &result {
        tracing::warn!(tile = %tile_id, %error, "child fetch failed");
      }
      // Ignore send error (loader dropped = shutdown).
      let _ = sender.send(LoadCompletion { tile_id, result });
    });

    true
  }

  /// Drain all completions (non-blocking) and release their pending
  /// entries. Called on the traversal thread before each visit.
  pub fn drain_completions(&self) -> Vec<LoadCompletion> {
    let mut completions = Vec::new();
    loop {
      match self.receiver.try_recv() {
        Ok(completion) => completions.push(completion),
        Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
      }
    }

    if !completions.is_empty() {
      let mut pending = self.pending.lock().unwrap();
      for completion in &completions {
        pending.remove(&completion.tile_id);
      }
    }

    completions
  }

  /// True while a fetch for `id` is outstanding (not yet drained).
  pub fn is_pending(&self, id: &TileId) -> bool {
    self.pending.lock().unwrap().contains(id)
  }

  /// Number of outstanding fetches.
  pub fn pending_count(&self) -> usize {
    self.pending.lock().unwrap().len()
  }
}

impl Default for TileLoader {
  fn default() -> Self {
    Self::new()
  }
}

/// Fetch and decode one child set (called on a worker thread).
fn fetch_children(store: &dyn TileStore, id: &TileId) -> Result<Vec<TileDescriptor>, LoadError> {
  let bytes = store.get(id)?.ok_or(LoadError::NotFound)?;
  Ok(decode_children(&bytes)?)
}

#[cfg(test)]
#[path = "loader_test.rs"]
mod loader_test;
