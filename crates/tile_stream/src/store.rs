//! Byte-store collaborator and the child-set payload codec.
//!
//! The cache treats persistence as an opaque key-value fetch: tile id in,
//! bytes out. What those bytes encode (geometry payloads, child metadata)
//! only matters at this boundary, where they become [`TileDescriptor`]s.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::tile::{TileDescriptor, TileId};

/// Failure talking to the backing store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
  /// The store backend rejected or failed the operation.
  #[error("store backend: {0}")]
  Backend(String),
}

/// Key-value byte store keyed by tile id.
///
/// Implementations are called from worker threads; `Send + Sync` is part of
/// the contract.
pub trait TileStore: Send + Sync {
  /// Fetch the serialized child set for a tile. `Ok(None)` means the key
  /// is absent.
  fn get(&self, id: &TileId) -> Result<Option<Vec<u8>>, StoreError>;

  /// Write a serialized child set.
  fn put(&self, id: &TileId, bytes: &[u8]) -> Result<(), StoreError>;
}

/// Decode a child-set payload fetched from the store.
pub fn decode_children(bytes: &[u8]) -> Result<Vec<TileDescriptor>, serde_json::Error> {
  serde_json::from_slice(bytes)
}

/// Encode a child set for storage.
pub fn encode_children(descriptors: &[TileDescriptor]) -> Vec<u8> {
  // Descriptor sets contain no map keys that can fail to serialize.
  serde_json::to_vec(descriptors).expect("descriptor serialization is infallible")
}

/// In-memory store for tests, tools, and seeding demos.
#[derive(Default)]
pub struct MemoryStore {
  entries: Mutex<HashMap<TileId, Vec<u8>>>,
}

impl MemoryStore {
  /// Create an empty store.
  pub fn new() -> Self {
    Self::default()
  }

  /// Number of stored payloads.
  pub fn len(&self) -> usize {
    self.entries.lock().unwrap().len()
  }

  /// True when nothing is stored.
  pub fn is_empty(&self) -> bool {
    self.entries.lock().unwrap().is_empty()
  }
}

impl TileStore for MemoryStore {
  fn get(&self, id: &TileId) -> Result<Option<Vec<u8>>, StoreError> {
    Ok(self.entries.lock().unwrap().get(id).cloned())
  }

  fn put(&self, id: &TileId, bytes: &[u8]) -> Result<(), StoreError> {
    self.entries.lock().unwrap().insert(id.clone(), bytes.to_vec());
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::geometry::{Primitive, TileGeometry};

  fn descriptor(id: &str) -> TileDescriptor {
    TileDescriptor {
      id: TileId::new(id),
      range_min: [0.0; 3],
      range_max: [1.0; 3],
      max_screen_error: 16.0,
      is_leaf: false,
      geometry: Some(TileGeometry::new([Primitive(vec![1, 2, 3])])),
    }
  }

  #[test]
  fn test_memory_store_roundtrip() {
    let store = MemoryStore::new();
    let id = TileId::new("t/0");
    assert!(store.get(&id).unwrap().is_none());

    store.put(&id, b"payload").unwrap();
    assert_eq!(store.get(&id).unwrap().unwrap(), b"payload");
    assert_eq!(store.len(), 1);
  }

  #[test]
  fn test_codec_preserves_descriptors() {
    let encoded = encode_children(&[descriptor("a"), descriptor("b")]);
    let decoded = decode_children(&encoded).unwrap();

    assert_eq!(decoded.len(), 2);
    assert_eq!(decoded[0].id, TileId::new("a"));
    assert_eq!(decoded[1].id, TileId::new("b"));
    assert!(decoded[0].geometry.is_some());
  }

  #[test]
  fn test_corrupt_payload_is_an_error() {
    assert!(decode_children(b"not a payload").is_err());
  }
}
