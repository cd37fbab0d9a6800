use std::sync::Arc;

use super::*;
use crate::geometry::{Primitive, TileGeometry};
use crate::store::{encode_children, MemoryStore};

fn child_descriptor(id: &str) -> TileDescriptor {
  TileDescriptor {
    id: TileId::new(id),
    range_min: [0.0; 3],
    range_max: [1.0; 3],
    max_screen_error: 16.0,
    is_leaf: true,
    geometry: Some(TileGeometry::new([Primitive(vec![1, 2, 3])])),
  }
}

fn seeded_store(id: &TileId, children: &[TileDescriptor]) -> Arc<dyn TileStore> {
  let store = MemoryStore::new();
  store.put(id, &encode_children(children)).unwrap();
  Arc::new(store)
}

/// Poll until one completion arrives (fetches run on rayon workers).
fn wait_for_completion(loader: &TileLoader) -> LoadCompletion {
  for _ in 0..1000 {
    let mut completions = loader.drain_completions();
    if let Some(completion) = completions.pop() {
      assert!(completions.is_empty(), "expected a single completion");
      return completion;
    }
    std::thread::sleep(std::time::Duration::from_millis(1));
  }
  panic!("fetch never completed");
}

#[test]
fn test_fetch_decodes_child_set() {
  let id = TileId::new("root");
  let store = seeded_store(&id, &[child_descriptor("root/0"), child_descriptor("root/1")]);
  let loader = TileLoader::new();

  assert!(loader.request(&id, &store));
  let completion = wait_for_completion(&loader);

  assert_eq!(completion.tile_id, id);
  let children = completion.result.expect("payload decodes");
  assert_eq!(children.len(), 2);
  assert_eq!(children[0].id, TileId::new("root/0"));
}

/// At most one outstanding fetch per tile: a second request while the first
/// is in flight is refused.
#[test]
fn test_duplicate_request_refused_while_pending() {
  let id = TileId::new("root");
  let store = seeded_store(&id, &[child_descriptor("root/0")]);
  let loader = TileLoader::new();

  assert!(loader.request(&id, &store));
  assert!(loader.is_pending(&id));
  assert!(!loader.request(&id, &store));
  assert_eq!(loader.pending_count(), 1);

  wait_for_completion(&loader);

  // Drained: the id is requestable again.
  assert!(!loader.is_pending(&id));
  assert!(loader.request(&id, &store));
  wait_for_completion(&loader);
}

#[test]
fn test_absent_payload_completes_with_not_found() {
  let id = TileId::new("nowhere");
  let store: Arc<dyn TileStore> = Arc::new(MemoryStore::new());
  let loader = TileLoader::new();

  assert!(loader.request(&id, &store));
  let completion = wait_for_completion(&loader);

  assert!(matches!(completion.result, Err(LoadError::NotFound)));
  assert!(!loader.is_pending(&id));
}

/// A corrupt payload is recovered exactly like a fetch failure.
#[test]
fn test_corrupt_payload_completes_with_decode_error() {
  let id = TileId::new("root");
  let store = MemoryStore::new();
  store.put(&id, b"{ not a child set").unwrap();
  let store: Arc<dyn TileStore> = Arc::new(store);
  let loader = TileLoader::new();

  assert!(loader.request(&id, &store));
  let completion = wait_for_completion(&loader);

  assert!(matches!(completion.result, Err(LoadError::Decode(_))));
}

#[test]
fn test_independent_tiles_fetch_concurrently() {
  let a = TileId::new("a");
  let b = TileId::new("b");
  let store = MemoryStore::new();
  store.put(&a, &encode_children(&[child_descriptor("a/0")])).unwrap();
  store.put(&b, &encode_children(&[child_descriptor("b/0")])).unwrap();
  let store: Arc<dyn TileStore> = Arc::new(store);
  let loader = TileLoader::new();

  assert!(loader.request(&a, &store));
  assert!(loader.request(&b, &store));
  assert_eq!(loader.pending_count(), 2);

  let mut seen = Vec::new();
  for _ in 0..1000 {
    seen.extend(loader.drain_completions());
    if seen.len() == 2 {
      break;
    }
    std::thread::sleep(std::time::Duration::from_millis(1));
  }

  assert_eq!(seen.len(), 2);
  assert!(seen.iter().all(|completion| completion.result.is_ok()));
  assert_eq!(loader.pending_count(), 0);
}
