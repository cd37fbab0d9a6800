//! TreeConfig - tree-wide streaming and eviction policy.

/// Tree-wide policy constants.
///
/// Per-tile detail thresholds come from the data itself (each tile carries a
/// maximum screen-space error); this holds only what applies to the whole
/// tree.
#[derive(Clone, Copy, Debug)]
pub struct TreeConfig {
  /// Scale applied to every tile's maximum screen-space error threshold.
  /// Values above 1.0 accept coarser renderings tree-wide.
  pub pixel_tolerance: f64,

  /// Children not consulted for this many seconds become purge-eligible.
  pub purge_age_seconds: f64,

  /// Minimum element count per tile, honored by tree producers when
  /// splitting content. Traversal does not consult it.
  pub min_elements_per_tile: u32,
}

impl TreeConfig {
  /// Purge cutoff for a pass at `now`: children whose owner was last
  /// consulted before this are eligible for eviction.
  #[inline]
  pub fn purge_older_than(&self, now: f64) -> f64 {
    now - self.purge_age_seconds
  }
}

impl Default for TreeConfig {
  fn default() -> Self {
    Self {
      pixel_tolerance: 1.0,
      purge_age_seconds: 20.0,
      min_elements_per_tile: 100,
    }
  }
}
