//! In-memory catalog snapshots.

use crate::types::{CatalogEntry, EntityId, Searchable};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::warn;

static NEXT_VERSION: AtomicU64 = AtomicU64::new(1);

/// An immutable catalog snapshot.
///
/// A snapshot is never updated in place: loading a new catalog means building
/// a new snapshot, which gets a new process-unique [`version`](Self::version).
/// Backends compare versions to know when their working copy is out of date.
#[derive(Debug)]
pub struct CatalogSnapshot<T> {
  version: u64,
  entries: Vec<T>,
  positions: HashMap<EntityId, usize>,
}

impl<T: Searchable> CatalogSnapshot<T> {
  /// Builds a snapshot from catalog entries, keeping their order.
  ///
  /// Ids are expected to be unique. When an id repeats, lookups resolve to
  /// the first occurrence.
  pub fn new(entries: Vec<T>) -> Self {
    let mut positions = HashMap::with_capacity(entries.len());
    for (position, entry) in entries.iter().enumerate() {
      match positions.entry(entry.id().to_string()) {
        Entry::Occupied(_) => warn!(id = entry.id(), "duplicate catalog id; keeping first occurrence"),
        Entry::Vacant(slot) => {
          slot.insert(position);
        }
      }
    }

    Self {
      version: NEXT_VERSION.fetch_add(1, Ordering::Relaxed),
      entries,
      positions,
    }
  }

  /// Process-unique identifier of this snapshot.
  pub fn version(&self) -> u64 {
    self.version
  }

  /// All entries, in catalog order.
  pub fn entries(&self) -> &[T] {
    &self.entries
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  /// Looks up an entry by id.
  pub fn get(&self, id: &str) -> Option<&T> {
    self.positions.get(id).map(|&position| &self.entries[position])
  }

  /// The minimal searchable projection of every entry.
  pub fn project(&self) -> Vec<CatalogEntry> {
    self.entries.iter().map(Searchable::project).collect()
  }

  /// Resolves ranked ids back into full records, preserving their order.
  /// Unknown ids are skipped.
  pub fn hydrate(&self, ids: &[EntityId]) -> Vec<T>
  where
    T: Clone,
  {
    ids.iter().filter_map(|id| self.get(id).cloned()).collect()
  }

  /// The record a ranked position stands for.
  ///
  /// When the entry at `position` repeats an earlier id, this is the first
  /// occurrence, so resolving by position and by id always agree.
  pub fn at(&self, position: usize) -> Option<&T> {
    self
      .entries
      .get(position)
      .and_then(|entry| self.get(entry.id()))
  }

  /// Clones the records at the given positions, resolved like [`at`](Self::at).
  pub fn select(&self, positions: &[usize]) -> Vec<T>
  where
    T: Clone,
  {
    positions
      .iter()
      .filter_map(|&position| self.at(position).cloned())
      .collect()
  }
}

impl<T: Searchable> FromIterator<T> for CatalogSnapshot<T> {
  fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
    Self::new(iter.into_iter().collect())
  }
}
