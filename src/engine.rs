//! The ranker that runs the scorer over a whole catalog.

use crate::context::SearchContext;
use crate::rules::ScoringRules;
use crate::scoring::Scorer;
use crate::types::{EntityId, Query, ScoredEntry, Searchable};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Ranks catalog entries for a query.
///
/// `Ranker` is the single ranking implementation shared by the inline and the
/// worker backends, so both always produce the same order.
///
/// # Examples
///
/// ```rust
/// use toolsearch::prelude::*;
///
/// let catalog = vec![
///     CatalogEntry::new("a")
///         .with_tag("alpha")
///         .with_meta("en", LocalizedMeta::new("Alpha Tool", "first")),
///     CatalogEntry::new("b")
///         .with_tag("beta")
///         .with_meta("en", LocalizedMeta::new("Beta Tool", "second")),
/// ];
///
/// let ranker = Ranker::default();
/// assert_eq!(ranker.rank(&catalog, &Query::new("alpha", "en")), vec!["a"]);
/// assert_eq!(ranker.rank(&catalog, &Query::new("", "en")), vec!["a", "b"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Ranker {
  scorer: Scorer,
}

impl Ranker {
  /// Creates a ranker with the given weights.
  pub fn new(rules: ScoringRules) -> Self {
    Self {
      scorer: Scorer::new(rules),
    }
  }

  /// The scorer used for each entry.
  pub fn scorer(&self) -> &Scorer {
    &self.scorer
  }

  /// Returns the ids of matching entries, best match first.
  ///
  /// A blank query returns every id in catalog order. Otherwise entries
  /// scoring `0` are dropped and the rest are sorted by descending score;
  /// equal scores keep their catalog order.
  pub fn rank<T: Searchable>(&self, entries: &[T], query: &Query) -> Vec<EntityId> {
    self
      .rank_positions(entries, query)
      .into_iter()
      .map(|position| entries[position].id().to_string())
      .collect()
  }

  /// Like [`rank`](Self::rank), but returns positions into `entries`.
  pub fn rank_positions<T: Searchable>(&self, entries: &[T], query: &Query) -> Vec<usize> {
    let ctx = SearchContext::new(query);
    if ctx.is_browse() {
      return (0..entries.len()).collect();
    }

    let mut scored = self.score_all(entries, &ctx);
    sort_by_score(&mut scored);
    scored.into_iter().map(|(position, _)| position).collect()
  }

  /// Like [`rank`](Self::rank), but keeps the scores. Browse results carry a
  /// score of `0`.
  pub fn rank_scored<T: Searchable>(&self, entries: &[T], query: &Query) -> Vec<ScoredEntry> {
    let ctx = SearchContext::new(query);
    let scored = if ctx.is_browse() {
      (0..entries.len()).map(|position| (position, 0)).collect()
    } else {
      let mut scored = self.score_all(entries, &ctx);
      sort_by_score(&mut scored);
      scored
    };

    scored
      .into_iter()
      .map(|(position, score)| ScoredEntry {
        id: entries[position].id().to_string(),
        score,
        position,
      })
      .collect()
  }

  /// Scores every entry, keeping non-zero scores in catalog order.
  #[cfg(feature = "parallel")]
  fn score_all<T: Searchable>(&self, entries: &[T], ctx: &SearchContext) -> Vec<(usize, u32)> {
    entries
      .par_iter()
      .enumerate()
      .filter_map(|(position, entry)| {
        let score = self.scorer.score(entry, ctx);
        (score > 0).then_some((position, score))
      })
      .collect()
  }

  /// Scores every entry, keeping non-zero scores in catalog order.
  #[cfg(not(feature = "parallel"))]
  fn score_all<T: Searchable>(&self, entries: &[T], ctx: &SearchContext) -> Vec<(usize, u32)> {
    entries
      .iter()
      .enumerate()
      .filter_map(|(position, entry)| {
        let score = self.scorer.score(entry, ctx);
        (score > 0).then_some((position, score))
      })
      .collect()
  }
}

// Both sorts are stable: ties keep catalog order.
#[cfg(feature = "parallel")]
fn sort_by_score(scored: &mut [(usize, u32)]) {
  scored.par_sort_by(|a, b| b.1.cmp(&a.1));
}

#[cfg(not(feature = "parallel"))]
fn sort_by_score(scored: &mut [(usize, u32)]) {
  scored.sort_by(|a, b| b.1.cmp(&a.1));
}
