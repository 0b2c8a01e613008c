//! Query tokenization and relevance scoring.
//!
//! - [`tokenizer`]: splits a query into lowercase words, using Unicode word
//!   boundaries when the `segmentation` feature is enabled.
//! - [`scorer`]: computes the relevance of one entry for a prepared query.

pub mod scorer;
pub mod tokenizer;

pub use scorer::{ScoreBreakdown, Scorer};
pub use tokenizer::{tokenize, Segmenter};
