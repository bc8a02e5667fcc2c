//! Five-class sentiment scoring over constituency parse trees.
//!
//! Powered by [Candle](https://github.com/huggingface/candle). A pretrained
//! recursive neural tensor network composes word vectors bottom-up through a
//! sentence's parse tree and classifies every node over five ordered classes,
//! `Very Negative` through `Very Positive`. Sentence splitting and parsing
//! stay outside this crate; it consumes trees and returns scores.

#![deny(missing_docs)]

// ============ Internal API ============

pub(crate) mod loaders;
pub(crate) mod models;
pub(crate) mod pipelines;

// ============ Public API ============

pub mod distribution;
pub mod error;
pub mod tree;

pub use pipelines::sentiment;
