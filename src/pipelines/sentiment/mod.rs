//! Tree sentiment pipeline.
//!
//! Scores documents of parsed sentences over five ordered classes, from
//! `Very Negative` to `Very Positive`. Every sentence arrives as a binary
//! constituency [`Tree`](crate::tree::Tree) produced by an external parser;
//! the pipeline returns the overall category, the overall distribution, and
//! one distribution per sentence.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use treebank_sentiment::sentiment::SentimentPipelineBuilder;
//! use treebank_sentiment::tree::Tree;
//!
//! # fn main() -> treebank_sentiment::error::Result<()> {
//! let pipeline = SentimentPipelineBuilder::rntn_from_dir("models/sentiment-en").build()?;
//!
//! // Single sentence - a lone tree is a one-sentence document.
//! let sentence = Tree::internal(Tree::leaf("good")?, Tree::leaf("movie")?);
//! let output = pipeline.run(&sentence)?;
//! println!("overall: {}", output.prediction.category);
//! # Ok(())
//! # }
//! ```
//!
//! # Documents
//!
//! Pass a slice of trees, one per sentence in document order. The overall
//! distribution is the per-class mean of the sentence distributions:
//!
//! ```rust,no_run
//! # use treebank_sentiment::sentiment::{SentimentAttributes, SentimentPipelineBuilder};
//! # use treebank_sentiment::tree::Tree;
//! # fn main() -> treebank_sentiment::error::Result<()> {
//! # let pipeline = SentimentPipelineBuilder::rntn_from_dir("models/sentiment-en").build()?;
//! let document = vec![
//!     Tree::internal(Tree::leaf("great")?, Tree::leaf("acting")?),
//!     Tree::internal(Tree::leaf("boring")?, Tree::leaf("plot")?),
//! ];
//!
//! let output = pipeline.run(&document)?;
//! for (i, sentence) in output.sentences.iter().enumerate() {
//!     println!("sentence {i}: {}", sentence.argmax());
//! }
//!
//! // Attribute form for record pipelines.
//! let attributes = SentimentAttributes::from_output(&output)?;
//! println!("{}", attributes.sentence_scores);
//! # Ok(())
//! # }
//! ```
//!
//! # Supported Models
//!
//! For now only the recursive neural tensor network is supported.
//!
//! | Model | Bundle | Builder Method |
//! |-------|--------|----------------|
//! | RNTN | `config.json` + `vocab.json` + `model.safetensors` | [`SentimentPipelineBuilder::rntn_from_dir`], [`SentimentPipelineBuilder::rntn_from_hub`] |

// ============ Internal API ============

pub(crate) mod builder;
pub(crate) mod format;
pub(crate) mod model;
pub(crate) mod pipeline;

// ============ Public API ============

pub use crate::models::RntnSource;
pub use crate::pipelines::cache::ModelOptions;
pub use crate::pipelines::stats::PipelineStats;
pub use builder::SentimentPipelineBuilder;
pub use format::SentimentAttributes;
pub use model::TreeSentimentModel;
pub use pipeline::{Output, Prediction, SentimentPipeline};

#[doc(hidden)]
pub use pipeline::DocumentInput;

/// Only for generic annotations. Use [`SentimentPipelineBuilder::rntn_from_dir`].
pub type SentimentRntn = crate::models::RntnModel;
