use std::sync::Arc;

use super::model::TreeSentimentModel;
use crate::distribution::{SentimentClass, SentimentDistribution};
use crate::error::Result;
use crate::pipelines::stats::PipelineStats;
use crate::tree::{ScoredTree, Tree};

// ============ Output types ============

/// The document-level sentiment prediction.
#[derive(Debug, Clone)]
pub struct Prediction {
    /// The overall category, argmax of [`distribution`](Self::distribution)
    /// with ties resolved to the lower class index.
    pub category: SentimentClass,
    /// The overall distribution: per-class mean of the sentence distributions.
    pub distribution: SentimentDistribution,
}

/// Output from [`SentimentPipeline::run`].
#[derive(Debug, Clone)]
pub struct Output {
    /// Document-level prediction.
    pub prediction: Prediction,
    /// Per-sentence root distributions, in document order.
    pub sentences: Vec<SentimentDistribution>,
    /// Execution statistics.
    pub stats: PipelineStats,
}

// ============ Input trait for type-based dispatch ============

/// A document handed to [`SentimentPipeline::run`]: one parse tree per
/// sentence, in document order. A lone tree is a one-sentence document.
#[doc(hidden)]
pub trait DocumentInput<'a> {
    /// The sentence trees making up the document.
    fn into_sentences(self) -> &'a [Tree];
}

impl<'a> DocumentInput<'a> for &'a Tree {
    fn into_sentences(self) -> &'a [Tree] {
        std::slice::from_ref(self)
    }
}

impl<'a> DocumentInput<'a> for &'a [Tree] {
    fn into_sentences(self) -> &'a [Tree] {
        self
    }
}

impl<'a, const N: usize> DocumentInput<'a> for &'a [Tree; N] {
    fn into_sentences(self) -> &'a [Tree] {
        self.as_slice()
    }
}

impl<'a> DocumentInput<'a> for &'a Vec<Tree> {
    fn into_sentences(self) -> &'a [Tree] {
        self.as_slice()
    }
}

// ============ Pipeline ============

/// Scores documents of parsed sentences for five-class sentiment.
///
/// Construct with [`SentimentPipelineBuilder`](super::SentimentPipelineBuilder).
///
/// # Examples
///
/// ```rust,no_run
/// use treebank_sentiment::sentiment::SentimentPipelineBuilder;
/// use treebank_sentiment::tree::Tree;
///
/// # fn main() -> treebank_sentiment::error::Result<()> {
/// let pipeline = SentimentPipelineBuilder::rntn_from_dir("models/sentiment-en").build()?;
///
/// let sentence = Tree::internal(Tree::leaf("good")?, Tree::leaf("movie")?);
/// let output = pipeline.run(&sentence)?;
/// println!(
///     "{} ({:.3})",
///     output.prediction.category,
///     output.prediction.distribution.get(output.prediction.category),
/// );
/// # Ok(())
/// # }
/// ```
pub struct SentimentPipeline<M: TreeSentimentModel> {
    pub(crate) model: Arc<M>,
}

impl<M: TreeSentimentModel> SentimentPipeline<M> {
    /// Score a document.
    ///
    /// Accepts a single `&Tree` or a sequence of trees (`&[Tree]`,
    /// `&[Tree; N]`, `&Vec<Tree>`), one per sentence in document order.
    /// Sentences are evaluated independently; the overall distribution is
    /// their per-class mean and the overall category its argmax.
    ///
    /// # Errors
    ///
    /// Fails with [`PipelineError::EmptyDocument`](crate::error::PipelineError::EmptyDocument)
    /// when the document contains no sentences, and propagates any evaluation
    /// error. No partial results are returned.
    pub fn run<'a, I: DocumentInput<'a>>(&self, input: I) -> Result<Output> {
        let stats_builder = PipelineStats::start();
        let sentences = input.into_sentences();

        let scores = self.model.score_sentences(sentences)?;
        let overall = SentimentDistribution::mean(&scores)?;

        Ok(Output {
            prediction: Prediction {
                category: overall.argmax(),
                distribution: overall,
            },
            sentences: scores,
            stats: stats_builder.finish(sentences.len()),
        })
    }

    /// Evaluate one sentence tree, returning the vector and distribution at
    /// every node.
    pub fn score_tree(&self, tree: &Tree) -> Result<ScoredTree> {
        self.model.evaluate(tree)
    }

    /// Returns the device (CPU/GPU) the model is running on.
    pub fn device(&self) -> &candle_core::Device {
        self.model.device()
    }
}
