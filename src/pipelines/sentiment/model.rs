use candle_core::Device;

use crate::distribution::SentimentDistribution;
use crate::error::Result;
use crate::tree::{ScoredTree, Tree};

/// A model that scores sentiment over binary constituency trees.
pub trait TreeSentimentModel {
    /// Options identifying which parameters to load.
    type Options: std::fmt::Debug + Clone;

    /// Load the model described by `options` onto `device`.
    fn new(options: Self::Options, device: Device) -> Result<Self>
    where
        Self: Sized;

    /// Evaluate one sentence tree, scoring every node.
    fn evaluate(&self, tree: &Tree) -> Result<ScoredTree>;

    /// The sentence-level distribution: the root distribution of the
    /// evaluated tree.
    fn score_sentence(&self, tree: &Tree) -> Result<SentimentDistribution> {
        Ok(self.evaluate(tree)?.distribution().clone())
    }

    /// Score a sequence of sentence trees in order.
    fn score_sentences(&self, trees: &[Tree]) -> Result<Vec<SentimentDistribution>> {
        trees.iter().map(|tree| self.score_sentence(tree)).collect()
    }

    /// The device the model parameters live on.
    fn device(&self) -> &Device;
}
