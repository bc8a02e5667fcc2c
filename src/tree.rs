//! Binary constituency trees: the structural input to the composition engine.
//!
//! A [`Tree`] represents one parsed sentence as produced by an external
//! constituency parser. Leaves carry words; internal nodes carry exactly two
//! children. Construction validates the shape, so every `Tree` in circulation
//! is well-formed. Trees can also be deserialized from the JSON form a parser
//! adapter would emit:
//!
//! ```json
//! {"children": [{"word": "good"}, {"word": "movie"}]}
//! ```
//!
//! Evaluation does not touch the input tree. It produces a [`ScoredTree`]
//! mirror with a vector and a probability distribution at every node.

use candle_core::Tensor;
use serde::Deserialize;

use crate::distribution::SentimentDistribution;
use crate::error::{PipelineError, Result};

/// A node of a binary constituency parse tree.
///
/// Invariants, enforced at construction:
/// - a leaf has a non-empty word and no children;
/// - an internal node has exactly two children and no word.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawTree")]
pub struct Tree {
    word: Option<String>,
    children: Vec<Tree>,
}

impl Tree {
    /// Create a leaf carrying `word`.
    ///
    /// # Errors
    ///
    /// Fails with [`PipelineError::MalformedTree`] if the word is empty or
    /// whitespace-only.
    pub fn leaf(word: impl Into<String>) -> Result<Self> {
        Self::from_node(Some(word.into()), Vec::new())
    }

    /// Create an internal node from its two children.
    ///
    /// Binary shape is enforced by the signature, so this cannot fail.
    pub fn internal(left: Tree, right: Tree) -> Self {
        Self {
            word: None,
            children: vec![left, right],
        }
    }

    /// General validating constructor: a word and no children make a leaf, no
    /// word and exactly two children make an internal node.
    ///
    /// # Errors
    ///
    /// Fails with [`PipelineError::MalformedTree`] on any other combination,
    /// including an internal node declared with one child.
    pub fn from_node(word: Option<String>, children: Vec<Tree>) -> Result<Self> {
        match (word, children.len()) {
            (Some(word), 0) => {
                if word.trim().is_empty() {
                    return Err(PipelineError::MalformedTree(
                        "leaf node with an empty word".to_string(),
                    ));
                }
                Ok(Self {
                    word: Some(word),
                    children,
                })
            }
            (None, 2) => Ok(Self {
                word: None,
                children,
            }),
            (Some(_), n) => Err(PipelineError::MalformedTree(format!(
                "node carries both a word and {n} children; words belong on leaves only"
            ))),
            (None, n) => Err(PipelineError::MalformedTree(format!(
                "internal node must have exactly 2 children, got {n}"
            ))),
        }
    }

    /// Whether this node is a leaf.
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// The word on a leaf, `None` on internal nodes.
    pub fn word(&self) -> Option<&str> {
        self.word.as_deref()
    }

    /// The children of this node: empty for leaves, two for internal nodes.
    pub fn children(&self) -> &[Tree] {
        &self.children
    }
}

// Deep trees from real text would otherwise recurse through Vec's destructor.
impl Drop for Tree {
    fn drop(&mut self) {
        let mut stack = std::mem::take(&mut self.children);
        while let Some(mut node) = stack.pop() {
            stack.append(&mut node.children);
        }
    }
}

/// Unvalidated wire form; `Tree::from_node` applies the shape checks.
#[derive(Deserialize)]
struct RawTree {
    #[serde(default)]
    word: Option<String>,
    #[serde(default)]
    children: Vec<RawTree>,
}

impl TryFrom<RawTree> for Tree {
    type Error = PipelineError;

    fn try_from(raw: RawTree) -> Result<Tree> {
        let children = raw
            .children
            .into_iter()
            .map(Tree::try_from)
            .collect::<Result<Vec<_>>>()?;
        Tree::from_node(raw.word, children)
    }
}

/// A fully evaluated tree node: the input structure mirrored with the computed
/// vector and class distribution attached.
///
/// Produced by evaluation only; the input [`Tree`] is never mutated. The
/// sentence-level distribution is the root node's [`distribution`](Self::distribution).
#[derive(Debug, Clone)]
pub struct ScoredTree {
    word: Option<String>,
    vector: Tensor,
    distribution: SentimentDistribution,
    children: Vec<ScoredTree>,
}

impl ScoredTree {
    pub(crate) fn new_leaf(
        word: &str,
        vector: Tensor,
        distribution: SentimentDistribution,
    ) -> Self {
        Self {
            word: Some(word.to_string()),
            vector,
            distribution,
            children: Vec::new(),
        }
    }

    pub(crate) fn new_internal(
        left: ScoredTree,
        right: ScoredTree,
        vector: Tensor,
        distribution: SentimentDistribution,
    ) -> Self {
        Self {
            word: None,
            vector,
            distribution,
            children: vec![left, right],
        }
    }

    /// Whether this node is a leaf.
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// The word on a leaf, `None` on internal nodes.
    pub fn word(&self) -> Option<&str> {
        self.word.as_deref()
    }

    /// The composed sentiment vector of this node, shape `(D,)`.
    pub fn vector(&self) -> &Tensor {
        &self.vector
    }

    /// The class distribution of this node.
    pub fn distribution(&self) -> &SentimentDistribution {
        &self.distribution
    }

    /// The children of this node: empty for leaves, two for internal nodes.
    pub fn children(&self) -> &[ScoredTree] {
        &self.children
    }
}

impl Drop for ScoredTree {
    fn drop(&mut self) {
        let mut stack = std::mem::take(&mut self.children);
        while let Some(mut node) = stack.pop() {
            stack.append(&mut node.children);
        }
    }
}
