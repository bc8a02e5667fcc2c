use std::collections::HashMap;
use std::path::PathBuf;

use candle_core::{DType, Device, IndexOp, Tensor, D};
use candle_nn::{ops::softmax, VarBuilder};
use serde::Deserialize;

use crate::distribution::{SentimentDistribution, NUM_CLASSES};
use crate::error::{PipelineError, Result};
use crate::loaders::BundleFiles;
use crate::tree::{ScoredTree, Tree};

/// Where a pretrained parameter bundle comes from.
///
/// A bundle is a directory (or Hub repository) holding `config.json`,
/// `vocab.json` and `model.safetensors`.
#[derive(Debug, Clone)]
pub enum RntnSource {
    /// A local directory containing the bundle files.
    Dir(PathBuf),
    /// A Hugging Face Hub repository id, e.g. `"acme/rntn-sentiment-en"`.
    HuggingFace(String),
}

impl RntnSource {
    /// Bundle in a local directory.
    pub fn dir(path: impl Into<PathBuf>) -> Self {
        RntnSource::Dir(path.into())
    }

    /// Bundle hosted on the Hugging Face Hub.
    pub fn hub(repo: impl Into<String>) -> Self {
        RntnSource::HuggingFace(repo.into())
    }
}

impl std::fmt::Display for RntnSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RntnSource::Dir(path) => write!(f, "dir:{}", path.display()),
            RntnSource::HuggingFace(repo) => write!(f, "hub:{repo}"),
        }
    }
}

impl crate::pipelines::cache::ModelOptions for RntnSource {
    fn cache_key(&self) -> String {
        self.to_string()
    }
}

/// Hyperparameters stored in the bundle's `config.json`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RntnConfig {
    /// Word/phrase vector dimensionality `D`.
    pub dim: usize,
    /// Vocabulary entry used for out-of-vocabulary words.
    #[serde(default = "default_unk_token")]
    pub unk_token: String,
}

fn default_unk_token() -> String {
    "*UNK*".to_string()
}

/// A recursive neural tensor network for five-class sentiment.
///
/// Holds the pretrained parameters: the word-vector table, the bilinear
/// composition tensor with its affine term, and the classification layer.
/// Immutable after load; share it across threads behind an `Arc`.
#[derive(Clone)]
pub struct RntnModel {
    vocab: HashMap<String, usize>,
    embeddings: Tensor,
    unk_index: usize,
    composition_t: Tensor,
    composition_w: Tensor,
    composition_b: Tensor,
    classifier_w: Tensor,
    classifier_b: Tensor,
    dim: usize,
    device: Device,
    span_eval: tracing::Span,
    span_compose: tracing::Span,
    span_classify: tracing::Span,
}

impl RntnModel {
    /// Load a model from a parameter bundle.
    pub fn new(source: RntnSource, device: Device) -> Result<Self> {
        let files = match &source {
            RntnSource::Dir(path) => BundleFiles::from_dir(path)?,
            RntnSource::HuggingFace(repo) => BundleFiles::from_hub(repo)?,
        };
        Self::from_bundle(&files, device)
    }

    fn from_bundle(files: &BundleFiles, device: Device) -> Result<Self> {
        let load_err = |what: &str, e: &dyn std::fmt::Display| {
            PipelineError::ModelLoad(format!("{what}: {e}"))
        };

        let config_str = std::fs::read_to_string(&files.config)
            .map_err(|e| load_err("reading config.json", &e))?;
        let config: RntnConfig =
            serde_json::from_str(&config_str).map_err(|e| load_err("parsing config.json", &e))?;
        if config.dim == 0 {
            return Err(PipelineError::ModelLoad(
                "config.json declares a zero vector dimensionality".to_string(),
            ));
        }

        let vocab_str = std::fs::read_to_string(&files.vocab)
            .map_err(|e| load_err("reading vocab.json", &e))?;
        let vocab: HashMap<String, usize> =
            serde_json::from_str(&vocab_str).map_err(|e| load_err("parsing vocab.json", &e))?;
        if vocab.is_empty() {
            return Err(PipelineError::ModelLoad(
                "vocab.json contains no entries".to_string(),
            ));
        }
        let rows = vocab.len();
        if let Some((word, &index)) = vocab.iter().find(|(_, &index)| index >= rows) {
            return Err(PipelineError::ModelLoad(format!(
                "vocab entry '{word}' points at row {index}, but the table has {rows} rows"
            )));
        }
        let unk_index = *vocab.get(&config.unk_token).ok_or_else(|| {
            PipelineError::ModelLoad(format!(
                "unknown-word entry '{}' missing from vocab.json",
                config.unk_token
            ))
        })?;

        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(
                std::slice::from_ref(&files.weights),
                DType::F32,
                &device,
            )
        }
        .map_err(|e| load_err("opening model.safetensors", &e))?;

        let d = config.dim;
        let get = |shape: candle_core::Shape, name: &str| {
            vb.get(shape, name)
                .map_err(|e| load_err(&format!("loading tensor '{name}'"), &e))
        };
        let embeddings = get((rows, d).into(), "embeddings.weight")?;
        let composition_t = get((d, 2 * d, 2 * d).into(), "composition.tensor")?;
        let composition_w = get((d, 2 * d).into(), "composition.weight")?;
        let composition_b = get(d.into(), "composition.bias")?;
        let classifier_w = get((NUM_CLASSES, d).into(), "classifier.weight")?;
        let classifier_b = get(NUM_CLASSES.into(), "classifier.bias")?;

        Ok(Self {
            vocab,
            embeddings,
            unk_index,
            composition_t,
            composition_w,
            composition_b,
            classifier_w,
            classifier_b,
            dim: d,
            device,
            span_eval: tracing::span!(tracing::Level::TRACE, "rntn-eval"),
            span_compose: tracing::span!(tracing::Level::TRACE, "rntn-compose"),
            span_classify: tracing::span!(tracing::Level::TRACE, "rntn-classify"),
        })
    }

    /// Word/phrase vector dimensionality `D`.
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// The device the parameters live on.
    pub fn device(&self) -> &Device {
        &self.device
    }

    fn check_dim(&self, v: &Tensor, what: &str) -> Result<()> {
        if v.dims() != [self.dim] {
            return Err(PipelineError::DimensionMismatch(format!(
                "{what}: expected shape ({},), got {:?}",
                self.dim,
                v.dims()
            )));
        }
        Ok(())
    }

    /// The initial vector for a word: case-normalized table lookup with the
    /// unknown-word row as fallback.
    pub fn word_vector(&self, word: &str) -> Result<Tensor> {
        let index = self
            .vocab
            .get(&word.to_lowercase())
            .copied()
            .unwrap_or(self.unk_index);
        Ok(self.embeddings.i(index)?)
    }

    /// Compose two child vectors into their parent vector:
    /// `tanh(xT·T·x + W·x + b)` with `x = [left; right]`.
    ///
    /// Pure and deterministic. Output entries are bounded in `(-1, 1)`.
    ///
    /// # Errors
    ///
    /// Fails with [`PipelineError::DimensionMismatch`] if either child vector
    /// does not have shape `(D,)`.
    pub fn compose(&self, left: &Tensor, right: &Tensor) -> Result<Tensor> {
        let _enter = self.span_compose.enter();
        self.check_dim(left, "left child vector")?;
        self.check_dim(right, "right child vector")?;

        let x = Tensor::cat(&[left, right], 0)?;
        let x_col = x.unsqueeze(1)?;
        let x_row = x.unsqueeze(0)?;

        // Bilinear term, one slice of T per output dimension.
        let t_x = self.composition_t.broadcast_matmul(&x_col.unsqueeze(0)?)?;
        let quad = x_row.unsqueeze(0)?.broadcast_matmul(&t_x)?;
        let quad = quad.squeeze(2)?.squeeze(1)?;

        let affine = self.composition_w.matmul(&x_col)?.squeeze(1)?;

        quad.add(&affine)?.add(&self.composition_b)?.tanh().map_err(Into::into)
    }

    /// Map a node vector to a distribution over the five classes:
    /// softmax of `Wc·v + bc` (max-subtracting softmax for stability).
    ///
    /// # Errors
    ///
    /// Fails with [`PipelineError::DimensionMismatch`] if `v` does not have
    /// shape `(D,)`.
    pub fn classify(&self, v: &Tensor) -> Result<SentimentDistribution> {
        let _enter = self.span_classify.enter();
        self.check_dim(v, "node vector")?;

        let logits = self
            .classifier_w
            .matmul(&v.unsqueeze(1)?)?
            .squeeze(1)?
            .add(&self.classifier_b)?;
        let probs = softmax(&logits, D::Minus1)?.to_vec1::<f32>()?;
        let probs: [f32; NUM_CLASSES] = probs.try_into().map_err(|v: Vec<f32>| {
            PipelineError::Unexpected(format!("classifier produced {} scores", v.len()))
        })?;
        SentimentDistribution::from_probabilities(probs)
    }

    /// Evaluate a sentence tree bottom-up, producing a vector and a class
    /// distribution at every node.
    ///
    /// The traversal uses an explicit post-order stack, so arbitrarily deep
    /// trees cannot exhaust the call stack. The input tree is left untouched;
    /// on any error the partial evaluation is discarded.
    pub fn evaluate(&self, tree: &Tree) -> Result<ScoredTree> {
        let _enter = self.span_eval.enter();

        enum Frame<'a> {
            Enter(&'a Tree),
            Combine,
        }

        let mut work = vec![Frame::Enter(tree)];
        let mut done: Vec<ScoredTree> = Vec::new();

        while let Some(frame) = work.pop() {
            match frame {
                Frame::Enter(node) if node.is_leaf() => {
                    let word = node.word().ok_or_else(|| {
                        PipelineError::MalformedTree("leaf node without a word".to_string())
                    })?;
                    let vector = self.word_vector(word)?;
                    let distribution = self.classify(&vector)?;
                    done.push(ScoredTree::new_leaf(word, vector, distribution));
                }
                Frame::Enter(node) => {
                    let children = node.children();
                    work.push(Frame::Combine);
                    work.push(Frame::Enter(&children[1]));
                    work.push(Frame::Enter(&children[0]));
                }
                Frame::Combine => {
                    let right = done.pop();
                    let left = done.pop();
                    let (left, right) = match (left, right) {
                        (Some(l), Some(r)) => (l, r),
                        _ => {
                            return Err(PipelineError::Unexpected(
                                "evaluation stack underflow".to_string(),
                            ))
                        }
                    };
                    let vector = self.compose(left.vector(), right.vector())?;
                    let distribution = self.classify(&vector)?;
                    done.push(ScoredTree::new_internal(left, right, vector, distribution));
                }
            }
        }

        match (done.pop(), done.is_empty()) {
            (Some(root), true) => Ok(root),
            _ => Err(PipelineError::Unexpected(
                "evaluation finished with a non-singular result stack".to_string(),
            )),
        }
    }
}

impl crate::pipelines::sentiment::model::TreeSentimentModel for RntnModel {
    type Options = RntnSource;

    fn new(options: Self::Options, device: Device) -> Result<Self> {
        RntnModel::new(options, device)
    }

    fn evaluate(&self, tree: &Tree) -> Result<ScoredTree> {
        self.evaluate(tree)
    }

    fn device(&self) -> &Device {
        &self.device
    }
}
