use std::path::PathBuf;
use std::sync::Arc;

use super::model::TreeSentimentModel;
use super::pipeline::SentimentPipeline;
use crate::error::Result;
use crate::models::{RntnModel, RntnSource};
use crate::pipelines::cache::{global_cache, ModelOptions};
use crate::pipelines::utils::{build_cache_key, DeviceRequest};

/// Builder for creating [`SentimentPipeline`] instances.
///
/// Use [`Self::rntn_from_dir`] or [`Self::rntn_from_hub`] as the entry point.
///
/// # Examples
///
/// ```rust,no_run
/// use treebank_sentiment::sentiment::SentimentPipelineBuilder;
///
/// # fn main() -> treebank_sentiment::error::Result<()> {
/// let pipeline = SentimentPipelineBuilder::rntn_from_dir("models/sentiment-en")
///     .cuda(0)
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct SentimentPipelineBuilder<M: TreeSentimentModel> {
    options: M::Options,
    device_request: DeviceRequest,
}

impl<M: TreeSentimentModel> SentimentPipelineBuilder<M> {
    pub(crate) fn new(options: M::Options) -> Self {
        Self {
            options,
            device_request: DeviceRequest::Cpu,
        }
    }

    /// Use CPU for inference (default).
    pub fn cpu(mut self) -> Self {
        self.device_request = DeviceRequest::Cpu;
        self
    }

    /// Use a specific CUDA GPU for inference.
    pub fn cuda(mut self, index: usize) -> Self {
        self.device_request = DeviceRequest::Cuda(index);
        self
    }

    /// Builds the pipeline with configured settings.
    ///
    /// The loaded model is shared through a process-wide cache: building two
    /// pipelines over the same bundle and device loads the parameters once.
    ///
    /// # Errors
    ///
    /// Returns an error if bundle loading or device initialization fails.
    pub fn build(self) -> Result<SentimentPipeline<M>>
    where
        M: Send + Sync + 'static,
        M::Options: ModelOptions,
    {
        let device = self.device_request.resolve()?;
        let key = build_cache_key(&self.options, &device);

        let model: Arc<M> =
            global_cache().get_or_create(&key, || M::new(self.options.clone(), device.clone()))?;

        Ok(SentimentPipeline { model })
    }
}

impl SentimentPipelineBuilder<RntnModel> {
    /// Creates a builder for a recursive neural tensor network loaded from
    /// `source`.
    pub fn rntn(source: RntnSource) -> Self {
        Self::new(source)
    }

    /// Creates a builder for an RNTN bundle in a local directory.
    pub fn rntn_from_dir(path: impl Into<PathBuf>) -> Self {
        Self::new(RntnSource::dir(path))
    }

    /// Creates a builder for an RNTN bundle hosted on the Hugging Face Hub.
    pub fn rntn_from_hub(repo: impl Into<String>) -> Self {
        Self::new(RntnSource::hub(repo))
    }
}
