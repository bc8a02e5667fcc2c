use super::cache::ModelOptions;
use crate::error::{PipelineError, Result};
use candle_core::Device;

/// Which device a pipeline should run its model on.
#[derive(Debug, Clone, Default)]
pub enum DeviceRequest {
    /// CPU inference (default).
    #[default]
    Cpu,
    /// CUDA GPU inference on the given device index.
    Cuda(usize),
}

impl DeviceRequest {
    /// Resolve the request into a concrete device.
    pub fn resolve(self) -> Result<Device> {
        match self {
            DeviceRequest::Cpu => Ok(Device::Cpu),
            DeviceRequest::Cuda(i) => Device::new_cuda(i).map_err(|e| {
                PipelineError::Device(format!(
                    "Failed to init CUDA device {i}: {e}. Try CPU as fallback."
                ))
            }),
        }
    }
}

pub fn build_cache_key<O: ModelOptions>(options: &O, device: &Device) -> String {
    format!("{}-{:?}", options.cache_key(), device.location())
}
