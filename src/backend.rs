//! Backend selection. CPU (`NdArray`) by default; the `gpu` feature switches
//! to `Wgpu`.

use burn::backend::Autodiff;
use burn::tensor::backend::Backend;

#[cfg(not(feature = "gpu"))]
pub type InferBackend = burn::backend::NdArray<f32>;

#[cfg(feature = "gpu")]
pub type InferBackend = burn::backend::Wgpu<f32, i32>;

pub type TrainBackend = Autodiff<InferBackend>;

pub type Device = <TrainBackend as Backend>::Device;

/// Resolve the configured GPU index to a device.
#[cfg(feature = "gpu")]
pub fn select_device(gpu: Option<usize>) -> Device {
    use burn::backend::wgpu::WgpuDevice;

    match gpu {
        Some(index) => WgpuDevice::DiscreteGpu(index),
        None => WgpuDevice::default(),
    }
}

/// Resolve the configured GPU index to a device.
#[cfg(not(feature = "gpu"))]
pub fn select_device(gpu: Option<usize>) -> Device {
    if let Some(index) = gpu {
        log::warn!("gpu {index} requested but built without the `gpu` feature; using CPU");
    }
    Device::default()
}
