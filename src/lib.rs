/// Contains `ExecutionContext`, which splits a batch across worker threads.
pub mod context;
/// Contains `ConvolutionDescription` and the convolution entry points.
pub mod conv;
pub mod error;
/// Contains the `Kernel` struct and its `KernelShape` layouts.
pub mod kernel;
/// Contains `PaddingSpec` and `resolve_padding`.
pub mod padding;
/// Contains `PoolDescription`, `PoolMode` and `pool`.
pub mod pool;
pub mod rng;
pub mod shape;
/// Contains the `ImageBatch` struct.
pub mod tensor;

pub use context::ExecutionContext;
pub use conv::{
    convolve, convolve_channels, convolve_grayscale, convolve_grayscale_padding, convolve_grayscale_same,
    convolve_grayscale_valid, convolve_with, ConvolutionDescription,
};
pub use error::{ConvError, ConvResult};
pub use kernel::{Kernel, KernelShape};
pub use padding::{resolve_padding, Padding, PaddingResult, PaddingSpec};
pub use pool::{pool, pool_with, PoolDescription, PoolMode};
pub use shape::Shape;
pub use tensor::ImageBatch;
