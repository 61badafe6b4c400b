use std::str::FromStr;

use crate::{
    context::ExecutionContext,
    error::{ConvError, ConvResult},
    padding::{check_stride, window_positions},
    shape::Shape,
    tensor::ImageBatch,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PoolMode {
    Max,
    Average,
}

impl FromStr for PoolMode {
    type Err = ConvError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "max" => Ok(Self::Max),
            "avg" | "average" => Ok(Self::Average),
            _ => Err(ConvError::InvalidMode(s.to_string())),
        }
    }
}

impl std::fmt::Display for PoolMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Max => write!(f, "max"),
            Self::Average => write!(f, "avg"),
        }
    }
}

/// Resolved geometry of a pooling pass. Pooling never pads.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PoolDescription {
    pub input_shape: Shape,
    pub channels: usize,
    pub window_shape: Shape,
    pub stride_shape: Shape,
    pub output_shape: Shape,
}

impl PoolDescription {
    pub fn new(input_shape: Shape, channels: usize, window_shape: Shape, stride_shape: Shape) -> ConvResult<Self> {
        check_stride(stride_shape)?;

        if window_shape.is_empty() {
            return Err(ConvError::shape(format!("pooling window {window_shape} is empty")));
        }

        if !input_shape.contains(window_shape) {
            return Err(ConvError::shape(format!("pooling window {window_shape} is larger than input {input_shape}")));
        }

        if channels == 0 {
            return Err(ConvError::shape("pooling needs at least one channel"));
        }

        let output_shape = window_positions(input_shape, window_shape, stride_shape);
        Ok(Self { input_shape, channels, window_shape, stride_shape, output_shape })
    }

    pub fn output_size(&self) -> usize {
        self.output_shape.size() * self.channels
    }

    fn forward(&self, image: &[f64], mode: PoolMode, output: &mut [f64]) {
        let c = self.channels;
        let row_len = self.input_shape.cols() * c;
        let (kh, kw) = (self.window_shape.rows(), self.window_shape.cols());
        let (sh, sw) = (self.stride_shape.rows(), self.stride_shape.cols());
        let ow = self.output_shape.cols();

        for (cell, out) in output.chunks_exact_mut(c).enumerate() {
            let (i, j) = (cell / ow, cell % ow);

            out.fill(match mode {
                PoolMode::Max => f64::NEG_INFINITY,
                PoolMode::Average => 0.0,
            });

            for y in 0..kh {
                let row = (i * sh + y) * row_len + j * sw * c;

                for x in 0..kw {
                    let pixel = &image[row + x * c..row + (x + 1) * c];

                    for (o, &v) in out.iter_mut().zip(pixel) {
                        match mode {
                            PoolMode::Max => {
                                if v.is_nan() || v > *o {
                                    *o = v;
                                }
                            }
                            PoolMode::Average => *o += v,
                        }
                    }
                }
            }

            if mode == PoolMode::Average {
                let n = self.window_shape.size() as f64;
                out.iter_mut().for_each(|o| *o /= n);
            }
        }
    }
}

/// Max or average pools every channel of `images` independently, using the
/// default [`ExecutionContext`]. A NaN anywhere in a window makes that
/// window's max NaN.
pub fn pool(images: &ImageBatch, window: Shape, stride: Shape, mode: PoolMode) -> ConvResult<ImageBatch> {
    pool_with(&ExecutionContext::default(), images, window, stride, mode)
}

pub fn pool_with(
    ctx: &ExecutionContext,
    images: &ImageBatch,
    window: Shape,
    stride: Shape,
    mode: PoolMode,
) -> ConvResult<ImageBatch> {
    let desc = PoolDescription::new(images.shape(), images.channels(), window, stride)?;

    log::debug!(
        "{mode} pool {} image(s) of {} x {}, window {}, stride {} -> {}",
        images.batch_size(),
        desc.input_shape,
        desc.channels,
        desc.window_shape,
        desc.stride_shape,
        desc.output_shape,
    );

    let in_size = images.image_size();
    let mut output = vec![0.0; images.batch_size() * desc.output_size()];

    ctx.run_batched(&mut output, desc.output_size(), |idx, out, _| {
        desc.forward(&images.values()[idx * in_size..(idx + 1) * in_size], mode, out);
    });

    let channels = images.has_channel_axis().then_some(desc.channels);
    ImageBatch::new(images.batch_size(), desc.output_shape, channels, output)
}
