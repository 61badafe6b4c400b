use crate::{
    context::ExecutionContext,
    error::{ConvError, ConvResult},
    kernel::{Kernel, KernelShape},
    padding::{resolve_padding, Padding, PaddingSpec},
    shape::Shape,
    tensor::ImageBatch,
};

/// Fully resolved geometry of a single convolution.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConvolutionDescription {
    pub input_shape: Shape,
    pub input_channels: usize,
    pub output_shape: Shape,
    pub output_channels: usize,
    pub filter_shape: Shape,
    pub padding: Padding,
    pub stride_shape: Shape,
}

impl ConvolutionDescription {
    pub fn new(
        input_shape: Shape,
        input_channels: usize,
        output_channels: usize,
        filter_shape: Shape,
        padding: PaddingSpec,
        stride_shape: Shape,
    ) -> ConvResult<Self> {
        if input_channels == 0 || output_channels == 0 {
            return Err(ConvError::shape("convolution needs at least one input and one output channel"));
        }

        let resolved = resolve_padding(input_shape, filter_shape, stride_shape, padding)?;

        Ok(Self {
            input_shape,
            input_channels,
            output_shape: resolved.output,
            output_channels,
            filter_shape,
            padding: resolved.padding,
            stride_shape,
        })
    }

    pub fn padded_shape(&self) -> Shape {
        self.padding.apply(self.input_shape)
    }

    pub fn input_size(&self) -> usize {
        self.input_shape.size() * self.input_channels
    }

    pub fn output_size(&self) -> usize {
        self.output_shape.size() * self.output_channels
    }

    /// Copies one `(h, w, c)` image into `buf` surrounded by zeros.
    fn pad_into(&self, image: &[f64], buf: &mut Vec<f64>) {
        let c = self.input_channels;
        let padded = self.padded_shape();
        let src_row = self.input_shape.cols() * c;
        let dst_row = padded.cols() * c;

        buf.clear();
        buf.resize(padded.size() * c, 0.0);

        for (i, row) in image.chunks_exact(src_row).enumerate() {
            let start = (i + self.padding.top) * dst_row + self.padding.left * c;
            buf[start..start + src_row].copy_from_slice(row);
        }
    }

    /// Cross-correlates one padded `(ph, pw, c)` image with a `(kh, kw, c, k)`
    /// kernel bank, writing `(oh, ow, k)` into `output`.
    fn forward(&self, padded: &[f64], weights: &[f64], output: &mut [f64]) {
        let c = self.input_channels;
        let k = self.output_channels;
        let row_len = self.padded_shape().cols() * c;
        let (kh, kw) = (self.filter_shape.rows(), self.filter_shape.cols());
        let (sh, sw) = (self.stride_shape.rows(), self.stride_shape.cols());
        let ow = self.output_shape.cols();

        for (cell, out) in output.chunks_exact_mut(k).enumerate() {
            let (i, j) = (cell / ow, cell % ow);
            out.fill(0.0);

            for y in 0..kh {
                let row = (i * sh + y) * row_len + j * sw * c;

                for x in 0..kw {
                    let pixel = &padded[row + x * c..row + (x + 1) * c];
                    let taps = &weights[(y * kw + x) * c * k..(y * kw + x + 1) * c * k];

                    for (&v, tap) in pixel.iter().zip(taps.chunks_exact(k)) {
                        for (o, &w) in out.iter_mut().zip(tap) {
                            *o += v * w;
                        }
                    }
                }
            }
        }
    }
}

/// Convolves `images` with `kernel` using the default [`ExecutionContext`].
///
/// | images         | kernel           | output              |
/// |----------------|------------------|---------------------|
/// | `(b, h, w)`    | `(kh, kw)`       | `(b, oh, ow)`       |
/// | `(b, h, w, c)` | `(kh, kw, c)`    | `(b, oh, ow)`       |
/// | `(b, h, w, c)` | `(kh, kw, c, k)` | `(b, oh, ow, k)`    |
///
/// A grayscale batch counts as a single channel.
pub fn convolve(images: &ImageBatch, kernel: &Kernel, padding: PaddingSpec, stride: Shape) -> ConvResult<ImageBatch> {
    convolve_with(&ExecutionContext::default(), images, kernel, padding, stride)
}

pub fn convolve_with(
    ctx: &ExecutionContext,
    images: &ImageBatch,
    kernel: &Kernel,
    padding: PaddingSpec,
    stride: Shape,
) -> ConvResult<ImageBatch> {
    let shape = kernel.shape();

    if shape.channels() != images.channels() {
        return Err(ConvError::ChannelMismatch { image: images.channels(), kernel: shape.channels() });
    }

    let desc =
        ConvolutionDescription::new(images.shape(), images.channels(), shape.count(), shape.filter(), padding, stride)?;

    log::debug!(
        "convolve {} image(s) of {} x {} with {:?} kernel, padding {:?}, stride {} -> {} x {}",
        images.batch_size(),
        desc.input_shape,
        desc.input_channels,
        shape.dims(),
        desc.padding,
        desc.stride_shape,
        desc.output_shape,
        desc.output_channels,
    );

    let in_size = desc.input_size();
    let mut output = vec![0.0; images.batch_size() * desc.output_size()];

    ctx.run_batched(&mut output, desc.output_size(), |idx, out, scratch| {
        let image = &images.values()[idx * in_size..(idx + 1) * in_size];

        if desc.padding.is_zero() {
            desc.forward(image, kernel.values(), out);
        } else {
            desc.pad_into(image, scratch);
            desc.forward(scratch, kernel.values(), out);
        }
    });

    let channels = matches!(shape, KernelShape::Bank { .. }).then_some(desc.output_channels);
    ImageBatch::new(images.batch_size(), desc.output_shape, channels, output)
}

/// `(b, h, w)` images with a `(kh, kw)` kernel.
pub fn convolve_grayscale(
    images: &ImageBatch,
    kernel: &Kernel,
    padding: PaddingSpec,
    stride: Shape,
) -> ConvResult<ImageBatch> {
    if images.has_channel_axis() {
        return Err(ConvError::shape(format!("expected (b, h, w) images, got {:?}", images.dims())));
    }

    if !matches!(kernel.shape(), KernelShape::Single { .. }) {
        return Err(ConvError::shape(format!("expected a (kh, kw) kernel, got {:?}", kernel.shape().dims())));
    }

    convolve(images, kernel, padding, stride)
}

pub fn convolve_grayscale_valid(images: &ImageBatch, kernel: &Kernel) -> ConvResult<ImageBatch> {
    convolve_grayscale(images, kernel, PaddingSpec::Valid, Shape::default())
}

pub fn convolve_grayscale_same(images: &ImageBatch, kernel: &Kernel) -> ConvResult<ImageBatch> {
    convolve_grayscale(images, kernel, PaddingSpec::Same, Shape::default())
}

pub fn convolve_grayscale_padding(
    images: &ImageBatch,
    kernel: &Kernel,
    (ph, pw): (usize, usize),
) -> ConvResult<ImageBatch> {
    convolve_grayscale(images, kernel, PaddingSpec::Explicit(ph, pw), Shape::default())
}

/// `(b, h, w, c)` images with a single `(kh, kw, c)` kernel.
pub fn convolve_channels(
    images: &ImageBatch,
    kernel: &Kernel,
    padding: PaddingSpec,
    stride: Shape,
) -> ConvResult<ImageBatch> {
    if !matches!(kernel.shape(), KernelShape::Channels { .. }) {
        return Err(ConvError::shape(format!("expected a (kh, kw, c) kernel, got {:?}", kernel.shape().dims())));
    }

    convolve(images, kernel, padding, stride)
}
