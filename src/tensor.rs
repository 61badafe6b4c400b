use crate::{
    error::{ConvError, ConvResult},
    rng,
    shape::Shape,
};

/// A row-major stack of images, either `(batch, h, w)` or `(batch, h, w, c)`
/// with the channel index varying fastest.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageBatch {
    batch_size: usize,
    shape: Shape,
    channels: Option<usize>,
    values: Vec<f64>,
}

impl ImageBatch {
    /// A `(batch, h, w)` batch.
    pub fn grayscale(batch_size: usize, shape: Shape, values: Vec<f64>) -> ConvResult<Self> {
        Self::new(batch_size, shape, None, values)
    }

    /// A `(batch, h, w, c)` batch.
    pub fn with_channels(batch_size: usize, shape: Shape, channels: usize, values: Vec<f64>) -> ConvResult<Self> {
        Self::new(batch_size, shape, Some(channels), values)
    }

    pub fn new(batch_size: usize, shape: Shape, channels: Option<usize>, values: Vec<f64>) -> ConvResult<Self> {
        if shape.is_empty() {
            return Err(ConvError::shape(format!("images must have a non-empty plane, got {shape}")));
        }

        if channels == Some(0) {
            return Err(ConvError::shape("images must have at least one channel"));
        }

        let expected = batch_size * shape.size() * channels.unwrap_or(1);
        if values.len() != expected {
            return Err(ConvError::shape(format!(
                "expected {expected} values for {batch_size} images of {shape} x {}, got {}",
                channels.unwrap_or(1),
                values.len()
            )));
        }

        Ok(Self { batch_size, shape, channels, values })
    }

    pub fn zeroed(batch_size: usize, shape: Shape, channels: Option<usize>) -> ConvResult<Self> {
        let size = batch_size * shape.size() * channels.unwrap_or(1);
        Self::new(batch_size, shape, channels, vec![0.0; size])
    }

    /// Builds a batch by evaluating `f(image, row, col, channel)` for every entry.
    pub fn from_fn<F>(batch_size: usize, shape: Shape, channels: Option<usize>, mut f: F) -> ConvResult<Self>
    where
        F: FnMut(usize, usize, usize, usize) -> f64,
    {
        let c = channels.unwrap_or(1);
        let mut values = Vec::with_capacity(batch_size * shape.size() * c);

        for b in 0..batch_size {
            for i in 0..shape.rows() {
                for j in 0..shape.cols() {
                    for ch in 0..c {
                        values.push(f(b, i, j, ch));
                    }
                }
            }
        }

        Self::new(batch_size, shape, channels, values)
    }

    pub fn seed_random(
        batch_size: usize,
        shape: Shape,
        channels: Option<usize>,
        mean: f64,
        stdev: f64,
        use_gaussian: bool,
    ) -> ConvResult<Self> {
        let size = batch_size * shape.size() * channels.unwrap_or(1);
        Self::new(batch_size, shape, channels, rng::vec_f64(size, mean, stdev, use_gaussian))
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    /// Number of channels, `1` for a grayscale batch.
    pub fn channels(&self) -> usize {
        self.channels.unwrap_or(1)
    }

    pub fn has_channel_axis(&self) -> bool {
        self.channels.is_some()
    }

    pub fn dims(&self) -> Vec<usize> {
        let mut dims = vec![self.batch_size, self.shape.rows(), self.shape.cols()];
        dims.extend(self.channels);
        dims
    }

    /// Number of values in a single image.
    pub fn image_size(&self) -> usize {
        self.shape.size() * self.channels()
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn into_values(self) -> Vec<f64> {
        self.values
    }

    pub fn image(&self, idx: usize) -> Option<&[f64]> {
        let size = self.image_size();
        self.values.get(idx * size..(idx + 1) * size)
    }

    pub fn get(&self, b: usize, i: usize, j: usize, c: usize) -> Option<f64> {
        if b >= self.batch_size || i >= self.shape.rows() || j >= self.shape.cols() || c >= self.channels() {
            return None;
        }

        let idx = ((b * self.shape.rows() + i) * self.shape.cols() + j) * self.channels() + c;
        Some(self.values[idx])
    }
}
