use crate::{
    error::{ConvError, ConvResult},
    rng,
    shape::Shape,
};

/// The three kernel layouts accepted by the convolution engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KernelShape {
    /// `(kh, kw)`, applied to single channel images.
    Single { filter: Shape },
    /// `(kh, kw, c)`, reduces over all channels into one output plane.
    Channels { filter: Shape, channels: usize },
    /// `(kh, kw, c, k)`, `k` independent channel kernels.
    Bank { filter: Shape, channels: usize, count: usize },
}

impl KernelShape {
    pub fn filter(&self) -> Shape {
        match *self {
            Self::Single { filter } | Self::Channels { filter, .. } | Self::Bank { filter, .. } => filter,
        }
    }

    pub fn channels(&self) -> usize {
        match *self {
            Self::Single { .. } => 1,
            Self::Channels { channels, .. } | Self::Bank { channels, .. } => channels,
        }
    }

    /// Number of output feature maps.
    pub fn count(&self) -> usize {
        match *self {
            Self::Bank { count, .. } => count,
            _ => 1,
        }
    }

    pub fn size(&self) -> usize {
        self.filter().size() * self.channels() * self.count()
    }

    pub fn dims(&self) -> Vec<usize> {
        let filter = self.filter();
        match *self {
            Self::Single { .. } => vec![filter.rows(), filter.cols()],
            Self::Channels { channels, .. } => vec![filter.rows(), filter.cols(), channels],
            Self::Bank { channels, count, .. } => vec![filter.rows(), filter.cols(), channels, count],
        }
    }
}

/// Row-major kernel weights, with the kernel index varying fastest.
#[derive(Clone, Debug, PartialEq)]
pub struct Kernel {
    shape: KernelShape,
    values: Vec<f64>,
}

impl Kernel {
    pub fn new(shape: KernelShape, values: Vec<f64>) -> ConvResult<Self> {
        if shape.filter().is_empty() {
            return Err(ConvError::shape(format!("kernel must have a non-empty window, got {}", shape.filter())));
        }

        if shape.channels() == 0 || shape.count() == 0 {
            return Err(ConvError::shape(format!("kernel dims {:?} contain a zero", shape.dims())));
        }

        if values.len() != shape.size() {
            return Err(ConvError::shape(format!(
                "kernel of dims {:?} needs {} values, got {}",
                shape.dims(),
                shape.size(),
                values.len()
            )));
        }

        Ok(Self { shape, values })
    }

    pub fn single(filter: Shape, values: Vec<f64>) -> ConvResult<Self> {
        Self::new(KernelShape::Single { filter }, values)
    }

    pub fn channels(filter: Shape, channels: usize, values: Vec<f64>) -> ConvResult<Self> {
        Self::new(KernelShape::Channels { filter, channels }, values)
    }

    pub fn bank(filter: Shape, channels: usize, count: usize, values: Vec<f64>) -> ConvResult<Self> {
        Self::new(KernelShape::Bank { filter, channels, count }, values)
    }

    pub fn seed_random(shape: KernelShape, mean: f64, stdev: f64, use_gaussian: bool) -> ConvResult<Self> {
        Self::new(shape, rng::vec_f64(shape.size(), mean, stdev, use_gaussian))
    }

    /// Pulls kernel `n` out of a bank as a standalone channel kernel.
    pub fn select(&self, n: usize) -> ConvResult<Self> {
        let count = self.shape.count();
        if n >= count {
            return Err(ConvError::shape(format!("kernel index {n} out of range for {count} kernel(s)")));
        }

        let shape = KernelShape::Channels { filter: self.shape.filter(), channels: self.shape.channels() };
        let values = self.values.iter().skip(n).step_by(count).copied().collect();

        Self::new(shape, values)
    }

    pub fn shape(&self) -> KernelShape {
        self.shape
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }
}
