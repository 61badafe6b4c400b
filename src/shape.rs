/// A `rows x cols` pair, used for image planes, filters, strides and outputs.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub struct Shape {
    rows: usize,
    cols: usize,
}

impl std::fmt::Display for Shape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} x {}", self.rows, self.cols)
    }
}

impl Default for Shape {
    /// Unit shape, which is also the default stride.
    fn default() -> Self {
        Self::new(1, 1)
    }
}

impl From<(usize, usize)> for Shape {
    fn from((rows, cols): (usize, usize)) -> Self {
        Self::new(rows, cols)
    }
}

impl Shape {
    /// Shapes are not checked on construction, so that a zero dimension can
    /// be reported as a proper error by whichever operation consumes it.
    pub const fn new(rows: usize, cols: usize) -> Self {
        Self { rows, cols }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn size(&self) -> usize {
        self.cols * self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Whether `other` fits inside `self` along both axes.
    pub fn contains(&self, other: Shape) -> bool {
        other.rows <= self.rows && other.cols <= self.cols
    }
}
