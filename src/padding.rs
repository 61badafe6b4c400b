use std::str::FromStr;

use crate::{
    error::{ConvError, ConvResult},
    shape::Shape,
};

/// Zero-fill policy applied to the image borders before convolution.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PaddingSpec {
    /// No padding.
    Valid,
    /// Pad so that the window positions cover the input at the given stride,
    /// any odd remainder goes to the bottom/right.
    Same,
    /// Symmetric `(pad_h, pad_w)`.
    Explicit(usize, usize),
}

impl From<(usize, usize)> for PaddingSpec {
    fn from((ph, pw): (usize, usize)) -> Self {
        Self::Explicit(ph, pw)
    }
}

impl FromStr for PaddingSpec {
    type Err = ConvError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ConvError::InvalidPaddingSpec(s.to_string());

        match s.trim().to_ascii_lowercase().as_str() {
            "valid" => Ok(Self::Valid),
            "same" => Ok(Self::Same),
            other => {
                let inner = other.strip_prefix('(').and_then(|x| x.strip_suffix(')')).unwrap_or(other);
                let (ph, pw) = inner.split_once(',').ok_or_else(err)?;
                let ph = ph.trim().parse().map_err(|_| err())?;
                let pw = pw.trim().parse().map_err(|_| err())?;
                Ok(Self::Explicit(ph, pw))
            }
        }
    }
}

impl std::fmt::Display for PaddingSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Valid => write!(f, "valid"),
            Self::Same => write!(f, "same"),
            Self::Explicit(ph, pw) => write!(f, "{ph},{pw}"),
        }
    }
}

/// Resolved zero padding on each side of an image plane.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Padding {
    pub top: usize,
    pub bottom: usize,
    pub left: usize,
    pub right: usize,
}

impl Padding {
    pub fn symmetric(ph: usize, pw: usize) -> Self {
        Self { top: ph, bottom: ph, left: pw, right: pw }
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }

    /// Plane shape after padding `input`. Only for padding that has already
    /// been through [`resolve_padding`], see [`Padding::checked_apply`].
    pub fn apply(&self, input: Shape) -> Shape {
        Shape::new(input.rows() + self.top + self.bottom, input.cols() + self.left + self.right)
    }

    /// As [`Padding::apply`], but `None` if the padded plane is not addressable.
    pub fn checked_apply(&self, input: Shape) -> Option<Shape> {
        let rows = input.rows().checked_add(self.top)?.checked_add(self.bottom)?;
        let cols = input.cols().checked_add(self.left)?.checked_add(self.right)?;
        rows.checked_mul(cols)?;
        Some(Shape::new(rows, cols))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PaddingResult {
    pub padding: Padding,
    pub output: Shape,
}

pub(crate) fn check_stride(stride: Shape) -> ConvResult<()> {
    if stride.rows() == 0 || stride.cols() == 0 {
        Err(ConvError::InvalidStride(stride))
    } else {
        Ok(())
    }
}

/// Number of window positions along every axis, assuming `window` fits in
/// `input` and the stride is positive.
pub(crate) fn window_positions(input: Shape, window: Shape, stride: Shape) -> Shape {
    Shape::new(
        (input.rows() - window.rows()) / stride.rows() + 1,
        (input.cols() - window.cols()) / stride.cols() + 1,
    )
}

/// Total `same` padding along one axis, split `(before, after)`.
fn same_split(input: usize, kernel: usize, stride: usize) -> Option<(usize, usize)> {
    let total = (input - 1).checked_mul(stride)?.checked_add(kernel)?.saturating_sub(input);
    let before = total / 2;
    Some((before, total - before))
}

/// Resolves `spec` into concrete padding amounts and the resulting output plane.
pub fn resolve_padding(input: Shape, filter: Shape, stride: Shape, spec: PaddingSpec) -> ConvResult<PaddingResult> {
    check_stride(stride)?;

    if input.is_empty() {
        return Err(ConvError::shape(format!("input plane {input} is empty")));
    }

    if filter.is_empty() {
        return Err(ConvError::shape(format!("kernel window {filter} is empty")));
    }

    let padding = match spec {
        PaddingSpec::Valid => Padding::default(),
        PaddingSpec::Explicit(ph, pw) => Padding::symmetric(ph, pw),
        PaddingSpec::Same => {
            let overflow =
                || ConvError::shape(format!("same padding of {input} for {filter} at stride {stride} overflows"));
            let (top, bottom) = same_split(input.rows(), filter.rows(), stride.rows()).ok_or_else(overflow)?;
            let (left, right) = same_split(input.cols(), filter.cols(), stride.cols()).ok_or_else(overflow)?;
            Padding { top, bottom, left, right }
        }
    };

    let padded = padding
        .checked_apply(input)
        .ok_or_else(|| ConvError::InvalidPaddingSpec(format!("{spec} overflows input {input}")))?;
    if !padded.contains(filter) {
        return Err(ConvError::shape(format!("kernel {filter} is larger than padded input {padded}")));
    }

    Ok(PaddingResult { padding, output: window_positions(padded, filter, stride) })
}
