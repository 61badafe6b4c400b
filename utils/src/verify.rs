use anyhow::bail;
use convpool::{
    convolve_with, pool_with, ConvResult, ExecutionContext, ImageBatch, Kernel, KernelShape, PaddingSpec, PoolMode,
    Shape,
};
use structopt::StructOpt;

use crate::logger::display_passed;

/// Checks that multi-threaded runs agree with single-threaded ones.
#[derive(StructOpt)]
pub struct VerifyOptions {
    #[structopt(short, long, default_value = "4")]
    threads: usize,
}

impl VerifyOptions {
    pub fn run(&self) -> anyhow::Result<()> {
        let ctx = ExecutionContext::new(self.threads);
        let mut failures = 0;

        for (batch, (h, w), kernel, padding, (sh, sw)) in [
            (17, (13, 11), KernelShape::Single { filter: Shape::new(3, 3) }, PaddingSpec::Valid, (1, 1)),
            (9, (12, 12), KernelShape::Single { filter: Shape::new(4, 2) }, PaddingSpec::Same, (2, 3)),
            (
                11,
                (10, 7),
                KernelShape::Channels { filter: Shape::new(3, 2), channels: 3 },
                PaddingSpec::Explicit(2, 1),
                (1, 2),
            ),
            (
                6,
                (9, 9),
                KernelShape::Bank { filter: Shape::new(3, 3), channels: 4, count: 5 },
                PaddingSpec::Same,
                (2, 2),
            ),
        ] {
            let dims = kernel.dims();
            print!("conv batch={batch} input={h}x{w} kernel={dims:?} padding={padding} stride={sh}x{sw}... ");
            let pass = conv_equal(&ctx, batch, Shape::new(h, w), kernel, padding, Shape::new(sh, sw))?;
            failures += usize::from(!pass);
            display_passed(pass);
        }

        for (batch, (h, w), channels, (kh, kw), (sh, sw), mode) in [
            (13, (8, 8), 3, (2, 2), (2, 2), PoolMode::Max),
            (13, (9, 7), 2, (3, 3), (1, 2), PoolMode::Average),
            (5, (5, 5), 1, (5, 5), (1, 1), PoolMode::Max),
        ] {
            print!("pool batch={batch} input={h}x{w}x{channels} window={kh}x{kw} stride={sh}x{sw} mode={mode}... ");
            let (shape, window, stride) = (Shape::new(h, w), Shape::new(kh, kw), Shape::new(sh, sw));
            let pass = pool_equal(&ctx, batch, shape, channels, window, stride, mode)?;
            failures += usize::from(!pass);
            display_passed(pass);
        }

        if failures > 0 {
            bail!("{failures} case(s) failed!");
        }

        Ok(())
    }
}

fn conv_equal(
    ctx: &ExecutionContext,
    batch: usize,
    shape: Shape,
    kernel: KernelShape,
    padding: PaddingSpec,
    stride: Shape,
) -> ConvResult<bool> {
    let images = ImageBatch::seed_random(batch, shape, Some(kernel.channels()), 0.0, 1.0, true)?;
    let kernel = Kernel::seed_random(kernel, 0.0, 0.5, true)?;

    let single = convolve_with(&ExecutionContext::single_threaded(), &images, &kernel, padding, stride)?;
    let multi = convolve_with(ctx, &images, &kernel, padding, stride)?;

    Ok(single.dims() == multi.dims() && approx_equal(single.values(), multi.values()).is_none())
}

fn pool_equal(
    ctx: &ExecutionContext,
    batch: usize,
    shape: Shape,
    channels: usize,
    window: Shape,
    stride: Shape,
    mode: PoolMode,
) -> ConvResult<bool> {
    let images = ImageBatch::seed_random(batch, shape, Some(channels), 0.0, 1.0, false)?;

    let single = pool_with(&ExecutionContext::single_threaded(), &images, window, stride, mode)?;
    let multi = pool_with(ctx, &images, window, stride, mode)?;

    Ok(single.dims() == multi.dims() && approx_equal(single.values(), multi.values()).is_none())
}

fn approx_equal(a: &[f64], b: &[f64]) -> Option<usize> {
    if a.len() != b.len() {
        return Some(usize::MAX);
    }

    for (i, (&a, &b)) in a.iter().zip(b.iter()).enumerate() {
        if (a - b).abs() > 1e-9 * a.abs().max(1.0) {
            print!("a={a} b={b} err={} ", (a - b).abs());
            return Some(i);
        }
    }

    None
}
