use std::time::Instant;

use anyhow::Context;
use convpool::{
    convolve_with, ConvolutionDescription, ExecutionContext, ImageBatch, Kernel, KernelShape, PaddingSpec, Shape,
};
use structopt::StructOpt;

use crate::logger::{ansi, report_timing};

/// Convolves a batch of random images with random kernels.
#[derive(StructOpt)]
pub struct ConvOptions {
    #[structopt(long, default_value = "16")]
    batch: usize,
    #[structopt(long, default_value = "28")]
    height: usize,
    #[structopt(long, default_value = "28")]
    width: usize,
    #[structopt(long, default_value = "3")]
    channels: usize,
    #[structopt(long, default_value = "8")]
    kernels: usize,
    #[structopt(long, default_value = "3")]
    filter_h: usize,
    #[structopt(long, default_value = "3")]
    filter_w: usize,
    #[structopt(long, default_value = "1")]
    stride_h: usize,
    #[structopt(long, default_value = "1")]
    stride_w: usize,
    /// `valid`, `same` or `ph,pw`
    #[structopt(short, long, default_value = "same")]
    padding: PaddingSpec,
    #[structopt(short, long, default_value = "1")]
    threads: usize,
    #[structopt(long)]
    gaussian: bool,
}

impl ConvOptions {
    pub fn run(&self) -> anyhow::Result<()> {
        let shape = Shape::new(self.height, self.width);
        let filter = Shape::new(self.filter_h, self.filter_w);
        let stride = Shape::new(self.stride_h, self.stride_w);

        let kernel_shape = if self.kernels == 1 {
            KernelShape::Channels { filter, channels: self.channels }
        } else {
            KernelShape::Bank { filter, channels: self.channels, count: self.kernels }
        };

        let desc = ConvolutionDescription::new(shape, self.channels, self.kernels, filter, self.padding, stride)
            .with_context(|| "Invalid convolution geometry.")?;

        println!("input    : {} x {} x {}", self.batch, shape, self.channels);
        println!("kernel   : {:?}", kernel_shape.dims());
        println!("padding  : {} -> {:?}", self.padding, desc.padding);
        println!("stride   : {stride}");

        let images = ImageBatch::seed_random(self.batch, shape, Some(self.channels), 0.0, 1.0, self.gaussian)?;
        let kernel = Kernel::seed_random(kernel_shape, 0.0, 0.5, self.gaussian)?;
        let ctx = ExecutionContext::new(self.threads);

        let timer = Instant::now();
        let output = convolve_with(&ctx, &images, &kernel, self.padding, stride)
            .with_context(|| "Failed to convolve.")?;
        let elapsed = timer.elapsed().as_secs_f32();

        println!("output   : {}", ansi(format!("{:?}", output.dims()), 36));
        report_timing("convolution", output.values().len(), elapsed);

        Ok(())
    }
}
