use std::time::Instant;

use anyhow::Context;
use convpool::{pool_with, ExecutionContext, ImageBatch, PoolDescription, PoolMode, Shape};
use structopt::StructOpt;

use crate::logger::{ansi, report_timing};

/// Pools a batch of random images.
#[derive(StructOpt)]
pub struct PoolOptions {
    #[structopt(long, default_value = "16")]
    batch: usize,
    #[structopt(long, default_value = "28")]
    height: usize,
    #[structopt(long, default_value = "28")]
    width: usize,
    #[structopt(long, default_value = "3")]
    channels: usize,
    #[structopt(long, default_value = "2")]
    window_h: usize,
    #[structopt(long, default_value = "2")]
    window_w: usize,
    #[structopt(long, default_value = "2")]
    stride_h: usize,
    #[structopt(long, default_value = "2")]
    stride_w: usize,
    /// `max` or `avg`
    #[structopt(short, long, default_value = "max")]
    mode: PoolMode,
    #[structopt(short, long, default_value = "1")]
    threads: usize,
}

impl PoolOptions {
    pub fn run(&self) -> anyhow::Result<()> {
        let shape = Shape::new(self.height, self.width);
        let window = Shape::new(self.window_h, self.window_w);
        let stride = Shape::new(self.stride_h, self.stride_w);

        let desc =
            PoolDescription::new(shape, self.channels, window, stride).with_context(|| "Invalid pooling geometry.")?;

        println!("input    : {} x {} x {}", self.batch, shape, self.channels);
        println!("window   : {window} ({})", self.mode);
        println!("stride   : {stride}");
        println!("expected : {} x {}", desc.output_shape, desc.channels);

        let images = ImageBatch::seed_random(self.batch, shape, Some(self.channels), 0.0, 1.0, false)?;
        let ctx = ExecutionContext::new(self.threads);

        let timer = Instant::now();
        let output = pool_with(&ctx, &images, window, stride, self.mode).with_context(|| "Failed to pool.")?;
        let elapsed = timer.elapsed().as_secs_f32();

        println!("output   : {}", ansi(format!("{:?}", output.dims()), 36));
        report_timing("pooling", output.values().len(), elapsed);

        Ok(())
    }
}
