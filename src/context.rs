use std::{num::NonZeroUsize, thread};

/// Controls how a batch is split across worker threads.
///
/// Results never depend on the thread count: each worker owns a disjoint,
/// contiguous run of output images and reads only from the shared inputs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExecutionContext {
    threads: usize,
}

impl Default for ExecutionContext {
    fn default() -> Self {
        Self::new(thread::available_parallelism().map_or(1, NonZeroUsize::get))
    }
}

impl ExecutionContext {
    /// A thread count of zero is treated as one.
    pub fn new(threads: usize) -> Self {
        Self { threads: threads.max(1) }
    }

    pub fn single_threaded() -> Self {
        Self::new(1)
    }

    pub fn threads(&self) -> usize {
        self.threads
    }

    /// Calls `f(image_idx, image_output, scratch)` for every `image_size`-long
    /// chunk of `output`. The scratch buffer is reused by all images handled
    /// by the same worker.
    pub(crate) fn run_batched<F>(&self, output: &mut [f64], image_size: usize, f: F)
    where
        F: Fn(usize, &mut [f64], &mut Vec<f64>) + Sync,
    {
        if image_size == 0 || output.is_empty() {
            return;
        }

        let batch_size = output.len() / image_size;
        let workers = self.threads.min(batch_size);
        let per_worker = batch_size.div_ceil(workers);

        log::trace!("splitting {batch_size} image(s) across {workers} worker(s), {per_worker} each");

        if workers == 1 {
            let mut scratch = Vec::new();
            for (idx, out) in output.chunks_exact_mut(image_size).enumerate() {
                f(idx, out, &mut scratch);
            }

            return;
        }

        thread::scope(|s| {
            for (worker, chunk) in output.chunks_mut(per_worker * image_size).enumerate() {
                let f = &f;
                s.spawn(move || {
                    let mut scratch = Vec::new();
                    for (i, out) in chunk.chunks_exact_mut(image_size).enumerate() {
                        f(worker * per_worker + i, out, &mut scratch);
                    }
                });
            }
        });
    }
}
