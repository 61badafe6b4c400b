use approx::assert_relative_eq;
use convpool::{
    convolve, convolve_with, pool, pool_with, resolve_padding, rng, ExecutionContext, ImageBatch, Kernel,
    KernelShape, Padding, PaddingSpec, PoolMode, Shape,
};

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn random_batch(seed: u64, batch_size: usize, shape: Shape, channels: Option<usize>) -> ImageBatch {
    let size = batch_size * shape.size() * channels.unwrap_or(1);
    ImageBatch::new(batch_size, shape, channels, rng::vec_f64_seeded(seed, size, 0.0, 1.0, true)).unwrap()
}

fn random_kernel(seed: u64, shape: KernelShape) -> Kernel {
    Kernel::new(shape, rng::vec_f64_seeded(seed, shape.size(), 0.0, 0.5, false)).unwrap()
}

fn assert_close(a: &[f64], b: &[f64]) {
    assert_eq!(a.len(), b.len());
    for (&x, &y) in a.iter().zip(b.iter()) {
        assert_relative_eq!(x, y, max_relative = 1e-9, epsilon = 1e-12);
    }
}

/// Direct evaluation of a single output cell, with out-of-range reads as zero.
fn reference_cell(
    images: &ImageBatch,
    kernel: &Kernel,
    padding: Padding,
    stride: Shape,
    (b, i, j, n): (usize, usize, usize, usize),
) -> f64 {
    let shape = kernel.shape();
    let (c, k) = (shape.channels(), shape.count());
    let filter = shape.filter();
    let mut sum = 0.0;

    for y in 0..filter.rows() {
        for x in 0..filter.cols() {
            let row = (i * stride.rows() + y).checked_sub(padding.top);
            let col = (j * stride.cols() + x).checked_sub(padding.left);

            if let (Some(row), Some(col)) = (row, col) {
                for ch in 0..c {
                    if let Some(v) = images.get(b, row, col, ch) {
                        sum += v * kernel.values()[((y * filter.cols() + x) * c + ch) * k + n];
                    }
                }
            }
        }
    }

    sum
}

#[test]
fn output_shapes() {
    for (h, w, kh, kw, sh, sw) in [(5, 5, 3, 3, 1, 1), (28, 28, 5, 5, 2, 2), (7, 4, 2, 3, 3, 1), (6, 9, 6, 1, 4, 5)] {
        let (input, filter, stride) = (Shape::new(h, w), Shape::new(kh, kw), Shape::new(sh, sw));

        let valid = resolve_padding(input, filter, stride, PaddingSpec::Valid).unwrap();
        assert_eq!(valid.output, Shape::new((h - kh) / sh + 1, (w - kw) / sw + 1));

        let same = resolve_padding(input, filter, Shape::new(1, 1), PaddingSpec::Same).unwrap();
        assert_eq!(same.output, input);
    }
}

#[test]
fn same_strided_split() {
    let res = resolve_padding(Shape::new(5, 5), Shape::new(3, 3), Shape::new(2, 2), PaddingSpec::Same).unwrap();

    // total of max((5 - 1) * 2 + 3 - 5, 0) = 6 per axis
    assert_eq!(res.padding, Padding { top: 3, bottom: 3, left: 3, right: 3 });
    assert_eq!(res.output, Shape::new((5 + 6 - 3) / 2 + 1, (5 + 6 - 3) / 2 + 1));
}

#[test]
fn zero_kernel_gives_zeros() {
    init();
    let images = random_batch(1, 3, Shape::new(7, 6), Some(2));
    let kernel = Kernel::bank(Shape::new(3, 2), 2, 3, vec![0.0; 36]).unwrap();

    let output = convolve(&images, &kernel, PaddingSpec::Same, Shape::new(2, 1)).unwrap();

    assert_eq!(output.dims(), vec![3, 7, 6, 3]);
    assert!(output.values().iter().all(|&x| x == 0.0));
}

#[test]
fn unit_kernel_is_identity() {
    let images = random_batch(2, 4, Shape::new(5, 3), None);
    let kernel = Kernel::single(Shape::new(1, 1), vec![1.0]).unwrap();

    let output = convolve(&images, &kernel, PaddingSpec::Valid, Shape::new(1, 1)).unwrap();

    assert_eq!(output, images);
}

#[test]
fn ramp_diagonal_example() {
    let images = ImageBatch::grayscale(1, Shape::new(4, 4), (0..16).map(f64::from).collect()).unwrap();
    let kernel = Kernel::single(Shape::new(2, 2), vec![1.0, 0.0, 0.0, 1.0]).unwrap();

    let output = convolve(&images, &kernel, PaddingSpec::Valid, Shape::new(1, 1)).unwrap();

    assert_eq!(output.dims(), vec![1, 3, 3]);
    assert_eq!(output.get(0, 0, 0, 0), Some(5.0));
}

#[test]
fn bank_slices_match_single_kernels() {
    let images = random_batch(3, 5, Shape::new(9, 8), Some(3));
    let bank = random_kernel(4, KernelShape::Bank { filter: Shape::new(3, 2), channels: 3, count: 4 });

    for padding in [PaddingSpec::Valid, PaddingSpec::Same, PaddingSpec::Explicit(1, 2)] {
        let stride = Shape::new(2, 1);
        let output = convolve(&images, &bank, padding, stride).unwrap();
        assert_eq!(output.channels(), 4);

        for n in 0..4 {
            let single = convolve(&images, &bank.select(n).unwrap(), padding, stride).unwrap();
            assert_eq!(single.dims()[..3], output.dims()[..3]);

            let slice = output.values().iter().skip(n).step_by(4).copied().collect::<Vec<_>>();
            assert_close(&slice, single.values());
        }
    }
}

#[test]
fn matches_direct_evaluation() {
    let images = random_batch(5, 2, Shape::new(7, 10), Some(2));
    let kernel = random_kernel(6, KernelShape::Bank { filter: Shape::new(4, 3), channels: 2, count: 2 });

    for (padding, stride) in [
        (PaddingSpec::Same, Shape::new(1, 1)),
        (PaddingSpec::Same, Shape::new(3, 2)),
        (PaddingSpec::Explicit(2, 0), Shape::new(2, 3)),
        (PaddingSpec::Valid, Shape::new(1, 4)),
    ] {
        let geometry = resolve_padding(images.shape(), Shape::new(4, 3), stride, padding).unwrap();
        let output = convolve(&images, &kernel, padding, stride).unwrap();

        for b in 0..2 {
            for i in 0..geometry.output.rows() {
                for j in 0..geometry.output.cols() {
                    for n in 0..2 {
                        let expected = reference_cell(&images, &kernel, geometry.padding, stride, (b, i, j, n));
                        let got = output.get(b, i, j, n).unwrap();
                        assert_relative_eq!(got, expected, max_relative = 1e-9, epsilon = 1e-12);
                    }
                }
            }
        }
    }
}

#[test]
fn even_kernel_strided_same_against_fixed_geometry() {
    let images = random_batch(10, 2, Shape::new(7, 5), Some(2));
    let kernel = random_kernel(11, KernelShape::Bank { filter: Shape::new(2, 4), channels: 2, count: 2 });
    let stride = Shape::new(3, 2);

    // rows: total (7 - 1) * 3 + 2 - 7 = 13, cols: total (5 - 1) * 2 + 4 - 5 = 7
    let padding = Padding { top: 6, bottom: 7, left: 3, right: 4 };
    let (oh, ow) = ((7 + 13 - 2) / 3 + 1, (5 + 7 - 4) / 2 + 1);

    let geometry = resolve_padding(images.shape(), Shape::new(2, 4), stride, PaddingSpec::Same).unwrap();
    assert_eq!(geometry.padding, padding);
    assert_eq!(geometry.output, Shape::new(oh, ow));

    let output = convolve(&images, &kernel, PaddingSpec::Same, stride).unwrap();
    assert_eq!(output.dims(), vec![2, oh, ow, 2]);

    for b in 0..2 {
        for i in 0..oh {
            for j in 0..ow {
                for n in 0..2 {
                    let expected = reference_cell(&images, &kernel, padding, stride, (b, i, j, n));
                    let got = output.get(b, i, j, n).unwrap();
                    assert_relative_eq!(got, expected, max_relative = 1e-9, epsilon = 1e-12);
                }
            }
        }
    }
}

#[test]
fn unit_pool_is_identity() {
    let images = random_batch(7, 3, Shape::new(4, 5), Some(3));

    for mode in [PoolMode::Max, PoolMode::Average] {
        let output = pool(&images, Shape::new(1, 1), Shape::new(1, 1), mode).unwrap();
        assert_eq!(output, images);
    }
}

#[test]
fn max_pool_of_constant() {
    let images = ImageBatch::from_fn(2, Shape::new(9, 7), Some(2), |_, _, _, _| 3.25).unwrap();

    for (window, stride) in [((2, 2), (2, 2)), ((3, 1), (1, 3)), ((9, 7), (1, 1)), ((4, 5), (5, 2))] {
        let output = pool(&images, window.into(), stride.into(), PoolMode::Max).unwrap();
        assert!(output.values().iter().all(|&x| x == 3.25));
    }
}

#[test]
fn thread_count_does_not_change_results() {
    init();
    let images = random_batch(8, 13, Shape::new(11, 9), Some(3));
    let kernel = random_kernel(9, KernelShape::Bank { filter: Shape::new(3, 3), channels: 3, count: 2 });

    let single = ExecutionContext::single_threaded();
    let conv = convolve_with(&single, &images, &kernel, PaddingSpec::Same, Shape::new(2, 2)).unwrap();
    let pooled = pool_with(&single, &images, Shape::new(3, 2), Shape::new(2, 2), PoolMode::Average).unwrap();

    for threads in [2, 3, 5, 32] {
        let ctx = ExecutionContext::new(threads);
        assert_eq!(convolve_with(&ctx, &images, &kernel, PaddingSpec::Same, Shape::new(2, 2)).unwrap(), conv);
        assert_eq!(pool_with(&ctx, &images, Shape::new(3, 2), Shape::new(2, 2), PoolMode::Average).unwrap(), pooled);
    }
}

#[test]
fn empty_batch() {
    let images = ImageBatch::zeroed(0, Shape::new(4, 4), Some(2)).unwrap();
    let kernel = Kernel::channels(Shape::new(2, 2), 2, vec![1.0; 8]).unwrap();

    let output = convolve(&images, &kernel, PaddingSpec::Valid, Shape::new(1, 1)).unwrap();
    assert_eq!(output.dims(), vec![0, 3, 3]);
    assert!(output.values().is_empty());

    let output = pool(&images, Shape::new(2, 2), Shape::new(2, 2), PoolMode::Max).unwrap();
    assert_eq!(output.dims(), vec![0, 2, 2, 2]);
}
