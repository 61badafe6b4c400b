use rand::{rngs::StdRng, thread_rng, Rng, SeedableRng};
use rand_distr::{Distribution, Normal, Uniform};

enum Dist {
    Normal(Normal<f64>),
    Uniform(Uniform<f64>),
    Constant(f64),
}

impl Dist {
    fn new(mean: f64, stdev: f64, use_gaussian: bool) -> Self {
        let (low, high) = (mean - stdev, mean + stdev);

        // a spread that vanishes (or overflows) at this magnitude degenerates to a constant fill
        if !(stdev > 0.0 && mean.is_finite() && low < high && (high - low).is_finite()) {
            return Self::Constant(mean);
        }

        if use_gaussian {
            Normal::new(mean, stdev).map_or(Self::Constant(mean), Self::Normal)
        } else {
            Self::Uniform(Uniform::new(low, high))
        }
    }

    fn sample<R: Rng>(&self, rng: &mut R) -> f64 {
        match self {
            Dist::Normal(x) => x.sample(rng),
            Dist::Uniform(x) => x.sample(rng),
            Dist::Constant(x) => *x,
        }
    }
}

fn fill<R: Rng>(rng: &mut R, length: usize, mean: f64, stdev: f64, use_gaussian: bool) -> Vec<f64> {
    let dist = Dist::new(mean, stdev, use_gaussian);
    (0..length).map(|_| dist.sample(rng)).collect()
}

/// Values drawn from `N(mean, stdev)` if `use_gaussian`, otherwise from
/// `U(mean - stdev, mean + stdev)`.
pub fn vec_f64(length: usize, mean: f64, stdev: f64, use_gaussian: bool) -> Vec<f64> {
    fill(&mut thread_rng(), length, mean, stdev, use_gaussian)
}

/// Reproducible version of [`vec_f64`].
pub fn vec_f64_seeded(seed: u64, length: usize, mean: f64, stdev: f64, use_gaussian: bool) -> Vec<f64> {
    fill(&mut StdRng::seed_from_u64(seed), length, mean, stdev, use_gaussian)
}
