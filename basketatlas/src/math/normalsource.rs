use rand::{rngs::StdRng, Rng, SeedableRng};
use rand_distr::StandardNormal;

/// Supplier of independent standard-normal draws.
pub trait NormalSource {
    fn next_normal(&mut self) -> f64;
}

impl<S: NormalSource + ?Sized> NormalSource for &mut S {
    fn next_normal(&mut self) -> f64 {
        (**self).next_normal()
    }
}

impl<S: NormalSource + ?Sized> NormalSource for Box<S> {
    fn next_normal(&mut self) -> f64 {
        (**self).next_normal()
    }
}

/// Standard normal draws sampled from any `rand` generator.
#[derive(Debug, Clone)]
pub struct StandardNormalSource<R: Rng> {
    rng: R,
}

impl<R: Rng> StandardNormalSource<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl StandardNormalSource<StdRng> {
    /// Fresh generator seeded from operating system entropy.
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }

    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> NormalSource for StandardNormalSource<R> {
    fn next_normal(&mut self) -> f64 {
        self.rng.sample(StandardNormal)
    }
}
