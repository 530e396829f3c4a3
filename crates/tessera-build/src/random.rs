//! Seeded random fills.
//!
//! [`RandomSource`] wraps a ChaCha8 generator, so the same seed produces
//! the same containers on every platform. Normal samples use the
//! Box-Muller transform rather than pulling in a distributions crate.

use std::cmp::Ordering;

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use tessera_arena::{Arena, Container, Init, Matrix, Vector};
use tessera_core::{Float, Lifetime, LinalgError, Scalar};

/// Deterministic source of random vectors and matrices.
#[derive(Clone, Debug)]
pub struct RandomSource {
    rng: ChaCha8Rng,
}

impl RandomSource {
    /// Source seeded from `seed`.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// One sample from the standard normal distribution.
    fn box_muller(&mut self) -> f64 {
        let u1: f64 = self.rng.random::<f64>().max(1e-300); // avoid ln(0)
        let u2: f64 = self.rng.random();
        (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
    }

    /// One sample uniform over `low..high`. Integer samples are floored,
    /// so every value in `low..high` is equally likely.
    fn uniform_sample<T: Scalar>(&mut self, low: f64, high: f64) -> T {
        let x = low + (high - low) * self.rng.random::<f64>();
        T::from_f64(if T::IS_INTEGER { x.floor() } else { x })
    }

    fn fill_uniform<T: Scalar, C: Container<T>>(&mut self, target: &C, low: T, high: T) {
        let (low, high) = (low.to_f64(), high.to_f64());
        target.with_slice_mut(|values| {
            for v in values {
                *v = self.uniform_sample(low, high);
            }
        });
    }

    fn fill_normal<T: Float, C: Container<T>>(&mut self, target: &C, mean: T, std_dev: T) {
        let (mean, std_dev) = (mean.to_f64(), std_dev.to_f64());
        target.with_slice_mut(|values| {
            for v in values {
                *v = T::from_f64(mean + std_dev * self.box_muller());
            }
        });
    }

    /// Vector of `n` samples uniform over `low..high`.
    pub fn uniform_vec<T: Scalar>(
        &mut self,
        arena: &Arena,
        lifetime: Lifetime,
        n: usize,
        low: T,
        high: T,
    ) -> Result<Vector<T>, LinalgError> {
        check_bounds("uniform_vec", low, high)?;
        let v = arena.alloc_vector(lifetime, n, Init::Uninit);
        self.fill_uniform(&v, low, high);
        Ok(v)
    }

    /// `rows × cols` matrix of samples uniform over `low..high`.
    pub fn uniform_mat<T: Scalar>(
        &mut self,
        arena: &Arena,
        lifetime: Lifetime,
        rows: usize,
        cols: usize,
        low: T,
        high: T,
    ) -> Result<Matrix<T>, LinalgError> {
        check_bounds("uniform_mat", low, high)?;
        let m = arena.alloc_matrix(lifetime, rows, cols, Init::Uninit);
        self.fill_uniform(&m, low, high);
        Ok(m)
    }

    /// Vector of `n` samples from `N(mean, std_dev²)`.
    pub fn normal_vec<T: Float>(
        &mut self,
        arena: &Arena,
        lifetime: Lifetime,
        n: usize,
        mean: T,
        std_dev: T,
    ) -> Result<Vector<T>, LinalgError> {
        check_std_dev("normal_vec", std_dev)?;
        let v = arena.alloc_vector(lifetime, n, Init::Uninit);
        self.fill_normal(&v, mean, std_dev);
        Ok(v)
    }

    /// `rows × cols` matrix of samples from `N(mean, std_dev²)`.
    pub fn normal_mat<T: Float>(
        &mut self,
        arena: &Arena,
        lifetime: Lifetime,
        rows: usize,
        cols: usize,
        mean: T,
        std_dev: T,
    ) -> Result<Matrix<T>, LinalgError> {
        check_std_dev("normal_mat", std_dev)?;
        let m = arena.alloc_matrix(lifetime, rows, cols, Init::Uninit);
        self.fill_normal(&m, mean, std_dev);
        Ok(m)
    }
}

fn check_bounds<T: Scalar>(op: &'static str, low: T, high: T) -> Result<(), LinalgError> {
    match low.partial_cmp(&high) {
        Some(Ordering::Less) => Ok(()),
        _ => Err(LinalgError::InvalidArgument {
            op,
            reason: format!("empty sampling range {low:?}..{high:?}"),
        }),
    }
}

fn check_std_dev<T: Float>(op: &'static str, std_dev: T) -> Result<(), LinalgError> {
    if !std_dev.is_finite() || std_dev < T::ZERO {
        return Err(LinalgError::InvalidArgument {
            op,
            reason: format!("standard deviation must be finite and non-negative, got {std_dev:?}"),
        });
    }
    Ok(())
}
