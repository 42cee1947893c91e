use std::{fmt::Debug, iter::Sum};

use num_traits::Float;
use statrs::distribution::{ContinuousCDF, StudentsT};

use crate::{BullcowError, Result};

#[allow(dead_code)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum Tails {
    One,
    Two,
}

impl Tails {
    fn factor<N: Float>(&self) -> N {
        match self {
            Self::One => N::from(1_f32).unwrap(),
            Self::Two => N::from(2_f32).unwrap(),
        }
    }
}

struct Sample<N: Float> {
    mean: N,
    len: N,
    var: N,
}

impl<N: Float + Sum> Sample<N> {
    fn new<T: IntoIterator<Item = N> + Clone>(sample: T) -> Self {
        let (len, sum) =
            sample
                .clone()
                .into_iter()
                .fold((0_u32, N::from(0_f32).unwrap()), |acc, next| {
                    (acc.0 + 1_u32, acc.1 + next)
                });

        let mean = sum / N::from(len).unwrap();

        // Bessel-corrected sample variance; `two_sample` rejects len < 2
        // before this can divide by zero.
        let var = sample.into_iter().map(|n| (n - mean).powi(2)).sum::<N>()
            / N::from(len.saturating_sub(1)).unwrap();

        Sample {
            mean,
            len: N::from(len).unwrap(),
            var,
        }
    }
}

/// Welch's unequal-variances t-test.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) struct WelchsT<N: Float> {
    /// The p-value of the test, which is the probability that a difference
    /// at least this large arises while the null hypothesis is in fact true.
    pub(crate) p: N,

    /// The maximum allowed p-value.
    pub(crate) alpha: N,

    /// The "tails" of the test.
    pub(crate) tails: Tails,
}

impl<N: Float + Sum + Into<f64>> WelchsT<N> {
    /// Runs the test on two samples.
    ///
    /// Returns an error if either sample has fewer than two observations or
    /// a zero mean, since the statistic is undefined there.
    ///
    /// # Panics
    ///
    /// `alpha` must be in (0, 1).
    pub(crate) fn two_sample<
        T: IntoIterator<Item = N> + Clone,
        V: IntoIterator<Item = N> + Clone,
    >(
        a: T,
        b: V,
        alpha: N,
        tails: Tails,
    ) -> Result<Self> {
        assert!(alpha > N::from(0_f32).unwrap() && alpha < N::from(1_f32).unwrap());

        let a = Sample::new(a);
        let b = Sample::new(b);

        let two = N::from(2_f32).unwrap();
        if a.len < two || b.len < two {
            return Err(BullcowError::Stats);
        }

        if a.mean.into().abs() < f64::EPSILON || b.mean.into().abs() < f64::EPSILON {
            return Err(BullcowError::Stats);
        }

        // Welch's t-statistic and the Welch-Satterthwaite degrees of freedom.
        let t = (a.mean - b.mean).abs() / ((a.var / a.len) + (b.var / b.len)).sqrt();

        let deg = ((a.var / a.len) + (b.var / b.len)).powi(2)
            / ((a.var.powi(2) / (a.len.powi(2) * (a.len - N::from(1_u32).unwrap())))
                + (b.var.powi(2) / (b.len.powi(2) * (b.len - N::from(1_u32).unwrap()))));

        let deg: f64 = deg.into();
        if !deg.is_finite() || deg <= 0.0 {
            return Err(BullcowError::Stats);
        }

        let dist = StudentsT::new(0.0, 1.0, deg).map_err(|_| BullcowError::Stats)?;

        let p = N::from(dist.cdf((-t).into())).unwrap() * tails.factor::<N>();

        Ok(Self { p, alpha, tails })
    }

    pub(crate) fn is_significant(&self) -> bool {
        self.p < self.alpha
    }
}
