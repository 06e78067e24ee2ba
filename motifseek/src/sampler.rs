//! Inverse transform sampling of categorical outcomes.

use rand::distributions::Distribution;
use rand::Rng;

use super::err::Error;

// --- CumulativeDistribution --------------------------------------------------

/// A categorical distribution stored as cumulative probabilities.
///
/// Sampling draws a number uniformly in `[0, 1)` and returns the index of
/// the first cumulative probability at least as large as the draw.
#[derive(Clone, Debug, PartialEq)]
pub struct CumulativeDistribution {
    cdf: Vec<f64>,
}

impl CumulativeDistribution {
    /// Build a cumulative distribution from non-negative weights.
    ///
    /// The weights do not need to be normalized. Fails with
    /// [`Error::DegenerateDistribution`] when there are no weights, when a
    /// weight is negative or not finite, or when all weights are zero.
    pub fn new<W>(weights: W) -> Result<Self, Error>
    where
        W: IntoIterator,
        <W as IntoIterator>::Item: Into<f64>,
    {
        let mut cdf = Vec::new();
        let mut total = 0.0;
        for w in weights {
            let w = w.into();
            if !w.is_finite() || w < 0.0 {
                return Err(Error::DegenerateDistribution);
            }
            total += w;
            cdf.push(w);
        }
        if cdf.is_empty() || !(total > 0.0) || !total.is_finite() {
            return Err(Error::DegenerateDistribution);
        }
        // normalize into probabilities, then accumulate
        let mut acc = 0.0;
        for x in cdf.iter_mut() {
            acc += *x / total;
            *x = acc;
        }
        Ok(Self { cdf })
    }

    /// The number of outcomes of the distribution.
    #[inline]
    pub fn len(&self) -> usize {
        self.cdf.len()
    }

    /// Always `false`, a distribution has at least one outcome.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cdf.is_empty()
    }

    /// The cumulative probabilities, in order of outcome index.
    #[inline]
    pub fn cumulative(&self) -> &[f64] {
        &self.cdf
    }

    /// Select the outcome corresponding to a uniform draw `u` in `[0, 1)`.
    ///
    /// Returns the smallest index whose cumulative probability is greater
    /// than or equal to `u`, or the last index if rounding errors left the
    /// total probability slightly below `u`. Outcomes with a zero weight
    /// are never selected, even for a draw of exactly zero.
    ///
    /// # Example
    /// ```
    /// # use motifseek::sampler::CumulativeDistribution;
    /// let dist = CumulativeDistribution::new([1.0, 1.0]).unwrap();
    /// assert_eq!(dist.select(0.25), 0);
    /// assert_eq!(dist.select(0.5), 0);
    /// assert_eq!(dist.select(0.999999), 1);
    /// ```
    pub fn select(&self, u: f64) -> usize {
        // `cdf` is non-decreasing, so the predicate is partitioned
        let mut i = self.cdf.partition_point(|&c| c < u || c <= 0.0);
        if i == self.cdf.len() {
            i -= 1;
            while i > 0 && self.cdf[i] == self.cdf[i - 1] {
                i -= 1;
            }
        }
        i
    }
}

impl Distribution<usize> for CumulativeDistribution {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        self.select(rng.gen::<f64>())
    }
}

/// Sample an index with probability proportional to its weight.
///
/// This is a shorthand for building a [`CumulativeDistribution`] and
/// drawing a single outcome from it.
pub fn sample_index<R, W>(weights: W, rng: &mut R) -> Result<usize, Error>
where
    R: Rng + ?Sized,
    W: IntoIterator,
    <W as IntoIterator>::Item: Into<f64>,
{
    CumulativeDistribution::new(weights).map(|dist| dist.sample(rng))
}
