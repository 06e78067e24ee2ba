//! Inference of motif instance locations from a motif model.
//!
//! Both strategies score every window of every sequence with a
//! [`ScoringMatrix`]; they only differ in how a window is picked from
//! the scores of a sequence.

use rand::distributions::Distribution;
use rand::Rng;

use super::abc::Alphabet;
use super::corpus::SequenceCorpus;
use super::err::Error;
use super::err::SequenceErrorKind;
use super::pwm::ScoringMatrix;
use super::sampler::CumulativeDistribution;
use super::seq::EncodedSequence;

// --- Locate ------------------------------------------------------------------

/// A strategy to pick one motif instance in each sequence of a corpus.
pub trait Locate<A: Alphabet> {
    /// Pick the location of a motif instance from the scores of a sequence.
    ///
    /// `scores` contains the natural log-probability of every window of the
    /// sequence, in order of increasing offset, and is never empty.
    fn pick<R: Rng + ?Sized>(&self, scores: &[f64], rng: &mut R) -> Result<usize, Error>;

    /// Compute the location of a motif instance in every sequence.
    fn locate<R: Rng + ?Sized>(
        &self,
        pssm: &ScoringMatrix<A>,
        corpus: &SequenceCorpus<A>,
        rng: &mut R,
    ) -> Result<Vec<usize>, Error> {
        let mut scores = Vec::new();
        corpus
            .iter()
            .enumerate()
            .map(|(index, seq)| {
                score_sequence(pssm, seq, index, &mut scores)?;
                self.pick(&scores, rng)
            })
            .collect()
    }
}

/// Score all windows of a sequence, failing if there are none.
fn score_sequence<A: Alphabet>(
    pssm: &ScoringMatrix<A>,
    seq: &EncodedSequence<A>,
    index: usize,
    scores: &mut Vec<f64>,
) -> Result<(), Error> {
    pssm.score_into(seq, scores);
    if scores.is_empty() {
        return Err(Error::InvalidSequence {
            index,
            kind: SequenceErrorKind::TooShort {
                length: seq.len(),
                motif_length: pssm.len(),
            },
        });
    }
    Ok(())
}

// --- BestWindow --------------------------------------------------------------

/// Deterministic location of the highest-scoring window.
///
/// Ties are resolved in favour of the window with the lowest offset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BestWindow;

impl<A: Alphabet> Locate<A> for BestWindow {
    fn pick<R: Rng + ?Sized>(&self, scores: &[f64], _rng: &mut R) -> Result<usize, Error> {
        let mut best = 0;
        for (i, &s) in scores.iter().enumerate().skip(1) {
            if s > scores[best] {
                best = i;
            }
        }
        Ok(best)
    }
}

// --- SampledWindow -----------------------------------------------------------

/// Stochastic location of a window sampled proportionally to its score.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SampledWindow;

impl<A: Alphabet> Locate<A> for SampledWindow {
    fn pick<R: Rng + ?Sized>(&self, scores: &[f64], rng: &mut R) -> Result<usize, Error> {
        // shift by the maximum log-score so the best window has weight 1,
        // which keeps the weights proportional and avoids underflow
        let max = scores.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let weights = scores.iter().map(|&s| (s - max).exp());
        let dist = CumulativeDistribution::new(weights)?;
        Ok(dist.sample(rng))
    }
}

// --- Strategy ----------------------------------------------------------------

/// The optimization strategy used to locate motif instances.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Strategy {
    /// Expectation-maximization, always taking the best window.
    #[default]
    Em,
    /// Gibbs sampling, drawing windows weighted by their score.
    Gibbs,
}

impl<A: Alphabet> Locate<A> for Strategy {
    fn pick<R: Rng + ?Sized>(&self, scores: &[f64], rng: &mut R) -> Result<usize, Error> {
        match self {
            Strategy::Em => <BestWindow as Locate<A>>::pick(&BestWindow, scores, rng),
            Strategy::Gibbs => <SampledWindow as Locate<A>>::pick(&SampledWindow, scores, rng),
        }
    }
}
