//! Multi-restart motif search.

use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;

#[cfg(feature = "parallel")]
use rayon::iter::IndexedParallelIterator;
#[cfg(feature = "parallel")]
use rayon::iter::IntoParallelRefIterator;
#[cfg(feature = "parallel")]
use rayon::iter::ParallelIterator;

use super::abc::Alphabet;
use super::abc::Background;
use super::corpus::SequenceCorpus;
use super::em::Motif;
use super::em::Optimizer;
use super::em::DEFAULT_MAX_CYCLES;
use super::em::DEFAULT_PSEUDOCOUNT;
use super::err::Error;
use super::locate::Strategy;

/// The configuration of a motif search over several random restarts.
///
/// Every restart runs an [`Optimizer`] from its own random instance
/// locations, with its own random number generator, and the motif with
/// the highest information content over all restarts is retained.
///
/// Information content is measured against the nucleotide frequencies of
/// the whole corpus smoothed with the same pseudocount as the motif
/// matrices, not against the raw corpus frequencies. A base absent from
/// the corpus therefore still has a non-zero background frequency.
///
/// # Example
/// ```
/// # use motifseek::abc::Dna;
/// # use motifseek::corpus::SequenceCorpus;
/// # use motifseek::search::MotifSearch;
/// let corpus = SequenceCorpus::<Dna>::from_strings([
///     "TTGACATATAAT",
///     "GCTTGACAATTT",
///     "TTGACAGGGCCC",
/// ]).unwrap();
/// let motif = MotifSearch::new(6)
///     .restarts(10)
///     .seed(42)
///     .run(&corpus)
///     .unwrap();
/// assert_eq!(motif.len(), 6);
/// assert_eq!(motif.starts().len(), 3);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct MotifSearch {
    width: usize,
    restarts: usize,
    strategy: Strategy,
    pseudocount: f64,
    max_cycles: usize,
    seed: Option<u64>,
}

impl MotifSearch {
    /// Create a new search for motifs of the given width.
    pub fn new(width: usize) -> Self {
        Self {
            width,
            restarts: 1,
            strategy: Strategy::default(),
            pseudocount: DEFAULT_PSEUDOCOUNT,
            max_cycles: DEFAULT_MAX_CYCLES,
            seed: None,
        }
    }

    /// Set the number of independent restarts.
    pub fn restarts(mut self, restarts: usize) -> Self {
        self.restarts = restarts;
        self
    }

    /// Set the strategy used to locate motif instances.
    pub fn strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Set the pseudocount added to every frequency matrix cell.
    pub fn pseudocount(mut self, pseudocount: f64) -> Self {
        self.pseudocount = pseudocount;
        self
    }

    /// Set the number of cycles after which a restart is considered stuck.
    pub fn max_cycles(mut self, max_cycles: usize) -> Self {
        self.max_cycles = max_cycles;
        self
    }

    /// Seed the search for reproducible results.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// The width of the searched motif.
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Check the parameters of the search against a corpus.
    fn validate<A: Alphabet>(&self, corpus: &SequenceCorpus<A>) -> Result<(), Error> {
        if self.restarts == 0 {
            return Err(Error::InvalidArgument("number of restarts must be positive"));
        }
        if self.max_cycles == 0 {
            return Err(Error::InvalidArgument("maximum number of cycles must be positive"));
        }
        if !(self.pseudocount > 0.0 && self.pseudocount.is_finite()) {
            return Err(Error::InvalidArgument("pseudocount must be strictly positive"));
        }
        corpus.check_motif_length(self.width)
    }

    fn master_rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }

    /// Run the search and return the best motif.
    pub fn run<A: Alphabet>(&self, corpus: &SequenceCorpus<A>) -> Result<Motif<A>, Error> {
        self.run_with_rng(corpus, &mut self.master_rng())
    }

    /// Run the search with the given generator and return the best motif.
    ///
    /// The generator is only used to draw one seed per restart.
    pub fn run_with_rng<A, R>(&self, corpus: &SequenceCorpus<A>, rng: &mut R) -> Result<Motif<A>, Error>
    where
        A: Alphabet,
        R: Rng + ?Sized,
    {
        let motifs = self.run_all_with_rng(corpus, rng)?;
        let mut best: Option<Motif<A>> = None;
        for (i, motif) in motifs.into_iter().enumerate() {
            if best
                .as_ref()
                .map_or(true, |b| motif.information_content() > b.information_content())
            {
                log::debug!(
                    "restart {} is the new best (information content {:.6})",
                    i + 1,
                    motif.information_content()
                );
                best = Some(motif);
            }
        }
        let best = best.ok_or(Error::InvalidArgument("number of restarts must be positive"))?;
        log::info!(
            "best motif {} with information content {:.6}",
            best.consensus(),
            best.information_content()
        );
        Ok(best)
    }

    /// Run every restart of the search and return their motifs in order.
    pub fn run_all<A: Alphabet>(&self, corpus: &SequenceCorpus<A>) -> Result<Vec<Motif<A>>, Error> {
        self.run_all_with_rng(corpus, &mut self.master_rng())
    }

    /// Run every restart of the search with the given generator.
    ///
    /// If several restarts fail, the error of the first one is returned.
    pub fn run_all_with_rng<A, R>(
        &self,
        corpus: &SequenceCorpus<A>,
        rng: &mut R,
    ) -> Result<Vec<Motif<A>>, Error>
    where
        A: Alphabet,
        R: Rng + ?Sized,
    {
        self.validate(corpus)?;
        let background = corpus.background()?.smoothed(self.pseudocount);
        let seeds = (0..self.restarts).map(|_| rng.gen()).collect::<Vec<u64>>();

        #[cfg(feature = "parallel")]
        let results = seeds
            .par_iter()
            .enumerate()
            .map(|(i, &seed)| self.restart(corpus, &background, i, seed))
            .collect::<Vec<_>>();
        #[cfg(not(feature = "parallel"))]
        let results = seeds
            .iter()
            .enumerate()
            .map(|(i, &seed)| self.restart(corpus, &background, i, seed))
            .collect::<Vec<_>>();

        results.into_iter().collect()
    }

    /// Run a single restart from the given seed.
    fn restart<A: Alphabet>(
        &self,
        corpus: &SequenceCorpus<A>,
        background: &Background<A>,
        index: usize,
        seed: u64,
    ) -> Result<Motif<A>, Error> {
        log::trace!("restart {} seeded with {}", index + 1, seed);
        let rng = StdRng::seed_from_u64(seed);
        let optimizer = Optimizer::new(corpus, background, self.width, self.strategy, rng)?
            .pseudocounts(self.pseudocount)?
            .max_cycles(self.max_cycles);
        let motif = optimizer.converge()?;
        log::info!(
            "restart {}/{}: found {} with information content {:.6}",
            index + 1,
            self.restarts,
            motif.consensus(),
            motif.information_content()
        );
        Ok(motif)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    use crate::abc::Dna;
    use crate::err::SequenceErrorKind;

    const SEQUENCES: &[&str] = &[
        "CCAGTTGACATAGCTAGCTAGCATATAATCCGA",
        "GATCGTTGACAAGCCTAGGCTAACTATAATGCA",
        "ATTTGACAGGCATCGCCGACTTACGTATAATAG",
        "CGGTTGACATTCAGGCATCGAGCTGTATAATCC",
        "TACGATTGACACGATCGGATCCGATTATAATGG",
    ];

    fn corpus() -> SequenceCorpus<Dna> {
        SequenceCorpus::from_strings(SEQUENCES).unwrap()
    }

    #[test]
    fn zero_restarts() {
        let err = MotifSearch::new(4).restarts(0).run(&corpus()).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn zero_width() {
        let err = MotifSearch::new(0).run(&corpus()).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn invalid_pseudocount() {
        for p in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let err = MotifSearch::new(4).pseudocount(p).run(&corpus()).unwrap_err();
            assert!(matches!(err, Error::InvalidArgument(_)), "p={}", p);
        }
    }

    #[test]
    fn short_sequence() {
        let corpus = SequenceCorpus::<Dna>::from_strings(["ACGTACGT", "ACG"]).unwrap();
        let err = MotifSearch::new(4).seed(1).run(&corpus).unwrap_err();
        assert_eq!(
            err,
            Error::InvalidSequence {
                index: 1,
                kind: SequenceErrorKind::TooShort {
                    length: 3,
                    motif_length: 4
                }
            }
        );
    }

    #[test]
    fn best_of_restarts() {
        let corpus = corpus();
        for strategy in [Strategy::Em, Strategy::Gibbs] {
            let search = MotifSearch::new(6).restarts(5).strategy(strategy).seed(7);
            let all = search.run_all(&corpus).unwrap();
            let best = search.run(&corpus).unwrap();
            assert_eq!(all.len(), 5);
            for motif in all.iter() {
                assert!(best.information_content() >= motif.information_content());
            }
            let first_max = all
                .iter()
                .find(|m| m.information_content() == best.information_content())
                .unwrap();
            assert_eq!(first_max, &best);
        }
    }

    #[test]
    fn reproducible() {
        let corpus = corpus();
        let search = MotifSearch::new(6)
            .restarts(4)
            .strategy(Strategy::Gibbs)
            .seed(123);
        let x = search.run(&corpus).unwrap();
        let y = search.run(&corpus).unwrap();
        assert_eq!(x, y);
    }
}
