//! Alternating optimization of a motif model and its instance locations.

use rand::distributions::Distribution;
use rand::distributions::Uniform;
use rand::Rng;

use super::abc::Alphabet;
use super::abc::Background;
use super::abc::Pseudocounts;
use super::corpus::SequenceCorpus;
use super::err::Error;
use super::locate::Locate;
use super::pwm::CountMatrix;
use super::pwm::FrequencyMatrix;
use super::seq::EncodedSequence;

/// The default pseudocount added to every cell of a frequency matrix.
pub const DEFAULT_PSEUDOCOUNT: f64 = 0.01;

/// The default number of cycles after which a run is considered stuck.
pub const DEFAULT_MAX_CYCLES: usize = 1000;

// --- Motif -------------------------------------------------------------------

/// A motif found in a corpus, with the locations of its instances.
#[derive(Clone, Debug)]
pub struct Motif<A: Alphabet> {
    matrix: FrequencyMatrix<A>,
    starts: Vec<usize>,
    information_content: f64,
}

impl<A: Alphabet> Motif<A> {
    /// The length of the motif.
    #[inline]
    pub fn len(&self) -> usize {
        self.matrix.len()
    }

    /// The frequency matrix of the motif.
    #[inline]
    pub fn matrix(&self) -> &FrequencyMatrix<A> {
        &self.matrix
    }

    /// The start of the motif instance in each sequence.
    ///
    /// These are the locations the frequency matrix was estimated from.
    #[inline]
    pub fn starts(&self) -> &[usize] {
        &self.starts
    }

    /// The information content of the frequency matrix, in bits.
    #[inline]
    pub fn information_content(&self) -> f64 {
        self.information_content
    }

    /// The consensus sequence of the motif.
    pub fn consensus(&self) -> EncodedSequence<A> {
        self.matrix.consensus()
    }

    /// Get the motif instances from the corpus the motif was found in.
    ///
    /// # Panics
    ///
    /// Panics if `corpus` is not the corpus the motif was found in.
    pub fn instances<'c>(&self, corpus: &'c SequenceCorpus<A>) -> Vec<&'c [A::Symbol]> {
        corpus
            .iter()
            .zip(&self.starts)
            .map(|(seq, &start)| seq.window(start, self.len()))
            .collect()
    }

    /// Split the motif into its frequency matrix and instance locations.
    pub fn into_parts(self) -> (FrequencyMatrix<A>, Vec<usize>) {
        (self.matrix, self.starts)
    }
}

impl<A: Alphabet> PartialEq for Motif<A> {
    fn eq(&self, other: &Self) -> bool {
        self.information_content == other.information_content
            && self.starts == other.starts
            && self.matrix == other.matrix
    }
}

// --- Cycle -------------------------------------------------------------------

/// A single estimation cycle of an [`Optimizer`].
#[derive(Clone, Debug)]
pub struct Cycle<A: Alphabet> {
    /// The frequency matrix estimated during this cycle.
    pub matrix: FrequencyMatrix<A>,
    /// The instance locations the frequency matrix was estimated from.
    pub starts: Vec<usize>,
    /// The information content of the frequency matrix.
    pub information_content: f64,
    /// Whether the information content improved over all previous cycles.
    pub improved: bool,
}

// --- Optimizer ---------------------------------------------------------------

/// The state of an [`Optimizer`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum State {
    /// Instance locations were drawn at random, no matrix was estimated yet.
    Seeded,
    /// The last cycle improved the information content.
    Improving,
    /// The last cycle did not improve the information content.
    Converged,
}

/// A single run of alternating motif estimation and instance location.
///
/// Each cycle estimates a frequency matrix from the current instance
/// locations, computes its information content, and, if it improved over
/// all previous cycles, locates new instances with the matrix. The run
/// converges on the first cycle that does not improve the information
/// content.
///
/// The optimizer can be driven cycle by cycle as an [`Iterator`], or run to
/// completion with [`Optimizer::converge`].
#[derive(Debug)]
pub struct Optimizer<'a, A: Alphabet, L: Locate<A>, R: Rng> {
    /// The sequences the motif is searched in.
    corpus: &'a SequenceCorpus<A>,
    /// The background frequencies to compute information content against.
    background: &'a Background<A>,
    /// The strategy to locate motif instances.
    locator: L,
    /// The random number generator.
    rng: R,

    // -- Parameters ----------------------------
    /// The width of the motif being built.
    width: usize,
    /// The pseudocounts used to smooth the frequency matrices.
    pseudocounts: Pseudocounts<A>,
    /// The number of cycles after which to give up.
    max_cycles: usize,

    // -- Internal data -------------------------
    /// The current state of the run.
    state: State,
    /// The current start positions of the motif in each sequence.
    starts: Vec<usize>,
    /// The best motif found so far.
    best: Option<Motif<A>>,
    /// The number of cycles done so far.
    cycles: usize,
}

impl<'a, A, L, R> Optimizer<'a, A, L, R>
where
    A: Alphabet,
    L: Locate<A>,
    R: Rng,
{
    /// Seed a new run with random instance locations.
    ///
    /// Fails if the motif width is zero, if a sequence of the corpus is
    /// shorter than the motif, or if a background frequency is zero.
    pub fn new(
        corpus: &'a SequenceCorpus<A>,
        background: &'a Background<A>,
        width: usize,
        locator: L,
        mut rng: R,
    ) -> Result<Self, Error> {
        corpus.check_motif_length(width)?;
        if background.frequencies().iter().any(|&q| !(q > 0.0)) {
            return Err(Error::InvalidArgument(
                "background frequencies must be strictly positive",
            ));
        }
        let starts = corpus
            .iter()
            .map(|seq| Uniform::new(0, seq.len() - width + 1).sample(&mut rng))
            .collect::<Vec<usize>>();
        log::trace!("seeded instance locations: {:?}", starts);
        Ok(Self {
            corpus,
            background,
            locator,
            rng,
            width,
            pseudocounts: Pseudocounts::from(DEFAULT_PSEUDOCOUNT),
            max_cycles: DEFAULT_MAX_CYCLES,
            state: State::Seeded,
            starts,
            best: None,
            cycles: 0,
        })
    }

    /// Use the given pseudocounts to smooth the frequency matrices.
    ///
    /// Fails unless every pseudocount is finite and strictly positive.
    pub fn pseudocounts<P>(mut self, pseudocounts: P) -> Result<Self, Error>
    where
        P: Into<Pseudocounts<A>>,
    {
        let pseudocounts = pseudocounts.into();
        if pseudocounts
            .counts()
            .iter()
            .any(|&p| !(p > 0.0 && p.is_finite()))
        {
            return Err(Error::InvalidArgument("pseudocount must be strictly positive"));
        }
        self.pseudocounts = pseudocounts;
        Ok(self)
    }

    /// Give up with an error if the run has not converged after `n` cycles.
    pub fn max_cycles(mut self, n: usize) -> Self {
        self.max_cycles = n;
        self
    }

    /// The current state of the run.
    #[inline]
    pub fn state(&self) -> State {
        self.state
    }

    /// The current instance locations.
    #[inline]
    pub fn starts(&self) -> &[usize] {
        &self.starts
    }

    /// The number of cycles done so far.
    #[inline]
    pub fn cycles(&self) -> usize {
        self.cycles
    }

    /// The best motif found so far, if any cycle was done.
    #[inline]
    pub fn best(&self) -> Option<&Motif<A>> {
        self.best.as_ref()
    }

    /// Build a frequency matrix from the current instance locations.
    pub fn estimate(&self) -> Result<FrequencyMatrix<A>, Error> {
        CountMatrix::from_instances(self.corpus, &self.starts, self.width)
            .map(|counts| counts.to_freq(self.pseudocounts.clone()))
    }

    /// Run a single cycle, or return `None` if the run already converged.
    pub fn step(&mut self) -> Result<Option<Cycle<A>>, Error> {
        if self.state == State::Converged {
            return Ok(None);
        }
        if self.cycles >= self.max_cycles {
            return Err(Error::NonTermination {
                cycles: self.cycles,
            });
        }

        // maximization: rebuild the matrix from the current instances
        let matrix = self.estimate()?;
        let information_content = matrix.information_content(self.background);
        let improved = match &self.best {
            None => true,
            Some(best) => information_content > best.information_content,
        };
        self.cycles += 1;
        log::debug!(
            "cycle {}: information content {:.6} ({})",
            self.cycles,
            information_content,
            if improved { "improved" } else { "converged" }
        );

        let starts = self.starts.clone();
        if improved {
            self.best = Some(Motif {
                matrix: matrix.clone(),
                starts: starts.clone(),
                information_content,
            });
            // expectation: locate new instances with the improved matrix
            let pssm = matrix.to_scoring();
            self.starts = self.locator.locate(&pssm, self.corpus, &mut self.rng)?;
            self.state = State::Improving;
        } else {
            self.state = State::Converged;
        }

        Ok(Some(Cycle {
            matrix,
            starts,
            information_content,
            improved,
        }))
    }

    /// Run cycles until convergence and return the best motif.
    ///
    /// The returned motif pairs the frequency matrix with the highest
    /// information content with the instance locations it was estimated
    /// from.
    pub fn converge(mut self) -> Result<Motif<A>, Error> {
        while self.step()?.is_some() {}
        self.best.ok_or(Error::NonTermination {
            cycles: self.cycles,
        })
    }
}

impl<'a, A, L, R> Iterator for Optimizer<'a, A, L, R>
where
    A: Alphabet,
    L: Locate<A>,
    R: Rng,
{
    type Item = Result<Cycle<A>, Error>;
    fn next(&mut self) -> Option<Self::Item> {
        let result = self.step().transpose();
        if let Some(Err(_)) = result {
            self.state = State::Converged;
        }
        result
    }
}

#[cfg(test)]
mod test {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    use crate::abc::Dna;
    use crate::locate::BestWindow;
    use crate::locate::SampledWindow;
    use crate::locate::Strategy;

    const SEQUENCES: &[&str] = &[
        "TTGACAGCTAGCTCAGTCCTAGGTATAATGCTAGC",
        "GCGTTGACAATTAATCATCGGCTCGTATAATGTGTGG",
        "CTTTACACTTTATGCTTCCGGCTCGTATGTTGTGTGG",
        "TTTACGGCTAGCTCAGTCCTAGGTACAATGCTAGC",
        "AAAGTGTGACGCCGTGCAAATAATCAATGTGGAC",
        "TTGACGGCTAGCTCAGTCCTAGGTATAGTGCTAGC",
    ];

    #[test]
    fn converge_identical() {
        let corpus = SequenceCorpus::<Dna>::from_strings(["ACGTACGT"; 5]).unwrap();
        let background = corpus.background().unwrap();
        for seed in 0..20 {
            let rng = StdRng::seed_from_u64(seed);
            let motif = Optimizer::new(&corpus, &background, 4, BestWindow, rng)
                .unwrap()
                .converge()
                .unwrap();
            let instances = motif.instances(&corpus);
            assert!(instances.iter().all(|w| *w == instances[0]));
            assert_eq!(
                motif.consensus(),
                instances[0],
                "seed={} starts={:?}",
                seed,
                motif.starts()
            );
        }
    }

    #[test]
    fn iterate_cycles() {
        let corpus = SequenceCorpus::<Dna>::from_strings(SEQUENCES).unwrap();
        let background = corpus.background().unwrap().smoothed(DEFAULT_PSEUDOCOUNT);
        let rng = StdRng::seed_from_u64(42);
        let optimizer = Optimizer::new(&corpus, &background, 6, Strategy::Em, rng).unwrap();
        assert_eq!(optimizer.state(), State::Seeded);

        let cycles = optimizer.collect::<Result<Vec<_>, _>>().unwrap();
        assert!(!cycles.is_empty());
        let (last, improving) = cycles.split_last().unwrap();
        assert!(!last.improved);
        assert!(improving.iter().all(|c| c.improved));
        for w in improving.windows(2) {
            assert!(w[1].information_content > w[0].information_content);
        }
        if let Some(best) = improving.last() {
            assert!(last.information_content <= best.information_content);
        }
    }

    #[test]
    fn best_matches_its_locations() {
        let corpus = SequenceCorpus::<Dna>::from_strings(SEQUENCES).unwrap();
        let background = corpus.background().unwrap().smoothed(DEFAULT_PSEUDOCOUNT);
        for seed in 0..5 {
            let rng = StdRng::seed_from_u64(seed);
            let motif = Optimizer::new(&corpus, &background, 6, SampledWindow, rng)
                .unwrap()
                .converge()
                .unwrap();
            let matrix = CountMatrix::from_instances(&corpus, motif.starts(), 6)
                .unwrap()
                .to_freq(DEFAULT_PSEUDOCOUNT);
            assert_eq!(&matrix, motif.matrix());
            let ic = matrix.information_content(&background);
            assert_eq!(ic, motif.information_content());
        }
    }

    #[test]
    fn converged_is_terminal() {
        let corpus = SequenceCorpus::<Dna>::from_strings(SEQUENCES).unwrap();
        let background = corpus.background().unwrap().smoothed(DEFAULT_PSEUDOCOUNT);
        let rng = StdRng::seed_from_u64(1);
        let mut optimizer = Optimizer::new(&corpus, &background, 5, BestWindow, rng).unwrap();
        while optimizer.step().unwrap().is_some() {}
        assert_eq!(optimizer.state(), State::Converged);
        let starts = optimizer.starts().to_vec();
        assert!(optimizer.step().unwrap().is_none());
        assert_eq!(optimizer.starts(), starts.as_slice());
    }

    #[test]
    fn non_termination() {
        let corpus = SequenceCorpus::<Dna>::from_strings(SEQUENCES).unwrap();
        let background = corpus.background().unwrap().smoothed(DEFAULT_PSEUDOCOUNT);
        let rng = StdRng::seed_from_u64(1);
        let optimizer = Optimizer::new(&corpus, &background, 5, BestWindow, rng)
            .unwrap()
            .max_cycles(1);
        // the first cycle always improves, so a second one is required
        assert_eq!(
            optimizer.converge().unwrap_err(),
            Error::NonTermination { cycles: 1 }
        );
    }

    #[test]
    fn invalid_pseudocounts() {
        let corpus = SequenceCorpus::<Dna>::from_strings(SEQUENCES).unwrap();
        let background = corpus.background().unwrap().smoothed(DEFAULT_PSEUDOCOUNT);
        for p in [0.0, -0.2, f64::NAN, f64::INFINITY] {
            let rng = StdRng::seed_from_u64(1);
            let result = Optimizer::new(&corpus, &background, 5, Strategy::Em, rng)
                .unwrap()
                .pseudocounts(p);
            assert!(matches!(result, Err(Error::InvalidArgument(_))), "p={}", p);
        }
        let rng = StdRng::seed_from_u64(1);
        let motif = Optimizer::new(&corpus, &background, 5, Strategy::Em, rng)
            .unwrap()
            .pseudocounts(0.5)
            .unwrap()
            .converge()
            .unwrap();
        for row in motif.matrix().matrix().iter() {
            assert!(row.iter().all(|&x| x > 0.0));
        }
    }

    #[test]
    fn zero_background_frequency() {
        let corpus = SequenceCorpus::<Dna>::from_strings(["AACCGG", "ACGACG"]).unwrap();
        let background = corpus.background().unwrap();
        assert_eq!(background.frequencies()[3], 0.0);
        let rng = StdRng::seed_from_u64(0);
        assert!(matches!(
            Optimizer::new(&corpus, &background, 3, Strategy::Em, rng),
            Err(Error::InvalidArgument(_))
        ));
        let smoothed = background.smoothed(DEFAULT_PSEUDOCOUNT);
        let rng = StdRng::seed_from_u64(0);
        assert!(Optimizer::new(&corpus, &smoothed, 3, Strategy::Em, rng).is_ok());
    }

    fn same_motif<A: Alphabet>(x: &Motif<A>, y: &Motif<A>) -> bool {
        x == y
    }

    #[test]
    fn motif_equality() {
        let corpus = SequenceCorpus::<Dna>::from_strings(SEQUENCES).unwrap();
        let background = corpus.background().unwrap().smoothed(DEFAULT_PSEUDOCOUNT);
        let run = |seed| {
            let rng = StdRng::seed_from_u64(seed);
            Optimizer::new(&corpus, &background, 6, Strategy::Gibbs, rng)
                .unwrap()
                .converge()
                .unwrap()
        };
        let x = run(4);
        assert!(same_motif(&x, &run(4)));
        assert!(same_motif(&x, &x.clone()));
    }

    #[test]
    fn invalid_width() {
        let corpus = SequenceCorpus::<Dna>::from_strings(["ACGT", "ACG"]).unwrap();
        let background = corpus.background().unwrap();
        let rng = StdRng::seed_from_u64(0);
        assert!(matches!(
            Optimizer::new(&corpus, &background, 0, BestWindow, rng.clone()),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            Optimizer::new(&corpus, &background, 4, BestWindow, rng),
            Err(Error::InvalidSequence { index: 1, .. })
        ));
    }
}
