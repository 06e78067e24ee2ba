//! Position-specific matrices modelling a motif.
//!
//! A motif model is built in two steps: symbol occurences at each motif
//! position are first tallied into a [`CountMatrix`], which is then turned
//! into a [`FrequencyMatrix`] with pseudocount smoothing. Scanning a
//! sequence for motif instances is done with a [`ScoringMatrix`], which
//! caches the natural logarithm of every probability.

use super::abc::Alphabet;
use super::abc::Background;
use super::abc::Pseudocounts;
use super::abc::Symbol;
use super::corpus::SequenceCorpus;
use super::dense::DenseMatrix;
use super::dense::MatrixCoordinates;
use super::err::Error;
use super::err::InvalidData;
use super::seq::EncodedSequence;

// --- CountMatrix -------------------------------------------------------------

/// A matrix storing symbol occurences at each position.
#[derive(Clone, Debug)]
pub struct CountMatrix<A: Alphabet> {
    /// The alphabet of the count matrix.
    alphabet: std::marker::PhantomData<A>,
    /// The actual counts for each position of the motif.
    data: DenseMatrix<u32, A::K>,
    /// The number of sequences from which this count matrix was obtained.
    n: u32,
}

impl<A: Alphabet> CountMatrix<A> {
    /// Create a new count matrix without checking the contents.
    fn new_unchecked(data: DenseMatrix<u32, A::K>, n: u32) -> Self {
        Self {
            alphabet: std::marker::PhantomData,
            n,
            data,
        }
    }

    /// Create a new count matrix from the given data.
    ///
    /// The matrix must contain count data, for sequences of the same
    /// length, i.e. rows should all sum to the same value.
    pub fn new(data: DenseMatrix<u32, A::K>) -> Result<Self, InvalidData> {
        let mut sums = data.iter().map(|row| row.iter().sum::<u32>());
        let n = match sums.next() {
            // Empty matrices contain valid data.
            None => return Ok(Self::new_unchecked(data, 0)),
            Some(n) => n,
        };
        if sums.any(|s| s != n) {
            return Err(InvalidData);
        }
        Ok(Self::new_unchecked(data, n))
    }

    /// Create a new count matrix from the given aligned sequences.
    pub fn from_sequences<I>(sequences: I) -> Result<Self, InvalidData>
    where
        I: IntoIterator,
        <I as IntoIterator>::Item: AsRef<EncodedSequence<A>>,
    {
        let mut n = 0;
        let mut data: Option<DenseMatrix<u32, A::K>> = None;
        for seq in sequences {
            let seq = seq.as_ref();
            let d = data.get_or_insert_with(|| DenseMatrix::new(seq.len()));
            if seq.len() != d.rows() {
                return Err(InvalidData);
            }
            for (i, x) in seq.iter().enumerate() {
                d[MatrixCoordinates::new(i, x.as_index())] += 1;
            }
            n += 1;
        }
        Ok(Self::new_unchecked(
            data.unwrap_or_else(|| DenseMatrix::new(0)),
            n,
        ))
    }

    /// Tally the motif instances of a corpus at the given locations.
    ///
    /// Every sequence contributes the window of length `m` starting at its
    /// location. Fails if the number of locations does not match the number
    /// of sequences, or if a window does not fit inside its sequence.
    pub fn from_instances(
        corpus: &SequenceCorpus<A>,
        starts: &[usize],
        m: usize,
    ) -> Result<Self, Error> {
        if m == 0 {
            return Err(Error::InvalidArgument("motif length must be positive"));
        }
        if starts.len() != corpus.len() {
            return Err(Error::InvalidArgument(
                "expected exactly one instance location per sequence",
            ));
        }
        let mut data = DenseMatrix::new(m);
        for (seq, &start) in corpus.iter().zip(starts) {
            if !seq.starts(m).contains(&start) {
                return Err(Error::InvalidArgument("instance location out of bounds"));
            }
            for (i, x) in seq.window(start, m).iter().enumerate() {
                data[MatrixCoordinates::new(i, x.as_index())] += 1;
            }
        }
        Ok(Self::new_unchecked(data, starts.len() as u32))
    }

    /// Build a probability matrix from this count matrix using pseudo-counts.
    ///
    /// Counts are first converted to frequencies, then the pseudocounts are
    /// added to every cell and each row is renormalized, so that a strictly
    /// positive pseudocount yields strictly positive probabilities.
    pub fn to_freq<P>(&self, pseudo: P) -> FrequencyMatrix<A>
    where
        P: Into<Pseudocounts<A>>,
    {
        let p = pseudo.into();
        let n = self.n.max(1) as f64;
        let mut probas = DenseMatrix::new(self.data.rows());
        for (src, dst) in self.data.iter().zip(probas.iter_mut()) {
            for (j, &x) in src.iter().enumerate() {
                dst[j] = x as f64 / n + p.counts()[j];
            }
            let s: f64 = dst.iter().sum();
            for x in dst.iter_mut() {
                *x /= s;
            }
        }
        FrequencyMatrix {
            alphabet: std::marker::PhantomData,
            data: probas,
        }
    }

    /// The length of the motif encoded in this count matrix.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.rows()
    }

    /// The number of sequences counted in this matrix.
    #[inline]
    pub fn sequences(&self) -> u32 {
        self.n
    }

    /// The raw counts from the count matrix.
    #[inline]
    pub fn counts(&self) -> &DenseMatrix<u32, A::K> {
        &self.data
    }
}

impl<A: Alphabet> AsRef<DenseMatrix<u32, A::K>> for CountMatrix<A> {
    fn as_ref(&self) -> &DenseMatrix<u32, A::K> {
        &self.data
    }
}

impl<A: Alphabet> PartialEq for CountMatrix<A> {
    fn eq(&self, other: &Self) -> bool {
        self.n == other.n && self.data == other.data
    }
}

impl<A: Alphabet> FromIterator<EncodedSequence<A>> for Result<CountMatrix<A>, InvalidData> {
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = EncodedSequence<A>>,
    {
        CountMatrix::from_sequences(iter)
    }
}

// --- FrequencyMatrix ---------------------------------------------------------

/// A matrix storing symbol probabilities at each position of a motif.
///
/// Rows correspond to motif positions and columns to the alphabet symbols.
#[derive(Clone, Debug)]
pub struct FrequencyMatrix<A: Alphabet> {
    alphabet: std::marker::PhantomData<A>,
    data: DenseMatrix<f64, A::K>,
}

impl<A: Alphabet> FrequencyMatrix<A> {
    /// Create a new frequency matrix from the given probabilities.
    ///
    /// Every row must contain probabilities summing to one.
    pub fn new(data: DenseMatrix<f64, A::K>) -> Result<Self, InvalidData> {
        for row in data.iter() {
            if row.iter().any(|x| !(0.0..=1.0).contains(x)) {
                return Err(InvalidData);
            }
            if (row.iter().sum::<f64>() - 1.0).abs() > 1e-9 {
                return Err(InvalidData);
            }
        }
        Ok(Self {
            alphabet: std::marker::PhantomData,
            data,
        })
    }

    /// The length of the motif encoded in this frequency matrix.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.rows()
    }

    /// The probability of `symbol` at the given motif position.
    #[inline]
    pub fn probability(&self, position: usize, symbol: A::Symbol) -> f64 {
        self.data[MatrixCoordinates::new(position, symbol.as_index())]
    }

    /// The raw probabilities of the frequency matrix.
    #[inline]
    pub fn matrix(&self) -> &DenseMatrix<f64, A::K> {
        &self.data
    }

    /// Compute the natural log-probability of a candidate motif instance.
    pub fn log_score<S>(&self, window: S) -> Result<f64, Error>
    where
        S: AsRef<[A::Symbol]>,
    {
        let window = window.as_ref();
        if window.len() != self.len() {
            return Err(Error::InvalidArgument(
                "window length must match the motif length",
            ));
        }
        Ok(window
            .iter()
            .enumerate()
            .map(|(i, s)| self.probability(i, *s).ln())
            .sum())
    }

    /// Compute the probability of a candidate motif instance.
    ///
    /// This is the product of the probabilities of each symbol at its
    /// position, accumulated in log space to avoid underflow.
    ///
    /// # Example
    /// ```
    /// # use motifseek::abc::Dna;
    /// # use motifseek::pwm::CountMatrix;
    /// # use motifseek::seq::EncodedSequence;
    /// let cm = ["AC", "AG"]
    ///     .iter()
    ///     .map(EncodedSequence::<Dna>::encode)
    ///     .map(Result::unwrap)
    ///     .collect::<Result<CountMatrix<Dna>, _>>()
    ///     .unwrap();
    /// let freq = cm.to_freq(0.0);
    /// let window = EncodedSequence::<Dna>::encode("AC").unwrap();
    /// assert!((freq.score(&window).unwrap() - 0.5).abs() < 1e-12);
    /// ```
    pub fn score<S>(&self, window: S) -> Result<f64, Error>
    where
        S: AsRef<[A::Symbol]>,
    {
        self.log_score(window).map(f64::exp)
    }

    /// The relative entropy of a single motif position against a background.
    pub fn column_information_content(&self, position: usize, background: &Background<A>) -> f64 {
        self.data[position]
            .iter()
            .zip(background.frequencies())
            .filter(|(p, _)| **p > 0.0)
            .map(|(&p, &q)| p * (p / q).log2())
            .sum()
    }

    /// The information content of the motif against a background, in bits.
    ///
    /// This is the sum over all positions of the relative entropy between
    /// the position probabilities and the background frequencies.
    pub fn information_content(&self, background: &Background<A>) -> f64 {
        (0..self.len())
            .map(|i| self.column_information_content(i, background))
            .sum()
    }

    /// Get the consensus sequence of the motif.
    ///
    /// Each position contributes its most probable symbol, ties being
    /// resolved in favour of the symbol that comes first in the alphabet.
    pub fn consensus(&self) -> EncodedSequence<A> {
        let symbols = A::symbols();
        self.data
            .iter()
            .map(|row| {
                let mut best = 0;
                for (j, &p) in row.iter().enumerate() {
                    if p > row[best] {
                        best = j;
                    }
                }
                symbols[best]
            })
            .collect::<Vec<_>>()
            .into()
    }

    /// Get a log-probability scoring matrix for this frequency matrix.
    pub fn to_scoring(&self) -> ScoringMatrix<A> {
        let mut data = self.data.clone();
        for row in data.iter_mut() {
            for item in row.iter_mut() {
                *item = item.ln();
            }
        }
        ScoringMatrix {
            alphabet: std::marker::PhantomData,
            data,
        }
    }
}

impl<A: Alphabet> PartialEq for FrequencyMatrix<A> {
    fn eq(&self, other: &Self) -> bool {
        self.data == other.data
    }
}

impl<A: Alphabet> AsRef<DenseMatrix<f64, A::K>> for FrequencyMatrix<A> {
    fn as_ref(&self) -> &DenseMatrix<f64, A::K> {
        &self.data
    }
}

// --- ScoringMatrix -----------------------------------------------------------

/// A matrix storing the natural log-probability of symbols at each position.
#[derive(Clone, Debug)]
pub struct ScoringMatrix<A: Alphabet> {
    alphabet: std::marker::PhantomData<A>,
    data: DenseMatrix<f64, A::K>,
}

impl<A: Alphabet> ScoringMatrix<A> {
    /// The length of the motif encoded in this scoring matrix.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.rows()
    }

    /// The log-probabilities of the scoring matrix.
    #[inline]
    pub fn weights(&self) -> &DenseMatrix<f64, A::K> {
        &self.data
    }

    /// Score a window, which must have the length of the motif.
    #[inline]
    pub fn score_window(&self, window: &[A::Symbol]) -> f64 {
        debug_assert_eq!(window.len(), self.len());
        window
            .iter()
            .enumerate()
            .map(|(i, s)| self.data[MatrixCoordinates::new(i, s.as_index())])
            .sum()
    }

    /// Compute the log-score of every window of a sequence into a buffer.
    ///
    /// The buffer is cleared first, and receives one score per valid
    /// window start, in order of increasing offset.
    pub fn score_into(&self, seq: &EncodedSequence<A>, scores: &mut Vec<f64>) {
        scores.clear();
        scores.extend(seq.windows(self.len()).map(|w| self.score_window(w)));
    }

    /// Compute the log-score of every window of a sequence.
    pub fn score(&self, seq: &EncodedSequence<A>) -> Vec<f64> {
        let mut scores = Vec::with_capacity(seq.starts(self.len()).len());
        self.score_into(seq, &mut scores);
        scores
    }
}

impl<A: Alphabet> AsRef<DenseMatrix<f64, A::K>> for ScoringMatrix<A> {
    fn as_ref(&self) -> &DenseMatrix<f64, A::K> {
        &self.data
    }
}

impl<A: Alphabet> From<FrequencyMatrix<A>> for ScoringMatrix<A> {
    fn from(freq: FrequencyMatrix<A>) -> Self {
        freq.to_scoring()
    }
}

#[cfg(test)]
mod test {
    use typenum::consts::U4;

    use super::*;

    use crate::abc::Dna;
    use crate::abc::Nucleotide;

    fn corpus() -> SequenceCorpus<Dna> {
        SequenceCorpus::from_strings(["TTACGT", "ACGTTT", "GACGTA"]).unwrap()
    }

    #[test]
    fn test_count_matrix_new() {
        let d = DenseMatrix::<u32, U4>::from_rows([[1, 1, 0, 0], [0, 0, 2, 0]]);
        assert_eq!(CountMatrix::<Dna>::new(d).unwrap().sequences(), 2);
        let d = DenseMatrix::<u32, U4>::from_rows([[1, 1, 0, 0], [0, 0, 1, 0]]);
        assert!(CountMatrix::<Dna>::new(d).is_err());
    }

    #[test]
    fn test_from_instances() {
        let cm = CountMatrix::from_instances(&corpus(), &[2, 0, 1], 4).unwrap();
        assert_eq!(cm.len(), 4);
        assert_eq!(cm.sequences(), 3);
        assert_eq!(&cm.counts()[0], &[3, 0, 0, 0]);
        assert_eq!(&cm.counts()[1], &[0, 3, 0, 0]);
        assert_eq!(&cm.counts()[2], &[0, 0, 3, 0]);
        assert_eq!(&cm.counts()[3], &[0, 0, 0, 3]);
    }

    #[test]
    fn test_from_instances_invalid() {
        assert!(CountMatrix::from_instances(&corpus(), &[0, 0], 4).is_err());
        assert!(CountMatrix::from_instances(&corpus(), &[0, 3, 0], 4).is_err());
    }

    #[test]
    fn test_to_freq() {
        let cm = CountMatrix::from_instances(&corpus(), &[2, 0, 1], 4).unwrap();
        let freq = cm.to_freq(0.01);
        for row in freq.matrix().iter() {
            assert!((row.iter().sum::<f64>() - 1.0).abs() < 1e-12);
            assert!(row.iter().all(|&x| x > 0.0));
        }
        assert!((freq.probability(0, Nucleotide::A) - 1.01 / 1.04).abs() < 1e-12);
        assert!((freq.probability(0, Nucleotide::C) - 0.01 / 1.04).abs() < 1e-12);
    }

    #[test]
    fn test_score() {
        let cm = CountMatrix::from_instances(&corpus(), &[2, 0, 1], 4).unwrap();
        let freq = cm.to_freq(0.01);
        let window = EncodedSequence::<Dna>::encode("ACGT").unwrap();
        let expected = (1.01f64 / 1.04).powi(4);
        assert!((freq.score(&window).unwrap() - expected).abs() < 1e-12);
        let short = EncodedSequence::<Dna>::encode("ACG").unwrap();
        assert!(freq.score(&short).is_err());
    }

    #[test]
    fn test_scoring_matrix() {
        let corpus = corpus();
        let cm = CountMatrix::from_instances(&corpus, &[2, 0, 1], 4).unwrap();
        let freq = cm.to_freq(0.01);
        let pssm = freq.to_scoring();
        let scores = pssm.score(&corpus[0]);
        assert_eq!(scores.len(), 3);
        for (i, &s) in scores.iter().enumerate() {
            let expected = freq.log_score(corpus[0].window(i, 4)).unwrap();
            assert!((s - expected).abs() < 1e-12);
        }
        assert!(scores[2] > scores[0]);
        assert!(scores[2] > scores[1]);
    }

    #[test]
    fn test_information_content() {
        let bg = Background::<Dna>::uniform();
        let cm = CountMatrix::from_instances(&corpus(), &[2, 0, 1], 4).unwrap();
        let ic = cm.to_freq(0.0).information_content(&bg);
        assert!((ic - 8.0).abs() < 1e-12);

        let uniform = DenseMatrix::<f64, U4>::from_rows([[0.25; 4], [0.25; 4]]);
        let freq = FrequencyMatrix::<Dna>::new(uniform).unwrap();
        assert_eq!(freq.information_content(&bg), 0.0);
    }

    #[test]
    fn test_consensus() {
        let cm = CountMatrix::from_instances(&corpus(), &[0, 2, 3], 3).unwrap();
        // TTA, GTT, GTA
        assert_eq!(cm.to_freq(0.01).consensus().to_string(), "GTA");
    }
}
