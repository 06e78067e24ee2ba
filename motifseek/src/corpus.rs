//! Validated collection of the sequences searched for a motif.

use std::ops::Index;

use generic_array::GenericArray;

use super::abc::Alphabet;
use super::abc::Background;
use super::err::Error;
use super::err::SequenceErrorKind;
use super::seq::EncodedSequence;
use super::seq::SymbolCount;

/// An ordered, non-empty collection of encoded sequences.
#[derive(Clone, Debug)]
pub struct SequenceCorpus<A: Alphabet> {
    sequences: Vec<EncodedSequence<A>>,
}

impl<A: Alphabet> SequenceCorpus<A> {
    /// Create a new corpus from already encoded sequences.
    pub fn new(sequences: Vec<EncodedSequence<A>>) -> Result<Self, Error> {
        if sequences.is_empty() {
            return Err(Error::InvalidArgument("corpus must contain at least one sequence"));
        }
        Ok(Self { sequences })
    }

    /// Encode a corpus from textual sequences.
    ///
    /// Fails on the first sequence containing a character outside of
    /// the alphabet, reporting its position in the input.
    ///
    /// # Example
    /// ```
    /// # use motifseek::abc::Dna;
    /// # use motifseek::corpus::SequenceCorpus;
    /// let corpus = SequenceCorpus::<Dna>::from_strings(["ACGT", "TTGCA"]).unwrap();
    /// assert_eq!(corpus.len(), 2);
    /// assert!(SequenceCorpus::<Dna>::from_strings(["ACGT", "ANGT"]).is_err());
    /// ```
    pub fn from_strings<I>(sequences: I) -> Result<Self, Error>
    where
        I: IntoIterator,
        <I as IntoIterator>::Item: AsRef<[u8]>,
    {
        sequences
            .into_iter()
            .enumerate()
            .map(|(i, s)| EncodedSequence::encode(s).map_err(|e| Error::invalid_symbol(i, e)))
            .collect::<Result<Vec<_>, _>>()
            .and_then(Self::new)
    }

    /// The number of sequences in the corpus.
    #[inline]
    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    /// Always `false`, a corpus cannot be empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }

    /// Iterate over the sequences of the corpus.
    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, EncodedSequence<A>> {
        self.sequences.iter()
    }

    /// View the sequences of the corpus as a slice.
    #[inline]
    pub fn sequences(&self) -> &[EncodedSequence<A>] {
        &self.sequences
    }

    /// Check that every sequence can hold a motif of length `m`.
    pub fn check_motif_length(&self, m: usize) -> Result<(), Error> {
        if m == 0 {
            return Err(Error::InvalidArgument("motif length must be positive"));
        }
        match self.sequences.iter().position(|s| s.len() < m) {
            None => Ok(()),
            Some(index) => Err(Error::InvalidSequence {
                index,
                kind: SequenceErrorKind::TooShort {
                    length: self.sequences[index].len(),
                    motif_length: m,
                },
            }),
        }
    }

    /// Count the occurences of each symbol across the whole corpus.
    pub fn symbol_counts(&self) -> GenericArray<usize, A::K> {
        let mut counts = GenericArray::<usize, A::K>::default();
        for seq in self.sequences.iter() {
            for (total, c) in counts.iter_mut().zip(seq.count_symbols()) {
                *total += c;
            }
        }
        counts
    }

    /// Compute the empirical background frequencies of the corpus.
    pub fn background(&self) -> Result<Background<A>, Error> {
        Background::from_counts(&self.symbol_counts()).map_err(Error::from)
    }
}

impl<A: Alphabet> Index<usize> for SequenceCorpus<A> {
    type Output = EncodedSequence<A>;
    fn index(&self, index: usize) -> &Self::Output {
        &self.sequences[index]
    }
}

impl<'a, A: Alphabet> IntoIterator for &'a SequenceCorpus<A> {
    type Item = &'a EncodedSequence<A>;
    type IntoIter = std::slice::Iter<'a, EncodedSequence<A>>;
    fn into_iter(self) -> Self::IntoIter {
        self.sequences.iter()
    }
}

impl<A: Alphabet> AsRef<[EncodedSequence<A>]> for SequenceCorpus<A> {
    fn as_ref(&self) -> &[EncodedSequence<A>] {
        &self.sequences
    }
}
