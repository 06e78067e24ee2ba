#![doc = include_str!("../README.md")]

extern crate generic_array;
extern crate rand;
extern crate typenum;

pub mod abc;
pub mod corpus;
pub mod dense;
pub mod em;
pub mod err;
pub mod locate;
pub mod pwm;
pub mod sampler;
pub mod search;
pub mod seq;

pub use abc::Alphabet;
pub use abc::Background;
pub use abc::Dna;
pub use abc::Nucleotide;
pub use abc::Pseudocounts;
pub use abc::Symbol;
pub use corpus::SequenceCorpus;
pub use dense::DenseMatrix;
pub use em::Motif;
pub use em::Optimizer;
pub use err::Error;
pub use err::InvalidSymbol;
pub use locate::BestWindow;
pub use locate::Locate;
pub use locate::SampledWindow;
pub use locate::Strategy;
pub use pwm::CountMatrix;
pub use pwm::FrequencyMatrix;
pub use pwm::ScoringMatrix;
pub use sampler::CumulativeDistribution;
pub use search::MotifSearch;
pub use seq::EncodedSequence;
