extern crate motifseek;
extern crate rand;

use motifseek::abc::Dna;
use motifseek::corpus::SequenceCorpus;
use motifseek::em::Optimizer;
use motifseek::em::DEFAULT_PSEUDOCOUNT;
use motifseek::err::Error;
use motifseek::err::SequenceErrorKind;
use motifseek::locate::Strategy;
use motifseek::search::MotifSearch;

use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;

// the same motif planted at a different offset in each sequence
const PLANTED: &[&str] = &["GATTACACCC", "CGATTACACC", "CCGATTACAC", "CCCGATTACA"];

const PROMOTERS: &[&str] = &[
    "CCAGTTGACATAGCTAGCTAGCATATAATCCGA",
    "GATCGTTGACAAGCCTAGGCTAACTATAATGCA",
    "ATTTGACAGGCATCGCCGACTTACGTATAATAG",
    "CGGTTGACATTCAGGCATCGAGCTGTATAATCC",
    "TACGATTGACACGATCGGATCCGATTATAATGG",
];

mod em {
    use super::*;

    #[test]
    fn identical_sequences() {
        let corpus = SequenceCorpus::<Dna>::from_strings(["ACGTACGT"; 6]).unwrap();
        for seed in 0..10 {
            let motif = MotifSearch::new(4).seed(seed).run(&corpus).unwrap();
            let instances = motif.instances(&corpus);
            assert!(instances.iter().all(|w| *w == instances[0]));
            assert_eq!(motif.consensus(), instances[0]);
        }
    }

    #[test]
    fn planted_motif() {
        let corpus = SequenceCorpus::<Dna>::from_strings(PLANTED).unwrap();
        let motif = MotifSearch::new(7)
            .restarts(50)
            .seed(42)
            .run(&corpus)
            .unwrap();
        assert_eq!(motif.consensus().to_string(), "GATTACA");
        assert_eq!(motif.starts(), &[0, 1, 2, 3]);
    }
}

mod gibbs {
    use super::*;

    #[test]
    fn planted_motif() {
        let corpus = SequenceCorpus::<Dna>::from_strings(PLANTED).unwrap();
        let motif = MotifSearch::new(7)
            .strategy(Strategy::Gibbs)
            .restarts(100)
            .seed(42)
            .run(&corpus)
            .unwrap();
        assert_eq!(motif.consensus().to_string(), "GATTACA");
        assert_eq!(motif.starts(), &[0, 1, 2, 3]);
    }

    #[test]
    fn reproducible() {
        let corpus = SequenceCorpus::<Dna>::from_strings(PROMOTERS).unwrap();
        let search = MotifSearch::new(6)
            .strategy(Strategy::Gibbs)
            .restarts(3)
            .seed(5);
        assert_eq!(search.run(&corpus).unwrap(), search.run(&corpus).unwrap());
    }
}

#[test]
fn best_of_five_restarts() {
    let corpus = SequenceCorpus::<Dna>::from_strings(PROMOTERS).unwrap();
    for strategy in [Strategy::Em, Strategy::Gibbs] {
        let search = MotifSearch::new(6).strategy(strategy).restarts(5).seed(11);
        let best = search.run(&corpus).unwrap();
        let all = search.run_all(&corpus).unwrap();
        assert_eq!(all.len(), 5);
        assert!(all
            .iter()
            .all(|m| best.information_content() >= m.information_content()));
        assert!(all.contains(&best));
    }
}

#[test]
fn restarts_match_sequential_replay() {
    let corpus = SequenceCorpus::<Dna>::from_strings(PROMOTERS).unwrap();
    let background = corpus.background().unwrap().smoothed(DEFAULT_PSEUDOCOUNT);
    let search = MotifSearch::new(6)
        .strategy(Strategy::Gibbs)
        .restarts(8)
        .seed(21);
    let all = search.run_all(&corpus).unwrap();

    let mut master = StdRng::seed_from_u64(21);
    let seeds = (0..8).map(|_| master.gen()).collect::<Vec<u64>>();
    let replay = seeds
        .into_iter()
        .map(|seed| {
            let rng = StdRng::seed_from_u64(seed);
            Optimizer::new(&corpus, &background, 6, Strategy::Gibbs, rng)
                .unwrap()
                .pseudocounts(DEFAULT_PSEUDOCOUNT)
                .unwrap()
                .converge()
                .unwrap()
        })
        .collect::<Vec<_>>();
    assert_eq!(all, replay);
}

#[test]
fn lowercase_sequences() {
    let upper = SequenceCorpus::<Dna>::from_strings(PLANTED).unwrap();
    let lower = SequenceCorpus::<Dna>::from_strings(
        PLANTED.iter().map(|s| s.to_ascii_lowercase()),
    )
    .unwrap();
    let search = MotifSearch::new(7).restarts(10).seed(3);
    assert_eq!(search.run(&upper).unwrap(), search.run(&lower).unwrap());
}

#[test]
fn zero_restarts() {
    let corpus = SequenceCorpus::<Dna>::from_strings(PROMOTERS).unwrap();
    assert!(matches!(
        MotifSearch::new(6).restarts(0).run(&corpus),
        Err(Error::InvalidArgument(_))
    ));
}

#[test]
fn sequence_too_short() {
    let corpus = SequenceCorpus::<Dna>::from_strings(["ACGTACGTAC", "ACGTA", "ACGTACG"]).unwrap();
    assert_eq!(
        MotifSearch::new(6).seed(0).run(&corpus).unwrap_err(),
        Error::InvalidSequence {
            index: 1,
            kind: SequenceErrorKind::TooShort {
                length: 5,
                motif_length: 6,
            },
        }
    );
}

#[test]
fn invalid_symbol() {
    let err = SequenceCorpus::<Dna>::from_strings(["ACGT", "ACNT"]).unwrap_err();
    assert_eq!(
        err,
        Error::InvalidSequence {
            index: 1,
            kind: SequenceErrorKind::InvalidSymbol('N'),
        }
    );
}
