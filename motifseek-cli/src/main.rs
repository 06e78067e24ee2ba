use std::fs::File;
use std::io::BufRead;
use std::io::BufReader;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

use clap::Parser;
use env_logger::fmt::Color;
use log::Level;
use log::LevelFilter;
use motifseek::abc::Alphabet;
use motifseek::abc::Dna;
use motifseek::abc::Symbol;
use motifseek::corpus::SequenceCorpus;
use motifseek::em::Motif;
use motifseek::locate::Strategy;
use motifseek::search::MotifSearch;
use motifseek::seq::EncodedSequence;

// --- Error -------------------------------------------------------------------

#[derive(Debug)]
enum Error {
    Io(std::io::Error),
    Search(motifseek::Error),
    InvalidRecord { name: String, symbol: char },
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Io(e) => write!(f, "{}", e),
            Error::Search(e) => write!(f, "{}", e),
            Error::InvalidRecord { name, symbol } => {
                write!(f, "unexpected character {:?} in sequence {:?}", symbol, name)
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            Error::Search(e) => Some(e),
            Error::InvalidRecord { .. } => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Error::Io(error)
    }
}

impl From<motifseek::Error> for Error {
    fn from(error: motifseek::Error) -> Self {
        Error::Search(error)
    }
}

// --- Parameters --------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Parameters {
    /// sequence file to search, in FASTA or with one sequence per line
    sequences: PathBuf,

    /// length of the motif to search
    #[arg(short = 'w', long = "width", required = true)]
    width: usize,

    /// number of independent restarts
    #[arg(short = 'n', long, default_value_t = 1)]
    restarts: usize,

    /// use Gibbs sampling instead of expectation-maximization
    #[arg(long, default_value_t = false)]
    gibbs: bool,

    /// seed for the random number generator
    #[arg(long)]
    seed: Option<u64>,

    /// pseudocount added to every motif frequency
    #[arg(long, default_value_t = motifseek::em::DEFAULT_PSEUDOCOUNT)]
    pseudocount: f64,

    /// number of cycles after which a restart is abandoned
    #[arg(long, default_value_t = motifseek::em::DEFAULT_MAX_CYCLES)]
    max_cycles: usize,

    /// increase logging verbosity
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    verbosity: u8,
}

fn init_logging(verbosity: u8) {
    let filter_level = match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::from_default_env()
        .format(|buf, record| {
            let timestamp = buf.timestamp_seconds();
            let mut style = buf.style();
            match record.level() {
                Level::Error => style.set_color(Color::Red),
                Level::Warn => style.set_color(Color::Yellow),
                Level::Info => style.set_color(Color::Green),
                Level::Debug => style.set_color(Color::Blue),
                Level::Trace => style.set_color(Color::Cyan),
            };
            writeln!(
                buf,
                "{} [{}] - {}",
                timestamp,
                style.value(record.level()),
                record.args()
            )
        })
        .filter_level(filter_level)
        .init();
}

// --- Input -------------------------------------------------------------------

fn open_compressed<P: AsRef<Path>>(path: P) -> Result<Box<dyn BufRead>, std::io::Error> {
    let mut file = File::open(path).map(BufReader::new)?;
    match file.fill_buf()? {
        &[0x1f, 0x8b, ..] => Ok(flate2::read::MultiGzDecoder::new(file))
            .map(BufReader::new)
            .map(|r| Box::new(r) as Box<dyn BufRead>),
        _ => Ok(Box::new(file)),
    }
}

fn encode_record(name: String, sequence: &[u8]) -> Result<EncodedSequence<Dna>, Error> {
    EncodedSequence::encode(sequence).map_err(|e| Error::InvalidRecord { name, symbol: e.0 })
}

fn read_sequences<P: AsRef<Path>>(path: P) -> Result<SequenceCorpus<Dna>, Error> {
    let mut reader = open_compressed(path)?;
    let sequences = if reader.fill_buf()?.starts_with(b">") {
        noodles_fasta::io::Reader::new(reader)
            .records()
            .map(|result| {
                let record = result?;
                let name = String::from_utf8_lossy(record.name()).into_owned();
                encode_record(name, record.sequence().as_ref())
            })
            .collect::<Result<Vec<_>, Error>>()?
    } else {
        reader
            .lines()
            .enumerate()
            .filter_map(|(i, line)| match line {
                Ok(l) if l.trim().is_empty() => None,
                Ok(l) => Some(encode_record(format!("line {}", i + 1), l.trim().as_bytes())),
                Err(e) => Some(Err(Error::Io(e))),
            })
            .collect::<Result<Vec<_>, Error>>()?
    };
    SequenceCorpus::new(sequences).map_err(Error::from)
}

// --- Output ------------------------------------------------------------------

fn write_motif<W: Write>(
    mut out: W,
    motif: &Motif<Dna>,
    corpus: &SequenceCorpus<Dna>,
) -> Result<(), std::io::Error> {
    writeln!(out, "Motif matrix:")?;
    for symbol in Dna::symbols() {
        write!(out, "{}", symbol.as_char())?;
        for position in 0..motif.len() {
            write!(out, " {:.4}", motif.matrix().probability(position, *symbol))?;
        }
        writeln!(out)?;
    }
    writeln!(out)?;
    writeln!(out, "Instances:")?;
    for (instance, start) in motif.instances(corpus).iter().zip(motif.starts()) {
        let window = instance.iter().map(|s| s.as_char()).collect::<String>();
        writeln!(out, "{:>8} {}", start, window)?;
    }
    writeln!(out)?;
    writeln!(out, "Consensus: {}", motif.consensus())?;
    writeln!(
        out,
        "Information content: {:.4} bits",
        motif.information_content()
    )?;
    Ok(())
}

// --- Main --------------------------------------------------------------------

fn run(params: Parameters) -> Result<(), Error> {
    let corpus = read_sequences(&params.sequences)?;
    log::info!(
        "loaded {} sequences from {:?}",
        corpus.len(),
        params.sequences
    );

    let mut search = MotifSearch::new(params.width)
        .restarts(params.restarts)
        .strategy(if params.gibbs {
            Strategy::Gibbs
        } else {
            Strategy::Em
        })
        .pseudocount(params.pseudocount)
        .max_cycles(params.max_cycles);
    if let Some(seed) = params.seed {
        search = search.seed(seed);
    }

    let motif = search.run(&corpus)?;
    let stdout = std::io::stdout();
    write_motif(stdout.lock(), &motif, &corpus)?;
    Ok(())
}

fn main() {
    let params = Parameters::parse();
    init_logging(params.verbosity);
    if let Err(e) = run(params) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}
