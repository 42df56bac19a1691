//! Count a tagged corpus: co-occurrence matrices and word frequency dictionaries
//!
//! The corpus is read one file at a time by a pool of workers. Nothing is written until the
//! whole corpus is counted, and the output store then appears in one piece.

// argument parsing
#[macro_use] extern crate clap;
// logging
#[macro_use] extern crate log;

use std::process;
use clap::{Arg, ArgMatches, SubCommand};

use distsem::config::{CountingOptions, DictionaryOptions};
use distsem::corpus::{CorpusFormat, BNC_FILEIDS};
use distsem::driver::{dictionary_table, Experiment};
use distsem::errors::*;
use distsem::space::{Space, DEFAULT_SPACE_KEY};
use distsem::store::{Store, DEFAULT_COMPRESSION};
use distsem::vocab::Vocabulary;

pub fn main() {
    // Main can't return a Result, so report the failure and exit non-zero
    if let Err(err) = inner_main() {
        error!("{}", err);
        process::exit(1);
    }
}

fn required<'a>(args: &'a ArgMatches, name: &str) -> Result<&'a str> {
    args.value_of(name).ok_or_else(|| Error::InvalidConfig(format!("--{} is required", name)))
}

fn optional_usize(args: &ArgMatches, name: &str) -> Option<usize> {
    if args.is_present(name) {
        Some(value_t!(args, name, usize).unwrap_or_else(|e| e.exit()))
    } else {
        None
    }
}

/// A word list, or the top of a frequency dictionary when a dictionary key is given
fn open_vocabulary(path: &str, dictionary_key: Option<&str>, size: Option<usize>) -> Result<Vocabulary> {
    let vocabulary = match dictionary_key {
        Some(key) => Vocabulary::from_dictionary(Store::open(path)?.get(key)?, size)?,
        None => Vocabulary::from_wordlist(path)?,
    };
    info!("Read {} entries from {}.", vocabulary.len(), path);
    Ok(vocabulary)
}

fn cooccurrence(experiment: &Experiment, args: &ArgMatches) -> Result<()> {
    let options = CountingOptions {
        window_size: value_t!(args, "window-size", usize).unwrap_or_else(|e| e.exit()),
        chunk_size: value_t!(args, "chunk-size", usize).unwrap_or_else(|e| e.exit()),
        batch_size: value_t!(args, "batch-size", usize).unwrap_or_else(|e| e.exit()),
        stem: args.is_present("stem"),
    };
    options.validate()?;
    let dictionary_key = args.value_of("dictionary-key");
    let targets = open_vocabulary(required(args, "targets")?, dictionary_key, optional_usize(args, "targets-size"))?;
    let context = open_vocabulary(required(args, "context")?, dictionary_key, optional_usize(args, "context-size"))?;

    let matrix = experiment.cooccurrence(&targets, &context, &options)?;
    info!("The matrix is {:?} with {} nonzero cells.", matrix.shape(), matrix.nnz());

    let output = required(args, "output")?;
    let key = required(args, "space-key")?;
    Space::new(matrix, targets, context)?.save(output, key, DEFAULT_COMPRESSION)?;
    info!("Wrote the space to {} under {}.", output, key);
    Ok(())
}

fn dictionary(experiment: &Experiment, args: &ArgMatches) -> Result<()> {
    let options = DictionaryOptions {
        c5: args.is_present("c5"),
        stem: args.is_present("stem"),
        omit_tags: args.is_present("omit-tags"),
        chunk_size: value_t!(args, "chunk-size", usize).unwrap_or_else(|e| e.exit()),
        batch_size: value_t!(args, "batch-size", usize).unwrap_or_else(|e| e.exit()),
    };
    let words = experiment.dictionary(&options)?;
    let n_words = words.len();

    let mut store = Store::new();
    let key = required(args, "dictionary-key")?;
    store.insert(key, dictionary_table(words, options.omit_tags)?);
    let output = required(args, "output")?;
    store.save(output, DEFAULT_COMPRESSION)?;
    info!("Wrote {} words to {} under {}.", n_words, output, key);
    Ok(())
}

pub fn inner_main() -> Result<()> {
    env_logger::init();
    let reduction = |subcommand: clap::App<'static, 'static>| subcommand
        .arg(Arg::from_usage("--chunk-size [N] 'tables summed by one task at the reduce stage'").default_value("7"))
        .arg(Arg::from_usage("--batch-size [N] 'files counted before their tables are summed'").default_value("100"))
        .arg(Arg::from_usage("--stem 'use headwords instead of the words as written'"));
    let args = app_from_crate!()
        .arg(Arg::from_usage("--bnc [DIR] 'path to the corpus'").default_value("corpora/BNC/Texts"))
        .arg(Arg::from_usage("--fileids [REGEX] 'files of the corpus to read'").default_value(BNC_FILEIDS))
        .arg(Arg::from_usage("--format [FORMAT] 'corpus layout'")
            .possible_values(&["bnc", "plain"])
            .default_value("bnc"))
        .arg(Arg::from_usage("--workers [N] 'worker threads, 0 for one per CPU'").default_value("0"))
        .subcommand(reduction(SubCommand::with_name("cooccurrence")
            .about("Build the co-occurrence matrix")
            .args_from_usage(
                "--targets <FILE> 'target words, one per line (or a dictionary store)'
                 --context <FILE> 'context words, one per line (or a dictionary store)'
                 --dictionary-key [KEY] 'read targets and contexts from dictionaries under this key'
                 --targets-size [N] 'how many dictionary words become targets'
                 --context-size [N] 'how many dictionary words become contexts'")
            .arg(Arg::from_usage("--window-size [N] 'largest distance between co-occurring words'").default_value("5"))
            .arg(Arg::from_usage("-o, --output [FILE] 'the output matrix file'").default_value("matrix.store"))
            .arg(Arg::from_usage("--space-key [KEY] 'key of the space in the output'").default_value(DEFAULT_SPACE_KEY))))
        .subcommand(reduction(SubCommand::with_name("dictionary")
            .about("Extract word frequencies from the corpus")
            .args_from_usage(
                "--dictionary-key <KEY> 'key of the dictionary in the output'
                 --c5 'use the more detailed C5 tags'
                 --omit-tags 'count words regardless of their tag'")
            .arg(Arg::from_usage("-o, --output [FILE] 'the output file'").default_value("dictionary.store"))))
        .get_matches();

    let format: CorpusFormat = required(&args, "format")?.parse()?;
    let corpus = format.open(required(&args, "bnc")?, required(&args, "fileids")?)?;
    let workers = value_t!(args, "workers", usize).unwrap_or_else(|e| e.exit());
    let experiment = Experiment::new(corpus, workers)?;

    match args.subcommand() {
        ("cooccurrence", Some(sub)) => cooccurrence(&experiment, sub),
        ("dictionary", Some(sub)) => dictionary(&experiment, sub),
        _ => Err(Error::InvalidConfig("expected a command: cooccurrence or dictionary".into())),
    }
}
