//! Evaluate compositional sentence models on verb disambiguation and paraphrasing
//!
//! Sentences are composed from the vectors of a space built by `ds-bnc cooccurrence`, and the
//! cosine similarities of sentence pairs are correlated with human judgements.

// argument parsing
#[macro_use] extern crate clap;
// logging
#[macro_use] extern crate log;

use std::process;
use clap::{Arg, ArgMatches, SubCommand};

use distsem::compose::{CompositionOperator, NounPhraseComposition};
use distsem::datasets::{Gs2011, Gs2012, Ks2013};
use distsem::errors::*;
use distsem::pool::Pool;
use distsem::space::{Space, DEFAULT_SPACE_KEY};
use distsem::wsd::{hilo_means, Similarity, SimilarityReport};

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

fn print_correlation(report: &SimilarityReport) {
    match (report.spearman(), report.p_value()) {
        (Some(rho), Some(p)) => println!("Spearman correlation: rho={:.2}, p={:.2}", rho, p),
        (Some(rho), None) => println!("Spearman correlation: rho={:.2}", rho),
        (None, _) => println!("Spearman correlation is undefined for {} items", report.similarities.len()),
    }
}

pub fn inner_main() -> Result<()> {
    env_logger::init();
    let args = app_from_crate!()
        .args_from_usage(
            "--space <FILE> 'the space file'
             --limit [N] 'use only the first N items of the dataset'")
        .arg(Arg::from_usage("--space-key [KEY] 'key of the space in the file'").default_value(DEFAULT_SPACE_KEY))
        .arg(Arg::from_usage("--operator [OP] 'composition operator'")
            .possible_values(&["kron", "add", "sum", "mult"])
            .default_value("kron"))
        .arg(Arg::from_usage("--workers [N] 'worker threads, 0 for one per CPU'").default_value("0"))
        .subcommand(SubCommand::with_name("gs11")
            .about("Transitive verb disambiguation on GS2011")
            .args_from_usage(
                "--data <FILE> 'the GS2011 dataset'
                 --google-vectors 'drop the items with words missing from the Google vectors'"))
        .subcommand(SubCommand::with_name("gs12")
            .about("Verb disambiguation with adjective-noun phrases on GS2012")
            .arg_from_usage("--data <FILE> 'the GS2012 dataset'")
            .arg(Arg::from_usage("--np-composition [OP] 'how adjectives compose with nouns'")
                .possible_values(&["add", "mult"])
                .default_value("mult")))
        .subcommand(SubCommand::with_name("paraphrasing")
            .about("Sentence paraphrasing on KS2013")
            .args_from_usage(
                "--data <FILE> 'the KS2013 dataset'
                 --google-vectors 'drop the items with words missing from the Google vectors'"))
        .get_matches();

    let limit = if args.is_present("limit") {
        Some(value_t!(args, "limit", usize).unwrap_or_else(|e| e.exit()))
    } else {
        None
    };
    let operator: CompositionOperator = required(&args, "operator")?.parse()?;
    let pool = Pool::new(value_t!(args, "workers", usize).unwrap_or_else(|e| e.exit()))?;

    let space_path = required(&args, "space")?;
    let space = Space::load(space_path, required(&args, "space-key")?)?;
    info!("Loaded a {:?} space from {}, composing with {}.", space.matrix.shape(), space_path, operator);
    let similarity = Similarity::new(&space, &pool, operator);

    match args.subcommand() {
        ("gs11", Some(sub)) => {
            let mut items = Gs2011::read(required(sub, "data")?, limit)?;
            if sub.is_present("google-vectors") {
                items = Gs2011::retain_google_vocabulary(items);
            }
            let report = similarity.gs11(&items)?;
            print_correlation(&report);
            for (hilo, (judgement, cosine)) in hilo_means(&items, &report) {
                println!("{}\tinput={:.3}\tcosine={:.3}", hilo, judgement, cosine);
            }
        }
        ("gs12", Some(sub)) => {
            let np: NounPhraseComposition = required(sub, "np-composition")?.parse()?;
            let items = Gs2012::read(required(sub, "data")?, limit)?;
            print_correlation(&similarity.gs12(&items, np)?);
        }
        ("paraphrasing", Some(sub)) => {
            let mut items = Ks2013::read(required(sub, "data")?, limit)?;
            if sub.is_present("google-vectors") {
                items = Ks2013::retain_google_vocabulary(items);
            }
            print_correlation(&similarity.paraphrasing(&items)?);
        }
        _ => return Err(Error::InvalidConfig("expected a command: gs11, gs12 or paraphrasing".into())),
    }
    Ok(())
}
