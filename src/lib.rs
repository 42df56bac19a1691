//! Distributional semantics from tagged corpora
//!
//! Counts windowed word co-occurrences over a corpus in parallel, stores them as labelled sparse
//! matrices, and evaluates compositional models of sentence meaning against human judgements.
//! The modules are shared by the included binaries, `ds-bnc` for counting and `ds-wsd` for the
//! experiments.

#[macro_use] extern crate log;
pub mod errors;
pub mod farm;
pub mod counts;
pub mod corpus;
pub mod window;
pub mod vocab;
pub mod pool;
pub mod reduce;
pub mod config;
pub mod driver;
pub mod matrix;
pub mod store;
pub mod space;
pub mod compose;
pub mod stats;
pub mod datasets;
pub mod wsd;
