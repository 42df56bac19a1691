//! Composing word vectors into phrase and sentence vectors
use std::fmt;
use std::str::FromStr;
use ndarray::prelude::*;
use crate::errors::*;

/// How a transitive sentence is built from its subject, verb and object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompositionOperator {
    /// The verb matrix `v ⊗ v` weighted by `s ⊗ o`
    Kron,
    Add,
    Mult,
}

impl Default for CompositionOperator {
    fn default() -> Self {
        CompositionOperator::Kron
    }
}

impl FromStr for CompositionOperator {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "kron" => Ok(CompositionOperator::Kron),
            "add" | "sum" => Ok(CompositionOperator::Add),
            "mult" => Ok(CompositionOperator::Mult),
            other => Err(Error::InvalidConfig(format!(
                "unknown composition operator {:?}, expected kron, add or mult", other))),
        }
    }
}

impl fmt::Display for CompositionOperator {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match *self {
            CompositionOperator::Kron => "kron",
            CompositionOperator::Add => "add",
            CompositionOperator::Mult => "mult",
        })
    }
}

impl CompositionOperator {
    /// What a verb contributes to every sentence it appears in
    ///
    /// Worth computing once per verb: for `Kron` it is `n²` long.
    pub fn verb_vector(self, verb: &Array1<f64>) -> Array1<f64> {
        match self {
            CompositionOperator::Kron => kron(verb, verb),
            CompositionOperator::Add | CompositionOperator::Mult => verb.clone(),
        }
    }

    /// Sentence vector of `subject verb object`, where `verb` came from `verb_vector`
    pub fn transitive(self, subject: &Array1<f64>, verb: &Array1<f64>, object: &Array1<f64>)
        -> Result<Array1<f64>> {
        same_len(subject, object)?;
        match self {
            CompositionOperator::Kron => {
                let subject_object = kron(subject, object);
                same_len(verb, &subject_object)?;
                Ok(verb * &subject_object)
            }
            CompositionOperator::Mult => {
                same_len(verb, subject)?;
                Ok(verb * subject * object)
            }
            CompositionOperator::Add => {
                same_len(verb, subject)?;
                Ok(verb + subject + object)
            }
        }
    }
}

/// How an adjective modifies a noun
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NounPhraseComposition {
    Add,
    Mult,
}

impl Default for NounPhraseComposition {
    fn default() -> Self {
        NounPhraseComposition::Mult
    }
}

impl FromStr for NounPhraseComposition {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "add" => Ok(NounPhraseComposition::Add),
            "mult" => Ok(NounPhraseComposition::Mult),
            other => Err(Error::InvalidConfig(format!(
                "unknown noun phrase composition {:?}, expected add or mult", other))),
        }
    }
}

impl fmt::Display for NounPhraseComposition {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match *self {
            NounPhraseComposition::Add => "add",
            NounPhraseComposition::Mult => "mult",
        })
    }
}

impl NounPhraseComposition {
    pub fn compose(self, adjective: &Array1<f64>, noun: &Array1<f64>) -> Result<Array1<f64>> {
        same_len(adjective, noun)?;
        Ok(match self {
            NounPhraseComposition::Add => adjective + noun,
            NounPhraseComposition::Mult => adjective * noun,
        })
    }
}

fn same_len(a: &Array1<f64>, b: &Array1<f64>) -> Result<()> {
    if a.len() == b.len() {
        Ok(())
    } else {
        Err(Error::InvalidDimensions(format!("can't combine vectors of length {} and {}", a.len(), b.len())))
    }
}

/// Kronecker product of two vectors: `a[i] * b[j]` at `i * b.len() + j`
pub fn kron(a: &Array1<f64>, b: &Array1<f64>) -> Array1<f64> {
    let width = b.len();
    Array1::from_shape_fn(a.len() * width, |k| a[k / width] * b[k % width])
}

/// Cosine of the angle between two vectors, or 0 if either of them is all zeros
pub fn cosine_similarity(a: &Array1<f64>, b: &Array1<f64>) -> Result<f64> {
    same_len(a, b)?;
    let norms = a.dot(a).sqrt() * b.dot(b).sqrt();
    if norms == 0.0 {
        Ok(0.0)
    } else {
        Ok(a.dot(b) / norms)
    }
}
