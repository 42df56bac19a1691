//! A co-occurrence matrix together with the vocabularies that label it
//!
//! In a store, a space saved under `key` is three tables: `key` (the matrix cells),
//! `key/targets` and `key/context`.
use std::path::Path;
use ndarray::prelude::*;
use crate::corpus::Token;
use crate::errors::*;
use crate::matrix::SparseMatrix;
use crate::store::Store;
use crate::vocab::Vocabulary;

pub const DEFAULT_SPACE_KEY: &str = "space";

pub struct Space {
    pub matrix: SparseMatrix,
    pub targets: Vocabulary,
    pub context: Vocabulary,
}

impl Space {
    pub fn new(matrix: SparseMatrix, targets: Vocabulary, context: Vocabulary) -> Result<Space> {
        let expected = (targets.dimension(), context.dimension());
        if matrix.shape() != expected {
            return Err(Error::InvalidDimensions(format!(
                "a {:?} matrix can't be labelled by {:?} vocabularies", matrix.shape(), expected)));
        }
        Ok(Space { matrix, targets, context })
    }

    pub fn write_to_store(&self, store: &mut Store, key: &str) -> Result<()> {
        store.insert(key, self.matrix.to_table()?);
        store.insert(format!("{}/targets", key), self.targets.to_table()?);
        store.insert(format!("{}/context", key), self.context.to_table()?);
        Ok(())
    }

    pub fn from_store(store: &Store, key: &str) -> Result<Space> {
        let targets = Vocabulary::from_table(store.get(&format!("{}/targets", key))?)?;
        let context = Vocabulary::from_table(store.get(&format!("{}/context", key))?)?;
        let shape = (targets.dimension(), context.dimension());
        let matrix = SparseMatrix::from_table(store.get(key)?, shape)?;
        Ok(Space { matrix, targets, context })
    }

    /// Write this space as the only content of a new store at `path`
    pub fn save<P: AsRef<Path>>(&self, path: P, key: &str, compression: u32) -> Result<()> {
        let mut store = Store::new();
        self.write_to_store(&mut store, key)?;
        store.save(path, compression)
    }

    pub fn load<P: AsRef<Path>>(path: P, key: &str) -> Result<Space> {
        Space::from_store(&Store::open(path)?, key)
    }

    /// The row of a target word
    ///
    /// The tag is only used when the targets are tagged.
    pub fn vector(&self, word: &str, tag: &str) -> Result<Array1<f64>> {
        let token = Token::tagged(word, tag);
        match self.targets.id_of(&token) {
            Some(id) => Ok(self.matrix.row(id)),
            None if self.targets.is_tagged() => Err(Error::UnknownWord(token.to_string())),
            None => Err(Error::UnknownWord(word.to_string())),
        }
    }
}
