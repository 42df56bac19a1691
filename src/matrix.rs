//! Sparse co-occurrence matrices
use std::convert::TryFrom;
use nalgebra_sparse::coo::CooMatrix;
use nalgebra_sparse::csr::CsrMatrix;
use ndarray::prelude::*;
use crate::counts::CountTable;
use crate::errors::*;
use crate::store::{Column, Table};
use crate::vocab::Vocabulary;

/// Rows are targets, columns are contexts, cells are counts
///
/// Cells are held in compressed rows, so a target's row is a contiguous slice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SparseMatrix {
    cells: CsrMatrix<u64>,
}

impl SparseMatrix {
    /// Lay out a table of `(target id, context id)` counts as a matrix
    ///
    /// The shape comes from the vocabularies, so rows and columns of words that were never seen
    /// are still there, just empty.
    pub fn from_counts(counts: CountTable<(u32, u32)>, targets: &Vocabulary, context: &Vocabulary)
        -> Result<SparseMatrix> {
        let shape = (targets.dimension(), context.dimension());
        let entries = counts.into_iter()
            .filter(|&(_, count)| count > 0)
            .map(|((row, col), count)| (row, col, count))
            .collect();
        SparseMatrix::from_triplets(shape, entries)
    }

    /// Build from unordered triplets; every cell may appear only once
    pub fn from_triplets(shape: (usize, usize), entries: Vec<(u32, u32, u64)>) -> Result<SparseMatrix> {
        let n_entries = entries.len();
        let mut rows = Vec::with_capacity(n_entries);
        let mut cols = Vec::with_capacity(n_entries);
        let mut counts = Vec::with_capacity(n_entries);
        for (r, c, n) in entries {
            rows.push(r as usize);
            cols.push(c as usize);
            counts.push(n);
        }
        let coo = CooMatrix::try_from_triplets(shape.0, shape.1, rows, cols, counts)
            .map_err(|err| Error::InvalidDimensions(format!("a {}x{} matrix: {}", shape.0, shape.1, err)))?;
        // duplicates are summed into one cell on conversion
        let cells = CsrMatrix::from(&coo);
        if cells.nnz() != n_entries {
            return Err(Error::InvalidDimensions(format!(
                "{} cells were given but only {} are distinct", n_entries, cells.nnz())));
        }
        Ok(SparseMatrix { cells })
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.cells.nrows(), self.cells.ncols())
    }

    /// Number of nonzero cells
    pub fn nnz(&self) -> usize {
        self.cells.nnz()
    }

    /// (row, column, count) triplets sorted by row then column
    pub fn entries(&self) -> Vec<(u32, u32, u64)> {
        self.cells.triplet_iter()
            .map(|(r, c, &n)| (r as u32, c as u32, n))
            .collect()
    }

    pub fn get(&self, row: u32, col: u32) -> u64 {
        self.cells.get_entry(row as usize, col as usize)
            .map(|entry| entry.into_value())
            .unwrap_or(0)
    }

    /// One row as a dense vector
    pub fn row(&self, row: u32) -> Array1<f64> {
        let mut dense = Array1::zeros(self.cells.ncols());
        if let Some(cells) = self.cells.get_row(row as usize) {
            for (&col, &count) in cells.col_indices().iter().zip(cells.values()) {
                dense[col] = count as f64;
            }
        }
        dense
    }

    /// The whole matrix as a dense array. Only sensible for small vocabularies.
    pub fn to_dense(&self) -> Array2<u64> {
        let mut dense = Array2::zeros(self.shape());
        for (row, col, &count) in self.cells.triplet_iter() {
            dense[[row, col]] = count;
        }
        dense
    }

    /// Columns `id_target`, `id_context` and `count`
    pub fn to_table(&self) -> Result<Table> {
        let (rows, cols, counts) = self.cells.triplet_iter()
            .map(|(r, c, &n)| (r as u64, c as u64, n))
            .fold((vec![], vec![], vec![]), |(mut rows, mut cols, mut counts), (r, c, n)| {
                rows.push(r);
                cols.push(c);
                counts.push(n);
                (rows, cols, counts)
            });
        Table::new()
            .with_column("id_target", Column::Int(rows))?
            .with_column("id_context", Column::Int(cols))?
            .with_column("count", Column::Int(counts))
    }

    pub fn from_table(table: &Table, shape: (usize, usize)) -> Result<SparseMatrix> {
        let rows = table.ints("id_target")?;
        let cols = table.ints("id_context")?;
        let counts = table.ints("count")?;
        let id = |value: u64| u32::try_from(value)
            .map_err(|_| Error::MalformedStore(format!("id {} does not fit in 32 bits", value)));
        let entries = rows.iter().zip(cols).zip(counts)
            .map(|((&r, &c), &n)| -> Result<(u32, u32, u64)> { Ok((id(r)?, id(c)?, n)) })
            .collect::<Result<Vec<_>>>()?;
        SparseMatrix::from_triplets(shape, entries)
    }
}
