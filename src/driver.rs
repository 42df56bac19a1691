//! Running counting tasks over a whole corpus
//!
//! The files of a corpus are processed in batches. Every file of a batch is counted by its own
//! task on the pool, the batch's tables are summed with [`sum_tables`](../reduce/fn.sum_tables.html)
//! and the sum is added to a running total. Only one batch worth of partial tables is alive at a
//! time.
use std::hash::Hash;
use crate::config::{CountingOptions, DictionaryOptions};
use crate::corpus::{CorpusReader, ReadOptions, Token};
use crate::counts::CountTable;
use crate::errors::*;
use crate::matrix::SparseMatrix;
use crate::pool::Pool;
use crate::reduce::sum_tables;
use crate::store::{Column, Table};
use crate::vocab::Vocabulary;
use crate::window::{count_cooccurrence, restrict};

/// Count every file in `subunits` with `task` and add up the results
///
/// A failing task is logged with the file it was reading and ends the run. An empty list of
/// files gives an empty table.
pub fn count_corpus<K, F>(pool: &Pool, subunits: &[String], batch_size: usize, chunk_size: usize, task: F)
    -> Result<CountTable<K>>
    where K: Hash + Eq + Send, F: Fn(&str) -> Result<CountTable<K>> + Sync {
    if batch_size == 0 {
        return Err(Error::InvalidConfig("the batch size must be at least 1".into()));
    }
    let mut records = CountTable::new();
    let n_batches = (subunits.len() + batch_size - 1) / batch_size;
    for (batch_i, batch) in subunits.chunks(batch_size).enumerate() {
        let results = pool.map_unordered(batch.iter().map(String::as_str).collect(), |fileid| {
            debug!("Processing {}", fileid);
            let result = task(fileid);
            if let Err(ref err) = result {
                error!("Could not process {}: {}", fileid, err);
            }
            result
        });
        let tables = results.into_iter().collect::<Result<Vec<_>>>()?;
        records.merge(sum_tables(tables, pool, chunk_size)?);
        debug!("There are {} records so far, after batch {} of {}.", records.len(), batch_i + 1, n_batches);
    }
    Ok(records)
}

/// Count the co-occurrences in one file, keeping only known targets and contexts
pub fn cooccurrence_task(
    corpus: &dyn CorpusReader,
    fileid: &str,
    targets: &Vocabulary,
    context: &Vocabulary,
    options: &CountingOptions,
) -> Result<CountTable<(u32, u32)>> {
    let tokens = corpus.tokens_of(fileid, &ReadOptions { stem: options.stem, c5: false })?;
    Ok(restrict(count_cooccurrence(&tokens, options.window_size), targets, context))
}

/// Count the words of one file
pub fn words_task(corpus: &dyn CorpusReader, fileid: &str, options: &DictionaryOptions)
    -> Result<CountTable<Token>> {
    let read = ReadOptions { stem: options.stem, c5: options.c5 };
    let tokens = corpus.tokens_of(fileid, &read)?;
    Ok(tokens.into_iter()
        .map(|token| if options.omit_tags { token.untagged() } else { token })
        .map(|token| (token, 1))
        .collect())
}

/// Everything a counting run needs, set up once
pub struct Experiment {
    pub pool: Pool,
    pub corpus: Box<dyn CorpusReader>,
}

impl Experiment {
    pub fn new(corpus: Box<dyn CorpusReader>, workers: usize) -> Result<Experiment> {
        let pool = Pool::new(workers)?;
        info!("Using {} workers for {} files.", pool.size(), corpus.fileids().len());
        Ok(Experiment { pool, corpus })
    }

    /// Build the co-occurrence matrix of the whole corpus
    pub fn cooccurrence(&self, targets: &Vocabulary, context: &Vocabulary, options: &CountingOptions)
        -> Result<SparseMatrix> {
        options.validate()?;
        let fileids = self.corpus.fileids();
        if fileids.is_empty() {
            warn!("The corpus has no files, the matrix will be empty.");
        }
        info!("Counting co-occurrences of {} targets with {} contexts.", targets.len(), context.len());
        let corpus = self.corpus.as_ref();
        let records = count_corpus(&self.pool, fileids, options.batch_size, options.chunk_size, |fileid| {
            cooccurrence_task(corpus, fileid, targets, context, options)
        })?;
        SparseMatrix::from_counts(records, targets, context)
    }

    /// Count every word of the corpus
    pub fn dictionary(&self, options: &DictionaryOptions) -> Result<CountTable<Token>> {
        options.validate()?;
        let corpus = self.corpus.as_ref();
        let words = count_corpus(&self.pool, corpus.fileids(), options.batch_size, options.chunk_size, |fileid| {
            words_task(corpus, fileid, options)
        })?;
        debug!("The final table contains {} items.", words.len());
        Ok(words)
    }
}

/// Lay out word counts as a dictionary table, most frequent first
///
/// Columns are `ngram`, `tag` and `count`. The tag column is left out with `omit_tags`, or when no
/// word has a tag. Equal counts are ordered by word.
pub fn dictionary_table(words: CountTable<Token>, omit_tags: bool) -> Result<Table> {
    let mut rows: Vec<(Token, u64)> = words.into_iter().collect();
    rows.sort_unstable_by(|(a, m), (b, n)| n.cmp(m).then_with(|| a.cmp(b)));

    let counts = rows.iter().map(|&(_, n)| n).collect();
    let any_tags = rows.iter().any(|(t, _)| t.tag.is_some());
    let tags: Vec<String> = rows.iter().map(|(t, _)| t.tag.clone().unwrap_or_default()).collect();
    let ngrams = rows.into_iter().map(|(t, _)| t.form).collect();

    let mut table = Table::new().with_column("ngram", Column::Text(ngrams))?;
    if any_tags && !omit_tags {
        table = table.with_column("tag", Column::Text(tags))?;
    }
    table.with_column("count", Column::Int(counts))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A corpus kept in memory; files named `broken*` can't be read
    struct Sentences {
        fileids: Vec<String>,
        text: Vec<Vec<Token>>,
    }

    impl Sentences {
        fn new(files: &[&[(&str, &str)]]) -> Sentences {
            Sentences {
                fileids: (0..files.len()).map(|i| format!("f{:03}", i)).collect(),
                text: files.iter()
                    .map(|words| words.iter().map(|&(w, t)| Token::tagged(w, t)).collect())
                    .collect(),
            }
        }
    }

    impl CorpusReader for Sentences {
        fn fileids(&self) -> &[String] {
            &self.fileids
        }

        fn tokens_of(&self, fileid: &str, options: &ReadOptions) -> Result<Vec<Token>> {
            if fileid.starts_with("broken") {
                return Err(Error::SubunitRead { subunit: fileid.into(), reason: "bad XML".into() });
            }
            let i: usize = fileid[1..].parse().map_err(|_| Error::Other(fileid.into()))?;
            Ok(self.text[i].iter()
                .map(|t| if options.stem { Token { form: t.form.to_lowercase(), tag: t.tag.clone() } } else { t.clone() })
                .collect())
        }
    }

    const SENTENCE: &[(&str, &str)] = &[
        ("the", "N"), ("cat", "N"), ("sat", "V"), ("on", "P"), ("the", "N"), ("mat", "N"),
    ];

    fn vocab(words: &[&str]) -> Vocabulary {
        Vocabulary::from_tokens(words.iter().map(|w| Token::new(*w)).collect()).unwrap()
    }

    fn experiment(corpus: Sentences) -> Experiment {
        Experiment::new(Box::new(corpus), 3).unwrap()
    }

    #[test]
    fn one_file_gives_the_restricted_counts() {
        let exp = experiment(Sentences::new(&[SENTENCE]));
        let options = CountingOptions { window_size: 1, ..Default::default() };
        let matrix = exp.cooccurrence(&vocab(&["cat", "sat"]), &vocab(&["the", "on"]), &options).unwrap();
        assert_eq!(matrix.entries(), &[(0, 0, 1), (1, 1, 1)]);
        assert_eq!(matrix.shape(), (2, 2));
    }

    #[test]
    fn batches_and_chunks_do_not_change_the_total() {
        let files: Vec<&[(&str, &str)]> = (0..23).map(|_| SENTENCE).collect();
        let targets = vocab(&["the", "cat", "sat", "on", "mat"]);
        let context = vocab(&["the", "cat", "sat", "on", "mat"]);

        let mut previous: Option<SparseMatrix> = None;
        for &(batch_size, chunk_size) in &[(1, 2), (5, 3), (100, 7), (23, 23)] {
            let exp = experiment(Sentences::new(&files));
            let options = CountingOptions { window_size: 2, batch_size, chunk_size, stem: false };
            let matrix = exp.cooccurrence(&targets, &context, &options).unwrap();
            // (the, the) is 4 apart, out of a window of 2
            assert_eq!(matrix.get(0, 0), 0);
            // (cat, sat) once per file
            assert_eq!(matrix.get(1, 2), 23);
            if let Some(ref m) = previous {
                assert_eq!(m, &matrix);
            }
            previous = Some(matrix);
        }
    }

    #[test]
    fn one_unreadable_file_fails_the_run() {
        let mut corpus = Sentences::new(&[SENTENCE, SENTENCE]);
        corpus.fileids.push("broken.xml".into());
        let exp = experiment(corpus);
        let result = exp.cooccurrence(&vocab(&["cat"]), &vocab(&["the"]), &CountingOptions::default());
        match result {
            Err(Error::SubunitRead { subunit, .. }) => assert_eq!(subunit, "broken.xml"),
            other => panic!("expected a read failure, got {:?}", other.map(|m| m.nnz())),
        }
    }

    #[test]
    fn an_empty_corpus_gives_an_empty_matrix() {
        let exp = experiment(Sentences::new(&[]));
        let matrix = exp.cooccurrence(&vocab(&["cat"]), &vocab(&["the"]), &CountingOptions::default()).unwrap();
        assert_eq!(matrix.nnz(), 0);
        assert_eq!(matrix.shape(), (1, 1));
        assert_eq!(exp.pool.dispatched(), 0);
    }

    #[test]
    fn bad_options_are_refused_before_counting() {
        let exp = experiment(Sentences::new(&[SENTENCE]));
        let options = CountingOptions { chunk_size: 1, ..Default::default() };
        assert!(matches!(exp.cooccurrence(&vocab(&["cat"]), &vocab(&["the"]), &options), Err(Error::InvalidConfig(_))));
        assert_eq!(exp.pool.dispatched(), 0);
    }

    #[test]
    fn dictionaries_count_tagged_words() {
        let exp = experiment(Sentences::new(&[SENTENCE, &[("The", "N"), ("saw", "V"), ("saw", "N")]]));
        let words = exp.dictionary(&DictionaryOptions::default()).unwrap();
        assert_eq!(words.get(&Token::tagged("the", "N")), 2);
        assert_eq!(words.get(&Token::tagged("saw", "V")), 1);
        assert_eq!(words.total(), 9);

        let stemmed = DictionaryOptions { stem: true, omit_tags: true, ..Default::default() };
        let words = exp.dictionary(&stemmed).unwrap();
        assert_eq!(words.get(&Token::new("the")), 3);
        assert_eq!(words.get(&Token::new("saw")), 2);
    }

    #[test]
    fn dictionary_tables_put_frequent_words_first() {
        let words: CountTable<Token> = vec![
            (Token::tagged("mat", "N"), 1),
            (Token::tagged("the", "N"), 2),
            (Token::tagged("cat", "N"), 1),
        ].into_iter().collect();

        let table = dictionary_table(words.clone(), false).unwrap();
        assert_eq!(table.column_names(), vec!["ngram", "tag", "count"]);
        assert_eq!(table.texts("ngram").unwrap(), &["the", "cat", "mat"]);
        assert_eq!(table.ints("count").unwrap(), &[2, 1, 1]);

        let untagged = dictionary_table(words, true).unwrap();
        assert_eq!(untagged.column_names(), vec!["ngram", "count"]);
    }

    #[test]
    fn untagged_dictionaries_seed_untagged_vocabularies() {
        let mut corpus = Sentences::new(&[SENTENCE]);
        corpus.text[0].iter_mut().for_each(|t| t.tag = None);
        let exp = experiment(corpus);

        let words = exp.dictionary(&DictionaryOptions::default()).unwrap();
        let table = dictionary_table(words, false).unwrap();
        assert_eq!(table.column_names(), vec!["ngram", "count"]);

        let vocab = Vocabulary::from_dictionary(&table, None).unwrap();
        assert!(!vocab.is_tagged());
        let options = CountingOptions { window_size: 1, ..Default::default() };
        let matrix = exp.cooccurrence(&vocab, &vocab, &options).unwrap();
        let (the, cat) = (vocab.id_of(&Token::new("the")).unwrap(), vocab.id_of(&Token::new("cat")).unwrap());
        assert_eq!(matrix.get(the, cat), 1);
        // both directions of the five neighbouring pairs
        assert_eq!(matrix.nnz(), 10);
    }

    #[test]
    fn a_failing_dictionary_file_is_reported() {
        let mut corpus = Sentences::new(&[SENTENCE]);
        corpus.fileids.insert(0, "broken-1.xml".into());
        let exp = experiment(corpus);
        assert!(matches!(exp.dictionary(&DictionaryOptions::default()), Err(Error::SubunitRead { .. })));
    }
}
