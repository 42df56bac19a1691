//! Loaders for the sentence similarity datasets
//!
//! The files are space separated with a header line. Repeated judgements of the same item are
//! averaged, and items come out sorted by their key columns.
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use crate::errors::*;

/// A whitespace separated table with a header
struct Frame {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Frame {
    fn read<B: BufRead>(source: B) -> Result<Frame> {
        let mut lines = source.lines();
        let columns: Vec<String> = match lines.next() {
            Some(header) => header?.split_whitespace().map(String::from).collect(),
            None => return Err(Error::InvalidDataset("the file is empty".into())),
        };
        let mut rows = vec![];
        for (line_i, line) in lines.enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let row: Vec<String> = line.split_whitespace().map(String::from).collect();
            if row.len() != columns.len() {
                return Err(Error::InvalidDataset(format!(
                    "line {} has {} fields, the header has {}", line_i + 2, row.len(), columns.len())));
            }
            rows.push(row);
        }
        Ok(Frame { columns, rows })
    }

    fn position(&self, column: &str) -> Result<usize> {
        self.columns.iter()
            .position(|c| c == column)
            .ok_or_else(|| Error::MissingColumn(column.to_string()))
    }

    /// The mean of `value` for every distinct combination of `keys`, sorted by the keys
    fn group_mean(&self, keys: &[&str], value: &str) -> Result<Vec<(Vec<String>, f64)>> {
        let key_positions = keys.iter().map(|k| self.position(k)).collect::<Result<Vec<_>>>()?;
        let value_position = self.position(value)?;
        let mut groups: BTreeMap<Vec<String>, (f64, usize)> = BTreeMap::new();
        for row in &self.rows {
            let score: f64 = row[value_position].parse().map_err(|_| Error::InvalidDataset(format!(
                "{:?} in column {} is not a number", row[value_position], value)))?;
            let key = key_positions.iter().map(|&p| row[p].clone()).collect();
            let group = groups.entry(key).or_insert((0.0, 0));
            group.0 += score;
            group.1 += 1;
        }
        Ok(groups.into_iter().map(|(key, (sum, n))| (key, sum / n as f64)).collect())
    }
}

fn open<P: AsRef<Path>>(path: P) -> Result<BufReader<File>> {
    Ok(BufReader::new(File::open(path)?))
}

fn limited<T>(mut items: Vec<T>, limit: Option<usize>) -> Vec<T> {
    if let Some(limit) = limit {
        items.truncate(limit);
    }
    items
}

/// Transitive verb disambiguation (Grefenstette and Sadrzadeh 2011)
#[derive(Debug, Clone, PartialEq)]
pub struct Gs2011 {
    pub verb: String,
    pub subject: String,
    pub object: String,
    pub landmark: String,
    pub hilo: String,
    /// Mean human similarity judgement
    pub input: f64,
}

impl Gs2011 {
    pub fn read<P: AsRef<Path>>(path: P, limit: Option<usize>) -> Result<Vec<Gs2011>> {
        Gs2011::from_reader(open(path)?, limit)
    }

    pub fn from_reader<B: BufRead>(source: B, limit: Option<usize>) -> Result<Vec<Gs2011>> {
        let groups = Frame::read(source)?
            .group_mean(&["verb", "subject", "object", "landmark", "hilo"], "input")?;
        Ok(limited(groups, limit).into_iter()
            .map(|(mut key, input)| {
                let hilo = key.pop().unwrap_or_default();
                let landmark = key.pop().unwrap_or_default();
                let object = key.pop().unwrap_or_default();
                let subject = key.pop().unwrap_or_default();
                let verb = key.pop().unwrap_or_default();
                Gs2011 { verb, subject, object, landmark, hilo, input }
            })
            .collect())
    }

    /// Drop the items with words the Google News vectors don't have
    pub fn retain_google_vocabulary(items: Vec<Gs2011>) -> Vec<Gs2011> {
        items.into_iter()
            .filter(|i| i.landmark != "mope")
            .filter(|i| !["behaviour", "favour", "offence", "paper"].contains(&i.object.as_str()))
            .collect()
    }
}

/// Verb disambiguation with adjective modified nouns (Grefenstette and Sadrzadeh 2012)
#[derive(Debug, Clone, PartialEq)]
pub struct Gs2012 {
    pub adj_subj: String,
    pub subj: String,
    pub verb: String,
    pub landmark: String,
    pub adj_obj: String,
    pub obj: String,
    pub annotator_score: f64,
}

impl Gs2012 {
    pub fn read<P: AsRef<Path>>(path: P, limit: Option<usize>) -> Result<Vec<Gs2012>> {
        Gs2012::from_reader(open(path)?, limit)
    }

    pub fn from_reader<B: BufRead>(source: B, limit: Option<usize>) -> Result<Vec<Gs2012>> {
        let groups = Frame::read(source)?.group_mean(
            &["adj_subj", "subj", "verb", "landmark", "adj_obj", "obj"],
            "annotator_score",
        )?;
        Ok(limited(groups, limit).into_iter()
            .map(|(key, annotator_score)| {
                let mut key = key.into_iter();
                let mut next = || key.next().unwrap_or_default();
                Gs2012 {
                    adj_subj: next(),
                    subj: next(),
                    verb: next(),
                    landmark: next(),
                    adj_obj: next(),
                    obj: next(),
                    annotator_score,
                }
            })
            .collect())
    }
}

/// Transitive sentence paraphrasing (Kartsaklis and Sadrzadeh 2013)
#[derive(Debug, Clone, PartialEq)]
pub struct Ks2013 {
    pub subject1: String,
    pub verb1: String,
    pub object1: String,
    pub subject2: String,
    pub verb2: String,
    pub object2: String,
    pub score: f64,
}

impl Ks2013 {
    pub fn read<P: AsRef<Path>>(path: P, limit: Option<usize>) -> Result<Vec<Ks2013>> {
        Ks2013::from_reader(open(path)?, limit)
    }

    pub fn from_reader<B: BufRead>(source: B, limit: Option<usize>) -> Result<Vec<Ks2013>> {
        let groups = Frame::read(source)?.group_mean(
            &["subject1", "verb1", "object1", "subject2", "verb2", "object2"],
            "score",
        )?;
        Ok(limited(groups, limit).into_iter()
            .map(|(key, score)| {
                let mut key = key.into_iter();
                let mut next = || key.next().unwrap_or_default();
                Ks2013 {
                    subject1: next(),
                    verb1: next(),
                    object1: next(),
                    subject2: next(),
                    verb2: next(),
                    object2: next(),
                    score,
                }
            })
            .collect())
    }

    /// Drop the items with words the Google News vectors don't have
    pub fn retain_google_vocabulary(items: Vec<Ks2013>) -> Vec<Ks2013> {
        items.into_iter()
            .filter(|i| i.verb2 != "emphasise" && i.subject1 != "programme" && i.subject2 != "programme")
            .collect()
    }
}
