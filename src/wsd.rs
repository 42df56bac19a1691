//! Sentence similarity experiments over a co-occurrence space
//!
//! Each experiment composes sentence vectors from the space, scores every dataset item by the
//! cosine of its two sentences and correlates the scores with the human judgements.
use std::collections::BTreeMap;
use ndarray::prelude::*;
use rayon::prelude::*;
use crate::compose::{cosine_similarity, CompositionOperator, NounPhraseComposition};
use crate::datasets::{Gs2011, Gs2012, Ks2013};
use crate::errors::*;
use crate::farm::{FarmMap, new_farm};
use crate::pool::Pool;
use crate::space::Space;
use crate::stats::{correlation_p_value, mean, spearman};

pub const VERB: &str = "VERB";
pub const NOUN: &str = "SUBST";
pub const ADJECTIVE: &str = "ADJ";

/// Model similarities next to the human scores they should agree with
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityReport {
    /// One per dataset item, in dataset order
    pub similarities: Vec<f64>,
    pub judgements: Vec<f64>,
}

impl SimilarityReport {
    pub fn spearman(&self) -> Option<f64> {
        spearman(&self.judgements, &self.similarities)
    }

    /// Two-sided p-value of `spearman`
    pub fn p_value(&self) -> Option<f64> {
        correlation_p_value(self.spearman()?, self.similarities.len())
    }
}

/// Runs the experiments against one space with one composition operator
pub struct Similarity<'a> {
    pub space: &'a Space,
    pub pool: &'a Pool,
    pub operator: CompositionOperator,
}

impl<'a> Similarity<'a> {
    pub fn new(space: &'a Space, pool: &'a Pool, operator: CompositionOperator) -> Similarity<'a> {
        Similarity { space, pool, operator }
    }

    fn noun(&self, word: &str) -> Result<Array1<f64>> {
        self.space.vector(word, NOUN)
    }

    fn adjective(&self, word: &str) -> Result<Array1<f64>> {
        self.space.vector(word, ADJECTIVE)
    }

    /// Prepared vectors of every distinct verb, computed once each
    fn verb_vectors<'v, I: Iterator<Item = &'v str>>(&self, verbs: I) -> Result<FarmMap<String, Array1<f64>>> {
        let mut distinct: Vec<&str> = verbs.collect();
        distinct.sort_unstable();
        distinct.dedup();
        debug!("Preparing {} verb vectors.", distinct.len());
        let prepared = self.pool.install(|| {
            distinct.par_iter()
                .map(|&verb| -> Result<(String, Array1<f64>)> {
                    let vector = self.space.vector(verb, VERB)?;
                    Ok((verb.to_string(), self.operator.verb_vector(&vector)))
                })
                .collect::<Result<Vec<_>>>()
        })?;
        let mut verbs = new_farm();
        verbs.extend(prepared);
        Ok(verbs)
    }

    fn sentence(&self, verbs: &FarmMap<String, Array1<f64>>, subject: &Array1<f64>, verb: &str, object: &Array1<f64>)
        -> Result<Array1<f64>> {
        let verb = verbs.get(verb).ok_or_else(|| Error::UnknownWord(verb.to_string()))?;
        self.operator.transitive(subject, verb, object)
    }

    /// Similarities of many items, in the order of `items`
    fn score_all<T, F>(&self, items: &[T], score: F) -> Result<Vec<f64>>
        where T: Sync, F: Fn(&T) -> Result<f64> + Sync + Send {
        self.pool.install(|| items.par_iter().map(|item| score(item)).collect())
    }

    /// Does the subject-verb-object sentence mean the same with the verb as with its landmark?
    pub fn gs11(&self, items: &[Gs2011]) -> Result<SimilarityReport> {
        let verbs = self.verb_vectors(items.iter().flat_map(|i| vec![i.verb.as_str(), i.landmark.as_str()]))?;
        let similarities = self.score_all(items, |item| {
            let subject = self.noun(&item.subject)?;
            let object = self.noun(&item.object)?;
            let with_verb = self.sentence(&verbs, &subject, &item.verb, &object)?;
            let with_landmark = self.sentence(&verbs, &subject, &item.landmark, &object)?;
            cosine_similarity(&with_verb, &with_landmark)
        })?;
        Ok(SimilarityReport { similarities, judgements: items.iter().map(|i| i.input).collect() })
    }

    /// The same as `gs11`, with adjectives composed into the subject and the object first
    pub fn gs12(&self, items: &[Gs2012], np: NounPhraseComposition) -> Result<SimilarityReport> {
        let verbs = self.verb_vectors(items.iter().flat_map(|i| vec![i.verb.as_str(), i.landmark.as_str()]))?;
        let similarities = self.score_all(items, |item| {
            let subject = np.compose(&self.adjective(&item.adj_subj)?, &self.noun(&item.subj)?)?;
            let object = np.compose(&self.adjective(&item.adj_obj)?, &self.noun(&item.obj)?)?;
            let with_verb = self.sentence(&verbs, &subject, &item.verb, &object)?;
            let with_landmark = self.sentence(&verbs, &subject, &item.landmark, &object)?;
            cosine_similarity(&with_verb, &with_landmark)
        })?;
        Ok(SimilarityReport { similarities, judgements: items.iter().map(|i| i.annotator_score).collect() })
    }

    /// How similar are two subject-verb-object sentences?
    pub fn paraphrasing(&self, items: &[Ks2013]) -> Result<SimilarityReport> {
        let verbs = self.verb_vectors(items.iter().flat_map(|i| vec![i.verb1.as_str(), i.verb2.as_str()]))?;
        let similarities = self.score_all(items, |item| {
            let first = self.sentence(&verbs, &self.noun(&item.subject1)?, &item.verb1, &self.noun(&item.object1)?)?;
            let second = self.sentence(&verbs, &self.noun(&item.subject2)?, &item.verb2, &self.noun(&item.object2)?)?;
            cosine_similarity(&first, &second)
        })?;
        Ok(SimilarityReport { similarities, judgements: items.iter().map(|i| i.score).collect() })
    }
}

/// Mean judgement and mean similarity of the high and the low landmark items
pub fn hilo_means(items: &[Gs2011], report: &SimilarityReport) -> BTreeMap<String, (f64, f64)> {
    let mut groups: BTreeMap<String, (Vec<f64>, Vec<f64>)> = BTreeMap::new();
    for ((item, &judgement), &similarity) in items.iter().zip(&report.judgements).zip(&report.similarities) {
        let group = groups.entry(item.hilo.clone()).or_insert_with(Default::default);
        group.0.push(judgement);
        group.1.push(similarity);
    }
    groups.into_iter()
        .filter_map(|(hilo, (judgements, similarities))| {
            Some((hilo, (mean(&judgements)?, mean(&similarities)?)))
        })
        .collect()
}
