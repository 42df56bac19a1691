//! Vocabularies: the closed sets of targets (matrix rows) and contexts (matrix columns)
//!
//! A vocabulary is either tagged, where `saw/VERB` and `saw/SUBST` are different entries, or
//! untagged, where lookups ignore the tag of the token. Which one is decided by the entries it
//! is built from, never mixed.
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use crate::corpus::Token;
use crate::errors::*;
use crate::farm::{FarmMap, new_farm};
use crate::store::{Column, Table};

/// A blank tag reads as no tag
fn stored_token(word: &str, tag: Option<&str>) -> Token {
    match tag.map(str::trim) {
        Some(tag) if !tag.is_empty() => Token::tagged(word, tag),
        _ => Token::new(word),
    }
}

enum Index {
    Untagged(FarmMap<String, u32>),
    Tagged(FarmMap<Token, u32>),
}

/// Ordered mapping from tokens to dense integer ids
pub struct Vocabulary {
    index: Index,
    entries: Vec<(Token, u32)>,
}

impl Vocabulary {
    /// Number the tokens in order, starting from 0
    pub fn from_tokens(tokens: Vec<Token>) -> Result<Vocabulary> {
        Vocabulary::from_entries(tokens.into_iter().zip(0..).collect())
    }

    /// Build from explicit (token, id) entries
    ///
    /// Either every token has a tag or none does. Tokens and ids must be unique.
    pub fn from_entries(entries: Vec<(Token, u32)>) -> Result<Vocabulary> {
        let tagged = entries.first().map(|(t, _)| t.tag.is_some()).unwrap_or(false);
        let mut ids = new_farm::<u32, ()>();
        let mut index = if tagged { Index::Tagged(new_farm()) } else { Index::Untagged(new_farm()) };
        for (token, id) in &entries {
            if token.tag.is_some() != tagged {
                return Err(Error::InvalidVocabulary(format!(
                    "{} mixes tagged and untagged entries", token)));
            }
            if ids.insert(*id, ()).is_some() {
                return Err(Error::InvalidVocabulary(format!("id {} is used twice", id)));
            }
            let fresh = match index {
                Index::Tagged(ref mut map) => map.insert(token.clone(), *id).is_none(),
                Index::Untagged(ref mut map) => map.insert(token.form.clone(), *id).is_none(),
            };
            if !fresh {
                return Err(Error::InvalidVocabulary(format!("{} appears twice", token)));
            }
        }
        Ok(Vocabulary { index, entries })
    }

    /// Read a word list: one `word` or `word<TAB>tag` per line, numbered from 0
    pub fn from_wordlist<P: AsRef<Path>>(path: P) -> Result<Vocabulary> {
        let mut tokens = vec![];
        for line in BufReader::new(File::open(path)?).lines() {
            let line = line?;
            let mut fields = line.splitn(2, '\t');
            let word = fields.next().unwrap_or("").trim();
            if word.is_empty() {
                continue;
            }
            tokens.push(stored_token(word, fields.next()));
        }
        Vocabulary::from_tokens(tokens)
    }

    /// Restore a vocabulary saved with `to_table`
    pub fn from_table(table: &Table) -> Result<Vocabulary> {
        let ngrams = table.texts("ngram")?;
        let ids = table.ints("id")?;
        let tags = table.texts("tag").ok();
        let mut entries = Vec::with_capacity(ngrams.len());
        for (i, (ngram, id)) in ngrams.iter().zip(ids).enumerate() {
            let token = stored_token(ngram, tags.map(|tags| tags[i].as_str()));
            let id = if *id <= u32::max_value() as u64 {
                *id as u32
            } else {
                return Err(Error::InvalidVocabulary(format!("id {} is too large", id)));
            };
            entries.push((token, id));
        }
        Vocabulary::from_entries(entries)
    }

    /// The first `limit` entries of a frequency dictionary, numbered from 0
    ///
    /// Dictionaries are sorted by frequency, so this picks the most frequent words.
    pub fn from_dictionary(table: &Table, limit: Option<usize>) -> Result<Vocabulary> {
        let ngrams = table.texts("ngram")?;
        let tags = table.texts("tag").ok();
        let size = limit.map(|l| l.min(ngrams.len())).unwrap_or(ngrams.len());
        let tokens = (0..size)
            .map(|i| stored_token(&ngrams[i], tags.map(|tags| tags[i].as_str())))
            .collect();
        Vocabulary::from_tokens(tokens)
    }

    /// Columns `ngram`, `tag` (tagged vocabularies only) and `id`
    pub fn to_table(&self) -> Result<Table> {
        let ngrams = self.entries.iter().map(|(t, _)| t.form.clone()).collect();
        let ids = self.entries.iter().map(|(_, id)| *id as u64).collect();
        let mut table = Table::new().with_column("ngram", Column::Text(ngrams))?;
        if self.is_tagged() {
            let tags = self.entries.iter()
                .map(|(t, _)| t.tag.clone().unwrap_or_default())
                .collect();
            table = table.with_column("tag", Column::Text(tags))?;
        }
        table.with_column("id", Column::Int(ids))
    }

    /// The id of a token, if it is in the vocabulary
    #[inline]
    pub fn id_of(&self, token: &Token) -> Option<u32> {
        match self.index {
            Index::Tagged(ref map) => map.get(token).cloned(),
            Index::Untagged(ref map) => map.get(token.form.as_str()).cloned(),
        }
    }

    pub fn contains(&self, token: &Token) -> bool {
        self.id_of(token).is_some()
    }

    pub fn is_tagged(&self) -> bool {
        match self.index {
            Index::Tagged(_) => true,
            Index::Untagged(_) => false,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// How many rows (or columns) a matrix indexed by these ids needs
    pub fn dimension(&self) -> usize {
        self.entries.iter().map(|(_, id)| *id as usize + 1).max().unwrap_or(0)
    }

    pub fn entries(&self) -> &[(Token, u32)] {
        &self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn untagged_vocabularies_ignore_tags() {
        let vocab = Vocabulary::from_tokens(vec![Token::new("cat"), Token::new("sat")]).unwrap();
        assert!(!vocab.is_tagged());
        assert_eq!(vocab.id_of(&Token::tagged("sat", "VERB")), Some(1));
        assert_eq!(vocab.id_of(&Token::new("cat")), Some(0));
        assert_eq!(vocab.id_of(&Token::new("mat")), None);
        assert_eq!(vocab.dimension(), 2);
    }

    #[test]
    fn tagged_vocabularies_need_the_tag() {
        let vocab = Vocabulary::from_tokens(vec![Token::tagged("saw", "VERB")]).unwrap();
        assert!(vocab.is_tagged());
        assert_eq!(vocab.id_of(&Token::tagged("saw", "VERB")), Some(0));
        assert_eq!(vocab.id_of(&Token::tagged("saw", "SUBST")), None);
        assert_eq!(vocab.id_of(&Token::new("saw")), None);
    }

    #[test]
    fn bad_vocabularies_are_rejected() {
        let mixed = Vocabulary::from_tokens(vec![Token::tagged("saw", "VERB"), Token::new("cat")]);
        assert!(matches!(mixed, Err(Error::InvalidVocabulary(_))));
        let repeated = Vocabulary::from_tokens(vec![Token::new("cat"), Token::new("cat")]);
        assert!(matches!(repeated, Err(Error::InvalidVocabulary(_))));
        let same_id = Vocabulary::from_entries(vec![(Token::new("a"), 3), (Token::new("b"), 3)]);
        assert!(matches!(same_id, Err(Error::InvalidVocabulary(_))));
    }

    #[test]
    fn wordlists_may_carry_tags() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("targets.txt");
        fs::write(&path, "saw\tVERB\n\nsee\tVERB\r\n").unwrap();
        let vocab = Vocabulary::from_wordlist(&path).unwrap();
        assert_eq!(vocab.len(), 2);
        assert_eq!(vocab.id_of(&Token::tagged("see", "VERB")), Some(1));
    }

    #[test]
    fn wordlist_fields_are_trimmed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("context.txt");
        fs::write(&path, "cat \n mat\t\n  \n").unwrap();
        let vocab = Vocabulary::from_wordlist(&path).unwrap();
        assert!(!vocab.is_tagged());
        assert_eq!(vocab.entries(), &[(Token::new("cat"), 0), (Token::new("mat"), 1)]);

        fs::write(&path, "saw \t VERB \n").unwrap();
        let tagged = Vocabulary::from_wordlist(&path).unwrap();
        assert_eq!(tagged.id_of(&Token::tagged("saw", "VERB")), Some(0));
    }

    #[test]
    fn tables_restore_the_same_mapping() {
        let vocab = Vocabulary::from_entries(vec![
            (Token::tagged("saw", "VERB"), 4),
            (Token::tagged("cat", "SUBST"), 1),
        ]).unwrap();
        let table = vocab.to_table().unwrap();
        assert_eq!(table.column_names(), vec!["ngram", "tag", "id"]);
        let back = Vocabulary::from_table(&table).unwrap();
        assert_eq!(back.entries(), vocab.entries());
        assert_eq!(back.dimension(), 5);

        let untagged = Vocabulary::from_tokens(vec![Token::new("cat")]).unwrap().to_table().unwrap();
        assert_eq!(untagged.column_names(), vec!["ngram", "id"]);
    }

    #[test]
    fn dictionaries_seed_vocabularies_by_rank() {
        let dictionary = Table::new()
            .with_column("ngram", Column::Text(vec!["the".into(), "cat".into(), "mat".into()]))
            .unwrap()
            .with_column("count", Column::Int(vec![10, 4, 1]))
            .unwrap();
        let vocab = Vocabulary::from_dictionary(&dictionary, Some(2)).unwrap();
        assert_eq!(vocab.len(), 2);
        assert_eq!(vocab.id_of(&Token::new("cat")), Some(1));
        assert!(!vocab.contains(&Token::new("mat")));
        assert_eq!(Vocabulary::from_dictionary(&dictionary, Some(50)).unwrap().len(), 3);
    }

    #[test]
    fn blank_tags_read_as_untagged() {
        let dictionary = Table::new()
            .with_column("ngram", Column::Text(vec!["the".into(), "cat".into()]))
            .unwrap()
            .with_column("tag", Column::Text(vec!["".into(), "".into()]))
            .unwrap()
            .with_column("count", Column::Int(vec![2, 1]))
            .unwrap();
        let vocab = Vocabulary::from_dictionary(&dictionary, None).unwrap();
        assert!(!vocab.is_tagged());
        assert_eq!(vocab.id_of(&Token::new("cat")), Some(1));
    }
}
