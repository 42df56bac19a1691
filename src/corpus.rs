//! Corpus readers
//!
//! A corpus is a directory of files (subunits). Readers list the files that match a pattern and
//! turn one file at a time into a sequence of tagged tokens. Nothing else in the crate looks at
//! corpus files directly.
use std::fmt;
use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use quick_xml::events::{BytesStart, Event};
use regex::Regex;
use unicode_segmentation::UnicodeSegmentation;
use walkdir::WalkDir;
use crate::errors::*;

/// Which files of the BNC to read by default
pub const BNC_FILEIDS: &str = r"[A-K]/\w*/\w*\.xml";

/// A word (or its stem) and its part of speech tag, when the corpus has one
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Token {
    pub form: String,
    pub tag: Option<String>,
}

impl Token {
    pub fn new<S: Into<String>>(form: S) -> Token {
        Token { form: form.into(), tag: None }
    }

    pub fn tagged<S: Into<String>, T: Into<String>>(form: S, tag: T) -> Token {
        Token { form: form.into(), tag: Some(tag.into()) }
    }

    /// The same word without its tag
    pub fn untagged(self) -> Token {
        Token { form: self.form, tag: None }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.tag {
            Some(ref tag) => write!(f, "{}_{}", self.form, tag),
            None => write!(f, "{}", self.form),
        }
    }
}

/// How a reader should present the tokens of a file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReadOptions {
    /// Use the headword instead of the word as written
    pub stem: bool,
    /// Use the detailed C5 tagset instead of the simplified one
    pub c5: bool,
}

/// Anything that can list its files and produce the tokens of one of them
///
/// Implementations are shared between worker threads, and a failure to read one file must only
/// affect that file.
pub trait CorpusReader: Sync {
    /// Files of the corpus, relative to its root, in a stable order
    fn fileids(&self) -> &[String];

    /// All tokens of one file, in reading order
    fn tokens_of(&self, fileid: &str, options: &ReadOptions) -> Result<Vec<Token>>;
}

/// The supported on-disk corpus layouts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorpusFormat {
    /// British National Corpus XML edition
    Bnc,
    /// Untagged UTF-8 text
    Plain,
}

impl CorpusFormat {
    /// Open the corpus at `root`, keeping only files matching `pattern`
    pub fn open<P: AsRef<Path>>(self, root: P, pattern: &str) -> Result<Box<dyn CorpusReader>> {
        Ok(match self {
            CorpusFormat::Bnc => Box::new(BncReader::new(root, pattern)?),
            CorpusFormat::Plain => Box::new(PlainTextReader::new(root, pattern)?),
        })
    }
}

impl FromStr for CorpusFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "bnc" => Ok(CorpusFormat::Bnc),
            "plain" => Ok(CorpusFormat::Plain),
            other => Err(Error::InvalidConfig(format!("unknown corpus format {:?}", other))),
        }
    }
}

/// List the files under `root` whose relative path matches `pattern` completely
///
/// Paths use `/` as separator regardless of the platform, and come back sorted.
pub fn find_fileids<P: AsRef<Path>>(root: P, pattern: &str) -> Result<Vec<String>> {
    let root = root.as_ref();
    let matcher = Regex::new(&format!("^(?:{})$", pattern))?;
    let mut fileids = vec![];
    for entry in WalkDir::new(root).follow_links(true) {
        let entry = entry.map_err(|err| Error::Other(format!("Could not list {}: {}", root.display(), err)))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = match entry.path().strip_prefix(root) {
            Ok(relative) => relative,
            Err(_) => continue,
        };
        let fileid = relative.components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        if matcher.is_match(&fileid) {
            fileids.push(fileid);
        }
    }
    fileids.sort();
    Ok(fileids)
}

fn read_failure<E: fmt::Display>(fileid: &str, err: E) -> Error {
    Error::SubunitRead { subunit: fileid.to_string(), reason: err.to_string() }
}

/// Reader for the XML edition of the British National Corpus
///
/// Words are `<w>` elements and punctuation is `<c>` elements, e.g.
/// `<w c5="NN1" hw="cat" pos="SUBST">cat </w>`.
pub struct BncReader {
    root: PathBuf,
    fileids: Vec<String>,
}

impl BncReader {
    pub fn new<P: AsRef<Path>>(root: P, pattern: &str) -> Result<BncReader> {
        let root = root.as_ref().to_path_buf();
        let fileids = find_fileids(&root, pattern)?;
        Ok(BncReader { root, fileids })
    }
}

impl CorpusReader for BncReader {
    fn fileids(&self) -> &[String] {
        &self.fileids
    }

    fn tokens_of(&self, fileid: &str, options: &ReadOptions) -> Result<Vec<Token>> {
        let file = File::open(self.root.join(fileid)).map_err(|err| read_failure(fileid, err))?;
        parse_bnc(BufReader::new(file), options).map_err(|err| read_failure(fileid, err))
    }
}

/// Attributes of the word element being read
#[derive(Default)]
struct Pending {
    text: String,
    hw: Option<String>,
    pos: Option<String>,
    c5: Option<String>,
}

impl Pending {
    fn from_start(start: &BytesStart) -> quick_xml::Result<Pending> {
        let mut pending = Pending::default();
        for attr in start.attributes() {
            let attr = attr?;
            let slot = match attr.key.as_ref() {
                b"hw" => &mut pending.hw,
                b"pos" => &mut pending.pos,
                b"c5" => &mut pending.c5,
                _ => continue,
            };
            *slot = Some(attr.unescape_value()?.into_owned());
        }
        Ok(pending)
    }

    fn into_token(self, options: &ReadOptions) -> Option<Token> {
        let written = self.text.trim();
        let form = match self.hw {
            Some(hw) if options.stem => hw,
            _ => written.to_string(),
        };
        if form.is_empty() {
            return None;
        }
        let tag = if options.c5 { self.c5 } else { self.pos.or(self.c5) };
        Some(Token { form, tag })
    }
}

fn is_word_element(name: &[u8]) -> bool {
    name == b"w" || name == b"c"
}

/// Pull the tagged tokens out of one BNC XML document
pub fn parse_bnc<B: BufRead>(source: B, options: &ReadOptions) -> quick_xml::Result<Vec<Token>> {
    let mut reader = quick_xml::Reader::from_reader(source);
    let mut buf = vec![];
    let mut tokens = vec![];
    let mut pending: Option<Pending> = None;
    loop {
        buf.clear();
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                if is_word_element(e.name().as_ref()) {
                    pending = Some(Pending::from_start(&e)?);
                }
            }
            Event::Text(e) => {
                if let Some(ref mut word) = pending {
                    word.text.push_str(e.unescape()?.as_ref());
                }
            }
            Event::End(e) => {
                if is_word_element(e.name().as_ref()) {
                    if let Some(word) = pending.take() {
                        tokens.extend(word.into_token(options));
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(tokens)
}

/// Reader for untagged text files, split into words by unicode rules
///
/// Every token comes back without a tag, and stemming is not available.
pub struct PlainTextReader {
    root: PathBuf,
    fileids: Vec<String>,
}

impl PlainTextReader {
    pub fn new<P: AsRef<Path>>(root: P, pattern: &str) -> Result<PlainTextReader> {
        let root = root.as_ref().to_path_buf();
        let fileids = find_fileids(&root, pattern)?;
        Ok(PlainTextReader { root, fileids })
    }
}

impl CorpusReader for PlainTextReader {
    fn fileids(&self) -> &[String] {
        &self.fileids
    }

    fn tokens_of(&self, fileid: &str, _options: &ReadOptions) -> Result<Vec<Token>> {
        let content = fs::read_to_string(self.root.join(fileid))
            .map_err(|err| read_failure(fileid, err))?;
        Ok(content.unicode_words().map(Token::new).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const DOC: &str = r#"<bncDoc><wtext><s n="1"><w c5="AT0" hw="the" pos="ART">The </w><w c5="NN2" hw="cat" pos="SUBST">cats </w><w c5="VVD" hw="sit" pos="VERB">sat</w><c c5="PUN">.</c></s></wtext></bncDoc>"#;

    #[test]
    fn bnc_words_carry_simple_tags() {
        let tokens = parse_bnc(DOC.as_bytes(), &ReadOptions::default()).unwrap();
        assert_eq!(tokens, vec![
            Token::tagged("The", "ART"),
            Token::tagged("cats", "SUBST"),
            Token::tagged("sat", "VERB"),
            Token::tagged(".", "PUN"),
        ]);
    }

    #[test]
    fn bnc_stems_and_c5_tags() {
        let options = ReadOptions { stem: true, c5: true };
        let tokens = parse_bnc(DOC.as_bytes(), &options).unwrap();
        assert_eq!(tokens[1], Token::tagged("cat", "NN2"));
        assert_eq!(tokens[2], Token::tagged("sit", "VVD"));
        // punctuation has no headword, so the written form stays
        assert_eq!(tokens[3], Token::tagged(".", "PUN"));
    }

    #[test]
    fn broken_xml_is_an_error() {
        let broken = r#"<bncDoc><w c5="AT0" hw="the" pos="ART">The </x></bncDoc>"#;
        assert!(parse_bnc(broken.as_bytes(), &ReadOptions::default()).is_err());
    }

    #[test]
    fn fileids_match_the_whole_relative_path() {
        let root = TempDir::new().unwrap();
        fs::create_dir_all(root.path().join("A/A0")).unwrap();
        fs::create_dir_all(root.path().join("Z/Z0")).unwrap();
        fs::write(root.path().join("A/A0/A00.xml"), DOC).unwrap();
        fs::write(root.path().join("A/A0/A01.xml"), DOC).unwrap();
        fs::write(root.path().join("A/A0/notes.txt"), "x").unwrap();
        fs::write(root.path().join("Z/Z0/Z00.xml"), DOC).unwrap();

        let fileids = find_fileids(root.path(), BNC_FILEIDS).unwrap();
        assert_eq!(fileids, vec!["A/A0/A00.xml", "A/A0/A01.xml"]);
    }

    #[test]
    fn unreadable_files_name_themselves() {
        let root = TempDir::new().unwrap();
        fs::create_dir_all(root.path().join("A/A0")).unwrap();
        fs::write(root.path().join("A/A0/A00.xml"), "<w pos='ART'>The</x>").unwrap();
        let reader = BncReader::new(root.path(), BNC_FILEIDS).unwrap();
        match reader.tokens_of("A/A0/A00.xml", &ReadOptions::default()) {
            Err(Error::SubunitRead { subunit, .. }) => assert_eq!(subunit, "A/A0/A00.xml"),
            other => panic!("expected a read error, got {:?}", other),
        }
    }

    #[test]
    fn plain_text_is_split_into_words() {
        let root = TempDir::new().unwrap();
        fs::write(root.path().join("one.txt"), "The cat sat, on the mat.").unwrap();
        let reader = CorpusFormat::Plain.open(root.path(), r".*\.txt").unwrap();
        assert_eq!(reader.fileids(), &["one.txt".to_string()]);
        let forms: Vec<String> = reader.tokens_of("one.txt", &ReadOptions::default()).unwrap()
            .into_iter()
            .map(|t| t.form)
            .collect();
        assert_eq!(forms, vec!["The", "cat", "sat", "on", "the", "mat"]);
    }
}
