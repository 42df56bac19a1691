//! Compressed columnar store: several named tables in one file
//!
//! Layout, all integers little endian:
//!
//! ```text
//! magic "\x93DSSTORE" | version u8 | zlib(
//!     table count u32
//!     per table:  key | column count u32 | row count u64
//!     per column: name | type u8 (0 = integer, 1 = text) | values
//! )
//! ```
//!
//! Strings are a u32 byte length followed by UTF-8. Integer values are u64.
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use flate2::Compression;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use tempfile::NamedTempFile;
use crate::errors::*;

pub const MAGIC: &[u8; 8] = b"\x93DSSTORE";
const VERSION: u8 = 1;
const INT_COLUMN: u8 = 0;
const TEXT_COLUMN: u8 = 1;

/// Strongest zlib compression, what the stores are written with unless asked otherwise
pub const DEFAULT_COMPRESSION: u32 = 9;

/// One column of values
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Column {
    Int(Vec<u64>),
    Text(Vec<String>),
}

impl Column {
    pub fn len(&self) -> usize {
        match *self {
            Column::Int(ref values) => values.len(),
            Column::Text(ref values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Equally long, uniquely named columns in a fixed order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    columns: Vec<(String, Column)>,
}

impl Table {
    pub fn new() -> Table {
        Table { columns: vec![] }
    }

    /// Add a column, which must be as long as the ones already there
    pub fn with_column<S: Into<String>>(mut self, name: S, column: Column) -> Result<Table> {
        let name = name.into();
        if self.column(&name).is_some() {
            return Err(Error::MalformedStore(format!("column {:?} appears twice", name)));
        }
        if !self.columns.is_empty() && column.len() != self.n_rows() {
            return Err(Error::MalformedStore(format!(
                "column {:?} has {} rows but the table has {}", name, column.len(), self.n_rows())));
        }
        self.columns.push((name, column));
        Ok(self)
    }

    pub fn n_rows(&self) -> usize {
        self.columns.first().map(|(_, column)| column.len()).unwrap_or(0)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter()
            .find(|(n, _)| n == name)
            .map(|(_, column)| column)
    }

    /// An integer column, or an error naming it
    pub fn ints(&self, name: &str) -> Result<&[u64]> {
        match self.column(name) {
            Some(Column::Int(values)) => Ok(values.as_slice()),
            _ => Err(Error::MissingColumn(name.to_string())),
        }
    }

    /// A text column, or an error naming it
    pub fn texts(&self, name: &str) -> Result<&[String]> {
        match self.column(name) {
            Some(Column::Text(values)) => Ok(values.as_slice()),
            _ => Err(Error::MissingColumn(name.to_string())),
        }
    }
}

/// Named tables, kept in memory and written out in one go
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Store {
    tables: BTreeMap<String, Table>,
}

impl Store {
    pub fn new() -> Store {
        Store { tables: BTreeMap::new() }
    }

    /// Add or replace a table
    pub fn insert<S: Into<String>>(&mut self, key: S, table: Table) {
        self.tables.insert(key.into(), table);
    }

    pub fn get(&self, key: &str) -> Result<&Table> {
        self.tables.get(key).ok_or_else(|| Error::MissingTable(key.to_string()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(|k| k.as_str())
    }

    /// Read a whole store from disk
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Store> {
        let file = File::open(path)?;
        Store::read_from(BufReader::new(file))
    }

    /// Write the store to `path`
    ///
    /// The data goes to a temporary file next to `path` first and is renamed into place when
    /// complete, so a crash never leaves a half written store behind.
    pub fn save<P: AsRef<Path>>(&self, path: P, compression: u32) -> Result<()> {
        let path = path.as_ref();
        let dir = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)?;
        let file = NamedTempFile::new_in(dir)?;
        {
            let mut writer = BufWriter::new(file.as_file());
            self.write_to(&mut writer, compression)?;
            writer.flush()?;
        }
        file.persist(path).map_err(|err| Error::IOError(err.error))?;
        Ok(())
    }

    pub fn write_to<W: Write>(&self, mut writer: W, compression: u32) -> Result<()> {
        writer.write_all(MAGIC)?;
        writer.write_u8(VERSION)?;
        let mut body = ZlibEncoder::new(writer, Compression::new(compression));
        body.write_u32::<LittleEndian>(self.tables.len() as u32)?;
        for (key, table) in &self.tables {
            write_string(&mut body, key)?;
            body.write_u32::<LittleEndian>(table.columns.len() as u32)?;
            body.write_u64::<LittleEndian>(table.n_rows() as u64)?;
            for (name, column) in &table.columns {
                write_string(&mut body, name)?;
                match *column {
                    Column::Int(ref values) => {
                        body.write_u8(INT_COLUMN)?;
                        for value in values {
                            body.write_u64::<LittleEndian>(*value)?;
                        }
                    }
                    Column::Text(ref values) => {
                        body.write_u8(TEXT_COLUMN)?;
                        for value in values {
                            write_string(&mut body, value)?;
                        }
                    }
                }
            }
        }
        body.finish()?;
        Ok(())
    }

    pub fn read_from<R: Read>(mut reader: R) -> Result<Store> {
        let mut magic = [0u8; 8];
        reader.read_exact(&mut magic).map_err(|_| malformed("too short to be a store"))?;
        if &magic != MAGIC {
            return Err(malformed("wrong magic bytes, this is not a store file"));
        }
        let version = reader.read_u8()?;
        if version != VERSION {
            return Err(malformed(&format!("unsupported version {}", version)));
        }
        let mut body = ZlibDecoder::new(reader);
        let n_tables = body.read_u32::<LittleEndian>()?;
        let mut store = Store::new();
        for _ in 0..n_tables {
            let key = read_string(&mut body)?;
            let n_columns = body.read_u32::<LittleEndian>()?;
            let n_rows = body.read_u64::<LittleEndian>()?;
            let mut table = Table::new();
            for _ in 0..n_columns {
                let name = read_string(&mut body)?;
                // Don't trust the row count for preallocation
                let capacity = n_rows.min(1 << 16) as usize;
                let column = match body.read_u8()? {
                    INT_COLUMN => {
                        let mut values = Vec::with_capacity(capacity);
                        for _ in 0..n_rows {
                            values.push(body.read_u64::<LittleEndian>()?);
                        }
                        Column::Int(values)
                    }
                    TEXT_COLUMN => {
                        let mut values = Vec::with_capacity(capacity);
                        for _ in 0..n_rows {
                            values.push(read_string(&mut body)?);
                        }
                        Column::Text(values)
                    }
                    other => return Err(malformed(&format!("unknown column type {}", other))),
                };
                table = table.with_column(name, column)?;
            }
            store.insert(key, table);
        }
        Ok(store)
    }
}

fn malformed(info: &str) -> Error {
    Error::MalformedStore(info.to_string())
}

fn write_string<W: Write>(writer: &mut W, value: &str) -> io::Result<()> {
    writer.write_u32::<LittleEndian>(value.len() as u32)?;
    writer.write_all(value.as_bytes())
}

fn read_string<R: Read>(reader: &mut R) -> Result<String> {
    let len = reader.read_u32::<LittleEndian>()? as u64;
    let mut bytes = vec![];
    reader.take(len).read_to_end(&mut bytes)?;
    if bytes.len() as u64 != len {
        return Err(malformed("truncated string"));
    }
    String::from_utf8(bytes).map_err(|_| malformed("text is not UTF-8"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn words() -> Table {
        Table::new()
            .with_column("ngram", Column::Text(vec!["cat".into(), "sat".into(), "ünïcode".into()]))
            .unwrap()
            .with_column("count", Column::Int(vec![3, 2, u64::max_value()]))
            .unwrap()
    }

    #[test]
    fn columns_must_line_up() {
        let err = words().with_column("short", Column::Int(vec![1])).unwrap_err();
        assert!(matches!(err, Error::MalformedStore(_)));
        let err = words().with_column("count", Column::Int(vec![1, 2, 3])).unwrap_err();
        assert!(matches!(err, Error::MalformedStore(_)));
        assert_eq!(words().n_rows(), 3);
        assert_eq!(words().column_names(), vec!["ngram", "count"]);
    }

    #[test]
    fn typed_column_access() {
        let table = words();
        assert_eq!(table.ints("count").unwrap(), &[3, 2, u64::max_value()]);
        assert!(matches!(table.ints("ngram"), Err(Error::MissingColumn(_))));
        assert!(matches!(table.texts("tag"), Err(Error::MissingColumn(_))));
    }

    #[test]
    fn several_tables_survive_a_trip_to_disk() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("out.store");
        let mut store = Store::new();
        store.insert("words", words());
        store.insert("empty", Table::new());
        store.insert("space/targets", words());
        store.save(&path, DEFAULT_COMPRESSION).unwrap();

        let loaded = Store::open(&path).unwrap();
        assert_eq!(loaded, store);
        assert_eq!(loaded.keys().collect::<Vec<_>>(), vec!["empty", "space/targets", "words"]);
        assert!(matches!(loaded.get("nothing"), Err(Error::MissingTable(_))));
    }

    #[test]
    fn the_body_is_compressed() {
        let table = Table::new()
            .with_column("count", Column::Int(vec![7; 10_000]))
            .unwrap();
        let mut store = Store::new();
        store.insert("repetitive", table);
        let mut bytes = vec![];
        store.write_to(&mut bytes, DEFAULT_COMPRESSION).unwrap();
        assert!(bytes.len() < 10_000);
        assert_eq!(Store::read_from(&bytes[..]).unwrap(), store);
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(matches!(Store::read_from(&b"not a store at all"[..]), Err(Error::MalformedStore(_))));
        assert!(matches!(Store::read_from(&b"\x93DS"[..]), Err(Error::MalformedStore(_))));
    }
}
