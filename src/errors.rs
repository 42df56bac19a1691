//
// Errors
//
use std::io;
use std::result;
use std::error;
use std::num;
use std::fmt;
use ndarray as nd;

/// Type alias for distsem errors
pub type Result<X> = result::Result<X, Error>;

/// Wrapper for many kinds of errors occuring while counting or evaluating
#[derive(Debug)]
pub enum Error {
    /// One corpus file could not be read or parsed. Fatal to the run.
    SubunitRead { subunit: String, reason: String },
    /// The reduction was handed nothing to sum. Batches are never empty, so this is a bug.
    EmptyReduction,
    InvalidDimensions(String),
    InvalidConfig(String),
    InvalidVocabulary(String),
    InvalidDataset(String),
    MalformedStore(String),
    MissingTable(String),
    MissingColumn(String),
    UnknownWord(String),
    ShapeError(nd::ShapeError),
    IOError(io::Error),
    ParseFloatError(num::ParseFloatError),
    RegexError(regex::Error),
    ThreadPoolError(rayon::ThreadPoolBuildError),
    Other(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::SubunitRead { ref subunit, ref reason } =>
                write!(f, "Could not process {}: {}", subunit, reason),
            Error::EmptyReduction =>
                write!(f, "Asked to sum zero count tables; every batch must contain a file"),
            Error::InvalidDimensions(ref info) => write!(f, "Dimension Mismatch: {}", info),
            Error::InvalidConfig(ref info) => write!(f, "Invalid configuration: {}", info),
            Error::InvalidVocabulary(ref info) => write!(f, "Invalid vocabulary: {}", info),
            Error::InvalidDataset(ref info) => write!(f, "Invalid dataset: {}", info),
            Error::MalformedStore(ref info) => write!(f, "Malformed store: {}", info),
            Error::MissingTable(ref key) => write!(f, "The store has no table called {:?}", key),
            Error::MissingColumn(ref column) => write!(f, "The table has no usable column {:?}", column),
            Error::UnknownWord(ref word) => write!(f, "{:?} is not in the space", word),
            Error::ShapeError(ref err) => write!(f, "NDArray shape error: {:?}", err),
            Error::IOError(ref err) => write!(f, "IO error: {}", err),
            Error::ParseFloatError(ref err) => write!(f, "Error parsing float: {}", err),
            Error::RegexError(ref err) => write!(f, "Bad file pattern: {}", err),
            Error::ThreadPoolError(ref err) => write!(f, "Could not start the worker pool: {}", err),
            Error::Other(ref info) => write!(f, "{}", info),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match *self {
            Error::ShapeError(ref err) => Some(err),
            Error::IOError(ref err) => Some(err),
            Error::ParseFloatError(ref err) => Some(err),
            Error::RegexError(ref err) => Some(err),
            Error::ThreadPoolError(ref err) => Some(err),
            _ => None,
        }
    }
}
//
// Convert everything else into Error
//
impl From<nd::ShapeError> for Error {
    fn from(err: nd::ShapeError) -> Self {
        Error::ShapeError(err)
    }
}
impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::IOError(err)
    }
}
impl From<num::ParseFloatError> for Error {
    fn from(err: num::ParseFloatError) -> Self {
        Error::ParseFloatError(err)
    }
}
impl From<regex::Error> for Error {
    fn from(err: regex::Error) -> Self {
        Error::RegexError(err)
    }
}
impl From<rayon::ThreadPoolBuildError> for Error {
    fn from(err: rayon::ThreadPoolBuildError) -> Self {
        Error::ThreadPoolError(err)
    }
}

//
// Convert Error into a general io Error
//
impl From<Error> for io::Error {
    fn from(err: Error) -> Self {
        io::Error::new(io::ErrorKind::Other, err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subunit_errors_name_the_file() {
        let err = Error::SubunitRead {
            subunit: "A/A0/A00.xml".to_string(),
            reason: "unexpected end of file".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("A/A0/A00.xml"));
        assert!(msg.contains("unexpected end of file"));
    }

    #[test]
    fn io_errors_convert_both_ways() {
        let err = Error::from(io::Error::new(io::ErrorKind::NotFound, "gone"));
        assert!(matches!(err, Error::IOError(_)));
        let back: io::Error = Error::EmptyReduction.into();
        assert_eq!(back.kind(), io::ErrorKind::Other);
    }
}
