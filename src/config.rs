//! Options for the counting commands
use crate::errors::*;
use crate::reduce::DEFAULT_CHUNK_SIZE;

/// Files handed to the pool at once; bounds how many partial tables are alive
pub const DEFAULT_BATCH_SIZE: usize = 100;
pub const DEFAULT_WINDOW_SIZE: usize = 5;

/// Settings of a co-occurrence run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountingOptions {
    /// Largest distance between a target and its context
    pub window_size: usize,
    /// Tables summed by one reduction task
    pub chunk_size: usize,
    /// Files per batch
    pub batch_size: usize,
    /// Count headwords instead of written forms
    pub stem: bool,
}

impl Default for CountingOptions {
    fn default() -> Self {
        CountingOptions {
            window_size: DEFAULT_WINDOW_SIZE,
            chunk_size: DEFAULT_CHUNK_SIZE,
            batch_size: DEFAULT_BATCH_SIZE,
            stem: false,
        }
    }
}

impl CountingOptions {
    pub fn validate(&self) -> Result<()> {
        if self.window_size == 0 {
            return Err(Error::InvalidConfig("the window size must be at least 1".into()));
        }
        validate_fan_in(self.chunk_size, self.batch_size)
    }
}

/// Settings of a word frequency run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DictionaryOptions {
    /// Use the detailed C5 tags
    pub c5: bool,
    pub stem: bool,
    /// Count words regardless of their tag
    pub omit_tags: bool,
    pub chunk_size: usize,
    pub batch_size: usize,
}

impl Default for DictionaryOptions {
    fn default() -> Self {
        DictionaryOptions {
            c5: false,
            stem: false,
            omit_tags: false,
            chunk_size: DEFAULT_CHUNK_SIZE,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

impl DictionaryOptions {
    pub fn validate(&self) -> Result<()> {
        validate_fan_in(self.chunk_size, self.batch_size)
    }
}

fn validate_fan_in(chunk_size: usize, batch_size: usize) -> Result<()> {
    if chunk_size < 2 {
        return Err(Error::InvalidConfig(format!("the chunk size must be at least 2, not {}", chunk_size)));
    }
    if batch_size == 0 {
        return Err(Error::InvalidConfig("the batch size must be at least 1".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let options = CountingOptions::default();
        assert_eq!((options.window_size, options.chunk_size, options.batch_size), (5, 7, 100));
        assert!(options.validate().is_ok());
        assert!(DictionaryOptions::default().validate().is_ok());
    }

    #[test]
    fn degenerate_settings_are_refused() {
        let zero_window = CountingOptions { window_size: 0, ..Default::default() };
        assert!(matches!(zero_window.validate(), Err(Error::InvalidConfig(_))));
        let tiny_chunks = CountingOptions { chunk_size: 1, ..Default::default() };
        assert!(tiny_chunks.validate().is_err());
        let no_batches = DictionaryOptions { batch_size: 0, ..Default::default() };
        assert!(no_batches.validate().is_err());
    }
}
