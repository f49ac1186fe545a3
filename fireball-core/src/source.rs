use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::catalog::{ProcessedCatalog, Processor, RawCatalog};
use crate::error::Result;

pub trait Fetcher {
    fn fetch(&self) -> Result<RawCatalog>;
}

/// Reads a catalog document previously saved from the API.
#[derive(Debug, Clone)]
pub struct FileFetcher {
    path: PathBuf,
}

impl FileFetcher {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        FileFetcher {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl Fetcher for FileFetcher {
    fn fetch(&self) -> Result<RawCatalog> {
        debug!("reading catalog from {}", self.path.display());
        let bytes = fs::read(&self.path)?;
        RawCatalog::from_bytes(&bytes)
    }
}

/// A fetcher paired with the processor that understands its output.
pub struct CatalogSource<F, P> {
    fetcher: F,
    processor: P,
}

impl<F: Fetcher, P: Processor> CatalogSource<F, P> {
    pub fn new(fetcher: F, processor: P) -> Self {
        CatalogSource { fetcher, processor }
    }

    pub fn load(&self) -> Result<ProcessedCatalog> {
        let raw = self.fetcher.fetch()?;
        Ok(self.processor.process(&raw))
    }
}

/// Object-safe view of a `CatalogSource` so queries need not be generic.
pub trait LoadCatalog {
    fn load_catalog(&self) -> Result<ProcessedCatalog>;
}

impl<F: Fetcher, P: Processor> LoadCatalog for CatalogSource<F, P> {
    fn load_catalog(&self) -> Result<ProcessedCatalog> {
        self.load()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::FireballProcessor;
    use crate::error::FireballError;
    use std::io::Write;

    #[test]
    fn file_fetcher_feeds_processor() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"data": [["2018-06-02 16:44:12", "0.98", "0.053", "14.8", "S", "21.5", "E"]]}}"#
        )
        .unwrap();

        let source = CatalogSource::new(FileFetcher::new(file.path()), FireballProcessor);
        let catalog = source.load().unwrap();
        assert_eq!(catalog.records.len(), 1);
        assert_eq!(catalog.records[0].latitude, 14.8);
        assert_eq!(catalog.records[0].longitude, 21.5);
        assert!(catalog.sha256.is_some());
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = CatalogSource::new(
            FileFetcher::new(dir.path().join("absent.json")),
            FireballProcessor,
        );
        assert!(matches!(source.load_catalog(), Err(FireballError::Io(_))));
    }
}
