//! Platform layer: concrete [`Fetch`] sources.
//!
//! - [`FsFetcher`] reads files below a root directory.
//! - [`MemoryFetcher`] serves bytes registered up front (embedded assets,
//!   tests, archives unpacked by the caller).

use std::{
    collections::HashMap,
    fs, io,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, bail};
use asset::TextureData;
use corelib::FetchError;
use renderer::Fetch;

/// Reads model files from the local filesystem. Paths handed to it are
/// joined onto `root`.
#[derive(Clone, Debug)]
pub struct FsFetcher {
    root: PathBuf,
}

impl FsFetcher {
    /// Create a fetcher rooted at an existing directory.
    pub fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref();
        let meta = fs::metadata(root)
            .with_context(|| format!("Failed to open asset root {}", root.display()))?;
        if !meta.is_dir() {
            bail!("Asset root {} is not a directory", root.display());
        }
        log::info!("Serving assets from {}", root.display());
        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn read(&self, path: &Path) -> Result<Vec<u8>, FetchError> {
        let full = self.root.join(path);
        log::debug!("Reading {}", full.display());
        fs::read(&full).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => FetchError::NotFound {
                path: path.to_path_buf(),
            },
            _ => FetchError::Io {
                path: path.to_path_buf(),
                source,
            },
        })
    }
}

impl Fetch for FsFetcher {
    async fn fetch_text(&self, path: &Path) -> Result<String, FetchError> {
        let bytes = self.read(path)?;
        into_text(path, bytes)
    }

    async fn fetch_image(&self, path: &Path) -> Result<TextureData, FetchError> {
        let bytes = self.read(path)?;
        decode_image(path, &bytes)
    }
}

/// Serves files from memory.
#[derive(Clone, Debug, Default)]
pub struct MemoryFetcher {
    files: HashMap<PathBuf, Vec<u8>>,
}

impl MemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<PathBuf>, bytes: impl Into<Vec<u8>>) -> &mut Self {
        self.files.insert(path.into(), bytes.into());
        self
    }

    pub fn with(mut self, path: impl Into<PathBuf>, bytes: impl Into<Vec<u8>>) -> Self {
        self.insert(path, bytes);
        self
    }

    fn get(&self, path: &Path) -> Result<&[u8], FetchError> {
        self.files
            .get(path)
            .map(Vec::as_slice)
            .ok_or_else(|| FetchError::NotFound {
                path: path.to_path_buf(),
            })
    }
}

impl Fetch for MemoryFetcher {
    async fn fetch_text(&self, path: &Path) -> Result<String, FetchError> {
        into_text(path, self.get(path)?.to_vec())
    }

    async fn fetch_image(&self, path: &Path) -> Result<TextureData, FetchError> {
        decode_image(path, self.get(path)?)
    }
}

fn into_text(path: &Path, bytes: Vec<u8>) -> Result<String, FetchError> {
    String::from_utf8(bytes).map_err(|_| FetchError::NotText {
        path: path.to_path_buf(),
    })
}

fn decode_image(path: &Path, bytes: &[u8]) -> Result<TextureData, FetchError> {
    TextureData::decode(bytes).map_err(|err| FetchError::Decode {
        path: path.to_path_buf(),
        message: format!("{err:#}"),
    })
}
