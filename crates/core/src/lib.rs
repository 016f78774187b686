//! Core shared types and errors (renderer-agnostic).

use std::{io, path::PathBuf};

use thiserror::Error;

pub use glam::{Vec2, Vec3};

/// Failure of one of the fetch capabilities (text or image).
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{} is not valid UTF-8 text", .path.display())]
    NotText { path: PathBuf },
    #[error("failed to decode image {}: {message}", .path.display())]
    Decode { path: PathBuf, message: String },
    #[error("no such resource: {}", .path.display())]
    NotFound { path: PathBuf },
}

impl FetchError {
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::Io { path, .. }
            | Self::NotText { path }
            | Self::Decode { path, .. }
            | Self::NotFound { path } => path,
        }
    }
}

/// Fatal failure of a mesh load. Only text fetches can produce one.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to fetch geometry {}", .path.display())]
    Geometry {
        path: PathBuf,
        #[source]
        source: FetchError,
    },
    #[error("failed to fetch material library {}", .path.display())]
    Material {
        path: PathBuf,
        #[source]
        source: FetchError,
    },
}

pub type LoadResult<T> = Result<T, LoadError>;
