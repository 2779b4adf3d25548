//! Errors raised while generating output artifacts.

use std::path::PathBuf;
use thiserror::Error;

use crate::config::ConfigError;

/// Failure of a single generator run.
///
/// Every variant is fatal to the generator that raised it; the build driver
/// stops at the first one and reports it.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("unknown section `{section}`")]
    NotFound { section: String },

    #[error("section `{0}` is defined more than once")]
    DuplicateSection(String),

    #[error("item path `{path}` appears twice in section `{section}`")]
    DuplicateItem { section: String, path: String },

    #[error("IO error at `{path}`")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("output path `{0}` escapes the output directory")]
    PathEscape(PathBuf),

    #[error("output path `{0}` is claimed by more than one generator")]
    OutputCollision(PathBuf),

    #[error("failed to render `{item}`: {message}")]
    Render { item: String, message: String },

    #[error("failed to start render workers")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl PublishError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn render(item: impl Into<String>, message: impl ToString) -> Self {
        Self::Render {
            item: item.into(),
            message: message.to_string(),
        }
    }
}

pub type Result<T, E = PublishError> = std::result::Result<T, E>;
