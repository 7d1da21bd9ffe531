use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failure of a persistence operation. The in-memory trie is left intact.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("term file not found: {path:?}")]
    NotFound { path: PathBuf },

    #[error("failed to access term file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl PersistError {
    pub(crate) fn at(path: impl Into<PathBuf>, source: io::Error) -> Self {
        let path = path.into();
        if source.kind() == io::ErrorKind::NotFound {
            Self::NotFound { path }
        } else {
            Self::Io { path, source }
        }
    }
}
