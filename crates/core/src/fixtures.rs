//! Bundled seed data and fixture-file loading.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::Catalog;

const BUNDLED: &str = include_str!("../fixtures/catalog.json");

#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("failed to read fixtures at {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse fixtures at {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl Catalog {
    /// The seed collections compiled into the binary.
    pub fn bundled() -> Result<Catalog, FixtureError> {
        serde_json::from_str(BUNDLED).map_err(|source| FixtureError::Parse {
            path: PathBuf::from("<bundled>"),
            source,
        })
    }

    /// Load collections from a JSON file with the same shape as the
    /// bundled set (camelCase keys).
    pub fn load(path: &Path) -> Result<Catalog, FixtureError> {
        let text = std::fs::read_to_string(path).map_err(|source| FixtureError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| FixtureError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}
