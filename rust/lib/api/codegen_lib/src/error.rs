use std::path::PathBuf;

use thiserror::Error;

use crate::FileType;

/// Errors raised while generating Dart output.
///
/// Underlying serialization and I/O errors are carried untouched; nothing
/// here is retried.
#[derive(Error, Debug)]
pub enum CodegenError {
    /// The driver asked for a file kind this backend does not produce.
    #[error("bad file type for dart generator: {0}")]
    UnsupportedFileType(FileType),

    #[error("failed to serialize pubspec: {0}")]
    ManifestSerialize(#[from] serde_yaml::Error),

    #[error("failed to write pubspec {path:?}: {source}")]
    ManifestWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to update facade file {path:?}: {source}")]
    Facade {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read config {path:?}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path:?}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}
