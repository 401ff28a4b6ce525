use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while building the phonemiser.
///
/// Lookups never fail: a word that cannot be transcribed is `None`, not an error.
#[derive(Error, Debug)]
pub enum G2pError {
    #[error("missing required configuration property '{0}'")]
    MissingProperty(String),

    #[error("required file not found: {}", .0.display())]
    MissingFile(PathBuf),

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid transcription '{transcription}': no allophone matches '{remainder}'")]
    InvalidTranscription {
        transcription: String,
        remainder: String,
    },

    #[error("invalid allophone set: {0}")]
    AllophoneSet(String),

    #[error("invalid letter-to-sound model: {0}")]
    LetterToSound(String),
}

pub type Result<T> = std::result::Result<T, G2pError>;

impl G2pError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        G2pError::Io { path: path.into(), source }
    }

    pub(crate) fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        G2pError::Json { path: path.into(), source }
    }
}
