use std::io;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, EchoError>;

/// Errors surfaced by a single user action. None of them leave the
/// session in a half-updated state.
#[derive(Debug, Error)]
pub enum EchoError {
    #[error("could not parse any nodes/edges ({skipped} malformed lines skipped)")]
    Parse { skipped: usize },

    #[error("edge ({0}, {1}) does not exist")]
    EdgeNotFound(String, String),

    #[error("both node names are required")]
    MissingInput,

    #[error("no network loaded")]
    NotLoaded,

    #[error("cannot detect communities in an empty graph")]
    EmptyGraph,

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] io::Error),
}
