use crate::DocId;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Build attempted on a collection with no documents.
    #[error("cannot build an index from an empty document collection")]
    EmptyCollection,

    #[error("unknown similarity mode: {0:?} (expected \"cosine\" or \"jaccard\")")]
    UnknownSimilarityMode(String),

    /// Two documents in one build share the same id.
    #[error("duplicate document id: {0}")]
    DuplicateDocument(DocId),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid input: {0}")]
    InvalidInput(String),
}
