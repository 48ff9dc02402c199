//! Vector-space retrieval engine: an inverted index with log tf-idf weights,
//! per-term champion lists, and cosine / Jaccard top-k scoring.

pub mod champions;
pub mod config;
pub mod corpus;
pub mod document;
pub mod engine;
pub mod error;
pub mod index;
pub mod scorer;
pub mod tokenizer;

pub use config::EngineConfig;
pub use document::{DocId, Document};
pub use engine::{SearchEngine, SearchHit, SearchOutcome};
pub use error::{Error, Result};
pub use index::{IndexSnapshot, InvertedIndex, Posting, TermEntry};
pub use scorer::Similarity;
pub use tokenizer::{StandardTokenizer, Tokenizer, WhitespaceTokenizer};
