use crate::index::tf;
use crate::tokenizer::Tokenizer;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

pub type DocId = u32;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: DocId,
    pub title: String,
    pub original_content: String,
    pub url: Option<String>,
    /// Normalized terms in token order; the index stores offsets into this sequence.
    pub preprocessed_content: Vec<String>,
}

impl Document {
    pub fn new(id: DocId, title: impl Into<String>, original_content: impl Into<String>, url: Option<String>, preprocessed_content: Vec<String>) -> Self {
        Self { id, title: title.into(), original_content: original_content.into(), url, preprocessed_content }
    }

    /// Build a document whose terms come from the tokenizer's document pipeline.
    pub fn from_text<T: Tokenizer + ?Sized>(id: DocId, title: impl Into<String>, content: impl Into<String>, url: Option<String>, tokenizer: &T) -> Self {
        let content = content.into();
        let terms = tokenizer.tokenize_document(&content);
        Self::new(id, title, content, url, terms)
    }

    /// Raw occurrence count per distinct term.
    pub fn term_counts(&self) -> HashMap<&str, u32> {
        let mut counts: HashMap<&str, u32> = HashMap::new();
        for term in &self.preprocessed_content {
            *counts.entry(term.as_str()).or_insert(0) += 1;
        }
        counts
    }

    pub fn term_set(&self) -> HashSet<&str> {
        self.preprocessed_content.iter().map(String::as_str).collect()
    }

    /// Euclidean norm of the document's log-tf vector (no idf scaling).
    /// An empty document has length 0.
    pub fn length(&self) -> f64 {
        self.term_counts()
            .values()
            .map(|&count| {
                let w = tf(count);
                w * w
            })
            .sum::<f64>()
            .sqrt()
    }
}
