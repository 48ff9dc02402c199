//! Search engine facade: owns the finalized index, the documents and the
//! tokenizer used for queries.

use crate::index::{IndexSnapshot, InvertedIndex, TermEntry};
use crate::scorer::{self, DocStats, Similarity};
use crate::tokenizer::{StandardTokenizer, Tokenizer};
use crate::{DocId, Document, EngineConfig, Result};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SearchHit {
    pub doc_id: DocId,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchOutcome {
    pub mode: Similarity,
    /// Ranked hits, at most `k`.
    pub hits: Vec<SearchHit>,
    /// Documents that received a score before truncation to `k`.
    pub total_hits: usize,
    pub champions_used: bool,
}

impl SearchOutcome {
    pub fn doc_ids(&self) -> Vec<DocId> {
        self.hits.iter().map(|h| h.doc_id).collect()
    }
}

/// Built once, then read-only. Queries take `&self` and keep their score
/// accumulators local, so one engine can serve many threads without locking.
pub struct SearchEngine<T: Tokenizer = StandardTokenizer> {
    index: InvertedIndex,
    documents: BTreeMap<DocId, Document>,
    stats: HashMap<DocId, DocStats>,
    tokenizer: T,
}

impl<T: Tokenizer> SearchEngine<T> {
    /// Build the index over `documents`. Fails with `EmptyCollection` when
    /// there are none and `DuplicateDocument` when two share an id.
    pub fn new<I>(documents: I, champion_capacity: usize, tokenizer: T) -> Result<Self>
    where
        I: IntoIterator<Item = Document>,
    {
        let documents: Vec<Document> = documents.into_iter().collect();
        let index = InvertedIndex::build(&documents, champion_capacity)?;
        let stats = documents
            .iter()
            .map(|d| (d.id, DocStats { length: d.length(), distinct_terms: d.term_set().len() }))
            .collect();
        let documents = documents.into_iter().map(|d| (d.id, d)).collect();
        Ok(Self { index, documents, stats, tokenizer })
    }

    pub fn with_config<I>(documents: I, config: &EngineConfig, tokenizer: T) -> Result<Self>
    where
        I: IntoIterator<Item = Document>,
    {
        Self::new(documents, config.champion_capacity, tokenizer)
    }

    /// Ranked document ids for `query`, at most `k` of them.
    pub fn search(&self, query: &str, k: usize, mode: Similarity, use_champions: bool) -> Vec<DocId> {
        self.search_scored(query, k, mode, use_champions).doc_ids()
    }

    pub fn search_scored(&self, query: &str, k: usize, mode: Similarity, use_champions: bool) -> SearchOutcome {
        let tokens = self.tokenizer.tokenize(query);
        let terms = scorer::count_terms(&tokens);
        let scored = match mode {
            Similarity::Cosine => scorer::cosine(&self.index, &terms, k, use_champions, &self.stats),
            Similarity::Jaccard => scorer::jaccard(&self.index, &terms, &self.stats),
        };
        let total_hits = scored.scores.len();
        let hits: Vec<SearchHit> = scorer::top_k(scored.scores, k)
            .into_iter()
            .map(|(doc_id, score)| SearchHit { doc_id, score })
            .collect();
        tracing::debug!(
            %mode,
            k,
            query_terms = terms.len(),
            total_hits,
            returned = hits.len(),
            champions_used = scored.champions_used,
            "search complete"
        );
        SearchOutcome { mode, hits, total_hits, champions_used: scored.champions_used }
    }

    /// Complete index contents, for diagnostics.
    pub fn dump(&self) -> IndexSnapshot {
        self.index.snapshot()
    }

    pub fn index(&self) -> &InvertedIndex {
        &self.index
    }

    pub fn term(&self, term: &str) -> Option<&TermEntry> {
        self.index.get(term)
    }

    pub fn document(&self, doc_id: DocId) -> Option<&Document> {
        self.documents.get(&doc_id)
    }

    /// Documents in ascending id order.
    pub fn documents(&self) -> impl Iterator<Item = &Document> {
        self.documents.values()
    }

    /// Cached tf-vector norm of a document.
    pub fn document_length(&self, doc_id: DocId) -> Option<f64> {
        self.stats.get(&doc_id).map(|s| s.length)
    }

    pub fn num_docs(&self) -> usize {
        self.index.num_docs()
    }

    pub fn num_terms(&self) -> usize {
        self.index.num_terms()
    }

    pub fn champion_capacity(&self) -> usize {
        self.index.champion_capacity()
    }
}
