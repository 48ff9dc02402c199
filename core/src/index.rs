use crate::champions::ChampionSelector;
use crate::{DocId, Document, Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Log-dampened term frequency, `1 + log10(frequency)`. Zero occurrences weigh nothing.
pub fn tf(frequency: u32) -> f64 {
    if frequency == 0 { 0.0 } else { 1.0 + (frequency as f64).log10() }
}

/// `log10(N / df)`. Callers guarantee `document_frequency >= 1`.
pub fn idf(document_frequency: usize, num_docs: usize) -> f64 {
    (num_docs as f64 / document_frequency as f64).log10()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Posting {
    pub frequency: u32,
    pub tf: f64,
    /// Token offsets within the document, ascending.
    pub positions: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermEntry {
    pub document_frequency: usize,
    pub inverse_document_frequency: f64,
    pub total_frequency: u64,
    pub postings: BTreeMap<DocId, Posting>,
    /// Highest-tf subset of `postings`, tf descending.
    pub champions: Vec<(DocId, f64)>,
}

impl TermEntry {
    pub fn champion_ids(&self) -> impl Iterator<Item = DocId> + '_ {
        self.champions.iter().map(|(doc_id, _)| *doc_id)
    }
}

/// Full index contents for diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexSnapshot {
    pub num_docs: usize,
    pub champion_capacity: usize,
    pub terms: BTreeMap<String, TermEntry>,
}

#[derive(Default)]
struct RawPosting {
    frequency: u32,
    positions: Vec<usize>,
}

#[derive(Default)]
struct RawEntry {
    total_frequency: u64,
    postings: BTreeMap<DocId, RawPosting>,
}

/// Scan-pass state. Nothing here carries a weight; only [`IndexBuilder::finish`]
/// produces an [`InvertedIndex`], so an unfinalized index is never queryable.
#[derive(Default)]
struct IndexBuilder {
    terms: BTreeMap<String, RawEntry>,
    seen: HashSet<DocId>,
}

impl IndexBuilder {
    fn add_document(&mut self, doc: &Document) -> Result<()> {
        if !self.seen.insert(doc.id) {
            return Err(Error::DuplicateDocument(doc.id));
        }
        for (position, term) in doc.preprocessed_content.iter().enumerate() {
            let entry = self.terms.entry(term.clone()).or_default();
            let posting = entry.postings.entry(doc.id).or_default();
            posting.frequency += 1;
            posting.positions.push(position);
            entry.total_frequency += 1;
        }
        Ok(())
    }

    fn finish(self, champion_capacity: usize) -> Result<InvertedIndex> {
        let num_docs = self.seen.len();
        if num_docs == 0 {
            return Err(Error::EmptyCollection);
        }
        let terms = self
            .terms
            .into_iter()
            .map(|(term, raw)| {
                let document_frequency = raw.postings.len();
                let mut selector = ChampionSelector::new(champion_capacity);
                let postings = raw
                    .postings
                    .into_iter()
                    .map(|(doc_id, p)| {
                        let weight = tf(p.frequency);
                        selector.offer(doc_id, weight);
                        (doc_id, Posting { frequency: p.frequency, tf: weight, positions: p.positions })
                    })
                    .collect();
                let entry = TermEntry {
                    document_frequency,
                    inverse_document_frequency: idf(document_frequency, num_docs),
                    total_frequency: raw.total_frequency,
                    postings,
                    champions: selector.finish(),
                };
                (term, entry)
            })
            .collect();
        Ok(InvertedIndex { terms, num_docs, champion_capacity })
    }
}

/// Finalized inverted index: term -> statistics, postings and champions.
/// Read-only once built.
#[derive(Debug, Clone)]
pub struct InvertedIndex {
    terms: BTreeMap<String, TermEntry>,
    num_docs: usize,
    champion_capacity: usize,
}

impl InvertedIndex {
    /// Scan every document, then compute tf, idf and champion lists.
    pub fn build<'a, I>(documents: I, champion_capacity: usize) -> Result<Self>
    where
        I: IntoIterator<Item = &'a Document>,
    {
        let mut builder = IndexBuilder::default();
        for doc in documents {
            builder.add_document(doc)?;
        }
        let index = builder.finish(champion_capacity)?;
        tracing::info!(
            num_docs = index.num_docs,
            num_terms = index.terms.len(),
            champion_capacity,
            "index build complete"
        );
        Ok(index)
    }

    pub fn get(&self, term: &str) -> Option<&TermEntry> {
        self.terms.get(term)
    }

    /// Terms in lexicographic order.
    pub fn terms(&self) -> impl Iterator<Item = (&str, &TermEntry)> {
        self.terms.iter().map(|(t, e)| (t.as_str(), e))
    }

    pub fn num_docs(&self) -> usize {
        self.num_docs
    }

    pub fn num_terms(&self) -> usize {
        self.terms.len()
    }

    pub fn num_postings(&self) -> usize {
        self.terms.values().map(|e| e.postings.len()).sum()
    }

    pub fn champion_capacity(&self) -> usize {
        self.champion_capacity
    }

    pub fn snapshot(&self) -> IndexSnapshot {
        IndexSnapshot {
            num_docs: self.num_docs,
            champion_capacity: self.champion_capacity,
            terms: self.terms.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(id: DocId, terms: &[&str]) -> Document {
        Document::new(id, format!("doc {id}"), terms.join(" "), None, terms.iter().map(|s| s.to_string()).collect())
    }

    fn corpus() -> Vec<Document> {
        vec![doc(1, &["a", "b", "a"]), doc(2, &["b", "c"]), doc(3, &["a", "c", "c"])]
    }

    #[test]
    fn tf_and_idf_formulas() {
        assert_eq!(tf(1), 1.0);
        assert!((tf(10) - 2.0).abs() < 1e-12);
        assert_eq!(tf(0), 0.0);
        assert!((idf(1, 10) - 1.0).abs() < 1e-12);
        assert_eq!(idf(4, 4), 0.0);
    }

    #[test]
    fn empty_collection_is_rejected() {
        let docs: Vec<Document> = Vec::new();
        assert!(matches!(InvertedIndex::build(&docs, 3), Err(Error::EmptyCollection)));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let docs = vec![doc(1, &["a"]), doc(1, &["b"])];
        assert!(matches!(InvertedIndex::build(&docs, 0), Err(Error::DuplicateDocument(1))));
    }

    #[test]
    fn scan_records_frequency_and_positions() {
        let docs = corpus();
        let index = InvertedIndex::build(&docs, 0).unwrap();
        let a = index.get("a").unwrap();
        assert_eq!(a.document_frequency, 2);
        assert_eq!(a.total_frequency, 3);
        assert_eq!(a.postings[&1].frequency, 2);
        assert_eq!(a.postings[&1].positions, vec![0, 2]);
        assert_eq!(a.postings[&3].positions, vec![0]);
        assert!((a.postings[&1].tf - (1.0 + 2f64.log10())).abs() < 1e-12);
        assert!((a.inverse_document_frequency - (3.0f64 / 2.0).log10()).abs() < 1e-12);
    }

    #[test]
    fn terms_iterate_in_lexicographic_order() {
        let docs = corpus();
        let index = InvertedIndex::build(&docs, 0).unwrap();
        let terms: Vec<&str> = index.terms().map(|(t, _)| t).collect();
        assert_eq!(terms, vec!["a", "b", "c"]);
        assert_eq!(index.num_postings(), 6);
    }

    #[test]
    fn zero_capacity_leaves_champions_empty() {
        let docs = corpus();
        let index = InvertedIndex::build(&docs, 0).unwrap();
        assert!(index.terms().all(|(_, e)| e.champions.is_empty()));
    }

    #[test]
    fn champions_hold_highest_tf() {
        let docs = corpus();
        let index = InvertedIndex::build(&docs, 1).unwrap();
        let c = index.get("c").unwrap();
        assert_eq!(c.champion_ids().collect::<Vec<_>>(), vec![3]);
        let a = index.get("a").unwrap();
        assert_eq!(a.champion_ids().collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn tied_champions_keep_later_documents() {
        let docs = vec![doc(1, &["a"]), doc(2, &["a"]), doc(3, &["a", "a"])];
        let index = InvertedIndex::build(&docs, 2).unwrap();
        assert_eq!(index.get("a").unwrap().champion_ids().collect::<Vec<_>>(), vec![3, 2]);
    }

    #[test]
    fn document_without_terms_is_counted_but_not_posted() {
        let docs = vec![doc(1, &["a"]), doc(2, &[])];
        let index = InvertedIndex::build(&docs, 0).unwrap();
        assert_eq!(index.num_docs(), 2);
        assert!((index.get("a").unwrap().inverse_document_frequency - 2f64.log10()).abs() < 1e-12);
    }
}
