//! Query scoring over a finalized [`InvertedIndex`].
//!
//! Cosine uses lnc.ltc-style weights: documents carry raw log tf, the query
//! carries log tf times idf, and each accumulated dot product is divided by
//! the document's tf-vector norm. Jaccard compares distinct term sets.

use crate::index::{tf, InvertedIndex};
use crate::{DocId, Error};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Similarity {
    #[default]
    Cosine,
    Jaccard,
}

impl FromStr for Similarity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cosine" => Ok(Similarity::Cosine),
            "jaccard" => Ok(Similarity::Jaccard),
            _ => Err(Error::UnknownSimilarityMode(s.to_string())),
        }
    }
}

impl fmt::Display for Similarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Similarity::Cosine => f.write_str("cosine"),
            Similarity::Jaccard => f.write_str("jaccard"),
        }
    }
}

/// Per-document values the scorers need besides the index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DocStats {
    /// Norm of the log-tf vector.
    pub length: f64,
    /// Number of distinct terms.
    pub distinct_terms: usize,
}

/// Query multiset. Ordered so that score accumulation is reproducible.
pub fn count_terms(tokens: &[String]) -> BTreeMap<&str, u32> {
    let mut counts = BTreeMap::new();
    for token in tokens {
        *counts.entry(token.as_str()).or_insert(0) += 1;
    }
    counts
}

#[derive(Debug, Default)]
pub struct Scores {
    pub scores: HashMap<DocId, f64>,
    /// Whether champion lists were actually used.
    pub champions_used: bool,
}

/// Number of distinct documents the query's champion lists can supply.
pub fn champion_candidates(index: &InvertedIndex, query: &BTreeMap<&str, u32>) -> usize {
    let mut candidates: HashSet<DocId> = HashSet::new();
    for term in query.keys() {
        if let Some(entry) = index.get(term) {
            candidates.extend(entry.champion_ids());
        }
    }
    candidates.len()
}

pub fn cosine(
    index: &InvertedIndex,
    query: &BTreeMap<&str, u32>,
    k: usize,
    use_champions: bool,
    stats: &HashMap<DocId, DocStats>,
) -> Scores {
    let mut champions_used = use_champions && index.champion_capacity() > 0;
    if champions_used {
        let available = champion_candidates(index, query);
        if available < k {
            tracing::debug!(available, k, "too few champion candidates, scoring full postings");
            champions_used = false;
        }
    }

    let mut scores: HashMap<DocId, f64> = HashMap::new();
    for (term, &count) in query {
        let Some(entry) = index.get(term) else { continue };
        let w_tq = tf(count) * entry.inverse_document_frequency;
        if champions_used {
            for &(doc_id, doc_tf) in &entry.champions {
                *scores.entry(doc_id).or_insert(0.0) += w_tq * doc_tf;
            }
        } else {
            for (&doc_id, posting) in &entry.postings {
                *scores.entry(doc_id).or_insert(0.0) += w_tq * posting.tf;
            }
        }
    }

    for (doc_id, score) in scores.iter_mut() {
        if let Some(length) = stats.get(doc_id).map(|s| s.length).filter(|l| *l > 0.0) {
            *score /= length;
        }
    }
    Scores { scores, champions_used }
}

pub fn jaccard(index: &InvertedIndex, query: &BTreeMap<&str, u32>, stats: &HashMap<DocId, DocStats>) -> Scores {
    let mut intersections: HashMap<DocId, usize> = HashMap::new();
    for term in query.keys() {
        let Some(entry) = index.get(term) else { continue };
        for &doc_id in entry.postings.keys() {
            *intersections.entry(doc_id).or_insert(0) += 1;
        }
    }

    // |D ∪ Q| = |D| + |Q| - |D ∩ Q|, with Q including terms the index has never seen.
    let query_terms = query.len();
    let scores = intersections
        .into_iter()
        .filter_map(|(doc_id, shared)| {
            let doc_terms = stats.get(&doc_id)?.distinct_terms;
            let union = doc_terms + query_terms - shared;
            Some((doc_id, shared as f64 / union as f64))
        })
        .collect();
    Scores { scores, champions_used: false }
}

/// Highest `k` scores, descending; equal scores order by doc id ascending.
pub fn top_k(scores: HashMap<DocId, f64>, k: usize) -> Vec<(DocId, f64)> {
    if k == 0 {
        return Vec::new();
    }
    let mut ranked: Vec<(DocId, f64)> = scores.into_iter().collect();
    ranked.sort_unstable_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
    ranked.truncate(k);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Document;

    fn doc(id: DocId, terms: &[&str]) -> Document {
        Document::new(id, "", terms.join(" "), None, terms.iter().map(|s| s.to_string()).collect())
    }

    fn fixture(capacity: usize) -> (InvertedIndex, HashMap<DocId, DocStats>) {
        let docs = vec![doc(1, &["a", "b", "a"]), doc(2, &["b", "c"]), doc(3, &["a", "c", "c"])];
        let index = InvertedIndex::build(&docs, capacity).unwrap();
        let stats = docs
            .iter()
            .map(|d| (d.id, DocStats { length: d.length(), distinct_terms: d.term_set().len() }))
            .collect();
        (index, stats)
    }

    fn tokens(s: &str) -> Vec<String> {
        s.split_whitespace().map(String::from).collect()
    }

    #[test]
    fn parses_modes() {
        assert_eq!("cosine".parse::<Similarity>().unwrap(), Similarity::Cosine);
        assert_eq!(" Jaccard ".parse::<Similarity>().unwrap(), Similarity::Jaccard);
        assert!(matches!("bm25".parse::<Similarity>(), Err(Error::UnknownSimilarityMode(_))));
        assert_eq!(Similarity::Jaccard.to_string(), "jaccard");
    }

    #[test]
    fn cosine_scores_match_hand_computation() {
        let (index, stats) = fixture(0);
        let q = tokens("a c");
        let out = cosine(&index, &count_terms(&q), 2, false, &stats);
        let idf = (3.0f64 / 2.0).log10();
        let tf2 = 1.0 + 2f64.log10();
        let len1 = (tf2 * tf2 + 1.0).sqrt();
        let len3 = (1.0 + tf2 * tf2).sqrt();
        assert!((out.scores[&1] - idf * tf2 / len1).abs() < 1e-12);
        assert!((out.scores[&2] - idf / 2f64.sqrt()).abs() < 1e-12);
        assert!((out.scores[&3] - idf * (1.0 + tf2) / len3).abs() < 1e-12);
        let ranked: Vec<DocId> = top_k(out.scores, 2).into_iter().map(|(d, _)| d).collect();
        assert_eq!(ranked, vec![3, 1]);
    }

    #[test]
    fn repeated_query_terms_raise_query_weight() {
        let (index, stats) = fixture(0);
        let once = cosine(&index, &count_terms(&tokens("c")), 10, false, &stats);
        let twice = cosine(&index, &count_terms(&tokens("c c")), 10, false, &stats);
        assert!(twice.scores[&3] > once.scores[&3]);
    }

    #[test]
    fn unknown_terms_contribute_nothing() {
        let (index, stats) = fixture(0);
        let out = cosine(&index, &count_terms(&tokens("zzz")), 5, false, &stats);
        assert!(out.scores.is_empty());
    }

    #[test]
    fn champions_disabled_when_too_few_candidates() {
        let (index, stats) = fixture(1);
        let q = tokens("a");
        let out = cosine(&index, &count_terms(&q), 2, true, &stats);
        assert!(!out.champions_used);
        assert_eq!(out.scores.len(), 2);

        let out = cosine(&index, &count_terms(&q), 1, true, &stats);
        assert!(out.champions_used);
        assert_eq!(out.scores.keys().copied().collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn zero_capacity_ignores_champion_request() {
        let (index, stats) = fixture(0);
        let out = cosine(&index, &count_terms(&tokens("a")), 0, true, &stats);
        assert!(!out.champions_used);
        assert_eq!(out.scores.len(), 2);
    }

    #[test]
    fn jaccard_uses_term_sets() {
        let (index, stats) = fixture(0);
        let out = jaccard(&index, &count_terms(&tokens("a c a")), &stats);
        // doc1 {a,b} vs {a,c}: 1/3; doc2 {b,c}: 1/3; doc3 {a,c}: 2/2
        assert!((out.scores[&1] - 1.0 / 3.0).abs() < 1e-12);
        assert!((out.scores[&2] - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(out.scores[&3], 1.0);
    }

    #[test]
    fn jaccard_union_counts_unknown_query_terms() {
        let (index, stats) = fixture(0);
        let out = jaccard(&index, &count_terms(&tokens("a zzz")), &stats);
        // doc1 {a,b} ∪ {a,zzz} = 3
        assert!((out.scores[&1] - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn top_k_breaks_ties_by_doc_id() {
        let scores: HashMap<DocId, f64> = [(9, 0.5), (2, 0.5), (4, 0.9)].into_iter().collect();
        assert_eq!(top_k(scores.clone(), 3), vec![(4, 0.9), (2, 0.5), (9, 0.5)]);
        assert_eq!(top_k(scores.clone(), 10).len(), 3);
        assert!(top_k(scores, 0).is_empty());
    }
}
