use lazy_static::lazy_static;
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use std::collections::{HashMap, HashSet};
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    static ref RE: Regex = Regex::new(r"(?u)\p{L}[\p{L}\p{N}_']*").expect("valid regex");
    static ref STOPWORDS: HashSet<&'static str> = {
        let words: &[&str] = &[
            "a","about","above","after","again","against","all","am","an","and","any","are","aren't","as","at",
            "be","because","been","before","being","below","between","both","but","by",
            "can","can't","cannot","could","couldn't",
            "did","didn't","do","does","doesn't","doing","don't","down","during",
            "each","few","for","from","further",
            "had","hadn't","has","hasn't","have","haven't","having","he","he'd","he'll","he's","her","here","here's","hers","herself","him","himself","his","how","how's",
            "i","i'd","i'll","i'm","i've","if","in","into","is","isn't","it","it's","its","itself",
            "let's","me","more","most","mustn't","my","myself",
            "no","nor","not","of","off","on","once","only","or","other","ought","our","ours","ourselves","out","over","own",
            "same","she","she'd","she'll","she's","should","shouldn't","so","some","such",
            "than","that","that's","the","their","theirs","them","themselves","then","there","there's","these","they","they'd","they'll","they're","they've","this","those","through","to","too",
            "under","until","up","very",
            "was","wasn't","we","we'd","we'll","we're","we've","were","weren't","what","what's","when","when's","where","where's","which","while","who","who's","whom","why","why's","with","won't","would","wouldn't",
            "you","you'd","you'll","you're","you've","your","yours","yourself","yourselves"
        ];
        words.iter().copied().collect()
    };
}

/// Turns raw text into an ordered sequence of normalized terms.
/// Implementations must be deterministic: documents and queries go through the same instance.
pub trait Tokenizer: Send + Sync {
    /// Query-side pipeline.
    fn tokenize(&self, text: &str) -> Vec<String>;

    /// Document-side pipeline. Corpus-level filtering belongs here, never in `tokenize`.
    fn tokenize_document(&self, text: &str) -> Vec<String> {
        self.tokenize(text)
    }
}

/// Lowercased whitespace split, for text that is already normalized.
#[derive(Debug, Clone, Copy, Default)]
pub struct WhitespaceTokenizer;

impl Tokenizer for WhitespaceTokenizer {
    fn tokenize(&self, text: &str) -> Vec<String> {
        text.split_whitespace().map(str::to_lowercase).collect()
    }
}

/// NFKC normalization, lowercase, stopword removal and English stemming.
///
/// Documents can additionally lose the most frequent terms of a corpus, see
/// [`StandardTokenizer::with_frequent_terms`]. Queries keep them. That list
/// belongs to the instance, so separate engines never share it.
pub struct StandardTokenizer {
    stemmer: Stemmer,
    frequent: Vec<(String, u64)>,
    frequent_set: HashSet<String>,
}

impl Default for StandardTokenizer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for StandardTokenizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StandardTokenizer").field("frequent", &self.frequent).finish()
    }
}

impl StandardTokenizer {
    pub fn new() -> Self {
        Self { stemmer: Stemmer::create(Algorithm::English), frequent: Vec::new(), frequent_set: HashSet::new() }
    }

    /// Stem-level tokens before frequent-term filtering.
    fn base_tokens(&self, text: &str) -> Vec<String> {
        let normalized = text.nfkc().collect::<String>().to_lowercase();
        RE.find_iter(&normalized)
            .map(|m| m.as_str())
            .filter(|token| !is_stopword(token))
            .map(|token| self.stemmer.stem(token).into_owned())
            .collect()
    }

    /// Count terms across `texts` and stop the `n` most frequent ones
    /// (ties broken by term, ascending) in every later call to `tokenize_document`.
    pub fn with_frequent_terms<'a, I>(mut self, texts: I, n: usize) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut counts: HashMap<String, u64> = HashMap::new();
        for text in texts {
            for token in self.base_tokens(text) {
                *counts.entry(token).or_insert(0) += 1;
            }
        }
        let mut ranked: Vec<(String, u64)> = counts.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(n);
        tracing::debug!(stopped = ranked.len(), "frequent-term stop list computed");
        self.frequent_set = ranked.iter().map(|(t, _)| t.clone()).collect();
        self.frequent = ranked;
        self
    }

    /// The stopped frequent terms with their corpus counts, most frequent first.
    pub fn frequent_terms(&self) -> &[(String, u64)] {
        &self.frequent
    }
}

impl Tokenizer for StandardTokenizer {
    fn tokenize(&self, text: &str) -> Vec<String> {
        self.base_tokens(text)
    }

    fn tokenize_document(&self, text: &str) -> Vec<String> {
        let mut tokens = self.base_tokens(text);
        if !self.frequent_set.is_empty() {
            tokens.retain(|t| !self.frequent_set.contains(t));
        }
        tokens
    }
}

fn is_stopword(token: &str) -> bool { STOPWORDS.contains(token) }
