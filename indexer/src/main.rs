use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::{fmt, EnvFilter};
use vsearch_core::corpus::{into_documents, load_records};
use vsearch_core::{EngineConfig, IndexSnapshot, SearchEngine, Similarity, StandardTokenizer};

use std::fs;

#[derive(Parser)]
#[command(name = "indexer")]
#[command(about = "Build a tf-idf index over a corpus and query or inspect it", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct CorpusArgs {
    /// Input path (JSON/JSONL file or directory)
    #[arg(long)]
    input: String,
    /// Champion list size per term (0 disables champion lists)
    #[arg(long, default_value_t = 0)]
    champions: usize,
    /// Drop the N most frequent corpus terms as stop words
    #[arg(long, default_value_t = 0)]
    stop_frequent: usize,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank documents for a query
    Search {
        #[command(flatten)]
        corpus: CorpusArgs,
        #[arg(long)]
        query: String,
        #[arg(long, default_value_t = 10)]
        k: usize,
        /// Similarity mode: cosine or jaccard
        #[arg(long, default_value = "cosine")]
        mode: String,
        /// Score from champion lists instead of full postings when possible
        #[arg(long, default_value_t = false)]
        use_champions: bool,
    },
    /// Write the full index as JSON
    Dump {
        #[command(flatten)]
        corpus: CorpusArgs,
        /// Output file; stdout when omitted
        #[arg(long)]
        output: Option<String>,
    },
    /// Print document, term and posting counts
    Stats {
        #[command(flatten)]
        corpus: CorpusArgs,
    },
    /// Print the most frequent terms of the corpus
    TopTerms {
        #[arg(long)]
        input: String,
        #[arg(long, default_value_t = 50)]
        n: usize,
    },
}

#[derive(Serialize)]
struct DumpFile<'a> {
    generated_at: String,
    #[serde(flatten)]
    index: &'a IndexSnapshot,
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Search { corpus, query, k, mode, use_champions } => {
            let mode: Similarity = mode.parse()?;
            let engine = build_engine(&corpus)?;
            run_search(&engine, &query, k, mode, use_champions)
        }
        Commands::Dump { corpus, output } => {
            let engine = build_engine(&corpus)?;
            dump_index(&engine, output.as_deref())
        }
        Commands::Stats { corpus } => {
            let engine = build_engine(&corpus)?;
            println!("documents: {}", engine.num_docs());
            println!("terms:     {}", engine.num_terms());
            println!("postings:  {}", engine.index().num_postings());
            println!("champions: {}", engine.champion_capacity());
            Ok(())
        }
        Commands::TopTerms { input, n } => {
            let records = load_records(&input)?;
            let tokenizer = StandardTokenizer::new().with_frequent_terms(records.iter().map(|r| r.body.as_str()), n);
            for (rank, (term, count)) in tokenizer.frequent_terms().iter().enumerate() {
                println!("{:>4}  {:<24} {}", rank + 1, term, count);
            }
            Ok(())
        }
    }
}

fn build_engine(args: &CorpusArgs) -> Result<SearchEngine> {
    let records = load_records(&args.input)?;
    let mut tokenizer = StandardTokenizer::new();
    if args.stop_frequent > 0 {
        tokenizer = tokenizer.with_frequent_terms(records.iter().map(|r| r.body.as_str()), args.stop_frequent);
    }
    let config = EngineConfig::default().with_champion_capacity(args.champions);
    let documents = into_documents(records, &tokenizer);
    let engine = SearchEngine::with_config(documents, &config, tokenizer)?;
    tracing::info!(input = %args.input, num_docs = engine.num_docs(), num_terms = engine.num_terms(), "engine ready");
    Ok(engine)
}

fn run_search(engine: &SearchEngine, query: &str, k: usize, mode: Similarity, use_champions: bool) -> Result<()> {
    let outcome = engine.search_scored(query, k, mode, use_champions);
    if use_champions && !outcome.champions_used {
        tracing::info!("champion lists could not supply k candidates; scored full postings");
    }
    for (rank, hit) in outcome.hits.iter().enumerate() {
        let Some(doc) = engine.document(hit.doc_id) else { continue };
        println!("Rank {}\tScore: {:.6}", rank + 1, hit.score);
        println!("id= {}\ttitle= {}", doc.id, doc.title);
        if let Some(url) = &doc.url {
            println!("url= {url}");
        }
        println!();
    }
    println!("{} of {} matching documents", outcome.hits.len(), outcome.total_hits);
    Ok(())
}

fn dump_index(engine: &SearchEngine, output: Option<&str>) -> Result<()> {
    let snapshot = engine.dump();
    let file = DumpFile {
        generated_at: time::OffsetDateTime::now_utc()
            .format(&time::format_description::well_known::Rfc3339)
            .unwrap_or_default(),
        index: &snapshot,
    };
    let json = serde_json::to_string_pretty(&file)?;
    match output {
        Some(path) => {
            fs::write(path, json)?;
            tracing::info!(output = path, terms = snapshot.terms.len(), "index dump written");
        }
        None => println!("{json}"),
    }
    Ok(())
}
