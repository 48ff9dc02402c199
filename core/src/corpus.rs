//! Loading raw documents from JSON, JSON arrays or JSONL files, or from a
//! directory tree containing them.

use crate::tokenizer::Tokenizer;
use crate::{DocId, Document, Error, Result};
use serde::Deserialize;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone, Deserialize)]
pub struct InputDoc {
    pub id: DocId,
    #[serde(default)]
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub url: Option<String>,
}

/// Collect every record under `path`. Directories are walked in sorted order
/// so repeated loads yield the same sequence.
pub fn load_records(path: impl AsRef<Path>) -> Result<Vec<InputDoc>> {
    let path = path.as_ref();
    let mut files: Vec<PathBuf> = Vec::new();
    if path.is_dir() {
        for entry in WalkDir::new(path).sort_by_file_name().into_iter().filter_map(|e| e.ok()) {
            let p = entry.path();
            if p.is_file() && matches!(p.extension().and_then(|s| s.to_str()), Some("json" | "jsonl")) {
                files.push(p.to_path_buf());
            }
        }
    } else if path.is_file() {
        files.push(path.to_path_buf());
    } else {
        return Err(Error::InvalidInput(format!("no such file or directory: {}", path.display())));
    }

    let mut records = Vec::new();
    for file in files {
        if file.extension().and_then(|s| s.to_str()) == Some("jsonl") {
            read_jsonl(&file, &mut records)?;
        } else {
            read_json(&file, &mut records)?;
        }
    }
    tracing::info!(path = %path.display(), records = records.len(), "loaded corpus");
    Ok(records)
}

fn read_jsonl(file: &Path, out: &mut Vec<InputDoc>) -> Result<()> {
    let reader = BufReader::new(File::open(file)?);
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() { continue; }
        out.push(serde_json::from_str(&line)?);
    }
    Ok(())
}

fn read_json(file: &Path, out: &mut Vec<InputDoc>) -> Result<()> {
    let reader = BufReader::new(File::open(file)?);
    let json: serde_json::Value = serde_json::from_reader(reader)?;
    match json {
        serde_json::Value::Array(arr) => {
            for v in arr {
                out.push(serde_json::from_value(v)?);
            }
        }
        serde_json::Value::Object(_) => out.push(serde_json::from_value(json)?),
        _ => return Err(Error::InvalidInput(format!("{}: expected a JSON object or array", file.display()))),
    }
    Ok(())
}

/// Tokenize each record body into a [`Document`].
pub fn into_documents<T: Tokenizer + ?Sized>(records: Vec<InputDoc>, tokenizer: &T) -> Vec<Document> {
    records
        .into_iter()
        .map(|r| Document::from_text(r.id, r.title, r.body, r.url, tokenizer))
        .collect()
}
