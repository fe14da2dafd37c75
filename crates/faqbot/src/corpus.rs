//! CSV corpus loading.
//!
//! The corpus file is read once at startup. Header names are matched
//! case-insensitively after trimming, so `Question`, ` ANSWER ` and
//! `question` all resolve. Extra columns are ignored.
//!
//! Any of the following aborts startup:
//! - the file is missing or unreadable,
//! - the `question` or `answer` column is absent,
//! - a row is malformed (e.g. a different number of fields than the header).
//!
//! Rows whose question or answer is empty after trimming are dropped.

use anyhow::{bail, Context, Result};
use std::io;
use std::path::Path;

use faqbot_core::{Corpus, QaRecord};

/// Load the corpus from a CSV file on disk.
pub fn load_corpus(path: &Path) -> Result<Corpus> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open corpus file: {}", path.display()))?;
    read_corpus(file).with_context(|| format!("Invalid corpus file: {}", path.display()))
}

/// Parse a corpus from any CSV reader.
pub fn read_corpus<R: io::Read>(reader: R) -> Result<Corpus> {
    let mut reader = csv::ReaderBuilder::new().has_headers(true).from_reader(reader);

    let headers: Vec<String> = reader
        .headers()
        .context("Failed to read CSV header row")?
        .iter()
        .map(|h| h.trim().to_lowercase())
        .collect();

    let column = |name: &str| headers.iter().position(|h| h == name);
    let (question_col, answer_col) = match (column("question"), column("answer")) {
        (Some(q), Some(a)) => (q, a),
        _ => bail!(
            "CSV must contain 'question' and 'answer' columns (found: {})",
            headers.join(", ")
        ),
    };

    let mut records = Vec::new();
    let mut dropped = 0usize;
    for (row, result) in reader.records().enumerate() {
        // Row numbers are 1-based and count the header line.
        let record = result.with_context(|| format!("Malformed CSV row {}", row + 2))?;
        let question = record.get(question_col).unwrap_or("").trim();
        let answer = record.get(answer_col).unwrap_or("").trim();
        if question.is_empty() || answer.is_empty() {
            dropped += 1;
            continue;
        }
        records.push(QaRecord::new(question, answer));
    }

    if dropped > 0 {
        tracing::warn!(dropped, "skipped corpus rows with an empty question or answer");
    }

    Ok(Corpus::new(records))
}
