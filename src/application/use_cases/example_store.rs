//! Example corpus management.
//!
//! The corpus is a flat text file of blocks separated by blank lines. Each
//! block's first line is the natural-language question (leading bullet
//! markers stripped); everything after the first line is the SQL. Malformed
//! blocks are dropped, never raised.

use std::fs;
use std::path::Path;

use tracing::{debug, warn};

use crate::application::use_cases::sql_formatter::format_sql;
use crate::domain::example::QueryExample;

#[derive(Debug, Default)]
pub struct ExampleStore {
    examples: Vec<QueryExample>,
}

impl ExampleStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn examples(&self) -> &[QueryExample] {
        &self.examples
    }

    /// Read a corpus file and replace the stored examples wholesale.
    /// Returns whether at least one example was parsed. A read error leaves
    /// the previous corpus untouched and reports `false`.
    pub fn load(&mut self, path: &Path) -> bool {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "Failed to read example corpus");
                return false;
            }
        };

        self.examples = parse(&text);
        debug!(count = self.examples.len(), "Loaded example corpus");
        !self.examples.is_empty()
    }
}

/// Parse corpus text into (question, SQL) pairs, preserving block order.
/// SQL is normalized once here; it is never reformatted afterwards.
pub fn parse(corpus_text: &str) -> Vec<QueryExample> {
    split_blocks(corpus_text)
        .into_iter()
        .filter_map(|block| parse_block(&block))
        .collect()
}

fn parse_block(block: &str) -> Option<QueryExample> {
    let (first, rest) = block.split_once('\n')?;
    let question = first.trim().trim_start_matches(['-', '*', '\u{2022}']).trim();
    let sql = rest.trim();
    if question.is_empty() || sql.is_empty() {
        return None;
    }
    Some(QueryExample::new(question, format_sql(sql)))
}

fn split_blocks(text: &str) -> Vec<String> {
    let mut blocks = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    for line in text.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                blocks.push(current.join("\n"));
                current.clear();
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        blocks.push(current.join("\n"));
    }
    blocks
}
