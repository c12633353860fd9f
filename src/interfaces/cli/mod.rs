//! Interactive REPL around the translation pipeline.
//!
//! Plain line-oriented plumbing: SQL executes directly, `?`-prefixed input
//! goes through natural-language translation with a confirm step, and every
//! executed statement lands in the on-disk history.

use std::io::{self, BufRead, Write};
use std::path::Path;
use std::sync::Arc;

use tracing::info;

use crate::application::SqlTranslator;
use crate::domain::error::Result;
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::db::{Database, PgDatabase, Row};
use crate::infrastructure::history::QueryHistory;

pub async fn run(config: AppConfig) -> Result<()> {
    let db = Arc::new(PgDatabase::connect(&config.db).await?);
    let db_for_pipeline: Arc<dyn Database> = db.clone();

    let mut translator = SqlTranslator::new(db_for_pipeline, &config.llm);
    if translator.load_examples(Path::new(&config.corpus_path)) {
        info!(path = %config.corpus_path, "Loaded query examples");
    } else {
        info!(path = %config.corpus_path, "No valid query examples found");
    }

    let mut history = QueryHistory::new();

    println!("Welcome to sqlpilot, a PostgreSQL CLI with natural-language queries.");
    println!("Commands:");
    println!("  \\q - Quit");
    println!("  \\h - Show query history");
    println!("  \\c - Clear screen");
    println!();
    println!("Tip: start your input with '?' to use natural language.");

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!(" > ");
        io::stdout().flush().ok();

        let line = match lines.next() {
            Some(Ok(line)) => line,
            _ => break,
        };
        let input = line.trim();

        match parse_command(input) {
            Some(ReplCommand::Quit) => break,
            Some(ReplCommand::History) => {
                print_history(&history);
                continue;
            }
            Some(ReplCommand::Clear) => {
                print!("\x1b[2J\x1b[1;1H");
                io::stdout().flush().ok();
                continue;
            }
            None if input.is_empty() => continue,
            None => {}
        }

        let sql = if let Some(question) = input.strip_prefix('?') {
            println!("Translating...");
            match translator.translate(question.trim()).await {
                Some(sql) => {
                    println!("\nGenerated SQL:\n{}\n", sql);
                    if !confirm("Execute this SQL query?", &mut lines) {
                        continue;
                    }
                    sql
                }
                None => {
                    println!("No SQL produced.");
                    continue;
                }
            }
        } else {
            input.to_string()
        };

        let results = db.execute(&sql).await;
        history.add_query(&sql, results.is_some());

        match results {
            Some(rows) if rows.is_empty() => println!("Query executed successfully."),
            Some(rows) => print_table(&rows),
            None => println!("No results or error occurred."),
        }
    }

    db.close().await;
    println!("Goodbye!");
    Ok(())
}

#[derive(Debug, PartialEq, Eq)]
enum ReplCommand {
    Quit,
    History,
    Clear,
}

fn parse_command(input: &str) -> Option<ReplCommand> {
    match input.to_lowercase().as_str() {
        "\\q" | "quit" | "exit" => Some(ReplCommand::Quit),
        "\\h" | "history" => Some(ReplCommand::History),
        "\\c" | "clear" => Some(ReplCommand::Clear),
        _ => None,
    }
}

fn confirm(question: &str, lines: &mut io::Lines<io::StdinLock<'_>>) -> bool {
    print!("{} [y/N] ", question);
    io::stdout().flush().ok();
    match lines.next() {
        Some(Ok(answer)) => matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"),
        _ => false,
    }
}

fn print_history(history: &QueryHistory) {
    let recent = history.recent(10);
    if recent.is_empty() {
        println!("No query history found.");
        return;
    }
    println!("Recent queries:");
    for entry in recent {
        let status = if entry.success { "ok" } else { "failed" };
        println!("  [{}] {} -- {}", entry.timestamp.format("%Y-%m-%d %H:%M:%S"), entry.query, status);
    }
}

fn print_table(rows: &[Row]) {
    let Some(first) = rows.first() else {
        return;
    };

    let mut columns: Vec<&String> = first.keys().collect();
    columns.sort();

    let mut widths: Vec<usize> = columns.iter().map(|c| c.len()).collect();
    let rendered: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            columns
                .iter()
                .enumerate()
                .map(|(i, col)| {
                    let cell = row.get(*col).map(render_value).unwrap_or_default();
                    widths[i] = widths[i].max(cell.len());
                    cell
                })
                .collect()
        })
        .collect();

    let header: Vec<String> = columns
        .iter()
        .enumerate()
        .map(|(i, col)| format!("{:<width$}", col, width = widths[i]))
        .collect();
    println!("{}", header.join(" | "));
    println!("{}", widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>().join("-+-"));

    for row in rendered {
        let cells: Vec<String> = row
            .iter()
            .enumerate()
            .map(|(i, cell)| format!("{:<width$}", cell, width = widths[i]))
            .collect();
        println!("{}", cells.join(" | "));
    }
    println!("({} rows)", rows.len());
}

fn render_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_command_variants() {
        assert_eq!(parse_command("\\q"), Some(ReplCommand::Quit));
        assert_eq!(parse_command("EXIT"), Some(ReplCommand::Quit));
        assert_eq!(parse_command("\\h"), Some(ReplCommand::History));
        assert_eq!(parse_command("history"), Some(ReplCommand::History));
        assert_eq!(parse_command("\\c"), Some(ReplCommand::Clear));
        assert_eq!(parse_command("clear"), Some(ReplCommand::Clear));
    }

    #[test]
    fn test_sql_is_not_a_command() {
        assert_eq!(parse_command("SELECT 1"), None);
        assert_eq!(parse_command(""), None);
    }
}
