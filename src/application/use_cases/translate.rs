//! Natural-language-to-SQL translation pipeline.
//!
//! One `translate` call: fresh schema description, up to three relevant
//! corpus examples, a single prompt, one provider invocation, then
//! post-processing into normalized SQL. A provider failure or empty
//! response yields `None`; there are no retries.

use std::fmt::Write;
use std::path::Path;
use std::sync::Arc;

use tracing::warn;

use crate::application::use_cases::example_store::ExampleStore;
use crate::application::use_cases::relevance_ranker::{self, DEFAULT_LIMIT};
use crate::application::use_cases::schema_formatter;
use crate::application::use_cases::sql_formatter::format_sql;
use crate::domain::example::QueryExample;
use crate::domain::llm_config::LLMConfig;
use crate::infrastructure::db::Database;
use crate::infrastructure::llm_clients::{select_client, LLMClient};
use crate::infrastructure::response::clean_sql_response;

/// Fixed introspection query; the schema is re-read on every call and
/// never cached.
const SCHEMA_QUERY: &str = "\
SELECT
    table_name,
    array_agg(column_name || ' ' || data_type) AS columns
FROM information_schema.columns
WHERE table_schema = 'public'
GROUP BY table_name;";

pub struct SqlTranslator {
    db: Arc<dyn Database>,
    llm_client: Arc<dyn LLMClient>,
    store: ExampleStore,
}

impl SqlTranslator {
    /// Bind a provider per the configuration. The binding is immutable for
    /// this instance's lifetime.
    pub fn new(db: Arc<dyn Database>, llm_config: &LLMConfig) -> Self {
        Self::with_client(db, select_client(llm_config))
    }

    pub fn with_client(db: Arc<dyn Database>, llm_client: Arc<dyn LLMClient>) -> Self {
        Self {
            db,
            llm_client,
            store: ExampleStore::new(),
        }
    }

    /// Replace the example corpus from a file. See [`ExampleStore::load`].
    pub fn load_examples(&mut self, path: &Path) -> bool {
        self.store.load(path)
    }

    /// Translate a natural-language question into normalized SQL, or `None`
    /// when the provider fails or produces nothing usable.
    pub async fn translate(&self, question: &str) -> Option<String> {
        let schema = self.schema_description().await;
        let examples = relevance_ranker::rank(question, self.store.examples(), DEFAULT_LIMIT);
        let prompt = build_prompt(question, &schema, &examples);

        let raw = match self.llm_client.generate(&prompt).await {
            Ok(raw) => raw,
            Err(err) => {
                warn!(error = %err, "SQL generation failed");
                return None;
            }
        };

        let sql = clean_sql_response(&raw);
        if sql.is_empty() {
            warn!("Provider returned an empty response");
            return None;
        }

        Some(format_sql(&sql))
    }

    async fn schema_description(&self) -> String {
        match self.db.execute(SCHEMA_QUERY).await {
            Some(rows) => schema_formatter::format(&schema_formatter::tables_from_rows(&rows)),
            None => {
                warn!("Schema introspection failed, prompting without schema");
                String::new()
            }
        }
    }
}

fn build_prompt(question: &str, schema: &str, examples: &[&QueryExample]) -> String {
    let mut prompt = String::new();

    writeln!(prompt, "Given the following database schema:\n").unwrap();
    writeln!(prompt, "{}", schema).unwrap();

    if !examples.is_empty() {
        writeln!(prompt, "Here are example translations:\n").unwrap();
        for example in examples {
            writeln!(prompt, "Natural Query: {}", example.question).unwrap();
            writeln!(prompt, "SQL Query:\n{}\n", example.sql).unwrap();
        }
    }

    writeln!(prompt, "Convert this natural language query to SQL:").unwrap();
    writeln!(prompt, "\"{}\"\n", question).unwrap();
    writeln!(prompt, "Requirements:").unwrap();
    writeln!(prompt, "- Use valid PostgreSQL syntax").unwrap();
    writeln!(prompt, "- Return only the SQL query without any explanation").unwrap();
    writeln!(prompt, "- Ensure the query is efficient and properly formatted").unwrap();
    writeln!(prompt, "- Include appropriate JOINs and WHERE clauses").unwrap();
    writeln!(prompt, "- Use proper date functions for time-based queries").unwrap();
    writeln!(prompt, "- Match the style of the example queries where relevant\n").unwrap();
    write!(prompt, "SQL Query:").unwrap();

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::Mutex;

    use crate::domain::error::{AppError, Result};
    use crate::infrastructure::db::Row;

    struct FakeDatabase {
        rows: Option<Vec<Row>>,
    }

    #[async_trait]
    impl Database for FakeDatabase {
        async fn execute(&self, _query: &str) -> Option<Vec<Row>> {
            self.rows.clone()
        }
    }

    struct FakeClient {
        response: Result<String>,
        prompts: Mutex<Vec<String>>,
    }

    impl FakeClient {
        fn returning(response: Result<String>) -> Self {
            Self {
                response,
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl LLMClient for FakeClient {
        async fn generate(&self, prompt: &str) -> Result<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            match &self.response {
                Ok(text) => Ok(text.clone()),
                Err(AppError::LLMError(msg)) => Err(AppError::LLMError(msg.clone())),
                Err(_) => Err(AppError::Internal("unexpected".to_string())),
            }
        }

        fn name(&self) -> &'static str {
            "fake"
        }
    }

    fn schema_rows() -> Option<Vec<Row>> {
        let mut row: Row = HashMap::new();
        row.insert("table_name".to_string(), json!("users"));
        row.insert("columns".to_string(), json!(["id integer", "name text"]));
        Some(vec![row])
    }

    fn translator(client: Arc<FakeClient>, rows: Option<Vec<Row>>) -> SqlTranslator {
        SqlTranslator::with_client(Arc::new(FakeDatabase { rows }), client)
    }

    #[tokio::test]
    async fn test_translate_strips_fences_and_normalizes() {
        let client = Arc::new(FakeClient::returning(Ok(
            "```sql\nselect name from users where id = 1\n```".to_string(),
        )));
        let pipeline = translator(client, schema_rows());

        let sql = pipeline.translate("who is user 1").await;
        assert_eq!(
            sql.as_deref(),
            Some("SELECT name\nFROM users\nWHERE id = 1")
        );
    }

    #[tokio::test]
    async fn test_translate_returns_none_on_provider_failure() {
        let client = Arc::new(FakeClient::returning(Err(AppError::LLMError(
            "boom".to_string(),
        ))));
        let pipeline = translator(client, schema_rows());
        assert!(pipeline.translate("show all users").await.is_none());
    }

    #[tokio::test]
    async fn test_translate_returns_none_on_empty_response() {
        let client = Arc::new(FakeClient::returning(Ok("   \n".to_string())));
        let pipeline = translator(client, schema_rows());
        assert!(pipeline.translate("show all users").await.is_none());
    }

    #[tokio::test]
    async fn test_prompt_contains_schema_and_question() {
        let client = Arc::new(FakeClient::returning(Ok("SELECT 1".to_string())));
        let pipeline = translator(client.clone(), schema_rows());

        pipeline.translate("show all users").await;

        let prompts = client.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("Table: users"));
        assert!(prompts[0].contains("Columns: id integer, name text"));
        assert!(prompts[0].contains("\"show all users\""));
        assert!(prompts[0].contains("PostgreSQL"));
    }

    #[tokio::test]
    async fn test_prompt_includes_relevant_examples() {
        let client = Arc::new(FakeClient::returning(Ok("SELECT 1".to_string())));
        let mut pipeline = translator(client.clone(), schema_rows());

        let corpus = "- show all users\nSELECT * FROM users;\n\n- totals\nSELECT SUM(x) FROM t;";
        let dir = std::env::temp_dir();
        let path = dir.join(format!("sqlpilot_corpus_{}.gist", std::process::id()));
        std::fs::write(&path, corpus).unwrap();
        assert!(pipeline.load_examples(&path));
        let _ = std::fs::remove_file(&path);

        pipeline.translate("show all users").await;

        let prompts = client.prompts.lock().unwrap();
        assert!(prompts[0].contains("Natural Query: show all users"));
        // Zero-overlap example is not included.
        assert!(!prompts[0].contains("SUM"));
    }

    #[tokio::test]
    async fn test_schema_failure_still_translates() {
        let client = Arc::new(FakeClient::returning(Ok("SELECT 1".to_string())));
        let pipeline = translator(client, None);
        assert_eq!(pipeline.translate("anything at all").await.as_deref(), Some("SELECT 1"));
    }
}
