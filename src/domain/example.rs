use serde::{Deserialize, Serialize};

/// A curated natural-language / SQL translation pair.
///
/// The SQL text is stored in canonical form (re-indented, keywords
/// uppercased), established once when the corpus is parsed and never
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryExample {
    pub question: String,
    pub sql: String,
}

impl QueryExample {
    pub fn new(question: impl Into<String>, sql: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            sql: sql.into(),
        }
    }
}
