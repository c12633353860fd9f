pub mod example_store;
pub mod relevance_ranker;
pub mod schema_formatter;
pub mod sql_formatter;
pub mod translate;
