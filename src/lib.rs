pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;

pub use application::SqlTranslator;
pub use domain::example::QueryExample;
