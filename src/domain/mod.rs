pub mod answer_key;
pub mod models;
pub mod types;
