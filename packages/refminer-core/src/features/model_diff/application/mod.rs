mod attributes;
pub mod differ;
mod operations;
mod types;
