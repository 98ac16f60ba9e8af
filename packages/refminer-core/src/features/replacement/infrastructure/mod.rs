pub mod classifier;
pub mod similarity;
pub mod tokenizer;
