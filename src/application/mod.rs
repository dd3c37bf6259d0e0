pub mod extract;
pub mod filter;
pub mod merge;
pub mod patterns;
pub mod reliability;
pub mod scheduler;
pub mod scoring;
pub mod vocabulary;
