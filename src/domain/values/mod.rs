pub mod confidence;
pub mod fee;
pub mod source_tier;
pub mod verification;
