pub mod transfer_candidate;
pub mod transfer_record;
