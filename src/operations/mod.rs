pub mod indexing;
pub mod transfer;
