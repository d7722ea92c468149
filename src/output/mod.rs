//! Output serialization for the finished table.

pub mod writer;

pub use writer::{generate_csv, generate_json, TallyMetadata};
