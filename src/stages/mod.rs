//! The three batch stages. Each one reads the previous artifacts and returns a
//! new one; file handling lives in the CLI layer.

pub mod analyze;
pub mod extract;
pub mod format;
