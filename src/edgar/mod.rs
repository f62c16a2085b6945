pub mod chunking;
pub mod parsing;
pub mod report;
