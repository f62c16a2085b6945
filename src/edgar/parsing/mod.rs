pub mod dedup;
pub mod parser;
pub mod section;
pub mod text;
pub mod types;

pub use parser::FilingParser;
pub use types::{Block, BlockKind, ParserStats};
