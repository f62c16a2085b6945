pub mod edgar;

// Re-exports
pub use edgar::chunking::{Chunk, ChunkConfig, ChunkerStats, FilingChunker};
pub use edgar::parsing::{Block, BlockKind, FilingParser, ParserStats};
pub use edgar::report::FormType;
