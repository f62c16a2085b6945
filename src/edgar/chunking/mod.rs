pub mod chunker;
pub mod config;

pub use chunker::{Chunk, ChunkerStats, FilingChunker};
pub use config::ChunkConfig;
