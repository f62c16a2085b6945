use crate::edgar::report::FormType;

/// Chunk sizing knobs, all in whitespace-token counts. Selected per form
/// type; unknown forms get the 10-K numbers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkConfig {
    pub target_chunk_size: usize,
    pub min_chunk_size: usize,
    pub max_chunk_size: usize,
    pub overlap_size: usize,
}

impl ChunkConfig {
    pub fn for_form(form: &FormType) -> Self {
        match form {
            FormType::Form10Q => ChunkConfig {
                target_chunk_size: 350,
                min_chunk_size: 80,
                max_chunk_size: 700,
                overlap_size: 40,
            },
            // 8-Ks are short event reports; smaller chunks fit them better.
            FormType::Form8K => ChunkConfig {
                target_chunk_size: 300,
                min_chunk_size: 50,
                max_chunk_size: 600,
                overlap_size: 30,
            },
            FormType::Form10K | FormType::Other(_) => ChunkConfig {
                target_chunk_size: 400,
                min_chunk_size: 100,
                max_chunk_size: 800,
                overlap_size: 50,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_form_falls_back_to_10k() {
        let other = ChunkConfig::for_form(&FormType::Other("S-1".into()));
        assert_eq!(other, ChunkConfig::for_form(&FormType::Form10K));
    }

    #[test]
    fn test_per_form_sizes() {
        assert_eq!(ChunkConfig::for_form(&FormType::Form10K).max_chunk_size, 800);
        assert_eq!(ChunkConfig::for_form(&FormType::Form10Q).overlap_size, 40);
        assert_eq!(ChunkConfig::for_form(&FormType::Form8K).min_chunk_size, 50);
    }
}
