use super::error::ChunkingError;

pub const DEFAULT_MAX_SEGMENT_LENGTH: usize = crate::constants::DEFAULT_CHUNK_SIZE;
pub const DEFAULT_OVERLAP_LENGTH: usize = crate::constants::DEFAULT_CHUNK_OVERLAP;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Segment size limits, in characters.
pub struct ChunkerConfig {
    pub max_segment_length: usize,
    pub overlap_length: usize,
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            max_segment_length: DEFAULT_MAX_SEGMENT_LENGTH,
            overlap_length: DEFAULT_OVERLAP_LENGTH,
        }
    }
}

impl ChunkerConfig {
    pub fn new(max_segment_length: usize, overlap_length: usize) -> Self {
        Self {
            max_segment_length,
            overlap_length,
        }
    }

    pub fn validate(&self) -> Result<(), ChunkingError> {
        if self.max_segment_length == 0 {
            return Err(ChunkingError::InvalidConfig {
                reason: "max_segment_length must be > 0".to_string(),
            });
        }
        if self.overlap_length >= self.max_segment_length {
            return Err(ChunkingError::InvalidConfig {
                reason: format!(
                    "overlap_length ({}) must be smaller than max_segment_length ({})",
                    self.overlap_length, self.max_segment_length
                ),
            });
        }
        Ok(())
    }
}
