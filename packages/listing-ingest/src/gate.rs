//! Size limit in front of the extraction call.

use tracing::{debug, warn};

use crate::error::SizeExceeded;
use crate::types::document::NormalizedText;

/// Character ceiling for normalized text (exclusive).
pub const MAX_NORMALIZED_CHARS: usize = 40_000;

/// Refuses text that is too large to send for extraction.
///
/// Counts Unicode scalar values, not bytes. A count equal to the limit is
/// already too large.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeGate {
    limit: usize,
}

impl Default for SizeGate {
    fn default() -> Self {
        Self::new(MAX_NORMALIZED_CHARS)
    }
}

impl SizeGate {
    pub fn new(limit: usize) -> Self {
        Self { limit }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn check(&self, text: &NormalizedText) -> Result<(), SizeExceeded> {
        let count = text.char_count();
        if count >= self.limit {
            warn!(count, limit = self.limit, "Normalized text exceeds size limit");
            return Err(SizeExceeded {
                count,
                limit: self.limit,
            });
        }

        debug!(count, limit = self.limit, "Normalized text within size limit");
        Ok(())
    }
}
