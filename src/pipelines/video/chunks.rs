// SPDX-License-Identifier: MPL-2.0

//! In-memory buffer of muxer output

/// Ordered container chunks produced while recording
///
/// Chunks arrive from the muxer's appsink in stream order; joining them
/// yields a playable WebM file.
#[derive(Debug, Default, Clone)]
pub struct RecordedChunks {
    chunks: Vec<Vec<u8>>,
    total_bytes: usize,
}

impl RecordedChunks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk; empty chunks are ignored
    pub fn push(&mut self, chunk: Vec<u8>) {
        if chunk.is_empty() {
            return;
        }
        self.total_bytes += chunk.len();
        self.chunks.push(chunk);
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn total_bytes(&self) -> usize {
        self.total_bytes
    }

    pub fn clear(&mut self) {
        self.chunks.clear();
        self.total_bytes = 0;
    }

    /// Concatenate every chunk in arrival order, leaving the buffer empty
    pub fn take_blob(&mut self) -> Vec<u8> {
        let mut blob = Vec::with_capacity(self.total_bytes);
        for chunk in self.chunks.drain(..) {
            blob.extend_from_slice(&chunk);
        }
        self.total_bytes = 0;
        blob
    }

    /// Concatenate every chunk in arrival order
    pub fn into_blob(mut self) -> Vec<u8> {
        self.take_blob()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_chunks_are_skipped() {
        let mut chunks = RecordedChunks::new();
        chunks.push(b"\x1a\x45\xdf\xa3".to_vec());
        chunks.push(Vec::new());
        chunks.push(b"cluster".to_vec());

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks.total_bytes(), 11);
        assert_eq!(chunks.into_blob(), b"\x1a\x45\xdf\xa3cluster".to_vec());
    }

    #[test]
    fn test_take_blob_resets() {
        let mut chunks = RecordedChunks::new();
        chunks.push(vec![1, 2]);
        chunks.push(vec![3]);
        assert_eq!(chunks.take_blob(), vec![1, 2, 3]);
        assert!(chunks.is_empty());
        assert_eq!(chunks.total_bytes(), 0);
    }

    #[test]
    fn test_clear() {
        let mut chunks = RecordedChunks::new();
        chunks.push(vec![9; 32]);
        chunks.clear();
        assert!(chunks.is_empty());
        assert!(chunks.into_blob().is_empty());
    }
}
