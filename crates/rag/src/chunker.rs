//! Overlapping word-window chunking.
//!
//! Windows are counted in words, but the "fits in one chunk" shortcut
//! compares the normalized text's length in *characters* against the chunk
//! size. Short documents therefore skip windowing even when they hold more
//! words than the chunk size would allow. Both units are kept as-is.

use ragdock_config::ChunkingConfig;
use ragdock_core::error::{Error, Result};
use serde::{Deserialize, Serialize};

use crate::text::normalize;

/// A contiguous run of words from one normalized document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub text: String,
    /// Where the document came from (file name or caller-provided label)
    pub source: String,
    /// Position of this chunk within its document
    pub index: usize,
}

/// Split `text` into overlapping word windows.
///
/// Fails with `InvalidConfiguration` when `chunk_size` is zero or
/// `overlap >= chunk_size`, before looking at the text.
pub fn chunk_text(text: &str, chunk_size: usize, overlap: usize) -> Result<Vec<String>> {
    check_params(chunk_size, overlap)?;

    let text = normalize(text);
    if text.is_empty() {
        return Ok(Vec::new());
    }
    if text.chars().count() <= chunk_size {
        return Ok(vec![text]);
    }

    let words: Vec<&str> = text.split(' ').collect();
    let mut chunks = Vec::new();
    let mut start = 0;
    loop {
        let end = (start + chunk_size).min(words.len());
        chunks.push(words[start..end].join(" "));
        if end == words.len() {
            break;
        }
        start = end - overlap;
    }
    Ok(chunks)
}

fn check_params(chunk_size: usize, overlap: usize) -> Result<()> {
    if chunk_size == 0 {
        return Err(Error::InvalidConfiguration(
            "chunk size must be greater than 0".into(),
        ));
    }
    if overlap >= chunk_size {
        return Err(Error::InvalidConfiguration(format!(
            "overlap ({overlap}) must be smaller than chunk size ({chunk_size})"
        )));
    }
    Ok(())
}

/// A validated chunking policy.
#[derive(Debug, Clone, Copy)]
pub struct Chunker {
    chunk_size: usize,
    overlap: usize,
}

impl Chunker {
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self> {
        check_params(chunk_size, overlap)?;
        Ok(Self {
            chunk_size,
            overlap,
        })
    }

    pub fn from_config(config: &ChunkingConfig) -> Result<Self> {
        Self::new(config.chunk_size, config.chunk_overlap)
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn overlap(&self) -> usize {
        self.overlap
    }

    /// Chunk text into plain strings.
    pub fn chunk(&self, text: &str) -> Vec<String> {
        // Parameters were checked in `new`
        chunk_text(text, self.chunk_size, self.overlap).unwrap_or_default()
    }

    /// Chunk a document, tagging every piece with its source and position.
    pub fn chunk_document(&self, text: &str, source: &str) -> Vec<Chunk> {
        self.chunk(text)
            .into_iter()
            .enumerate()
            .map(|(index, text)| Chunk {
                text,
                source: source.to_string(),
                index,
            })
            .collect()
    }
}

impl Default for Chunker {
    fn default() -> Self {
        Self {
            chunk_size: 1200,
            overlap: 200,
        }
    }
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    /// Random word text plus a valid `(chunk_size, overlap)` pair.
    fn text_and_policy() -> impl Strategy<Value = (String, usize, usize)> {
        let text = prop::collection::vec("[a-z]{1,8}", 0..300).prop_map(|w| w.join(" "));
        let policy = (1usize..60).prop_flat_map(|size| (Just(size), 0..size));
        (text, policy).prop_map(|(text, (size, overlap))| (text, size, overlap))
    }

    fn split(chunk: &str) -> Vec<&str> {
        chunk.split(' ').collect()
    }

    proptest! {
        #[test]
        fn windows_never_exceed_chunk_size((text, size, overlap) in text_and_policy()) {
            for chunk in chunk_text(&text, size, overlap).unwrap() {
                prop_assert!(!chunk.is_empty());
                prop_assert!(split(&chunk).len() <= size);
            }
        }

        #[test]
        fn consecutive_windows_share_overlap((text, size, overlap) in text_and_policy()) {
            let chunks = chunk_text(&text, size, overlap).unwrap();
            for pair in chunks.windows(2) {
                let a = split(&pair[0]);
                let b = split(&pair[1]);
                prop_assert_eq!(a.len(), size);
                prop_assert_eq!(&a[a.len() - overlap..], &b[..overlap]);
            }
        }

        #[test]
        fn windows_cover_text_and_terminate((text, size, overlap) in text_and_policy()) {
            let normalized = normalize(&text);
            let chunks = chunk_text(&text, size, overlap).unwrap();
            let word_count = if normalized.is_empty() { 0 } else { split(&normalized).len() };

            // Each step advances by at least one word
            prop_assert!(chunks.len() <= word_count.max(1));
            if normalized.is_empty() {
                prop_assert!(chunks.is_empty());
            } else {
                let words = split(&normalized);
                prop_assert_eq!(split(&chunks[0])[0], words[0]);
                prop_assert_eq!(*split(chunks.last().unwrap()).last().unwrap(), *words.last().unwrap());
            }
        }

        #[test]
        fn short_text_is_its_own_chunk((text, _size, overlap) in text_and_policy()) {
            let normalized = normalize(&text);
            let size = normalized.chars().count().max(overlap + 1);
            let chunks = chunk_text(&text, size, overlap).unwrap();
            if normalized.is_empty() {
                prop_assert!(chunks.is_empty());
            } else {
                prop_assert_eq!(chunks, vec![normalized]);
            }
        }

        #[test]
        fn rechunking_a_window_is_idempotent((text, size, overlap) in text_and_policy()) {
            for chunk in chunk_text(&text, size, overlap).unwrap() {
                prop_assert_eq!(chunk_text(&chunk, size, overlap).unwrap(), vec![chunk.clone()]);
            }
        }
    }
}
