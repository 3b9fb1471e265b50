//! Character-based text chunking
//!
//! Chunks are counted in characters, not bytes, so multi-byte text never
//! splits inside a character. Splitting is blind to sentence boundaries; a
//! phrase spanning a chunk boundary can be missed, an accepted limitation.

/// One contiguous piece of the input text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Zero-based position in the chunk sequence
    pub index: usize,
    /// Character offset of the first character, inclusive
    pub start_char: usize,
    /// Character offset past the last character, exclusive
    pub end_char: usize,
    pub text: String,
}

/// Split `text` into chunks of at most `max_chars` characters.
///
/// Empty input produces no chunks. Concatenating the chunk texts in order
/// reproduces the input exactly.
pub fn chunk_text(text: &str, max_chars: usize) -> Vec<Chunk> {
    let max_chars = max_chars.max(1);
    let mut chunks = Vec::new();
    let mut buf = String::new();
    let mut start = 0usize;
    let mut total = 0usize;

    for ch in text.chars() {
        buf.push(ch);
        total += 1;
        if total - start == max_chars {
            chunks.push(Chunk {
                index: chunks.len(),
                start_char: start,
                end_char: total,
                text: std::mem::take(&mut buf),
            });
            start = total;
        }
    }

    if !buf.is_empty() {
        chunks.push(Chunk {
            index: chunks.len(),
            start_char: start,
            end_char: total,
            text: buf,
        });
    }

    chunks
}
