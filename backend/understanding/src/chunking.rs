//! Fixed-window text chunking.

use docent_core::Chunk;

/// Default window length in characters.
pub const DEFAULT_CHUNK_SIZE: usize = 1000;

/// Split `text` into consecutive, non-overlapping windows of at most `size`
/// characters. Windows holding only whitespace are dropped.
///
/// Window boundaries are counted in `char`s so multi-byte text never splits
/// inside a code point. A `size` of zero is treated as one.
pub fn split_into_chunks(source: &str, text: &str, size: usize) -> Vec<Chunk> {
    let size = size.max(1);
    let chars: Vec<char> = text.chars().collect();

    chars
        .chunks(size)
        .map(|window| window.iter().collect::<String>())
        .filter(|window| !window.trim().is_empty())
        .map(|window| Chunk::new(source, window))
        .collect()
}
