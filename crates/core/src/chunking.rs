use crate::models::QaOptions;

#[derive(Debug, Clone, Copy)]
pub struct SegmenterConfig {
    pub chunk_size: usize,
    pub overlap: usize,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1_000,
            overlap: 200,
        }
    }
}

impl From<QaOptions> for SegmenterConfig {
    fn from(value: QaOptions) -> Self {
        Self {
            chunk_size: value.chunk_size,
            overlap: value.overlap,
        }
    }
}

/// Splits `text` into chunks of at most `chunk_size` characters. The text is
/// split on newlines first; lines are packed greedily into windows, and the
/// trailing lines of a flushed window (up to `overlap` characters) seed the
/// next one, so successive chunks share content. Lines longer than
/// `chunk_size` are pre-split into character windows stepping by
/// `chunk_size - overlap`. Deterministic for fixed input and config.
pub fn segment(text: &str, config: SegmenterConfig) -> Vec<String> {
    let chunk_size = config.chunk_size.max(1);
    let overlap = config.overlap.min(chunk_size - 1);

    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }
    if trimmed.chars().count() <= chunk_size {
        return vec![trimmed.to_string()];
    }

    let mut pieces = Vec::new();
    for line in trimmed.split('\n') {
        if line.chars().count() <= chunk_size {
            pieces.push(line.to_string());
        } else {
            pieces.extend(window_chars(line, chunk_size, overlap));
        }
    }

    let mut chunks = Vec::new();
    let mut window: Vec<String> = Vec::new();

    for piece in pieces {
        let piece_len = piece.chars().count();
        if !window.is_empty() && joined_len(&window) + 1 + piece_len > chunk_size {
            flush(&window, &mut chunks);
            // retain a tail of the flushed window as the overlap seed,
            // dropping lines until the next chunk fits the budget again
            while !window.is_empty()
                && (joined_len(&window) > overlap
                    || joined_len(&window) + 1 + piece_len > chunk_size)
            {
                window.remove(0);
            }
        }
        window.push(piece);
    }

    flush(&window, &mut chunks);
    chunks
}

fn window_chars(line: &str, chunk_size: usize, overlap: usize) -> Vec<String> {
    let chars: Vec<char> = line.chars().collect();
    let step = chunk_size - overlap;
    let mut pieces = Vec::new();
    let mut start = 0;

    while start < chars.len() {
        let end = (start + chunk_size).min(chars.len());
        pieces.push(chars[start..end].iter().collect());
        if end == chars.len() {
            break;
        }
        start += step;
    }

    pieces
}

fn joined_len(window: &[String]) -> usize {
    let chars: usize = window.iter().map(|piece| piece.chars().count()).sum();
    chars + window.len().saturating_sub(1)
}

fn flush(window: &[String], chunks: &mut Vec<String>) {
    let joined = window.join("\n");
    let trimmed = joined.trim();
    if !trimmed.is_empty() {
        chunks.push(trimmed.to_string());
    }
}
