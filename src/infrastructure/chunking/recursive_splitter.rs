/// Recursive character splitting for document text
use tracing::debug;

/// Separators tried best-first when looking for a natural cut point
const SEPARATORS: [&str; 4] = ["\n\n", "\n", ". ", " "];

/// Splits extracted document text into overlapping chunks.
///
/// Cuts prefer natural boundaries (paragraph, line, sentence, word) inside
/// the size budget and fall back to hard character cuts only when a window
/// contains none. Sizes are measured in bytes on UTF-8 boundaries.
#[derive(Debug, Clone)]
pub struct TextChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl TextChunker {
    /// `chunk_overlap` is clamped below `chunk_size` so every step makes
    /// progress.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        let chunk_size = chunk_size.max(1);
        TextChunker {
            chunk_size,
            chunk_overlap: chunk_overlap.min(chunk_size - 1),
        }
    }

    /// Split `text` into trimmed, non-empty chunks. Empty input yields an
    /// empty sequence.
    pub fn chunk(&self, text: &str) -> Vec<String> {
        let text = text.trim();
        if text.is_empty() {
            return Vec::new();
        }
        if text.len() <= self.chunk_size {
            return vec![text.to_string()];
        }

        let mut chunks = Vec::new();
        let total = text.len();
        let mut start = 0usize;

        while start < total {
            let hard_end = floor_char_boundary(text, (start + self.chunk_size).min(total));
            let mut end = if hard_end < total {
                self.cut_point(text, start, hard_end)
            } else {
                total
            };
            if end <= start {
                // Pathologically small budget; take one character.
                end = next_char_boundary(text, start + 1).min(total);
            }

            let piece = text[start..end].trim();
            if !piece.is_empty() {
                chunks.push(piece.to_string());
            }

            if end >= total {
                break;
            }

            let mut next = next_char_boundary(text, end.saturating_sub(self.chunk_overlap));
            if next <= start {
                next = end;
            }
            start = next;
        }

        debug!(chunks = chunks.len(), bytes = total, "chunked document text");
        chunks
    }

    /// Find the cut for the window starting at `start`. Prefers the last
    /// natural separator in the window, as long as it keeps at least half
    /// of the size budget; otherwise cuts hard at the window edge.
    fn cut_point(&self, text: &str, start: usize, hard_end: usize) -> usize {
        let window = &text[start..hard_end];
        let min_keep = self.chunk_size / 2;

        for separator in SEPARATORS {
            if let Some(pos) = window.rfind(separator) {
                let cut = pos + separator.len();
                if cut >= min_keep {
                    return start + cut;
                }
            }
        }
        hard_end
    }
}

fn floor_char_boundary(text: &str, mut index: usize) -> usize {
    while index > 0 && !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}

fn next_char_boundary(text: &str, mut index: usize) -> usize {
    while index < text.len() && !text.is_char_boundary(index) {
        index += 1;
    }
    index
}
